//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Every renderer is a pure function of already-computed inputs, so a failure
//! in one upstream stage never prevents the other charts from rendering.
//! Empty inputs produce a "(no data)" placeholder rather than an error.
//!
//! Plot elements:
//! - series lines: `-`
//! - bars: `#`
//! - scatter/overlay points: `o` / `x`
//! - forecast band fill: `.` with point forecasts `*`

use chrono::NaiveDate;

use crate::domain::{CountrySummary, ForecastResult};

/// Render a time series as a polyline.
pub fn render_line_chart(
    title: &str,
    dates: &[NaiveDate],
    values: &[f64],
    width: usize,
    height: usize,
) -> String {
    if values.is_empty() || dates.len() != values.len() {
        return format!("{title}: (no data)\n");
    }

    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = pad_range(min_max(values));
    let mut grid = vec![vec![' '; width]; height];
    draw_series(&mut grid, values, 0, values.len(), y_min, y_max, '-');

    let mut out = format!(
        "{title}: {}..{} | y=[{y_min:.1}, {y_max:.1}]\n",
        dates[0],
        dates[dates.len() - 1]
    );
    push_grid(&mut out, grid);
    out
}

/// Render ranked summaries as horizontal bars.
pub fn render_bar_chart(title: &str, summaries: &[CountrySummary], width: usize) -> String {
    if summaries.is_empty() {
        return format!("{title}: (no data)\n");
    }

    let width = width.max(10);
    let label_width = summaries
        .iter()
        .map(|s| s.location.chars().count())
        .max()
        .unwrap_or(0);
    let max_value = summaries
        .iter()
        .map(|s| s.value)
        .fold(0.0_f64, f64::max)
        .max(1e-12);

    let mut out = format!("{title}:\n");
    for s in summaries {
        let bars = ((s.value / max_value) * width as f64).round().max(0.0) as usize;
        out.push_str(&format!(
            "{:<label_width$} | {} {}\n",
            s.location,
            "#".repeat(bars),
            format_value(s.value),
        ));
    }
    out
}

/// Render recent history plus a point forecast with its interval band.
///
/// History occupies the left portion of the grid, the forecast the right;
/// the band is filled with `.` and point forecasts drawn as `*`.
pub fn render_forecast_chart(
    title: &str,
    history: &[f64],
    forecast: &ForecastResult,
    width: usize,
    height: usize,
) -> String {
    if history.is_empty() || forecast.point.is_empty() {
        return format!("{title}: (no data)\n");
    }

    let width = width.max(10);
    let height = height.max(5);

    // Show at most ~3x the horizon of trailing history so the band stays legible.
    let tail_len = history.len().min(forecast.point.len() * 3);
    let tail = &history[history.len() - tail_len..];
    let total = tail_len + forecast.point.len();

    let mut all = Vec::with_capacity(total * 2);
    all.extend_from_slice(tail);
    all.extend_from_slice(&forecast.point);
    all.extend_from_slice(&forecast.lower);
    all.extend_from_slice(&forecast.upper);
    let (y_min, y_max) = pad_range(min_max(&all));

    let mut grid = vec![vec![' '; width]; height];

    // Band first so history/point markers overlay it.
    for (i, (&lo, &hi)) in forecast.lower.iter().zip(forecast.upper.iter()).enumerate() {
        let x = map_x((tail_len + i) as f64, 0.0, (total - 1) as f64, width);
        let row_hi = map_y(hi, y_min, y_max, height);
        let row_lo = map_y(lo, y_min, y_max, height);
        for row in grid.iter_mut().take(row_lo + 1).skip(row_hi) {
            if row[x] == ' ' {
                row[x] = '.';
            }
        }
    }

    draw_series(&mut grid, tail, 0, total, y_min, y_max, '-');

    for (i, &f) in forecast.point.iter().enumerate() {
        let x = map_x((tail_len + i) as f64, 0.0, (total - 1) as f64, width);
        let y = map_y(f, y_min, y_max, height);
        grid[y][x] = '*';
    }

    let (p, d, q) = forecast.order;
    let mut out = format!(
        "{title}: ARIMA({p},{d},{q}) | {} steps from {} | y=[{y_min:.1}, {y_max:.1}]\n",
        forecast.point.len(),
        forecast.last_date,
    );
    push_grid(&mut out, grid);
    out
}

/// Render bars for one series with a second series overlaid as points on an
/// independent right-hand scale.
pub fn render_dual_axis_chart(
    title: &str,
    dates: &[NaiveDate],
    bars: &[f64],
    points: &[f64],
    width: usize,
    height: usize,
) -> String {
    if bars.is_empty() || bars.len() != points.len() || dates.len() != bars.len() {
        return format!("{title}: (no data)\n");
    }

    let width = width.max(10);
    let height = height.max(5);

    let (bar_min, bar_max) = pad_range(min_max(bars));
    let (pt_min, pt_max) = pad_range(min_max(points));

    let mut grid = vec![vec![' '; width]; height];

    for (i, &v) in bars.iter().enumerate() {
        let x = map_x(i as f64, 0.0, (bars.len() - 1).max(1) as f64, width);
        let top = map_y(v, bar_min, bar_max, height);
        for row in grid.iter_mut().skip(top) {
            if row[x] == ' ' {
                row[x] = '#';
            }
        }
    }

    // Points win collisions; they carry the second axis.
    for (i, &v) in points.iter().enumerate() {
        let x = map_x(i as f64, 0.0, (points.len() - 1).max(1) as f64, width);
        let y = map_y(v, pt_min, pt_max, height);
        grid[y][x] = 'x';
    }

    let mut out = format!(
        "{title}: {}..{} | bars(#)=[{bar_min:.1}, {bar_max:.1}] | points(x)=[{pt_min:.1}, {pt_max:.1}]\n",
        dates[0],
        dates[dates.len() - 1]
    );
    push_grid(&mut out, grid);
    out
}

/// Render an x/y scatter.
pub fn render_scatter_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    xs: &[f64],
    ys: &[f64],
    width: usize,
    height: usize,
) -> String {
    if xs.is_empty() || xs.len() != ys.len() {
        return format!("{title}: (no data)\n");
    }

    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = pad_range(min_max(xs));
    let (y_min, y_max) = pad_range(min_max(ys));

    let mut grid = vec![vec![' '; width]; height];
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = format!(
        "{title}: {x_label}=[{x_min:.1}, {x_max:.1}] | {y_label}=[{y_min:.1}, {y_max:.1}]\n"
    );
    push_grid(&mut out, grid);
    out
}

/// Draw a series as a polyline within the `[x_offset, x_offset + len)` slice
/// of an x-domain `[0, x_domain)`.
fn draw_series(
    grid: &mut [Vec<char>],
    values: &[f64],
    x_offset: usize,
    x_domain: usize,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let width = grid[0].len();
    let height = grid.len();
    let domain_max = (x_domain - 1).max(1) as f64;

    let mut prev: Option<(usize, usize)> = None;
    for (i, &v) in values.iter().enumerate() {
        let x = map_x((x_offset + i) as f64, 0.0, domain_max, width);
        let y = map_y(v, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, ch);
        } else {
            grid[y][x] = ch;
        }
        prev = Some((x, y));
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        (min, max)
    } else if min.is_finite() {
        (min, min + 1.0)
    } else {
        (0.0, 1.0)
    }
}

fn pad_range((min, max): (f64, f64)) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * 0.05).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let span = (x_max - x_min).max(1e-12);
    let u = ((x - x_min) / span).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
        {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == '.' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

/// Counts print as integers, rates with decimals.
fn format_value(v: f64) -> String {
    if v.abs() >= 1.0 && v.fract().abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}
