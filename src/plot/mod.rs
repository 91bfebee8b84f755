//! Terminal chart rendering.

pub mod ascii;

pub use ascii::{
    render_bar_chart, render_dual_axis_chart, render_forecast_chart, render_line_chart,
    render_scatter_chart,
};
