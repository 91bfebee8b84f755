//! Remote dataset fetch.
//!
//! The pipeline consumes a country-day CSV published at a fixed URL. The fetch
//! is a single blocking GET with no retry: a transport error or non-success
//! status aborts the run with exit code 4.

use reqwest::blocking::Client;

use crate::error::AppError;

const DEFAULT_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

pub struct DatasetClient {
    client: Client,
    url: String,
}

impl DatasetClient {
    /// Build a client, honoring an `EPI_DATA_URL` override from the
    /// environment (or a `.env` file).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let url = std::env::var("EPI_DATA_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self {
            client: Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw CSV body.
    pub fn fetch_csv(&self) -> Result<String, AppError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::new(4, format!("Dataset request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Dataset request failed with status {}.", resp.status()),
            ));
        }

        resp.text()
            .map_err(|e| AppError::new(4, format!("Failed to read dataset body: {e}")))
    }
}
