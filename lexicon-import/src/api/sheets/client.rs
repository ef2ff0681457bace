//! reqwest client for the Google Sheets v4 REST API
//!
//! Authenticates with an API key, so only spreadsheets shared for link
//! viewing are readable. The key travels in a request header and never
//! appears in a URL or an error message.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::SheetSource;

const API_KEY_HEADER: &str = "x-goog-api-key";
use super::models::{ApiErrorResponse, Spreadsheet, ValueRange};
use crate::config::FetchConfig;

/// Sheets API client bound to one API key
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SheetsClient {
    pub fn new(api_key: impl Into<String>, config: &FetchConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.base_url,
            urlencoding::encode(spreadsheet_id)
        )
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|err| err.error.to_string())
                .unwrap_or(body);
            bail!("Sheets API returned {}: {}", status, message);
        }

        response
            .json::<T>()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Malformed response from {}", url))
    }
}

#[async_trait]
impl SheetSource for SheetsClient {
    async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        let spreadsheet: Spreadsheet = self
            .get_json(
                &self.spreadsheet_url(spreadsheet_id),
                &[("fields", "spreadsheetId,sheets.properties")],
            )
            .await?;
        Ok(spreadsheet.titles())
    }

    async fn values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let range: ValueRange = self
            .get_json(&self.values_url(spreadsheet_id, range), &[])
            .await?;
        Ok(range.into_rows())
    }
}
