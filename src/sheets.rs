//! # Spreadsheet Service Module
//!
//! Thin client for the Google Sheets v4 REST API plus the service facade the
//! handlers talk to. Two logical sheets are used: the read-only listings
//! sheet (fronted by a TTL cache) and the append-only requests sheet.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{Clock, ListingCache};
use crate::config::{RetryConfig, SheetsSettings};
use crate::errors::BotError;
use crate::listing_model::{parse_header, parse_listing_row, Listing, RequestRecord};

/// Response body of a `values.get` call
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Low-level Sheets API client with bounded retries
pub struct SheetsClient {
    http: reqwest::Client,
    settings: SheetsSettings,
    retry: RetryConfig,
}

impl SheetsClient {
    pub fn new(settings: SheetsSettings, retry: RetryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            retry,
        }
    }

    /// Fetch every row of a sheet, header row included
    pub async fn list_all_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, BotError> {
        let url = format!(
            "{}/{}/values/{}",
            self.settings.base_url, self.settings.spreadsheet_id, sheet
        );

        let range: ValueRange = self
            .with_retry("values.get", || async {
                let response = self
                    .http
                    .get(&url)
                    .bearer_auth(&self.settings.api_token)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.json::<ValueRange>().await?)
            })
            .await?;

        let rows: Vec<Vec<String>> = range
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        debug!(sheet = %sheet, rows = rows.len(), "Fetched sheet rows");
        Ok(rows)
    }

    /// Append one row to the end of a sheet
    pub async fn append_row(&self, sheet: &str, row: &[String]) -> Result<(), BotError> {
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.settings.base_url, self.settings.spreadsheet_id, sheet
        );
        let body = serde_json::json!({ "values": [row] });

        self.with_retry("values.append", || async {
            self.http
                .post(&url)
                .bearer_auth(&self.settings.api_token)
                .json(&body)
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        })
        .await?;

        info!(sheet = %sheet, "Row appended");
        Ok(())
    }

    /// Run an API call with exponential backoff and random jitter
    async fn with_retry<T, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T, BotError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BotError>>,
    {
        let mut last_error = None;
        for attempt in 0..=self.retry.max_retries {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        operation = op_name,
                        attempt = attempt + 1,
                        error = %e,
                        "Sheets API call failed"
                    );
                    last_error = Some(e);
                    if attempt < self.retry.max_retries {
                        let backoff = self
                            .retry
                            .base_retry_delay_ms
                            .saturating_mul(1 << attempt)
                            .min(self.retry.max_retry_delay_ms);
                        let jitter =
                            rand::thread_rng().gen_range(0..=self.retry.base_retry_delay_ms / 2);
                        tokio::time::sleep(Duration::from_millis(backoff + jitter)).await;
                    }
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| BotError::Service(format!("{op_name}: retries exhausted"))))
    }
}

/// Service facade over the two spreadsheet sheets
pub struct SheetsService {
    client: SheetsClient,
    cache: ListingCache,
    listings_sheet: String,
    requests_sheet: String,
}

impl SheetsService {
    pub fn new(
        settings: SheetsSettings,
        retry: RetryConfig,
        cache_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let listings_sheet = settings.listings_sheet.clone();
        let requests_sheet = settings.requests_sheet.clone();
        Self {
            client: SheetsClient::new(settings, retry),
            cache: ListingCache::new(cache_ttl, clock),
            listings_sheet,
            requests_sheet,
        }
    }

    /// All listings, served from cache when fresh
    ///
    /// Malformed rows are rejected individually and logged; a failed refresh
    /// falls back to the last cached snapshot when one exists.
    pub async fn all_listings(&self) -> Result<Vec<Listing>, BotError> {
        if let Some(cached) = self.cache.get() {
            debug!(listings = cached.len(), "Serving listings from cache");
            return Ok(cached);
        }

        let rows = match self.client.list_all_rows(&self.listings_sheet).await {
            Ok(rows) => rows,
            Err(e) => {
                if let Some(stale) = self.cache.get_stale() {
                    warn!(error = %e, "Listings refresh failed, serving stale snapshot");
                    return Ok(stale);
                }
                return Err(e);
            }
        };

        let listings = parse_listing_rows(&rows)?;
        self.cache.store(listings.clone());
        info!(listings = listings.len(), "Listings snapshot refreshed");
        Ok(listings)
    }

    /// Look a single listing up by its sheet id
    pub async fn listing_by_id(&self, id: &str) -> Result<Option<Listing>, BotError> {
        let listings = self.all_listings().await?;
        Ok(listings.into_iter().find(|l| l.id == id))
    }

    /// Append a validated request record to the durable log
    pub async fn save_request(&self, record: &RequestRecord) -> Result<(), BotError> {
        record.validate()?;
        self.client
            .append_row(&self.requests_sheet, &record.to_row())
            .await
    }

    /// All submitted request rows, header stripped (admin statistics)
    pub async fn all_request_rows(&self) -> Result<Vec<Vec<String>>, BotError> {
        let mut rows = self.client.list_all_rows(&self.requests_sheet).await?;
        if !rows.is_empty() {
            rows.remove(0);
        }
        Ok(rows)
    }
}

/// Parse raw sheet rows into listings, skipping rows that fail validation
pub fn parse_listing_rows(rows: &[Vec<String>]) -> Result<Vec<Listing>, BotError> {
    let Some((header, data)) = rows.split_first() else {
        return Ok(Vec::new());
    };
    let columns = parse_header(header)?;

    let mut listings = Vec::with_capacity(data.len());
    for (index, row) in data.iter().enumerate() {
        match parse_listing_row(&columns, row) {
            Ok(listing) => listings.push(listing),
            Err(e) => {
                // Sheet row numbers are 1-based and include the header
                warn!(row = index + 2, error = %e, "Rejected malformed listing row");
            }
        }
    }
    Ok(listings)
}

/// Totals for the admin statistics view: (requests, unique submitters)
pub fn request_stats(rows: &[Vec<String>]) -> (usize, usize) {
    let unique: HashSet<&str> = rows
        .iter()
        .filter_map(|row| row.get(1))
        .map(|cell| cell.as_str())
        .collect();
    (rows.len(), unique.len())
}
