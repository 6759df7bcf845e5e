//! World Bank indicator API integration.
//!
//! The API answers `GET {base}/country/{code}/indicator/{code}` with a two
//! element JSON array: pagination metadata, then the list of yearly entries.
//! Missing data is reported as `value: null` and is dropped, not recorded.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::YearRange;
use crate::domain::{FetchTask, Observation};
use crate::error::AppError;

/// Entries per page; one page covers the default 25-year window.
const PER_PAGE: usize = 100;

/// Why a single request produced nothing usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// Connection failure or timeout.
    #[error("request failed: {0}")]
    Request(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Body(String),
}

/// Transport seam for the fetcher: one GET returning a JSON document.
pub trait JsonSource: Sync {
    fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Blocking HTTP client with a fixed per-request timeout.
pub struct WorldBankClient {
    client: Client,
}

impl WorldBankClient {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl JsonSource for WorldBankClient {
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        resp.json::<Value>()
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

/// Endpoint for one task over the configured year range.
pub fn endpoint_url(base_url: &str, task: &FetchTask, years: YearRange) -> String {
    format!(
        "{}/country/{}/indicator/{}?date={}:{}&format=json&per_page={PER_PAGE}",
        base_url.trim_end_matches('/'),
        task.country_code,
        task.indicator_code,
        years.start,
        years.end,
    )
}

/// Observations parsed from one response, plus what was left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    pub observations: Vec<Observation>,
    /// Entries whose `value` was null.
    pub null_values: usize,
    /// Entries dropped because a field could not be parsed or was out of range.
    pub rejected: usize,
}

#[derive(Debug, Deserialize)]
struct Entry {
    country: CountryRef,
    date: String,
    value: Option<RawValue>,
}

/// Only the display name is kept; the API's `id` is the ISO-2 code, while
/// observations carry the configured code the task requested.
#[derive(Debug, Deserialize)]
struct CountryRef {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

/// Turn a response body into observations for `task`.
///
/// Fewer than two top-level elements (or a `null` data element) means the API
/// has nothing for this task. Bad entries are skipped individually.
pub fn parse_response(body: &Value, task: &FetchTask, years: YearRange) -> Result<ParsedResponse, FetchError> {
    let top = body
        .as_array()
        .ok_or_else(|| FetchError::Body("expected a top-level JSON array".to_string()))?;

    let mut out = ParsedResponse::default();
    if top.len() < 2 {
        return Ok(out);
    }

    let entries = match &top[1] {
        Value::Array(entries) => entries,
        Value::Null => return Ok(out),
        _ => return Err(FetchError::Body("expected element 1 to be an array of entries".to_string())),
    };

    for item in entries {
        // Null values are skipped before anything else is looked at.
        if item.get("value").is_some_and(Value::is_null) {
            out.null_values += 1;
            continue;
        }

        match parse_entry(item, task, years) {
            Ok(Some(obs)) => out.observations.push(obs),
            Ok(None) => out.null_values += 1,
            Err(reason) => {
                log::debug!(
                    "Rejected entry for {} / {}: {reason}",
                    task.indicator_code,
                    task.country_code
                );
                out.rejected += 1;
            }
        }
    }

    Ok(out)
}

fn parse_entry(item: &Value, task: &FetchTask, years: YearRange) -> Result<Option<Observation>, String> {
    let entry = Entry::deserialize(item).map_err(|e| format!("invalid entry: {e}"))?;

    let Some(raw) = entry.value else {
        return Ok(None);
    };
    let value = parse_value(&raw).ok_or_else(|| format!("invalid value {raw:?}"))?;

    let year: i32 = entry
        .date
        .trim()
        .parse()
        .map_err(|_| format!("invalid date '{}'", entry.date))?;
    if !years.contains(year) {
        return Err(format!("year {year} outside {}:{}", years.start, years.end));
    }

    Ok(Some(Observation::from_task(task, entry.country.value, year, value)))
}

fn parse_value(raw: &RawValue) -> Option<f64> {
    let v = match raw {
        RawValue::Number(v) => *v,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}
