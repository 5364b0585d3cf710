//! Yahoo Finance provider client
//!
//! Speaks to the public quote endpoints directly: `v8/finance/chart` for
//! daily closes, `v10/finance/quoteSummary` for the info map, income
//! statements and the earnings calendar, and `v1/finance/search` for news.
//! Yahoo wraps most numeric fields as `{"raw": ..., "fmt": ...}` objects;
//! parsing here unwraps `raw` and flattens module payloads into the flat
//! field map the gateway consumes.

use crate::error::{DataError, Result};
use crate::provider::{DailyClose, EarningsDate, IncomePeriod, MarketDataProvider};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
// Yahoo rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Info-map modules fetched for metrics lookups
const INFO_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData";

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the endpoint base URL (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::ProviderError(format!(
                "Yahoo API error {status}: {body}"
            )));
        }

        Ok(response.json().await?)
    }

    /// Fetch quoteSummary modules for a symbol, returning the result object
    async fn quote_summary(&self, symbol: &str, modules: &str) -> Result<Value> {
        let url = format!("{}/v10/finance/quoteSummary/{symbol}", self.base_url);
        let payload = self
            .get_json(&url, &[("modules", modules.to_string())])
            .await?;

        extract_result(&payload, "quoteSummary", symbol)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    #[instrument(skip(self))]
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        let period1 = unix_midnight(start);
        // The chart endpoint treats period2 as exclusive.
        let period2 = unix_midnight(end + chrono::Duration::days(1));

        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        let payload = self
            .get_json(
                &url,
                &[
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("interval", "1d".to_string()),
                ],
            )
            .await?;

        let result = extract_result(&payload, "chart", symbol)?;
        let closes = parse_chart(&result)?;
        debug!(symbol, rows = closes.len(), "fetched daily closes");
        Ok(closes)
    }

    #[instrument(skip(self))]
    async fn info(&self, symbol: &str) -> Result<Map<String, Value>> {
        let result = self.quote_summary(symbol, INFO_MODULES).await?;
        Ok(flatten_info(&result))
    }

    #[instrument(skip(self))]
    async fn news(&self, symbol: &str) -> Result<Vec<Value>> {
        let url = format!("{}/v1/finance/search", self.base_url);
        let payload = self
            .get_json(
                &url,
                &[
                    ("q", symbol.to_string()),
                    ("newsCount", "20".to_string()),
                    ("quotesCount", "0".to_string()),
                ],
            )
            .await?;

        let items = payload
            .get("news")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn income_statements(&self, symbol: &str) -> Result<Vec<IncomePeriod>> {
        let result = self.quote_summary(symbol, "incomeStatementHistory").await?;
        Ok(parse_income_history(&result))
    }

    #[instrument(skip(self))]
    async fn earnings_dates(&self, symbol: &str) -> Result<Vec<EarningsDate>> {
        let result = self.quote_summary(symbol, "calendarEvents").await?;
        Ok(parse_calendar(&result))
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

// ============================================================================
// Payload parsing
// ============================================================================

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Pull `result[0]` out of a Yahoo envelope, mapping the inline error to
/// [`DataError::DataUnavailable`]
fn extract_result(payload: &Value, envelope: &str, symbol: &str) -> Result<Value> {
    let envelope_value = payload
        .get(envelope)
        .ok_or_else(|| DataError::ProviderError(format!("missing '{envelope}' envelope")))?;

    if let Some(first) = envelope_value
        .get("result")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
    {
        return Ok(first.clone());
    }

    let reason = envelope_value
        .get("error")
        .and_then(|e| e.get("description"))
        .and_then(Value::as_str)
        .unwrap_or("no data in response")
        .to_string();

    Err(DataError::DataUnavailable {
        symbol: symbol.to_string(),
        reason,
    })
}

/// Unwrap Yahoo's `{"raw": ..., "fmt": ...}` wrapping, passing scalars through
fn unwrap_raw(value: &Value) -> Option<Value> {
    match value {
        Value::Object(obj) => obj.get("raw").cloned(),
        Value::Array(_) => None,
        scalar => Some(scalar.clone()),
    }
}

/// Flatten quoteSummary modules into one field-name to value map
fn flatten_info(result: &Value) -> Map<String, Value> {
    let mut info = Map::new();

    let Some(modules) = result.as_object() else {
        return info;
    };

    for module in modules.values() {
        let Some(fields) = module.as_object() else {
            continue;
        };
        for (name, value) in fields {
            if let Some(unwrapped) = unwrap_raw(value) {
                info.insert(name.clone(), unwrapped);
            }
        }
    }

    info
}

/// Parse the chart payload into daily closes, skipping null rows
fn parse_chart(result: &Value) -> Result<Vec<DailyClose>> {
    let timestamps = result
        .get("timestamp")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let closes = result
        .pointer("/indicators/quote/0/close")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let (Some(ts), Some(close)) = (ts.as_i64(), close.as_f64()) else {
            // Null close: holiday/partial row, skip it.
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        rows.push(DailyClose { date, close });
    }

    Ok(rows)
}

/// Parse incomeStatementHistory into yearly line items
fn parse_income_history(result: &Value) -> Vec<IncomePeriod> {
    let Some(statements) = result
        .pointer("/incomeStatementHistory/incomeStatementHistory")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    statements
        .iter()
        .filter_map(|statement| {
            let end_date = statement
                .pointer("/endDate/fmt")
                .and_then(Value::as_str)?;
            let year = end_date.get(..4)?.to_string();
            Some(IncomePeriod {
                year,
                net_income: statement.pointer("/netIncome/raw").and_then(Value::as_f64),
                total_revenue: statement
                    .pointer("/totalRevenue/raw")
                    .and_then(Value::as_f64),
            })
        })
        .collect()
}

/// Parse calendarEvents into earnings-calendar entries
fn parse_calendar(result: &Value) -> Vec<EarningsDate> {
    let Some(earnings) = result.pointer("/calendarEvents/earnings") else {
        return Vec::new();
    };

    let eps_estimate = earnings
        .pointer("/earningsAverage/raw")
        .and_then(Value::as_f64);

    let Some(dates) = earnings.get("earningsDate").and_then(Value::as_array) else {
        return Vec::new();
    };

    dates
        .iter()
        .filter_map(|entry| {
            let ts = entry.get("raw").and_then(Value::as_i64)?;
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(EarningsDate { date, eps_estimate })
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
