//! Market data provider trait definition

use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One trading day's closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

/// One fiscal period's income-statement line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomePeriod {
    /// Fiscal year, e.g. "2024"
    pub year: String,
    /// Net income for the period, when reported
    pub net_income: Option<f64>,
    /// Total revenue for the period, when reported
    pub total_revenue: Option<f64>,
}

/// One earnings-calendar entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarningsDate {
    /// Scheduled (or past) reporting date
    pub date: NaiveDate,
    /// Consensus EPS estimate, when published
    pub eps_estimate: Option<f64>,
}

/// Trait for financial-data providers
///
/// Implementations fetch raw per-symbol data; all shaping (date-range
/// resolution, metric translation, truncation, filtering) happens in the
/// gateway above this seam. Each method covers one provider capability and
/// is independent of the others.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily closing prices for a symbol over `[start, end]`
    ///
    /// An empty result means the symbol had no trading data in the range,
    /// which is not itself an error.
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>>;

    /// Flat field-name to value map of company info and metrics
    async fn info(&self, symbol: &str) -> Result<serde_json::Map<String, Value>>;

    /// Recent news items, provider-ordered (most recent first), raw shape
    async fn news(&self, symbol: &str) -> Result<Vec<Value>>;

    /// Yearly income-statement line items, most recent first
    async fn income_statements(&self, symbol: &str) -> Result<Vec<IncomePeriod>>;

    /// Earnings-calendar entries (past and scheduled)
    async fn earnings_dates(&self, symbol: &str) -> Result<Vec<EarningsDate>>;

    /// Get the provider name (e.g., "yahoo")
    fn name(&self) -> &str;
}
