//! Gateway operations over an injected market data provider
//!
//! All operations are idempotent reads. Multi-symbol operations fan out one
//! provider call per symbol and re-key the results by symbol; a provider
//! failure for one symbol is recorded inline as a [`SymbolOutcome::Failed`]
//! entry and never blocks the remaining symbols (partial success).

use crate::error::{DataError, Result};
use crate::provider::MarketDataProvider;
use chrono::{Local, NaiveDate};
use futures::future::{join_all, try_join};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{instrument, warn};

/// End-date sentinel resolved to the server's current date at fetch time
pub const CURRENT_SENTINEL: &str = "current";

/// News responses are truncated to this many items
const MAX_NEWS_ITEMS: usize = 8;

/// Display names older clients send, translated before raw field lookup
const LEGACY_METRIC_NAMES: &[(&str, &str)] = &[
    ("P/E", "trailingPE"),
    ("EPS", "trailingEps"),
    ("Market Cap", "marketCap"),
    ("Dividend Yield", "dividendYield"),
    ("52 Week High", "fiftyTwoWeekHigh"),
    ("52 Week Low", "fiftyTwoWeekLow"),
];

/// Per-symbol result under the partial-success policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolOutcome<T> {
    /// Provider failure for this symbol, recorded inline
    Failed {
        /// Provider error message
        error: String,
    },
    /// Successful fetch
    Data(T),
}

/// A single metric value: number, stringified provider field, or `"N/A"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Numeric provider field, passed through
    Number(f64),
    /// Non-numeric provider field, stringified (also carries `"N/A"`)
    Text(String),
}

impl MetricValue {
    /// Marker for a metric the provider does not expose for a symbol
    pub fn not_available() -> Self {
        Self::Text("N/A".to_string())
    }

    /// Convert a raw provider field into a metric value
    fn from_provider(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Mapping ticker -> date -> closing price
pub type PriceSeries = BTreeMap<String, SymbolOutcome<BTreeMap<String, f64>>>;

/// Mapping ticker -> metric name -> value
pub type MetricsResult = BTreeMap<String, SymbolOutcome<BTreeMap<String, MetricValue>>>;

/// Mapping ticker -> earnings report
pub type EarningsResult = BTreeMap<String, SymbolOutcome<EarningsReport>>;

/// One fiscal year's reported earnings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEarnings {
    /// Fiscal year
    pub year: String,
    /// Net income for the period
    pub earnings: f64,
    /// Total revenue for the period (0 when not reported)
    pub revenue: f64,
}

/// One scheduled future earnings report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEarnings {
    /// Reporting date, `YYYY-MM-DD`, strictly in the future
    pub date: String,
    /// Consensus EPS estimate
    pub eps_estimate: f64,
    /// Always absent: the provider publishes no revenue estimates
    pub revenue_estimate: Option<f64>,
}

/// Earnings history plus upcoming report dates for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsReport {
    /// Past fiscal years, most recent first
    pub historical: Vec<HistoricalEarnings>,
    /// Strictly-future reporting dates with a published EPS estimate
    pub upcoming: Vec<UpcomingEarnings>,
}

/// Resolve a raw date-range pair, mapping the `"current"` end sentinel to
/// `today` and rejecting inverted ranges.
pub fn resolve_range(
    start_date: &str,
    end_date: &str,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let start = parse_date(start_date)?;
    let end = if end_date == CURRENT_SENTINEL {
        today
    } else {
        parse_date(end_date)?
    };

    if start > end {
        return Err(DataError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    Ok((start, end))
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| DataError::InvalidDate(text.to_string()))
}

/// Translate a legacy display name to the provider field name
fn resolve_metric_name(name: &str) -> &str {
    LEGACY_METRIC_NAMES
        .iter()
        .find(|(display, _)| *display == name)
        .map_or(name, |(_, field)| *field)
}

/// The market data gateway
///
/// Stateless apart from the injected provider handle; safe to share across
/// requests behind an `Arc`.
pub struct MarketDataGateway {
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketDataGateway {
    /// Create a gateway over the given provider
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Historical closing prices per symbol over `[start_date, end_date]`
    ///
    /// `end_date` may be the literal `"current"`, resolved to the server's
    /// local date before querying. An empty series for a symbol is a valid
    /// result (no trading data in range), not an error.
    #[instrument(skip(self))]
    pub async fn price_series(
        &self,
        symbols: &[String],
        start_date: &str,
        end_date: &str,
    ) -> Result<PriceSeries> {
        let (start, end) = resolve_range(start_date, end_date, Local::now().date_naive())?;

        let fetches = symbols.iter().map(|symbol| async move {
            let outcome = match self.provider.daily_closes(symbol, start, end).await {
                Ok(closes) => SymbolOutcome::Data(
                    closes
                        .into_iter()
                        .map(|c| (c.date.format("%Y-%m-%d").to_string(), c.close))
                        .collect::<BTreeMap<_, _>>(),
                ),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "price series fetch failed");
                    SymbolOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            (symbol.clone(), outcome)
        });

        Ok(join_all(fetches).await.into_iter().collect())
    }

    /// Requested metrics per symbol
    ///
    /// Numeric provider fields pass through as numbers, other field types
    /// are stringified, and a metric the provider does not expose for a
    /// symbol maps to `"N/A"` — an unrecognized metric name never fails the
    /// call. Legacy display names (`"P/E"`, `"Market Cap"`, ...) are
    /// translated before lookup.
    #[instrument(skip(self))]
    pub async fn metrics(
        &self,
        symbols: &[String],
        metric_names: &[String],
    ) -> Result<MetricsResult> {
        let fetches = symbols.iter().map(|symbol| async move {
            let outcome = match self.provider.info(symbol).await {
                Ok(info) => {
                    let values = metric_names
                        .iter()
                        .map(|name| {
                            let field = resolve_metric_name(name);
                            let value = info
                                .get(field)
                                .map_or_else(MetricValue::not_available, MetricValue::from_provider);
                            (name.clone(), value)
                        })
                        .collect::<BTreeMap<_, _>>();
                    SymbolOutcome::Data(values)
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "info fetch failed");
                    SymbolOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            (symbol.clone(), outcome)
        });

        Ok(join_all(fetches).await.into_iter().collect())
    }

    /// Most recent news for a symbol, provider order, at most 8 items
    #[instrument(skip(self))]
    pub async fn news(&self, symbol: &str) -> Result<Vec<Value>> {
        if symbol.trim().is_empty() {
            return Err(DataError::EmptySymbol);
        }

        let mut items = self.provider.news(symbol).await?;
        items.truncate(MAX_NEWS_ITEMS);
        Ok(items)
    }

    /// Earnings history and upcoming report dates per symbol
    #[instrument(skip(self))]
    pub async fn earnings(&self, symbols: &[String]) -> Result<EarningsResult> {
        let today = Local::now().date_naive();

        let fetches = symbols.iter().map(|symbol| async move {
            let outcome = match self.fetch_earnings(symbol, today).await {
                Ok(report) => SymbolOutcome::Data(report),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "earnings fetch failed");
                    SymbolOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            (symbol.clone(), outcome)
        });

        Ok(join_all(fetches).await.into_iter().collect())
    }

    async fn fetch_earnings(&self, symbol: &str, today: NaiveDate) -> Result<EarningsReport> {
        let (statements, dates) = try_join(
            self.provider.income_statements(symbol),
            self.provider.earnings_dates(symbol),
        )
        .await?;

        let historical = statements
            .into_iter()
            .filter_map(|period| {
                // A period with no net-income figure is skipped.
                let earnings = period.net_income?;
                Some(HistoricalEarnings {
                    year: period.year,
                    earnings,
                    revenue: period.total_revenue.unwrap_or(0.0),
                })
            })
            .collect();

        let upcoming = dates
            .into_iter()
            .filter_map(|entry| {
                if entry.date <= today {
                    return None;
                }
                let eps_estimate = entry.eps_estimate?;
                Some(UpcomingEarnings {
                    date: entry.date.format("%Y-%m-%d").to_string(),
                    eps_estimate,
                    revenue_estimate: None,
                })
            })
            .collect();

        Ok(EarningsReport {
            historical,
            upcoming,
        })
    }
}
