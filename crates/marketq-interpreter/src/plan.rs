//! Action plan data model
//!
//! An [`ActionPlan`] is the validated output of one interpretation call. It
//! lives for a single request/response exchange: built from the completion
//! reply, normalized, serialized back to the client, and discarded.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Metric names injected when a metrics action arrives without any
pub const FALLBACK_METRICS: [&str; 6] = [
    "marketCap",
    "trailingPE",
    "forwardPE",
    "dividendYield",
    "fiftyTwoWeekHigh",
    "fiftyTwoWeekLow",
];

/// Sentinel end date meaning "resolve to today at fetch time"
pub const CURRENT_SENTINEL: &str = "current";

/// Kind of data fetch an action asks for
///
/// The set of values the completion service emits has drifted over prompt
/// revisions, so this is an open enum: unrecognized values are carried as
/// [`ActionType::Other`] and flagged during validation rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    /// Latest price quote
    GetPrice,
    /// Historical price series (also used for graph/chart requests)
    GetHistory,
    /// Recent news items
    GetNews,
    /// Company financial metrics
    GetMetrics,
    /// Side-by-side comparison of several symbols
    Compare,
    /// Earnings history and upcoming earnings dates
    GetEarnings,
    /// Unrecognized action type, preserved verbatim
    Other(String),
}

impl ActionType {
    /// Wire name of this action type
    pub fn as_str(&self) -> &str {
        match self {
            Self::GetPrice => "getPrice",
            Self::GetHistory => "getHistory",
            Self::GetNews => "getNews",
            Self::GetMetrics => "getMetrics",
            Self::Compare => "compare",
            Self::GetEarnings => "getEarnings",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ActionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "getPrice" => Self::GetPrice,
            "getHistory" => Self::GetHistory,
            "getNews" => Self::GetNews,
            "getMetrics" => Self::GetMetrics,
            "compare" => Self::Compare,
            "getEarnings" => Self::GetEarnings,
            _ => Self::Other(value),
        }
    }
}

impl From<ActionType> for String {
    fn from(value: ActionType) -> Self {
        value.as_str().to_string()
    }
}

/// One data-fetch action within a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// What to fetch
    #[serde(rename = "type")]
    pub action_type: ActionType,

    /// Ticker symbols this action covers (order-preserving, never empty)
    pub symbols: Vec<String>,

    /// Range start, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// Range end, `YYYY-MM-DD` or the literal `"current"`
    ///
    /// The sentinel is emitted verbatim; data-fetch consumers resolve it to
    /// their own "today", never the interpreter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    /// Requested metric names (meaningful for metrics actions only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
}

/// A significant date attached to the plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDate {
    /// Event date, `YYYY-MM-DD`
    pub date: String,

    /// What happened
    pub description: String,

    /// Ticker the event relates to
    pub symbol: String,
}

/// Validated output of one interpretation call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    /// Data-fetch actions in the priority order the model assigned
    #[serde(default)]
    pub actions: Vec<Action>,

    /// Free-text summary of how the query was interpreted
    #[serde(default)]
    pub description: String,

    /// Significant dates, independent of which actions are present
    #[serde(default)]
    pub key_dates: Vec<KeyDate>,
}

impl ActionPlan {
    /// Enforce structural invariants and fill in defaults
    ///
    /// - every action must name at least one symbol;
    /// - metrics actions with no metric list get [`FALLBACK_METRICS`];
    /// - unrecognized action types are logged but kept.
    pub fn normalize(&mut self) -> Result<(), String> {
        for action in &mut self.actions {
            if action.symbols.iter().all(|s| s.trim().is_empty()) {
                return Err(format!(
                    "action '{}' carries no symbols",
                    action.action_type.as_str()
                ));
            }

            if let ActionType::Other(name) = &action.action_type {
                warn!(action_type = %name, "unrecognized action type in plan");
            }

            if action.action_type == ActionType::GetMetrics && action.metrics.is_empty() {
                action.metrics = FALLBACK_METRICS.iter().map(ToString::to_string).collect();
            }
        }
        Ok(())
    }
}
