//! Market data gateway for marketq
//!
//! This crate is a thin adapter over an external financial-data provider.
//! It fetches, per ticker symbol:
//!
//! - historical daily closing prices
//! - point-in-time company info and metrics
//! - recent news items
//! - earnings history and upcoming earnings dates
//!
//! The provider sits behind the [`MarketDataProvider`] trait so gateway
//! logic (date resolution, metric-name translation, result shaping) is
//! testable without network access; [`YahooClient`] is the production
//! implementation. No data is cached or derived: every call goes to the
//! provider and results are passed through with minimal reshaping.

pub mod error;
pub mod gateway;
pub mod provider;
pub mod yahoo;

// Re-export main types
pub use error::{DataError, Result};
pub use gateway::{
    EarningsReport, HistoricalEarnings, MarketDataGateway, MetricValue, SymbolOutcome,
    UpcomingEarnings,
};
pub use provider::{DailyClose, EarningsDate, IncomePeriod, MarketDataProvider};
pub use yahoo::YahooClient;
