//! HTTP routes and handlers
//!
//! Pure shaping layer: query parameters in, gateway/interpreter calls out,
//! JSON back. The only logic here is comma-list splitting and
//! required-parameter checks; date resolution and result shaping live in
//! the gateway.

use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use marketq_data::gateway::{EarningsResult, MetricsResult, PriceSeries};
use marketq_data::MarketDataGateway;
use marketq_interpreter::{ActionPlan, QueryInterpreter};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Shared per-process state, injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub interpreter: Arc<QueryInterpreter>,
    pub gateway: Arc<MarketDataGateway>,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/stock_data", get(stock_data))
        .route("/api/stock_metrics", get(stock_metrics))
        .route("/api/process_query", post(process_query))
        .route("/api/stock_news", get(stock_news))
        .route("/api/stock_earnings", get(stock_earnings))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Split a comma-separated parameter, dropping empty segments
fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn require(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("no {name} provided"))),
    }
}

#[derive(Debug, Deserialize)]
struct StockDataParams {
    symbols: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

async fn stock_data(
    State(state): State<AppState>,
    Query(params): Query<StockDataParams>,
) -> Result<Json<PriceSeries>, ApiError> {
    let symbols = split_csv(&require(params.symbols, "symbols")?);
    let start_date = require(params.start_date, "start_date")?;
    let end_date = require(params.end_date, "end_date")?;
    info!(symbols = ?symbols, %start_date, %end_date, "stock_data request");

    let series = state
        .gateway
        .price_series(&symbols, &start_date, &end_date)
        .await?;
    Ok(Json(series))
}

#[derive(Debug, Deserialize)]
struct StockMetricsParams {
    symbols: Option<String>,
    metrics: Option<String>,
}

async fn stock_metrics(
    State(state): State<AppState>,
    Query(params): Query<StockMetricsParams>,
) -> Result<Json<MetricsResult>, ApiError> {
    let symbols = split_csv(&require(params.symbols, "symbols")?);
    let metrics = split_csv(&require(params.metrics, "metrics")?);
    info!(symbols = ?symbols, metrics = ?metrics, "stock_metrics request");

    let result = state.gateway.metrics(&symbols, &metrics).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    #[serde(default)]
    query: String,
}

async fn process_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ActionPlan>, ApiError> {
    info!(query_len = request.query.len(), "process_query request");

    let plan = state.interpreter.interpret(&request.query).await?;
    Ok(Json(plan))
}

#[derive(Debug, Deserialize)]
struct StockNewsParams {
    symbol: Option<String>,
}

async fn stock_news(
    State(state): State<AppState>,
    Query(params): Query<StockNewsParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let symbol = params.symbol.unwrap_or_default();
    info!(%symbol, "stock_news request");

    let items = state.gateway.news(&symbol).await?;
    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
struct StockEarningsParams {
    symbols: Option<String>,
}

async fn stock_earnings(
    State(state): State<AppState>,
    Query(params): Query<StockEarningsParams>,
) -> Result<Json<EarningsResult>, ApiError> {
    let symbols = split_csv(&require(params.symbols, "symbols")?);
    info!(symbols = ?symbols, "stock_earnings request");

    let result = state.gateway.earnings(&symbols).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::NaiveDate;
    use marketq_data::{DailyClose, DataError, EarningsDate, IncomePeriod, MarketDataProvider};
    use marketq_llm::{
        CompletionRequest, CompletionResponse, LlmProvider, StopReason, TokenUsage,
    };
    use mockall::mock;
    use serde_json::json;
    use tower::util::ServiceExt;

    mock! {
        Llm {}

        #[async_trait]
        impl LlmProvider for Llm {
            async fn complete(
                &self,
                request: CompletionRequest,
            ) -> marketq_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    mock! {
        Data {}

        #[async_trait]
        impl MarketDataProvider for Data {
            async fn daily_closes(
                &self,
                symbol: &str,
                start: NaiveDate,
                end: NaiveDate,
            ) -> marketq_data::Result<Vec<DailyClose>>;
            async fn info(
                &self,
                symbol: &str,
            ) -> marketq_data::Result<serde_json::Map<String, Value>>;
            async fn news(&self, symbol: &str) -> marketq_data::Result<Vec<Value>>;
            async fn income_statements(
                &self,
                symbol: &str,
            ) -> marketq_data::Result<Vec<IncomePeriod>>;
            async fn earnings_dates(
                &self,
                symbol: &str,
            ) -> marketq_data::Result<Vec<EarningsDate>>;
            fn name(&self) -> &str;
        }
    }

    fn app(llm: MockLlm, data: MockData) -> Router {
        let state = AppState {
            interpreter: Arc::new(QueryInterpreter::new(Arc::new(llm), "gpt-4o-mini")),
            gateway: Arc::new(MarketDataGateway::new(Arc::new(data))),
        };
        router(state)
    }

    fn llm_reply(content: &'static str) -> MockLlm {
        let mut llm = MockLlm::new();
        llm.expect_complete().returning(move |_| {
            Ok(CompletionResponse {
                content: content.to_string(),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage {
                    input_tokens: 500,
                    output_tokens: 100,
                },
            })
        });
        llm
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn healthz_responds() {
        let app = app(MockLlm::new(), MockData::new());
        let response = app
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stock_data_returns_keyed_series() {
        let mut data = MockData::new();
        data.expect_daily_closes().returning(|_, _, _| {
            Ok(vec![DailyClose {
                date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
                close: 125.07,
            }])
        });

        let app = app(MockLlm::new(), data);
        let response = app
            .oneshot(
                Request::get(
                    "/api/stock_data?symbols=AAPL&start_date=2023-01-01&end_date=2023-01-31",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["AAPL"]["2023-01-03"], 125.07);
    }

    #[tokio::test]
    async fn stock_data_requires_symbols() {
        let app = app(MockLlm::new(), MockData::new());
        let response = app
            .oneshot(
                Request::get("/api/stock_data?start_date=2023-01-01&end_date=2023-01-31")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("symbols"));
    }

    #[tokio::test]
    async fn stock_data_rejects_bad_dates() {
        let app = app(MockLlm::new(), MockData::new());
        let response = app
            .oneshot(
                Request::get("/api/stock_data?symbols=AAPL&start_date=yesterday&end_date=current")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stock_metrics_marks_missing_fields() {
        let mut data = MockData::new();
        data.expect_info().returning(|_| {
            let mut info = serde_json::Map::new();
            info.insert("marketCap".to_string(), json!(2.75e12));
            Ok(info)
        });

        let app = app(MockLlm::new(), data);
        let response = app
            .oneshot(
                Request::get("/api/stock_metrics?symbols=AAPL&metrics=marketCap,invalidMetric")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["AAPL"]["marketCap"], 2.75e12);
        assert_eq!(body["AAPL"]["invalidMetric"], "N/A");
    }

    #[tokio::test]
    async fn process_query_returns_plan() {
        let llm = llm_reply(
            r#"{"actions":[{"type":"getHistory","symbols":["TSLA"],"startDate":"2020-01-15","endDate":"2020-07-15"}],"description":"Tesla during covid","keyDates":[]}"#,
        );

        let app = app(llm, MockData::new());
        let response = app
            .oneshot(
                Request::post("/api/process_query")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"query":"Show me Tesla's stock graph during covid"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["actions"][0]["type"], "getHistory");
        assert_eq!(body["actions"][0]["symbols"][0], "TSLA");
        assert!(body["description"].is_string());
    }

    #[tokio::test]
    async fn process_query_rejects_empty_query() {
        let app = app(MockLlm::new(), MockData::new());
        let response = app
            .oneshot(
                Request::post("/api/process_query")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"query":"  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn process_query_hides_interpretation_detail() {
        let llm = llm_reply("the model refused and said something embarrassing");

        let app = app(llm, MockData::new());
        let response = app
            .oneshot(
                Request::post("/api/process_query")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"query":"show me AAPL"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to process query");
    }

    #[tokio::test]
    async fn stock_news_truncates_and_validates() {
        let mut data = MockData::new();
        data.expect_news().returning(|_| {
            Ok((0..12).map(|i| json!({"title": format!("item {i}")})).collect())
        });

        let app_ok = app(MockLlm::new(), data);
        let response = app_ok
            .oneshot(
                Request::get("/api/stock_news?symbol=AAPL")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 8);

        let app_blank = app(MockLlm::new(), MockData::new());
        let response = app_blank
            .oneshot(Request::get("/api/stock_news").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stock_news_maps_missing_data_to_404() {
        let mut data = MockData::new();
        data.expect_news().returning(|symbol| {
            Err(DataError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "symbol may be delisted".to_string(),
            })
        });

        let app = app(MockLlm::new(), data);
        let response = app
            .oneshot(
                Request::get("/api/stock_news?symbol=BOGUS")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stock_earnings_shapes_report() {
        let mut data = MockData::new();
        data.expect_income_statements().returning(|_| {
            Ok(vec![IncomePeriod {
                year: "2024".to_string(),
                net_income: Some(93_736_000_000.0),
                total_revenue: Some(391_035_000_000.0),
            }])
        });
        data.expect_earnings_dates().returning(|_| Ok(vec![]));

        let app = app(MockLlm::new(), data);
        let response = app
            .oneshot(
                Request::get("/api/stock_earnings?symbols=AAPL")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["AAPL"]["historical"][0]["year"], "2024");
        assert!(body["AAPL"]["upcoming"].as_array().unwrap().is_empty());
    }

    #[test]
    fn split_csv_trims_and_drops_empties() {
        assert_eq!(split_csv("AAPL, MSFT ,,GOOG"), vec!["AAPL", "MSFT", "GOOG"]);
        assert!(split_csv(" , ").is_empty());
    }
}
