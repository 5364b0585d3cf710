//! marketq HTTP API server
//!
//! Wires the query interpreter and the market data gateway into the HTTP
//! surface. All external collaborators are constructed once here and passed
//! in explicitly; the handlers hold no hidden globals.

mod error;
mod routes;
mod settings;

use anyhow::Context;
use marketq_data::{MarketDataGateway, YahooClient};
use marketq_interpreter::QueryInterpreter;
use marketq_llm::OpenAiProvider;
use routes::AppState;
use settings::Settings;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    marketq_utils::init_tracing();

    let settings = Settings::from_env()?;

    let completion = Arc::new(
        OpenAiProvider::from_env().context("completion service configuration")?,
    );
    let interpreter = Arc::new(QueryInterpreter::new(completion, settings.model.clone()));
    let gateway = Arc::new(MarketDataGateway::new(Arc::new(YahooClient::new()?)));

    let state = AppState {
        interpreter,
        gateway,
    };

    let app = routes::router(state)
        .layer(settings.cors_layer())
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!(%addr, model = %settings.model, "marketq listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
