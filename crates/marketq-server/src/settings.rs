//! Environment-driven server settings

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Server settings loaded from the environment
///
/// The completion-service credentials are read separately by
/// `OpenAiConfig::from_env`; this covers everything else.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listening port (`PORT`, default 8000)
    pub port: u16,

    /// Completion model for the interpreter (`MARKETQ_MODEL`)
    pub model: String,

    /// CORS allow-list (`ALLOWED_ORIGINS`, comma-separated).
    /// `None` means development mode: any origin is allowed.
    pub allowed_origins: Option<Vec<String>>,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(
            std::env::var("PORT").ok(),
            std::env::var("MARKETQ_MODEL").ok(),
            std::env::var("ALLOWED_ORIGINS").ok(),
        )
    }

    fn from_vars(
        port: Option<String>,
        model: Option<String>,
        allowed_origins: Option<String>,
    ) -> anyhow::Result<Self> {
        let port = match port {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT is not a valid port number: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let allowed_origins = match allowed_origins {
            Some(raw) if !raw.trim().is_empty() && raw.trim() != "*" => Some(
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect(),
            ),
            _ => None,
        };

        Ok(Self {
            port,
            model,
            allowed_origins,
        })
    }

    /// Build the CORS layer: allow-any for development, exact-match
    /// allow-list for production deployments.
    pub fn cors_layer(&self) -> CorsLayer {
        match &self.allowed_origins {
            None => CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
            Some(origins) => {
                let parsed: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|origin| {
                        let value = origin.parse().ok();
                        if value.is_none() {
                            warn!(origin = %origin, "ignoring unparseable allowed origin");
                        }
                        value
                    })
                    .collect();
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(parsed))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_vars(None, None, None).unwrap();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.model, "gpt-4o-mini");
        assert!(settings.allowed_origins.is_none());
    }

    #[test]
    fn origin_list_parses_csv() {
        let settings = Settings::from_vars(
            Some("3000".to_string()),
            Some("gpt-4o".to_string()),
            Some("https://app.example.com, https://admin.example.com".to_string()),
        )
        .unwrap();

        assert_eq!(settings.port, 3000);
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(
            settings.allowed_origins,
            Some(vec![
                "https://app.example.com".to_string(),
                "https://admin.example.com".to_string(),
            ])
        );
    }

    #[test]
    fn wildcard_means_development_mode() {
        let settings = Settings::from_vars(None, None, Some("*".to_string())).unwrap();
        assert!(settings.allowed_origins.is_none());
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(Settings::from_vars(Some("not-a-port".to_string()), None, None).is_err());
    }
}
