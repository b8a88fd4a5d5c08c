//! Credential-holding relay in front of an OpenAI-compatible provider.
//!
//! Front-ends talk to the proxy without a credential; the proxy adds its own
//! bearer token and forwards the request body upstream.  Routes:
//!
//! - `POST /v1/chat/completions` forwards the JSON body and relays the
//!   upstream status and body.  A transport failure becomes `502` with an
//!   OpenAI-style error object.
//! - `GET /healthz` answers `ok`.
//!
//! CORS is permissive so browser front-ends on any origin can call it.

use std::env;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use arrrg_derive::CommandLine;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use reqwest::header::HeaderValue;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use url::Url;

use crate::client::{API_KEY_ENV, parse_base_url};
use crate::error::{Error, Result};
use crate::observability::{PROXY_FORWARD_DURATION, PROXY_FORWARDS, PROXY_UPSTREAM_ERRORS};
use crate::types::ErrorResponse;

/// Address the proxy listens on by default.
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Provider the proxy forwards to by default.
pub const DEFAULT_UPSTREAM: &str = "https://api.groq.com/openai/v1/";

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Command-line arguments for the nyaai-proxy tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ProxyArgs {
    /// Listen address.
    #[arrrg(optional, "Address to listen on (default: 127.0.0.1:8787)", "ADDR")]
    pub bind: Option<String>,

    /// Upstream base URL.
    #[arrrg(optional, "Upstream base URL (default: https://api.groq.com/openai/v1/)", "URL")]
    pub upstream: Option<String>,

    /// Model forced onto every request.
    #[arrrg(optional, "Overwrite the model of every request", "MODEL")]
    pub model: Option<String>,
}

/// Resolved proxy configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Upstream base URL; `chat/completions` is resolved against it.
    pub upstream: Url,
    /// Model forced onto every request, if any.
    pub model: Option<String>,
    api_key: String,
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("bind", &self.bind)
            .field("upstream", &self.upstream.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ProxyConfig {
    /// Creates a configuration with default addresses and no model pin.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::authentication(format!(
                "the proxy needs a provider credential in {API_KEY_ENV}"
            )));
        }
        HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            Error::validation(
                "API key contains characters not allowed in a header",
                Some("api_key".to_string()),
            )
        })?;
        Ok(Self {
            bind: parse_bind(DEFAULT_BIND)?,
            upstream: parse_base_url(DEFAULT_UPSTREAM)?,
            model: None,
            api_key,
        })
    }

    /// Builds a configuration from arguments and the `NYAAI_API_KEY`
    /// environment variable.
    pub fn from_args(args: ProxyArgs) -> Result<Self> {
        let api_key = env::var(API_KEY_ENV).unwrap_or_default();
        Self::from_args_with_key(args, api_key)
    }

    /// Builds a configuration from arguments and an explicit credential.
    pub fn from_args_with_key(args: ProxyArgs, api_key: impl Into<String>) -> Result<Self> {
        let mut config = Self::new(api_key)?;
        if let Some(bind) = args.bind {
            config.bind = parse_bind(&bind)?;
        }
        if let Some(upstream) = args.upstream {
            config.upstream = parse_base_url(&upstream)?;
        }
        config.model = args.model.filter(|model| !model.trim().is_empty());
        Ok(config)
    }

    /// Sets the listen address.
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Sets the upstream base URL.
    pub fn with_upstream(mut self, upstream: &str) -> Result<Self> {
        self.upstream = parse_base_url(upstream)?;
        Ok(self)
    }

    /// Pins every request to `model`.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

fn parse_bind(bind: &str) -> Result<SocketAddr> {
    bind.parse().map_err(|_| {
        Error::validation(
            format!("invalid listen address: {bind}"),
            Some("bind".to_string()),
        )
    })
}

#[derive(Clone)]
struct ProxyState {
    client: reqwest::Client,
    endpoint: Url,
    authorization: HeaderValue,
    model: Option<String>,
}

/// Builds the proxy's routes.
pub fn router(config: &ProxyConfig) -> Result<Router> {
    let client = reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .build()
        .map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;
    let mut authorization = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
        .map_err(|_| {
            Error::validation(
                "API key contains characters not allowed in a header",
                Some("api_key".to_string()),
            )
        })?;
    authorization.set_sensitive(true);
    let state = ProxyState {
        client,
        endpoint: config.upstream.join("chat/completions")?,
        authorization,
        model: config.model.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state))
}

/// A running proxy.
pub struct ProxyServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ProxyServer {
    /// Binds `config.bind` (port `0` picks a free port) and serves in a
    /// background task.
    pub async fn start(config: &ProxyConfig) -> Result<Self> {
        let app = router(config)?;
        let listener = TcpListener::bind(config.bind)
            .await
            .map_err(|e| Error::io(format!("failed to bind {}", config.bind), e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| Error::io("failed to get local address", e))?;

        log::info!(
            "proxy listening on http://{addr}/v1 forwarding to {}",
            config.upstream
        );
        if let Some(model) = &config.model {
            log::info!("pinning requests to model {model}");
        }

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("proxy server error: {e}");
            }
        });
        Ok(Self { addr, handle })
    }

    /// Returns the address the proxy is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ProxyServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn healthz() -> &'static str {
    "ok"
}

fn error_response(status: StatusCode, message: impl Into<String>, error_type: &str) -> Response {
    (status, Json(ErrorResponse::new(message, error_type))).into_response()
}

async fn chat_completions(State(state): State<ProxyState>, body: Bytes) -> Response {
    PROXY_FORWARDS.click();
    let mut request: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("request body is not valid JSON: {e}"),
                "invalid_request_error",
            );
        }
    };
    let Some(fields) = request.as_object_mut() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "request body must be a JSON object",
            "invalid_request_error",
        );
    };
    if let Some(model) = &state.model {
        fields.insert("model".to_string(), serde_json::Value::String(model.clone()));
    }

    let start = Instant::now();
    let result = forward(&state, &request).await;
    PROXY_FORWARD_DURATION.add(start.elapsed().as_secs_f64());
    match result {
        Ok((status, body)) => {
            if !status.is_success() {
                log::warn!("upstream answered {status}");
            }
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            PROXY_UPSTREAM_ERRORS.click();
            log::error!("upstream request failed: {e}");
            error_response(
                StatusCode::BAD_GATEWAY,
                "Failed to reach the completion provider.",
                "upstream_error",
            )
        }
    }
}

async fn forward(
    state: &ProxyState,
    request: &serde_json::Value,
) -> std::result::Result<(StatusCode, Vec<u8>), reqwest::Error> {
    let response = state
        .client
        .post(state.endpoint.clone())
        .header(reqwest::header::AUTHORIZATION, state.authorization.clone())
        .json(request)
        .send()
        .await?;
    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let body = response.bytes().await?;
    Ok((status, body.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_is_rejected() {
        let err = ProxyConfig::from_args_with_key(ProxyArgs::default(), "").unwrap_err();
        assert!(err.is_authentication());
        assert!(ProxyConfig::new("bad\nkey").unwrap_err().is_validation());
    }

    #[test]
    fn defaults() {
        let config = ProxyConfig::from_args_with_key(ProxyArgs::default(), "k").unwrap();
        assert_eq!(config.bind, "127.0.0.1:8787".parse::<SocketAddr>().unwrap());
        assert_eq!(config.upstream.as_str(), DEFAULT_UPSTREAM);
        assert_eq!(config.model, None);
    }

    #[test]
    fn args_override_defaults() {
        let args = ProxyArgs {
            bind: Some("0.0.0.0:9000".to_string()),
            upstream: Some("http://localhost:11434/v1".to_string()),
            model: Some("llama-3.1-8b-instant".to_string()),
        };
        let config = ProxyConfig::from_args_with_key(args, "k").unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.upstream.as_str(), "http://localhost:11434/v1/");
        assert_eq!(config.model.as_deref(), Some("llama-3.1-8b-instant"));

        let args = ProxyArgs {
            bind: Some("nowhere".to_string()),
            ..ProxyArgs::default()
        };
        assert!(ProxyConfig::from_args_with_key(args, "k").is_err());
    }

    #[test]
    fn debug_hides_key() {
        let config = ProxyConfig::new("top-secret").unwrap();
        assert!(!format!("{config:?}").contains("top-secret"));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_bad_gateway() {
        let config = ProxyConfig::new("k")
            .unwrap()
            .with_upstream("http://127.0.0.1:9/v1/")
            .unwrap();
        let app = router(&config).unwrap();
        let client = reqwest::Client::new();
        let server = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            addr
        };
        let response = client
            .post(format!("http://{server}/v1/chat/completions"))
            .body(r#"{"model":"m","messages":[]}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 502);
        let body: ErrorResponse = response.json().await.unwrap();
        assert_eq!(body.error.error_type.as_deref(), Some("upstream_error"));

        let response = client
            .post(format!("http://{server}/v1/chat/completions"))
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);

        let health = client
            .get(format!("http://{server}/healthz"))
            .send()
            .await
            .unwrap();
        assert_eq!(health.text().await.unwrap(), "ok");
    }
}
