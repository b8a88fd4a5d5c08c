use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{ChatCompletion, ChatCompletionRequest, ErrorResponse};

/// Where the chat client sends requests unless told otherwise: a local
/// `nyaai-proxy`, which holds the provider credential.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8787/v1/";
/// Environment variable holding a bearer credential.
pub const API_KEY_ENV: &str = "NYAAI_API_KEY";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// The client issues exactly one non-streaming POST per call and never
/// retries.  A bearer credential is optional: when pointed at `nyaai-proxy`
/// the proxy supplies it.
#[derive(Clone)]
pub struct CompletionClient {
    api_key: Option<String>,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("has_api_key", &self.api_key.is_some())
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CompletionClient {
    /// Create a client for the default proxy address.
    ///
    /// The credential can be provided directly or read from the
    /// `NYAAI_API_KEY` environment variable; its absence is not an error.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key
            .or_else(|| env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty());
        let base_url = parse_base_url(base_url.unwrap_or(DEFAULT_BASE_URL))?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attaches a logger that sees every request and response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns true if requests carry a bearer credential.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
                Error::validation(
                    "API key contains characters not allowed in a header",
                    Some("api_key".to_string()),
                )
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        match serde_json::from_str::<ErrorResponse>(&error_body) {
            Ok(parsed) => Error::from_status(
                status_code,
                parsed.error.error_type,
                parsed.error.message,
                parsed.error.param,
                retry_after,
            ),
            Err(_) => Error::from_status(status_code, None, error_body, None, retry_after),
        }
    }

    /// Send a chat-completion request and wait for the whole reply.
    pub async fn send(&self, request: &ChatCompletionRequest) -> Result<ChatCompletion> {
        CLIENT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }
        let start = Instant::now();
        let result = self.send_inner(request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        match &result {
            Ok(completion) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(completion);
                }
            }
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                if let Some(logger) = &self.logger {
                    logger.log_error(err);
                }
            }
        }
        result
    }

    async fn send_inner(&self, request: &ChatCompletionRequest) -> Result<ChatCompletion> {
        let url = self.base_url.join("chat/completions")?;

        let response = self
            .client
            .post(url)
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<ChatCompletion>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

/// Parses a base URL, making sure relative joins append to its path.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if url.cannot_be_a_base() {
        return Err(Error::url(format!("{base_url} cannot be a base URL"), None));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
