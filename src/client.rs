use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde_json::Value;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{AnalysisBundle, ChatReply, ChatRequest};

const DEFAULT_API_URL: &str = "http://localhost:3001/api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable that overrides the backend base URL.
pub const API_URL_ENV: &str = "THINKCHAT_API_URL";

/// Source of assistant replies.
#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Sends the user's message and returns the reply text.
    async fn send_message(&self, text: &str) -> Result<String>;
}

/// Source of sidebar analysis content.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches the latest generated analysis.
    async fn fetch_generated_content(&self) -> Result<AnalysisBundle>;
}

/// Client for the analysis backend.
#[derive(Clone)]
pub struct Backend {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Backend {
    /// Create a new backend client.
    ///
    /// The base URL is read from the THINKCHAT_API_URL environment variable,
    /// falling back to a backend on localhost.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = normalize_base_url(&base_url)?;

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
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attaches a logger that observes every request.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create and return default headers for backend requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Process error responses and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        match response.text().await {
            Ok(body) => error_from_status(status_code, &body, retry_after),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }

    /// Send a message to the chat endpoint.
    pub async fn chat(&self, text: &str) -> Result<ChatReply> {
        let url = self.endpoint("chat")?;
        let request = ChatRequest::new(text);
        if let Some(logger) = &self.logger {
            let body = serde_json::to_string(&request)?;
            logger.log_request("chat", Some(&body));
        }

        let result = self.execute_chat(url, &request).await;
        match &result {
            Ok(reply) => {
                if let Some(logger) = &self.logger {
                    logger.log_reply(reply);
                }
            }
            Err(err) => self.record_error("chat", err),
        }
        result
    }

    /// Fetch the generated analysis from the processing endpoint.
    pub async fn process(&self) -> Result<AnalysisBundle> {
        let url = self.endpoint("process")?;
        if let Some(logger) = &self.logger {
            logger.log_request("process", None);
        }

        let result = self.execute_process(url).await;
        match &result {
            Ok(bundle) => {
                if let Some(logger) = &self.logger {
                    logger.log_content(bundle);
                }
            }
            Err(err) => self.record_error("process", err),
        }
        result
    }

    async fn execute_chat(&self, url: Url, request: &ChatRequest) -> Result<ChatReply> {
        let start = Instant::now();
        CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<ChatReply>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    async fn execute_process(&self, url: Url) -> Result<AnalysisBundle> {
        let start = Instant::now();
        CLIENT_REQUESTS.click();
        let response = self
            .client
            .get(url)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<AnalysisBundle>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
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
    }

    fn record_error(&self, endpoint: &str, err: &Error) {
        CLIENT_REQUEST_ERRORS.click();
        if let Some(logger) = &self.logger {
            logger.log_error(endpoint, err);
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

#[async_trait]
impl ReplySource for Backend {
    async fn send_message(&self, text: &str) -> Result<String> {
        self.chat(text).await.map(ChatReply::into_text)
    }
}

#[async_trait]
impl ContentSource for Backend {
    async fn fetch_generated_content(&self) -> Result<AnalysisBundle> {
        self.process().await
    }
}

/// Parses a base URL, making sure relative endpoints resolve beneath it.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let url = Url::parse(&raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::validation(
            format!("unsupported URL scheme {scheme:?}"),
            Some("api_url".to_string()),
        )),
    }
}

/// Maps a non-success status and its body to an error.
///
/// The backend reports failures as `{"error": "..."}`; an object with a
/// `message` field is accepted too.  Anything else becomes the message verbatim.
fn error_from_status(status_code: u16, body: &str, retry_after: Option<u64>) -> Error {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(|error| match error {
            Value::String(message) => Some(message.clone()),
            Value::Object(fields) => fields
                .get("message")
                .and_then(Value::as_str)
                .map(String::from),
            _ => None,
        })
        .unwrap_or_else(|| body.to_string());

    match status_code {
        400 => Error::bad_request(message),
        404 => Error::not_found(message, Some("endpoint".to_string()), None),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single HTTP request with `status` and `body`, returning the raw request.
    async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending headers");
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&request[..header_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while request.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{addr}/api"), handle)
    }

    #[test]
    fn test_client_creation() {
        let client = Backend::with_options(
            Some("https://analysis.example.com/api".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "https://analysis.example.com/api/");
        assert_eq!(client.timeout(), Duration::from_secs(30));
        assert_eq!(
            client.endpoint("chat").unwrap().as_str(),
            "https://analysis.example.com/api/chat"
        );

        let client = Backend::with_options(Some(DEFAULT_API_URL.to_string()), None).unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(
            client.endpoint("process").unwrap().as_str(),
            "http://localhost:3001/api/process"
        );
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(Backend::with_options(Some("ftp://example.com".to_string()), None)
            .unwrap_err()
            .is_validation());
        assert!(matches!(
            Backend::with_options(Some("not a url".to_string()), None).unwrap_err(),
            Error::Url { .. }
        ));
    }

    #[test]
    fn status_codes_map_to_errors() {
        let err = error_from_status(500, r#"{"error": "pipeline crashed"}"#, None);
        assert!(matches!(err, Error::InternalServer { ref message } if message == "pipeline crashed"));

        let err = error_from_status(400, r#"{"error": {"message": "Invalid JSON input"}}"#, None);
        assert!(matches!(err, Error::BadRequest { ref message } if message == "Invalid JSON input"));

        let err = error_from_status(429, "slow down", Some(3));
        assert!(matches!(
            err,
            Error::RateLimit { ref message, retry_after: Some(3) } if message == "slow down"
        ));

        assert!(error_from_status(404, "", None).is_not_found());
        assert!(error_from_status(408, "", None).is_timeout());
        assert!(matches!(
            error_from_status(503, "", None),
            Error::ServiceUnavailable { .. }
        ));
        assert_eq!(error_from_status(418, "teapot", None).status_code(), Some(418));
    }

    #[tokio::test]
    async fn chat_round_trip() {
        let (url, server) = serve_once(200, r#"{"response": "Markets are growing."}"#).await;
        let backend = Backend::with_options(Some(url), None).unwrap();
        let reply = backend.send_message("How is the market?").await.unwrap();
        assert_eq!(reply, "Markets are growing.");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/chat "));
        assert!(request.ends_with(r#"{"text":"How is the market?"}"#));
    }

    #[tokio::test]
    async fn chat_error_is_mapped() {
        let (url, server) = serve_once(500, r#"{"error": "model offline"}"#).await;
        let backend = Backend::with_options(Some(url), None).unwrap();
        let err = backend.send_message("hello").await.unwrap_err();
        assert!(matches!(err, Error::InternalServer { ref message } if message == "model offline"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn process_round_trip() {
        let (url, server) =
            serve_once(200, r#"{"swot": {"strengths": ["fast"]}, "graphs": {}}"#).await;
        let backend = Backend::with_options(Some(url), None).unwrap();
        let bundle = backend.fetch_generated_content().await.unwrap();
        assert_eq!(
            bundle.swot.map(|swot| swot.strengths),
            Some(vec!["fast".to_string()])
        );
        assert!(bundle.business.is_none());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/process "));
    }

    #[tokio::test]
    async fn connection_refused_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = Backend::with_options(Some(format!("http://{addr}/api")), None).unwrap();
        let err = backend.send_message("anyone?").await.unwrap_err();
        assert!(err.is_backend());
    }
}
