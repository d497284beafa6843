use std::env;
use std::pin::Pin;
use std::time::{Duration, Instant};

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::service::{ChunkStream, CompletionOptions, CompletionService, Turn};
use crate::sse::process_sse;
use crate::types::{
    ApiErrorDetail, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Model, Role, ThinkingConfig,
};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A stream of parsed response frames.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// Client for the Gemini API.
#[derive(Debug, Clone)]
pub struct Gemini {
    api_key: String,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    model: Model,
}

impl Gemini {
    /// Create a new Gemini client for the default model.
    ///
    /// The API key can be provided directly or read from the GEMINI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var(API_KEY_ENV).map_err(|_| {
                Error::authentication(format!(
                    "API key not provided and {API_KEY_ENV} environment variable not set"
                ))
            })?,
        };
        if HeaderValue::from_str(&api_key).is_err() {
            return Err(Error::validation(
                "API key contains characters not allowed in a header",
                Some("api_key".to_string()),
            ));
        }

        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(format!("Failed to build HTTP client: {e}"), Some(Box::new(e)))
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            model: crate::persona::DEFAULT_MODEL.into(),
        })
    }

    /// Sets the model that answers.
    pub fn with_model(mut self, model: impl Into<Model>) -> Self {
        self.model = model.into();
        self
    }

    /// The model that answers.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        let key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            Error::validation(
                "API key contains characters not allowed in a header",
                Some("api_key".to_string()),
            )
        })?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    fn stream_url(&self) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("models/{}:streamGenerateContent", self.model))?;
        url.query_pairs_mut().append_pair("alt", "sse");
        Ok(url)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: Option<ApiErrorDetail>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        // Gemini sometimes wraps the error object in a one-element array.
        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .or_else(|| {
                serde_json::from_str::<Vec<ErrorResponse>>(&error_body)
                    .ok()
                    .and_then(|mut errors| errors.pop())
            })
            .and_then(|e| e.error);
        let error_type = detail.as_ref().and_then(|e| e.status.clone());
        let error_message = detail
            .and_then(|e| e.message)
            .unwrap_or_else(|| error_body.clone());

        error_for_status(status_code, error_type, error_message, retry_after)
    }

    /// Send a request and get a stream of response frames.
    pub async fn stream(&self, request: &GenerateContentRequest) -> Result<FrameStream> {
        let url = self.stream_url()?;
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        tracing::debug!(model = %self.model, turns = request.contents.len(), "opening stream");

        let response = self
            .client
            .post(url)
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {e}"),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
                }
            })?;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            let err = Self::process_error_response(response).await;
            tracing::warn!(model = %self.model, error = %err, "stream request rejected");
            return Err(err);
        }

        Ok(Box::pin(process_sse(response.bytes_stream())))
    }

    /// Build the wire request for a conversation turn.
    pub fn build_request(
        prior_history: &[Turn],
        new_turn: &str,
        options: &CompletionOptions,
    ) -> GenerateContentRequest {
        let mut contents: Vec<Content> = prior_history.iter().map(Content::from).collect();
        contents.push(Content::new(Role::User, new_turn));
        let mut request = GenerateContentRequest::new(contents).with_generation_config(
            GenerationConfig {
                temperature: Some(options.temperature),
                thinking_config: options.thinking_budget.map(ThinkingConfig::with_budget),
            },
        );
        if !options.system_persona.is_empty() {
            request = request.with_system_instruction(options.system_persona.clone());
        }
        request
    }
}

#[async_trait::async_trait]
impl CompletionService for Gemini {
    async fn start_stream(
        &self,
        prior_history: &[Turn],
        new_turn: &str,
        options: &CompletionOptions,
    ) -> Result<ChunkStream> {
        let request = Self::build_request(prior_history, new_turn, options);
        let frames = self.stream(&request).await?;
        // Frames carrying no answer text (finish reason, usage) are not chunks.
        let chunks = frames.filter_map(|frame| async move {
            match frame {
                Ok(frame) => {
                    let text = frame.text();
                    if text.is_empty() { None } else { Some(Ok(text)) }
                }
                Err(e) => Some(Err(e)),
            }
        });
        Ok(Box::pin(chunks))
    }
}

/// Map an HTTP (or in-stream) status code to the error taxonomy.
pub(crate) fn error_for_status(
    status_code: u16,
    error_type: Option<String>,
    message: String,
    retry_after: Option<u64>,
) -> Error {
    match status_code {
        400 => Error::bad_request(message),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, error_type, message),
    }
}
