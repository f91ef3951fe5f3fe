use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ModelSettings;
use crate::credentials::Credential;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Structured analysis; the model is asked for `application/json`.
    Json,
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub model: String,
    pub prompt: String,
    pub format: ResponseFormat,
}

/// Failure of a single remote call. `status` is the HTTP status when the
/// server answered at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status, Some(400..=499))
    }
}

/// One round trip to the hosted model. Returns the raw response text, which
/// may be empty.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    async fn generate(&self, credential: &Credential, request: &ModelRequest) -> Result<String, TransportError>;
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default()
    }
}

pub(crate) fn request_body(request: &ModelRequest) -> serde_json::Value {
    let mut body = json!({
        "contents": [{
            "parts": [{ "text": request.prompt }]
        }]
    });
    if request.format == ResponseFormat::Json {
        body["generationConfig"] = json!({ "responseMimeType": "application/json" });
    }
    body
}

pub(crate) fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => body.trim().to_string(),
    }
}

pub(crate) fn response_text(body: &str) -> Result<String, TransportError> {
    serde_json::from_str::<GenerateContentResponse>(body)
        .map(GenerateContentResponse::into_text)
        .map_err(|e| TransportError::new(None, format!("undecodable Gemini response: {}", e)))
}

/// Gemini `generateContent` over HTTPS.
pub struct GeminiTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl GeminiTransport {
    pub fn new(settings: &ModelSettings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, model)
    }
}

#[async_trait]
impl ModelTransport for GeminiTransport {
    async fn generate(&self, credential: &Credential, request: &ModelRequest) -> Result<String, TransportError> {
        let response = self
            .client
            .post(self.url(&request.model))
            .header("x-goog-api-key", credential.expose())
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| TransportError::new(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::new(Some(status.as_u16()), error_message(status.as_u16(), &body)));
        }
        response_text(&body)
    }
}
