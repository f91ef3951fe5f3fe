pub mod prompts;
pub mod retry;
pub mod transport;

pub use retry::{RetryDecision, RetryPolicy, RetryState, Sleeper, TokioSleeper};
pub use transport::{GeminiTransport, ModelRequest, ModelTransport, ResponseFormat, TransportError};

use std::sync::Arc;

use crate::config::Config;
use crate::credentials::Credential;
use crate::parsing::decode_analysis;
use crate::types::analysis::SentenceAnalysis;

/// Failures that reach the user. `Display` is the message shown in the UI.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("La clave API de Gemini no ha sido configurada correctamente en el entorno de la aplicación.")]
    CredentialMissing,
    #[error("La clave API de Gemini no es válida o ha caducado. Por favor, verifica tu configuración.")]
    CredentialRejected { message: String },
    #[error("El servicio rechazó la solicitud: {message}")]
    ClientRejected { status: Option<u16>, message: String },
    #[error("No se pudo obtener una respuesta del servicio después de varios intentos.")]
    RetriesExhausted { attempts: u32, last_error: String },
}

/// True when the error text says the API key itself is bad.
pub fn mentions_invalid_credential(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("api key not valid") || lower.contains("api_key_invalid") || lower.contains("api key expired")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttemptFailure {
    EmptyResponse,
    Transport(TransportError),
}

impl AttemptFailure {
    fn message(&self) -> String {
        match self {
            Self::EmptyResponse => "empty response from Gemini API".to_string(),
            Self::Transport(e) => e.message.clone(),
        }
    }
}

/// Sends prompts to the model, masking transient failures.
///
/// The credential is passed in on every call; the gateway keeps no client
/// state of its own beyond the transport.
#[derive(Clone)]
pub struct ModelGateway {
    transport: Arc<dyn ModelTransport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    model: String,
}

impl ModelGateway {
    pub fn new(
        transport: Arc<dyn ModelTransport>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
        model: impl Into<String>,
    ) -> Self {
        Self { transport, sleeper, policy, model: model.into() }
    }

    /// Gemini over HTTPS with real timers, as configured.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let transport = GeminiTransport::new(&config.model)?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(TokioSleeper),
            RetryPolicy::from(&config.retry),
            config.model.name.clone(),
        ))
    }

    /// Returns the first non-empty response body.
    ///
    /// Credential problems and 4xx responses fail on the spot; everything
    /// else is retried with exponential backoff until the budget runs out.
    pub async fn complete(
        &self,
        credential: Option<&Credential>,
        prompt: &str,
        format: ResponseFormat,
    ) -> Result<String, GatewayError> {
        let credential = credential.ok_or(GatewayError::CredentialMissing)?;
        let request = ModelRequest { model: self.model.clone(), prompt: prompt.to_string(), format };
        tracing::debug!(prompt_len = prompt.len(), ?format, "sending prompt to model");

        let mut state = RetryState::new(self.policy);
        while let Some(attempt) = state.begin_attempt() {
            let failure = match self.transport.generate(credential, &request).await {
                Ok(text) if !text.trim().is_empty() => return Ok(text),
                Ok(_) => {
                    tracing::warn!(attempt, "model returned an empty response");
                    AttemptFailure::EmptyResponse
                }
                Err(e) => {
                    tracing::warn!(attempt, status = ?e.status, error = %e, "model call failed");
                    if mentions_invalid_credential(&e.message) {
                        return Err(GatewayError::CredentialRejected { message: e.message });
                    }
                    if e.is_client_error() {
                        return Err(GatewayError::ClientRejected { status: e.status, message: e.message });
                    }
                    AttemptFailure::Transport(e)
                }
            };

            match state.record_failure(failure) {
                RetryDecision::RetryAfter(delay) => {
                    tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "retrying model call");
                    self.sleeper.sleep(delay).await;
                }
                RetryDecision::GiveUp => break,
            }
        }

        let attempts = state.attempts();
        let last_error = state.into_last_failure().map(|f| f.message()).unwrap_or_default();
        tracing::error!(attempts, last_error = %last_error, "all model call attempts failed");
        Err(GatewayError::RetriesExhausted { attempts, last_error })
    }

    /// `Ok(None)` when the model answered but the body is not a valid
    /// analysis; such answers are not retried.
    pub async fn analyze_sentence(
        &self,
        credential: Option<&Credential>,
        sentence: &str,
    ) -> Result<Option<SentenceAnalysis>, GatewayError> {
        let text = self.complete(credential, &prompts::analysis_prompt(sentence), ResponseFormat::Json).await?;
        Ok(decode_analysis(&text))
    }

    pub async fn generate_sentence(
        &self,
        credential: Option<&Credential>,
        criteria: &str,
    ) -> Result<Option<String>, GatewayError> {
        let text = self
            .complete(credential, &prompts::generation_prompt(criteria), ResponseFormat::PlainText)
            .await?;
        let trimmed = text.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_gemini_invalid_key_messages() {
        assert!(mentions_invalid_credential("API key not valid. Please pass a valid API key."));
        assert!(mentions_invalid_credential("reason: API_KEY_INVALID"));
        assert!(!mentions_invalid_credential("The model is overloaded. Please try again later."));
    }

    #[test]
    fn user_facing_messages_do_not_leak_the_cause() {
        let err = GatewayError::RetriesExhausted { attempts: 3, last_error: "503 overloaded".to_string() };
        assert!(!err.to_string().contains("503"));
    }
}
