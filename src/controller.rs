use crate::credentials::Credential;
use crate::gateway::{GatewayError, ModelGateway};
use crate::types::analysis::SentenceAnalysis;

pub const EMPTY_SENTENCE_MESSAGE: &str = "Por favor, ingresa una oración para analizar.";
pub const EMPTY_CRITERIA_MESSAGE: &str = "Por favor, introduce los criterios para generar la oración.";
pub const MALFORMED_ANALYSIS_MESSAGE: &str = "No se pudo obtener un análisis válido. La respuesta del modelo podría estar vacía o malformada. Revisa el registro para más detalles.";
pub const EMPTY_GENERATION_MESSAGE: &str = "No se pudo generar la oración. Inténtalo de nuevo.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Analyze,
    Generate,
}

/// A finished request's payload. Only one kind exists at a time, so an
/// analysis and a generated sentence can never be shown together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Analysis(SentenceAnalysis),
    Generated(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Loading,
    Success(Outcome),
    Error(String),
}

/// Identifies one triggered action. Only the newest ticket may change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

/// Work handed out by `begin_*`, to be run against a gateway and fed back
/// through `InteractionController::complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    Analyze { ticket: RequestTicket, sentence: String },
    Generate { ticket: RequestTicket, criteria: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Analysis(Result<Option<SentenceAnalysis>, GatewayError>),
    Generated(Result<Option<String>, GatewayError>),
}

impl PendingRequest {
    pub fn ticket(&self) -> RequestTicket {
        match self {
            Self::Analyze { ticket, .. } | Self::Generate { ticket, .. } => *ticket,
        }
    }

    /// Runs the request. Takes an owned credential so it can move to a worker
    /// task.
    pub async fn execute(self, gateway: &ModelGateway, credential: Option<Credential>) -> (RequestTicket, Completion) {
        let ticket = self.ticket();
        let completion = match self {
            Self::Analyze { sentence, .. } => {
                Completion::Analysis(gateway.analyze_sentence(credential.as_ref(), &sentence).await)
            }
            Self::Generate { criteria, .. } => {
                Completion::Generated(gateway.generate_sentence(credential.as_ref(), &criteria).await)
            }
        };
        (ticket, completion)
    }
}

/// Holds the mode and the request state behind the analyzer screen.
#[derive(Debug, Default)]
pub struct InteractionController {
    mode: Mode,
    state: ControllerState,
    latest_ticket: u64,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ControllerState::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ControllerState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn analysis(&self) -> Option<&SentenceAnalysis> {
        match &self.state {
            ControllerState::Success(Outcome::Analysis(analysis)) => Some(analysis),
            _ => None,
        }
    }

    pub fn generated_sentence(&self) -> Option<&str> {
        match &self.state {
            ControllerState::Success(Outcome::Generated(sentence)) => Some(sentence),
            _ => None,
        }
    }

    fn next_ticket(&mut self) -> RequestTicket {
        self.latest_ticket += 1;
        RequestTicket(self.latest_ticket)
    }

    /// Starts an analysis, or records an input error and returns `None` when
    /// the sentence is blank.
    pub fn begin_analyze(&mut self, text: &str) -> Option<PendingRequest> {
        self.mode = Mode::Analyze;
        let ticket = self.next_ticket();
        if text.trim().is_empty() {
            self.state = ControllerState::Error(EMPTY_SENTENCE_MESSAGE.to_string());
            return None;
        }
        self.state = ControllerState::Loading;
        Some(PendingRequest::Analyze { ticket, sentence: text.to_string() })
    }

    pub fn begin_generate(&mut self, criteria: &str) -> Option<PendingRequest> {
        self.mode = Mode::Generate;
        let ticket = self.next_ticket();
        if criteria.trim().is_empty() {
            self.state = ControllerState::Error(EMPTY_CRITERIA_MESSAGE.to_string());
            return None;
        }
        self.state = ControllerState::Loading;
        Some(PendingRequest::Generate { ticket, criteria: criteria.to_string() })
    }

    /// Applies a finished request. Returns `false` when the completion was
    /// dropped because a newer action has started since.
    pub fn complete(&mut self, ticket: RequestTicket, completion: Completion) -> bool {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(ticket = ticket.0, latest = self.latest_ticket, "dropping stale completion");
            return false;
        }
        self.state = match (self.mode, completion) {
            (Mode::Analyze, Completion::Analysis(result)) => match result {
                Ok(Some(analysis)) => ControllerState::Success(Outcome::Analysis(analysis)),
                Ok(None) => ControllerState::Error(MALFORMED_ANALYSIS_MESSAGE.to_string()),
                Err(e) => {
                    tracing::error!(error = ?e, "analysis failed");
                    ControllerState::Error(e.to_string())
                }
            },
            (Mode::Generate, Completion::Generated(result)) => match result {
                Ok(Some(sentence)) => ControllerState::Success(Outcome::Generated(sentence)),
                Ok(None) => ControllerState::Error(EMPTY_GENERATION_MESSAGE.to_string()),
                Err(e) => {
                    tracing::error!(error = ?e, "generation failed");
                    ControllerState::Error(e.to_string())
                }
            },
            // The user switched tabs while the request was in flight
            (mode, _) => {
                tracing::debug!(?mode, "discarding completion for the other mode");
                ControllerState::Idle
            }
        };
        true
    }

    /// Clears the error and whichever result does not belong to `mode`.
    pub fn switch_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.state = match std::mem::take(&mut self.state) {
            ControllerState::Error(_) => ControllerState::Idle,
            ControllerState::Success(Outcome::Analysis(_)) if mode == Mode::Generate => ControllerState::Idle,
            ControllerState::Success(Outcome::Generated(_)) if mode == Mode::Analyze => ControllerState::Idle,
            other => other,
        };
    }

    pub async fn analyze(&mut self, gateway: &ModelGateway, credential: Option<&Credential>, text: &str) {
        if let Some(pending) = self.begin_analyze(text) {
            let (ticket, completion) = pending.execute(gateway, credential.cloned()).await;
            self.complete(ticket, completion);
        }
    }

    pub async fn generate(&mut self, gateway: &ModelGateway, credential: Option<&Credential>, criteria: &str) {
        if let Some(pending) = self.begin_generate(criteria) {
            let (ticket, completion) = pending.execute(gateway, credential.cloned()).await;
            self.complete(ticket, completion);
        }
    }
}
