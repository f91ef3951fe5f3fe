#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ngle_analyzer::credentials::Credential;
use ngle_analyzer::gateway::{ModelRequest, ModelTransport, RetryPolicy, Sleeper, TransportError};
use ngle_analyzer::ModelGateway;

pub const JUAN_ANALYSIS: &str = r#"{
  "fullSentence": "Juan come manzanas",
  "classification": "Oración simple, enunciativa afirmativa, predicativa, activa, transitiva.",
  "structure": [
    {
      "text": "Juan",
      "label": "SN Sujeto",
      "children": [{ "text": "Juan", "label": "N (N)" }]
    },
    {
      "text": "come manzanas",
      "label": "SV - Predicado verbal",
      "children": [
        { "text": "come", "label": "V (N)" },
        {
          "text": "manzanas",
          "label": "SN - CD",
          "children": [{ "text": "manzanas", "label": "N (N)" }]
        }
      ]
    }
  ]
}"#;

/// Replays a fixed list of responses, then keeps returning the last one.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    last: Mutex<Option<Result<String, TransportError>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<String, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn always(response: Result<String, TransportError>) -> Arc<Self> {
        Self::new(vec![response])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelTransport for ScriptedTransport {
    async fn generate(&self, _credential: &Credential, request: &ModelRequest) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let next = self.responses.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last.clone().unwrap_or_else(|| Err(TransportError::new(None, "script exhausted"))),
        }
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

pub fn gateway(transport: Arc<ScriptedTransport>, sleeper: Arc<RecordingSleeper>) -> ModelGateway {
    ModelGateway::new(transport, sleeper, RetryPolicy::default(), "gemini-2.5-flash")
}

pub fn credential() -> Credential {
    Credential::parse("AIzaTestKey123").unwrap()
}

pub fn server_error() -> Result<String, TransportError> {
    Err(TransportError::new(Some(503), "The model is overloaded. Please try again later."))
}
