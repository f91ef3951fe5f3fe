pub mod config;
pub mod controller;
pub mod credentials;
pub mod gateway;
pub mod logging;
pub mod parsing;
pub mod tree;
pub mod types {
    pub mod analysis;
}
pub mod ui;

pub use controller::{Completion, ControllerState, InteractionController, Mode, Outcome, PendingRequest};
pub use credentials::{Credential, CredentialStore};
pub use gateway::{GatewayError, ModelGateway};
pub use types::analysis::{SentenceAnalysis, SyntacticElement};
