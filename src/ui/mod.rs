pub mod app;
pub mod key_dialog;
pub mod tree_widget;

use eframe::{egui, NativeOptions};

use crate::credentials::CredentialStore;
use crate::gateway::ModelGateway;
use app::AnalyzerApp;

/// Opens the analyzer window and blocks until it closes.
pub fn run(credentials: CredentialStore, gateway: ModelGateway, runtime: tokio::runtime::Runtime) -> eframe::Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([720.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Analizador Sintáctico (NGLE)",
        options,
        Box::new(move |_cc| Box::new(AnalyzerApp::new(credentials, gateway, runtime))),
    )
}
