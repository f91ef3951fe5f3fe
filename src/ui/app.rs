use eframe::{egui, App};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

use super::key_dialog::{KeyDialog, KeyDialogAction};
use super::tree_widget::show_analysis;
use crate::controller::{Completion, InteractionController, Mode, PendingRequest, RequestTicket};
use crate::credentials::CredentialStore;
use crate::gateway::ModelGateway;
use crate::tree::export::{default_export_dir, export_analysis};
use crate::types::analysis::SentenceAnalysis;

const MISSING_KEY_MESSAGE: &str = "CONFIGURACIÓN REQUERIDA: La clave API de Gemini no está configurada. \
                                   Usa el botón «Clave API» para añadirla.";
const EXPORT_FAILED_MESSAGE: &str = "Hubo un error al guardar el análisis. Por favor, inténtalo de nuevo.";
const COPY_FEEDBACK: Duration = Duration::from_secs(2);

/// How long "¡Copiado!" stays on the copy button.
#[derive(Debug, Clone, Copy, Default)]
struct CopyFeedback {
    copied_at: Option<Instant>,
}

impl CopyFeedback {
    fn mark(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    fn reset(&mut self) {
        self.copied_at = None;
    }

    fn is_active(&self, now: Instant) -> bool {
        self.remaining(now).is_some()
    }

    /// Time left before the label reverts, or `None` once it has.
    fn remaining(&self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.copied_at?);
        COPY_FEEDBACK.checked_sub(elapsed).filter(|left| !left.is_zero())
    }
}

enum ExportStatus {
    Saved(PathBuf),
    Failed,
}

pub struct AnalyzerApp {
    controller: InteractionController,
    credentials: CredentialStore,
    gateway: ModelGateway,
    runtime: tokio::runtime::Runtime,
    completions_tx: Sender<(RequestTicket, Completion)>,
    completions_rx: Receiver<(RequestTicket, Completion)>,
    sentence_input: String,
    criteria_input: String,
    key_dialog: KeyDialog,
    copy_feedback: CopyFeedback,
    export_status: Option<ExportStatus>,
}

impl AnalyzerApp {
    pub fn new(credentials: CredentialStore, gateway: ModelGateway, runtime: tokio::runtime::Runtime) -> Self {
        let (completions_tx, completions_rx) = channel();
        Self {
            controller: InteractionController::new(),
            credentials,
            gateway,
            runtime,
            completions_tx,
            completions_rx,
            sentence_input: String::new(),
            criteria_input: String::new(),
            key_dialog: KeyDialog::default(),
            copy_feedback: CopyFeedback::default(),
            export_status: None,
        }
    }

    /// Runs the request on the runtime; the result comes back through the
    /// channel and is applied on the UI thread.
    fn dispatch(&mut self, pending: PendingRequest, ctx: &egui::Context) {
        let gateway = self.gateway.clone();
        let credential = self.credentials.resolve_active().cloned();
        let tx = self.completions_tx.clone();
        let ctx = ctx.clone();
        self.export_status = None;
        self.runtime.spawn(async move {
            let finished = pending.execute(&gateway, credential).await;
            if tx.send(finished).is_err() {
                tracing::debug!("UI closed before the request finished");
            }
            ctx.request_repaint();
        });
    }

    fn drain_completions(&mut self) {
        while let Ok((ticket, completion)) = self.completions_rx.try_recv() {
            self.controller.complete(ticket, completion);
        }
    }

    fn handle_key_dialog(&mut self, ctx: &egui::Context) {
        match self.key_dialog.show(ctx) {
            KeyDialogAction::None => {}
            KeyDialogAction::Close => self.key_dialog.close(),
            KeyDialogAction::Save(key) => match self.credentials.configure(&key) {
                Ok(()) => self.key_dialog.close(),
                Err(e) => self.key_dialog.set_error(e.to_string()),
            },
            KeyDialogAction::Clear => match self.credentials.clear() {
                Ok(()) => self.key_dialog.close(),
                Err(e) => self.key_dialog.set_error(e.to_string()),
            },
        }
    }

    fn show_mode_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mode = self.controller.mode();
            if ui.selectable_label(mode == Mode::Analyze, "Analizar Oración").clicked() {
                self.controller.switch_mode(Mode::Analyze);
            }
            if ui.selectable_label(mode == Mode::Generate, "Generar Oración").clicked() {
                self.controller.switch_mode(Mode::Generate);
            }
        });
        ui.separator();
    }

    fn show_analyze_input(&mut self, ui: &mut egui::Ui, enabled: bool) -> Option<PendingRequest> {
        let mut pending = None;
        ui.add_enabled(
            enabled,
            egui::TextEdit::multiline(&mut self.sentence_input)
                .hint_text("Ej: El libro que me prestaste ayer es muy interesante.")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
        if ui.add_enabled(enabled, egui::Button::new("Analizar")).clicked() {
            pending = self.controller.begin_analyze(&self.sentence_input);
        }
        pending
    }

    fn show_generate_input(&mut self, ui: &mut egui::Ui, enabled: bool) -> Option<PendingRequest> {
        let mut pending = None;
        ui.label("Describe qué tipo de oración quieres. La IA la creará para que puedas copiarla.");
        ui.label(
            egui::RichText::new(
                "Ejemplos: \"Oración condicional con verbo en subjuntivo\", \
                 \"Oración con pasiva refleja y complemento agente\", \"Oración simple con vocativo\".",
            )
            .italics()
            .weak(),
        );
        ui.add_enabled(
            enabled,
            egui::TextEdit::multiline(&mut self.criteria_input)
                .hint_text("Ej: Oración compuesta con una subordinada sustantiva de sujeto...")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
        let can_submit = enabled && !self.criteria_input.trim().is_empty();
        if ui.add_enabled(can_submit, egui::Button::new("Generar")).clicked() {
            self.copy_feedback.reset();
            pending = self.controller.begin_generate(&self.criteria_input);
        }
        pending
    }

    fn show_generated_sentence(&mut self, ui: &mut egui::Ui, sentence: &str) {
        ui.add_space(8.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.label(egui::RichText::new("Oración Generada:").strong().color(egui::Color32::from_rgb(45, 212, 191)));
            ui.label(egui::RichText::new(sentence).size(16.0));
            let now = Instant::now();
            let label = if self.copy_feedback.is_active(now) { "¡Copiado!" } else { "Copiar al portapapeles" };
            if ui.button(label).clicked() {
                ui.output_mut(|o| o.copied_text = sentence.to_string());
                self.copy_feedback.mark(now);
            }
        });
    }

    fn export(&mut self, analysis: &SentenceAnalysis) {
        let dir = default_export_dir();
        self.export_status = Some(match export_analysis(&dir, analysis) {
            Ok(paths) => ExportStatus::Saved(paths.into_iter().next().unwrap_or(dir)),
            Err(e) => {
                tracing::error!(error = %e, dir = %dir.display(), "failed to export analysis");
                ExportStatus::Failed
            }
        });
    }

    fn show_export_status(&self, ui: &mut egui::Ui) {
        match &self.export_status {
            Some(ExportStatus::Saved(path)) => {
                ui.label(egui::RichText::new(format!("Análisis guardado en {}", path.display())).weak());
            }
            Some(ExportStatus::Failed) => {
                ui.colored_label(egui::Color32::RED, EXPORT_FAILED_MESSAGE);
            }
            None => {}
        }
    }

    fn show_placeholder(&self, ui: &mut egui::Ui) {
        ui.add_space(16.0);
        ui.vertical_centered(|ui| match self.controller.mode() {
            Mode::Analyze => {
                ui.label(egui::RichText::new("Esperando una oración para analizar...").size(16.0));
                ui.label(egui::RichText::new("Ejemplo: El libro que me prestaste ayer es muy interesante.").weak());
            }
            Mode::Generate => {
                ui.label(egui::RichText::new("Describe la oración que quieres que cree la IA.").size(16.0));
                ui.label(egui::RichText::new("Podrás copiarla para analizarla después.").weak());
            }
        });
    }
}

impl App for AnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_completions();
        self.handle_key_dialog(ctx);
        if let Some(left) = self.copy_feedback.remaining(Instant::now()) {
            ctx.request_repaint_after(left);
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Archivo", |ui| {
                    if ui.button("Salir").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                if ui.button("Clave API").clicked() {
                    self.key_dialog.open();
                }
                if let Some(source) = self.credentials.active_source() {
                    ui.label(egui::RichText::new(format!("Clave: {}", source)).weak());
                }
            });
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(
                        "Potenciado por Gemini API. Análisis basado en la Nueva Gramática de la Lengua Española.",
                    )
                    .small()
                    .weak(),
                );
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Analizador Sintáctico (NGLE)");
            ui.label("Introduce una oración o genera una con IA para obtener su análisis sintáctico detallado.");
            ui.add_space(8.0);

            let configured = self.credentials.is_configured();
            if !configured {
                ui.colored_label(egui::Color32::RED, MISSING_KEY_MESSAGE);
                ui.add_space(8.0);
            }

            self.show_mode_tabs(ui);

            let enabled = configured && !self.controller.is_loading() && !self.key_dialog.is_open();
            let pending = match self.controller.mode() {
                Mode::Analyze => self.show_analyze_input(ui, enabled),
                Mode::Generate => self.show_generate_input(ui, enabled),
            };
            if let Some(pending) = pending {
                self.dispatch(pending, ctx);
            }

            egui::ScrollArea::vertical().id_source("result_scroll").auto_shrink([false, false]).show(ui, |ui| {
                if self.controller.is_loading() {
                    ui.add_space(16.0);
                    ui.vertical_centered(|ui| ui.spinner());
                } else if let Some(err) = self.controller.error() {
                    ui.add_space(8.0);
                    ui.colored_label(egui::Color32::RED, err);
                } else if let Some(analysis) = self.controller.analysis().cloned() {
                    ui.add_space(8.0);
                    self.show_export_status(ui);
                    if show_analysis(ui, &analysis) {
                        self.export(&analysis);
                    }
                } else if let Some(sentence) = self.controller.generated_sentence().map(str::to_string) {
                    self.show_generated_sentence(ui, &sentence);
                } else if configured {
                    self.show_placeholder(ui);
                }
            });
        });
    }
}
