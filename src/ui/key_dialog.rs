use eframe::egui;

const API_KEY_URL: &str = "https://aistudio.google.com/app/apikey";

/// What the user did with the dialog this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDialogAction {
    None,
    Save(String),
    Clear,
    Close,
}

#[derive(Debug, Default)]
pub struct KeyDialog {
    open: bool,
    input: String,
    error: Option<String>,
}

impl KeyDialog {
    pub fn open(&mut self) {
        self.open = true;
        self.input.clear();
        self.error = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
        self.input.clear();
        self.error = None;
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn show(&mut self, ctx: &egui::Context) -> KeyDialogAction {
        if !self.open {
            return KeyDialogAction::None;
        }
        let mut action = KeyDialogAction::None;
        let mut window_open = true;

        egui::Window::new("Configurar Clave API de Gemini")
            .open(&mut window_open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(
                    "Para utilizar el analizador, necesitas una clave API de Google Gemini. \
                     Es gratuita para un uso moderado y puedes obtenerla en Google AI Studio.",
                );
                ui.hyperlink_to("Obtener una clave API aquí →", API_KEY_URL);
                ui.add_space(8.0);

                ui.label("Tu Clave API");
                ui.add(
                    egui::TextEdit::singleline(&mut self.input)
                        .password(true)
                        .hint_text("Pega tu clave API aquí...")
                        .desired_width(f32::INFINITY),
                );
                if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::RED, err);
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancelar").clicked() {
                        action = KeyDialogAction::Close;
                    }
                    if ui.button("Borrar clave guardada").clicked() {
                        action = KeyDialogAction::Clear;
                    }
                    let can_save = !self.input.trim().is_empty();
                    if ui.add_enabled(can_save, egui::Button::new("Guardar Clave")).clicked() {
                        action = KeyDialogAction::Save(self.input.clone());
                    }
                });
            });

        if !window_open {
            action = KeyDialogAction::Close;
        }
        action
    }
}
