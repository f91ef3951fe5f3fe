use eframe::egui;

use crate::tree::{Density, DensityMetrics, LabelCategory, NodeDisplay};
use crate::types::analysis::{SentenceAnalysis, SyntacticElement};

fn category_color(category: LabelCategory) -> egui::Color32 {
    let (r, g, b) = category.rgb();
    egui::Color32::from_rgb(r, g, b)
}

/// Sentence, classification and the tree, bottom-aligned like a
/// blackboard diagram. Returns true when the user asked to download it.
pub fn show_analysis(ui: &mut egui::Ui, analysis: &SentenceAnalysis) -> bool {
    let export_requested = ui
        .with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.button("Descargar análisis")
                .on_hover_text("Guarda el análisis como texto y JSON")
                .clicked()
        })
        .inner;

    ui.heading("Oración analizada:");
    ui.label(egui::RichText::new(&analysis.full_sentence).size(16.0));
    ui.separator();

    ui.heading("Clasificación:");
    ui.label(&analysis.classification);
    ui.separator();

    ui.heading("Estructura sintáctica:");
    let density = Density::for_structure(&analysis.structure);
    let metrics = density.metrics();
    egui::ScrollArea::horizontal().id_source("tree_scroll").show(ui, |ui| {
        ui.with_layout(egui::Layout::left_to_right(egui::Align::Max), |ui| {
            ui.spacing_mut().item_spacing.x = metrics.root_gap;
            for element in &analysis.structure {
                show_node(ui, element, &metrics);
            }
        });
    });
    export_requested
}

fn show_node(ui: &mut egui::Ui, element: &SyntacticElement, metrics: &DensityMetrics) {
    let display = NodeDisplay::for_element(element);
    let color = category_color(display.category);

    let mut frame = egui::Frame::none().inner_margin(egui::Margin::same(metrics.node_padding));
    if !display.show_text {
        frame = frame
            .fill(egui::Color32::from_rgba_unmultiplied(51, 65, 85, 100))
            .rounding(egui::Rounding::same(6.0));
    }

    frame.show(ui, |ui| {
        ui.set_min_width(metrics.min_node_width);
        ui.vertical_centered(|ui| {
            ui.spacing_mut().item_spacing.y = metrics.node_spacing;

            if !display.show_text {
                ui.with_layout(egui::Layout::left_to_right(egui::Align::Max), |ui| {
                    ui.spacing_mut().item_spacing.x = metrics.node_spacing;
                    for child in element.children() {
                        show_node(ui, child, metrics);
                    }
                });
                let rect = ui.min_rect();
                ui.painter().hline(
                    rect.x_range(),
                    ui.cursor().top(),
                    egui::Stroke::new(1.0, color.gamma_multiply(0.3)),
                );
            } else {
                ui.set_max_width(metrics.text_max_width.max(metrics.min_node_width));
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(&element.text)
                            .size(metrics.text_size)
                            .color(egui::Color32::from_rgb(241, 245, 249)),
                    )
                    .wrap(true),
                );
            }

            ui.label(
                egui::RichText::new(element.label.to_uppercase())
                    .size(metrics.label_size)
                    .color(color)
                    .strong(),
            );

            if display.show_scope_line {
                let (rect, _) = ui.allocate_exact_size(
                    egui::vec2(ui.available_width().max(metrics.min_node_width), 1.0),
                    egui::Sense::hover(),
                );
                ui.painter().rect_filled(rect, 0.0, color);
            }
        });
    });
}
