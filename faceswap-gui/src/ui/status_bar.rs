//! Top status bar.

use egui::{Align, Color32, Layout, Margin, RichText, Stroke, TopBottomPanel, Ui};

use crate::{FaceSwapApp, theme};

impl FaceSwapApp {
    pub fn show_status_bar(&mut self, ctx: &egui::Context) {
        let palette = theme::palette();
        TopBottomPanel::top("faceswap_status_bar")
            .frame(
                egui::Frame::new()
                    .fill(palette.panel_dark)
                    .stroke(Stroke::new(1.0, palette.outline))
                    .inner_margin(Margin::symmetric(20, 14)),
            )
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    ui.spacing_mut().item_spacing.y = 6.0;
                    ui.horizontal(|ui| {
                        ui.heading(RichText::new("FaceSwap Studio").size(22.0).strong());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            self.draw_status_badge(ui, palette);
                        });
                    });

                    ui.label(RichText::new(&self.status_line).color(palette.subtle_text));
                    if let Some(err) = &self.last_error {
                        ui.colored_label(palette.danger, err);
                    }

                    ui.add_space(4.0);
                    self.draw_status_chips(ui, palette);
                });
            });
    }

    fn draw_status_badge(&self, ui: &mut Ui, palette: theme::Palette) {
        let (label, color) = if self.pipeline.is_none() {
            ("Models required", palette.warning)
        } else if self.result.is_some() {
            ("Swapped", palette.success)
        } else if self.can_swap() {
            ("Ready", palette.accent)
        } else {
            ("Waiting for images", palette.subtle_text)
        };

        theme::chip_frame(palette, color)
            .fill(palette.panel_light)
            .inner_margin(Margin::symmetric(14, 6))
            .show(ui, |ui| {
                ui.label(RichText::new(label).size(15.0).strong());
            });
    }

    fn draw_status_chips(&self, ui: &mut Ui, palette: theme::Palette) {
        ui.horizontal_wrapped(|ui| {
            status_chip(
                ui,
                palette,
                format!("Quality {}", self.settings.quality.as_label()),
                palette.accent,
            );
            status_chip(
                ui,
                palette,
                format!("Selection {}", self.settings.swap.face_selection.as_label()),
                palette.subtle_text,
            );
            if self.settings.swap.swap_all_faces {
                status_chip(ui, palette, "All faces", palette.warning);
            }
            if let Some(result) = &self.result {
                status_chip(
                    ui,
                    palette,
                    format!("Faces swapped {}", result.swapped_faces),
                    palette.success,
                );
                status_chip(
                    ui,
                    palette,
                    format!("{:.2?}", result.elapsed),
                    palette.subtle_text,
                );
            }
        });
    }
}

pub(crate) fn status_chip(
    ui: &mut Ui,
    palette: theme::Palette,
    text: impl Into<String>,
    accent: Color32,
) {
    theme::chip_frame(palette, accent).show(ui, |ui| {
        ui.label(RichText::new(text.into()).small().color(palette.subtle_text));
    });
}
