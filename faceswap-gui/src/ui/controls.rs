//! Left panel: input pickers, quality, face selection and model location.

use egui::{
    Button, ComboBox, Frame, Margin, RichText, ScrollArea, SidePanel, Stroke, TextEdit, Ui, vec2,
};
use faceswap_utils::{FaceSelection, QualityLevel};

use crate::{FaceSwapApp, InputKind, theme};

impl FaceSwapApp {
    pub fn show_controls(&mut self, ctx: &egui::Context) {
        let palette = theme::palette();
        SidePanel::left("faceswap_controls")
            .resizable(false)
            .exact_width(290.0)
            .frame(
                Frame::new()
                    .fill(palette.panel)
                    .inner_margin(Margin::symmetric(16, 18))
                    .stroke(Stroke::new(1.0, palette.outline)),
            )
            .show(ctx, |ui| {
                ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.show_input_pickers(ui, palette);
                        ui.add_space(12.0);
                        ui.separator();
                        self.show_quality_picker(ui, palette);
                        ui.add_space(12.0);
                        ui.separator();
                        self.show_face_options(ui);
                        ui.add_space(12.0);
                        ui.separator();
                        self.show_actions(ui);
                        ui.add_space(12.0);
                        ui.separator();
                        self.show_model_settings(ui, palette);
                    });
            });
    }

    fn show_input_pickers(&mut self, ui: &mut Ui, palette: theme::Palette) {
        ui.heading("Images");
        ui.add_space(6.0);
        for kind in [InputKind::Source, InputKind::Target] {
            let width = ui.available_width();
            let label = format!("Choose {}…", kind.title().to_lowercase());
            if ui.add_sized([width, 32.0], Button::new(label)).clicked() {
                self.open_input_dialog(kind);
            }
            let slot = match kind {
                InputKind::Source => &self.source,
                InputKind::Target => &self.target,
            };
            let caption = slot
                .as_ref()
                .and_then(|input| input.path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Nothing selected".to_owned());
            ui.label(RichText::new(caption).small().color(palette.subtle_text));
            ui.add_space(4.0);
        }
    }

    fn show_quality_picker(&mut self, ui: &mut Ui, palette: theme::Palette) {
        ui.heading("Quality");
        ui.add_space(6.0);
        let mut quality = self.settings.quality;
        for level in QualityLevel::ALL {
            ui.radio_value(&mut quality, level, level.as_label());
        }
        ui.label(
            RichText::new(quality_hint(quality))
                .small()
                .color(palette.subtle_text),
        );
        self.set_quality(quality);
    }

    fn show_face_options(&mut self, ui: &mut Ui) {
        ui.heading("Faces");
        ui.add_space(6.0);
        let mut selection = self.settings.swap.face_selection;
        ComboBox::from_label("Use face")
            .selected_text(selection.as_label())
            .show_ui(ui, |ui| {
                for option in FaceSelection::ALL {
                    ui.selectable_value(&mut selection, option, option.as_label());
                }
            });
        self.set_face_selection(selection);

        let mut swap_all = self.settings.swap.swap_all_faces;
        if ui
            .checkbox(&mut swap_all, "Swap every face in the target")
            .changed()
        {
            self.set_swap_all_faces(swap_all);
        }
    }

    fn show_actions(&mut self, ui: &mut Ui) {
        let width = ui.available_width();
        if ui
            .add_enabled(
                self.can_swap(),
                Button::new(RichText::new("Swap faces").size(16.0).strong())
                    .min_size(vec2(width, 40.0)),
            )
            .clicked()
        {
            self.run_swap();
        }

        let has_result = self.result.is_some();
        ui.horizontal(|ui| {
            let half = (width - 8.0) / 2.0;
            if ui
                .add_enabled(has_result, Button::new("Save").min_size(vec2(half, 30.0)))
                .on_hover_text("Save into the output directory")
                .clicked()
            {
                self.quick_save();
            }
            if ui
                .add_enabled(has_result, Button::new("Save result…").min_size(vec2(half, 30.0)))
                .clicked()
            {
                self.save_result_dialog();
            }
        });
        if let Some(saved) = self.result.as_ref().and_then(|r| r.saved_to.as_ref()) {
            ui.label(RichText::new(format!("Saved to {}", saved.display())).small());
        }
        if ui
            .add(Button::new("Open output folder").min_size(vec2(width, 30.0)))
            .on_hover_text(self.settings.output.directory.display().to_string())
            .clicked()
        {
            let ctx = ui.ctx().clone();
            self.open_output_folder(&ctx);
        }
    }

    fn show_model_settings(&mut self, ui: &mut Ui, palette: theme::Palette) {
        ui.heading("Models");
        ui.add_space(6.0);
        ui.label(
            RichText::new("Folder holding the detector, recognizer and swapper ONNX files.")
                .small()
                .color(palette.subtle_text),
        );
        let response = ui.add(
            TextEdit::singleline(&mut self.models_dir_input).desired_width(f32::INFINITY),
        );
        let submitted =
            response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        ui.horizontal(|ui| {
            if ui.button("Browse…").clicked() {
                self.open_models_dir_dialog();
            }
            if ui.button("Reload models").clicked() || submitted {
                self.apply_models_dir_input();
            }
        });
    }
}

fn quality_hint(quality: QualityLevel) -> &'static str {
    match quality {
        QualityLevel::Basic => "Raw swap, no post-processing.",
        QualityLevel::Hd => "Sharpening, skin smoothing and colour matching.",
        QualityLevel::UltraHd => "HD plus feature boost and adaptive tone mapping.",
    }
}
