//! Central panel with the source, target and result cards.

use egui::{CentralPanel, Frame, Image, Margin, RichText, TextureHandle, Ui, Vec2, vec2};
use image::RgbImage;

use crate::{FaceSwapApp, core::textures::load_texture_from_rgb, theme};

impl FaceSwapApp {
    pub fn show_previews(&mut self, ctx: &egui::Context) {
        let palette = theme::palette();
        self.upload_pending_textures(ctx);

        CentralPanel::default()
            .frame(Frame::new().fill(palette.canvas).inner_margin(Margin::same(16)))
            .show(ctx, |ui| {
                let spacing = 12.0;
                let card_width = ((ui.available_width() - 2.0 * spacing) / 3.0).max(120.0);
                let card_height = ui.available_height().max(160.0);
                let size = vec2(card_width, card_height);

                ui.horizontal_top(|ui| {
                    ui.spacing_mut().item_spacing.x = spacing;
                    image_card(
                        ui,
                        palette,
                        size,
                        "Source face",
                        self.source.as_ref().and_then(|s| s.texture.as_ref()),
                        "Pick the face to copy.",
                    );
                    image_card(
                        ui,
                        palette,
                        size,
                        "Target image",
                        self.target.as_ref().and_then(|t| t.texture.as_ref()),
                        "Pick the photo to change.",
                    );
                    let caption = match &self.result {
                        Some(result) => format!("Result · {}", result.quality.as_label()),
                        None => "Result".to_owned(),
                    };
                    image_card(
                        ui,
                        palette,
                        size,
                        &caption,
                        self.result.as_ref().and_then(|r| r.texture.as_ref()),
                        "Run a swap to see it here.",
                    );
                });
            });
    }

    fn upload_pending_textures(&mut self, ctx: &egui::Context) {
        let seq = &mut self.texture_seq;
        if let Some(source) = self.source.as_mut() {
            ensure_texture(ctx, "source", &source.image, &mut source.texture, seq);
        }
        if let Some(target) = self.target.as_mut() {
            ensure_texture(ctx, "target", &target.image, &mut target.texture, seq);
        }
        if let Some(result) = self.result.as_mut() {
            ensure_texture(ctx, "result", &result.image, &mut result.texture, seq);
        }
    }
}

fn ensure_texture(
    ctx: &egui::Context,
    prefix: &str,
    image: &RgbImage,
    slot: &mut Option<TextureHandle>,
    seq: &mut u64,
) {
    if slot.is_none() {
        *slot = Some(load_texture_from_rgb(ctx, prefix, image, seq));
    }
}

fn image_card(
    ui: &mut Ui,
    palette: theme::Palette,
    size: Vec2,
    title: &str,
    texture: Option<&TextureHandle>,
    placeholder: &str,
) {
    ui.allocate_ui(size, |ui| {
        theme::card_frame(palette).show(ui, |ui| {
            ui.set_min_size(size - vec2(24.0, 24.0));
            ui.vertical(|ui| {
                ui.label(RichText::new(title).strong().size(16.0));
                ui.add_space(6.0);
                let available = ui.available_size();
                match texture {
                    Some(texture) => {
                        let scaled = fit_within(texture.size_vec2(), available);
                        ui.centered_and_justified(|ui| {
                            ui.add(Image::new(texture).fit_to_exact_size(scaled));
                        });
                    }
                    None => {
                        ui.centered_and_justified(|ui| {
                            ui.label(RichText::new(placeholder).color(palette.subtle_text));
                        });
                    }
                }
            });
        });
    });
}

/// Largest size with the aspect ratio of `image` that fits in `available`.
fn fit_within(image: Vec2, available: Vec2) -> Vec2 {
    if image.x <= 0.0 || image.y <= 0.0 || available.x <= 0.0 || available.y <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = (available.x / image.x).min(available.y / image.y);
    if scale.is_finite() && scale > 0.0 {
        image * scale
    } else {
        image
    }
}
