//! Colours and widget styling for FaceSwap Studio.
//!
//! Flat look: tight corners, no window shadow and a single soft shadow under popups.

use egui::{
    Color32, Context, CornerRadius, FontFamily, FontId, Frame, Margin, Shadow, Stroke, Style,
    TextStyle, Visuals,
};

/// Shared colour palette.
#[derive(Clone, Copy)]
pub struct Palette {
    pub canvas: Color32,
    pub panel: Color32,
    pub panel_dark: Color32,
    pub panel_light: Color32,
    pub accent: Color32,
    pub accent_soft: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub subtle_text: Color32,
    pub outline: Color32,
}

pub fn palette() -> Palette {
    Palette {
        canvas: Color32::from_rgb(14, 11, 20),
        panel: Color32::from_rgb(27, 22, 36),
        panel_dark: Color32::from_rgb(18, 14, 26),
        panel_light: Color32::from_rgb(48, 40, 64),
        accent: Color32::from_rgb(236, 120, 168),
        accent_soft: Color32::from_rgba_unmultiplied(236, 120, 168, 70),
        success: Color32::from_rgb(120, 214, 160),
        warning: Color32::from_rgb(255, 196, 110),
        danger: Color32::from_rgb(255, 110, 120),
        subtle_text: Color32::from_rgb(206, 198, 220),
        outline: Color32::from_rgba_unmultiplied(120, 104, 150, 150),
    }
}

/// Corner radius for buttons, inputs and cards.
const WIDGET_RADIUS: u8 = 4;
/// Corner radius for pill-shaped chips and badges.
const CHIP_RADIUS: u8 = 255;

/// Install the FaceSwap Studio style on `ctx`.
pub fn apply(ctx: &Context) {
    let mut style = (*ctx.style()).clone();
    style_from_palette(&mut style, palette());
    ctx.set_style(style);
}

fn style_from_palette(style: &mut Style, palette: Palette) {
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);
    style.spacing.interact_size.y = 26.0;
    style.spacing.window_margin = Margin::symmetric(18, 12);
    style.spacing.menu_margin = Margin::same(6);
    style.spacing.indent = 14.0;

    style.text_styles = [
        (TextStyle::Heading, FontId::new(17.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(13.5, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(13.5, FontFamily::Proportional)),
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(12.5, FontFamily::Monospace)),
    ]
    .into();

    style.visuals = visuals_from_palette(palette);
}

/// Frame used for the image cards.
pub fn card_frame(palette: Palette) -> Frame {
    Frame::new()
        .fill(palette.panel_dark)
        .stroke(Stroke::new(1.0, palette.panel_light))
        .corner_radius(CornerRadius::same(WIDGET_RADIUS))
        .inner_margin(Margin::same(12))
}

/// Pill outlined in `accent`, used by the status chips and badge.
pub fn chip_frame(palette: Palette, accent: Color32) -> Frame {
    Frame::new()
        .fill(palette.panel_dark)
        .stroke(Stroke::new(1.0, accent))
        .corner_radius(CornerRadius::same(CHIP_RADIUS))
        .inner_margin(Margin::symmetric(10, 3))
}

fn visuals_from_palette(palette: Palette) -> Visuals {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(Color32::from_rgb(240, 234, 246));
    visuals.hyperlink_color = palette.accent;
    visuals.panel_fill = palette.panel;
    visuals.window_fill = palette.panel;
    visuals.faint_bg_color = palette.panel_dark;
    visuals.extreme_bg_color = palette.canvas;
    visuals.window_stroke = Stroke::new(1.0, palette.panel_light);

    let radius = CornerRadius::same(WIDGET_RADIUS);
    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
        &mut visuals.widgets.open,
    ] {
        widget.corner_radius = radius;
        widget.expansion = 0.0;
    }

    visuals.widgets.noninteractive.bg_fill = palette.panel;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, palette.panel_light);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, palette.subtle_text);

    visuals.widgets.inactive.bg_fill = palette.panel_light;
    visuals.widgets.inactive.weak_bg_fill = palette.panel_light;
    visuals.widgets.inactive.bg_stroke = Stroke::NONE;

    visuals.widgets.hovered.bg_fill = palette.panel_light;
    visuals.widgets.hovered.weak_bg_fill = palette.panel_light;
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, palette.accent);

    visuals.widgets.active.bg_fill = palette.accent_soft;
    visuals.widgets.active.weak_bg_fill = palette.accent_soft;
    visuals.widgets.active.bg_stroke = Stroke::new(2.0, palette.accent);

    visuals.selection.bg_fill = palette.accent_soft;
    visuals.selection.stroke = Stroke::new(1.0, palette.accent);

    visuals.window_corner_radius = CornerRadius::same(6);
    visuals.menu_corner_radius = CornerRadius::same(WIDGET_RADIUS);
    visuals.window_shadow = Shadow::NONE;
    visuals.popup_shadow = Shadow {
        offset: [0, 2],
        blur: 8,
        spread: 0,
        color: Color32::from_black_alpha(120),
    };

    visuals
}
