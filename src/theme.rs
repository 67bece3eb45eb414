//! Centralized theme constants for Blood Bank Dashboard
//! All colors, sizes, and styling should reference these constants

use crate::views::Tone;
use egui::Color32;

// =============================================================================
// COLORS - Backgrounds
// =============================================================================
pub const BG_BASE: Color32 = Color32::from_rgb(0x09, 0x09, 0x0b); // zinc-950
pub const BG_ELEVATED: Color32 = Color32::from_rgb(0x18, 0x18, 0x1b); // zinc-900
pub const BG_INPUT: Color32 = Color32::from_rgb(0x14, 0x14, 0x18);
pub const BG_SURFACE: Color32 = Color32::from_rgb(0x27, 0x27, 0x2a); // zinc-800
pub const BG_HOVER: Color32 = Color32::from_rgb(0x1f, 0x12, 0x13); // faint red hover

// =============================================================================
// COLORS - Accent
// =============================================================================
pub const ACCENT: Color32 = Color32::from_rgb(0xef, 0x44, 0x44); // red-500
pub const ACCENT_DARK: Color32 = Color32::from_rgb(0xb9, 0x1c, 0x1c); // red-700

// =============================================================================
// COLORS - Text
// =============================================================================
pub const TEXT_PRIMARY: Color32 = Color32::WHITE;
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0xe4, 0xe4, 0xe7); // zinc-200
pub const TEXT_MUTED: Color32 = Color32::from_rgb(0xa1, 0xa1, 0xaa); // zinc-400
pub const TEXT_DIM: Color32 = Color32::from_rgb(0x71, 0x71, 0x7a); // zinc-500

// =============================================================================
// COLORS - Borders
// =============================================================================
pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(0x27, 0x27, 0x2a); // zinc-800
pub const BORDER_DEFAULT: Color32 = Color32::from_rgb(0x3f, 0x3f, 0x46); // zinc-700

// =============================================================================
// COLORS - Status
// =============================================================================
pub const STATUS_SUCCESS: Color32 = Color32::from_rgb(0x34, 0xd3, 0x99); // emerald-400
pub const STATUS_WARNING: Color32 = Color32::from_rgb(0xfb, 0xbf, 0x24); // amber-400
pub const STATUS_ERROR: Color32 = Color32::from_rgb(0xf8, 0x71, 0x71); // red-400
pub const STATUS_INFO: Color32 = Color32::from_rgb(0x60, 0xa5, 0xfa); // blue-400

// =============================================================================
// COLORS - Buttons
// =============================================================================
pub const BTN_DEFAULT: Color32 = Color32::from_rgb(0x3f, 0x3f, 0x46); // zinc-700
pub const BTN_ACCENT: Color32 = ACCENT;
pub const BTN_DANGER: Color32 = Color32::from_rgb(0xdc, 0x26, 0x26); // red-600

// =============================================================================
// COLORS - Badge tones
// =============================================================================

/// Returns (background ~10% alpha, text) for a badge tone
pub fn tone_colors(tone: Tone) -> (Color32, Color32) {
    let text = match tone {
        Tone::Red => Color32::from_rgb(0xf8, 0x71, 0x71),
        Tone::Orange => Color32::from_rgb(0xfb, 0x92, 0x3c),
        Tone::Yellow => Color32::from_rgb(0xfb, 0xbf, 0x24),
        Tone::Blue => Color32::from_rgb(0x60, 0xa5, 0xfa),
        Tone::Green => Color32::from_rgb(0x34, 0xd3, 0x99),
    };
    let bg = Color32::from_rgba_unmultiplied(text.r(), text.g(), text.b(), 26);
    (bg, text)
}

/// Fixed palette cycled through by chart series
pub const CHART_PALETTE: [Color32; 8] = [
    Color32::from_rgb(0xef, 0x44, 0x44),
    Color32::from_rgb(0xf9, 0x73, 0x16),
    Color32::from_rgb(0xea, 0xb3, 0x08),
    Color32::from_rgb(0x22, 0xc5, 0x5e),
    Color32::from_rgb(0x06, 0xb6, 0xd4),
    Color32::from_rgb(0x3b, 0x82, 0xf6),
    Color32::from_rgb(0x8b, 0x5c, 0xf6),
    Color32::from_rgb(0xec, 0x48, 0x99),
];

// =============================================================================
// SIZES
// =============================================================================
pub const FONT_TITLE: f32 = 20.0;
pub const FONT_HEADING: f32 = 16.0;
pub const FONT_BODY: f32 = 14.0;
pub const FONT_SMALL: f32 = 11.0;

pub const SIDEBAR_WIDTH: f32 = 220.0;
pub const ROW_HEIGHT: f32 = 34.0;
pub const HEADER_HEIGHT: f32 = 36.0;
pub const FORM_WIDTH: f32 = 420.0;

pub const RADIUS_DEFAULT: f32 = 4.0;
pub const RADIUS_MEDIUM: f32 = 6.0;
pub const RADIUS_LARGE: f32 = 8.0;

pub const STROKE_DEFAULT: f32 = 1.0;

pub const SPACING_SM: f32 = 4.0;
pub const SPACING_MD: f32 = 8.0;
pub const SPACING_LG: f32 = 12.0;
pub const SPACING_XL: f32 = 16.0;

// =============================================================================
// HELPER - Apply global visuals
// =============================================================================
pub fn apply_visuals(ctx: &egui::Context) {
    let widget = |bg_fill, weak_bg_fill, bg_stroke, fg| egui::style::WidgetVisuals {
        bg_fill,
        weak_bg_fill,
        bg_stroke,
        fg_stroke: egui::Stroke::new(STROKE_DEFAULT, fg),
        corner_radius: RADIUS_DEFAULT.into(),
        expansion: 0.0,
    };
    let border = egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE);

    ctx.set_visuals(egui::Visuals {
        dark_mode: true,
        panel_fill: BG_BASE,
        window_fill: Color32::from_rgb(0x1a, 0x1a, 0x1e),
        extreme_bg_color: BG_INPUT,
        faint_bg_color: BG_ELEVATED,
        hyperlink_color: ACCENT,
        selection: egui::style::Selection {
            bg_fill: Color32::from_rgb(0x3a, 0x3a, 0x3f),
            stroke: egui::Stroke::NONE,
        },
        widgets: egui::style::Widgets {
            noninteractive: widget(BG_ELEVATED, BG_SURFACE, border, TEXT_PRIMARY),
            inactive: widget(Color32::TRANSPARENT, BG_ELEVATED, border, TEXT_SECONDARY),
            hovered: widget(BG_HOVER, Color32::from_rgb(0x30, 0x30, 0x35), egui::Stroke::NONE, TEXT_PRIMARY),
            active: widget(
                Color32::from_rgb(0x2e, 0x2e, 0x33),
                Color32::from_rgb(0x2e, 0x2e, 0x33),
                egui::Stroke::NONE,
                TEXT_PRIMARY,
            ),
            open: widget(BG_SURFACE, BG_ELEVATED, border, TEXT_PRIMARY),
        },
        striped: false,
        interact_cursor: Some(egui::CursorIcon::PointingHand),
        popup_shadow: egui::epaint::Shadow {
            offset: [0, 4],
            blur: 12,
            spread: 0,
            color: Color32::from_black_alpha(80),
        },
        window_stroke: egui::Stroke::new(1.0, Color32::from_rgb(0x2a, 0x2a, 0x2e)),
        window_corner_radius: egui::CornerRadius::same(8),
        menu_corner_radius: egui::CornerRadius::same(8),
        ..egui::Visuals::dark()
    });

    ctx.style_mut(|style| {
        style.interaction.selectable_labels = false;
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        style.spacing.scroll.bar_width = 6.0;
        style.spacing.scroll.floating = false;
    });
}

// =============================================================================
// HELPER - Frames
// =============================================================================
pub fn card_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_ELEVATED)
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE))
        .corner_radius(RADIUS_LARGE)
        .inner_margin(egui::Margin::same(SPACING_LG as i8))
}

pub fn sidebar_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_ELEVATED)
        .inner_margin(egui::Margin::symmetric(SPACING_MD as i8, SPACING_XL as i8))
}

pub fn modal_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(Color32::from_rgb(0x12, 0x12, 0x14))
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE))
        .corner_radius(RADIUS_LARGE)
        .inner_margin(SPACING_XL)
}

// =============================================================================
// HELPER - Button styles
// =============================================================================

/// Default gray button
pub fn button(text: impl Into<String>) -> egui::Button<'static> {
    egui::Button::new(text.into())
        .fill(BTN_DEFAULT)
        .corner_radius(RADIUS_DEFAULT)
}

/// Accent red button for primary actions
pub fn button_accent(text: impl Into<String>) -> egui::Button<'static> {
    egui::Button::new(egui::RichText::new(text.into()).color(TEXT_PRIMARY))
        .fill(BTN_ACCENT)
        .corner_radius(RADIUS_DEFAULT)
}

/// Danger button for destructive actions like Delete
pub fn button_danger(text: impl Into<String>) -> egui::Button<'static> {
    egui::Button::new(egui::RichText::new(text.into()).color(TEXT_PRIMARY))
        .fill(BTN_DANGER)
        .corner_radius(RADIUS_DEFAULT)
}

/// Sidebar navigation entry; returns true if clicked
pub fn nav_item(ui: &mut egui::Ui, icon: &str, label: &str, active: bool) -> bool {
    let w = ui.available_width();
    let (rect, response) = ui.allocate_exact_size(egui::vec2(w, 34.0), egui::Sense::click());
    if active {
        ui.painter().rect_filled(rect, RADIUS_MEDIUM, ACCENT_DARK);
    } else if response.hovered() {
        ui.painter().rect_filled(rect, RADIUS_MEDIUM, BG_SURFACE);
    }
    let color = if active { TEXT_PRIMARY } else { TEXT_SECONDARY };
    ui.painter().text(
        rect.left_center() + egui::vec2(12.0, 0.0),
        egui::Align2::LEFT_CENTER,
        format!("{}  {}", icon, label),
        egui::FontId::proportional(FONT_BODY),
        color,
    );
    response.clicked()
}

/// Small square icon button painted without a frame; returns the response
pub fn icon_button(ui: &mut egui::Ui, icon: &str, hover_color: Color32) -> egui::Response {
    let size = 24.0;
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
    let color = if response.hovered() {
        ui.painter().rect_filled(rect, RADIUS_DEFAULT, BG_SURFACE);
        hover_color
    } else {
        TEXT_DIM
    };
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(15.0),
        color,
    );
    response
}
