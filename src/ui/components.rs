//! Reusable UI components
//!
//! Badges, dashboard cards and the small painted charts. Charts are drawn
//! directly with the painter; they only need bars and a polyline.

use crate::theme;
use crate::views::{Cell, Tone};
use eframe::egui;

/// Pill-shaped colored label
pub fn badge(ui: &mut egui::Ui, text: &str, tone: Tone) -> egui::Response {
    let (bg, fg) = theme::tone_colors(tone);
    let font = egui::FontId::proportional(12.0);
    let galley = ui.painter().layout_no_wrap(text.to_string(), font, fg);
    let size = galley.size() + egui::vec2(16.0, 6.0);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
    if ui.is_rect_visible(rect) {
        ui.painter().rect_filled(rect, size.y / 2.0, bg);
        ui.painter()
            .galley(rect.center() - galley.size() / 2.0, galley, fg);
    }
    response
}

/// Draw one table cell
pub fn cell(ui: &mut egui::Ui, cell: &Cell) {
    match cell {
        Cell::Text(text) => {
            ui.add(egui::Label::new(egui::RichText::new(text).color(theme::TEXT_SECONDARY)).truncate());
        }
        Cell::Badge { text, tone } => {
            badge(ui, text, *tone);
        }
    }
}

/// Dashboard summary card: icon, big number, caption
pub fn stat_card(ui: &mut egui::Ui, icon: &str, label: &str, value: i64, color: egui::Color32) {
    theme::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(icon).size(28.0).color(color));
            ui.add_space(theme::SPACING_MD);
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(value.to_string())
                        .size(theme::FONT_TITLE)
                        .strong()
                        .color(theme::TEXT_PRIMARY),
                );
                ui.label(egui::RichText::new(label).size(theme::FONT_SMALL).color(theme::TEXT_DIM));
            });
        });
    });
}

/// Titled card wrapping a chart or list
pub fn panel(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    theme::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(egui::RichText::new(title).size(theme::FONT_HEADING).strong());
        ui.add_space(theme::SPACING_MD);
        add_contents(ui);
    });
}

fn empty_chart(ui: &mut egui::Ui, height: f32) {
    ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
        ui.centered_and_justified(|ui| {
            ui.label(egui::RichText::new("No data").color(theme::TEXT_DIM));
        });
    });
}

/// Vertical bar chart, one bar per (label, value), colors cycled from the palette
pub fn bar_chart(ui: &mut egui::Ui, data: &[(String, f64)], height: f32) {
    if data.is_empty() {
        empty_chart(ui, height);
        return;
    }
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), height),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let label_h = 18.0;
    let plot = egui::Rect::from_min_max(rect.min, egui::pos2(rect.max.x, rect.max.y - label_h));
    let max = data.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max).max(1.0);

    painter.line_segment(
        [plot.left_bottom(), plot.right_bottom()],
        egui::Stroke::new(1.0, theme::BORDER_DEFAULT),
    );

    let slot = plot.width() / data.len() as f32;
    let bar_w = (slot * 0.6).min(48.0);
    let hover = response.hover_pos();
    for (i, (label, value)) in data.iter().enumerate() {
        let color = theme::CHART_PALETTE[i % theme::CHART_PALETTE.len()];
        let cx = plot.left() + slot * (i as f32 + 0.5);
        let h = (*value / max) as f32 * (plot.height() - 16.0);
        let bar = egui::Rect::from_min_max(
            egui::pos2(cx - bar_w / 2.0, plot.bottom() - h),
            egui::pos2(cx + bar_w / 2.0, plot.bottom()),
        );
        painter.rect_filled(bar, 3.0, color);
        painter.text(
            egui::pos2(cx, rect.bottom()),
            egui::Align2::CENTER_BOTTOM,
            label,
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_MUTED,
        );
        if hover.is_some_and(|p| p.x >= cx - slot / 2.0 && p.x < cx + slot / 2.0) {
            painter.text(
                bar.center_top() - egui::vec2(0.0, 2.0),
                egui::Align2::CENTER_BOTTOM,
                format_value(*value),
                egui::FontId::proportional(theme::FONT_SMALL),
                theme::TEXT_PRIMARY,
            );
        }
    }
}

/// Line chart over evenly spaced labeled points
pub fn line_chart(ui: &mut egui::Ui, data: &[(String, f64)], height: f32) {
    if data.is_empty() {
        empty_chart(ui, height);
        return;
    }
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), height),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let label_h = 18.0;
    let plot = egui::Rect::from_min_max(
        rect.min + egui::vec2(8.0, 16.0),
        egui::pos2(rect.max.x - 8.0, rect.max.y - label_h),
    );
    let max = data.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max).max(1.0);
    let step = if data.len() > 1 {
        plot.width() / (data.len() - 1) as f32
    } else {
        0.0
    };

    let points: Vec<egui::Pos2> = data
        .iter()
        .enumerate()
        .map(|(i, (_, v))| {
            let x = if data.len() > 1 { plot.left() + step * i as f32 } else { plot.center().x };
            let y = plot.bottom() - (*v / max) as f32 * plot.height();
            egui::pos2(x, y)
        })
        .collect();

    painter.line_segment(
        [plot.left_bottom(), plot.right_bottom()],
        egui::Stroke::new(1.0, theme::BORDER_DEFAULT),
    );
    painter.add(egui::Shape::line(
        points.clone(),
        egui::Stroke::new(2.0, theme::ACCENT),
    ));
    for (p, (label, value)) in points.iter().zip(data) {
        painter.circle_filled(*p, 3.5, theme::ACCENT);
        painter.text(
            *p - egui::vec2(0.0, 6.0),
            egui::Align2::CENTER_BOTTOM,
            format_value(*value),
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_MUTED,
        );
        painter.text(
            egui::pos2(p.x, rect.bottom()),
            egui::Align2::CENTER_BOTTOM,
            label,
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_MUTED,
        );
    }
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.1}", v)
    }
}
