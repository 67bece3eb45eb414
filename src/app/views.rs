//! View rendering (sidebar, entity tables, dashboard, toasts)

use super::App;
use crate::constants::*;
use crate::filters::{category_options, category_placeholder, search_hint};
use crate::notifications::NotificationKind;
use crate::theme;
use crate::types::*;
use crate::ui::components;
use crate::utils;
use crate::views::{format_date, project_rows, Row, TableRecord};
use chrono::Local;
use eframe::egui;
use std::time::Instant;

const ACTIONS_WIDTH: f32 = 72.0;

/// Row button pressed in an entity table
enum RowAction {
    Edit(i64),
    Delete(i64),
}

impl App {
    // ========================================================================
    // SIDEBAR
    // ========================================================================

    pub(crate) fn render_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("nav_panel")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(theme::sidebar_frame())
            .show(ctx, |ui| {
                ui.add_space(theme::SPACING_MD);
                ui.horizontal(|ui| {
                    ui.add_space(theme::SPACING_SM);
                    if self.logo_texture.is_none() {
                        self.logo_texture = utils::rasterize_logo(64).map(|(pixels, w, h)| {
                            ctx.load_texture(
                                "logo",
                                egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &pixels),
                                egui::TextureOptions::LINEAR,
                            )
                        });
                    }
                    if let Some(texture) = &self.logo_texture {
                        ui.image(egui::load::SizedTexture::new(texture.id(), egui::vec2(28.0, 28.0)));
                    }
                    ui.label(
                        egui::RichText::new("Blood Bank")
                            .size(theme::FONT_TITLE)
                            .strong()
                            .color(theme::TEXT_PRIMARY),
                    );
                });
                ui.add_space(theme::SPACING_XL);

                let mut target = None;
                for section in Section::ALL {
                    let active = self.state.active == section;
                    if theme::nav_item(ui, section.icon(), section.title(), active) {
                        target = Some(section);
                    }
                }
                if let Some(section) = target {
                    self.navigate(section);
                }

                ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(format!("v{}", APP_VERSION))
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_DIM),
                        )
                        .selectable(false),
                    );
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(self.api.base_url())
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_DIM),
                        )
                        .truncate(),
                    );
                });
            });
    }

    // ========================================================================
    // CENTRAL PANEL
    // ========================================================================

    pub(crate) fn render_central(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(20)),
            )
            .show(ctx, |ui| {
                let section = self.state.active;
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(section.title())
                            .size(theme::FONT_TITLE)
                            .strong()
                            .color(theme::TEXT_PRIMARY),
                    );
                    if section == Section::Dashboard {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui
                                .add(theme::button(format!("{}  Refresh", egui_phosphor::regular::ARROWS_CLOCKWISE)))
                                .clicked()
                            {
                                self.load_section(Section::Dashboard);
                            }
                        });
                    }
                });
                ui.add_space(theme::SPACING_LG);

                match section.entity() {
                    Some(kind) => {
                        self.render_toolbar(ui, kind);
                        ui.add_space(theme::SPACING_LG);
                        self.render_entity_table(ui, kind);
                    }
                    None => self.render_dashboard(ui),
                }
            });
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui, kind: EntityKind) {
        let mut changed = false;
        let mut add = false;
        let mut refresh = false;
        let mut export = false;

        ui.horizontal(|ui| {
            let criteria = self.state.criteria_mut(kind);

            egui::Frame::new()
                .fill(theme::BG_INPUT)
                .stroke(egui::Stroke::new(1.0, theme::BORDER_SUBTLE))
                .corner_radius(theme::RADIUS_DEFAULT)
                .inner_margin(egui::Margin::symmetric(8, 6))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(egui_phosphor::regular::MAGNIFYING_GLASS)
                                .color(theme::TEXT_DIM),
                        );
                        let search = ui.add(
                            egui::TextEdit::singleline(&mut criteria.search)
                                .hint_text(search_hint(kind))
                                .frame(false)
                                .desired_width(260.0),
                        );
                        changed |= search.changed();
                    });
                });

            let placeholder = category_placeholder(kind);
            let selected = if criteria.category.is_empty() {
                placeholder.to_string()
            } else {
                criteria.category.clone()
            };
            egui::ComboBox::from_id_salt(("category_filter", kind.endpoint()))
                .selected_text(selected)
                .width(160.0)
                .show_ui(ui, |ui| {
                    changed |= ui
                        .selectable_value(&mut criteria.category, String::new(), placeholder)
                        .changed();
                    for option in category_options(kind) {
                        changed |= ui
                            .selectable_value(&mut criteria.category, option.to_string(), option)
                            .changed();
                    }
                });

            if !criteria.is_empty()
                && theme::icon_button(ui, egui_phosphor::regular::X, theme::TEXT_PRIMARY)
                    .on_hover_text("Clear filters")
                    .clicked()
            {
                *criteria = Default::default();
                changed = true;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                add = ui
                    .add(theme::button_accent(format!(
                        "{}  {}",
                        egui_phosphor::regular::PLUS,
                        crate::forms::submit_label(kind, false)
                    )))
                    .clicked();
                export = ui
                    .add(theme::button(format!("{}  Export CSV", egui_phosphor::regular::DOWNLOAD_SIMPLE)))
                    .clicked();
                refresh = ui
                    .add(theme::button(egui_phosphor::regular::ARROWS_CLOCKWISE))
                    .on_hover_text("Reload")
                    .clicked();
            });
        });

        if changed {
            self.state.apply_filters(kind);
        }
        if add {
            self.open_create(kind);
        }
        if export {
            self.export_csv(kind);
        }
        if refresh {
            self.load_section(kind.section());
        }
    }

    // ========================================================================
    // ENTITY TABLE
    // ========================================================================

    fn rows_for(&self, kind: EntityKind) -> (&'static [&'static str], Vec<Row>) {
        let now = Local::now();
        let cache = &self.state.cache;
        let visible = self.state.visible(kind);
        match kind {
            EntityKind::Donors => (Donor::COLUMNS, project_rows(&cache.donors, visible, now)),
            EntityKind::Patients => (Patient::COLUMNS, project_rows(&cache.patients, visible, now)),
            EntityKind::Inventory => (InventoryUnit::COLUMNS, project_rows(&cache.inventory, visible, now)),
            EntityKind::Requests => (BloodRequest::COLUMNS, project_rows(&cache.requests, visible, now)),
            EntityKind::Donations => (DonationRecord::COLUMNS, project_rows(&cache.donations, visible, now)),
        }
    }

    fn render_entity_table(&mut self, ui: &mut egui::Ui, kind: EntityKind) {
        let (columns, rows) = self.rows_for(kind);

        ui.add(
            egui::Label::new(
                egui::RichText::new(format!(
                    "Showing {} of {} records",
                    rows.len(),
                    self.state.cache.len(kind)
                ))
                .size(theme::FONT_SMALL)
                .color(theme::TEXT_DIM),
            )
            .selectable(false),
        );
        ui.add_space(theme::SPACING_SM);

        match entity_table(ui, columns, &rows) {
            Some(RowAction::Edit(id)) => self.open_edit(kind, id),
            Some(RowAction::Delete(id)) => self.pending_delete = Some((kind, id)),
            None => {}
        }
    }

    // ========================================================================
    // DASHBOARD
    // ========================================================================

    fn render_dashboard(&self, ui: &mut egui::Ui) {
        let Some(stats) = &self.state.cache.dashboard else {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new("Loading dashboard...").color(theme::TEXT_DIM));
            });
            return;
        };

        egui::ScrollArea::vertical().show(ui, |ui| {
            let cards = &stats.summary_cards;
            let entries = [
                (egui_phosphor::regular::USERS, "Total Donors", cards.total_donors, theme::STATUS_INFO),
                (egui_phosphor::regular::FIRST_AID, "Total Patients", cards.total_patients, theme::STATUS_SUCCESS),
                (egui_phosphor::regular::DROP, "Blood Units", cards.total_blood_units, theme::ACCENT),
                (egui_phosphor::regular::HOURGLASS, "Pending Requests", cards.pending_requests, theme::STATUS_WARNING),
                (egui_phosphor::regular::SIREN, "Critical Requests", cards.critical_requests, theme::STATUS_ERROR),
                (egui_phosphor::regular::HAND_HEART, "Recent Donations", cards.recent_donations, theme::STATUS_SUCCESS),
            ];
            ui.columns(3, |cols| {
                for (i, (icon, label, value, color)) in entries.into_iter().enumerate() {
                    components::stat_card(&mut cols[i % 3], icon, label, value, color);
                    cols[i % 3].add_space(theme::SPACING_MD);
                }
            });
            ui.add_space(theme::SPACING_LG);

            let to_series = |map: &std::collections::BTreeMap<String, i64>| -> Vec<(String, f64)> {
                map.iter().map(|(k, v)| (k.clone(), *v as f64)).collect()
            };
            let groups = to_series(&stats.charts.blood_group_distribution);
            let statuses = to_series(&stats.charts.request_status_distribution);
            let monthly: Vec<(String, f64)> = stats
                .charts
                .monthly_donations
                .iter()
                .map(|m| (short_month(&m.month), m.donations as f64))
                .collect();

            ui.columns(2, |cols| {
                components::panel(&mut cols[0], "Blood Group Distribution", |ui| {
                    components::bar_chart(ui, &groups, 200.0);
                });
                components::panel(&mut cols[1], "Monthly Donations", |ui| {
                    components::line_chart(ui, &monthly, 200.0);
                });
            });
            ui.add_space(theme::SPACING_LG);

            ui.columns(3, |cols| {
                components::panel(&mut cols[0], "Request Status", |ui| {
                    components::bar_chart(ui, &statuses, 180.0);
                });
                components::panel(&mut cols[1], "Low Stock Alerts", |ui| {
                    alert_list(
                        ui,
                        stats.alerts.low_stock.iter().map(|u| {
                            format!("{} - Only {} units left", u.blood_group, u.units_available)
                        }),
                        "No low stock alerts",
                        theme::STATUS_WARNING,
                    );
                });
                components::panel(&mut cols[2], "Expiry Alerts", |ui| {
                    alert_list(
                        ui,
                        stats.alerts.expiry_alerts.iter().map(|u| {
                            format!("{} - Expires {}", u.blood_group, format_date(u.expiry_date))
                        }),
                        "No expiry alerts",
                        theme::STATUS_ERROR,
                    );
                });
            });
        });
    }

    // ========================================================================
    // TOASTS
    // ========================================================================

    /// Draw live notifications stacked in the top-right corner
    pub(crate) fn render_toasts(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let active = self.notifier.active(now);
        if active.is_empty() {
            return;
        }

        let screen = ctx.screen_rect();
        let margin = 16.0;
        let mut y = screen.top() + margin;
        for note in &active {
            let alpha = note.alpha(now);
            let (icon, color) = match note.kind {
                NotificationKind::Success => (egui_phosphor::regular::CHECK_CIRCLE, theme::STATUS_SUCCESS),
                NotificationKind::Error => (egui_phosphor::regular::X_CIRCLE, theme::STATUS_ERROR),
                NotificationKind::Info => (egui_phosphor::regular::INFO, theme::STATUS_INFO),
            };
            let response = egui::Area::new(egui::Id::new(("toast", note.id)))
                .order(egui::Order::Tooltip)
                .fixed_pos(egui::pos2(screen.right() - margin, y))
                .pivot(egui::Align2::RIGHT_TOP)
                .interactable(false)
                .show(ctx, |ui| {
                    egui::Frame::new()
                        .fill(theme::BG_ELEVATED.gamma_multiply(alpha))
                        .stroke(egui::Stroke::new(1.0, color.gamma_multiply(alpha * 0.6)))
                        .corner_radius(theme::RADIUS_MEDIUM)
                        .inner_margin(egui::Margin::symmetric(16, 10))
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(icon).color(color.gamma_multiply(alpha)));
                                ui.add(
                                    egui::Label::new(
                                        egui::RichText::new(&note.message)
                                            .color(theme::TEXT_PRIMARY.gamma_multiply(alpha)),
                                    )
                                    .wrap(),
                                );
                            });
                        });
                });
            y += response.response.rect.height() + theme::SPACING_MD;
        }
        ctx.request_repaint();
    }
}

/// Generic table over projected rows with edit/delete actions per row
fn entity_table(ui: &mut egui::Ui, columns: &[&str], rows: &[Row]) -> Option<RowAction> {
    use egui_extras::{Column, TableBuilder};

    let mut action = None;
    let data_width = (ui.available_width() - ACTIONS_WIDTH).max(0.0);
    let col_width = data_width / columns.len().max(1) as f32;

    let mut table = TableBuilder::new(ui)
        .striped(true)
        .resizable(false)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .min_scrolled_height(0.0);
    for _ in columns {
        table = table.column(Column::exact(col_width - 8.0).clip(true));
    }
    table = table.column(Column::exact(ACTIONS_WIDTH));

    table
        .header(theme::HEADER_HEIGHT, |mut header| {
            for name in columns.iter().copied().chain(std::iter::once("ACTIONS")) {
                header.col(|ui| {
                    ui.label(
                        egui::RichText::new(name)
                            .size(theme::FONT_SMALL)
                            .strong()
                            .color(theme::TEXT_DIM),
                    );
                });
            }
        })
        .body(|body| {
            body.rows(theme::ROW_HEIGHT, rows.len(), |mut row| {
                let record = &rows[row.index()];
                for cell in &record.cells {
                    row.col(|ui| components::cell(ui, cell));
                }
                row.col(|ui| {
                    if theme::icon_button(ui, egui_phosphor::regular::PENCIL_SIMPLE, theme::STATUS_INFO)
                        .on_hover_text("Edit")
                        .clicked()
                    {
                        action = Some(RowAction::Edit(record.id));
                    }
                    if theme::icon_button(ui, egui_phosphor::regular::TRASH, theme::STATUS_ERROR)
                        .on_hover_text("Delete")
                        .clicked()
                    {
                        action = Some(RowAction::Delete(record.id));
                    }
                });
            });
        });

    if rows.is_empty() {
        ui.add_space(theme::SPACING_XL);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("No records found").color(theme::TEXT_DIM));
        });
    }

    action
}

fn alert_list(
    ui: &mut egui::Ui,
    items: impl Iterator<Item = String>,
    empty: &str,
    color: egui::Color32,
) {
    let mut any = false;
    for text in items {
        any = true;
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(egui_phosphor::regular::WARNING).color(color));
            ui.label(egui::RichText::new(text).color(theme::TEXT_SECONDARY));
        });
    }
    if !any {
        ui.label(egui::RichText::new(empty).color(theme::TEXT_DIM));
    }
}

/// "March 2024" -> "Mar 2024" so chart labels fit
fn short_month(label: &str) -> String {
    match label.split_once(' ') {
        Some((month, year)) if month.chars().count() > 3 => {
            format!("{} {}", month.chars().take(3).collect::<String>(), year)
        }
        _ => label.to_string(),
    }
}
