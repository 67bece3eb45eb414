//! Modal dialogs (entity form, delete confirmation)

use super::App;
use crate::forms::{form_title, submit_label, FieldKind, FormState};
use crate::theme;
use crate::types::*;
use eframe::egui;
use tracing::debug;

impl App {
    pub(crate) fn open_create(&mut self, kind: EntityKind) {
        self.form = Some(FormState::create(kind));
    }

    /// Open the edit form prefilled from the cached record with `id`
    pub(crate) fn open_edit(&mut self, kind: EntityKind, id: i64) {
        let cache = &self.state.cache;
        let form = match kind {
            EntityKind::Donors => cache.donors.iter().find(|r| r.id == id).map(|r| FormState::edit(kind, id, r)),
            EntityKind::Patients => cache.patients.iter().find(|r| r.id == id).map(|r| FormState::edit(kind, id, r)),
            EntityKind::Inventory => cache.inventory.iter().find(|r| r.id == id).map(|r| FormState::edit(kind, id, r)),
            EntityKind::Requests => cache.requests.iter().find(|r| r.id == id).map(|r| FormState::edit(kind, id, r)),
            EntityKind::Donations => cache.donations.iter().find(|r| r.id == id).map(|r| FormState::edit(kind, id, r)),
        };
        match form {
            Some(form) => self.form = Some(form),
            None => {
                debug!(?kind, id, "Edit target no longer cached");
                self.notifier
                    .info(format!("This {} is no longer available", kind.noun()));
                self.load_section(kind.section());
            }
        }
    }

    pub(crate) fn render_form_modal(&mut self, ctx: &egui::Context) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        let mut submit = false;
        let mut cancel = false;
        let editing = form.is_editing();

        let modal_area = egui::Modal::default_area(egui::Id::new("form_modal"))
            .default_width(theme::FORM_WIDTH + theme::SPACING_XL * 2.0);
        let modal = egui::Modal::new(egui::Id::new("form_modal"))
            .area(modal_area)
            .backdrop_color(egui::Color32::from_black_alpha(180))
            .frame(theme::modal_frame());
        let response = modal.show(ctx, |ui| {
            ui.set_min_width(theme::FORM_WIDTH);
            ui.set_max_width(theme::FORM_WIDTH);

            // Title bar with close button
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(form_title(form.kind, editing))
                        .size(theme::FONT_HEADING)
                        .strong(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if theme::icon_button(ui, egui_phosphor::regular::X, theme::STATUS_ERROR).clicked() {
                        cancel = true;
                    }
                });
            });
            ui.add_space(theme::SPACING_LG);

            egui::ScrollArea::vertical().max_height(480.0).show(ui, |ui| {
                for field in form.fields.clone() {
                    let label = if field.required {
                        format!("{} *", field.label)
                    } else {
                        field.label.to_string()
                    };
                    ui.label(egui::RichText::new(label).color(theme::TEXT_MUTED));

                    let value = form.value_mut(field.name);
                    match &field.kind {
                        FieldKind::Select(options) => {
                            let shown = if value.is_empty() {
                                "Select...".to_string()
                            } else {
                                value.clone()
                            };
                            egui::ComboBox::from_id_salt(("form_select", field.name))
                                .selected_text(shown)
                                .width(ui.available_width())
                                .show_ui(ui, |ui| {
                                    for option in options {
                                        ui.selectable_value(value, option.to_string(), *option);
                                    }
                                });
                        }
                        kind => {
                            let hint = match kind {
                                FieldKind::Date => "YYYY-MM-DD",
                                FieldKind::Tel => "Phone number",
                                FieldKind::Number { .. } => "0",
                                _ => "",
                            };
                            let edit = ui.add(
                                egui::TextEdit::singleline(value)
                                    .hint_text(hint)
                                    .desired_width(f32::INFINITY),
                            );
                            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                                submit = true;
                            }
                        }
                    }

                    if let Some(err) = form.errors.get(field.name) {
                        ui.label(
                            egui::RichText::new(format!("{}  {}", egui_phosphor::regular::WARNING, err))
                                .size(theme::FONT_SMALL)
                                .color(theme::STATUS_ERROR),
                        );
                    }
                    ui.add_space(theme::SPACING_MD);
                }
            });

            ui.add_space(theme::SPACING_MD);
            ui.horizontal(|ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = submit_label(form.kind, editing);
                    if ui
                        .add(theme::button_accent(format!("{}  {}", egui_phosphor::regular::CHECK, label)))
                        .clicked()
                    {
                        submit = true;
                    }
                    if ui.add(theme::button("Cancel")).clicked() {
                        cancel = true;
                    }
                });
            });
        });

        if cancel || response.should_close() {
            self.form = None;
        } else if submit {
            self.submit_form();
        }
    }

    pub(crate) fn render_delete_modal(&mut self, ctx: &egui::Context) {
        let Some((kind, id)) = self.pending_delete else {
            return;
        };

        let mut confirmed = false;
        let mut declined = false;

        let response = egui::Modal::new(egui::Id::new("delete_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(180))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(340.0);
                ui.vertical_centered(|ui| {
                    ui.add_space(4.0);
                    ui.label(
                        egui::RichText::new(egui_phosphor::regular::WARNING_CIRCLE)
                            .size(36.0)
                            .color(theme::STATUS_WARNING),
                    );
                    ui.add_space(8.0);
                    ui.label(
                        egui::RichText::new(format!(
                            "Are you sure you want to delete this {}?",
                            kind.noun()
                        ))
                        .size(theme::FONT_BODY),
                    );
                    ui.add_space(16.0);
                });
                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(theme::button_danger(format!("{}  Delete", egui_phosphor::regular::TRASH)))
                            .clicked()
                        {
                            confirmed = true;
                        }
                        if ui.add(theme::button("Cancel")).clicked() {
                            declined = true;
                        }
                    });
                });
            });

        if confirmed {
            self.pending_delete = None;
            self.confirm_delete(kind, id);
        } else if declined || response.should_close() {
            self.pending_delete = None;
        }
    }
}
