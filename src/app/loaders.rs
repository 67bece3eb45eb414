//! Background network work: section loads, form submits, deletes
//!
//! Everything here spawns on the app's tokio runtime and reports back through
//! `AppEvent`s, which `poll_events` applies on the UI thread.

use super::App;
use crate::export::to_csv;
use crate::forms::{close_submitted, FormMode};
use crate::state::{AppEvent, FollowUp};
use crate::types::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

impl App {
    /// Switch the active section and fetch its data
    pub(crate) fn navigate(&mut self, section: Section) {
        if self.state.active != section {
            info!(?section, "Navigating");
        }
        self.state.active = section;
        self.load_section(section);
    }

    /// Fetch the data behind `section`, superseding any load still in flight
    pub(crate) fn load_section(&mut self, section: Section) {
        if let Some(previous) = self.load_token.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.load_token = Some(token.clone());

        let ticket = self.state.begin_load(section);
        debug!(?section, generation = ticket.generation, "Load started");

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let event = match section.entity() {
                Some(kind) => tokio::select! {
                    _ = token.cancelled() => None,
                    result = api.list(kind) => Some(AppEvent::Loaded { ticket, result }),
                },
                None => tokio::select! {
                    _ = token.cancelled() => None,
                    result = api.dashboard_stats() => Some(AppEvent::DashboardLoaded { ticket, result }),
                },
            };
            match event {
                Some(event) => {
                    let _ = tx.send(event);
                    ctx.request_repaint();
                }
                None => debug!(?section, generation = ticket.generation, "Load cancelled"),
            }
        });
    }

    /// Validate the open form and send it; the modal stays open until the save succeeds
    pub(crate) fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let Some(payload) = form.submit() else {
            debug!(kind = ?form.kind, errors = form.errors.len(), "Form blocked by constraints");
            return;
        };
        let (form_id, kind, mode) = (form.id, form.kind, form.mode);

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = match mode {
                FormMode::Create => api.create(kind, payload).await,
                FormMode::Edit(id) => api.update(kind, id, payload).await,
            };
            let _ = tx.send(AppEvent::Saved {
                form: form_id,
                kind,
                editing: matches!(mode, FormMode::Edit(_)),
                result: result.map(|_| ()),
            });
            ctx.request_repaint();
        });
    }

    pub(crate) fn confirm_delete(&mut self, kind: EntityKind, id: i64) {
        info!(?kind, id, "Deleting record");
        let api = self.api.clone();
        let tx = self.events_tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let result = api.delete(kind, id).await.map(|_| ());
            let _ = tx.send(AppEvent::Deleted { kind, id, result });
            ctx.request_repaint();
        });
    }

    /// Drain finished background work into the state store
    pub(crate) fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            for follow_up in self.state.handle(event) {
                match follow_up {
                    FollowUp::Notify(message) => self.notifier.success(message),
                    FollowUp::CloseForm(id) => close_submitted(&mut self.form, id),
                    FollowUp::Reload(section) => self.load_section(section),
                }
            }
        }
    }

    /// Serialize the full cache slot for `kind` and save it where the user picks
    pub(crate) fn export_csv(&mut self, kind: EntityKind) {
        let cache = &self.state.cache;
        let csv = match kind {
            EntityKind::Donors => to_csv(&cache.donors),
            EntityKind::Patients => to_csv(&cache.patients),
            EntityKind::Inventory => to_csv(&cache.inventory),
            EntityKind::Requests => to_csv(&cache.requests),
            EntityKind::Donations => to_csv(&cache.donations),
        };
        let csv = match csv {
            Ok(csv) => csv,
            Err(e) => {
                warn!(?kind, error = %e, "Export refused");
                self.notifier.error(e.to_string());
                return;
            }
        };

        let filename = kind.csv_filename();
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(filename)
            .add_filter("CSV", &["csv"])
            .save_file()
        else {
            return;
        };

        match std::fs::write(&path, csv) {
            Ok(()) => {
                info!(path = %path.display(), "CSV exported");
                self.notifier
                    .success(format!("{} downloaded successfully!", filename));
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to write CSV");
                self.notifier.error(format!("Failed to save {}: {}", filename, e));
            }
        }
    }
}
