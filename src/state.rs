//! Application state store
//!
//! Owned by the UI thread. Background tasks never touch it directly; they
//! send `AppEvent`s which `AppState::handle` applies. Every cache slot is
//! replaced wholesale on a successful load and left alone otherwise.

use crate::api::ApiError;
use crate::filters::{filter, FilterCriteria};
use crate::forms::FormId;
use crate::types::*;
use std::collections::HashMap;
use tracing::debug;

/// Most recent API response per entity
#[derive(Debug, Default, Clone)]
pub struct EntityCache {
    pub donors: Vec<Donor>,
    pub patients: Vec<Patient>,
    pub inventory: Vec<InventoryUnit>,
    pub requests: Vec<BloodRequest>,
    pub donations: Vec<DonationRecord>,
    pub dashboard: Option<DashboardStats>,
}

impl EntityCache {
    pub fn replace(&mut self, collection: Collection) {
        match collection {
            Collection::Donors(v) => self.donors = v,
            Collection::Patients(v) => self.patients = v,
            Collection::Inventory(v) => self.inventory = v,
            Collection::Requests(v) => self.requests = v,
            Collection::Donations(v) => self.donations = v,
        }
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Donors => self.donors.len(),
            EntityKind::Patients => self.patients.len(),
            EntityKind::Inventory => self.inventory.len(),
            EntityKind::Requests => self.requests.len(),
            EntityKind::Donations => self.donations.len(),
        }
    }

    /// Indices matching `criteria` in the given slot
    pub fn filtered(&self, kind: EntityKind, criteria: &FilterCriteria) -> Vec<usize> {
        match kind {
            EntityKind::Donors => filter(&self.donors, criteria),
            EntityKind::Patients => filter(&self.patients, criteria),
            EntityKind::Inventory => filter(&self.inventory, criteria),
            EntityKind::Requests => filter(&self.requests, criteria),
            EntityKind::Donations => filter(&self.donations, criteria),
        }
    }
}

/// Stamp carried by a load so late responses can be recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub section: Section,
    pub generation: u64,
}

/// Messages from background tasks to the UI thread
#[derive(Debug)]
pub enum AppEvent {
    Loaded {
        ticket: LoadTicket,
        result: Result<Collection, ApiError>,
    },
    DashboardLoaded {
        ticket: LoadTicket,
        result: Result<DashboardStats, ApiError>,
    },
    Saved {
        form: FormId,
        kind: EntityKind,
        editing: bool,
        result: Result<(), ApiError>,
    },
    Deleted {
        kind: EntityKind,
        id: i64,
        result: Result<(), ApiError>,
    },
}

/// Work the UI must do after an event has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    Notify(String),
    /// Close the form with this id if it is still open
    CloseForm(FormId),
    Reload(Section),
}

pub struct AppState {
    pub cache: EntityCache,
    pub active: Section,
    pub criteria: HashMap<EntityKind, FilterCriteria>,
    pub filtered: HashMap<EntityKind, Vec<usize>>,
    generation: u64,
}

impl AppState {
    pub fn new(active: Section) -> Self {
        Self {
            cache: EntityCache::default(),
            active,
            criteria: HashMap::new(),
            filtered: HashMap::new(),
            generation: 0,
        }
    }

    /// Start a load for `section`; any earlier in-flight load becomes stale
    pub fn begin_load(&mut self, section: Section) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            section,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation && ticket.section == self.active
    }

    pub fn criteria(&self, kind: EntityKind) -> FilterCriteria {
        self.criteria.get(&kind).cloned().unwrap_or_default()
    }

    pub fn criteria_mut(&mut self, kind: EntityKind) -> &mut FilterCriteria {
        self.criteria.entry(kind).or_default()
    }

    /// Recompute the visible subset for one entity from its full cache slot
    pub fn apply_filters(&mut self, kind: EntityKind) {
        let criteria = self.criteria(kind);
        let indices = self.cache.filtered(kind, &criteria);
        self.filtered.insert(kind, indices);
    }

    pub fn visible(&self, kind: EntityKind) -> &[usize] {
        self.filtered.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply one background result. Errors were already surfaced by the client.
    pub fn handle(&mut self, event: AppEvent) -> Vec<FollowUp> {
        match event {
            AppEvent::Loaded { ticket, result } => {
                if !self.is_current(ticket) {
                    debug!(?ticket, current = self.generation, "Discarding stale load");
                    return Vec::new();
                }
                if let Ok(collection) = result {
                    let kind = collection.kind();
                    debug!(?kind, count = collection.len(), "Cache replaced");
                    self.cache.replace(collection);
                    self.apply_filters(kind);
                }
                Vec::new()
            }
            AppEvent::DashboardLoaded { ticket, result } => {
                if !self.is_current(ticket) {
                    debug!(?ticket, current = self.generation, "Discarding stale dashboard");
                    return Vec::new();
                }
                if let Ok(stats) = result {
                    self.cache.dashboard = Some(stats);
                }
                Vec::new()
            }
            AppEvent::Saved {
                form,
                kind,
                editing,
                result,
            } => match result {
                Ok(()) => {
                    let message = if editing {
                        kind.updated_message()
                    } else {
                        kind.created_message()
                    };
                    let mut follow = vec![FollowUp::Notify(message.to_string()), FollowUp::CloseForm(form)];
                    follow.extend(self.reload_if_active(kind));
                    follow
                }
                Err(_) => Vec::new(),
            },
            AppEvent::Deleted { kind, id, result } => match result {
                Ok(()) => {
                    debug!(?kind, id, "Record deleted");
                    let mut follow = vec![FollowUp::Notify(kind.deleted_message().to_string())];
                    follow.extend(self.reload_if_active(kind));
                    follow
                }
                Err(_) => Vec::new(),
            },
        }
    }

    /// The next visit reloads anyway, so only refresh what is on screen
    fn reload_if_active(&self, kind: EntityKind) -> Option<FollowUp> {
        (self.active == kind.section()).then(|| FollowUp::Reload(kind.section()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn donor(id: i64, name: &str) -> Donor {
        Donor {
            id,
            name: name.into(),
            age: 33,
            gender: Gender::Male,
            blood_group: BloodGroup::OPos,
            contact: "555".into(),
            location: "X".into(),
            last_donation_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            created_at: None,
        }
    }

    fn loaded(ticket: LoadTicket, donors: Vec<Donor>) -> AppEvent {
        AppEvent::Loaded {
            ticket,
            result: Ok(Collection::Donors(donors)),
        }
    }

    #[test]
    fn test_load_replaces_cache_wholesale() {
        let mut state = AppState::new(Section::Donors);
        let t1 = state.begin_load(Section::Donors);
        state.handle(loaded(t1, vec![donor(1, "A"), donor(2, "B"), donor(3, "C")]));
        assert_eq!(state.cache.donors.len(), 3);
        assert_eq!(state.visible(EntityKind::Donors), &[0, 1, 2]);

        let t2 = state.begin_load(Section::Donors);
        state.handle(loaded(t2, vec![donor(9, "Z")]));
        assert_eq!(state.cache.donors, vec![donor(9, "Z")]);
        assert_eq!(state.visible(EntityKind::Donors).len(), state.cache.donors.len());
    }

    #[test]
    fn test_stale_response_after_navigation_is_discarded() {
        let mut state = AppState::new(Section::Donors);
        let stale = state.begin_load(Section::Donors);

        state.active = Section::Patients;
        let fresh = state.begin_load(Section::Patients);

        state.handle(loaded(stale, vec![donor(1, "Late")]));
        assert!(state.cache.donors.is_empty());

        state.handle(AppEvent::Loaded {
            ticket: fresh,
            result: Ok(Collection::Patients(Vec::new())),
        });
        assert!(state.is_current(fresh));
    }

    #[test]
    fn test_superseded_load_of_same_section_is_discarded() {
        let mut state = AppState::new(Section::Donors);
        let first = state.begin_load(Section::Donors);
        let second = state.begin_load(Section::Donors);
        state.handle(loaded(second, vec![donor(2, "New")]));
        state.handle(loaded(first, vec![donor(1, "Old")]));
        assert_eq!(state.cache.donors[0].name, "New");
    }

    #[test]
    fn test_failed_delete_leaves_cache_unchanged() {
        let mut state = AppState::new(Section::Donors);
        let t = state.begin_load(Section::Donors);
        state.handle(loaded(t, vec![donor(1, "A")]));

        let follow = state.handle(AppEvent::Deleted {
            kind: EntityKind::Donors,
            id: 1,
            result: Err(ApiError::Status {
                status: 404,
                message: "not found".into(),
            }),
        });
        assert!(follow.is_empty());
        assert_eq!(state.cache.donors, vec![donor(1, "A")]);
    }

    #[test]
    fn test_failed_load_keeps_previous_cache() {
        let mut state = AppState::new(Section::Donors);
        let t = state.begin_load(Section::Donors);
        state.handle(loaded(t, vec![donor(1, "A")]));
        let t = state.begin_load(Section::Donors);
        state.handle(AppEvent::Loaded {
            ticket: t,
            result: Err(ApiError::Transport("connection refused".into())),
        });
        assert_eq!(state.cache.donors.len(), 1);
    }

    #[test]
    fn test_successful_save_closes_form_and_reloads() {
        let mut state = AppState::new(Section::Requests);
        let follow = state.handle(AppEvent::Saved {
            form: 7,
            kind: EntityKind::Requests,
            editing: false,
            result: Ok(()),
        });
        assert_eq!(
            follow,
            vec![
                FollowUp::Notify("Blood request created successfully!".into()),
                FollowUp::CloseForm(7),
                FollowUp::Reload(Section::Requests),
            ]
        );
    }

    #[test]
    fn test_late_save_leaves_newer_form_open() {
        use crate::forms::{close_submitted, FormState};

        let mut state = AppState::new(Section::Donors);
        let submitted = FormState::create(EntityKind::Donors);
        let mut open = Some(FormState::create(EntityKind::Patients));

        let follow = state.handle(AppEvent::Saved {
            form: submitted.id,
            kind: EntityKind::Donors,
            editing: false,
            result: Ok(()),
        });
        for step in follow {
            if let FollowUp::CloseForm(id) = step {
                close_submitted(&mut open, id);
            }
        }
        assert_eq!(open.map(|f| f.kind), Some(EntityKind::Patients));
    }

    #[test]
    fn test_delete_elsewhere_skips_reload() {
        let mut state = AppState::new(Section::Dashboard);
        let follow = state.handle(AppEvent::Deleted {
            kind: EntityKind::Patients,
            id: 5,
            result: Ok(()),
        });
        assert_eq!(follow, vec![FollowUp::Notify("Patient deleted successfully!".into())]);
    }

    #[test]
    fn test_filters_recomputed_from_full_cache() {
        let mut state = AppState::new(Section::Donors);
        let t = state.begin_load(Section::Donors);
        state.handle(loaded(t, vec![donor(1, "Alice"), donor(2, "Bob")]));

        state.criteria_mut(EntityKind::Donors).search = "ALI".into();
        state.apply_filters(EntityKind::Donors);
        assert_eq!(state.visible(EntityKind::Donors), &[0]);

        state.criteria_mut(EntityKind::Donors).search.clear();
        state.apply_filters(EntityKind::Donors);
        assert_eq!(state.visible(EntityKind::Donors), &[0, 1]);
    }
}
