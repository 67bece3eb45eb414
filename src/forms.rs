//! Create/edit forms
//!
//! Each entity has a declarative field list with input constraints (required,
//! numeric bounds, date shape, enumerated options). Constraints are checked on
//! submit and block it; there is no business validation beyond them.

use crate::types::*;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FORM_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one opened form so a late save result can't close another
pub type FormId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Tel,
    Number { min: Option<i64>, max: Option<i64> },
    Date,
    Select(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Initial value for a fresh create form
    pub default: Option<&'static str>,
}

impl FieldSpec {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            default: None,
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn with_default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Check one raw input against this field's constraints
    pub fn check(&self, raw: &str) -> Result<(), String> {
        let value = raw.trim();
        if value.is_empty() {
            return if self.required {
                Err("Please fill out this field.".to_string())
            } else {
                Ok(())
            };
        }
        match &self.kind {
            FieldKind::Text | FieldKind::Tel => Ok(()),
            FieldKind::Number { min, max } => {
                let n: i64 = value
                    .parse()
                    .map_err(|_| "Please enter a number.".to_string())?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("Value must be greater than or equal to {}.", min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("Value must be less than or equal to {}.", max));
                    }
                }
                Ok(())
            }
            FieldKind::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "Please enter a date as YYYY-MM-DD.".to_string()),
            FieldKind::Select(options) => {
                if options.iter().any(|o| *o == value) {
                    Ok(())
                } else {
                    Err("Please select an item in the list.".to_string())
                }
            }
        }
    }

    /// Convert a checked raw input to its JSON value
    fn to_json(&self, raw: &str) -> Value {
        let value = raw.trim();
        match self.kind {
            FieldKind::Number { .. } => value.parse::<i64>().map_or(Value::Null, Value::from),
            _ => Value::from(value),
        }
    }
}

fn number(min: Option<i64>, max: Option<i64>) -> FieldKind {
    FieldKind::Number { min, max }
}

fn blood_groups() -> FieldKind {
    FieldKind::Select(BloodGroup::ALL.iter().map(|g| g.as_str()).collect())
}

/// Field list for an entity's form, in display order. Editing allows an
/// inventory count of zero, which a fresh batch can't have.
pub fn fields_for(kind: EntityKind, editing: bool) -> Vec<FieldSpec> {
    match kind {
        EntityKind::Donors => vec![
            FieldSpec::new("name", "Name", FieldKind::Text),
            FieldSpec::new("age", "Age", number(Some(18), Some(65))),
            FieldSpec::new(
                "gender",
                "Gender",
                FieldKind::Select(Gender::ALL.iter().map(|g| g.as_str()).collect()),
            ),
            FieldSpec::new("blood_group", "Blood Group", blood_groups()),
            FieldSpec::new("contact", "Contact", FieldKind::Tel),
            FieldSpec::new("location", "Location", FieldKind::Text),
            FieldSpec::new(
                "last_donation_date",
                "Last Donation Date (Optional)",
                FieldKind::Date,
            )
            .optional(),
        ],
        EntityKind::Patients => vec![
            FieldSpec::new("name", "Name", FieldKind::Text),
            FieldSpec::new("age", "Age", number(Some(1), Some(120))),
            FieldSpec::new("blood_group", "Blood Group", blood_groups()),
            FieldSpec::new("contact", "Contact", FieldKind::Tel),
            FieldSpec::new("location", "Location", FieldKind::Text),
            FieldSpec::new("units_needed", "Units Needed", number(Some(1), None)),
        ],
        EntityKind::Inventory => vec![
            FieldSpec::new("blood_group", "Blood Group", blood_groups()),
            FieldSpec::new(
                "units_available",
                "Units Available",
                number(Some(if editing { 0 } else { 1 }), None),
            ),
            FieldSpec::new("expiry_date", "Expiry Date", FieldKind::Date),
        ],
        EntityKind::Requests => vec![
            FieldSpec::new("patient_id", "Patient ID", number(None, None)),
            FieldSpec::new("patient_name", "Patient Name", FieldKind::Text),
            FieldSpec::new("blood_group", "Blood Group", blood_groups()),
            FieldSpec::new("units_requested", "Units Requested", number(Some(1), None)),
            FieldSpec::new(
                "priority",
                "Priority",
                FieldKind::Select(Priority::ALL.iter().map(|p| p.as_str()).collect()),
            )
            .with_default("Medium"),
            FieldSpec::new(
                "status",
                "Status",
                FieldKind::Select(RequestStatus::ALL.iter().map(|s| s.as_str()).collect()),
            )
            .with_default("Pending"),
        ],
        EntityKind::Donations => vec![
            FieldSpec::new("donor_id", "Donor ID", number(None, None)),
            FieldSpec::new("donor_name", "Donor Name", FieldKind::Text),
            FieldSpec::new("blood_group", "Blood Group", blood_groups()),
            FieldSpec::new("units_donated", "Units Donated", number(Some(1), None)),
            FieldSpec::new("date_of_donation", "Donation Date", FieldKind::Date),
        ],
    }
}

pub fn form_title(kind: EntityKind, editing: bool) -> &'static str {
    match (kind, editing) {
        (EntityKind::Donors, false) => "Add New Donor",
        (EntityKind::Donors, true) => "Edit Donor",
        (EntityKind::Patients, false) => "Add New Patient",
        (EntityKind::Patients, true) => "Edit Patient",
        (EntityKind::Inventory, false) => "Add Blood Units",
        (EntityKind::Inventory, true) => "Edit Inventory Item",
        (EntityKind::Requests, false) => "New Blood Request",
        (EntityKind::Requests, true) => "Edit Blood Request",
        (EntityKind::Donations, false) => "Record Donation",
        (EntityKind::Donations, true) => "Edit Donation Record",
    }
}

pub fn submit_label(kind: EntityKind, editing: bool) -> &'static str {
    if editing {
        return "Save Changes";
    }
    match kind {
        EntityKind::Donors => "Add Donor",
        EntityKind::Patients => "Add Patient",
        EntityKind::Inventory => "Add Blood Units",
        EntityKind::Requests => "Create Request",
        EntityKind::Donations => "Record Donation",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// Open modal form: raw input text per field plus last validation errors
#[derive(Debug, Clone)]
pub struct FormState {
    pub id: FormId,
    pub kind: EntityKind,
    pub mode: FormMode,
    pub fields: Vec<FieldSpec>,
    pub values: BTreeMap<&'static str, String>,
    pub errors: BTreeMap<&'static str, String>,
}

impl FormState {
    fn open(kind: EntityKind, mode: FormMode) -> Self {
        let fields = fields_for(kind, matches!(mode, FormMode::Edit(_)));
        let values = fields
            .iter()
            .map(|f| (f.name, f.default.unwrap_or_default().to_string()))
            .collect();
        Self {
            id: NEXT_FORM_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            mode,
            fields,
            values,
            errors: BTreeMap::new(),
        }
    }

    pub fn create(kind: EntityKind) -> Self {
        Self::open(kind, FormMode::Create)
    }

    /// Prefill from a cached record's serialized fields
    pub fn edit<T: Serialize>(kind: EntityKind, id: i64, record: &T) -> Self {
        let mut form = Self::open(kind, FormMode::Edit(id));
        if let Ok(Value::Object(map)) = serde_json::to_value(record) {
            for field in &form.fields {
                let text = match map.get(field.name) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => String::new(),
                };
                form.values.insert(field.name, text);
            }
        }
        form
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn value_mut(&mut self, name: &'static str) -> &mut String {
        self.values.entry(name).or_default()
    }

    /// Check every field; on success return the flat key→value payload.
    /// Empty optional fields are left out of a create and sent as null on
    /// an edit, so the stored value is cleared.
    pub fn submit(&mut self) -> Option<Map<String, Value>> {
        self.errors.clear();
        let editing = self.is_editing();
        let mut payload = Map::new();
        for field in &self.fields {
            let raw = self.values.get(field.name).map(String::as_str).unwrap_or("");
            match field.check(raw) {
                Ok(()) if raw.trim().is_empty() => {
                    if editing {
                        payload.insert(field.name.to_string(), Value::Null);
                    }
                }
                Ok(()) => {
                    payload.insert(field.name.to_string(), field.to_json(raw));
                }
                Err(msg) => {
                    self.errors.insert(field.name, msg);
                }
            }
        }
        if self.errors.is_empty() {
            Some(payload)
        } else {
            None
        }
    }
}

/// Close the open form only if it is the one `id` was submitted from
pub fn close_submitted(open: &mut Option<FormState>, id: FormId) {
    if open.as_ref().is_some_and(|form| form.id == id) {
        *open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(form: &mut FormState, pairs: &[(&'static str, &str)]) {
        for (k, v) in pairs {
            *form.value_mut(*k) = v.to_string();
        }
    }

    #[test]
    fn test_donor_form_collects_typed_payload() {
        let mut form = FormState::create(EntityKind::Donors);
        fill(
            &mut form,
            &[
                ("name", "Alice"),
                ("age", "30"),
                ("gender", "Female"),
                ("blood_group", "O+"),
                ("contact", "555"),
                ("location", "X"),
            ],
        );
        let payload = form.submit().expect("valid form");
        assert_eq!(payload["age"], 30);
        assert_eq!(payload["blood_group"], "O+");
        assert!(!payload.contains_key("last_donation_date"));
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_constraints_block_submit() {
        let mut form = FormState::create(EntityKind::Donors);
        fill(
            &mut form,
            &[
                ("name", ""),
                ("age", "70"),
                ("gender", "Female"),
                ("blood_group", "C+"),
                ("contact", "555"),
                ("location", "X"),
                ("last_donation_date", "yesterday"),
            ],
        );
        assert!(form.submit().is_none());
        assert!(form.errors.contains_key("name"));
        assert!(form.errors["age"].contains("65"));
        assert!(form.errors.contains_key("blood_group"));
        assert!(form.errors.contains_key("last_donation_date"));
        assert!(!form.errors.contains_key("contact"));
    }

    #[test]
    fn test_request_form_defaults() {
        let form = FormState::create(EntityKind::Requests);
        assert_eq!(form.values["priority"], "Medium");
        assert_eq!(form.values["status"], "Pending");
        assert_eq!(form.values["patient_name"], "");
    }

    #[test]
    fn test_edit_prefills_from_record() {
        let unit = InventoryUnit {
            id: 11,
            blood_group: BloodGroup::BPos,
            units_available: 14,
            expiry_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            created_at: Some("2024-12-01T08:00:00".into()),
        };
        let mut form = FormState::edit(EntityKind::Inventory, unit.id, &unit);
        assert_eq!(form.mode, FormMode::Edit(11));
        assert_eq!(form.values["blood_group"], "B+");
        assert_eq!(form.values["units_available"], "14");
        assert_eq!(form.values["expiry_date"], "2025-01-31");

        let payload = form.submit().unwrap();
        assert_eq!(payload.len(), 3);
        assert!(!payload.contains_key("created_at"));
    }

    #[test]
    fn test_edit_allows_empty_stock_and_clears_optional_date() {
        let unit = InventoryUnit {
            id: 4,
            blood_group: BloodGroup::ONeg,
            units_available: 0,
            expiry_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            created_at: None,
        };
        let mut form = FormState::edit(EntityKind::Inventory, unit.id, &unit);
        assert_eq!(form.submit().unwrap()["units_available"], 0);

        let mut fresh = FormState::create(EntityKind::Inventory);
        fill(
            &mut fresh,
            &[("blood_group", "O-"), ("units_available", "0"), ("expiry_date", "2025-03-01")],
        );
        assert!(fresh.submit().is_none());
        assert!(fresh.errors.contains_key("units_available"));

        let donor = Donor {
            id: 2,
            name: "Ray".into(),
            age: 40,
            gender: Gender::Male,
            blood_group: BloodGroup::APos,
            contact: "555".into(),
            location: "X".into(),
            last_donation_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            created_at: None,
        };
        let mut form = FormState::edit(EntityKind::Donors, donor.id, &donor);
        assert_eq!(form.values["last_donation_date"], "2024-06-01");
        form.value_mut("last_donation_date").clear();
        assert_eq!(form.submit().unwrap()["last_donation_date"], Value::Null);
    }

    #[test]
    fn test_late_save_closes_only_its_own_form() {
        let submitted = FormState::create(EntityKind::Donors);
        let mut open = Some(FormState::create(EntityKind::Patients));
        close_submitted(&mut open, submitted.id);
        assert_eq!(open.as_ref().map(|f| f.kind), Some(EntityKind::Patients));

        let id = open.as_ref().map(|f| f.id).unwrap();
        close_submitted(&mut open, id);
        assert!(open.is_none());
    }

    #[test]
    fn test_number_bounds() {
        let field = FieldSpec::new("units", "Units", number(Some(1), None));
        assert!(field.check("0").is_err());
        assert!(field.check("1").is_ok());
        assert!(field.check("1.5").is_err());
        assert!(field.check("").is_err());
        assert!(field.clone().optional().check("").is_ok());
    }
}
