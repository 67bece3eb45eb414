//! Common types and data structures
//!
//! Records mirror the API's JSON verbatim. Field order matters: CSV export
//! uses declaration order for its header row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Declares a closed set of API string values as an enum with serde names,
/// an `ALL` table in display order, and `as_str`.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// ABO/Rh blood group
    BloodGroup {
        APos => "A+",
        ANeg => "A-",
        BPos => "B+",
        BNeg => "B-",
        AbPos => "AB+",
        AbNeg => "AB-",
        OPos => "O+",
        ONeg => "O-",
    }
);

string_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

string_enum!(
    /// Urgency of a blood request
    Priority {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Critical => "Critical",
    }
);

string_enum!(
    /// Lifecycle of a blood request
    RequestStatus {
        Pending => "Pending",
        Approved => "Approved",
        Fulfilled => "Fulfilled",
        Rejected => "Rejected",
    }
);

// ============================================================================
// ENTITY RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub blood_group: BloodGroup,
    pub contact: String,
    pub location: String,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub blood_group: BloodGroup,
    pub contact: String,
    pub location: String,
    pub units_needed: i32,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryUnit {
    pub id: i64,
    pub blood_group: BloodGroup,
    pub units_available: i32,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub blood_group: BloodGroup,
    pub units_requested: i32,
    pub date: NaiveDate,
    pub status: RequestStatus,
    pub priority: Priority,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: i64,
    pub donor_id: i64,
    pub donor_name: String,
    pub blood_group: BloodGroup,
    pub date_of_donation: NaiveDate,
    pub units_donated: i32,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ============================================================================
// ENTITY KINDS & SECTIONS
// ============================================================================

/// One REST collection and its cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Donors,
    Patients,
    Inventory,
    Requests,
    Donations,
}

impl EntityKind {
    /// Collection path relative to the API root
    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityKind::Donors => "/donors",
            EntityKind::Patients => "/patients",
            EntityKind::Inventory => "/inventory",
            EntityKind::Requests => "/requests",
            EntityKind::Donations => "/donation-records",
        }
    }

    /// Key holding the record array in the list response envelope
    pub fn collection_key(&self) -> &'static str {
        match self {
            EntityKind::Donors => "donors",
            EntityKind::Patients => "patients",
            EntityKind::Inventory => "inventory",
            EntityKind::Requests => "requests",
            EntityKind::Donations => "donation_records",
        }
    }

    pub fn item_endpoint(&self, id: i64) -> String {
        format!("{}/{}", self.endpoint(), id)
    }

    pub fn csv_filename(&self) -> &'static str {
        match self {
            EntityKind::Donors => "donors.csv",
            EntityKind::Patients => "patients.csv",
            EntityKind::Inventory => "inventory.csv",
            EntityKind::Requests => "requests.csv",
            EntityKind::Donations => "donations.csv",
        }
    }

    /// Noun used in confirmation prompts ("delete this ...?")
    pub fn noun(&self) -> &'static str {
        match self {
            EntityKind::Donors => "donor",
            EntityKind::Patients => "patient",
            EntityKind::Inventory => "inventory item",
            EntityKind::Requests => "request",
            EntityKind::Donations => "donation record",
        }
    }

    pub fn created_message(&self) -> &'static str {
        match self {
            EntityKind::Donors => "Donor added successfully!",
            EntityKind::Patients => "Patient added successfully!",
            EntityKind::Inventory => "Blood units added successfully!",
            EntityKind::Requests => "Blood request created successfully!",
            EntityKind::Donations => "Donation recorded successfully!",
        }
    }

    pub fn updated_message(&self) -> &'static str {
        match self {
            EntityKind::Donors => "Donor updated successfully!",
            EntityKind::Patients => "Patient updated successfully!",
            EntityKind::Inventory => "Inventory item updated successfully!",
            EntityKind::Requests => "Request updated successfully!",
            EntityKind::Donations => "Donation record updated successfully!",
        }
    }

    pub fn deleted_message(&self) -> &'static str {
        match self {
            EntityKind::Donors => "Donor deleted successfully!",
            EntityKind::Patients => "Patient deleted successfully!",
            EntityKind::Inventory => "Inventory item deleted successfully!",
            EntityKind::Requests => "Request deleted successfully!",
            EntityKind::Donations => "Donation record deleted successfully!",
        }
    }

    pub fn section(&self) -> Section {
        match self {
            EntityKind::Donors => Section::Donors,
            EntityKind::Patients => Section::Patients,
            EntityKind::Inventory => Section::Inventory,
            EntityKind::Requests => Section::Requests,
            EntityKind::Donations => Section::Donations,
        }
    }
}

/// Sidebar navigation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Section {
    #[default]
    Dashboard,
    Donors,
    Patients,
    Inventory,
    Requests,
    Donations,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Dashboard,
        Section::Donors,
        Section::Patients,
        Section::Inventory,
        Section::Requests,
        Section::Donations,
    ];

    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Section::Dashboard => None,
            Section::Donors => Some(EntityKind::Donors),
            Section::Patients => Some(EntityKind::Patients),
            Section::Inventory => Some(EntityKind::Inventory),
            Section::Requests => Some(EntityKind::Requests),
            Section::Donations => Some(EntityKind::Donations),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Donors => "Donors",
            Section::Patients => "Patients",
            Section::Inventory => "Blood Inventory",
            Section::Requests => "Blood Requests",
            Section::Donations => "Donation Records",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Section::Dashboard => egui_phosphor::regular::SQUARES_FOUR,
            Section::Donors => egui_phosphor::regular::USERS,
            Section::Patients => egui_phosphor::regular::FIRST_AID,
            Section::Inventory => egui_phosphor::regular::DROP,
            Section::Requests => egui_phosphor::regular::CLIPBOARD_TEXT,
            Section::Donations => egui_phosphor::regular::HAND_HEART,
        }
    }
}

/// A freshly fetched collection, tagged by entity
#[derive(Debug, Clone)]
pub enum Collection {
    Donors(Vec<Donor>),
    Patients(Vec<Patient>),
    Inventory(Vec<InventoryUnit>),
    Requests(Vec<BloodRequest>),
    Donations(Vec<DonationRecord>),
}

impl Collection {
    pub fn kind(&self) -> EntityKind {
        match self {
            Collection::Donors(_) => EntityKind::Donors,
            Collection::Patients(_) => EntityKind::Patients,
            Collection::Inventory(_) => EntityKind::Inventory,
            Collection::Requests(_) => EntityKind::Requests,
            Collection::Donations(_) => EntityKind::Donations,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::Donors(v) => v.len(),
            Collection::Patients(v) => v.len(),
            Collection::Inventory(v) => v.len(),
            Collection::Requests(v) => v.len(),
            Collection::Donations(v) => v.len(),
        }
    }
}

// ============================================================================
// DASHBOARD
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryCards {
    pub total_donors: i64,
    pub total_patients: i64,
    pub total_blood_units: i64,
    pub pending_requests: i64,
    pub critical_requests: i64,
    pub recent_donations: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDonations {
    pub month: String,
    pub donations: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Charts {
    pub blood_group_distribution: BTreeMap<String, i64>,
    pub monthly_donations: Vec<MonthlyDonations>,
    pub request_status_distribution: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alerts {
    pub low_stock: Vec<InventoryUnit>,
    pub expiry_alerts: Vec<InventoryUnit>,
}

/// Payload of `GET /dashboard-stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub summary_cards: SummaryCards,
    pub charts: Charts,
    pub alerts: Alerts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_group_wire_names() {
        let names: Vec<&str> = BloodGroup::ALL.iter().map(|g| g.as_str()).collect();
        assert_eq!(names, ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"]);
        assert_eq!(
            serde_json::to_string(&BloodGroup::AbNeg).unwrap(),
            "\"AB-\""
        );
        assert_eq!(
            serde_json::from_str::<BloodGroup>("\"O+\"").unwrap(),
            BloodGroup::OPos
        );
        assert!(serde_json::from_str::<BloodGroup>("\"C+\"").is_err());
    }

    #[test]
    fn test_donor_deserializes_null_last_donation() {
        let json = r#"{"id":3,"name":"Ana","age":30,"gender":"Female","blood_group":"B-",
            "contact":"555-1234","location":"Springfield","last_donation_date":null,
            "created_at":"2024-01-01T10:00:00"}"#;
        let donor: Donor = serde_json::from_str(json).unwrap();
        assert_eq!(donor.blood_group, BloodGroup::BNeg);
        assert!(donor.last_donation_date.is_none());
    }

    #[test]
    fn test_dashboard_stats_tolerates_missing_members() {
        let json = r#"{"summary_cards":{"total_donors":4},"charts":{"monthly_donations":[{"month":"March 2024","donations":2}]}}"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.summary_cards.total_donors, 4);
        assert_eq!(stats.charts.monthly_donations.len(), 1);
        assert!(stats.alerts.low_stock.is_empty());
    }

    #[test]
    fn test_entity_endpoints() {
        assert_eq!(EntityKind::Donations.endpoint(), "/donation-records");
        assert_eq!(EntityKind::Donations.collection_key(), "donation_records");
        assert_eq!(EntityKind::Patients.item_endpoint(12), "/patients/12");
        assert_eq!(EntityKind::Inventory.section().entity(), Some(EntityKind::Inventory));
    }
}
