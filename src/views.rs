//! Row projection for the entity tables
//!
//! Records are projected into typed cells at render time. Derived fields
//! (inventory status, badge tones, formatted dates) are never stored.

use crate::constants::{EXPIRY_WARNING_DAYS, LOW_STOCK_THRESHOLD};
use crate::types::*;
use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Semantic color of a badge; `theme::tone_colors` maps it to pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Orange,
    Yellow,
    Blue,
    Green,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Badge { text: String, tone: Tone },
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn badge(s: impl Into<String>, tone: Tone) -> Self {
        Cell::Badge {
            text: s.into(),
            tone,
        }
    }
}

/// One projected table row; `id` drives the edit/delete actions
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: i64,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    ExpiringSoon,
    LowStock,
    Good,
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::ExpiringSoon => "Expiring Soon",
            StockStatus::LowStock => "Low Stock",
            StockStatus::Good => "Good",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            StockStatus::ExpiringSoon => Tone::Red,
            StockStatus::LowStock => Tone::Yellow,
            StockStatus::Good => Tone::Green,
        }
    }
}

/// Whole days from `now` until local midnight of `expiry`, rounded up
pub fn days_until_expiry(expiry: NaiveDate, now: DateTime<Local>) -> i64 {
    let midnight = expiry.and_hms_opt(0, 0, 0).unwrap_or_default();
    let expiry_at = Local
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| midnight.and_utc().with_timezone(&Local));
    let millis = (expiry_at - now).num_milliseconds();
    const DAY_MS: i64 = 86_400_000;
    // Ceiling division that also rounds negative values toward +inf
    millis.div_euclid(DAY_MS) + i64::from(millis.rem_euclid(DAY_MS) != 0)
}

/// Expiry takes priority over stock level
pub fn inventory_status(unit: &InventoryUnit, now: DateTime<Local>) -> StockStatus {
    if days_until_expiry(unit.expiry_date, now) <= EXPIRY_WARNING_DAYS {
        StockStatus::ExpiringSoon
    } else if unit.units_available < LOW_STOCK_THRESHOLD {
        StockStatus::LowStock
    } else {
        StockStatus::Good
    }
}

pub fn priority_tone(priority: Priority) -> Tone {
    match priority {
        Priority::Critical => Tone::Red,
        Priority::High => Tone::Orange,
        Priority::Medium => Tone::Blue,
        Priority::Low => Tone::Green,
    }
}

pub fn status_tone(status: RequestStatus) -> Tone {
    match status {
        RequestStatus::Pending => Tone::Yellow,
        RequestStatus::Approved => Tone::Blue,
        RequestStatus::Fulfilled => Tone::Green,
        RequestStatus::Rejected => Tone::Red,
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_else(|| "Never".to_string())
}

fn blood_badge(group: BloodGroup) -> Cell {
    Cell::badge(group.as_str(), Tone::Red)
}

/// A record that can be drawn as a table row
pub trait TableRecord {
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;
    fn cells(&self, now: DateTime<Local>) -> Vec<Cell>;
}

impl TableRecord for Donor {
    const COLUMNS: &'static [&'static str] =
        &["NAME", "AGE", "BLOOD GROUP", "CONTACT", "LOCATION", "LAST DONATION"];

    fn id(&self) -> i64 {
        self.id
    }

    fn cells(&self, _now: DateTime<Local>) -> Vec<Cell> {
        vec![
            Cell::text(&self.name),
            Cell::text(self.age.to_string()),
            blood_badge(self.blood_group),
            Cell::text(&self.contact),
            Cell::text(&self.location),
            Cell::text(format_optional_date(self.last_donation_date)),
        ]
    }
}

impl TableRecord for Patient {
    const COLUMNS: &'static [&'static str] =
        &["NAME", "AGE", "BLOOD GROUP", "CONTACT", "LOCATION", "UNITS NEEDED"];

    fn id(&self) -> i64 {
        self.id
    }

    fn cells(&self, _now: DateTime<Local>) -> Vec<Cell> {
        vec![
            Cell::text(&self.name),
            Cell::text(self.age.to_string()),
            blood_badge(self.blood_group),
            Cell::text(&self.contact),
            Cell::text(&self.location),
            Cell::text(self.units_needed.to_string()),
        ]
    }
}

impl TableRecord for InventoryUnit {
    const COLUMNS: &'static [&'static str] = &["BLOOD GROUP", "UNITS", "EXPIRY DATE", "STATUS"];

    fn id(&self) -> i64 {
        self.id
    }

    fn cells(&self, now: DateTime<Local>) -> Vec<Cell> {
        let status = inventory_status(self, now);
        vec![
            blood_badge(self.blood_group),
            Cell::text(self.units_available.to_string()),
            Cell::text(format_date(self.expiry_date)),
            Cell::badge(status.label(), status.tone()),
        ]
    }
}

impl TableRecord for BloodRequest {
    const COLUMNS: &'static [&'static str] =
        &["PATIENT", "BLOOD GROUP", "UNITS", "DATE", "PRIORITY", "STATUS"];

    fn id(&self) -> i64 {
        self.id
    }

    fn cells(&self, _now: DateTime<Local>) -> Vec<Cell> {
        vec![
            Cell::text(&self.patient_name),
            blood_badge(self.blood_group),
            Cell::text(self.units_requested.to_string()),
            Cell::text(format_date(self.date)),
            Cell::badge(self.priority.as_str(), priority_tone(self.priority)),
            Cell::badge(self.status.as_str(), status_tone(self.status)),
        ]
    }
}

impl TableRecord for DonationRecord {
    const COLUMNS: &'static [&'static str] =
        &["DONOR", "DONOR ID", "BLOOD GROUP", "UNITS", "DATE"];

    fn id(&self) -> i64 {
        self.id
    }

    fn cells(&self, _now: DateTime<Local>) -> Vec<Cell> {
        vec![
            Cell::text(&self.donor_name),
            Cell::text(self.donor_id.to_string()),
            blood_badge(self.blood_group),
            Cell::text(self.units_donated.to_string()),
            Cell::text(format_date(self.date_of_donation)),
        ]
    }
}

/// Project the selected records (by cache index) into rows
pub fn project_rows<T: TableRecord>(
    records: &[T],
    indices: &[usize],
    now: DateTime<Local>,
) -> Vec<Row> {
    indices
        .iter()
        .filter_map(|&i| records.get(i))
        .map(|r| Row {
            id: r.id(),
            cells: r.cells(now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};

    fn noon_today() -> DateTime<Local> {
        let now = Local::now();
        now.with_hour(12).and_then(|t| t.with_minute(0)).unwrap_or(now)
    }

    fn unit(expiry: NaiveDate, units: i32) -> InventoryUnit {
        InventoryUnit {
            id: 1,
            blood_group: BloodGroup::OPos,
            units_available: units,
            expiry_date: expiry,
            created_at: None,
        }
    }

    #[test]
    fn test_days_until_expiry_rounds_up() {
        let now = noon_today();
        let today = now.date_naive();
        assert_eq!(days_until_expiry(today + Duration::days(3), now), 3);
        assert_eq!(days_until_expiry(today + Duration::days(1), now), 1);
        // Midnight already passed today: half a day ago rounds toward zero
        assert_eq!(days_until_expiry(today, now), 0);
        assert_eq!(days_until_expiry(today - Duration::days(2), now), -2);
    }

    #[test]
    fn test_expiring_in_three_days_with_plenty_of_stock() {
        let now = noon_today();
        let u = unit(now.date_naive() + Duration::days(3), 50);
        assert_eq!(inventory_status(&u, now), StockStatus::ExpiringSoon);
        assert_eq!(inventory_status(&u, now).label(), "Expiring Soon");
    }

    #[test]
    fn test_expiry_takes_priority_over_low_stock() {
        let now = noon_today();
        let u = unit(now.date_naive() + Duration::days(7), 2);
        assert_eq!(inventory_status(&u, now), StockStatus::ExpiringSoon);
    }

    #[test]
    fn test_low_stock_and_good() {
        let now = noon_today();
        let far = now.date_naive() + Duration::days(30);
        assert_eq!(inventory_status(&unit(far, 9), now), StockStatus::LowStock);
        assert_eq!(inventory_status(&unit(far, 10), now), StockStatus::Good);
        let just_outside = now.date_naive() + Duration::days(8);
        assert_eq!(inventory_status(&unit(just_outside, 40), now), StockStatus::Good);
    }

    #[test]
    fn test_tones_cover_every_variant() {
        let tones: Vec<Tone> = Priority::ALL.iter().map(|p| priority_tone(*p)).collect();
        assert_eq!(tones, [Tone::Green, Tone::Blue, Tone::Orange, Tone::Red]);
        assert_eq!(status_tone(RequestStatus::Pending), Tone::Yellow);
        assert_eq!(status_tone(RequestStatus::Rejected), Tone::Red);
    }

    #[test]
    fn test_absent_date_renders_never() {
        assert_eq!(format_optional_date(None), "Never");
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(format_optional_date(Some(d)), "Mar 9, 2024");
    }

    #[test]
    fn test_row_count_matches_cache() {
        let today = Local::now().date_naive();
        let cache: Vec<InventoryUnit> = (0..5).map(|i| unit(today + Duration::days(i * 5), 20)).collect();
        let all: Vec<usize> = (0..cache.len()).collect();
        let rows = project_rows(&cache, &all, Local::now());
        assert_eq!(rows.len(), cache.len());
        assert!(rows.iter().all(|r| r.cells.len() == InventoryUnit::COLUMNS.len()));
    }

    #[test]
    fn test_donor_row_cells() {
        let d = Donor {
            id: 4,
            name: "Alice".into(),
            age: 29,
            gender: Gender::Female,
            blood_group: BloodGroup::OPos,
            contact: "555".into(),
            location: "X".into(),
            last_donation_date: None,
            created_at: None,
        };
        let cells = d.cells(Local::now());
        assert_eq!(cells.len(), Donor::COLUMNS.len());
        assert_eq!(cells[2], Cell::badge("O+", Tone::Red));
        assert_eq!(cells[5], Cell::text("Never"));
    }
}
