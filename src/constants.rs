//! Application constants and configuration

pub const APP_NAME: &str = "Blood Bank Dashboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// API root used when neither the environment nor settings override it
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000/api";
pub const API_BASE_ENV: &str = "BLOODBANK_API_URL";

/// Fallback message when an error response carries no `error` field
pub const API_ERROR_FALLBACK: &str = "API request failed";

/// Inventory units expiring within this many days are flagged
pub const EXPIRY_WARNING_DAYS: i64 = 7;
/// Inventory units below this count are flagged as low stock
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Toast lifetime in seconds (visible, then fade)
pub const NOTIFICATION_VISIBLE_SECS: f32 = 2.5;
pub const NOTIFICATION_FADE_SECS: f32 = 0.5;
