use serde::{Deserialize, Serialize};

use crate::coerce::{lenient_bool, lenient_number, lenient_text};

// ── AppSettings ──

/// Driver-level configuration singleton. Unknown or missing keys fall back
/// to the in-app defaults so a partial backup still restores cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(alias = "goal", default = "default_daily_goal", deserialize_with = "lenient_number")]
    pub daily_goal: f64,
    #[serde(default = "default_currency", deserialize_with = "lenient_text")]
    pub currency: String,
    #[serde(default = "default_locale", deserialize_with = "lenient_text")]
    pub locale: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub license_number: String,
    #[serde(alias = "fiscal", default)]
    pub fiscal_data: FiscalData,
    #[serde(default)]
    pub vehicle: VehicleInfo,
}

fn default_daily_goal() -> f64 {
    100.0
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_locale() -> String {
    "es-ES".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            daily_goal: default_daily_goal(),
            currency: default_currency(),
            locale: default_locale(),
            license_number: String::new(),
            fiscal_data: FiscalData::default(),
            vehicle: VehicleInfo::default(),
        }
    }
}

/// Invoicing identity printed on exported fiscal reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalData {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tax_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    #[serde(default, deserialize_with = "lenient_text")]
    pub plate: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub make: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub year: f64,
}

// ── BreakConfig ──

/// Rest-break reminder rules, kept separate from [`AppSettings`] because the
/// app stores and restores them independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakConfig {
    #[serde(default = "default_enabled", deserialize_with = "lenient_bool")]
    pub enabled: bool,
    #[serde(default = "default_max_continuous", deserialize_with = "lenient_number")]
    pub max_continuous_minutes: f64,
    #[serde(default = "default_min_break", deserialize_with = "lenient_number")]
    pub min_break_minutes: f64,
    #[serde(default = "default_reminder", deserialize_with = "lenient_number")]
    pub reminder_minutes: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_max_continuous() -> f64 {
    360.0
}

fn default_min_break() -> f64 {
    30.0
}

fn default_reminder() -> f64 {
    15.0
}

impl Default for BreakConfig {
    fn default() -> Self {
        BreakConfig {
            enabled: default_enabled(),
            max_continuous_minutes: default_max_continuous(),
            min_break_minutes: default_min_break(),
            reminder_minutes: default_reminder(),
        }
    }
}
