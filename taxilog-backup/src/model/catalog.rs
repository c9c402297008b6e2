use serde::{Deserialize, Serialize};

use crate::coerce::{lenient_number, lenient_text, lenient_text_opt};

// ── Supplier ──

/// A vendor the driver buys from (fuel stations, insurers, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub tax_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub notes: Option<String>,
}

// ── Concept ──

/// An expense category with its deductible percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub category: Option<String>,
    #[serde(default = "default_deductible_pct", deserialize_with = "lenient_number")]
    pub deductible_pct: f64,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub notes: Option<String>,
}

fn default_deductible_pct() -> f64 {
    100.0
}

// ── Workshop ──

/// A garage that services the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workshop {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub specialty: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub notes: Option<String>,
}
