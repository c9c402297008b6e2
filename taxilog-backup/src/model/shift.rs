use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce::{lenient_date, lenient_date_opt, lenient_number, lenient_text, lenient_text_opt};

// ── Shift ──

/// A working shift. `ended_at` stays `None` while the shift is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(alias = "start", default = "Utc::now", deserialize_with = "lenient_date")]
    pub started_at: DateTime<Utc>,
    #[serde(alias = "end", default, deserialize_with = "lenient_date_opt")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub break_minutes: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub start_km: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub end_km: f64,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub notes: Option<String>,
}
