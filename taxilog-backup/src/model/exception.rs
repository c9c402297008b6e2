use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce::{lenient_date, lenient_text, lenient_text_opt};

// ── ScheduleException ──

/// A day the driver deviates from the regular schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleException {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default = "Utc::now", deserialize_with = "lenient_date")]
    pub date: DateTime<Utc>,
    #[serde(alias = "type", default, deserialize_with = "lenient_text")]
    pub kind: String, // "holiday", "vacation", "sick"
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_type_key() {
        let ex: ScheduleException = serde_json::from_value(json!({
            "id": "x1",
            "date": "2024-08-15",
            "type": "holiday"
        }))
        .unwrap();
        assert_eq!(ex.kind, "holiday");
        assert_eq!(ex.description, None);
    }
}
