use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce::{lenient_date, lenient_number, lenient_text, lenient_text_opt};

// ── Trip ──

/// One taxi ride. `taximeter_fare` is what the meter showed; `charged_amount`
/// is what the customer paid before tip. Exports written before the field
/// rename carry `fare`, `amount`, `payment` and `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default = "Utc::now", deserialize_with = "lenient_date")]
    pub date: DateTime<Utc>,
    #[serde(alias = "fare", default, deserialize_with = "lenient_number")]
    pub taximeter_fare: f64,
    #[serde(alias = "amount", default, deserialize_with = "lenient_number")]
    pub charged_amount: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub tip: f64,
    #[serde(alias = "payment", default, deserialize_with = "lenient_text")]
    pub payment_method: String, // "cash", "card", "app"
    #[serde(alias = "kind", default, deserialize_with = "lenient_text")]
    pub trip_type: String, // "street", "stand", "dispatch"
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub shift_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_accepts_legacy_field_names() {
        let trip: Trip = serde_json::from_value(json!({
            "id": "t1",
            "fare": "12,50",
            "amount": 13,
            "payment": "cash",
            "kind": "street",
            "date": "31/12/2024"
        }))
        .unwrap();
        assert_eq!(trip.taximeter_fare, 12.5);
        assert_eq!(trip.charged_amount, 13.0);
        assert_eq!(trip.payment_method, "cash");
        assert_eq!(trip.trip_type, "street");
        assert_eq!((trip.date.day(), trip.date.month()), (31, 12));
    }

    #[test]
    fn test_missing_fields_take_fallbacks() {
        let trip: Trip = serde_json::from_value(json!({ "id": "t2" })).unwrap();
        assert_eq!(trip.tip, 0.0);
        assert_eq!(trip.origin, None);
        assert_eq!(trip.payment_method, "");
    }

    #[test]
    fn test_camel_case_round_trip() {
        let trip: Trip = serde_json::from_value(json!({
            "id": "t3",
            "taximeterFare": 20.0,
            "chargedAmount": 20.0,
            "date": "2024-06-01T10:30:00Z",
            "shiftId": "s1"
        }))
        .unwrap();
        let plain = serde_json::to_value(&trip).unwrap();
        assert_eq!(plain["taximeterFare"], json!(20.0));
        assert_eq!(plain["shiftId"], json!("s1"));
        let again: Trip = serde_json::from_value(plain).unwrap();
        assert_eq!(again, trip);
    }
}
