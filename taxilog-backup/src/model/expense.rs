use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::coerce::{lenient_bool, lenient_date, lenient_number, lenient_text, lenient_text_opt};

/// Expense type whose service lines get their own tab in spreadsheet exports.
pub const VEHICLE_EXPENSE: &str = "vehicle";

// ── Expense ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default = "Utc::now", deserialize_with = "lenient_date")]
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub concept: String,
    #[serde(alias = "type", default, deserialize_with = "lenient_text")]
    pub expense_type: String, // "fuel", "vehicle", "insurance", "fees"
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub supplier_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub workshop_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub base_amount: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub tax_rate: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub tax_amount: f64,
    #[serde(alias = "amount", default, deserialize_with = "lenient_number")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub deductible: bool,
    #[serde(alias = "payment", default, deserialize_with = "lenient_text")]
    pub payment_method: String,
    #[serde(alias = "invoice", default, deserialize_with = "lenient_text_opt")]
    pub invoice_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub odometer_km: f64,
    #[serde(default, deserialize_with = "lenient_services")]
    pub services: Vec<ServiceLine>,
    #[serde(default, deserialize_with = "lenient_text_opt")]
    pub notes: Option<String>,
}

impl Expense {
    /// Vehicle expenses carry itemized workshop service lines.
    pub fn is_vehicle(&self) -> bool {
        self.expense_type == VEHICLE_EXPENSE
    }
}

// ── ServiceLine ──

/// One itemized line of a workshop invoice, embedded in its parent expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLine {
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default = "default_quantity", deserialize_with = "lenient_number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub amount: f64,
}

fn default_quantity() -> f64 {
    1.0
}

/// Service lines arrive either as a JSON array or, from a spreadsheet cell
/// that failed the JSON sniff, as plain text. Anything unusable becomes an
/// empty list.
fn lenient_services<'de, D>(deserializer: D) -> Result<Vec<ServiceLine>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_services(&value))
}

fn coerce_services(value: &Value) -> Vec<ServiceLine> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        Value::String(raw) => serde_json::from_str::<Value>(raw)
            .map(|parsed| coerce_services(&parsed))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_lines_from_embedded_array() {
        let expense: Expense = serde_json::from_value(json!({
            "id": "e1",
            "type": "vehicle",
            "services": [
                { "description": "Oil change", "unitPrice": "45,00", "amount": "45,00" },
                { "description": "Brake pads", "quantity": 2, "unitPrice": 80, "amount": 160 }
            ]
        }))
        .unwrap();
        assert!(expense.is_vehicle());
        assert_eq!(expense.services.len(), 2);
        assert_eq!(expense.services[0].quantity, 1.0);
        assert_eq!(expense.services[0].unit_price, 45.0);
        assert_eq!(expense.services[1].amount, 160.0);
    }

    #[test]
    fn test_service_lines_from_json_text() {
        let expense: Expense = serde_json::from_value(json!({
            "id": "e2",
            "services": "[{\"description\":\"ITV\",\"amount\":35}]"
        }))
        .unwrap();
        assert_eq!(expense.services.len(), 1);
        assert_eq!(expense.services[0].description, "ITV");
    }

    #[test]
    fn test_unusable_services_become_empty() {
        let expense: Expense = serde_json::from_value(json!({
            "id": "e3",
            "services": "not json"
        }))
        .unwrap();
        assert!(expense.services.is_empty());
    }

    #[test]
    fn test_legacy_names_and_lenient_booleans() {
        let expense: Expense = serde_json::from_value(json!({
            "id": "e4",
            "type": "fuel",
            "amount": "58,30",
            "invoice": "F-2024-017",
            "deductible": "true"
        }))
        .unwrap();
        assert_eq!(expense.expense_type, "fuel");
        assert_eq!(expense.total_amount, 58.3);
        assert_eq!(expense.invoice_number.as_deref(), Some("F-2024-017"));
        assert!(expense.deductible);
    }
}
