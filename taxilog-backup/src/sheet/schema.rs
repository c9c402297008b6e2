//! Fixed tab and column layout of an exported workbook. Column names match
//! the camelCase payload keys so rows can be rebuilt into records without a
//! mapping table.

use crate::model::Collection;

/// Extra tab holding the itemized service lines of vehicle expenses.
pub const SERVICES_TAB: &str = "Services";

/// Header row of the singleton key/value tabs.
pub const SINGLETON_HEADER: [&str; 2] = ["Key", "Value"];

/// Tab creation order: the nine collections in payload order, Services last.
pub const WORKBOOK_TABS: [&str; 10] = [
    "Settings",
    "BreakConfiguration",
    "Exceptions",
    "Trips",
    "Expenses",
    "Shifts",
    "Suppliers",
    "Concepts",
    "Workshops",
    SERVICES_TAB,
];

pub const TRIP_COLUMNS: [&str; 11] = [
    "id",
    "taximeterFare",
    "chargedAmount",
    "paymentMethod",
    "tripType",
    "date",
    "tip",
    "origin",
    "destination",
    "shiftId",
    "notes",
];

pub const EXPENSE_COLUMNS: [&str; 16] = [
    "id",
    "date",
    "concept",
    "expenseType",
    "supplierId",
    "workshopId",
    "baseAmount",
    "taxRate",
    "taxAmount",
    "totalAmount",
    "deductible",
    "paymentMethod",
    "invoiceNumber",
    "odometerKm",
    "services",
    "notes",
];

pub const SHIFT_COLUMNS: [&str; 7] = [
    "id",
    "startedAt",
    "endedAt",
    "breakMinutes",
    "startKm",
    "endKm",
    "notes",
];

pub const SUPPLIER_COLUMNS: [&str; 7] =
    ["id", "name", "taxId", "phone", "email", "address", "notes"];

pub const CONCEPT_COLUMNS: [&str; 5] = ["id", "name", "category", "deductiblePct", "notes"];

pub const WORKSHOP_COLUMNS: [&str; 6] = ["id", "name", "phone", "address", "specialty", "notes"];

pub const EXCEPTION_COLUMNS: [&str; 4] = ["id", "date", "kind", "description"];

/// Columns of the derived [`SERVICES_TAB`]; the leading columns give each
/// line its parent-expense context.
pub const SERVICE_COLUMNS: [&str; 7] = [
    "expenseId",
    "date",
    "workshopId",
    "description",
    "quantity",
    "unitPrice",
    "amount",
];

/// Column schema of a record-list collection. Singletons lay out as
/// key/value pairs instead and have no column schema.
pub fn columns_for(collection: Collection) -> Option<&'static [&'static str]> {
    match collection {
        Collection::Settings | Collection::BreakConfiguration => None,
        Collection::Exceptions => Some(&EXCEPTION_COLUMNS),
        Collection::Trips => Some(&TRIP_COLUMNS),
        Collection::Expenses => Some(&EXPENSE_COLUMNS),
        Collection::Shifts => Some(&SHIFT_COLUMNS),
        Collection::Suppliers => Some(&SUPPLIER_COLUMNS),
        Collection::Concepts => Some(&CONCEPT_COLUMNS),
        Collection::Workshops => Some(&WORKSHOP_COLUMNS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_collection_tab_is_in_the_workbook() {
        for collection in Collection::ALL {
            assert!(WORKBOOK_TABS.contains(&collection.tab_name()));
        }
        assert_eq!(WORKBOOK_TABS.len(), Collection::ALL.len() + 1);
    }

    #[test]
    fn test_record_schemas_lead_with_id() {
        for collection in Collection::ALL {
            if let Some(columns) = columns_for(collection) {
                assert_eq!(columns[0], "id", "{collection}");
            } else {
                assert!(collection.is_singleton());
            }
        }
    }
}
