//! Builds the grids of an exported workbook from a payload.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::model::{Collection, Expense};
use crate::normalize;
use crate::payload::BackupPayload;
use crate::sheet::cell::{Cell, Grid};
use crate::sheet::schema::{
    CONCEPT_COLUMNS, EXCEPTION_COLUMNS, EXPENSE_COLUMNS, SERVICES_TAB, SERVICE_COLUMNS,
    SHIFT_COLUMNS, SINGLETON_HEADER, SUPPLIER_COLUMNS, TRIP_COLUMNS, WORKSHOP_COLUMNS,
};

/// Lay records out as a grid: one header row naming `columns`, then one row
/// per record in order. Fields a record does not carry become empty cells.
pub fn to_rows(records: &[Value], columns: &[&str]) -> Grid {
    let mut grid = Vec::with_capacity(records.len() + 1);
    grid.push(header_row(columns));
    for record in records {
        grid.push(
            columns
                .iter()
                .map(|column| Cell::from_value(record.get(*column).unwrap_or(&Value::Null)))
                .collect(),
        );
    }
    grid
}

/// Lay a singleton out as a Key/Value header plus one leaf per row. Nested
/// objects flatten into dot-joined paths ("fiscalData.name"); arrays stay
/// whole and become JSON cells.
pub fn object_to_rows(object: &Value) -> Grid {
    let mut rows = Grid::new();
    if let Value::Object(map) = object {
        rows.push(header_row(&SINGLETON_HEADER));
        flatten_into(&mut rows, String::new(), map);
    }
    rows
}

fn flatten_into(rows: &mut Grid, prefix: String, map: &serde_json::Map<String, Value>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(nested) => flatten_into(rows, path, nested),
            leaf => rows.push(vec![Cell::text(path), Cell::from_value(leaf)]),
        }
    }
}

/// All workbook tabs in creation order: the nine collections, then the
/// derived Services tab.
pub fn encode_workbook(payload: &BackupPayload) -> Result<Vec<(String, Grid)>> {
    let mut tabs = Vec::with_capacity(10);

    tabs.push(tab(Collection::Settings, singleton_rows(payload.settings.as_ref())?));
    tabs.push(tab(
        Collection::BreakConfiguration,
        singleton_rows(payload.break_configuration.as_ref())?,
    ));
    tabs.push(tab(
        Collection::Exceptions,
        to_rows(&normalize::seq_to_plain(&payload.exceptions)?, &EXCEPTION_COLUMNS),
    ));
    tabs.push(tab(
        Collection::Trips,
        to_rows(&normalize::seq_to_plain(&payload.trips)?, &TRIP_COLUMNS),
    ));
    tabs.push(tab(
        Collection::Expenses,
        to_rows(&normalize::seq_to_plain(&payload.expenses)?, &EXPENSE_COLUMNS),
    ));
    tabs.push(tab(
        Collection::Shifts,
        to_rows(&normalize::seq_to_plain(&payload.shifts)?, &SHIFT_COLUMNS),
    ));
    tabs.push(tab(
        Collection::Suppliers,
        to_rows(&normalize::seq_to_plain(&payload.suppliers)?, &SUPPLIER_COLUMNS),
    ));
    tabs.push(tab(
        Collection::Concepts,
        to_rows(&normalize::seq_to_plain(&payload.concepts)?, &CONCEPT_COLUMNS),
    ));
    tabs.push(tab(
        Collection::Workshops,
        to_rows(&normalize::seq_to_plain(&payload.workshops)?, &WORKSHOP_COLUMNS),
    ));
    tabs.push((SERVICES_TAB.to_string(), service_rows(&payload.expenses)));

    Ok(tabs)
}

fn tab(collection: Collection, grid: Grid) -> (String, Grid) {
    (collection.tab_name().to_string(), grid)
}

fn singleton_rows<T: Serialize>(value: Option<&T>) -> Result<Grid> {
    match value {
        Some(v) => Ok(object_to_rows(&normalize::to_plain(v)?)),
        None => Ok(Grid::new()),
    }
}

/// One row per service line of every vehicle expense, with the parent's id,
/// date and workshop repeated for context. A vehicle expense without lines
/// still gets a summary row. The Expenses tab keeps the embedded array, so
/// this tab intentionally duplicates data for human browsing.
fn service_rows(expenses: &[Expense]) -> Grid {
    let mut grid = vec![header_row(&SERVICE_COLUMNS)];
    for expense in expenses.iter().filter(|e| e.is_vehicle()) {
        if expense.services.is_empty() {
            grid.push(vec![
                Cell::text(expense.id.clone()),
                Cell::Date(expense.date),
                opt_text(expense.workshop_id.as_deref()),
                Cell::text(expense.concept.clone()),
                Cell::Number(1.0),
                Cell::Number(expense.total_amount),
                Cell::Number(expense.total_amount),
            ]);
            continue;
        }
        for line in &expense.services {
            grid.push(vec![
                Cell::text(expense.id.clone()),
                Cell::Date(expense.date),
                opt_text(expense.workshop_id.as_deref()),
                Cell::text(line.description.clone()),
                Cell::Number(line.quantity),
                Cell::Number(line.unit_price),
                Cell::Number(line.amount),
            ]);
        }
    }
    grid
}

fn header_row(columns: &[&str]) -> Vec<Cell> {
    columns.iter().map(|c| Cell::text(*c)).collect()
}

fn opt_text(value: Option<&str>) -> Cell {
    value.map(Cell::text).unwrap_or(Cell::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppSettings, Trip};
    use crate::sheet::schema::WORKBOOK_TABS;
    use serde_json::json;

    #[test]
    fn test_to_rows_header_and_missing_fields() {
        let trip: Trip = serde_json::from_value(json!({
            "id": "t1",
            "taximeterFare": 12.5,
            "date": "2024-06-01T10:30:00Z"
        }))
        .unwrap();
        let grid = to_rows(&normalize::seq_to_plain(&[trip]).unwrap(), &TRIP_COLUMNS);

        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0][0], Cell::text("id"));
        assert_eq!(grid[1][0], Cell::text("t1"));
        assert_eq!(grid[1][1], Cell::Number(12.5));
        assert_eq!(grid[1][5], Cell::text("2024-06-01T10:30:00Z"));
        // origin was never set
        assert_eq!(grid[1][7], Cell::Empty);
    }

    #[test]
    fn test_object_to_rows_flattens_nested_paths() {
        let settings: AppSettings = serde_json::from_value(json!({
            "fiscal": { "name": "J. García" }
        }))
        .unwrap();
        let grid = object_to_rows(&normalize::to_plain(&settings).unwrap());

        assert_eq!(grid[0], vec![Cell::text("Key"), Cell::text("Value")]);
        assert!(grid
            .iter()
            .any(|row| row[0] == Cell::text("fiscalData.name")
                && row[1] == Cell::text("J. García")));
        assert!(grid.iter().all(|row| row.len() == 2));
    }

    #[test]
    fn test_object_to_rows_layout_for_a_nested_leaf_and_a_null() {
        let grid = object_to_rows(&json!({ "a": { "b": 1.0, "c": null } }));
        assert_eq!(
            grid,
            vec![
                vec![Cell::text("Key"), Cell::text("Value")],
                vec![Cell::text("a.b"), Cell::Number(1.0)],
                vec![Cell::text("a.c"), Cell::Empty],
            ]
        );
    }

    #[test]
    fn test_service_rows_explode_vehicle_expenses() {
        let with_lines: Expense = serde_json::from_value(json!({
            "id": "e1",
            "type": "vehicle",
            "workshopId": "w1",
            "services": [
                { "description": "Oil change", "unitPrice": 45, "amount": 45 },
                { "description": "Filter", "quantity": 2, "unitPrice": 12, "amount": 24 }
            ]
        }))
        .unwrap();
        let without_lines: Expense = serde_json::from_value(json!({
            "id": "e2",
            "type": "vehicle",
            "concept": "Revisión anual",
            "totalAmount": 180
        }))
        .unwrap();
        let fuel: Expense = serde_json::from_value(json!({
            "id": "e3",
            "type": "fuel",
            "services": [{ "description": "should not appear" }]
        }))
        .unwrap();

        let grid = service_rows(&[with_lines, without_lines, fuel]);

        // header + two lines + one summary row
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[1][0], Cell::text("e1"));
        assert_eq!(grid[2][3], Cell::text("Filter"));
        assert_eq!(grid[3][3], Cell::text("Revisión anual"));
        assert_eq!(grid[3][6], Cell::Number(180.0));
        assert!(!grid.iter().any(|row| row[0] == Cell::text("e3")));
    }

    #[test]
    fn test_workbook_tab_order_and_parent_rows_keep_services() {
        let mut payload = BackupPayload::empty();
        payload.expenses = vec![serde_json::from_value(json!({
            "id": "e1",
            "type": "vehicle",
            "services": [{ "description": "Oil change", "amount": 45 }]
        }))
        .unwrap()];

        let tabs = encode_workbook(&payload).unwrap();
        let names: Vec<&str> = tabs.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, WORKBOOK_TABS);

        let (_, expenses_grid) = &tabs[4];
        let services_col = EXPENSE_COLUMNS.iter().position(|c| *c == "services").unwrap();
        assert!(matches!(expenses_grid[1][services_col], Cell::Json(_)));

        // settings singleton was never populated
        assert!(tabs[0].1.is_empty());
    }
}
