//! Rebuilds a payload from workbook grids. Grids are untyped, so this side
//! leans on the record models' lenient deserialization to re-type cells.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::coerce::parse_text;
use crate::error::{BackupError, Result};
use crate::model::Collection;
use crate::payload::{BackupMeta, BackupPayload};
use crate::sheet::cell::{Cell, Grid};
use crate::sheet::schema::SINGLETON_HEADER;

/// Turn an entity grid back into untyped record objects. The header row
/// supplies the keys; rows shorter than the header pad with null.
pub fn from_rows(grid: &Grid) -> Vec<Value> {
    let Some((header, rows)) = grid.split_first() else {
        return Vec::new();
    };
    let keys: Vec<String> = header.iter().map(|cell| parse_text(&cell.to_value())).collect();

    rows.iter()
        .map(|row| {
            let mut object = Map::new();
            for (index, key) in keys.iter().enumerate() {
                if key.is_empty() {
                    continue;
                }
                let value = row.get(index).map(|cell| cell.to_value()).unwrap_or(Value::Null);
                object.insert(key.clone(), value);
            }
            Value::Object(object)
        })
        .collect()
}

/// Inverse of the singleton key/value layout: each row is one leaf, dotted
/// keys rebuild the nesting. A later duplicate key overrides an earlier one.
/// The leading Key/Value header row, when present, is skipped.
pub fn rows_to_object(grid: &Grid) -> Value {
    let mut root = Map::new();
    let rows = match grid.first() {
        Some(first) if is_singleton_header(first) => &grid[1..],
        _ => &grid[..],
    };
    for row in rows {
        let Some(key_cell) = row.first() else {
            continue;
        };
        let key = parse_text(&key_cell.to_value());
        if key.is_empty() {
            continue;
        }
        let value = row.get(1).map(|cell| cell.to_value()).unwrap_or(Value::Null);
        insert_path(&mut root, &key, value);
    }
    Value::Object(root)
}

fn is_singleton_header(row: &[Cell]) -> bool {
    SINGLETON_HEADER.len() == row.len()
        && SINGLETON_HEADER
            .iter()
            .zip(row)
            .all(|(name, cell)| parse_text(&cell.to_value()) == *name)
}

fn insert_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Some(nested) = slot.as_object_mut() {
                insert_path(nested, rest, value);
            }
        }
    }
}

/// Rebuild a payload from the tabs of a workbook, keyed by tab title.
///
/// Every collection tab must be present; the derived Services tab is ignored
/// (its data lives embedded in the Expenses tab). Workbooks carry no meta
/// block, so a current one is synthesized; restore re-validates it anyway.
pub fn decode_workbook(tabs: &HashMap<String, Grid>) -> Result<BackupPayload> {
    let mut payload = BackupPayload::empty();
    payload.meta = BackupMeta::current();

    for collection in Collection::ALL {
        let grid = tabs.get(collection.tab_name()).ok_or_else(|| {
            BackupError::Validation(format!(
                "Workbook has no {} tab; not a taxilog export",
                collection.tab_name()
            ))
        })?;

        match collection {
            Collection::Settings => payload.settings = decode_singleton(grid)?,
            Collection::BreakConfiguration => {
                payload.break_configuration = decode_singleton(grid)?
            }
            Collection::Exceptions => payload.exceptions = decode_records(grid)?,
            Collection::Trips => payload.trips = decode_records(grid)?,
            Collection::Expenses => payload.expenses = decode_records(grid)?,
            Collection::Shifts => payload.shifts = decode_records(grid)?,
            Collection::Suppliers => payload.suppliers = decode_records(grid)?,
            Collection::Concepts => payload.concepts = decode_records(grid)?,
            Collection::Workshops => payload.workshops = decode_records(grid)?,
        }
    }

    Ok(payload)
}

fn decode_singleton<T: DeserializeOwned>(grid: &Grid) -> Result<Option<T>> {
    if grid.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(rows_to_object(grid))?))
}

fn decode_records<T: DeserializeOwned>(grid: &Grid) -> Result<Vec<T>> {
    from_rows(grid)
        .into_iter()
        .map(|object| Ok(serde_json::from_value(object)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppSettings, Trip};
    use crate::normalize;
    use crate::sheet::encode::{encode_workbook, object_to_rows, to_rows};
    use crate::sheet::schema::TRIP_COLUMNS;
    use serde_json::json;

    fn as_tab_map(tabs: Vec<(String, Grid)>) -> HashMap<String, Grid> {
        tabs.into_iter().collect()
    }

    #[test]
    fn test_short_rows_pad_with_null() {
        let grid: Grid = vec![
            vec![Cell::text("id"), Cell::text("notes")],
            vec![Cell::text("t1")],
        ];
        let objects = from_rows(&grid);
        assert_eq!(objects, vec![json!({ "id": "t1", "notes": null })]);
    }

    #[test]
    fn test_flatten_then_unflatten_rebuilds_nesting() {
        let original = json!({
            "dailyGoal": 120.0,
            "fiscalData": { "name": "J. García", "city": "Madrid" }
        });
        let rebuilt = rows_to_object(&object_to_rows(&original));
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_header_row_is_skipped_when_present() {
        let grid: Grid = vec![
            vec![Cell::text("Key"), Cell::text("Value")],
            vec![Cell::text("a.b"), Cell::Number(1.0)],
            vec![Cell::text("a.c"), Cell::Empty],
        ];
        assert_eq!(rows_to_object(&grid), json!({ "a": { "b": 1.0, "c": null } }));
    }

    #[test]
    fn test_later_duplicate_key_overrides() {
        let grid: Grid = vec![
            vec![Cell::text("currency"), Cell::text("EUR")],
            vec![Cell::text("currency"), Cell::text("USD")],
        ];
        assert_eq!(rows_to_object(&grid), json!({ "currency": "USD" }));
    }

    #[test]
    fn test_rows_round_trip_to_typed_records() {
        let trips: Vec<Trip> = vec![
            serde_json::from_value(json!({
                "id": "t1",
                "taximeterFare": 12.5,
                "paymentMethod": "cash",
                "date": "2024-06-01T10:30:00Z",
                "origin": "Atocha"
            }))
            .unwrap(),
            serde_json::from_value(json!({ "id": "t2", "tip": 1.0 })).unwrap(),
        ];
        let grid = to_rows(&normalize::seq_to_plain(&trips).unwrap(), &TRIP_COLUMNS);
        let back: Vec<Trip> = decode_records(&grid).unwrap();
        assert_eq!(back, trips);
    }

    #[test]
    fn test_workbook_round_trip_preserves_collections() {
        let mut payload = BackupPayload::empty();
        payload.settings = Some(serde_json::from_value::<AppSettings>(json!({
            "dailyGoal": 150, "fiscal": { "name": "J. García" }
        }))
        .unwrap());
        payload.trips = vec![
            serde_json::from_value(json!({ "id": "t1", "taximeterFare": 12.5 })).unwrap(),
        ];
        payload.expenses = vec![serde_json::from_value(json!({
            "id": "e1",
            "type": "vehicle",
            "services": [{ "description": "Oil change", "amount": 45 }]
        }))
        .unwrap()];

        let tabs = as_tab_map(encode_workbook(&payload).unwrap());
        let decoded = decode_workbook(&tabs).unwrap();

        assert!(decoded.meta.is_valid());
        assert_eq!(decoded.settings, payload.settings);
        assert_eq!(decoded.trips, payload.trips);
        assert_eq!(decoded.expenses, payload.expenses);
        assert_eq!(decoded.break_configuration, None);
    }

    #[test]
    fn test_missing_tab_fails_validation() {
        let payload = BackupPayload::empty();
        let mut tabs = as_tab_map(encode_workbook(&payload).unwrap());
        tabs.remove("Shifts");

        let err = decode_workbook(&tabs).unwrap_err();
        assert!(matches!(err, BackupError::Validation(ref msg) if msg.contains("Shifts")));
    }

    #[test]
    fn test_services_tab_is_not_required() {
        let payload = BackupPayload::empty();
        let mut tabs = as_tab_map(encode_workbook(&payload).unwrap());
        tabs.remove("Services");

        assert!(decode_workbook(&tabs).is_ok());
    }
}
