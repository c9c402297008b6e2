//! Renders domain values into plain JSON trees before they are placed into a
//! payload or a grid. Dates become ISO-8601 strings on the way through, so
//! every downstream consumer sees only JSON-safe leaves.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Serialize any domain value into a plain [`Value`] tree. Timestamps are
/// rendered by chrono's serde support as RFC 3339 strings, recursively
/// through nested objects and arrays.
pub fn to_plain<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// [`to_plain`] over a slice, one plain object per record.
pub fn seq_to_plain<T: Serialize>(values: &[T]) -> Result<Vec<Value>> {
    values.iter().map(to_plain).collect()
}

/// The canonical date rendering, identical to what chrono's serde emits for
/// `DateTime<Utc>` fields.
pub fn iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::parse_date;
    use chrono::TimeZone;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Inner {
        when: DateTime<Utc>,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Outer {
        label: String,
        created_at: DateTime<Utc>,
        nested: Inner,
        history: Vec<Inner>,
    }

    #[test]
    fn test_dates_render_as_iso_strings_recursively() {
        let when = Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap();
        let plain = to_plain(&Outer {
            label: "x".into(),
            created_at: when,
            nested: Inner { when },
            history: vec![Inner { when }],
        })
        .unwrap();

        for path in [
            &plain["createdAt"],
            &plain["nested"]["when"],
            &plain["history"][0]["when"],
        ] {
            assert!(path.is_string());
            assert_eq!(parse_date(path), Some(when));
        }
    }

    #[test]
    fn test_primitives_pass_through() {
        assert_eq!(to_plain(&12.5).unwrap(), json!(12.5));
        assert_eq!(to_plain(&"hola").unwrap(), json!("hola"));
        assert_eq!(to_plain(&true).unwrap(), json!(true));
    }

    #[test]
    fn test_iso_matches_serde_rendering() {
        let when = Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap();
        assert_eq!(to_plain(&when).unwrap(), json!(iso(&when)));
    }
}
