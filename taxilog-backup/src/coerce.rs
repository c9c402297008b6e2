//! Tolerant scalar coercion for values read back from JSON backups and
//! spreadsheet grids.
//!
//! Spreadsheet cells come back as untyped text, and legacy backups carry
//! amounts as European-formatted strings ("1.234,56"). Every function here is
//! total: unparseable input maps to a documented fallback instead of an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce any JSON value to a number.
///
/// Numbers pass through. Null, missing and empty strings become 0. Strings
/// are cleaned European-style: thousands dots removed, the first comma turned
/// into a decimal point, currency symbols and spaces stripped. Anything that
/// still fails to parse becomes 0.
pub fn parse_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return 0.0;
            }
            let cleaned: String = trimmed
                .replace('.', "")
                .replacen(',', ".", 1)
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse().unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

/// Coerce any JSON value to a UTC timestamp.
///
/// Numbers are epoch milliseconds. Strings are tried as RFC 3339, then the
/// naive `YYYY-MM-DD[THH:MM[:SS]]` forms (assumed UTC), then a `DD/MM/YYYY`
/// prefix with any trailing text ignored. Returns `None` when nothing
/// matches; the caller decides the fallback.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(at_midnight(date));
    }

    day_month_year_prefix(s).map(at_midnight)
}

/// Accepts "31/12/2024" and also "31/12/2024 10:30"; only the date part of
/// the third segment is read.
fn day_month_year_prefix(s: &str) -> Option<NaiveDate> {
    let mut parts = s.splitn(3, '/');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year_digits: String = parts
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if year_digits.len() != 4 {
        return None;
    }
    let year: i32 = year_digits.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Coerce any JSON value to text. Null becomes the empty string, numbers are
/// rendered without a trailing `.0`, composite values render as compact JSON.
pub fn parse_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            let f = n.as_f64().unwrap_or(0.0);
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                format!("{}", f as i64)
            } else {
                f.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Coerce any JSON value to a bool. Accepts the text forms "true" and "1"
/// (case-insensitive) and treats nonzero numbers as true.
pub fn parse_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let t = s.trim();
            t.eq_ignore_ascii_case("true") || t == "1"
        }
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

// Serde adapters so the JSON payload path and the sheet decode path share the
// same coercion rules. Pair each with #[serde(default)] on the field.

pub fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value))
}

/// Required dates fall back to the current time when unparseable.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_date(&value).unwrap_or_else(Utc::now))
}

pub fn lenient_date_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_date(&value))
}

pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_text(&value))
}

pub fn lenient_text_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        Ok(None)
    } else {
        Ok(Some(parse_text(&value)))
    }
}

pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_bool(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_parse_number_european_format() {
        assert_eq!(parse_number(&json!("1.234,56")), 1234.56);
        assert_eq!(parse_number(&json!("-1.234,56")), -1234.56);
    }

    #[test]
    fn test_parse_number_currency_text() {
        assert_eq!(parse_number(&json!("€ 23,50")), 23.5);
        assert_eq!(parse_number(&json!("23,50 €")), 23.5);
    }

    #[test]
    fn test_parse_number_thousands_only() {
        assert_eq!(parse_number(&json!("1.234")), 1234.0);
    }

    #[test]
    fn test_parse_number_passthrough_and_empty() {
        assert_eq!(parse_number(&json!(42.5)), 42.5);
        assert_eq!(parse_number(&json!("")), 0.0);
        assert_eq!(parse_number(&Value::Null), 0.0);
    }

    #[test]
    fn test_parse_number_garbage_is_zero() {
        assert_eq!(parse_number(&json!("n/a")), 0.0);
        assert_eq!(parse_number(&json!(true)), 0.0);
    }

    #[test]
    fn test_parse_date_rfc3339() {
        let dt = parse_date(&json!("2024-06-01T10:30:00Z")).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_date_naive_forms() {
        let dt = parse_date(&json!("2024-06-01T10:30:00")).unwrap();
        assert_eq!(dt.hour(), 10);
        let dt = parse_date(&json!("2024-06-01")).unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (6, 1, 0));
    }

    #[test]
    fn test_parse_date_day_month_year() {
        let dt = parse_date(&json!("31/12/2024")).unwrap();
        assert_eq!((dt.day(), dt.month(), dt.year()), (31, 12, 2024));
    }

    #[test]
    fn test_parse_date_day_month_year_with_trailing_text() {
        let dt = parse_date(&json!("31/12/2024 10:30")).unwrap();
        assert_eq!((dt.day(), dt.month()), (31, 12));
    }

    #[test]
    fn test_parse_date_epoch_millis() {
        let dt = parse_date(&json!(1735603200000i64)).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 12, 31));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(&json!("not-a-date")), None);
        assert_eq!(parse_date(&json!("12/34")), None);
        assert_eq!(parse_date(&Value::Null), None);
    }

    #[test]
    fn test_parse_bool_text_forms() {
        assert!(parse_bool(&json!("true")));
        assert!(parse_bool(&json!("TRUE")));
        assert!(parse_bool(&json!("1")));
        assert!(parse_bool(&json!(1)));
        assert!(!parse_bool(&json!("no")));
        assert!(!parse_bool(&Value::Null));
    }

    #[test]
    fn test_parse_text_numbers() {
        assert_eq!(parse_text(&json!(12.0)), "12");
        assert_eq!(parse_text(&json!(12.5)), "12.5");
        assert_eq!(parse_text(&Value::Null), "");
    }

    #[derive(serde::Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient_number")]
        amount: f64,
    }

    #[test]
    fn test_lenient_number_through_serde() {
        let s: Sample = serde_json::from_value(json!({ "amount": "1.250,00" })).unwrap();
        assert_eq!(s.amount, 1250.0);
        let s: Sample = serde_json::from_value(json!({})).unwrap();
        assert_eq!(s.amount, 0.0);
        let s: Sample = serde_json::from_value(json!({ "amount": null })).unwrap();
        assert_eq!(s.amount, 0.0);
    }
}
