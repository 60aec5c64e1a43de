//! Serde helpers for the client's date conventions.
//!
//! Form inputs submit an empty string for a cleared date field; optional dates treat
//! that as absent instead of a parse error.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// `Option<NaiveDate>` that maps `""` and `null` to `None`.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse(s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Required date, accepting the same formats as [`parse`].
pub fn required<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(raw.trim()).map_err(serde::de::Error::custom)
}

/// Accepts `YYYY-MM-DD` and full RFC3339 timestamps (the date part is kept).
pub fn parse(s: &str) -> Result<NaiveDate, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "optional")]
        next: Option<NaiveDate>,
    }

    #[test]
    fn empty_string_is_none() {
        let form: Form = serde_json::from_value(json!({"next": ""})).unwrap();
        assert!(form.next.is_none());
    }

    #[test]
    fn missing_and_null_are_none() {
        let form: Form = serde_json::from_value(json!({})).unwrap();
        assert!(form.next.is_none());
        let form: Form = serde_json::from_value(json!({"next": null})).unwrap();
        assert!(form.next.is_none());
    }

    #[test]
    fn timestamps_keep_the_date() {
        let form: Form = serde_json::from_value(json!({"next": "2024-03-09T10:00:00.000Z"})).unwrap();
        assert_eq!(form.next, NaiveDate::from_ymd_opt(2024, 3, 9));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(serde_json::from_value::<Form>(json!({"next": "tomorrow"})).is_err());
    }
}
