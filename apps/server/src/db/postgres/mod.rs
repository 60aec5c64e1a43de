//! PostgreSQL-backed `ClinicStore` implementation
//!
//! One file per domain. Rows are mapped by hand with `Row::get`, matching the column
//! names in `migrations/`.

mod appointments;
mod billing;
mod lab;
mod patients;
mod pharmacy;
mod settings;
mod staff;
mod users;
mod visits;

use serde_json::Value as JsonValue;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PostgresStore {
    pub(crate) pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// JSONB column -> optional array; anything that is not an array reads as absent.
pub(crate) fn json_array(value: Option<JsonValue>) -> Option<Vec<JsonValue>> {
    match value {
        Some(JsonValue::Array(items)) => Some(items),
        _ => None,
    }
}

/// Optional array -> JSONB bind value.
pub(crate) fn json_column(items: &Option<Vec<JsonValue>>) -> Option<JsonValue> {
    items.as_ref().map(|items| JsonValue::Array(items.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_array_json_reads_as_none() {
        assert_eq!(json_array(Some(json!({"a": 1}))), None);
        assert_eq!(json_array(None), None);
        assert_eq!(json_array(Some(json!([1]))), Some(vec![json!(1)]));
    }
}
