use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Insertable patient fields.
///
/// `patient_id` is the human-facing identifier (`PT2024-0001`). An empty value asks the
/// server to generate the next one from the `patient_id_format` setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    #[serde(default)]
    pub patient_id: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0, max = 150))]
    pub age: i32,
    #[validate(length(min = 1))]
    pub sex: String,
    pub address: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i32,
    #[serde(flatten)]
    pub data: NewPatient,
    pub created_at: DateTime<Utc>,
}

impl std::ops::Deref for Patient {
    type Target = NewPatient;

    fn deref(&self) -> &NewPatient {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patient_id_is_optional_on_input() {
        let patient: NewPatient = serde_json::from_value(json!({
            "name": "Asha Rao",
            "age": 34,
            "sex": "female",
            "address": "12 Lake Rd",
            "phoneNumber": "555-0101"
        }))
        .unwrap();
        assert!(patient.patient_id.is_empty());
        assert!(patient.validate().is_ok());
    }

    #[test]
    fn age_out_of_range_fails_validation() {
        let patient: NewPatient = serde_json::from_value(json!({
            "name": "Asha Rao",
            "age": -4,
            "sex": "female",
            "address": "",
            "phoneNumber": ""
        }))
        .unwrap();
        let errors = patient.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("age"));
    }
}
