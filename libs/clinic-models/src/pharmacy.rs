//! Medication catalog and per-visit prescriptions.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::record::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMedication {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[serde(default = "default_threshold")]
    pub threshold: i32,
    pub notes: Option<String>,
}

fn default_threshold() -> i32 {
    10
}

pub type Medication = Record<NewMedication>;

/// One prescribed line on a visit.
///
/// The four dose slots hold the count to take at that time of day, or `-` for none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub visit_id: i32,
    pub medication_id: i32,
    #[validate(range(min = 1))]
    pub sl_no: i32,
    #[serde(default = "default_food")]
    pub before_after_food: String,
    #[serde(default = "no_dose")]
    pub morning: String,
    #[serde(default = "no_dose")]
    pub afternoon: String,
    #[serde(default = "no_dose")]
    pub evening: String,
    #[serde(default = "no_dose")]
    pub night: String,
    pub duration: Option<String>,
    pub notes: Option<String>,
}

fn default_food() -> String {
    "after".to_string()
}

fn no_dose() -> String {
    "-".to_string()
}

pub type Prescription = Record<NewPrescription>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prescription_defaults() {
        let rx: NewPrescription = serde_json::from_value(json!({
            "visitId": 4,
            "medicationId": 2,
            "slNo": 1
        }))
        .unwrap();
        assert_eq!(rx.before_after_food, "after");
        assert_eq!(
            [rx.morning, rx.afternoon, rx.evening, rx.night],
            ["-", "-", "-", "-"]
        );
    }

    #[test]
    fn medication_defaults() {
        let med: NewMedication = serde_json::from_value(json!({"name": "Amoxicillin 500mg"})).unwrap();
        assert_eq!(med.quantity, 0);
        assert_eq!(med.threshold, 10);
    }
}
