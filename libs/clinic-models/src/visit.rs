use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::{dates, record::Record};

/// One clinical encounter.
///
/// The free-text clinical fields mirror the dropdown lists in the `dropdown_options`
/// setting. `attachments` and `consent_forms` are JSON arrays owned by the client;
/// the server only appends and removes entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVisit {
    #[validate(length(min = 1))]
    pub patient_id: String,
    #[serde(deserialize_with = "dates::required")]
    pub date: NaiveDate,
    pub medical_history: Option<String>,
    pub drug_allergy: Option<String>,
    pub previous_dental_history: Option<String>,
    #[validate(length(min = 1, message = "chief complaint is required"))]
    pub chief_complaint: String,
    pub oral_examination: Option<String>,
    pub investigation: Option<String>,
    pub treatment_plan: Option<String>,
    pub prescription: Option<String>,
    pub treatment_done: Option<String>,
    pub advice: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "dates::optional")]
    pub next_appointment: Option<NaiveDate>,
    pub attachments: Option<Vec<JsonValue>>,
    pub consent_forms: Option<Vec<JsonValue>>,
    pub previous_visit_id: Option<i32>,
}

impl NewVisit {
    /// A visit with only the required fields set.
    pub fn new(patient_id: impl Into<String>, date: NaiveDate, chief_complaint: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            date,
            medical_history: None,
            drug_allergy: None,
            previous_dental_history: None,
            chief_complaint: chief_complaint.into(),
            oral_examination: None,
            investigation: None,
            treatment_plan: None,
            prescription: None,
            treatment_done: None,
            advice: None,
            notes: None,
            next_appointment: None,
            attachments: None,
            consent_forms: None,
            previous_visit_id: None,
        }
    }

    pub fn attachments(&self) -> &[JsonValue] {
        self.attachments.as_deref().unwrap_or_default()
    }
}

pub type PatientVisit = Record<NewVisit>;

/// A file attached to a visit through the upload endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
    /// Name on disk under the uploads directory; absent for inline attachments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub date_added: DateTime<Utc>,
}

impl Attachment {
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}
