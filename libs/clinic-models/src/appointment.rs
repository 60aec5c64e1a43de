use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::{dates, record::Record};

/// A booked appointment. Saving one produces a linked visit and invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    #[validate(length(min = 1))]
    pub patient_id: String,
    #[serde(deserialize_with = "dates::required")]
    pub date: NaiveDate,
    pub doctor_name: Option<String>,
    pub treatment_done: Option<String>,
    pub notes: Option<String>,
    pub visit_id: Option<i32>,
    pub invoice_id: Option<i32>,
    pub attachments: Option<Vec<JsonValue>>,
    pub consent_forms: Option<Vec<JsonValue>>,
}

pub type Appointment = Record<NewAppointment>;
