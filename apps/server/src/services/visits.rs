use chrono::Utc;
use dentaldesk_models::{apply_patch, NewVisit, PatientVisit};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use validator::Validate;

use crate::{
    db::{ClinicStore, VisitStore},
    Error, Result,
};

/// The two JSON arrays on a visit that entries can be removed from by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitList {
    Attachments,
    ConsentForms,
}

impl VisitList {
    fn missing_message(&self) -> &'static str {
        match self {
            VisitList::Attachments => "No attachments found for this visit",
            VisitList::ConsentForms => "No consent forms found for this visit",
        }
    }

    fn entry(&self) -> &'static str {
        match self {
            VisitList::Attachments => "Attachment",
            VisitList::ConsentForms => "Consent form",
        }
    }

    fn slot<'a>(&self, visit: &'a mut NewVisit) -> &'a mut Option<Vec<JsonValue>> {
        match self {
            VisitList::Attachments => &mut visit.attachments,
            VisitList::ConsentForms => &mut visit.consent_forms,
        }
    }
}

pub struct VisitService {
    store: Arc<dyn ClinicStore>,
}

impl VisitService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: i32) -> Result<PatientVisit> {
        self.store
            .get_visit(id)
            .await?
            .ok_or_else(|| Error::not_found("Visit"))
    }

    /// Partial update. Empty strings in the date fields are read as "no value", which
    /// makes an emptied `date` a validation error.
    pub async fn update(&self, id: i32, patch: &JsonValue) -> Result<PatientVisit> {
        let current = self.get(id).await?;

        let mut patch = patch.clone();
        if let Some(map) = patch.as_object_mut() {
            for key in ["date", "nextAppointment"] {
                if map.get(key).and_then(JsonValue::as_str) == Some("") {
                    map.insert(key.to_string(), JsonValue::Null);
                }
            }
        }

        let merged: NewVisit = apply_patch(&current.data, &patch)?;
        self.save(id, merged).await
    }

    pub(crate) async fn save(&self, id: i32, visit: NewVisit) -> Result<PatientVisit> {
        visit.validate()?;
        self.store
            .update_visit(id, visit)
            .await?
            .ok_or_else(|| Error::not_found("Visit"))
    }

    /// Open a new visit for today that points back at `id`.
    pub async fn create_follow_up(&self, id: i32) -> Result<PatientVisit> {
        let original = self.get(id).await?;
        let complaint = if original.chief_complaint.trim().is_empty() {
            "Appointment"
        } else {
            original.chief_complaint.as_str()
        };

        let mut follow_up = NewVisit::new(
            original.patient_id.clone(),
            Utc::now().date_naive(),
            format!("Follow-up: {complaint}"),
        );
        follow_up.previous_visit_id = Some(original.id);

        let created = self.store.create_visit(follow_up).await?;
        tracing::info!(visit_id = created.id, previous_visit_id = id, "Follow-up visit created");
        Ok(created)
    }

    pub async fn follow_ups(&self, id: i32) -> Result<Vec<PatientVisit>> {
        self.store.list_follow_ups(id).await
    }

    /// Drop the entry at `index` from one of the visit's JSON lists.
    pub async fn remove_entry(&self, id: i32, list: VisitList, index: i64) -> Result<PatientVisit> {
        let visit = self.get(id).await?;
        let mut data = visit.data.clone();

        let entries = list
            .slot(&mut data)
            .as_mut()
            .ok_or_else(|| Error::NotFound(list.missing_message().to_string()))?;
        let index = usize::try_from(index)
            .ok()
            .filter(|i| *i < entries.len())
            .ok_or_else(|| Error::not_found(list.entry()))?;
        entries.remove(index);

        self.save(id, data).await
    }
}
