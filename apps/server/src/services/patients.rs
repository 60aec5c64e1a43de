//! Patient registration and patient-ID generation.

use chrono::{Datelike, Utc};
use dentaldesk_models::{NewPatient, Patient, PatientIdFormat};
use regex::Regex;
use std::sync::Arc;

use crate::{
    db::{ClinicStore, PatientStore},
    services::settings::SettingsService,
    Error, Result,
};

/// Next patient ID for `format` given every ID already stored.
///
/// IDs that do not match the current format (a different prefix, or last year's IDs when
/// the year is part of the format) count as 0, so numbering restarts each year.
/// Numbers longer than `digit_count` are kept whole. A stored number at `u64::MAX` has no
/// successor and is skipped.
pub fn next_patient_id(format: &PatientIdFormat, year: i32, existing: &[String]) -> String {
    let year_part = if format.year_in_format {
        year.to_string()
    } else {
        String::new()
    };
    let pattern = format!(
        r"{}{}{}(\d+)$",
        regex::escape(&format.prefix),
        year_part,
        regex::escape(&format.separator)
    );

    let next = match Regex::new(&pattern) {
        Ok(re) => existing
            .iter()
            .filter_map(|id| re.captures(id))
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
            .filter_map(|n| n.checked_add(1))
            .max()
            .unwrap_or(1),
        Err(err) => {
            tracing::warn!(error = %err, pattern = %pattern, "Invalid patient ID pattern; starting from 1");
            1
        }
    };

    format!(
        "{}{}{}{:0width$}",
        format.prefix,
        year_part,
        format.separator,
        next,
        width = format.digit_count.min(PatientIdFormat::MAX_DIGIT_COUNT)
    )
}

pub struct PatientService {
    store: Arc<dyn ClinicStore>,
    settings: Arc<SettingsService>,
}

impl PatientService {
    pub fn new(store: Arc<dyn ClinicStore>, settings: Arc<SettingsService>) -> Self {
        Self { store, settings }
    }

    /// Compute the next ID from the stored format and existing patients.
    ///
    /// Not atomic with the insert that follows: two concurrent registrations can get the
    /// same ID. Postgres then rejects the second insert on the unique key.
    pub async fn generate_patient_id(&self) -> Result<String> {
        let format = self.settings.patient_id_format().await?;
        let existing = self.store.list_patient_ids().await?;
        Ok(next_patient_id(&format, Utc::now().year(), &existing))
    }

    pub async fn create(&self, mut patient: NewPatient) -> Result<Patient> {
        if patient.patient_id.trim().is_empty() {
            patient.patient_id = self.generate_patient_id().await?;
        }
        let created = self.store.create_patient(patient).await?;
        tracing::info!(id = created.id, patient_id = %created.patient_id, "Patient registered");
        Ok(created)
    }

    /// `GET /patients/:id` accepts either the human patient ID or the numeric row id.
    pub async fn find(&self, id_or_patient_id: &str) -> Result<Patient> {
        if let Some(patient) = self
            .store
            .get_patient_by_patient_id(id_or_patient_id)
            .await?
        {
            return Ok(patient);
        }
        let id: i32 = id_or_patient_id
            .parse()
            .map_err(|_| Error::not_found("Patient"))?;
        self.store
            .get_patient(id)
            .await?
            .ok_or_else(|| Error::not_found("Patient"))
    }
}
