use async_trait::async_trait;
use dentaldesk_models::{NewVisit, PatientVisit, Record};
use sqlx::{postgres::PgRow, Row};

use super::{json_array, json_column, PostgresStore};
use crate::{db::traits::VisitStore, Error, Result};

const COLUMNS: &str = "id, patient_id, date, medical_history, drug_allergy, previous_dental_history, \
    chief_complaint, oral_examination, investigation, treatment_plan, prescription, treatment_done, \
    advice, notes, next_appointment, attachments, consent_forms, previous_visit_id";

fn visit_from_row(r: &PgRow) -> PatientVisit {
    Record::new(
        r.get("id"),
        NewVisit {
            patient_id: r.get("patient_id"),
            date: r.get("date"),
            medical_history: r.get("medical_history"),
            drug_allergy: r.get("drug_allergy"),
            previous_dental_history: r.get("previous_dental_history"),
            chief_complaint: r.get("chief_complaint"),
            oral_examination: r.get("oral_examination"),
            investigation: r.get("investigation"),
            treatment_plan: r.get("treatment_plan"),
            prescription: r.get("prescription"),
            treatment_done: r.get("treatment_done"),
            advice: r.get("advice"),
            notes: r.get("notes"),
            next_appointment: r.get("next_appointment"),
            attachments: json_array(r.get("attachments")),
            consent_forms: json_array(r.get("consent_forms")),
            previous_visit_id: r.get("previous_visit_id"),
        },
    )
}

/// Binds the 17 non-id columns in `COLUMNS` order.
macro_rules! bind_visit {
    ($query:expr, $visit:expr) => {
        $query
            .bind(&$visit.patient_id)
            .bind($visit.date)
            .bind(&$visit.medical_history)
            .bind(&$visit.drug_allergy)
            .bind(&$visit.previous_dental_history)
            .bind(&$visit.chief_complaint)
            .bind(&$visit.oral_examination)
            .bind(&$visit.investigation)
            .bind(&$visit.treatment_plan)
            .bind(&$visit.prescription)
            .bind(&$visit.treatment_done)
            .bind(&$visit.advice)
            .bind(&$visit.notes)
            .bind($visit.next_appointment)
            .bind(json_column(&$visit.attachments))
            .bind(json_column(&$visit.consent_forms))
            .bind($visit.previous_visit_id)
    };
}

#[async_trait]
impl VisitStore for PostgresStore {
    async fn list_visits_by_patient(&self, patient_id: &str) -> Result<Vec<PatientVisit>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM patient_visits WHERE patient_id = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(visit_from_row).collect())
    }

    async fn list_follow_ups(&self, previous_visit_id: i32) -> Result<Vec<PatientVisit>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM patient_visits WHERE previous_visit_id = $1 ORDER BY id"
        ))
        .bind(previous_visit_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(visit_from_row).collect())
    }

    async fn get_visit(&self, id: i32) -> Result<Option<PatientVisit>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM patient_visits WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(visit_from_row))
    }

    async fn create_visit(&self, visit: NewVisit) -> Result<PatientVisit> {
        let sql = format!(
            "INSERT INTO patient_visits (patient_id, date, medical_history, drug_allergy,
                previous_dental_history, chief_complaint, oral_examination, investigation,
                treatment_plan, prescription, treatment_done, advice, notes, next_appointment,
                attachments, consent_forms, previous_visit_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING {COLUMNS}"
        );
        let row = bind_visit!(sqlx::query(&sql), visit)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(visit_from_row(&row))
    }

    async fn update_visit(&self, id: i32, visit: NewVisit) -> Result<Option<PatientVisit>> {
        let sql = format!(
            "UPDATE patient_visits SET patient_id = $1, date = $2, medical_history = $3,
                drug_allergy = $4, previous_dental_history = $5, chief_complaint = $6,
                oral_examination = $7, investigation = $8, treatment_plan = $9, prescription = $10,
                treatment_done = $11, advice = $12, notes = $13, next_appointment = $14,
                attachments = $15, consent_forms = $16, previous_visit_id = $17
             WHERE id = $18
             RETURNING {COLUMNS}"
        );
        let row = bind_visit!(sqlx::query(&sql), visit)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(visit_from_row))
    }

    async fn delete_visit(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM patient_visits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
