use async_trait::async_trait;
use dentaldesk_models::{Appointment, NewAppointment, Record};
use sqlx::{postgres::PgRow, Row};

use super::{json_array, json_column, PostgresStore};
use crate::{db::traits::AppointmentStore, Error, Result};

const COLUMNS: &str = "id, patient_id, date, doctor_name, treatment_done, notes, visit_id, \
    invoice_id, attachments, consent_forms";

fn appointment_from_row(r: &PgRow) -> Appointment {
    Record::new(
        r.get("id"),
        NewAppointment {
            patient_id: r.get("patient_id"),
            date: r.get("date"),
            doctor_name: r.get("doctor_name"),
            treatment_done: r.get("treatment_done"),
            notes: r.get("notes"),
            visit_id: r.get("visit_id"),
            invoice_id: r.get("invoice_id"),
            attachments: json_array(r.get("attachments")),
            consent_forms: json_array(r.get("consent_forms")),
        },
    )
}

impl PostgresStore {
    async fn query_appointments(
        &self,
        filter: &str,
        bind: Option<BindValue<'_>>,
    ) -> Result<Vec<Appointment>> {
        let sql = format!("SELECT {COLUMNS} FROM appointments {filter} ORDER BY date DESC, id DESC");
        let query = sqlx::query(&sql);
        let query = match bind {
            Some(BindValue::Text(v)) => query.bind(v),
            Some(BindValue::Int(v)) => query.bind(v),
            None => query,
        };
        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;
        Ok(rows.iter().map(appointment_from_row).collect())
    }
}

enum BindValue<'a> {
    Text(&'a str),
    Int(i32),
}

#[async_trait]
impl AppointmentStore for PostgresStore {
    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        self.query_appointments("", None).await
    }

    async fn list_appointments_by_patient(&self, patient_id: &str) -> Result<Vec<Appointment>> {
        self.query_appointments("WHERE patient_id = $1", Some(BindValue::Text(patient_id)))
            .await
    }

    async fn list_appointments_by_invoice(&self, invoice_id: i32) -> Result<Vec<Appointment>> {
        self.query_appointments("WHERE invoice_id = $1", Some(BindValue::Int(invoice_id)))
            .await
    }

    async fn get_appointment(&self, id: i32) -> Result<Option<Appointment>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM appointments WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(appointment_from_row))
    }

    async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment> {
        let row = sqlx::query(&format!(
            "INSERT INTO appointments (patient_id, date, doctor_name, treatment_done, notes,
                visit_id, invoice_id, attachments, consent_forms)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        ))
        .bind(&appointment.patient_id)
        .bind(appointment.date)
        .bind(&appointment.doctor_name)
        .bind(&appointment.treatment_done)
        .bind(&appointment.notes)
        .bind(appointment.visit_id)
        .bind(appointment.invoice_id)
        .bind(json_column(&appointment.attachments))
        .bind(json_column(&appointment.consent_forms))
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(appointment_from_row(&row))
    }

    async fn update_appointment(
        &self,
        id: i32,
        appointment: NewAppointment,
    ) -> Result<Option<Appointment>> {
        let row = sqlx::query(&format!(
            "UPDATE appointments SET patient_id = $2, date = $3, doctor_name = $4,
                treatment_done = $5, notes = $6, visit_id = $7, invoice_id = $8,
                attachments = $9, consent_forms = $10
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&appointment.patient_id)
        .bind(appointment.date)
        .bind(&appointment.doctor_name)
        .bind(&appointment.treatment_done)
        .bind(&appointment.notes)
        .bind(appointment.visit_id)
        .bind(appointment.invoice_id)
        .bind(json_column(&appointment.attachments))
        .bind(json_column(&appointment.consent_forms))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(appointment_from_row))
    }

    async fn delete_appointment(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
