use async_trait::async_trait;
use dentaldesk_models::{Medication, NewMedication, NewPrescription, Prescription, Record};
use sqlx::{postgres::PgRow, Row};

use super::PostgresStore;
use crate::{db::traits::PharmacyStore, Error, Result};

const MEDICATION_COLUMNS: &str = "id, name, quantity, threshold, notes";
const PRESCRIPTION_COLUMNS: &str = "id, visit_id, medication_id, sl_no, before_after_food, \
    morning, afternoon, evening, night, duration, notes";

fn medication_from_row(r: &PgRow) -> Medication {
    Record::new(
        r.get("id"),
        NewMedication {
            name: r.get("name"),
            quantity: r.get("quantity"),
            threshold: r.get("threshold"),
            notes: r.get("notes"),
        },
    )
}

fn prescription_from_row(r: &PgRow) -> Prescription {
    Record::new(
        r.get("id"),
        NewPrescription {
            visit_id: r.get("visit_id"),
            medication_id: r.get("medication_id"),
            sl_no: r.get("sl_no"),
            before_after_food: r.get("before_after_food"),
            morning: r.get("morning"),
            afternoon: r.get("afternoon"),
            evening: r.get("evening"),
            night: r.get("night"),
            duration: r.get("duration"),
            notes: r.get("notes"),
        },
    )
}

#[async_trait]
impl PharmacyStore for PostgresStore {
    async fn list_medications(&self) -> Result<Vec<Medication>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(medication_from_row).collect())
    }

    async fn get_medication(&self, id: i32) -> Result<Option<Medication>> {
        let row = sqlx::query(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(medication_from_row))
    }

    async fn get_medication_by_name(&self, name: &str) -> Result<Option<Medication>> {
        let row = sqlx::query(&format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(medication_from_row))
    }

    async fn create_medication(&self, medication: NewMedication) -> Result<Medication> {
        let row = sqlx::query(&format!(
            "INSERT INTO medications (name, quantity, threshold, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING {MEDICATION_COLUMNS}"
        ))
        .bind(&medication.name)
        .bind(medication.quantity)
        .bind(medication.threshold)
        .bind(&medication.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(medication_from_row(&row))
    }

    async fn update_medication(
        &self,
        id: i32,
        medication: NewMedication,
    ) -> Result<Option<Medication>> {
        let row = sqlx::query(&format!(
            "UPDATE medications SET name = $2, quantity = $3, threshold = $4, notes = $5
             WHERE id = $1
             RETURNING {MEDICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(&medication.name)
        .bind(medication.quantity)
        .bind(medication.threshold)
        .bind(&medication.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(medication_from_row))
    }

    async fn delete_medication(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM medications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_prescriptions_by_visit(&self, visit_id: i32) -> Result<Vec<Prescription>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE visit_id = $1 ORDER BY sl_no, id"
        ))
        .bind(visit_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(prescription_from_row).collect())
    }

    async fn get_prescription(&self, id: i32) -> Result<Option<Prescription>> {
        let row = sqlx::query(&format!(
            "SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(prescription_from_row))
    }

    async fn create_prescription(&self, prescription: NewPrescription) -> Result<Prescription> {
        let row = sqlx::query(&format!(
            "INSERT INTO prescriptions (visit_id, medication_id, sl_no, before_after_food,
                morning, afternoon, evening, night, duration, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {PRESCRIPTION_COLUMNS}"
        ))
        .bind(prescription.visit_id)
        .bind(prescription.medication_id)
        .bind(prescription.sl_no)
        .bind(&prescription.before_after_food)
        .bind(&prescription.morning)
        .bind(&prescription.afternoon)
        .bind(&prescription.evening)
        .bind(&prescription.night)
        .bind(&prescription.duration)
        .bind(&prescription.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(prescription_from_row(&row))
    }

    async fn update_prescription(
        &self,
        id: i32,
        prescription: NewPrescription,
    ) -> Result<Option<Prescription>> {
        let row = sqlx::query(&format!(
            "UPDATE prescriptions SET visit_id = $2, medication_id = $3, sl_no = $4,
                before_after_food = $5, morning = $6, afternoon = $7, evening = $8, night = $9,
                duration = $10, notes = $11
             WHERE id = $1
             RETURNING {PRESCRIPTION_COLUMNS}"
        ))
        .bind(id)
        .bind(prescription.visit_id)
        .bind(prescription.medication_id)
        .bind(prescription.sl_no)
        .bind(&prescription.before_after_food)
        .bind(&prescription.morning)
        .bind(&prescription.afternoon)
        .bind(&prescription.evening)
        .bind(&prescription.night)
        .bind(&prescription.duration)
        .bind(&prescription.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(prescription_from_row))
    }

    async fn delete_prescription(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM prescriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
