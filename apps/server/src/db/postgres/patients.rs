use async_trait::async_trait;
use dentaldesk_models::{NewPatient, Patient};
use sqlx::{postgres::PgRow, Row};

use super::PostgresStore;
use crate::{db::traits::PatientStore, Error, Result};

const COLUMNS: &str = "id, patient_id, name, age, sex, address, phone_number, created_at";

fn patient_from_row(r: &PgRow) -> Patient {
    Patient {
        id: r.get("id"),
        data: NewPatient {
            patient_id: r.get("patient_id"),
            name: r.get("name"),
            age: r.get("age"),
            sex: r.get("sex"),
            address: r.get("address"),
            phone_number: r.get("phone_number"),
        },
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl PatientStore for PostgresStore {
    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM patients ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(patient_from_row).collect())
    }

    async fn get_patient(&self, id: i32) -> Result<Option<Patient>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM patients WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(patient_from_row))
    }

    async fn get_patient_by_patient_id(&self, patient_id: &str) -> Result<Option<Patient>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM patients WHERE patient_id = $1"
        ))
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(patient_from_row))
    }

    async fn list_patient_ids(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT patient_id FROM patients")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(|r| r.get("patient_id")).collect())
    }

    async fn create_patient(&self, patient: NewPatient) -> Result<Patient> {
        let row = sqlx::query(&format!(
            "INSERT INTO patients (patient_id, name, age, sex, address, phone_number)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(&patient.patient_id)
        .bind(&patient.name)
        .bind(patient.age)
        .bind(&patient.sex)
        .bind(&patient.address)
        .bind(&patient.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(patient_from_row(&row))
    }

    async fn update_patient(&self, id: i32, patient: NewPatient) -> Result<Option<Patient>> {
        let row = sqlx::query(&format!(
            "UPDATE patients
             SET patient_id = $2, name = $3, age = $4, sex = $5, address = $6, phone_number = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&patient.patient_id)
        .bind(&patient.name)
        .bind(patient.age)
        .bind(&patient.sex)
        .bind(&patient.address)
        .bind(&patient.phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(patient_from_row))
    }

    async fn delete_patient(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
