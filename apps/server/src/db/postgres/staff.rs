use async_trait::async_trait;
use dentaldesk_models::{
    NewAttendance, NewSalary, NewStaff, Record, Staff, StaffAttendance, StaffSalary,
};
use sqlx::{postgres::PgRow, Row};

use super::PostgresStore;
use crate::{db::traits::StaffStore, Error, Result};

const STAFF_COLUMNS: &str = "id, name, role, contact_info, address, join_date, salary, is_active";
const ATTENDANCE_COLUMNS: &str = "id, staff_id, date, present, remarks";
const SALARY_COLUMNS: &str = "id, staff_id, month, year, base_salary, bonus, deduction, \
    net_amount, payment_date, payment_status, notes";

fn staff_from_row(r: &PgRow) -> Staff {
    Record::new(
        r.get("id"),
        NewStaff {
            name: r.get("name"),
            role: r.get("role"),
            contact_info: r.get("contact_info"),
            address: r.get("address"),
            join_date: r.get("join_date"),
            salary: r.get("salary"),
            is_active: r.get("is_active"),
        },
    )
}

fn attendance_from_row(r: &PgRow) -> StaffAttendance {
    Record::new(
        r.get("id"),
        NewAttendance {
            staff_id: r.get("staff_id"),
            date: r.get("date"),
            present: r.get("present"),
            remarks: r.get("remarks"),
        },
    )
}

fn salary_from_row(r: &PgRow) -> StaffSalary {
    Record::new(
        r.get("id"),
        NewSalary {
            staff_id: r.get("staff_id"),
            month: r.get("month"),
            year: r.get("year"),
            base_salary: r.get("base_salary"),
            bonus: r.get("bonus"),
            deduction: r.get("deduction"),
            net_amount: r.get("net_amount"),
            payment_date: r.get("payment_date"),
            payment_status: r.get("payment_status"),
            notes: r.get("notes"),
        },
    )
}

#[async_trait]
impl StaffStore for PostgresStore {
    async fn list_staff(&self) -> Result<Vec<Staff>> {
        let rows = sqlx::query(&format!("SELECT {STAFF_COLUMNS} FROM staff ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(staff_from_row).collect())
    }

    async fn get_staff(&self, id: i32) -> Result<Option<Staff>> {
        let row = sqlx::query(&format!("SELECT {STAFF_COLUMNS} FROM staff WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(staff_from_row))
    }

    async fn create_staff(&self, staff: NewStaff) -> Result<Staff> {
        let row = sqlx::query(&format!(
            "INSERT INTO staff (name, role, contact_info, address, join_date, salary, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {STAFF_COLUMNS}"
        ))
        .bind(&staff.name)
        .bind(&staff.role)
        .bind(&staff.contact_info)
        .bind(&staff.address)
        .bind(staff.join_date)
        .bind(staff.salary)
        .bind(staff.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(staff_from_row(&row))
    }

    async fn update_staff(&self, id: i32, staff: NewStaff) -> Result<Option<Staff>> {
        let row = sqlx::query(&format!(
            "UPDATE staff SET name = $2, role = $3, contact_info = $4, address = $5,
                join_date = $6, salary = $7, is_active = $8
             WHERE id = $1
             RETURNING {STAFF_COLUMNS}"
        ))
        .bind(id)
        .bind(&staff.name)
        .bind(&staff.role)
        .bind(&staff.contact_info)
        .bind(&staff.address)
        .bind(staff.join_date)
        .bind(staff.salary)
        .bind(staff.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(staff_from_row))
    }

    async fn delete_staff(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_attendance_by_staff(&self, staff_id: i32) -> Result<Vec<StaffAttendance>> {
        let rows = sqlx::query(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM staff_attendance WHERE staff_id = $1 ORDER BY date DESC, id"
        ))
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(attendance_from_row).collect())
    }

    async fn get_attendance(&self, id: i32) -> Result<Option<StaffAttendance>> {
        let row = sqlx::query(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM staff_attendance WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(attendance_from_row))
    }

    async fn create_attendance(&self, attendance: NewAttendance) -> Result<StaffAttendance> {
        let row = sqlx::query(&format!(
            "INSERT INTO staff_attendance (staff_id, date, present, remarks)
             VALUES ($1, $2, $3, $4)
             RETURNING {ATTENDANCE_COLUMNS}"
        ))
        .bind(attendance.staff_id)
        .bind(attendance.date)
        .bind(attendance.present)
        .bind(&attendance.remarks)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(attendance_from_row(&row))
    }

    async fn update_attendance(
        &self,
        id: i32,
        attendance: NewAttendance,
    ) -> Result<Option<StaffAttendance>> {
        let row = sqlx::query(&format!(
            "UPDATE staff_attendance SET staff_id = $2, date = $3, present = $4, remarks = $5
             WHERE id = $1
             RETURNING {ATTENDANCE_COLUMNS}"
        ))
        .bind(id)
        .bind(attendance.staff_id)
        .bind(attendance.date)
        .bind(attendance.present)
        .bind(&attendance.remarks)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(attendance_from_row))
    }

    async fn delete_attendance(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM staff_attendance WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_salary_by_staff(&self, staff_id: i32) -> Result<Vec<StaffSalary>> {
        let rows = sqlx::query(&format!(
            "SELECT {SALARY_COLUMNS} FROM staff_salary WHERE staff_id = $1 ORDER BY year DESC, id DESC"
        ))
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(salary_from_row).collect())
    }

    async fn get_salary(&self, id: i32) -> Result<Option<StaffSalary>> {
        let row = sqlx::query(&format!(
            "SELECT {SALARY_COLUMNS} FROM staff_salary WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(salary_from_row))
    }

    async fn create_salary(&self, salary: NewSalary) -> Result<StaffSalary> {
        let row = sqlx::query(&format!(
            "INSERT INTO staff_salary (staff_id, month, year, base_salary, bonus, deduction,
                net_amount, payment_date, payment_status, notes)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 0), $7, $8, $9, $10)
             RETURNING {SALARY_COLUMNS}"
        ))
        .bind(salary.staff_id)
        .bind(&salary.month)
        .bind(salary.year)
        .bind(salary.base_salary)
        .bind(salary.bonus)
        .bind(salary.deduction)
        .bind(salary.net_amount)
        .bind(salary.payment_date)
        .bind(&salary.payment_status)
        .bind(&salary.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(salary_from_row(&row))
    }

    async fn update_salary(&self, id: i32, salary: NewSalary) -> Result<Option<StaffSalary>> {
        let row = sqlx::query(&format!(
            "UPDATE staff_salary SET staff_id = $2, month = $3, year = $4, base_salary = $5,
                bonus = $6, deduction = $7, net_amount = $8, payment_date = $9,
                payment_status = $10, notes = $11
             WHERE id = $1
             RETURNING {SALARY_COLUMNS}"
        ))
        .bind(id)
        .bind(salary.staff_id)
        .bind(&salary.month)
        .bind(salary.year)
        .bind(salary.base_salary)
        .bind(salary.bonus)
        .bind(salary.deduction)
        .bind(salary.net_amount)
        .bind(salary.payment_date)
        .bind(&salary.payment_status)
        .bind(&salary.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(salary_from_row))
    }

    async fn delete_salary(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM staff_salary WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
