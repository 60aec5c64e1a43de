use async_trait::async_trait;
use dentaldesk_models::{
    LabInventoryItem, LabWork, LabWorkCost, NewInventoryItem, NewLabWork, NewLabWorkCost, Record,
};
use sqlx::{postgres::PgRow, Row};

use super::PostgresStore;
use crate::{db::traits::LabStore, Error, Result};

const WORK_COLUMNS: &str = "id, patient_id, work_type, status, description, start_date, due_date, \
    completed_date, technician, shade, units, lab_cost, clinic_cost, total_lab_cost, \
    total_clinic_cost, payment_status, payment_date, cost, notes";

const COST_COLUMNS: &str = "id, work_type, lab_technician, cost";

const INVENTORY_COLUMNS: &str =
    "id, item_name, quantity, threshold, unit_cost, supplier, last_restock";

fn lab_work_from_row(r: &PgRow) -> LabWork {
    Record::new(
        r.get("id"),
        NewLabWork {
            patient_id: r.get("patient_id"),
            work_type: r.get("work_type"),
            status: r.get("status"),
            description: r.get("description"),
            start_date: r.get("start_date"),
            due_date: r.get("due_date"),
            completed_date: r.get("completed_date"),
            technician: r.get("technician"),
            shade: r.get("shade"),
            units: r.get("units"),
            lab_cost: r.get("lab_cost"),
            clinic_cost: r.get("clinic_cost"),
            total_lab_cost: r.get("total_lab_cost"),
            total_clinic_cost: r.get("total_clinic_cost"),
            payment_status: r.get("payment_status"),
            payment_date: r.get("payment_date"),
            cost: r.get("cost"),
            notes: r.get("notes"),
        },
    )
}

fn lab_cost_from_row(r: &PgRow) -> LabWorkCost {
    Record::new(
        r.get("id"),
        NewLabWorkCost {
            work_type: r.get("work_type"),
            lab_technician: r.get("lab_technician"),
            cost: r.get("cost"),
        },
    )
}

fn inventory_from_row(r: &PgRow) -> LabInventoryItem {
    Record::new(
        r.get("id"),
        NewInventoryItem {
            item_name: r.get("item_name"),
            quantity: r.get("quantity"),
            threshold: r.get("threshold"),
            unit_cost: r.get("unit_cost"),
            supplier: r.get("supplier"),
            last_restock: r.get("last_restock"),
        },
    )
}

macro_rules! bind_lab_work {
    ($query:expr, $work:expr) => {
        $query
            .bind(&$work.patient_id)
            .bind(&$work.work_type)
            .bind(&$work.status)
            .bind(&$work.description)
            .bind($work.start_date)
            .bind($work.due_date)
            .bind($work.completed_date)
            .bind(&$work.technician)
            .bind(&$work.shade)
            .bind($work.units)
            .bind($work.lab_cost)
            .bind($work.clinic_cost)
            .bind($work.total_lab_cost)
            .bind($work.total_clinic_cost)
            .bind(&$work.payment_status)
            .bind($work.payment_date)
            .bind($work.cost)
            .bind(&$work.notes)
    };
}

#[async_trait]
impl LabStore for PostgresStore {
    async fn list_lab_works(&self) -> Result<Vec<LabWork>> {
        let rows = sqlx::query(&format!(
            "SELECT {WORK_COLUMNS} FROM lab_works ORDER BY due_date, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(lab_work_from_row).collect())
    }

    async fn list_lab_works_by_patient(&self, patient_id: &str) -> Result<Vec<LabWork>> {
        let rows = sqlx::query(&format!(
            "SELECT {WORK_COLUMNS} FROM lab_works WHERE patient_id = $1 ORDER BY due_date, id"
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(lab_work_from_row).collect())
    }

    async fn get_lab_work(&self, id: i32) -> Result<Option<LabWork>> {
        let row = sqlx::query(&format!("SELECT {WORK_COLUMNS} FROM lab_works WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(lab_work_from_row))
    }

    async fn create_lab_work(&self, work: NewLabWork) -> Result<LabWork> {
        let sql = format!(
            "INSERT INTO lab_works (patient_id, work_type, status, description, start_date,
                due_date, completed_date, technician, shade, units, lab_cost, clinic_cost,
                total_lab_cost, total_clinic_cost, payment_status, payment_date, cost, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             RETURNING {WORK_COLUMNS}"
        );
        let row = bind_lab_work!(sqlx::query(&sql), work)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(lab_work_from_row(&row))
    }

    async fn update_lab_work(&self, id: i32, work: NewLabWork) -> Result<Option<LabWork>> {
        let sql = format!(
            "UPDATE lab_works SET patient_id = $1, work_type = $2, status = $3, description = $4,
                start_date = $5, due_date = $6, completed_date = $7, technician = $8, shade = $9,
                units = $10, lab_cost = $11, clinic_cost = $12, total_lab_cost = $13,
                total_clinic_cost = $14, payment_status = $15, payment_date = $16, cost = $17,
                notes = $18
             WHERE id = $19
             RETURNING {WORK_COLUMNS}"
        );
        let row = bind_lab_work!(sqlx::query(&sql), work)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(lab_work_from_row))
    }

    async fn delete_lab_work(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lab_works WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_lab_work_costs(&self) -> Result<Vec<LabWorkCost>> {
        let rows = sqlx::query(&format!(
            "SELECT {COST_COLUMNS} FROM lab_work_costs ORDER BY work_type, lab_technician, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(lab_cost_from_row).collect())
    }

    async fn get_lab_work_cost(&self, id: i32) -> Result<Option<LabWorkCost>> {
        let row = sqlx::query(&format!(
            "SELECT {COST_COLUMNS} FROM lab_work_costs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(lab_cost_from_row))
    }

    async fn find_lab_work_cost(
        &self,
        work_type: &str,
        technician: Option<&str>,
    ) -> Result<Option<LabWorkCost>> {
        let row = sqlx::query(&format!(
            "SELECT {COST_COLUMNS} FROM lab_work_costs
             WHERE work_type = $1 AND ($2::TEXT IS NULL OR lab_technician = $2)
             ORDER BY id
             LIMIT 1"
        ))
        .bind(work_type)
        .bind(technician)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(lab_cost_from_row))
    }

    async fn create_lab_work_cost(&self, cost: NewLabWorkCost) -> Result<LabWorkCost> {
        let row = sqlx::query(&format!(
            "INSERT INTO lab_work_costs (work_type, lab_technician, cost)
             VALUES ($1, $2, $3)
             RETURNING {COST_COLUMNS}"
        ))
        .bind(&cost.work_type)
        .bind(&cost.lab_technician)
        .bind(cost.cost)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(lab_cost_from_row(&row))
    }

    async fn update_lab_work_cost(
        &self,
        id: i32,
        cost: NewLabWorkCost,
    ) -> Result<Option<LabWorkCost>> {
        let row = sqlx::query(&format!(
            "UPDATE lab_work_costs SET work_type = $2, lab_technician = $3, cost = $4
             WHERE id = $1
             RETURNING {COST_COLUMNS}"
        ))
        .bind(id)
        .bind(&cost.work_type)
        .bind(&cost.lab_technician)
        .bind(cost.cost)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(lab_cost_from_row))
    }

    async fn delete_lab_work_cost(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lab_work_costs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_inventory(&self) -> Result<Vec<LabInventoryItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM lab_inventory ORDER BY item_name, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(inventory_from_row).collect())
    }

    async fn get_inventory_item(&self, id: i32) -> Result<Option<LabInventoryItem>> {
        let row = sqlx::query(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM lab_inventory WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(inventory_from_row))
    }

    async fn create_inventory_item(&self, item: NewInventoryItem) -> Result<LabInventoryItem> {
        let row = sqlx::query(&format!(
            "INSERT INTO lab_inventory (item_name, quantity, threshold, unit_cost, supplier,
                last_restock)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {INVENTORY_COLUMNS}"
        ))
        .bind(&item.item_name)
        .bind(item.quantity)
        .bind(item.threshold)
        .bind(item.unit_cost)
        .bind(&item.supplier)
        .bind(item.last_restock)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(inventory_from_row(&row))
    }

    async fn update_inventory_item(
        &self,
        id: i32,
        item: NewInventoryItem,
    ) -> Result<Option<LabInventoryItem>> {
        let row = sqlx::query(&format!(
            "UPDATE lab_inventory SET item_name = $2, quantity = $3, threshold = $4,
                unit_cost = $5, supplier = $6, last_restock = $7
             WHERE id = $1
             RETURNING {INVENTORY_COLUMNS}"
        ))
        .bind(id)
        .bind(&item.item_name)
        .bind(item.quantity)
        .bind(item.threshold)
        .bind(item.unit_cost)
        .bind(&item.supplier)
        .bind(item.last_restock)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(inventory_from_row))
    }

    async fn delete_inventory_item(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lab_inventory WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
