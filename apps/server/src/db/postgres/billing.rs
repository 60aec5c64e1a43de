use async_trait::async_trait;
use dentaldesk_models::{Invoice, InvoiceItem, NewInvoice, NewInvoiceItem, Record};
use sqlx::{postgres::PgRow, Row};

use super::PostgresStore;
use crate::{db::traits::BillingStore, Error, Result};

const INVOICE_COLUMNS: &str =
    "id, patient_id, visit_id, date, total_amount, status, payment_method, payment_date, notes";
const ITEM_COLUMNS: &str = "id, invoice_id, item, description, amount";

/// Smallest positive id with no invoice, so deleted invoice numbers get reused.
const LOWEST_FREE_INVOICE_ID: &str = "(SELECT CASE
        WHEN NOT EXISTS (SELECT 1 FROM invoices WHERE id = 1) THEN 1
        ELSE (SELECT MIN(i.id) + 1 FROM invoices i
              WHERE NOT EXISTS (SELECT 1 FROM invoices j WHERE j.id = i.id + 1))
    END)";

fn invoice_from_row(r: &PgRow) -> Invoice {
    Record::new(
        r.get("id"),
        NewInvoice {
            patient_id: r.get("patient_id"),
            visit_id: r.get("visit_id"),
            date: r.get("date"),
            total_amount: r.get("total_amount"),
            status: r.get("status"),
            payment_method: r.get("payment_method"),
            payment_date: r.get("payment_date"),
            notes: r.get("notes"),
        },
    )
}

fn item_from_row(r: &PgRow) -> InvoiceItem {
    Record::new(
        r.get("id"),
        NewInvoiceItem {
            invoice_id: r.get("invoice_id"),
            item: r.get("item"),
            description: r.get("description"),
            amount: r.get("amount"),
        },
    )
}

#[async_trait]
impl BillingStore for PostgresStore {
    async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY date DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(invoice_from_row).collect())
    }

    async fn list_invoices_by_patient(&self, patient_id: &str) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE patient_id = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(invoice_from_row).collect())
    }

    async fn list_invoices_by_visit(&self, visit_id: i32) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE visit_id = $1 ORDER BY id"
        ))
        .bind(visit_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(invoice_from_row).collect())
    }

    async fn get_invoice(&self, id: i32) -> Result<Option<Invoice>> {
        let row = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(invoice_from_row))
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice> {
        let row = sqlx::query(&format!(
            "INSERT INTO invoices (id, patient_id, visit_id, date, total_amount, status,
                payment_method, payment_date, notes)
             VALUES ({LOWEST_FREE_INVOICE_ID}, $1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(&invoice.patient_id)
        .bind(invoice.visit_id)
        .bind(invoice.date)
        .bind(invoice.total_amount)
        .bind(&invoice.status)
        .bind(&invoice.payment_method)
        .bind(invoice.payment_date)
        .bind(&invoice.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(invoice_from_row(&row))
    }

    async fn update_invoice(&self, id: i32, invoice: NewInvoice) -> Result<Option<Invoice>> {
        let row = sqlx::query(&format!(
            "UPDATE invoices SET patient_id = $2, visit_id = $3, date = $4, total_amount = $5,
                status = $6, payment_method = $7, payment_date = $8, notes = $9
             WHERE id = $1
             RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(id)
        .bind(&invoice.patient_id)
        .bind(invoice.visit_id)
        .bind(invoice.date)
        .bind(invoice.total_amount)
        .bind(&invoice.status)
        .bind(&invoice.payment_method)
        .bind(invoice.payment_date)
        .bind(&invoice.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(invoice_from_row))
    }

    async fn delete_invoice(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn reset_invoice_sequence(&self) -> Result<()> {
        sqlx::query("ALTER SEQUENCE invoices_id_seq RESTART WITH 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn list_invoice_items(&self, invoice_id: i32) -> Result<Vec<InvoiceItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = $1 ORDER BY id"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(item_from_row).collect())
    }

    async fn get_invoice_item(&self, id: i32) -> Result<Option<InvoiceItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(item_from_row))
    }

    async fn create_invoice_item(&self, item: NewInvoiceItem) -> Result<InvoiceItem> {
        let row = sqlx::query(&format!(
            "INSERT INTO invoice_items (invoice_id, item, description, amount)
             VALUES ($1, $2, $3, $4)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item.invoice_id)
        .bind(&item.item)
        .bind(&item.description)
        .bind(item.amount)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(item_from_row(&row))
    }

    async fn update_invoice_item(
        &self,
        id: i32,
        item: NewInvoiceItem,
    ) -> Result<Option<InvoiceItem>> {
        let row = sqlx::query(&format!(
            "UPDATE invoice_items SET invoice_id = $2, item = $3, description = $4, amount = $5
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(item.invoice_id)
        .bind(&item.item)
        .bind(&item.description)
        .bind(item.amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(item_from_row))
    }

    async fn delete_invoice_item(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM invoice_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_invoice_items(&self, invoice_id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}
