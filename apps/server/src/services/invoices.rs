//! Invoice status changes, deletion cleanup, and revenue reporting.

use chrono::{NaiveDate, Utc};
use dentaldesk_models::{apply_patch, Invoice, InvoiceStatus, NewInvoice};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::{
    db::{AppointmentStore, BillingStore, ClinicStore},
    Error, Result,
};

/// Label used in the revenue breakdown for paid invoices with no method recorded.
pub const UNSPECIFIED_METHOD: &str = "unspecified";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodTotal {
    pub method: String,
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    pub total_revenue: f64,
    pub total_billed: f64,
    pub invoice_count: usize,
    pub paid_count: usize,
    pub pending_count: usize,
    pub by_payment_method: Vec<MethodTotal>,
}

/// Aggregate `invoices` dated within `[from, to]`; either bound may be open.
pub fn revenue_report(
    invoices: &[Invoice],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> RevenueReport {
    let mut report = RevenueReport {
        from,
        to,
        total_revenue: 0.0,
        total_billed: 0.0,
        invoice_count: 0,
        paid_count: 0,
        pending_count: 0,
        by_payment_method: Vec::new(),
    };
    let mut methods: HashMap<String, MethodTotal> = HashMap::new();

    let in_range = invoices.iter().filter(|inv| {
        from.map_or(true, |f| inv.date >= f) && to.map_or(true, |t| inv.date <= t)
    });
    for invoice in in_range {
        report.invoice_count += 1;
        report.total_billed += invoice.total_amount;
        match InvoiceStatus::from_str(&invoice.status) {
            Some(InvoiceStatus::Paid) => {
                report.paid_count += 1;
                report.total_revenue += invoice.total_amount;
                let method = invoice
                    .payment_method
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| UNSPECIFIED_METHOD.to_string());
                let entry = methods.entry(method.clone()).or_insert(MethodTotal {
                    method,
                    count: 0,
                    amount: 0.0,
                });
                entry.count += 1;
                entry.amount += invoice.total_amount;
            }
            Some(InvoiceStatus::Pending) => report.pending_count += 1,
            _ => {}
        }
    }

    let mut by_method: Vec<MethodTotal> = methods.into_values().collect();
    by_method.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.method.cmp(&b.method))
    });
    report.by_payment_method = by_method;
    report
}

pub struct InvoiceService {
    store: Arc<dyn ClinicStore>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    async fn load(&self, id: i32) -> Result<Invoice> {
        self.store
            .get_invoice(id)
            .await?
            .ok_or_else(|| Error::not_found("Invoice"))
    }

    /// Plain partial update.
    pub async fn update(&self, id: i32, patch: &JsonValue) -> Result<Invoice> {
        let current = self.load(id).await?;
        let merged: NewInvoice = apply_patch(&current.data, patch)?;
        self.save(id, merged).await
    }

    /// Partial update that also keeps the payment fields consistent with `status`.
    ///
    /// Moving to `paid` stamps today's date; any other status clears the payment date
    /// and method.
    pub async fn patch(&self, id: i32, patch: &JsonValue) -> Result<Invoice> {
        let current = self.load(id).await?;
        let mut merged: NewInvoice = apply_patch(&current.data, patch)?;

        if patch.get("status").is_some_and(|s| !s.is_null()) {
            if merged.is_paid() {
                merged.payment_date = Some(Utc::now().date_naive());
                merged.payment_method = patch
                    .get("paymentMethod")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string);
            } else {
                merged.payment_date = None;
                merged.payment_method = None;
            }
        }
        self.save(id, merged).await
    }

    async fn save(&self, id: i32, invoice: NewInvoice) -> Result<Invoice> {
        invoice.validate()?;
        self.store
            .update_invoice(id, invoice)
            .await?
            .ok_or_else(|| Error::not_found("Invoice"))
    }

    /// Remove an invoice with its items, unlinking any appointments that point at it.
    pub async fn delete(&self, id: i32) -> Result<()> {
        self.load(id).await?;

        for appointment in self.store.list_appointments_by_invoice(id).await? {
            let mut unlinked = appointment.data.clone();
            unlinked.invoice_id = None;
            self.store
                .update_appointment(appointment.id, unlinked)
                .await?;
        }
        let items = self.store.delete_invoice_items(id).await?;
        if !self.store.delete_invoice(id).await? {
            return Err(Error::not_found("Invoice"));
        }
        tracing::info!(invoice_id = id, items_removed = items, "Invoice deleted");
        Ok(())
    }

    pub async fn revenue(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<RevenueReport> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(Error::BadRequest(
                    "'from' must not be after 'to'".to_string(),
                ));
            }
        }
        let invoices = self.store.list_invoices().await?;
        Ok(revenue_report(&invoices, from, to))
    }
}
