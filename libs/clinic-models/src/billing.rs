//! Invoices and their line items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{dates, record::Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    #[validate(length(min = 1))]
    pub patient_id: String,
    pub visit_id: Option<i32>,
    #[serde(deserialize_with = "dates::required")]
    pub date: NaiveDate,
    #[validate(range(min = 0.0))]
    pub total_amount: f64,
    #[validate(length(min = 1))]
    pub status: String,
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "dates::optional")]
    pub payment_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewInvoice {
    /// An empty `pending` invoice, the starting point for auto-generated billing.
    pub fn pending(patient_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            patient_id: patient_id.into(),
            visit_id: None,
            date,
            total_amount: 0.0,
            status: InvoiceStatus::Pending.as_str().to_string(),
            payment_method: None,
            payment_date: None,
            notes: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        InvoiceStatus::from_str(&self.status) == Some(InvoiceStatus::Paid)
    }
}

pub type Invoice = Record<NewInvoice>;

/// Statuses the client uses. Stored as free text so unknown values survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Partial,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InvoiceStatus::Pending),
            "paid" => Some(InvoiceStatus::Paid),
            "partial" => Some(InvoiceStatus::Partial),
            "cancelled" => Some(InvoiceStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoiceItem {
    pub invoice_id: i32,
    #[validate(length(min = 1))]
    pub item: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub amount: f64,
}

pub type InvoiceItem = Record<NewInvoiceItem>;
