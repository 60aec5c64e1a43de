//! Appointment booking and the visit/invoice records it produces.

use chrono::Utc;
use dentaldesk_models::{
    apply_patch, Appointment, NewAppointment, NewInvoice, NewInvoiceItem, NewVisit,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use validator::Validate;

use crate::{
    config::BillingConfig,
    db::{AppointmentStore, BillingStore, ClinicStore, VisitStore},
    Error, Result,
};

const DEFAULT_CHIEF_COMPLAINT: &str = "Routine check-up";
const DEFAULT_ITEM_DESCRIPTION: &str = "Dental consultation";

/// Steps of the booking cascade after the appointment itself is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CascadeStep {
    CreateVisit,
    LinkVisit,
    CreateInvoice,
    CreateItem,
    SetTotal,
    LinkInvoice,
}

impl CascadeStep {
    fn as_str(&self) -> &'static str {
        match self {
            CascadeStep::CreateVisit => "create_visit",
            CascadeStep::LinkVisit => "link_visit",
            CascadeStep::CreateInvoice => "create_invoice",
            CascadeStep::CreateItem => "create_invoice_item",
            CascadeStep::SetTotal => "set_invoice_total",
            CascadeStep::LinkInvoice => "link_invoice",
        }
    }
}

pub struct AppointmentService {
    store: Arc<dyn ClinicStore>,
    billing: BillingConfig,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn ClinicStore>, billing: BillingConfig) -> Self {
        Self { store, billing }
    }

    /// Store the appointment, then open a visit and a consultation invoice for it.
    ///
    /// Nothing is rolled back. If a later step fails the appointment is returned as far
    /// as it got and the failure is logged.
    pub async fn create(&self, appointment: NewAppointment) -> Result<Appointment> {
        let created = self.store.create_appointment(appointment).await?;
        if !self.billing.appointment_cascade {
            return Ok(created);
        }

        let id = created.id;
        let mut current = created;
        if let Err((step, err)) = self.cascade(&mut current).await {
            tracing::warn!(
                appointment_id = id,
                step = step.as_str(),
                error = %err,
                "Appointment cascade stopped early; earlier records are kept"
            );
        }
        Ok(current)
    }

    async fn cascade(
        &self,
        appointment: &mut Appointment,
    ) -> std::result::Result<(), (CascadeStep, Error)> {
        let id = appointment.id;
        let date = appointment.date;
        let treatment = appointment
            .treatment_done
            .clone()
            .filter(|t| !t.trim().is_empty());

        let mut visit = NewVisit::new(
            appointment.patient_id.clone(),
            date,
            treatment
                .clone()
                .unwrap_or_else(|| DEFAULT_CHIEF_COMPLAINT.to_string()),
        );
        visit.treatment_done = appointment.treatment_done.clone();
        visit.notes = appointment.notes.clone();
        let visit = self
            .store
            .create_visit(visit)
            .await
            .map_err(|e| (CascadeStep::CreateVisit, e))?;

        let mut linked = appointment.data.clone();
        linked.visit_id = Some(visit.id);
        *appointment = self
            .store
            .update_appointment(id, linked)
            .await
            .and_then(|a| a.ok_or_else(|| Error::not_found("Appointment")))
            .map_err(|e| (CascadeStep::LinkVisit, e))?;

        let mut invoice = NewInvoice::pending(appointment.patient_id.clone(), date);
        invoice.visit_id = Some(visit.id);
        invoice.notes = Some(format!("Invoice for appointment on {date}"));
        let invoice = self
            .store
            .create_invoice(invoice)
            .await
            .map_err(|e| (CascadeStep::CreateInvoice, e))?;

        let item = NewInvoiceItem {
            invoice_id: invoice.id,
            item: "Consultation".to_string(),
            description: Some(treatment.unwrap_or_else(|| DEFAULT_ITEM_DESCRIPTION.to_string())),
            amount: self.billing.default_consultation_fee,
        };
        let item = self
            .store
            .create_invoice_item(item)
            .await
            .map_err(|e| (CascadeStep::CreateItem, e))?;

        let mut totalled = invoice.data.clone();
        totalled.total_amount = item.amount;
        self.store
            .update_invoice(invoice.id, totalled)
            .await
            .map_err(|e| (CascadeStep::SetTotal, e))?;

        let mut linked = appointment.data.clone();
        linked.invoice_id = Some(invoice.id);
        *appointment = self
            .store
            .update_appointment(id, linked)
            .await
            .and_then(|a| a.ok_or_else(|| Error::not_found("Appointment")))
            .map_err(|e| (CascadeStep::LinkInvoice, e))?;

        tracing::info!(
            appointment_id = id,
            visit_id = visit.id,
            invoice_id = invoice.id,
            "Appointment booked"
        );
        Ok(())
    }

    /// Merge `patch` over the stored appointment. An appointment with no invoice on
    /// either side gets an empty one first.
    pub async fn update(&self, id: i32, patch: &JsonValue) -> Result<Appointment> {
        let current = self
            .store
            .get_appointment(id)
            .await?
            .ok_or_else(|| Error::not_found("Appointment"))?;

        let body_has_invoice = patch
            .get("invoiceId")
            .is_some_and(|v| !v.is_null());

        let mut merged: NewAppointment = apply_patch(&current.data, patch)?;
        merged.validate()?;

        if current.invoice_id.is_none() && !body_has_invoice {
            let mut invoice = NewInvoice::pending(
                current.patient_id.clone(),
                Utc::now().date_naive(),
            );
            invoice.notes = Some("Auto-generated invoice".to_string());
            let invoice = self.store.create_invoice(invoice).await?;
            tracing::info!(appointment_id = id, invoice_id = invoice.id, "Auto-generated invoice");
            merged.invoice_id = Some(invoice.id);
        }

        self.store
            .update_appointment(id, merged)
            .await?
            .ok_or_else(|| Error::not_found("Appointment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::NaiveDate;
    use serde_json::json;

    fn booking() -> NewAppointment {
        NewAppointment {
            patient_id: "PT2024-0001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap_or_default(),
            doctor_name: Some("Dr. Shawn".to_string()),
            treatment_done: None,
            notes: None,
            visit_id: None,
            invoice_id: None,
            attachments: None,
            consent_forms: None,
        }
    }

    fn service(cascade: bool) -> (Arc<dyn ClinicStore>, AppointmentService) {
        let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
        let billing = BillingConfig {
            default_consultation_fee: 500.0,
            appointment_cascade: cascade,
        };
        (store.clone(), AppointmentService::new(store, billing))
    }

    #[tokio::test]
    async fn booking_links_visit_and_invoice() {
        let (store, service) = service(true);
        let appointment = service.create(booking()).await.unwrap();

        let visit_id = appointment.visit_id.unwrap();
        let invoice_id = appointment.invoice_id.unwrap();
        let visit = store.get_visit(visit_id).await.unwrap().unwrap();
        assert_eq!(visit.chief_complaint, "Routine check-up");

        let invoice = store.get_invoice(invoice_id).await.unwrap().unwrap();
        assert_eq!(invoice.total_amount, 500.0);
        assert_eq!(invoice.notes.as_deref(), Some("Invoice for appointment on 2024-03-15"));
        let items = store.list_invoice_items(invoice_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description.as_deref(), Some("Dental consultation"));
    }

    #[tokio::test]
    async fn cascade_can_be_disabled() {
        let (store, service) = service(false);
        let appointment = service.create(booking()).await.unwrap();
        assert!(appointment.visit_id.is_none());
        assert!(store.list_invoices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_without_invoice_generates_one() {
        let (store, service) = service(false);
        let appointment = service.create(booking()).await.unwrap();
        let updated = service
            .update(appointment.id, &json!({"notes": "moved"}))
            .await
            .unwrap();
        let invoice = store
            .get_invoice(updated.invoice_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(invoice.notes.as_deref(), Some("Auto-generated invoice"));
        assert_eq!(updated.notes.as_deref(), Some("moved"));
    }

    #[tokio::test]
    async fn update_missing_appointment_is_not_found() {
        let (_, service) = service(true);
        let err = service.update(42, &json!({})).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
