//! Storage interface
//!
//! One sub-trait per domain so each backend can keep its SQL (or maps) in one file per
//! domain. [`ClinicStore`] is the union the server holds as `Arc<dyn ClinicStore>`.
//!
//! Conventions shared by every method group:
//! - `update_*` returns `Ok(None)` when the row does not exist
//! - `delete_*` returns `Ok(false)` when nothing was deleted
//! - no call spans more than one entity, and there are no cross-call transactions

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dentaldesk_models::{
    Appointment, Invoice, InvoiceItem, LabInventoryItem, LabWork, LabWorkCost, Medication,
    NewAppointment, NewAttendance, NewInventoryItem, NewInvoice, NewInvoiceItem, NewLabWork,
    NewLabWorkCost, NewMedication, NewPatient, NewPrescription, NewSalary, NewSetting, NewStaff,
    NewVisit, Patient, PatientVisit, Prescription, Session, Setting, Staff, StaffAttendance,
    StaffSalary, User,
};

use crate::Result;

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn list_patients(&self) -> Result<Vec<Patient>>;
    async fn get_patient(&self, id: i32) -> Result<Option<Patient>>;
    async fn get_patient_by_patient_id(&self, patient_id: &str) -> Result<Option<Patient>>;
    /// Every stored `patientId`, for ID generation.
    async fn list_patient_ids(&self) -> Result<Vec<String>>;
    async fn create_patient(&self, patient: NewPatient) -> Result<Patient>;
    async fn update_patient(&self, id: i32, patient: NewPatient) -> Result<Option<Patient>>;
    async fn delete_patient(&self, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait VisitStore: Send + Sync {
    async fn list_visits_by_patient(&self, patient_id: &str) -> Result<Vec<PatientVisit>>;
    async fn list_follow_ups(&self, previous_visit_id: i32) -> Result<Vec<PatientVisit>>;
    async fn get_visit(&self, id: i32) -> Result<Option<PatientVisit>>;
    async fn create_visit(&self, visit: NewVisit) -> Result<PatientVisit>;
    async fn update_visit(&self, id: i32, visit: NewVisit) -> Result<Option<PatientVisit>>;
    async fn delete_visit(&self, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn list_appointments(&self) -> Result<Vec<Appointment>>;
    async fn list_appointments_by_patient(&self, patient_id: &str) -> Result<Vec<Appointment>>;
    async fn list_appointments_by_invoice(&self, invoice_id: i32) -> Result<Vec<Appointment>>;
    async fn get_appointment(&self, id: i32) -> Result<Option<Appointment>>;
    async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment>;
    async fn update_appointment(
        &self,
        id: i32,
        appointment: NewAppointment,
    ) -> Result<Option<Appointment>>;
    async fn delete_appointment(&self, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait LabStore: Send + Sync {
    async fn list_lab_works(&self) -> Result<Vec<LabWork>>;
    async fn list_lab_works_by_patient(&self, patient_id: &str) -> Result<Vec<LabWork>>;
    async fn get_lab_work(&self, id: i32) -> Result<Option<LabWork>>;
    async fn create_lab_work(&self, work: NewLabWork) -> Result<LabWork>;
    async fn update_lab_work(&self, id: i32, work: NewLabWork) -> Result<Option<LabWork>>;
    async fn delete_lab_work(&self, id: i32) -> Result<bool>;

    async fn list_lab_work_costs(&self) -> Result<Vec<LabWorkCost>>;
    async fn get_lab_work_cost(&self, id: i32) -> Result<Option<LabWorkCost>>;
    /// Lowest-id price row for `work_type`, restricted to `technician` when given.
    async fn find_lab_work_cost(
        &self,
        work_type: &str,
        technician: Option<&str>,
    ) -> Result<Option<LabWorkCost>>;
    async fn create_lab_work_cost(&self, cost: NewLabWorkCost) -> Result<LabWorkCost>;
    async fn update_lab_work_cost(
        &self,
        id: i32,
        cost: NewLabWorkCost,
    ) -> Result<Option<LabWorkCost>>;
    async fn delete_lab_work_cost(&self, id: i32) -> Result<bool>;

    async fn list_inventory(&self) -> Result<Vec<LabInventoryItem>>;
    async fn get_inventory_item(&self, id: i32) -> Result<Option<LabInventoryItem>>;
    async fn create_inventory_item(&self, item: NewInventoryItem) -> Result<LabInventoryItem>;
    async fn update_inventory_item(
        &self,
        id: i32,
        item: NewInventoryItem,
    ) -> Result<Option<LabInventoryItem>>;
    async fn delete_inventory_item(&self, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait StaffStore: Send + Sync {
    async fn list_staff(&self) -> Result<Vec<Staff>>;
    async fn get_staff(&self, id: i32) -> Result<Option<Staff>>;
    async fn create_staff(&self, staff: NewStaff) -> Result<Staff>;
    async fn update_staff(&self, id: i32, staff: NewStaff) -> Result<Option<Staff>>;
    async fn delete_staff(&self, id: i32) -> Result<bool>;

    async fn list_attendance_by_staff(&self, staff_id: i32) -> Result<Vec<StaffAttendance>>;
    async fn get_attendance(&self, id: i32) -> Result<Option<StaffAttendance>>;
    async fn create_attendance(&self, attendance: NewAttendance) -> Result<StaffAttendance>;
    async fn update_attendance(
        &self,
        id: i32,
        attendance: NewAttendance,
    ) -> Result<Option<StaffAttendance>>;
    async fn delete_attendance(&self, id: i32) -> Result<bool>;

    async fn list_salary_by_staff(&self, staff_id: i32) -> Result<Vec<StaffSalary>>;
    async fn get_salary(&self, id: i32) -> Result<Option<StaffSalary>>;
    async fn create_salary(&self, salary: NewSalary) -> Result<StaffSalary>;
    async fn update_salary(&self, id: i32, salary: NewSalary) -> Result<Option<StaffSalary>>;
    async fn delete_salary(&self, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait BillingStore: Send + Sync {
    async fn list_invoices(&self) -> Result<Vec<Invoice>>;
    async fn list_invoices_by_patient(&self, patient_id: &str) -> Result<Vec<Invoice>>;
    async fn list_invoices_by_visit(&self, visit_id: i32) -> Result<Vec<Invoice>>;
    async fn get_invoice(&self, id: i32) -> Result<Option<Invoice>>;
    /// Assigns the smallest positive id not in use, so numbers freed by deletion are reused.
    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice>;
    async fn update_invoice(&self, id: i32, invoice: NewInvoice) -> Result<Option<Invoice>>;
    async fn delete_invoice(&self, id: i32) -> Result<bool>;
    /// Restart the backing id counter at 1. Invoice numbers come from
    /// [`create_invoice`](Self::create_invoice)'s lowest-free rule either way, so after a
    /// reset an emptied table numbers from 1 and a partly filled one fills its gaps.
    async fn reset_invoice_sequence(&self) -> Result<()>;

    async fn list_invoice_items(&self, invoice_id: i32) -> Result<Vec<InvoiceItem>>;
    async fn get_invoice_item(&self, id: i32) -> Result<Option<InvoiceItem>>;
    async fn create_invoice_item(&self, item: NewInvoiceItem) -> Result<InvoiceItem>;
    async fn update_invoice_item(
        &self,
        id: i32,
        item: NewInvoiceItem,
    ) -> Result<Option<InvoiceItem>>;
    async fn delete_invoice_item(&self, id: i32) -> Result<bool>;
    /// Returns how many items were removed.
    async fn delete_invoice_items(&self, invoice_id: i32) -> Result<u64>;
}

#[async_trait]
pub trait PharmacyStore: Send + Sync {
    async fn list_medications(&self) -> Result<Vec<Medication>>;
    async fn get_medication(&self, id: i32) -> Result<Option<Medication>>;
    async fn get_medication_by_name(&self, name: &str) -> Result<Option<Medication>>;
    async fn create_medication(&self, medication: NewMedication) -> Result<Medication>;
    async fn update_medication(
        &self,
        id: i32,
        medication: NewMedication,
    ) -> Result<Option<Medication>>;
    async fn delete_medication(&self, id: i32) -> Result<bool>;

    async fn list_prescriptions_by_visit(&self, visit_id: i32) -> Result<Vec<Prescription>>;
    async fn get_prescription(&self, id: i32) -> Result<Option<Prescription>>;
    async fn create_prescription(&self, prescription: NewPrescription) -> Result<Prescription>;
    async fn update_prescription(
        &self,
        id: i32,
        prescription: NewPrescription,
    ) -> Result<Option<Prescription>>;
    async fn delete_prescription(&self, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn list_settings(&self) -> Result<Vec<Setting>>;
    async fn list_settings_by_category(&self, category: &str) -> Result<Vec<Setting>>;
    async fn get_setting(&self, id: i32) -> Result<Option<Setting>>;
    async fn get_setting_by_key(&self, key: &str) -> Result<Option<Setting>>;
    async fn create_setting(&self, setting: NewSetting) -> Result<Setting>;
    async fn update_setting(&self, id: i32, setting: NewSetting) -> Result<Option<Setting>>;
}

/// Insertable account row; `password_hash` is already in `hash.salt` form.
#[derive(Debug, Clone)]
pub struct NewUserRow {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: i32) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn create_user(&self, user: NewUserRow) -> Result<User>;

    async fn create_session(&self, session: Session) -> Result<()>;
    async fn get_session(&self, id: &str) -> Result<Option<Session>>;
    async fn delete_session(&self, id: &str) -> Result<bool>;
    /// Removes sessions that expired before `now`; returns how many.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Everything the server needs from a backend.
pub trait ClinicStore:
    PatientStore
    + VisitStore
    + AppointmentStore
    + LabStore
    + StaffStore
    + BillingStore
    + PharmacyStore
    + SettingsStore
    + UserStore
{
}

impl<T> ClinicStore for T where
    T: PatientStore
        + VisitStore
        + AppointmentStore
        + LabStore
        + StaffStore
        + BillingStore
        + PharmacyStore
        + SettingsStore
        + UserStore
{
}
