//! In-memory `ClinicStore` for development and tests.
//!
//! All tables sit behind one `RwLock`. Each call is atomic on its own; sequences of calls
//! are not.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dentaldesk_models::{
    Appointment, Invoice, InvoiceItem, LabInventoryItem, LabWork, LabWorkCost, Medication,
    NewAppointment, NewAttendance, NewInventoryItem, NewInvoice, NewInvoiceItem, NewLabWork,
    NewLabWorkCost, NewMedication, NewPatient, NewPrescription, NewSalary, NewSetting, NewStaff,
    NewVisit, Patient, PatientVisit, Prescription, Record, Session, Setting, Staff,
    StaffAttendance, StaffSalary, User,
};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::{
    db::traits::{
        AppointmentStore, BillingStore, LabStore, NewUserRow, PatientStore, PharmacyStore,
        SettingsStore, StaffStore, UserStore, VisitStore,
    },
    Error, Result,
};

/// Rows keyed by id plus the next id to hand out.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|r| pred(r)).cloned().collect()
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.values().find(|r| pred(r)).cloned()
    }

    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn insert_with(&mut self, make: impl FnOnce(i32) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        self.insert_at(id, make)
    }

    /// Insert at the smallest positive id not in use.
    fn insert_lowest_free(&mut self, make: impl FnOnce(i32) -> T) -> T {
        let mut id = 1;
        for existing in self.rows.keys() {
            if *existing != id {
                break;
            }
            id += 1;
        }
        self.next_id = self.next_id.max(id + 1);
        self.insert_at(id, make)
    }

    fn insert_at(&mut self, id: i32, make: impl FnOnce(i32) -> T) -> T {
        let row = make(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn update(&mut self, id: i32, apply: impl FnOnce(&mut T)) -> Option<T> {
        let row = self.rows.get_mut(&id)?;
        apply(row);
        Some(row.clone())
    }

    fn remove(&mut self, id: i32) -> bool {
        self.rows.remove(&id).is_some()
    }
}

impl<N: Clone> Table<Record<N>> {
    fn create(&mut self, data: N) -> Record<N> {
        self.insert_with(|id| Record::new(id, data))
    }

    fn replace(&mut self, id: i32, data: N) -> Option<Record<N>> {
        self.update(id, |row| row.data = data)
    }
}

#[derive(Debug, Default)]
struct Tables {
    patients: Table<Patient>,
    visits: Table<PatientVisit>,
    appointments: Table<Appointment>,
    lab_works: Table<LabWork>,
    lab_work_costs: Table<LabWorkCost>,
    inventory: Table<LabInventoryItem>,
    staff: Table<Staff>,
    attendance: Table<StaffAttendance>,
    salaries: Table<StaffSalary>,
    invoices: Table<Invoice>,
    invoice_items: Table<InvoiceItem>,
    medications: Table<Medication>,
    prescriptions: Table<Prescription>,
    settings: Table<Setting>,
    users: Table<User>,
    sessions: HashMap<String, Session>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn list_patients(&self) -> Result<Vec<Patient>> {
        Ok(self.tables.read().await.patients.all())
    }

    async fn get_patient(&self, id: i32) -> Result<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(id))
    }

    async fn get_patient_by_patient_id(&self, patient_id: &str) -> Result<Option<Patient>> {
        Ok(self
            .tables
            .read()
            .await
            .patients
            .find(|p| p.patient_id == patient_id))
    }

    async fn list_patient_ids(&self) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .patients
            .rows
            .values()
            .map(|p| p.patient_id.clone())
            .collect())
    }

    async fn create_patient(&self, patient: NewPatient) -> Result<Patient> {
        let mut tables = self.tables.write().await;
        Ok(tables.patients.insert_with(|id| Patient {
            id,
            data: patient,
            created_at: Utc::now(),
        }))
    }

    async fn update_patient(&self, id: i32, patient: NewPatient) -> Result<Option<Patient>> {
        let mut tables = self.tables.write().await;
        Ok(tables.patients.update(id, |row| row.data = patient))
    }

    async fn delete_patient(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.patients.remove(id))
    }
}

#[async_trait]
impl VisitStore for MemoryStore {
    async fn list_visits_by_patient(&self, patient_id: &str) -> Result<Vec<PatientVisit>> {
        Ok(self
            .tables
            .read()
            .await
            .visits
            .filter(|v| v.patient_id == patient_id))
    }

    async fn list_follow_ups(&self, previous_visit_id: i32) -> Result<Vec<PatientVisit>> {
        Ok(self
            .tables
            .read()
            .await
            .visits
            .filter(|v| v.previous_visit_id == Some(previous_visit_id)))
    }

    async fn get_visit(&self, id: i32) -> Result<Option<PatientVisit>> {
        Ok(self.tables.read().await.visits.get(id))
    }

    async fn create_visit(&self, visit: NewVisit) -> Result<PatientVisit> {
        Ok(self.tables.write().await.visits.create(visit))
    }

    async fn update_visit(&self, id: i32, visit: NewVisit) -> Result<Option<PatientVisit>> {
        Ok(self.tables.write().await.visits.replace(id, visit))
    }

    async fn delete_visit(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.visits.remove(id))
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        Ok(self.tables.read().await.appointments.all())
    }

    async fn list_appointments_by_patient(&self, patient_id: &str) -> Result<Vec<Appointment>> {
        Ok(self
            .tables
            .read()
            .await
            .appointments
            .filter(|a| a.patient_id == patient_id))
    }

    async fn list_appointments_by_invoice(&self, invoice_id: i32) -> Result<Vec<Appointment>> {
        Ok(self
            .tables
            .read()
            .await
            .appointments
            .filter(|a| a.invoice_id == Some(invoice_id)))
    }

    async fn get_appointment(&self, id: i32) -> Result<Option<Appointment>> {
        Ok(self.tables.read().await.appointments.get(id))
    }

    async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment> {
        Ok(self.tables.write().await.appointments.create(appointment))
    }

    async fn update_appointment(
        &self,
        id: i32,
        appointment: NewAppointment,
    ) -> Result<Option<Appointment>> {
        Ok(self
            .tables
            .write()
            .await
            .appointments
            .replace(id, appointment))
    }

    async fn delete_appointment(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.appointments.remove(id))
    }
}

#[async_trait]
impl LabStore for MemoryStore {
    async fn list_lab_works(&self) -> Result<Vec<LabWork>> {
        Ok(self.tables.read().await.lab_works.all())
    }

    async fn list_lab_works_by_patient(&self, patient_id: &str) -> Result<Vec<LabWork>> {
        Ok(self
            .tables
            .read()
            .await
            .lab_works
            .filter(|w| w.patient_id == patient_id))
    }

    async fn get_lab_work(&self, id: i32) -> Result<Option<LabWork>> {
        Ok(self.tables.read().await.lab_works.get(id))
    }

    async fn create_lab_work(&self, work: NewLabWork) -> Result<LabWork> {
        Ok(self.tables.write().await.lab_works.create(work))
    }

    async fn update_lab_work(&self, id: i32, work: NewLabWork) -> Result<Option<LabWork>> {
        Ok(self.tables.write().await.lab_works.replace(id, work))
    }

    async fn delete_lab_work(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.lab_works.remove(id))
    }

    async fn list_lab_work_costs(&self) -> Result<Vec<LabWorkCost>> {
        Ok(self.tables.read().await.lab_work_costs.all())
    }

    async fn get_lab_work_cost(&self, id: i32) -> Result<Option<LabWorkCost>> {
        Ok(self.tables.read().await.lab_work_costs.get(id))
    }

    async fn find_lab_work_cost(
        &self,
        work_type: &str,
        technician: Option<&str>,
    ) -> Result<Option<LabWorkCost>> {
        Ok(self.tables.read().await.lab_work_costs.find(|c| {
            c.work_type == work_type && technician.map_or(true, |t| c.lab_technician == t)
        }))
    }

    async fn create_lab_work_cost(&self, cost: NewLabWorkCost) -> Result<LabWorkCost> {
        Ok(self.tables.write().await.lab_work_costs.create(cost))
    }

    async fn update_lab_work_cost(
        &self,
        id: i32,
        cost: NewLabWorkCost,
    ) -> Result<Option<LabWorkCost>> {
        Ok(self.tables.write().await.lab_work_costs.replace(id, cost))
    }

    async fn delete_lab_work_cost(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.lab_work_costs.remove(id))
    }

    async fn list_inventory(&self) -> Result<Vec<LabInventoryItem>> {
        Ok(self.tables.read().await.inventory.all())
    }

    async fn get_inventory_item(&self, id: i32) -> Result<Option<LabInventoryItem>> {
        Ok(self.tables.read().await.inventory.get(id))
    }

    async fn create_inventory_item(&self, item: NewInventoryItem) -> Result<LabInventoryItem> {
        Ok(self.tables.write().await.inventory.create(item))
    }

    async fn update_inventory_item(
        &self,
        id: i32,
        item: NewInventoryItem,
    ) -> Result<Option<LabInventoryItem>> {
        Ok(self.tables.write().await.inventory.replace(id, item))
    }

    async fn delete_inventory_item(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.inventory.remove(id))
    }
}

#[async_trait]
impl StaffStore for MemoryStore {
    async fn list_staff(&self) -> Result<Vec<Staff>> {
        Ok(self.tables.read().await.staff.all())
    }

    async fn get_staff(&self, id: i32) -> Result<Option<Staff>> {
        Ok(self.tables.read().await.staff.get(id))
    }

    async fn create_staff(&self, staff: NewStaff) -> Result<Staff> {
        Ok(self.tables.write().await.staff.create(staff))
    }

    async fn update_staff(&self, id: i32, staff: NewStaff) -> Result<Option<Staff>> {
        Ok(self.tables.write().await.staff.replace(id, staff))
    }

    async fn delete_staff(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.staff.remove(id))
    }

    async fn list_attendance_by_staff(&self, staff_id: i32) -> Result<Vec<StaffAttendance>> {
        Ok(self
            .tables
            .read()
            .await
            .attendance
            .filter(|a| a.staff_id == staff_id))
    }

    async fn get_attendance(&self, id: i32) -> Result<Option<StaffAttendance>> {
        Ok(self.tables.read().await.attendance.get(id))
    }

    async fn create_attendance(&self, attendance: NewAttendance) -> Result<StaffAttendance> {
        Ok(self.tables.write().await.attendance.create(attendance))
    }

    async fn update_attendance(
        &self,
        id: i32,
        attendance: NewAttendance,
    ) -> Result<Option<StaffAttendance>> {
        Ok(self.tables.write().await.attendance.replace(id, attendance))
    }

    async fn delete_attendance(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.attendance.remove(id))
    }

    async fn list_salary_by_staff(&self, staff_id: i32) -> Result<Vec<StaffSalary>> {
        Ok(self
            .tables
            .read()
            .await
            .salaries
            .filter(|s| s.staff_id == staff_id))
    }

    async fn get_salary(&self, id: i32) -> Result<Option<StaffSalary>> {
        Ok(self.tables.read().await.salaries.get(id))
    }

    async fn create_salary(&self, mut salary: NewSalary) -> Result<StaffSalary> {
        salary.bonus.get_or_insert(0.0);
        salary.deduction.get_or_insert(0.0);
        Ok(self.tables.write().await.salaries.create(salary))
    }

    async fn update_salary(&self, id: i32, salary: NewSalary) -> Result<Option<StaffSalary>> {
        Ok(self.tables.write().await.salaries.replace(id, salary))
    }

    async fn delete_salary(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.salaries.remove(id))
    }
}

#[async_trait]
impl BillingStore for MemoryStore {
    async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        Ok(self.tables.read().await.invoices.all())
    }

    async fn list_invoices_by_patient(&self, patient_id: &str) -> Result<Vec<Invoice>> {
        Ok(self
            .tables
            .read()
            .await
            .invoices
            .filter(|i| i.patient_id == patient_id))
    }

    async fn list_invoices_by_visit(&self, visit_id: i32) -> Result<Vec<Invoice>> {
        Ok(self
            .tables
            .read()
            .await
            .invoices
            .filter(|i| i.visit_id == Some(visit_id)))
    }

    async fn get_invoice(&self, id: i32) -> Result<Option<Invoice>> {
        Ok(self.tables.read().await.invoices.get(id))
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .invoices
            .insert_lowest_free(|id| Record::new(id, invoice)))
    }

    async fn update_invoice(&self, id: i32, invoice: NewInvoice) -> Result<Option<Invoice>> {
        Ok(self.tables.write().await.invoices.replace(id, invoice))
    }

    async fn delete_invoice(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.invoices.remove(id))
    }

    async fn reset_invoice_sequence(&self) -> Result<()> {
        self.tables.write().await.invoices.next_id = 1;
        Ok(())
    }

    async fn list_invoice_items(&self, invoice_id: i32) -> Result<Vec<InvoiceItem>> {
        Ok(self
            .tables
            .read()
            .await
            .invoice_items
            .filter(|i| i.invoice_id == invoice_id))
    }

    async fn get_invoice_item(&self, id: i32) -> Result<Option<InvoiceItem>> {
        Ok(self.tables.read().await.invoice_items.get(id))
    }

    async fn create_invoice_item(&self, item: NewInvoiceItem) -> Result<InvoiceItem> {
        Ok(self.tables.write().await.invoice_items.create(item))
    }

    async fn update_invoice_item(
        &self,
        id: i32,
        item: NewInvoiceItem,
    ) -> Result<Option<InvoiceItem>> {
        Ok(self.tables.write().await.invoice_items.replace(id, item))
    }

    async fn delete_invoice_item(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.invoice_items.remove(id))
    }

    async fn delete_invoice_items(&self, invoice_id: i32) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.invoice_items.rows.len();
        tables
            .invoice_items
            .rows
            .retain(|_, item| item.invoice_id != invoice_id);
        Ok((before - tables.invoice_items.rows.len()) as u64)
    }
}

#[async_trait]
impl PharmacyStore for MemoryStore {
    async fn list_medications(&self) -> Result<Vec<Medication>> {
        Ok(self.tables.read().await.medications.all())
    }

    async fn get_medication(&self, id: i32) -> Result<Option<Medication>> {
        Ok(self.tables.read().await.medications.get(id))
    }

    async fn get_medication_by_name(&self, name: &str) -> Result<Option<Medication>> {
        Ok(self
            .tables
            .read()
            .await
            .medications
            .find(|m| m.name == name))
    }

    async fn create_medication(&self, medication: NewMedication) -> Result<Medication> {
        Ok(self.tables.write().await.medications.create(medication))
    }

    async fn update_medication(
        &self,
        id: i32,
        medication: NewMedication,
    ) -> Result<Option<Medication>> {
        Ok(self.tables.write().await.medications.replace(id, medication))
    }

    async fn delete_medication(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.medications.remove(id))
    }

    async fn list_prescriptions_by_visit(&self, visit_id: i32) -> Result<Vec<Prescription>> {
        let mut rows = self
            .tables
            .read()
            .await
            .prescriptions
            .filter(|p| p.visit_id == visit_id);
        rows.sort_by_key(|p| p.sl_no);
        Ok(rows)
    }

    async fn get_prescription(&self, id: i32) -> Result<Option<Prescription>> {
        Ok(self.tables.read().await.prescriptions.get(id))
    }

    async fn create_prescription(&self, prescription: NewPrescription) -> Result<Prescription> {
        Ok(self.tables.write().await.prescriptions.create(prescription))
    }

    async fn update_prescription(
        &self,
        id: i32,
        prescription: NewPrescription,
    ) -> Result<Option<Prescription>> {
        Ok(self
            .tables
            .write()
            .await
            .prescriptions
            .replace(id, prescription))
    }

    async fn delete_prescription(&self, id: i32) -> Result<bool> {
        Ok(self.tables.write().await.prescriptions.remove(id))
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn list_settings(&self) -> Result<Vec<Setting>> {
        Ok(self.tables.read().await.settings.all())
    }

    async fn list_settings_by_category(&self, category: &str) -> Result<Vec<Setting>> {
        Ok(self
            .tables
            .read()
            .await
            .settings
            .filter(|s| s.category == category))
    }

    async fn get_setting(&self, id: i32) -> Result<Option<Setting>> {
        Ok(self.tables.read().await.settings.get(id))
    }

    async fn get_setting_by_key(&self, key: &str) -> Result<Option<Setting>> {
        Ok(self
            .tables
            .read()
            .await
            .settings
            .find(|s| s.setting_key == key))
    }

    async fn create_setting(&self, setting: NewSetting) -> Result<Setting> {
        Ok(self.tables.write().await.settings.create(setting))
    }

    async fn update_setting(&self, id: i32, setting: NewSetting) -> Result<Option<Setting>> {
        Ok(self.tables.write().await.settings.replace(id, setting))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: i32) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .find(|u| u.username == username))
    }

    async fn create_user(&self, user: NewUserRow) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.find(|u| u.username == user.username).is_some() {
            return Err(Error::Conflict("Username already exists".to_string()));
        }
        Ok(tables.users.insert_with(|id| User {
            id,
            username: user.username,
            password: user.password_hash,
            full_name: user.full_name,
            role: user.role,
            created_at: Utc::now(),
        }))
    }

    async fn create_session(&self, session: Session) -> Result<()> {
        self.tables
            .write()
            .await
            .sessions
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(id).cloned())
    }

    async fn delete_session(&self, id: &str) -> Result<bool> {
        Ok(self.tables.write().await.sessions.remove(id).is_some())
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}
