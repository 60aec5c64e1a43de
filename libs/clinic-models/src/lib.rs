//! Domain records for the DentalDesk clinic backend.
//!
//! Every persisted entity comes in two shapes:
//! - `NewX`: the insertable fields, validated at the API boundary
//! - `X` / [`Record<NewX>`]: the stored row, i.e. the insertable fields plus an id
//!
//! All types serialize as camelCase JSON, the wire format the clinic client speaks.

pub mod appointment;
pub mod billing;
pub mod dates;
pub mod lab;
pub mod patch;
pub mod patient;
pub mod pharmacy;
pub mod record;
pub mod settings;
pub mod staff;
pub mod user;
pub mod visit;

pub use appointment::{Appointment, NewAppointment};
pub use billing::{Invoice, InvoiceItem, InvoiceStatus, NewInvoice, NewInvoiceItem};
pub use lab::{
    LabInventoryItem, LabWork, LabWorkCost, NewInventoryItem, NewLabWork, NewLabWorkCost,
};
pub use patch::{apply_patch, PatchError};
pub use patient::{NewPatient, Patient};
pub use pharmacy::{Medication, NewMedication, NewPrescription, Prescription};
pub use record::Record;
pub use settings::{
    ClinicInfo, DropdownOptions, NewSetting, PatientIdFormat, Setting, SettingError, SettingKey,
    SettingValue,
};
pub use staff::{NewAttendance, NewSalary, NewStaff, Staff, StaffAttendance, StaffSalary};
pub use user::{NewUser, PublicUser, Session, User};
pub use visit::{Attachment, NewVisit, PatientVisit};
