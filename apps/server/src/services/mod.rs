//! Business logic layer
//!
//! Services sit between the route handlers and the store for the operations that touch
//! more than one entity or need more than a single store call.

pub mod appointments;
pub mod invoices;
pub mod lab;
pub mod patients;
pub mod settings;
pub mod uploads;
pub mod visits;

pub use appointments::AppointmentService;
pub use invoices::{InvoiceService, RevenueReport};
pub use lab::LabService;
pub use patients::{next_patient_id, PatientService};
pub use settings::SettingsService;
pub use uploads::{UploadService, UploadedFile};
pub use visits::{VisitList, VisitService};
