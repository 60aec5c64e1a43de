//! Storage layer: the `ClinicStore` interface and its two backends.

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use traits::{
    AppointmentStore, BillingStore, ClinicStore, LabStore, NewUserRow, PatientStore,
    PharmacyStore, SettingsStore, StaffStore, UserStore, VisitStore,
};
