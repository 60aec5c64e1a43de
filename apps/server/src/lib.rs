//! DentalDesk: practice-management backend for dental clinics.
//!
//! Patients, visits, appointments, billing, lab work, staff, pharmacy and clinic
//! settings served as a JSON API over a pluggable store.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod services;
pub mod startup;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
