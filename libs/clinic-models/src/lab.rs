//! Lab work orders, the lab price list, and lab stock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{dates, record::Record};

/// A fabrication order (crown, bridge, denture, ...) sent to a lab technician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLabWork {
    #[validate(length(min = 1))]
    pub patient_id: String,
    #[validate(length(min = 1))]
    pub work_type: String,
    #[validate(length(min = 1))]
    pub status: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "dates::required")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "dates::required")]
    pub due_date: NaiveDate,
    #[serde(default, deserialize_with = "dates::optional")]
    pub completed_date: Option<NaiveDate>,
    pub technician: Option<String>,
    /// Crown shade (A1..D4); only meaningful for crowns.
    pub shade: Option<String>,
    #[serde(default = "default_units")]
    #[validate(range(min = 1))]
    pub units: i32,
    #[validate(range(min = 0.0))]
    pub lab_cost: Option<f64>,
    #[validate(range(min = 0.0))]
    pub clinic_cost: Option<f64>,
    pub total_lab_cost: Option<f64>,
    pub total_clinic_cost: Option<f64>,
    #[serde(default = "default_payment_status")]
    pub payment_status: String,
    #[serde(default, deserialize_with = "dates::optional")]
    pub payment_date: Option<NaiveDate>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

fn default_units() -> i32 {
    1
}

fn default_payment_status() -> String {
    "pending".to_string()
}

impl NewLabWork {
    /// Recompute the per-order totals from the unit prices.
    pub fn recompute_totals(&mut self) {
        let units = f64::from(self.units.max(1));
        self.total_lab_cost = self.lab_cost.map(|c| c * units);
        self.total_clinic_cost = self.clinic_cost.map(|c| c * units);
    }
}

pub type LabWork = Record<NewLabWork>;

/// Price-list row: what a technician charges for one unit of a work type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLabWorkCost {
    #[validate(length(min = 1))]
    pub work_type: String,
    #[validate(length(min = 1))]
    pub lab_technician: String,
    #[validate(range(min = 0.0))]
    pub cost: f64,
}

pub type LabWorkCost = Record<NewLabWorkCost>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    #[validate(length(min = 1))]
    pub item_name: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    pub threshold: Option<i32>,
    pub unit_cost: Option<f64>,
    pub supplier: Option<String>,
    #[serde(default, deserialize_with = "dates::optional")]
    pub last_restock: Option<NaiveDate>,
}

impl NewInventoryItem {
    pub fn is_low(&self) -> bool {
        self.threshold.is_some_and(|t| self.quantity <= t)
    }
}

pub type LabInventoryItem = Record<NewInventoryItem>;
