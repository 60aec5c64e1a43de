//! Staff records with their attendance and payroll logs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{dates, record::Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStaff {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub role: String,
    #[validate(length(min = 1))]
    pub contact_info: String,
    pub address: Option<String>,
    #[serde(deserialize_with = "dates::required")]
    pub join_date: NaiveDate,
    #[validate(range(min = 0.0))]
    pub salary: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

pub type Staff = Record<NewStaff>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub staff_id: i32,
    #[serde(deserialize_with = "dates::required")]
    pub date: NaiveDate,
    pub present: bool,
    pub remarks: Option<String>,
}

pub type StaffAttendance = Record<NewAttendance>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSalary {
    pub staff_id: i32,
    #[validate(length(min = 1))]
    pub month: String,
    #[validate(range(min = 1900, max = 9999))]
    pub year: i32,
    #[validate(range(min = 0.0))]
    pub base_salary: f64,
    #[serde(default)]
    pub bonus: Option<f64>,
    #[serde(default)]
    pub deduction: Option<f64>,
    pub net_amount: f64,
    #[serde(default, deserialize_with = "dates::optional")]
    pub payment_date: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub payment_status: String,
    pub notes: Option<String>,
}

impl NewSalary {
    /// `base + bonus - deduction`; what `net_amount` should hold.
    pub fn computed_net(&self) -> f64 {
        self.base_salary + self.bonus.unwrap_or(0.0) - self.deduction.unwrap_or(0.0)
    }
}

pub type StaffSalary = Record<NewSalary>;
