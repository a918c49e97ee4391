use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A confirmed booking as it lives in the store. Staff and item names are
/// denormalized snapshots taken at confirmation time, so later catalog
/// edits never rewrite history. `date` is a `DD/MM/YYYY` string and `time`
/// a slot label like `14:00`; together with `staff_id` they form the
/// occupancy key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    pub staff_id: String,
    pub staff_name: String,
    pub service_names: Vec<String>,
    pub product_descriptions: Vec<String>,
    pub date: String,
    pub time: String,
    pub total_price: f64,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
}

/// What the wizard hands to the store: everything except the fields the
/// store itself assigns (id, status, created_at).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub client_name: String,
    pub client_email: String,
    pub staff_id: String,
    pub staff_name: String,
    pub service_names: Vec<String>,
    pub product_descriptions: Vec<String>,
    pub date: String,
    pub time: String,
    pub total_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Confirmed,
        }
    }
}
