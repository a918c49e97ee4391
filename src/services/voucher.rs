use serde::{Deserialize, Serialize};

use crate::models::Appointment;

/// Reception voucher shown after a booking is confirmed. Derived from the
/// stored appointment, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub staff_name: String,
    pub date: String,
    pub time: String,
    pub total_price: f64,
    pub reference: String,
    pub qr_url: String,
}

pub fn issue(appointment: &Appointment) -> Voucher {
    // The reference keeps the raw date/time/total interpolation the front
    // desk scanner expects.
    let reference = format!(
        "MANS_SPACE_{}_{}_{}",
        appointment.date, appointment.time, appointment.total_price
    );
    let qr_url = format!(
        "https://api.qrserver.com/v1/create-qr-code/?size=150x150&data={reference}"
    );

    Voucher {
        staff_name: appointment.staff_name.clone(),
        date: appointment.date.clone(),
        time: appointment.time.clone(),
        total_price: appointment.total_price,
        reference,
        qr_url,
    }
}
