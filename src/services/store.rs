use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;

use crate::db::{self, queries};
use crate::models::{Appointment, AppointmentStatus, NewAppointment};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("O barbeiro {staff_name} já está ocupado em {date} às {time}.")]
    Conflict {
        staff_name: String,
        date: String,
        time: String,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// The only door to appointment persistence. Opened once per process and
/// cloned into whoever needs it; every access serializes on the single
/// connection, which is what makes `create` atomic.
#[derive(Clone)]
pub struct AppointmentStore {
    conn: Arc<Mutex<Connection>>,
}

impl AppointmentStore {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let conn = db::init_db(path)?;
        Ok(AppointmentStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Busy check and insert run under one connection lock; no other
    /// session's write can land between them. The partial unique index on
    /// `(staff_id, date, time)` backs the check up against writers outside
    /// this process, so a constraint violation is reported as the same
    /// conflict.
    pub fn create(&self, draft: NewAppointment) -> Result<Appointment, StoreError> {
        let conn = self.conn.lock().unwrap();

        let busy = queries::get_busy_times(&conn, &draft.staff_id, &draft.date)?;
        if busy.iter().any(|t| t == &draft.time) {
            return Err(StoreError::Conflict {
                staff_name: draft.staff_name,
                date: draft.date,
                time: draft.time,
            });
        }

        let appointment = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            client_name: draft.client_name,
            client_email: draft.client_email,
            staff_id: draft.staff_id,
            staff_name: draft.staff_name,
            service_names: draft.service_names,
            product_descriptions: draft.product_descriptions,
            date: draft.date,
            time: draft.time,
            total_price: draft.total_price,
            status: AppointmentStatus::Confirmed,
            created_at: Utc::now().naive_utc(),
        };

        match queries::insert_appointment(&conn, &appointment) {
            Ok(()) => Ok(appointment),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict {
                staff_name: appointment.staff_name,
                date: appointment.date,
                time: appointment.time,
            }),
            Err(e) => Err(StoreError::Storage(e)),
        }
    }

    pub fn list(&self) -> Result<Vec<Appointment>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Ok(queries::get_appointments(&conn)?)
    }

    pub fn busy_times(&self, staff_id: &str, date: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Ok(queries::get_busy_times(&conn, staff_id, date)?)
    }

    pub fn metrics(&self) -> Result<queries::StoreMetrics, StoreError> {
        let conn = self.conn.lock().unwrap();
        Ok(queries::get_metrics(&conn)?)
    }

    /// Operator-only: erase everything.
    pub fn reset(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        Ok(queries::delete_all_appointments(&conn)?)
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
