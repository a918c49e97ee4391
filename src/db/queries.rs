use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Appointment, AppointmentStatus};

// ── Appointments ──

pub fn insert_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    let service_names = serde_json::to_string(&appointment.service_names)?;
    let product_descriptions = serde_json::to_string(&appointment.product_descriptions)?;
    let created_at = appointment.created_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO appointments (id, client_name, client_email, staff_id, staff_name, service_names, product_descriptions, date, time, total_price, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            appointment.id,
            appointment.client_name,
            appointment.client_email,
            appointment.staff_id,
            appointment.staff_name,
            service_names,
            product_descriptions,
            appointment.date,
            appointment.time,
            appointment.total_price,
            appointment.status.as_str(),
            created_at,
        ],
    )?;
    Ok(())
}

/// All appointments in the order they were written.
pub fn get_appointments(conn: &Connection) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(
        "SELECT id, client_name, client_email, staff_id, staff_name, service_names, product_descriptions, date, time, total_price, status, created_at
         FROM appointments ORDER BY rowid ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_appointment_row(row)))?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

/// Slot labels already taken for a barber on a date. Cancelled
/// appointments free their slot.
pub fn get_busy_times(conn: &Connection, staff_id: &str, date: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT time FROM appointments
         WHERE staff_id = ?1 AND date = ?2 AND status != 'cancelled'
         ORDER BY time ASC",
    )?;

    let rows = stmt.query_map(params![staff_id, date], |row| row.get::<_, String>(0))?;

    let mut times = vec![];
    for row in rows {
        times.push(row?);
    }
    Ok(times)
}

pub struct StoreMetrics {
    pub revenue: f64,
    pub count: i64,
    pub top_staff_name: Option<String>,
}

pub fn get_metrics(conn: &Connection) -> anyhow::Result<StoreMetrics> {
    let revenue: f64 = conn.query_row(
        "SELECT COALESCE(SUM(total_price), 0) FROM appointments WHERE status != 'cancelled'",
        [],
        |row| row.get(0),
    )?;

    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE status != 'cancelled'",
        [],
        |row| row.get(0),
    )?;

    // Ties on the appointment count go to the staff name that entered the
    // store first, not to whatever order the grouping happens to yield.
    let top = conn.query_row(
        "SELECT staff_name FROM appointments WHERE status != 'cancelled'
         GROUP BY staff_name
         ORDER BY COUNT(*) DESC, MIN(rowid) ASC
         LIMIT 1",
        [],
        |row| row.get::<_, String>(0),
    );

    let top_staff_name = match top {
        Ok(name) => Some(name),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(StoreMetrics {
        revenue,
        count,
        top_staff_name,
    })
}

pub fn delete_all_appointments(conn: &Connection) -> anyhow::Result<usize> {
    let count = conn.execute("DELETE FROM appointments", [])?;
    Ok(count)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let id: String = row.get(0)?;
    let client_name: String = row.get(1)?;
    let client_email: String = row.get(2)?;
    let staff_id: String = row.get(3)?;
    let staff_name: String = row.get(4)?;
    let service_names_json: String = row.get(5)?;
    let product_descriptions_json: String = row.get(6)?;
    let date: String = row.get(7)?;
    let time: String = row.get(8)?;
    let total_price: f64 = row.get(9)?;
    let status_str: String = row.get(10)?;
    let created_at_str: String = row.get(11)?;

    let service_names: Vec<String> =
        serde_json::from_str(&service_names_json).unwrap_or_default();
    let product_descriptions: Vec<String> =
        serde_json::from_str(&product_descriptions_json).unwrap_or_default();
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Appointment {
        id,
        client_name,
        client_email,
        staff_id,
        staff_name,
        service_names,
        product_descriptions,
        date,
        time,
        total_price,
        status: AppointmentStatus::parse(&status_str),
        created_at,
    })
}
