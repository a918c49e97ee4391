use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::availability::{self, CalendarDay, SlotView};
use crate::state::AppState;

// GET /api/availability/dates?year=2025&month=5
#[derive(Deserialize)]
pub struct DatesQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Serialize)]
pub struct DatesResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

pub async fn get_dates(
    State(_state): State<Arc<AppState>>,
    Query(query): Query<DatesQuery>,
) -> Result<Json<DatesResponse>, AppError> {
    let today = Local::now().date_naive();
    let days = availability::month_days(query.year, query.month, today).ok_or_else(|| {
        AppError::BadRequest(format!("invalid month: {}/{}", query.month, query.year))
    })?;

    Ok(Json(DatesResponse {
        year: query.year,
        month: query.month,
        days,
    }))
}

// GET /api/availability/slots?staff_id=b1&date=20/05/2025
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub staff_id: String,
    pub date: String,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub staff_id: String,
    pub date: String,
    pub slots: Vec<SlotView>,
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    if state.catalog.staff(&query.staff_id).is_none() {
        return Err(AppError::NotFound(format!("staff {}", query.staff_id)));
    }
    let date = availability::parse_date(&query.date)
        .ok_or_else(|| AppError::BadRequest(format!("invalid date: {}", query.date)))?;
    let date = availability::format_date(date);

    let busy = state.store.busy_times(&query.staff_id, &date)?;

    Ok(Json(SlotsResponse {
        staff_id: query.staff_id,
        date,
        slots: availability::slot_board(&busy),
    }))
}
