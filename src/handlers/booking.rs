use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::UserIdentity;
use crate::services::booking::{self, SessionView, WizardView};
use crate::state::AppState;

// ── Sessions and the outer cart ──

// POST /api/session
pub async fn create_session(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(booking::create_session(&state))
}

// GET /api/session/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(booking::session_view(&state, &id)?))
}

#[derive(Deserialize)]
pub struct ServiceToggle {
    pub service_id: String,
}

// POST /api/session/:id/selection/service
pub async fn toggle_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ServiceToggle>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(booking::toggle_service(&state, &id, &body.service_id)?))
}

#[derive(Deserialize)]
pub struct ProductDelta {
    pub product_id: String,
    pub delta: i64,
}

// POST /api/session/:id/selection/product — the inline +/- stepper
pub async fn adjust_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ProductDelta>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(booking::adjust_product(
        &state,
        &id,
        &body.product_id,
        body.delta,
    )?))
}

#[derive(Deserialize)]
pub struct ProductAdd {
    pub product_id: String,
    pub quantity: i64,
}

// POST /api/session/:id/selection/product/add — the detail dialog
pub async fn add_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ProductAdd>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(booking::add_product(
        &state,
        &id,
        &body.product_id,
        body.quantity,
    )?))
}

/// Either a Google Identity credential or the plain profile contract.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub credential: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture_url: Option<String>,
}

// POST /api/session/:id/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionView>, AppError> {
    let identity = match body.credential {
        Some(credential) => UserIdentity::from_google_credential(&credential)
            .map_err(|e| AppError::BadRequest(format!("invalid credential: {e}")))?,
        None => match (body.name, body.email) {
            (Some(name), Some(email)) => UserIdentity {
                name,
                email,
                picture_url: body.picture_url,
            },
            _ => {
                return Err(AppError::BadRequest(
                    "either credential or name and email are required".to_string(),
                ))
            }
        },
    };

    Ok(Json(booking::login(&state, &id, identity)?))
}

// ── Wizard ──

// POST /api/session/:id/wizard/open
pub async fn open_wizard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::open_wizard(&state, &id)?))
}

// GET /api/session/:id/wizard
pub async fn get_wizard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::wizard_view(&state, &id)?))
}

// POST /api/session/:id/wizard/service
pub async fn wizard_toggle_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ServiceToggle>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::wizard_toggle_service(
        &state,
        &id,
        &body.service_id,
    )?))
}

// POST /api/session/:id/wizard/product
pub async fn wizard_adjust_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ProductDelta>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::wizard_adjust_product(
        &state,
        &id,
        &body.product_id,
        body.delta,
    )?))
}

// POST /api/session/:id/wizard/continue
pub async fn continue_to_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::continue_to_staff(&state, &id)?))
}

// POST /api/session/:id/wizard/back
pub async fn back(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::back(&state, &id)?))
}

#[derive(Deserialize)]
pub struct StaffChoice {
    pub staff_id: String,
}

// POST /api/session/:id/wizard/staff
pub async fn choose_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StaffChoice>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::choose_staff(&state, &id, &body.staff_id)?))
}

#[derive(Deserialize)]
pub struct DatePick {
    pub date: String,
}

// POST /api/session/:id/wizard/date
pub async fn pick_date(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<DatePick>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::pick_date(&state, &id, &body.date)?))
}

#[derive(Deserialize)]
pub struct TimePick {
    pub time: String,
}

// POST /api/session/:id/wizard/time
pub async fn pick_time(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<TimePick>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::pick_time(&state, &id, &body.time)?))
}

// POST /api/session/:id/wizard/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(booking::confirm(&state, &id)?))
}

// POST /api/session/:id/wizard/close
pub async fn close_wizard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(booking::close_wizard(&state, &id)?))
}
