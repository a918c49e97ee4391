use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

#[allow(clippy::result_large_err)]
fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), Response> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "unauthorized"})),
        )
            .into_response());
    }
    Ok(())
}

// GET /api/admin/appointments
#[derive(Serialize)]
pub struct AppointmentResponse {
    id: String,
    client_name: String,
    client_email: String,
    staff_id: String,
    staff_name: String,
    service_names: Vec<String>,
    product_descriptions: Vec<String>,
    date: String,
    time: String,
    total_price: f64,
    status: String,
    created_at: String,
}

pub async fn get_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AppointmentResponse>>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let appointments = state
        .store
        .list()
        .map_err(|e| AppError::from(e).into_response())?;

    let response: Vec<AppointmentResponse> = appointments
        .into_iter()
        .map(|a| AppointmentResponse {
            id: a.id,
            client_name: a.client_name,
            client_email: a.client_email,
            staff_id: a.staff_id,
            staff_name: a.staff_name,
            service_names: a.service_names,
            product_descriptions: a.product_descriptions,
            date: a.date,
            time: a.time,
            total_price: a.total_price,
            status: a.status.as_str().to_string(),
            created_at: a.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();

    Ok(Json(response))
}

// GET /api/admin/metrics
#[derive(Serialize)]
pub struct MetricsResponse {
    revenue: f64,
    count: i64,
    top_staff_name: String,
}

pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MetricsResponse>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let metrics = state
        .store
        .metrics()
        .map_err(|e| AppError::from(e).into_response())?;

    Ok(Json(MetricsResponse {
        revenue: metrics.revenue,
        count: metrics.count,
        // what the dashboard shows before any booking exists
        top_staff_name: metrics.top_staff_name.unwrap_or_else(|| "Nenhum".to_string()),
    }))
}

// POST /api/admin/reset — irreversible; any confirmation dialog is the
// dashboard's concern.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let removed = state
        .store
        .reset()
        .map_err(|e| AppError::from(e).into_response())?;

    tracing::warn!(removed, "operator wiped all appointments");
    Ok(Json(serde_json::json!({"ok": true, "removed": removed})))
}
