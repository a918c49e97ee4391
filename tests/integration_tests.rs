use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use tower::ServiceExt;

use mans_space::config::AppConfig;
use mans_space::handlers;
use mans_space::models::{Catalog, NewAppointment};
use mans_space::services::ai::LlmProvider;
use mans_space::services::store::AppointmentStore;
use mans_space::state::AppState;

// ── Mock providers ──

struct MockLlm;

#[async_trait]
impl LlmProvider for MockLlm {
    async fn reply(&self, _instruction: &str, message: &str) -> anyhow::Result<String> {
        Ok(format!("mock: {message}"))
    }
}

struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    async fn reply(&self, _instruction: &str, _message: &str) -> anyhow::Result<String> {
        anyhow::bail!("provider down")
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_token: "test-token".to_string(),
        catalog_path: None,
        gemini_api_key: String::new(),
        gemini_model: "test-model".to_string(),
    }
}

fn test_state_with_llm(llm: Box<dyn LlmProvider>) -> Arc<AppState> {
    Arc::new(AppState {
        store: AppointmentStore::open(":memory:").unwrap(),
        catalog: Catalog::load(None).unwrap(),
        sessions: Mutex::new(HashMap::new()),
        llm,
        config: test_config(),
    })
}

fn test_state() -> Arc<AppState> {
    test_state_with_llm(Box::new(MockLlm))
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/catalog", get(handlers::catalog::get_catalog))
        .route("/api/availability/dates", get(handlers::availability::get_dates))
        .route("/api/availability/slots", get(handlers::availability::get_slots))
        .route("/api/session", post(handlers::booking::create_session))
        .route("/api/session/:id", get(handlers::booking::get_session))
        .route(
            "/api/session/:id/selection/service",
            post(handlers::booking::toggle_service),
        )
        .route(
            "/api/session/:id/selection/product",
            post(handlers::booking::adjust_product),
        )
        .route(
            "/api/session/:id/selection/product/add",
            post(handlers::booking::add_product),
        )
        .route("/api/session/:id/login", post(handlers::booking::login))
        .route(
            "/api/session/:id/wizard",
            get(handlers::booking::get_wizard),
        )
        .route(
            "/api/session/:id/wizard/open",
            post(handlers::booking::open_wizard),
        )
        .route(
            "/api/session/:id/wizard/service",
            post(handlers::booking::wizard_toggle_service),
        )
        .route(
            "/api/session/:id/wizard/product",
            post(handlers::booking::wizard_adjust_product),
        )
        .route(
            "/api/session/:id/wizard/continue",
            post(handlers::booking::continue_to_staff),
        )
        .route("/api/session/:id/wizard/back", post(handlers::booking::back))
        .route(
            "/api/session/:id/wizard/staff",
            post(handlers::booking::choose_staff),
        )
        .route(
            "/api/session/:id/wizard/date",
            post(handlers::booking::pick_date),
        )
        .route(
            "/api/session/:id/wizard/time",
            post(handlers::booking::pick_time),
        )
        .route(
            "/api/session/:id/wizard/confirm",
            post(handlers::booking::confirm),
        )
        .route(
            "/api/session/:id/wizard/close",
            post(handlers::booking::close_wizard),
        )
        .route("/api/assistant", post(handlers::assistant::chat))
        .route(
            "/api/admin/appointments",
            get(handlers::admin::get_appointments),
        )
        .route("/api/admin/metrics", get(handlers::admin::get_metrics))
        .route("/api/admin/reset", post(handlers::admin::reset))
        .with_state(state)
}

async fn read_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

async fn get_req(state: &Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    (status, read_json(res).await)
}

async fn post_req(
    state: &Arc<AppState>,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    (status, read_json(res).await)
}

async fn post_empty(state: &Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    (status, read_json(res).await)
}

async fn admin_get(state: &Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone())
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("Authorization", "Bearer test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    (status, read_json(res).await)
}

async fn new_session(state: &Arc<AppState>) -> String {
    let (status, json) = post_empty(state, "/api/session").await;
    assert_eq!(status, StatusCode::OK);
    json["session_id"].as_str().unwrap().to_string()
}

async fn login(state: &Arc<AppState>, session_id: &str) {
    let (status, _) = post_req(
        state,
        &format!("/api/session/{session_id}/login"),
        serde_json::json!({"name": "João Silva", "email": "joao@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

/// Drive a session to the schedule step with Corte Degradê, barber b1,
/// 20/05/2030 at 10:00 chosen.
async fn ready_to_confirm(state: &Arc<AppState>) -> String {
    let id = new_session(state).await;
    post_req(
        state,
        &format!("/api/session/{id}/selection/service"),
        serde_json::json!({"service_id": "s1"}),
    )
    .await;
    post_empty(state, &format!("/api/session/{id}/wizard/open")).await;
    post_empty(state, &format!("/api/session/{id}/wizard/continue")).await;
    post_req(
        state,
        &format!("/api/session/{id}/wizard/staff"),
        serde_json::json!({"staff_id": "b1"}),
    )
    .await;
    post_req(
        state,
        &format!("/api/session/{id}/wizard/date"),
        serde_json::json!({"date": "20/05/2030"}),
    )
    .await;
    post_req(
        state,
        &format!("/api/session/{id}/wizard/time"),
        serde_json::json!({"time": "10:00"}),
    )
    .await;
    id
}

fn draft(staff_id: &str, staff_name: &str, date: &str, time: &str, price: f64) -> NewAppointment {
    NewAppointment {
        client_name: "João Silva".to_string(),
        client_email: "joao@example.com".to_string(),
        staff_id: staff_id.to_string(),
        staff_name: staff_name.to_string(),
        service_names: vec!["Corte Degradê".to_string()],
        product_descriptions: vec![],
        date: date.to_string(),
        time: time.to_string(),
        total_price: price,
    }
}

// ── Basics ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, json) = get_req(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_catalog_is_served() {
    let state = test_state();
    let (status, json) = get_req(&state, "/api/catalog").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["services"][0]["name"], "Corte Degradê");
    assert_eq!(json["team"][0]["id"], "b1");
    assert!(!json["products"].as_array().unwrap().is_empty());
}

// ── Outer cart ──

#[tokio::test]
async fn test_cart_roundtrip_totals() {
    let state = test_state();
    let id = new_session(&state).await;

    // Corte Degradê (40) + 2x Pomada Matte (25 each)
    post_req(
        &state,
        &format!("/api/session/{id}/selection/service"),
        serde_json::json!({"service_id": "s1"}),
    )
    .await;
    post_req(
        &state,
        &format!("/api/session/{id}/selection/product"),
        serde_json::json!({"product_id": "p1", "delta": 1}),
    )
    .await;
    post_req(
        &state,
        &format!("/api/session/{id}/selection/product/add"),
        serde_json::json!({"product_id": "p1", "quantity": 1}),
    )
    .await;

    let (status, json) = get_req(&state, &format!("/api/session/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_price"], 90.0);
    assert_eq!(json["item_count"], 3);

    // toggling the service off again drops it from the total
    let (_, json) = post_req(
        &state,
        &format!("/api/session/{id}/selection/service"),
        serde_json::json!({"service_id": "s1"}),
    )
    .await;
    assert_eq!(json["total_price"], 50.0);
}

#[tokio::test]
async fn test_unknown_session_and_catalog_ids() {
    let state = test_state();

    let (status, _) = get_req(&state, "/api/session/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = new_session(&state).await;
    let (status, _) = post_req(
        &state,
        &format!("/api/session/{id}/selection/service"),
        serde_json::json!({"service_id": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Full booking flow ──

#[tokio::test]
async fn test_full_booking_flow_to_voucher() {
    let state = test_state();
    let id = ready_to_confirm(&state).await;

    // confirming while logged out triggers the login dialog, not a write
    let (status, json) = post_empty(&state, &format!("/api/session/{id}/wizard/confirm")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["login_required"], true);
    assert!(state.store.list().unwrap().is_empty());

    login(&state, &id).await;

    let (status, json) = post_empty(&state, &format!("/api/session/{id}/wizard/confirm")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "confirmed");
    assert_eq!(json["voucher"]["staff_name"], "Alexandre Souza");
    assert_eq!(json["voucher"]["reference"], "MANS_SPACE_20/05/2030_10:00_40");
    assert!(json["voucher"]["qr_url"]
        .as_str()
        .unwrap()
        .contains("MANS_SPACE_20/05/2030_10:00_40"));

    // the persisted record carries the snapshots
    let all = state.store.list().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].client_email, "joao@example.com");
    assert_eq!(all[0].service_names, vec!["Corte Degradê"]);

    // closing after confirmation clears the outer cart too
    let (status, json) = post_empty(&state, &format!("/api/session/{id}/wizard/close")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["wizard_open"], false);
    assert_eq!(json["item_count"], 0);
}

#[tokio::test]
async fn test_second_booking_for_same_slot_conflicts() {
    let state = test_state();

    let first = ready_to_confirm(&state).await;
    login(&state, &first).await;
    let (status, _) = post_empty(&state, &format!("/api/session/{first}/wizard/confirm")).await;
    assert_eq!(status, StatusCode::OK);

    let second = ready_to_confirm(&state).await;
    login(&state, &second).await;
    let (status, json) = post_empty(&state, &format!("/api/session/{second}/wizard/confirm")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        json["error"],
        "O barbeiro Alexandre Souza já está ocupado em 20/05/2030 às 10:00."
    );

    // the loser stays on the schedule step, slot grayed out, choice intact
    let (_, json) = get_req(&state, &format!("/api/session/{second}/wizard")).await;
    assert_eq!(json["step"], "schedule");
    assert_eq!(json["date"], "20/05/2030");
    assert_eq!(json["time"], "10:00");
    assert!(json["confirmation_error"]
        .as_str()
        .unwrap()
        .contains("ocupado"));
    let slots = json["slots"].as_array().unwrap();
    let ten = slots.iter().find(|s| s["time"] == "10:00").unwrap();
    assert_eq!(ten["busy"], true);

    // and the store still holds exactly one appointment for the slot
    assert_eq!(state.store.list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wizard_guards() {
    let state = test_state();
    let id = new_session(&state).await;
    post_empty(&state, &format!("/api/session/{id}/wizard/open")).await;

    // empty cart cannot continue
    let (status, _) = post_empty(&state, &format!("/api/session/{id}/wizard/continue")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // staff choice is not an items-step action
    let (status, _) = post_req(
        &state,
        &format!("/api/session/{id}/wizard/staff"),
        serde_json::json!({"staff_id": "b1"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // no flow open at all
    let other = new_session(&state).await;
    let (status, _) = post_empty(&state, &format!("/api/session/{other}/wizard/continue")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_slot_label_rejected() {
    let state = test_state();
    let id = ready_to_confirm(&state).await;

    let (status, _) = post_req(
        &state,
        &format!("/api/session/{id}/wizard/time"),
        serde_json::json!({"time": "12:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_changing_date_clears_chosen_time() {
    let state = test_state();
    let id = ready_to_confirm(&state).await;

    let (status, json) = post_req(
        &state,
        &format!("/api/session/{id}/wizard/date"),
        serde_json::json!({"date": "21/05/2030"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["date"], "21/05/2030");
    assert!(json["time"].is_null());
}

#[tokio::test]
async fn test_login_with_google_credential() {
    let state = test_state();
    let id = new_session(&state).await;

    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({
            "name": "Maria Souza",
            "email": "maria@example.com",
            "picture": "https://example.com/m.jpg"
        })
        .to_string(),
    );
    let credential = format!("{header}.{payload}.fakesignature");

    let (status, json) = post_req(
        &state,
        &format!("/api/session/{id}/login"),
        serde_json::json!({"credential": credential}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["logged_in"], true);

    let (status, _) = post_req(
        &state,
        &format!("/api/session/{id}/login"),
        serde_json::json!({"credential": "not-a-jwt"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Availability ──

#[tokio::test]
async fn test_availability_dates_grid() {
    let state = test_state();

    // June 2030: the 2nd is a Sunday, the rest of that week is open
    let (status, json) = get_req(&state, "/api/availability/dates?year=2030&month=6").await;
    assert_eq!(status, StatusCode::OK);
    let days = json["days"].as_array().unwrap();
    assert_eq!(days.len(), 30);
    assert_eq!(days[1]["date"], "02/06/2030");
    assert_eq!(days[1]["selectable"], false);
    assert_eq!(days[2]["selectable"], true);

    let (status, _) = get_req(&state, "/api/availability/dates?year=2030&month=13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_availability_slots_reflect_bookings() {
    let state = test_state();
    state
        .store
        .create(draft("b1", "Alexandre Souza", "20/05/2030", "10:00", 40.0))
        .unwrap();
    state
        .store
        .create(draft("b1", "Alexandre Souza", "20/05/2030", "14:00", 40.0))
        .unwrap();

    let (status, json) = get_req(
        &state,
        "/api/availability/slots?staff_id=b1&date=20/05/2030",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let slots = json["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 9);
    let busy: Vec<&str> = slots
        .iter()
        .filter(|s| s["busy"] == true)
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    assert_eq!(busy, vec!["10:00", "14:00"]);

    // another day is wide open
    let (_, json) = get_req(
        &state,
        "/api/availability/slots?staff_id=b1&date=21/05/2030",
    )
    .await;
    assert!(json["slots"].as_array().unwrap().iter().all(|s| s["busy"] == false));

    let (status, _) = get_req(
        &state,
        "/api/availability/slots?staff_id=zz&date=20/05/2030",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Admin ──

#[tokio::test]
async fn test_admin_requires_auth() {
    let state = test_state();

    let (status, _) = get_req(&state, "/api/admin/metrics").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let res = test_app(state.clone())
        .oneshot(
            Request::builder()
                .uri("/api/admin/metrics")
                .header("Authorization", "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_metrics_and_reset() {
    let state = test_state();

    let (status, json) = admin_get(&state, "/api/admin/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 0);
    assert_eq!(json["top_staff_name"], "Nenhum");

    state
        .store
        .create(draft("b1", "Ana", "20/05/2030", "09:00", 40.0))
        .unwrap();
    state
        .store
        .create(draft("b1", "Ana", "20/05/2030", "10:00", 50.0))
        .unwrap();
    state
        .store
        .create(draft("b2", "Bruno", "20/05/2030", "10:00", 30.0))
        .unwrap();

    let (_, json) = admin_get(&state, "/api/admin/metrics").await;
    assert_eq!(json["revenue"], 120.0);
    assert_eq!(json["count"], 3);
    assert_eq!(json["top_staff_name"], "Ana");

    let (_, json) = admin_get(&state, "/api/admin/appointments").await;
    assert_eq!(json.as_array().unwrap().len(), 3);
    assert_eq!(json[0]["staff_name"], "Ana");
    assert_eq!(json[0]["status"], "confirmed");

    let res = test_app(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/reset")
                .header("Authorization", "Bearer test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = read_json(res).await;
    assert_eq!(json["removed"], 3);

    let (_, json) = admin_get(&state, "/api/admin/metrics").await;
    assert_eq!(json["count"], 0);
}

// ── Assistant ──

#[tokio::test]
async fn test_assistant_passthrough() {
    let state = test_state();

    let (status, json) = post_req(
        &state,
        "/api/assistant",
        serde_json::json!({"message": "qual corte combina com rosto redondo?"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "mock: qual corte combina com rosto redondo?");
}

#[tokio::test]
async fn test_assistant_falls_back_when_provider_fails() {
    let state = test_state_with_llm(Box::new(FailingLlm));

    let (status, json) = post_req(
        &state,
        "/api/assistant",
        serde_json::json!({"message": "oi"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["reply"],
        "Desculpe, tive um pequeno problema técnico. Como posso ajudar com seu agendamento hoje?"
    );
}
