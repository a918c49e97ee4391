use chrono::Utc;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::wizard::LookupKey;
use crate::models::{BookingSession, Selection, StaffMember, Step, Wizard};
use crate::services::availability::{self, SlotView};
use crate::services::store::StoreError;
use crate::services::voucher::{self, Voucher};
use crate::state::AppState;

/// What the catalog page sees of a session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub selection: Selection,
    pub total_price: f64,
    pub item_count: i64,
    pub logged_in: bool,
    pub wizard_open: bool,
}

/// What the booking dialog renders: the current step plus everything the
/// step needs, including the tagged slot board on the schedule step.
#[derive(Debug, Serialize)]
pub struct WizardView {
    pub step: Step,
    pub selection: Selection,
    pub total_price: f64,
    pub staff: Option<StaffMember>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub slots: Vec<SlotView>,
    pub confirmation_error: Option<String>,
    pub voucher: Option<Voucher>,
}

fn session_view_of(session: &BookingSession) -> SessionView {
    SessionView {
        session_id: session.id.clone(),
        selection: session.selection.clone(),
        total_price: session.selection.total_price(),
        item_count: session.selection.item_count(),
        logged_in: session.identity.is_some(),
        wizard_open: session.wizard.is_some(),
    }
}

fn wizard_view_of(wizard: &Wizard) -> WizardView {
    WizardView {
        step: wizard.step.clone(),
        selection: wizard.selection.clone(),
        total_price: wizard.selection.total_price(),
        staff: wizard.staff.clone(),
        date: wizard.date.clone(),
        time: wizard.time.clone(),
        slots: availability::slot_board(&wizard.busy_times),
        confirmation_error: wizard.confirmation_error.clone(),
        voucher: wizard.voucher.clone(),
    }
}

/// Run a closure against one session under the registry lock. Every
/// mutation of session or wizard state goes through here, so user actions
/// on the same session never interleave.
fn with_session<T>(
    state: &AppState,
    session_id: &str,
    f: impl FnOnce(&mut BookingSession) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut sessions = state.sessions.lock().unwrap();
    let session = sessions
        .get_mut(session_id)
        .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?;
    session.touch();
    f(session)
}

fn with_wizard<T>(
    state: &AppState,
    session_id: &str,
    f: impl FnOnce(&mut Wizard) -> Result<T, AppError>,
) -> Result<T, AppError> {
    with_session(state, session_id, |session| {
        let wizard = session.wizard.as_mut().ok_or(AppError::NoOpenWizard)?;
        f(wizard)
    })
}

// ── Sessions ──

pub fn create_session(state: &AppState) -> SessionView {
    let session = BookingSession::new();
    let view = session_view_of(&session);

    let mut sessions = state.sessions.lock().unwrap();
    let now = Utc::now().naive_utc();
    sessions.retain(|_, s| !s.is_expired(now));
    sessions.insert(session.id.clone(), session);

    tracing::info!(session = %view.session_id, "session created");
    view
}

pub fn session_view(state: &AppState, session_id: &str) -> Result<SessionView, AppError> {
    with_session(state, session_id, |session| Ok(session_view_of(session)))
}

// ── Outer cart ──

pub fn toggle_service(
    state: &AppState,
    session_id: &str,
    service_id: &str,
) -> Result<SessionView, AppError> {
    let service = state
        .catalog
        .service(service_id)
        .ok_or_else(|| AppError::NotFound(format!("service {service_id}")))?;

    with_session(state, session_id, |session| {
        session.selection.toggle_service(service);
        Ok(session_view_of(session))
    })
}

pub fn adjust_product(
    state: &AppState,
    session_id: &str,
    product_id: &str,
    delta: i64,
) -> Result<SessionView, AppError> {
    let product = state
        .catalog
        .product(product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    with_session(state, session_id, |session| {
        session.selection.update_product_qty(product, delta);
        Ok(session_view_of(session))
    })
}

pub fn add_product(
    state: &AppState,
    session_id: &str,
    product_id: &str,
    quantity: i64,
) -> Result<SessionView, AppError> {
    let product = state
        .catalog
        .product(product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    with_session(state, session_id, |session| {
        session.selection.add_product(product, quantity);
        Ok(session_view_of(session))
    })
}

pub fn login(
    state: &AppState,
    session_id: &str,
    identity: crate::models::UserIdentity,
) -> Result<SessionView, AppError> {
    with_session(state, session_id, |session| {
        tracing::info!(session = %session_id, email = %identity.email, "client logged in");
        session.identity = Some(identity);
        Ok(session_view_of(session))
    })
}

// ── Wizard lifecycle ──

/// Open (or reopen) the booking dialog, seeded with a copy of the outer
/// cart. Reopening discards any half-finished earlier flow.
pub fn open_wizard(state: &AppState, session_id: &str) -> Result<WizardView, AppError> {
    with_session(state, session_id, |session| {
        let wizard = Wizard::open(session.selection.clone());
        let view = wizard_view_of(&wizard);
        session.wizard = Some(wizard);
        Ok(view)
    })
}

pub fn wizard_view(state: &AppState, session_id: &str) -> Result<WizardView, AppError> {
    with_wizard(state, session_id, |wizard| Ok(wizard_view_of(wizard)))
}

pub fn close_wizard(state: &AppState, session_id: &str) -> Result<SessionView, AppError> {
    with_session(state, session_id, |session| {
        session.close_wizard();
        Ok(session_view_of(session))
    })
}

// ── Wizard steps ──

pub fn wizard_toggle_service(
    state: &AppState,
    session_id: &str,
    service_id: &str,
) -> Result<WizardView, AppError> {
    let service = state
        .catalog
        .service(service_id)
        .ok_or_else(|| AppError::NotFound(format!("service {service_id}")))?;

    with_wizard(state, session_id, |wizard| {
        wizard.toggle_service(service)?;
        Ok(wizard_view_of(wizard))
    })
}

pub fn wizard_adjust_product(
    state: &AppState,
    session_id: &str,
    product_id: &str,
    delta: i64,
) -> Result<WizardView, AppError> {
    let product = state
        .catalog
        .product(product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    with_wizard(state, session_id, |wizard| {
        wizard.update_product_qty(product, delta)?;
        Ok(wizard_view_of(wizard))
    })
}

pub fn continue_to_staff(state: &AppState, session_id: &str) -> Result<WizardView, AppError> {
    with_wizard(state, session_id, |wizard| {
        wizard.continue_to_staff()?;
        Ok(wizard_view_of(wizard))
    })
}

pub fn back(state: &AppState, session_id: &str) -> Result<WizardView, AppError> {
    with_wizard(state, session_id, |wizard| {
        wizard.back()?;
        Ok(wizard_view_of(wizard))
    })
}

pub fn choose_staff(
    state: &AppState,
    session_id: &str,
    staff_id: &str,
) -> Result<WizardView, AppError> {
    let staff = state
        .catalog
        .staff(staff_id)
        .ok_or_else(|| AppError::NotFound(format!("staff {staff_id}")))?;

    let key = with_wizard(state, session_id, |wizard| Ok(wizard.choose_staff(staff)?))?;
    if let Some(key) = key {
        refresh_busy_times(state, session_id, key)?;
    }
    wizard_view(state, session_id)
}

pub fn pick_date(state: &AppState, session_id: &str, date: &str) -> Result<WizardView, AppError> {
    let parsed = availability::parse_date(date)
        .ok_or_else(|| AppError::BadRequest(format!("invalid date: {date}")))?;
    // normalize zero-padding before the string becomes a comparison key
    let date = availability::format_date(parsed);

    let key = with_wizard(state, session_id, |wizard| Ok(wizard.pick_date(date)?))?;
    refresh_busy_times(state, session_id, key)?;
    wizard_view(state, session_id)
}

pub fn pick_time(state: &AppState, session_id: &str, time: &str) -> Result<WizardView, AppError> {
    with_wizard(state, session_id, |wizard| {
        wizard.pick_time(time)?;
        Ok(wizard_view_of(wizard))
    })
}

/// Query the store for a `(staff, date)` pair and hand the result to the
/// wizard. The store is consulted outside the sessions lock, so by the
/// time the result lands the wizard may already show a different pair;
/// `apply_busy_times` drops it in that case.
fn refresh_busy_times(
    state: &AppState,
    session_id: &str,
    key: LookupKey,
) -> Result<(), AppError> {
    let times = state.store.busy_times(&key.staff_id, &key.date)?;

    with_session(state, session_id, |session| {
        if let Some(wizard) = session.wizard.as_mut() {
            if !wizard.apply_busy_times(&key, times) {
                tracing::debug!(
                    session = %session_id,
                    staff = %key.staff_id,
                    date = %key.date,
                    "discarded stale busy lookup"
                );
            }
        }
        Ok(())
    })
}

/// The confirm action: draft under the lock, write to the store outside
/// it, then land the outcome back on the wizard. A conflicting write
/// leaves the customer on the schedule step with the message and a
/// refreshed slot board.
pub fn confirm(state: &AppState, session_id: &str) -> Result<WizardView, AppError> {
    let draft = with_session(state, session_id, |session| {
        let identity = session.identity.clone();
        let wizard = session.wizard.as_mut().ok_or(AppError::NoOpenWizard)?;
        Ok(wizard.confirmation_request(identity.as_ref())?)
    })?;

    match state.store.create(draft.clone()) {
        Ok(appointment) => {
            tracing::info!(
                session = %session_id,
                appointment = %appointment.id,
                staff = %appointment.staff_name,
                date = %appointment.date,
                time = %appointment.time,
                "booking confirmed"
            );
            let voucher = voucher::issue(&appointment);
            with_wizard(state, session_id, |wizard| {
                if !wizard.complete(&draft, voucher) {
                    tracing::warn!(
                        session = %session_id,
                        "slot changed while the booking was being written"
                    );
                }
                Ok(wizard_view_of(wizard))
            })
        }
        Err(conflict @ StoreError::Conflict { .. }) => {
            tracing::info!(session = %session_id, error = %conflict, "booking conflict");
            let message = conflict.to_string();
            with_wizard(state, session_id, |wizard| {
                wizard.fail_confirmation(message);
                Ok(())
            })?;
            // gray out the slot that just lost the race
            refresh_busy_times(
                state,
                session_id,
                LookupKey {
                    staff_id: draft.staff_id,
                    date: draft.date,
                },
            )?;
            Err(conflict.into())
        }
        Err(e) => Err(e.into()),
    }
}
