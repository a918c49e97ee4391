use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::AppConfig;
use crate::models::{BookingSession, Catalog};
use crate::services::ai::LlmProvider;
use crate::services::store::AppointmentStore;

pub struct AppState {
    pub store: AppointmentStore,
    pub catalog: Catalog,
    pub sessions: Mutex<HashMap<String, BookingSession>>,
    pub llm: Box<dyn LlmProvider>,
    pub config: AppConfig,
}
