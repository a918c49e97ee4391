use chrono::{Duration, NaiveDateTime, Utc};

use crate::models::identity::UserIdentity;
use crate::models::selection::Selection;
use crate::models::wizard::{Step, Wizard};

/// Sessions idle for longer than this are swept.
pub const SESSION_IDLE_HOURS: i64 = 2;

/// One browsing session: the outer catalog-page cart, whoever is logged
/// in, and the booking wizard while one is open. Ephemeral; nothing here
/// survives a restart except what the store has written.
#[derive(Debug, Clone)]
pub struct BookingSession {
    pub id: String,
    pub selection: Selection,
    pub identity: Option<UserIdentity>,
    pub wizard: Option<Wizard>,
    pub last_activity: NaiveDateTime,
}

impl BookingSession {
    pub fn new() -> Self {
        BookingSession {
            id: uuid::Uuid::new_v4().to_string(),
            selection: Selection::default(),
            identity: None,
            wizard: None,
            last_activity: Utc::now().naive_utc(),
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now().naive_utc();
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now - self.last_activity > Duration::hours(SESSION_IDLE_HOURS)
    }

    /// Drop the wizard. A flow closed after confirmation consumed the
    /// outer cart, so that is cleared too; a cancel-close keeps it.
    pub fn close_wizard(&mut self) {
        if let Some(wizard) = self.wizard.take() {
            if wizard.step == Step::Confirmed {
                self.selection.clear();
            }
        }
    }
}

impl Default for BookingSession {
    fn default() -> Self {
        Self::new()
    }
}
