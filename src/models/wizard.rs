use serde::{Deserialize, Serialize};

use crate::models::appointment::NewAppointment;
use crate::models::catalog::{ProductItem, ServiceItem, StaffMember};
use crate::models::identity::UserIdentity;
use crate::models::selection::Selection;
use crate::services::availability::DAILY_SLOTS;
use crate::services::voucher::Voucher;

/// Where the booking flow currently stands. A closed wizard is not a
/// variant: closing removes the wizard from its session entirely, so no
/// transition can run on a finished flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Items,
    Staff,
    Schedule,
    Confirmed,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Items => "items",
            Step::Staff => "staff",
            Step::Schedule => "schedule",
            Step::Confirmed => "confirmed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("action not available at the current step")]
    WrongStep,

    #[error("select at least one service or product first")]
    EmptySelection,

    #[error("login required to confirm a booking")]
    AuthenticationRequired,

    #[error("staff, date and time must all be chosen before confirming")]
    ScheduleIncomplete,

    #[error("unknown time slot: {0}")]
    UnknownSlot(String),
}

/// Identifies which `(staff, date)` pair a busy-times lookup was issued
/// for. A lookup result is applied only while the wizard still shows the
/// same pair; late results for superseded pairs are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupKey {
    pub staff_id: String,
    pub date: String,
}

/// The step-gated booking flow: items, then barber, then date and time,
/// then a store write. Transitions are methods that check the current
/// step; anything else is rejected without touching state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wizard {
    pub step: Step,
    pub selection: Selection,
    pub staff: Option<StaffMember>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub busy_times: Vec<String>,
    pub confirmation_error: Option<String>,
    pub voucher: Option<Voucher>,
}

impl Wizard {
    /// Open at the items step, pre-seeded with the outer cart. Even a
    /// non-empty seed starts at items so the customer can still adjust.
    pub fn open(seed: Selection) -> Self {
        Wizard {
            step: Step::Items,
            selection: seed,
            staff: None,
            date: None,
            time: None,
            busy_times: Vec::new(),
            confirmation_error: None,
            voucher: None,
        }
    }

    fn require_step(&self, step: Step) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep)
        }
    }

    // ── Items step ──

    pub fn toggle_service(&mut self, service: &ServiceItem) -> Result<(), WizardError> {
        self.require_step(Step::Items)?;
        self.selection.toggle_service(service);
        Ok(())
    }

    pub fn update_product_qty(
        &mut self,
        product: &ProductItem,
        delta: i64,
    ) -> Result<(), WizardError> {
        self.require_step(Step::Items)?;
        self.selection.update_product_qty(product, delta);
        Ok(())
    }

    pub fn continue_to_staff(&mut self) -> Result<(), WizardError> {
        self.require_step(Step::Items)?;
        if self.selection.is_empty() {
            return Err(WizardError::EmptySelection);
        }
        self.step = Step::Staff;
        Ok(())
    }

    // ── Staff step ──

    /// Choosing a barber also advances to the schedule step. When a date
    /// survives from an earlier visit the caller gets a lookup key for the
    /// new pair right away.
    pub fn choose_staff(
        &mut self,
        staff: &StaffMember,
    ) -> Result<Option<LookupKey>, WizardError> {
        self.require_step(Step::Staff)?;
        self.staff = Some(staff.clone());
        self.step = Step::Schedule;
        Ok(self.lookup_key())
    }

    // ── Schedule step ──

    /// A new date always invalidates the chosen time: a slot picked for one
    /// day means nothing on another. The stale busy board is dropped too.
    pub fn pick_date(&mut self, date: String) -> Result<LookupKey, WizardError> {
        self.require_step(Step::Schedule)?;
        self.date = Some(date);
        self.time = None;
        self.busy_times.clear();
        // staff is always set once the schedule step is reachable
        self.lookup_key().ok_or(WizardError::WrongStep)
    }

    pub fn pick_time(&mut self, time: &str) -> Result<(), WizardError> {
        self.require_step(Step::Schedule)?;
        if !DAILY_SLOTS.contains(&time) {
            return Err(WizardError::UnknownSlot(time.to_string()));
        }
        self.time = Some(time.to_string());
        Ok(())
    }

    /// One step back: schedule to staff, staff to items. Chosen staff,
    /// date and time survive the detour.
    pub fn back(&mut self) -> Result<(), WizardError> {
        match self.step {
            Step::Schedule => {
                self.step = Step::Staff;
                Ok(())
            }
            Step::Staff => {
                self.step = Step::Items;
                Ok(())
            }
            _ => Err(WizardError::WrongStep),
        }
    }

    pub fn lookup_key(&self) -> Option<LookupKey> {
        match (&self.staff, &self.date) {
            (Some(staff), Some(date)) => Some(LookupKey {
                staff_id: staff.id.clone(),
                date: date.clone(),
            }),
            _ => None,
        }
    }

    /// Apply a busy-times result only if the wizard still shows the pair
    /// it was fetched for. Returns false when the result was stale.
    pub fn apply_busy_times(&mut self, key: &LookupKey, times: Vec<String>) -> bool {
        if self.lookup_key().as_ref() == Some(key) {
            self.busy_times = times;
            true
        } else {
            false
        }
    }

    /// Validate that everything needed for a store write is in place and
    /// produce the draft. Clears any previous confirmation error; the
    /// store write itself happens outside the wizard.
    pub fn confirmation_request(
        &mut self,
        identity: Option<&UserIdentity>,
    ) -> Result<NewAppointment, WizardError> {
        self.require_step(Step::Schedule)?;
        self.confirmation_error = None;

        let identity = identity.ok_or(WizardError::AuthenticationRequired)?;

        let (staff, date, time) = match (&self.staff, &self.date, &self.time) {
            (Some(staff), Some(date), Some(time)) => (staff, date, time),
            _ => return Err(WizardError::ScheduleIncomplete),
        };

        Ok(NewAppointment {
            client_name: identity.name.clone(),
            client_email: identity.email.clone(),
            staff_id: staff.id.clone(),
            staff_name: staff.name.clone(),
            service_names: self.selection.service_names(),
            product_descriptions: self.selection.product_descriptions(),
            date: date.clone(),
            time: time.clone(),
            total_price: self.selection.total_price(),
        })
    }

    /// Move to the confirmed step, but only if the wizard still shows the
    /// exact slot the store write was issued for.
    pub fn complete(&mut self, draft: &NewAppointment, voucher: Voucher) -> bool {
        let still_current = self.step == Step::Schedule
            && self.staff.as_ref().map(|s| s.id.as_str()) == Some(draft.staff_id.as_str())
            && self.date.as_deref() == Some(draft.date.as_str())
            && self.time.as_deref() == Some(draft.time.as_str());

        if still_current {
            self.step = Step::Confirmed;
            self.voucher = Some(voucher);
        }
        still_current
    }

    /// Record a failed store write. The customer stays on the schedule
    /// step with date and time intact and picks another slot.
    pub fn fail_confirmation(&mut self, message: String) {
        if self.step == Step::Schedule {
            self.confirmation_error = Some(message);
        }
    }
}
