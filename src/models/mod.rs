pub mod appointment;
pub mod catalog;
pub mod identity;
pub mod selection;
pub mod session;
pub mod wizard;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use catalog::{Catalog, ProductItem, ServiceItem, StaffMember};
pub use identity::UserIdentity;
pub use selection::{SelectedProduct, Selection};
pub use session::BookingSession;
pub use wizard::{LookupKey, Step, Wizard, WizardError};
