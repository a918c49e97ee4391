pub mod ai;
pub mod availability;
pub mod booking;
pub mod store;
pub mod voucher;
