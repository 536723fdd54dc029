pub mod booking;
pub mod booking_store;
