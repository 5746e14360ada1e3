pub mod models;
pub mod routes;

pub use models::{Booking, NewBooking, Status, Timeslot};
