pub mod models;
pub mod routes;

pub use models::{Payment, PaymentStatus};
