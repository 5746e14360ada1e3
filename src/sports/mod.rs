pub mod models;
pub mod routes;

pub use models::{NewSport, Sport};
