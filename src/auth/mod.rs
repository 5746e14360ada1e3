pub mod claims;
pub mod models;
pub mod routes;

pub use claims::{Claims, Role};
