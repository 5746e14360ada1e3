pub mod models;
pub mod routes;

pub use models::{Filter, NewUser, ProfileUpdate, User, UserResponse};
