use actix_web::{error::ResponseError, HttpResponse};
use derive_more::Display;
use diesel::result::{DatabaseErrorKind, Error as DBError};
use serde_json::json;
use std::convert::From;

#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,

    #[display(fmt = "BadRequest: {}", _0)]
    BadRequest(String),

    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),

    #[display(fmt = "Forbidden: {}", _0)]
    Forbidden(String),

    #[display(fmt = "Unauthorized: {}", _0)]
    Unauthorized(String),

    #[display(fmt = "Not Found")]
    NotFound,
}

impl ServiceError {
    /// stable machine-readable error kind, clients match on this instead of the message
    fn kind(&self) -> &'static str {
        match self {
            ServiceError::InternalServerError => "internal_error",
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::NotFound => "not_found",
        }
    }

    fn message(&self) -> String {
        match self {
            ServiceError::InternalServerError => {
                "Internal Server Error, Please try later".to_string()
            }
            ServiceError::BadRequest(message) => message.clone(),
            ServiceError::Conflict(message) => message.clone(),
            ServiceError::Forbidden(message) => message.clone(),
            ServiceError::Unauthorized(message) => message.clone(),
            ServiceError::NotFound => "Not Found".to_string(),
        }
    }
}

// impl ResponseError trait allows to convert our errors into http responses with appropriate data
impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({ "error": self.kind(), "message": self.message() });

        match self {
            ServiceError::InternalServerError => HttpResponse::InternalServerError().json(body),
            ServiceError::BadRequest(_) => HttpResponse::BadRequest().json(body),
            ServiceError::Conflict(_) => HttpResponse::Conflict().json(body),
            ServiceError::Forbidden(_) => HttpResponse::Forbidden().json(body),
            ServiceError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
            ServiceError::NotFound => HttpResponse::NotFound().json(body),
        }
    }
}

impl From<DBError> for ServiceError {
    fn from(error: DBError) -> ServiceError {
        error!("db error: {}", error);
        match error {
            DBError::NotFound => ServiceError::NotFound,
            DBError::DatabaseError(kind, _info) => {
                // raw constraint details stay out of client responses
                match kind {
                    DatabaseErrorKind::UniqueViolation => {
                        ServiceError::Conflict("a conflicting record already exists".to_string())
                    }
                    DatabaseErrorKind::ForeignKeyViolation => {
                        ServiceError::BadRequest(
                            "a referenced record is missing or still in use".to_string(),
                        )
                    }
                    _ => ServiceError::InternalServerError,
                }
            }
            _ => ServiceError::InternalServerError,
        }
    }
}

impl From<r2d2::Error> for ServiceError {
    fn from(error: r2d2::Error) -> ServiceError {
        error!("r2d2 connection pool error: {}", error);
        ServiceError::InternalServerError
    }
}

impl From<actix_threadpool::BlockingError<ServiceError>> for ServiceError {
    fn from(error: actix_threadpool::BlockingError<ServiceError>) -> ServiceError {
        match error {
            actix_threadpool::BlockingError::Error(error) => error,
            actix_threadpool::BlockingError::Canceled => {
                error!("actix threadpool task was canceled");
                ServiceError::InternalServerError
            }
        }
    }
}

impl From<argon2::Error> for ServiceError {
    fn from(error: argon2::Error) -> ServiceError {
        error!("argon2 error: {}", error);
        ServiceError::InternalServerError
    }
}

impl From<jsonwebtoken::errors::Error> for ServiceError {
    fn from(error: jsonwebtoken::errors::Error) -> ServiceError {
        debug!("token rejected: {}", error);
        ServiceError::Forbidden("invalid or expired token".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_map_to_conflict() {
        let error = DBError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        );

        match ServiceError::from(error) {
            ServiceError::Conflict(message) => {
                // postgres internals must not reach the client
                assert!(!message.contains("duplicate key"));
            }
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn missing_rows_map_to_not_found() {
        assert_eq!(ServiceError::from(DBError::NotFound), ServiceError::NotFound);
    }
}
