use crate::errors::ServiceError;
use serde::de::DeserializeOwned;

/// Wraps a request body so handlers only get at it after the type's
/// own validation rules accepted it.
#[derive(Deserialize)]
pub struct Validator<T>(T);

pub trait Validate<T> {
    fn validate(&self) -> Result<(), ServiceError>;
}

impl<T> Validator<T> {
    #[allow(dead_code)]
    pub fn new(i: T) -> Validator<T> {
        Validator::<T>(i)
    }
}

impl<T> Validator<T>
where
    T: Validate<T>,
    T: DeserializeOwned,
{
    pub fn validate(self) -> Result<T, ServiceError> {
        self.0.validate()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::RegisterMessage;

    fn registration(email: &str) -> Validator<RegisterMessage> {
        Validator::new(RegisterMessage {
            name: String::from("Alice Apte"),
            email: email.to_string(),
            password: String::from("hunter2boogaloo"),
            phone_number: String::from("9876543210"),
            gender: None,
            address: Some(String::from("Kothrud, Pune")),
            user_type: String::from("player"),
        })
    }

    #[test]
    fn valid_bodies_are_handed_back() {
        let message = registration("alice@example.com").validate().unwrap();

        assert_eq!(message.email, "alice@example.com");
    }

    #[test]
    fn invalid_bodies_are_refused() {
        assert!(registration("not-an-email").validate().is_err());
    }
}
