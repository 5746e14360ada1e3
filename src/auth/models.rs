use regex::Regex;

use crate::auth::Role;
use crate::errors::ServiceError;
use crate::users::NewUser;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterMessage {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub user_type: String,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl RegisterMessage {
    /// only valid after `validate()` accepted the user_type
    pub fn role(&self) -> Option<Role> {
        Role::from_user_type(&self.user_type)
    }

    pub fn into_new_user(self, role: Role) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            password: self.password,
            phone_number: self.phone_number,
            gender: self.gender,
            address: self.address,
            role_id: role.id(),
        }
    }
}

impl crate::validator::Validate<RegisterMessage> for RegisterMessage {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            bad_request!("name is required");
        }

        if self.name.trim().len() > 100 {
            bad_request!("name is too long, max 100 characters");
        }

        let email_pattern: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

        if !email_pattern.is_match(&self.email) {
            bad_request!("a valid email address is required");
        }

        if self.password.len() < 8 {
            bad_request!("your password should be at least 8 characters long");
        }

        let phone_pattern: Regex = Regex::new(r"^\+?[0-9][0-9 \-]{6,18}$").unwrap();

        if !phone_pattern.is_match(&self.phone_number) {
            bad_request!("a valid phone number is required");
        }

        if Role::from_user_type(&self.user_type).is_none() {
            bad_request!("invalid user type, must be player or venue_owner");
        }

        Ok(())
    }
}

impl crate::validator::Validate<Credentials> for Credentials {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            bad_request!("email and password are required");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    fn message() -> RegisterMessage {
        RegisterMessage {
            name: String::from("Alice Apte"),
            email: String::from("alice@example.com"),
            password: String::from("hunter2boogaloo"),
            phone_number: String::from("9876543210"),
            gender: None,
            address: Some(String::from("Kothrud, Pune")),
            user_type: String::from("player"),
        }
    }

    #[test]
    fn valid_registration() {
        assert!(Validator::new(message()).validate().is_ok());
    }

    #[test]
    fn admin_registration_is_rejected() {
        let mut message = message();
        message.user_type = String::from("admin");

        assert!(Validator::new(message).validate().is_err());
    }

    #[test]
    fn invalid_email() {
        let mut message = message();
        message.email = String::from("not-an-email");

        assert!(Validator::new(message).validate().is_err());
    }

    #[test]
    fn short_password() {
        let mut message = message();
        message.password = String::from("short");

        assert!(Validator::new(message).validate().is_err());
    }

    #[test]
    fn invalid_phone_number() {
        let mut message = message();
        message.phone_number = String::from("call me maybe");

        assert!(Validator::new(message).validate().is_err());
    }

    #[test]
    fn register_message_maps_to_role() {
        let player = message();
        assert_eq!(player.role(), Some(Role::Player));

        let mut owner = message();
        owner.user_type = String::from("venue_owner");
        assert_eq!(owner.role(), Some(Role::VenueOwner));
    }
}
