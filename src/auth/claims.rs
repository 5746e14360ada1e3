use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use futures::future::{ready, Ready};

use crate::config::Config;
use crate::errors::ServiceError;
use crate::users::User;

/// access tokens are valid for a single day
const TOKEN_TTL_HOURS: i64 = 24;

/// coarse permission class of a user, mirrors the `roles` table seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player,
    VenueOwner,
    Admin,
}

impl Role {
    pub fn from_id(id: i32) -> Option<Role> {
        match id {
            1 => Some(Role::Player),
            2 => Some(Role::VenueOwner),
            3 => Some(Role::Admin),
            _ => None,
        }
    }

    /// the `user_type` strings accepted at registration,
    /// admins can't be created through the public api
    pub fn from_user_type(user_type: &str) -> Option<Role> {
        match user_type {
            "player" => Some(Role::Player),
            "venue_owner" => Some(Role::VenueOwner),
            _ => None,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Role::Player => 1,
            Role::VenueOwner => 2,
            Role::Admin => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Player => "Player",
            Role::VenueOwner => "VenueOwner",
            Role::Admin => "Admin",
        }
    }
}

/// the verified token payload, handlers receive this as an extractor argument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: i64,
    pub email: String,
    pub role_id: i32,
    pub role_name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User) -> Claims {
        let now = Utc::now();
        let role_name = Role::from_id(user.role_id)
            .map(Role::name)
            .unwrap_or("Unknown")
            .to_string();

        Claims {
            sub: user.id,
            email: user.email.clone(),
            role_id: user.role_id,
            role_name,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.sub
    }

    pub fn role(&self) -> Result<Role, ServiceError> {
        Role::from_id(self.role_id).ok_or_else(|| {
            error!("token carries unknown role id {}", self.role_id);
            ServiceError::Forbidden("insufficient permissions".to_string())
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role_id == Role::Admin.id()
    }

    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ServiceError> {
        let role = self.role()?;

        if !allowed.contains(&role) {
            return Err(ServiceError::Forbidden(
                "insufficient permissions".to_string(),
            ));
        }

        Ok(())
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        self.require_role(&[Role::Admin])
    }

    pub fn sign(&self) -> Result<String, ServiceError> {
        self.sign_with(Config::jwt_secret())
    }

    pub fn verify(token: &str) -> Result<Claims, ServiceError> {
        Claims::verify_with(token, Config::jwt_secret())
    }

    fn sign_with(&self, secret: &[u8]) -> Result<String, ServiceError> {
        let token = encode(&Header::default(), self, &EncodingKey::from_secret(secret))
            .map_err(|error| {
                error!("unable to sign token: {}", error);
                ServiceError::InternalServerError
            })?;

        Ok(token)
    }

    fn verify_with(token: &str, secret: &[u8]) -> Result<Claims, ServiceError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret),
            &Validation::default(),
        )?;

        Ok(data.claims)
    }
}

impl FromRequest for Claims {
    type Error = ServiceError;
    type Future = Ready<Result<Claims, ServiceError>>;
    type Config = ();

    fn from_request(request: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(claims_from_request(request))
    }
}

fn claims_from_request(request: &HttpRequest) -> Result<Claims, ServiceError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ServiceError::Unauthorized("access token required".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ServiceError::Unauthorized("access token required".to_string()))?;

    Claims::verify(token)
}

/// claims for a made-up user, for authorization checks in unit tests
#[cfg(test)]
pub fn test_claims(user_id: i64, role: Role) -> Claims {
    let now = Utc::now();

    Claims {
        sub: user_id,
        email: format!("user{}@example.com", user_id),
        role_id: role.id(),
        role_name: role.name().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"an-unguessable-test-secret-of-32-bytes!";

    fn claims() -> Claims {
        let now = Utc::now();
        Claims {
            sub: 42,
            email: String::from("alice@example.com"),
            role_id: Role::Player.id(),
            role_name: Role::Player.name().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let claims = claims();
        let token = claims.sign_with(SECRET).unwrap();

        let verified = Claims::verify_with(&token, SECRET).unwrap();
        assert_eq!(verified.sub, 42);
        assert_eq!(verified.email, "alice@example.com");
        assert_eq!(verified.role_id, Role::Player.id());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let mut claims = claims();
        claims.iat = (Utc::now() - Duration::hours(48)).timestamp();
        claims.exp = (Utc::now() - Duration::hours(24)).timestamp();

        let token = claims.sign_with(SECRET).unwrap();

        assert!(Claims::verify_with(&token, SECRET).is_err());
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let token = claims().sign_with(SECRET).unwrap();

        assert!(Claims::verify_with(&token, b"a-different-secret-also-32-bytes!!!").is_err());
    }

    #[test]
    fn role_gates() {
        let mut claims = claims();
        assert!(claims.require_role(&[Role::Player, Role::Admin]).is_ok());
        assert!(claims.require_admin().is_err());

        claims.role_id = Role::Admin.id();
        assert!(claims.require_admin().is_ok());
        assert!(claims.is_admin());
    }

    #[test]
    fn unknown_role_ids_are_refused() {
        let mut claims = claims();
        claims.role_id = 9;

        assert!(claims.role().is_err());
        assert!(claims.require_role(&[Role::Player]).is_err());
    }

    #[test]
    fn admin_registration_is_not_a_user_type() {
        assert_eq!(Role::from_user_type("player"), Some(Role::Player));
        assert_eq!(Role::from_user_type("venue_owner"), Some(Role::VenueOwner));
        assert_eq!(Role::from_user_type("admin"), None);
    }
}
