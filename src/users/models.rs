use argon2::Config;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rand::Rng;

use crate::db;
use crate::errors::ServiceError;
use crate::schema::users;

#[derive(Serialize, Queryable, Identifiable, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub phone_number: String,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub role_id: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// the public shape of a user, safe to embed in other responses
#[derive(Serialize, Queryable, Debug)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role_id: i32,
}

#[derive(Deserialize, Insertable, Debug)]
#[table_name = "users"]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub role_id: i32,
}

#[derive(Deserialize, AsChangeset, Debug)]
#[table_name = "users"]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Filter {
    /// filter users by %name%
    pub name: Option<String>,
    pub role_id: Option<i32>,
}

impl User {
    pub fn find_all(filter: Filter, conn: &db::Conn) -> Result<Vec<UserResponse>, ServiceError> {
        let mut query = users::table
            .select((
                users::id,
                users::name,
                users::email,
                users::phone_number,
                users::role_id,
            ))
            .order(users::name)
            .into_boxed();

        if let Some(name) = filter.name {
            query = query.filter(users::name.ilike(format!("%{}%", name)));
        }

        if let Some(role_id) = filter.role_id {
            query = query.filter(users::role_id.eq(role_id));
        }

        let users = query.load::<UserResponse>(conn)?;

        Ok(users)
    }

    pub fn find(id: i64, conn: &db::Conn) -> Result<Self, ServiceError> {
        let user = users::table.filter(users::id.eq(id)).first(conn)?;

        Ok(user)
    }

    pub fn find_by_email(email: &str, conn: &db::Conn) -> Result<Self, ServiceError> {
        let user = users::table.filter(users::email.eq(email)).first(conn)?;

        Ok(user)
    }

    pub fn email_taken(email: &str, conn: &db::Conn) -> Result<bool, ServiceError> {
        let existing = users::table
            .filter(users::email.eq(email))
            .select(users::id)
            .first::<i64>(conn)
            .optional()?;

        Ok(existing.is_some())
    }

    pub fn create(mut user: NewUser, conn: &db::Conn) -> Result<Self, ServiceError> {
        user.hash_password()?;

        let user: User = diesel::insert_into(users::table)
            .values(&user)
            .get_result(conn)?;

        Ok(user)
    }

    pub fn update_profile(
        id: i64,
        update: ProfileUpdate,
        conn: &db::Conn,
    ) -> Result<Self, ServiceError> {
        let user = diesel::update(users::table.filter(users::id.eq(id)))
            .set(&update)
            .get_result(conn)?;

        Ok(user)
    }

    pub fn delete(id: i64, conn: &db::Conn) -> Result<(), ServiceError> {
        diesel::delete(users::table.filter(users::id.eq(id))).execute(conn)?;

        Ok(())
    }

    pub fn count(conn: &db::Conn) -> Result<i64, ServiceError> {
        let count = users::table.count().get_result(conn)?;

        Ok(count)
    }

    pub fn verify_password(&self, password: &[u8]) -> Result<(), ServiceError> {
        let is_match = argon2::verify_encoded(&self.password, password)?;

        if !is_match {
            // same message as an unknown email, prevents user enumeration
            return Err(ServiceError::Unauthorized(
                "invalid email or password".to_string(),
            ));
        }

        Ok(())
    }

    pub fn response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            role_id: self.role_id,
        }
    }
}

impl NewUser {
    fn hash_password(&mut self) -> Result<(), ServiceError> {
        let salt: [u8; 32] = rand::thread_rng().gen();
        let config = Config::default();

        self.password = argon2::hash_encoded(self.password.as_bytes(), &salt, &config)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_password(password: &str) -> User {
        let mut user = NewUser {
            name: String::from("alice"),
            email: String::from("alice@example.com"),
            password: password.to_string(),
            phone_number: String::from("9876543210"),
            gender: None,
            address: None,
            role_id: 1,
        };
        user.hash_password().unwrap();

        User {
            id: 1,
            name: user.name,
            email: user.email,
            password: user.password,
            phone_number: user.phone_number,
            gender: None,
            address: None,
            role_id: 1,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    /// the credential hash should never be exposed through the api
    fn password_should_not_leak() {
        let user = user_with_password("hunter2boogaloo");

        let serialized = serde_json::to_string(&user).unwrap();

        assert_eq!(serialized.contains("hunter2boogaloo"), false);
        assert_eq!(serialized.contains("argon2"), false);
    }

    #[test]
    fn incorrect_password() {
        let user = user_with_password("hunter2boogaloo");

        assert!(user.verify_password(b"hunter2boogaloo").is_ok());
        assert!(user.verify_password(b"not-the-password").is_err());
    }

    #[test]
    /// a wrong password reads exactly like an unknown email
    fn wrong_password_error_is_generic() {
        let user = user_with_password("hunter2boogaloo");

        match user.verify_password(b"wrong").unwrap_err() {
            ServiceError::Unauthorized(message) => {
                assert_eq!(message, "invalid email or password")
            }
            other => panic!("expected unauthorized, got {:?}", other),
        }
    }
}
