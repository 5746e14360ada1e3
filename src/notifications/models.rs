use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db;
use crate::errors::ServiceError;
use crate::schema::notifications;

#[derive(Debug, Serialize, Queryable, Identifiable)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Insertable)]
#[table_name = "notifications"]
pub struct NewNotification {
    pub user_id: i64,
    pub message: String,
}

impl Notification {
    pub fn find_for_user(
        user_id: i64,
        conn: &db::Conn,
    ) -> Result<Vec<Notification>, ServiceError> {
        let notifications = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .order(notifications::created_at.desc())
            .load(conn)?;

        Ok(notifications)
    }

    pub fn create(
        notification: NewNotification,
        conn: &db::Conn,
    ) -> Result<Notification, ServiceError> {
        let notification = diesel::insert_into(notifications::table)
            .values(&notification)
            .get_result(conn)?;

        Ok(notification)
    }

    /// Best-effort in-app message, a failed insert never fails the
    /// operation that triggered it.
    pub fn push(user_id: i64, message: &str, conn: &db::Conn) {
        let notification = NewNotification {
            user_id,
            message: message.to_string(),
        };

        if let Err(error) = Notification::create(notification, conn) {
            warn!("unable to notify user {}: {}", user_id, error);
        }
    }

    /// marking someone else's notification read reads like a missing one
    pub fn mark_read(id: i64, user_id: i64, conn: &db::Conn) -> Result<Notification, ServiceError> {
        let notification = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id))
                .filter(notifications::user_id.eq(user_id)),
        )
        .set(notifications::is_read.eq(true))
        .get_result(conn)?;

        Ok(notification)
    }

    pub fn mark_all_read(user_id: i64, conn: &db::Conn) -> Result<usize, ServiceError> {
        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(conn)?;

        Ok(updated)
    }
}

impl crate::validator::Validate<NewNotification> for NewNotification {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.message.trim().is_empty() {
            bad_request!("a message is required");
        }

        if self.message.len() > 500 {
            bad_request!("the message is too long, maximum 500 characters");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    #[test]
    fn empty_messages_are_refused() {
        let notification = NewNotification {
            user_id: 1,
            message: String::from("  "),
        };

        assert!(Validator::new(notification).validate().is_err());
    }
}
