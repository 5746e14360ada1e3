//! Table-level permission flags per role.
//!
//! The role is always taken from the verified token claims, never from
//! caller-supplied headers or query parameters.

use diesel::prelude::*;
use serde_json::json;

use crate::audit;
use crate::auth::Claims;
use crate::db;
use crate::errors::ServiceError;
use crate::schema::user_permissions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Select,
    Insert,
    Update,
    Delete,
}

impl Action {
    /// accepts the aliases the api has historically used
    pub fn parse(action: &str) -> Option<Action> {
        match action.to_lowercase().as_str() {
            "select" | "read" => Some(Action::Select),
            "insert" | "create" => Some(Action::Insert),
            "update" | "edit" => Some(Action::Update),
            "delete" | "remove" => Some(Action::Delete),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Select => "select",
            Action::Insert => "insert",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Serialize, Queryable)]
pub struct Permission {
    pub role_id: i32,
    pub table_name: String,
    pub can_select: bool,
    pub can_insert: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl Permission {
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Select => self.can_select,
            Action::Insert => self.can_insert,
            Action::Update => self.can_update,
            Action::Delete => self.can_delete,
        }
    }

    pub fn find(
        role_id: i32,
        table_name: &str,
        conn: &db::Conn,
    ) -> Result<Option<Permission>, ServiceError> {
        let permission = user_permissions::table
            .filter(user_permissions::role_id.eq(role_id))
            .filter(user_permissions::table_name.eq(table_name))
            .first::<Permission>(conn)
            .optional()?;

        Ok(permission)
    }

    pub fn find_for_role(role_id: i32, conn: &db::Conn) -> Result<Vec<Permission>, ServiceError> {
        let permissions = user_permissions::table
            .filter(user_permissions::role_id.eq(role_id))
            .order(user_permissions::table_name)
            .load::<Permission>(conn)?;

        Ok(permissions)
    }
}

/// whether the caller may perform `action` on `table_name`, admins always may
pub fn allowed(
    claims: &Claims,
    table_name: &str,
    action: Action,
    conn: &db::Conn,
) -> Result<bool, ServiceError> {
    if claims.is_admin() {
        return Ok(true);
    }

    let allowed = Permission::find(claims.role_id, table_name, conn)?
        .map(|permission| permission.allows(action))
        .unwrap_or(false);

    Ok(allowed)
}

/// like [`allowed`], but denials become a 403 and land in the audit trail
pub fn check(
    claims: &Claims,
    table_name: &str,
    action: Action,
    conn: &db::Conn,
) -> Result<(), ServiceError> {
    if allowed(claims, table_name, action, conn)? {
        return Ok(());
    }

    audit::log(
        Some(claims.user_id()),
        "UNAUTHORIZED_ATTEMPT",
        table_name,
        None,
        json!({ "action": action.name(), "role_id": claims.role_id }),
        conn,
    );

    Err(ServiceError::Forbidden(format!(
        "no permission to {} on {}",
        action.name(),
        table_name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission() -> Permission {
        Permission {
            role_id: 1,
            table_name: String::from("bookings"),
            can_select: true,
            can_insert: true,
            can_update: false,
            can_delete: false,
        }
    }

    #[test]
    fn action_aliases() {
        assert_eq!(Action::parse("READ"), Some(Action::Select));
        assert_eq!(Action::parse("create"), Some(Action::Insert));
        assert_eq!(Action::parse("edit"), Some(Action::Update));
        assert_eq!(Action::parse("remove"), Some(Action::Delete));
        assert_eq!(Action::parse("drop"), None);
    }

    #[test]
    fn permission_flags() {
        let permission = permission();

        assert!(permission.allows(Action::Select));
        assert!(permission.allows(Action::Insert));
        assert!(!permission.allows(Action::Update));
        assert!(!permission.allows(Action::Delete));
    }
}
