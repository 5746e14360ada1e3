use diesel::prelude::*;

use crate::db;
use crate::schema::audit_log;

#[derive(Insertable)]
#[table_name = "audit_log"]
struct Entry<'a> {
    user_id: Option<i64>,
    action: &'a str,
    table_name: &'a str,
    record_id: Option<i64>,
    details: Option<String>,
}

/// Append an entry to the audit trail.
///
/// Best-effort: a failed write is logged and swallowed, it never fails
/// or rolls back the operation that is being audited.
pub fn log(
    user_id: Option<i64>,
    action: &str,
    table_name: &str,
    record_id: Option<i64>,
    details: serde_json::Value,
    conn: &db::Conn,
) {
    let entry = Entry {
        user_id,
        action,
        table_name,
        record_id,
        details: Some(details.to_string()),
    };

    if let Err(error) = diesel::insert_into(audit_log::table)
        .values(&entry)
        .execute(conn)
    {
        warn!(
            "audit log write failed for {} on {}: {}",
            action, table_name, error
        );
    }
}
