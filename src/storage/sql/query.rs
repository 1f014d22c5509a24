//! SQL database abstraction trait and row decoding helpers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{OrderStatus, Role};
use crate::interfaces::{Result, StorageError};

/// Trait for SQL database backends.
///
/// This trait abstracts over different SQL databases (PostgreSQL, SQLite)
/// by providing the pool and row types and query building methods.
pub trait SqlDatabase: Send + Sync + 'static {
    /// The connection pool type for this database.
    type Pool: Clone + Send + Sync;

    /// The row type returned by queries against this database.
    type Row: sqlx::Row;

    /// Build a SQL query string from a sea-query SELECT statement.
    fn build_select(stmt: sea_query::SelectStatement) -> String;

    /// Build a SQL query string from a sea-query INSERT statement.
    fn build_insert(stmt: sea_query::InsertStatement) -> String;

    /// Build a SQL query string from a sea-query UPDATE statement.
    fn build_update(stmt: sea_query::UpdateStatement) -> String;

    /// Build a SQL query string from a sea-query DELETE statement.
    fn build_delete(stmt: sea_query::DeleteStatement) -> String;
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid> {
    Ok(Uuid::parse_str(raw)?)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

pub(crate) fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.parse().map_err(|e: crate::domain::UnknownStatus| StorageError::Corrupt {
        table: "orders",
        detail: e.to_string(),
    })
}

pub(crate) fn parse_role(raw: &str) -> Result<Role> {
    raw.parse().map_err(|e: crate::domain::UnknownRole| StorageError::Corrupt {
        table: "users",
        detail: e.to_string(),
    })
}

/// Map a unique-constraint violation to `Duplicate`, pass anything else through.
pub(crate) fn unique_violation(err: sqlx::Error, entity: &'static str, key: &str) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Duplicate {
            entity,
            key: key.to_string(),
        },
        _ => StorageError::Database(err),
    }
}

/// Escape character for LIKE patterns built with [`escape_like`].
pub(crate) const LIKE_ESCAPE: char = '!';

/// Escape `%`, `_` and the escape character itself so `raw` matches literally
/// inside a LIKE pattern using `ESCAPE '!'`.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_roundtrip() {
        let now = Utc::now();
        let raw = crate::storage::schema::timestamp(now);
        let parsed = parse_timestamp(&raw).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_parse_status_rejects_unknown() {
        assert!(matches!(
            parse_status("brewing"),
            Err(StorageError::Corrupt { table: "orders", .. })
        ));
        assert_eq!(parse_status("ready").unwrap(), OrderStatus::Ready);
    }

    #[test]
    fn test_parse_uuid_rejects_garbage() {
        assert!(matches!(parse_uuid("not-a-uuid"), Err(StorageError::InvalidUuid(_))));
    }

    #[test]
    fn test_escape_like_quotes_wildcards() {
        assert_eq!(escape_like("latte"), "latte");
        assert_eq!(escape_like("50% off"), "50!% off");
        assert_eq!(escape_like("flat_white"), "flat!_white");
        assert_eq!(escape_like("wow!"), "wow!!");
    }
}
