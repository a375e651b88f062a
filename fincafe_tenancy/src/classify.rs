//! Tell "tenant database not provisioned" apart from every other database failure
//!
//! Structured error codes from the driver are consulted first. Message matching is
//! the fallback for drivers that report a generic code.

use sea_orm::sqlx::error::DatabaseError;
use sea_orm::sqlx::mysql::MySqlDatabaseError;
use sea_orm::{DbErr, RuntimeErr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Database or one of its tables is absent
    NotProvisioned,
    Other,
}

/// Driver codes meaning the database or a table does not exist
const NOT_PROVISIONED_CODES: [&str; 4] = [
    "3D000", // postgres invalid_catalog_name
    "42P01", // postgres undefined_table
    "42S02", // mysql ER_NO_SUCH_TABLE
    "14",    // sqlite SQLITE_CANTOPEN
];

/// mysql ER_BAD_DB_ERROR, reported under the generic 42000 state
const MYSQL_UNKNOWN_DATABASE: u16 = 1049;

/// Postgres duplicate_database
const DUPLICATE_DATABASE_CODE: &str = "42P04";

pub fn classify_db_error(err: &DbErr) -> FailureClass {
    if let Some(db_err) = database_error(err) {
        if let Some(code) = db_err.code() {
            if NOT_PROVISIONED_CODES.contains(&code.as_ref()) {
                return FailureClass::NotProvisioned;
            }
        }
        if let Some(mysql) = db_err.try_downcast_ref::<MySqlDatabaseError>() {
            if mysql.number() == MYSQL_UNKNOWN_DATABASE {
                return FailureClass::NotProvisioned;
            }
        }
        return classify_message(db_err.message());
    }

    classify_message(&err.to_string())
}

fn classify_message(message: &str) -> FailureClass {
    let message = message.to_lowercase();

    let missing = message.contains("unknown database")
        || message.contains("no such table")
        || message.contains("unable to open database file")
        || (message.contains("does not exist")
            && (message.contains("database \"") || message.contains("relation \"")))
        || (message.contains("doesn't exist") && message.contains("table"));

    if missing {
        FailureClass::NotProvisioned
    } else {
        FailureClass::Other
    }
}

/// Whether a `CREATE DATABASE` failed only because the database is already there
pub(crate) fn is_already_exists(err: &DbErr) -> bool {
    if let Some(db_err) = database_error(err) {
        if db_err.code().as_deref() == Some(DUPLICATE_DATABASE_CODE) {
            return true;
        }
    }

    let message = err.to_string().to_lowercase();
    message.contains("database exists")
        || (message.contains("database") && message.contains("already exists"))
}

fn database_error(err: &DbErr) -> Option<&(dyn DatabaseError + 'static)> {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return None,
    };

    match runtime {
        RuntimeErr::SqlxError(e) => e.as_database_error(),
        _ => None,
    }
}
