use rusqlite::ffi;
use thiserror::Error;

pub type DbResult<T> = std::result::Result<T, DbError>;

/// Store failures, with SQLite constraint violations pulled out so callers can
/// tell a lost uniqueness race from a dangling reference.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("unique constraint violated")]
    Duplicate,

    #[error("referenced row does not exist")]
    MissingReference,

    #[error("database lock poisoned: {0}")]
    Poisoned(String),

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref e, _) = err {
            match e.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return DbError::Duplicate;
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return DbError::MissingReference,
                _ => {}
            }
        }
        DbError::Sqlite(err)
    }
}
