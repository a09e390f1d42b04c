//! Repository contract shared by every entity repository.
//!
//! # Responsibility
//! - Define the create/read/read-all/update/soft-delete shape.
//! - Define the error taxonomy surfaced to callers.
//!
//! # Invariants
//! - Writes run on a caller-supplied handle and never commit or roll back.
//! - Reads acquire and release their own handle inside the call.
//! - Reads never return soft-deleted rows.
//! - A write that matches zero rows is a `Persistence` error, not a no-op.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    /// Input precondition failed; the store was not touched.
    Validation(ValidationError),
    /// A write affected zero rows or produced no generated id.
    Persistence(String),
    /// A stored value could not be decoded into its domain form.
    DataIntegrity(String),
    /// No usable handle could be acquired.
    Connection(DbError),
    /// A statement failed inside the store.
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Persistence(message) => write!(f, "persistence failed: {message}"),
            Self::DataIntegrity(message) => write!(f, "invalid persisted data: {message}"),
            Self::Connection(err) => write!(f, "connection unavailable: {err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Connection(err) | Self::Db(err) => Some(err),
            Self::Persistence(_) | Self::DataIntegrity(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD contract over one soft-deletable entity.
///
/// Write methods take `conn` so callers can group several writes in one
/// transaction (`&Transaction` derefs to `&Connection`).
pub trait Repository {
    type Entity;
    type Id: Copy;

    /// Inserts `entity` and returns the store-generated id.
    fn create(&self, entity: &Self::Entity, conn: &Connection) -> RepoResult<Self::Id>;
    /// Fetches one non-deleted entity.
    fn read(&self, id: Self::Id) -> RepoResult<Option<Self::Entity>>;
    /// Fetches every non-deleted entity ordered by id.
    fn read_all(&self) -> RepoResult<Vec<Self::Entity>>;
    /// Overwrites the mutable fields of a non-deleted entity.
    fn update(&self, entity: &Self::Entity, conn: &Connection) -> RepoResult<()>;
    /// Sets the delete flag.
    ///
    /// Deleting an already-deleted row matches it again and succeeds; only an
    /// unknown id is a `Persistence` error.
    fn soft_delete(&self, id: Self::Id, conn: &Connection) -> RepoResult<()>;
}

/// Resolves the id generated by the insert that just ran on `conn`.
pub(crate) fn inserted_id(conn: &Connection, changed: usize, entity: &str) -> RepoResult<i64> {
    if changed == 0 {
        return Err(RepoError::Persistence(format!(
            "failed to create {entity}: no rows affected"
        )));
    }

    let id = conn.last_insert_rowid();
    if id <= 0 {
        return Err(RepoError::Persistence(format!(
            "failed to create {entity}: no id returned"
        )));
    }
    Ok(id)
}

/// Maps a zero-row write to a `Persistence` error.
pub(crate) fn ensure_changed(
    changed: usize,
    action: &str,
    entity: &str,
    id: i64,
) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::Persistence(format!(
            "{action} failed: {entity} {id} not found or deleted"
        )));
    }
    Ok(())
}
