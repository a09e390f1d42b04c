//! Connection provider consumed by repository reads.
//!
//! # Responsibility
//! - Turn validated configuration into live SQLite handles on demand.
//!
//! # Invariants
//! - Every `acquire` returns a fresh connection owned by the caller.
//! - Dropping the connection releases it; there is no pooling.

use super::{open_db, DbResult};
use crate::config::DbConfig;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Source of live database handles.
pub trait ConnectionProvider {
    /// Opens a ready-to-use connection.
    fn acquire(&self) -> DbResult<Connection>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn acquire(&self) -> DbResult<Connection> {
        (**self).acquire()
    }
}

/// File-backed SQLite provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConnectionProvider {
    path: PathBuf,
}

impl SqliteConnectionProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Builds a provider for the database named by `config.url`.
    ///
    /// SQLite has no server-side accounts, so `user`/`password` are not used
    /// to open the file.
    pub fn from_config(config: &DbConfig) -> Self {
        Self::new(config.database_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn acquire(&self) -> DbResult<Connection> {
        open_db(&self.path)
    }
}
