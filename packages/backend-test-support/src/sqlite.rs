//! Throwaway SQLite databases backed by a temp directory.

use std::path::{Path, PathBuf};

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tempfile::TempDir;

/// `sqlite://` URL that creates the file when missing.
pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

/// A file-backed SQLite database that lives as long as the value.
///
/// The pool holds a single connection so statements observe each other
/// without transactions.
pub struct TempSqlite {
    _dir: TempDir,
    path: PathBuf,
    conn: DatabaseConnection,
}

impl TempSqlite {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("test.db");

        let mut opt = ConnectOptions::new(sqlite_url(&path));
        opt.min_connections(1)
            .max_connections(1)
            .sqlx_logging(false);
        let conn = Database::connect(opt)
            .await
            .expect("connect to temp sqlite database");

        Self {
            _dir: dir,
            path,
            conn,
        }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
