//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by the people store.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.
//! - Exactly one `db_open` outcome event (`ok` or `error`) is logged per call.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::config::StoreConfig;
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const MEMORY_TARGETS: &[&str] = &[":memory:", "sqlite::memory:"];
const SQLITE_SCHEME: &str = "sqlite://";

/// Storage target resolved from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    /// Private in-memory database, dropped with the connection.
    Memory,
    /// Database file on disk, created when missing.
    File(PathBuf),
}

impl ConnectTarget {
    /// Parses `:memory:`, `sqlite::memory:`, `sqlite://<path>` or a bare path.
    pub fn parse(connection_string: &str) -> DbResult<Self> {
        let trimmed = connection_string.trim();
        if MEMORY_TARGETS.contains(&trimmed) {
            return Ok(Self::Memory);
        }

        let path = trimmed.strip_prefix(SQLITE_SCHEME).unwrap_or(trimmed);
        if path.is_empty() {
            return Err(DbError::InvalidConnectionString(
                connection_string.to_string(),
            ));
        }
        Ok(Self::File(PathBuf::from(path)))
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

/// Opens the store named by `config` and applies all pending migrations.
///
/// # Side effects
/// - Emits an error diagnostic when the connection cannot be established.
/// - Emits a ready diagnostic once the connection is usable.
pub fn connect(config: &StoreConfig) -> DbResult<Connection> {
    let target = match ConnectTarget::parse(config.connection_string()) {
        Ok(target) => target,
        Err(err) => {
            error!(
                "event=db_open module=db status=error error_code=invalid_connection_string error={}",
                err
            );
            return Err(err);
        }
    };
    open_target(&target)
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_target(&ConnectTarget::File(path.as_ref().to_path_buf()))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_target(&ConnectTarget::Memory)
}

fn open_target(target: &ConnectTarget) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = target.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let opened = match target {
        ConnectTarget::Memory => Connection::open_in_memory(),
        ConnectTarget::File(path) => Connection::open(path),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
