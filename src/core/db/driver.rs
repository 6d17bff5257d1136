/// Driver Registry Module
///
/// Maps connection-string scheme prefixes to driver implementations, in
/// the manner of a data-access driver manager: a URL is matched against a
/// fixed prefix table, the matching driver is activated, and the
/// connection is opened through it. Only the SQLite driver is actually
/// available in this build (rusqlite, bundled); the remaining entries
/// exist so that recognized URLs are activated and logged consistently
/// before the connection attempt fails on its own.
use crate::core::{Result, SeshqlError};
use once_cell::sync::Lazy;
use rusqlite::Connection;
use tracing::debug;

/// Driver implementations known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Mysql,
    Oracle,
    Derby,
    Db2,
    Postgres,
    Sqlite,
    SqlServer,
    Sybase,
}

impl Driver {
    pub fn name(self) -> &'static str {
        match self {
            Driver::Mysql => "mysql",
            Driver::Oracle => "oracle",
            Driver::Derby => "derby",
            Driver::Db2 => "db2",
            Driver::Postgres => "postgresql",
            Driver::Sqlite => "sqlite",
            Driver::SqlServer => "sqlserver",
            Driver::Sybase => "sybase",
        }
    }

    /// Whether this build ships an implementation of the driver.
    pub fn is_available(self) -> bool {
        matches!(self, Driver::Sqlite)
    }
}

/// Scheme prefix table, matched in order against the raw URL.
static REGISTRY: Lazy<Vec<(&'static str, Driver)>> = Lazy::new(|| {
    vec![
        ("jdbc:mysql", Driver::Mysql),
        ("jdbc:oracle", Driver::Oracle),
        ("jdbc:derby", Driver::Derby),
        ("jdbc:db2", Driver::Db2),
        ("jdbc:postgresql", Driver::Postgres),
        ("jdbc:sqlite", Driver::Sqlite),
        ("jdbc:sqlserver", Driver::SqlServer),
        ("jdbc:sybase", Driver::Sybase),
    ]
});

/// Resolves a connection URL to a registered driver.
///
/// Matching is a case-sensitive substring test, first match wins.
/// Unrecognized URLs resolve to `None` and skip driver activation
/// entirely.
pub fn resolve(url: &str) -> Option<Driver> {
    REGISTRY
        .iter()
        .find(|(prefix, _)| url.contains(prefix))
        .map(|&(_, driver)| driver)
}

const SQLITE_URL_PREFIX: &str = "jdbc:sqlite:";

/// Extracts the database path from a SQLite connection URL
/// (`jdbc:sqlite:<path>`, where `<path>` may be `:memory:`).
fn sqlite_path(url: &str) -> Result<&str> {
    match url.split_once(SQLITE_URL_PREFIX) {
        Some((_, path)) if !path.is_empty() => Ok(path),
        _ => Err(SeshqlError::Driver {
            code: None,
            message: format!("malformed sqlite url: {}", url),
        }),
    }
}

/// Activates the driver for `url` (when one is recognized) and opens a
/// connection through it.
///
/// Activation failures are deliberately non-fatal: an unrecognized or
/// unavailable driver is logged and the connection attempt is left to
/// fail naturally, which is the error the caller sees.
pub fn open(url: &str) -> Result<Connection> {
    let driver = resolve(url);
    match driver {
        Some(driver) if driver.is_available() => {
            debug!("activating {} driver for {}", driver.name(), url);
        }
        Some(driver) => {
            debug!(
                "{} driver is not available in this build, url {}",
                driver.name(),
                url
            );
        }
        None => {
            debug!("no registered driver matches {}, skipping activation", url);
        }
    }

    if driver != Some(Driver::Sqlite) {
        return Err(SeshqlError::Driver {
            code: None,
            message: format!("no suitable driver found for {}", url),
        });
    }

    let conn = Connection::open(sqlite_path(url)?)?;
    // Extended result codes give driver errors a status code.
    conn.execute_batch("PRAGMA extended_result_codes = ON")?;
    Ok(conn)
}
