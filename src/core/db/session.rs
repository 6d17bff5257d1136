/// Session Module
///
/// The stateful façade over a single database connection: literal and
/// parameterized queries and updates, a single-slot prepared-statement
/// cache keyed by template text, and last-error capture. Nothing is ever
/// propagated past the public surface; every operation reports failure
/// through its sentinel return value and leaves a description behind for
/// the error accessor.
use crate::config::Config;
use crate::core::db::driver;
use crate::core::db::query::{format_value, QueryResult};
use crate::core::{Result, SeshqlError};
use rusqlite::{params, CachedStatement, Connection, Statement};
use std::time::Duration;
use tracing::{debug, error};

/// Resources held while connected. The connection doubles as the bare
/// execution path for literal SQL; `active_template` is the text of the
/// cached parameterized statement, empty while none has been prepared.
#[derive(Debug)]
struct Live {
    conn: Connection,
    active_template: String,
}

/// The two observable session states. Query and update calls are only
/// meaningful in `Connected`; everything else fails fast with a
/// not-connected error.
#[derive(Debug)]
enum SessionState {
    Disconnected,
    Connected(Live),
}

/// A stateful database session wrapping one live connection.
///
/// All operations are synchronous and intended for a single caller; the
/// session holds no internal locking. Failures never escape a public
/// method: `connect` reports `false`, queries report `None`, updates
/// report `-1`, and the description of the most recent failure is
/// available from [`DbSession::error_message`] until the next operation
/// resets it.
///
/// # Examples
///
/// ```
/// use seshql::core::db::DbSession;
///
/// let mut session = DbSession::new();
/// if session.connect("jdbc:sqlite::memory:", "user", "secret") {
///     session.update("CREATE TABLE t (x INT)");
///     session.update_with("INSERT INTO t VALUES (?)", Some("1"));
///     let rows = session.query("SELECT x FROM t").unwrap();
///     assert_eq!(rows.row_count, 1);
/// }
/// ```
#[derive(Debug)]
pub struct DbSession {
    state: SessionState,
    last_result: Option<QueryResult>,
    last_error: Option<SeshqlError>,
}

impl DbSession {
    /// Creates a new, disconnected session.
    pub fn new() -> Self {
        DbSession {
            state: SessionState::Disconnected,
            last_result: None,
            last_error: None,
        }
    }

    /// Connects to the database identified by `url`.
    ///
    /// All three arguments must be non-empty; validation failures are
    /// recorded before any driver activity. The driver registry is
    /// consulted for the URL scheme, the connection is opened through
    /// the activated driver, and the statement cache is pinned to a
    /// single slot. A driver or connection failure leaves the session
    /// fully disconnected; either way the error accessor carries the
    /// description.
    ///
    /// Returns `true` only when the session is fully connected.
    pub fn connect(&mut self, url: &str, user: &str, password: &str) -> bool {
        self.connect_with_config(url, user, password, &Config::default())
    }

    /// Connects like [`DbSession::connect`], additionally applying the
    /// configured connection pragmas after opening. A pragma failure is
    /// a connect failure.
    pub fn connect_with_config(
        &mut self,
        url: &str,
        user: &str,
        password: &str,
        config: &Config,
    ) -> bool {
        self.last_error = None;
        match self.try_connect(url, user, password, config) {
            Ok(()) => true,
            Err(err) => {
                error!("connect failed: {}", err);
                // Validation failures happen before any resource is
                // touched; an existing connection survives them. Driver
                // and connection failures leave the session fully
                // disconnected.
                if !matches!(err, SeshqlError::Validation(_)) {
                    self.state = SessionState::Disconnected;
                }
                self.last_error = Some(err);
                false
            }
        }
    }

    fn try_connect(&mut self, url: &str, user: &str, password: &str, config: &Config) -> Result<()> {
        if url.is_empty() {
            return Err(SeshqlError::Validation(
                "url in connect() cannot be empty".to_string(),
            ));
        }
        if user.is_empty() {
            return Err(SeshqlError::Validation(
                "user name in connect() cannot be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(SeshqlError::Validation(
                "password in connect() cannot be empty".to_string(),
            ));
        }

        let conn = driver::open(url)?;
        // The session reuses at most one parameterized statement.
        conn.set_prepared_statement_cache_capacity(1);
        apply_config(&conn, config)?;
        debug!("connected to {}", url);

        // Replacing the state drops any previous connection.
        self.state = SessionState::Connected(Live {
            conn,
            active_template: String::new(),
        });
        Ok(())
    }

    /// Releases all session resources, best-effort.
    ///
    /// Release order is fixed: result cursor, prepared statements,
    /// connection. A failure in any step is ignored so the later steps
    /// still run. The error accessor is left untouched, and calling
    /// this on an already-disconnected session is a no-op.
    pub fn disconnect(&mut self) {
        self.last_result = None;
        if let SessionState::Connected(live) =
            std::mem::replace(&mut self.state, SessionState::Disconnected)
        {
            live.conn.flush_prepared_statement_cache();
            if let Err((_, err)) = live.conn.close() {
                debug!("ignoring connection close failure: {}", err);
            }
        }
    }

    /// Executes literal SQL and returns the materialized result cursor.
    ///
    /// The previous result is overwritten regardless of outcome: on
    /// failure `None` is returned, the stored result is cleared, and the
    /// error accessor carries the description.
    pub fn query(&mut self, sql: &str) -> Option<QueryResult> {
        self.last_error = None;
        self.last_result = None;
        match self.try_query(sql) {
            Ok(result) => {
                self.last_result = Some(result.clone());
                Some(result)
            }
            Err(err) => {
                error!("query failed: {}", err);
                self.last_error = Some(err);
                None
            }
        }
    }

    fn try_query(&mut self, sql: &str) -> Result<QueryResult> {
        validate_sql(sql, "query")?;
        let live = self.live_mut("query")?;
        let mut stmt = live.conn.prepare(sql)?;
        collect_rows(&mut stmt, params![])
    }

    /// Parameterized form of [`DbSession::query`].
    ///
    /// The template supports exactly one placeholder; `param` is bound
    /// to it as a string, or as SQL NULL when absent. Supplying the same
    /// template text as the previous parameterized call reuses the
    /// compiled statement; different text replaces it.
    pub fn query_with(&mut self, sql: &str, param: Option<&str>) -> Option<QueryResult> {
        self.last_error = None;
        self.last_result = None;
        match self.try_query_with(sql, param) {
            Ok(result) => {
                self.last_result = Some(result.clone());
                Some(result)
            }
            Err(err) => {
                error!("query failed: {}", err);
                self.last_error = Some(err);
                None
            }
        }
    }

    fn try_query_with(&mut self, sql: &str, param: Option<&str>) -> Result<QueryResult> {
        validate_sql(sql, "query")?;
        let live = self.live_mut("query")?;
        let mut stmt = prepare_template(live, sql)?;
        collect_rows(&mut stmt, params![param])
    }

    /// Executes a non-cursor-producing statement (CREATE, INSERT,
    /// UPDATE, ...) and returns the affected-row count.
    ///
    /// Returns `-1` on validation failure, missing connection, or
    /// execution failure; `0` is a valid success value.
    pub fn update(&mut self, sql: &str) -> i64 {
        self.last_error = None;
        match self.try_update(sql) {
            Ok(count) => count,
            Err(err) => {
                error!("update failed: {}", err);
                self.last_error = Some(err);
                -1
            }
        }
    }

    fn try_update(&mut self, sql: &str) -> Result<i64> {
        validate_sql(sql, "update")?;
        let live = self.live_mut("update")?;
        let count = live.conn.execute(sql, params![])?;
        Ok(count as i64)
    }

    /// Parameterized form of [`DbSession::update`], sharing the template
    /// cache rule and single-placeholder binding of
    /// [`DbSession::query_with`].
    pub fn update_with(&mut self, sql: &str, param: Option<&str>) -> i64 {
        self.last_error = None;
        match self.try_update_with(sql, param) {
            Ok(count) => count,
            Err(err) => {
                error!("update failed: {}", err);
                self.last_error = Some(err);
                -1
            }
        }
    }

    fn try_update_with(&mut self, sql: &str, param: Option<&str>) -> Result<i64> {
        validate_sql(sql, "update")?;
        let live = self.live_mut("update")?;
        let mut stmt = prepare_template(live, sql)?;
        let count = stmt.execute(params![param])?;
        Ok(count as i64)
    }

    /// Returns the description of the most recent failure, or the empty
    /// string when the most recent operation reported no error.
    /// Idempotent: repeated calls return the same string.
    pub fn error_message(&self) -> String {
        self.last_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Structured accessor for the most recent failure.
    pub fn last_error(&self) -> Option<&SeshqlError> {
        self.last_error.as_ref()
    }

    /// The most recently produced result cursor, if any. Updates leave
    /// it untouched; failed queries clear it.
    pub fn last_result(&self) -> Option<&QueryResult> {
        self.last_result.as_ref()
    }

    /// Checks if there's an active database connection.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected(_))
    }

    /// The template text of the currently cached parameterized
    /// statement, if one has been prepared.
    pub fn active_template(&self) -> Option<&str> {
        match &self.state {
            SessionState::Connected(live) if !live.active_template.is_empty() => {
                Some(&live.active_template)
            }
            _ => None,
        }
    }

    fn live_mut(&mut self, op: &str) -> Result<&mut Live> {
        match &mut self.state {
            SessionState::Connected(live) => Ok(live),
            SessionState::Disconnected => Err(SeshqlError::NotConnected(format!(
                "no connection is established; call connect() before {}()",
                op
            ))),
        }
    }
}

impl Default for DbSession {
    fn default() -> Self {
        DbSession::new()
    }
}

fn validate_sql(sql: &str, op: &str) -> Result<()> {
    if sql.is_empty() {
        return Err(SeshqlError::Validation(format!(
            "sql string in {}() cannot be empty",
            op
        )));
    }
    Ok(())
}

/// Returns the compiled statement for `sql`, recompiling only when the
/// template text differs from the cached one. The statement cache holds
/// a single slot, so a new template evicts the previous statement.
fn prepare_template<'conn>(live: &'conn mut Live, sql: &str) -> Result<CachedStatement<'conn>> {
    if live.active_template != sql {
        // A failed compile must not leave a stale template behind.
        live.active_template.clear();
        debug!("compiling parameterized template: {}", sql);
        let stmt = live.conn.prepare_cached(sql)?;
        live.active_template.push_str(sql);
        return Ok(stmt);
    }
    Ok(live.conn.prepare_cached(sql)?)
}

fn collect_rows<P: rusqlite::Params>(stmt: &mut Statement<'_>, params: P) -> Result<QueryResult> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let column_count = stmt.column_count();

    let rows = stmt
        .query_map(params, |row| {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(format_value(row.get_ref(i)?));
            }
            Ok(values)
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(QueryResult::new(columns, rows))
}

fn apply_config(conn: &Connection, config: &Config) -> Result<()> {
    let sqlite = match &config.sqlite {
        Some(sqlite) => sqlite,
        None => return Ok(()),
    };

    if let Some(ms) = sqlite.busy_timeout_ms {
        conn.busy_timeout(Duration::from_millis(ms))?;
    }
    if let Some(on) = sqlite.foreign_keys {
        let pragma = if on {
            "PRAGMA foreign_keys = ON"
        } else {
            "PRAGMA foreign_keys = OFF"
        };
        conn.execute_batch(pragma)?;
    }
    if let Some(mode) = &sqlite.journal_mode {
        conn.execute_batch(&format!("PRAGMA journal_mode = {}", mode))?;
    }
    Ok(())
}
