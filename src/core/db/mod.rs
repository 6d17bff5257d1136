/// Database Module
///
/// The database layer is split into three focused submodules:
/// - **Driver Registry** (`driver.rs`): maps connection-string scheme
///   prefixes to driver implementations and opens connections
/// - **Query Results** (`query.rs`): materialized result cursors and
///   value formatting
/// - **Session** (`session.rs`): the stateful façade tying the two
///   together with last-error capture
///
/// All operations use the standardized `SeshqlError` type for consistent
/// error propagation; the session's public surface converts errors to
/// sentinel return values and keeps the error on the side channel.
pub mod driver;
pub mod query;
pub mod session;

pub use driver::*;
pub use query::*;
pub use session::*;
