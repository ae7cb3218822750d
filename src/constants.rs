// src/constants.rs
//
// Application-wide constants. Texts shown to users keep the wording clients
// already depend on.

/// Set assigned to flashcards created without one.
pub const DEFAULT_SET_NAME: &str = "General";

/// Front text of the placeholder card inserted when a set is created.
/// The set name is appended.
///
/// Used in: `application/set_catalog.rs`
pub const PLACEHOLDER_FRONT_PREFIX: &str = "Welcome to ";

/// Back text of the placeholder card inserted when a set is created.
///
/// Used in: `application/set_catalog.rs`
pub const PLACEHOLDER_BACK: &str =
    "This is your new flashcard set. Edit or delete this card and add your own!";

/// Address the HTTP API binds to when neither config nor flags name one.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Request timeout for the external store, in seconds.
///
/// A hung store would otherwise stall every request, since the fallback to
/// memory only happens once the primary call returns an error.
///
/// Used in: `infrastructure/rest.rs`
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;

/// Connect timeout for the external store, in seconds.
pub const STORE_CONNECT_TIMEOUT_SECS: u64 = 2;

/// How long `serve` waits for in-flight requests after a shutdown signal.
pub const SHUTDOWN_GRACE_SECS: u64 = 30;
