//! Shared constants used across the crate.

/// User agent string used for all HTTP requests.
///
/// A realistic browser user agent: the platform serves the same endpoints to
/// browsers only, and some themes vary their markup for unknown agents.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Well-known inbox path on the platform, reported back after a private
/// message is sent.
pub const INBOX_PATH: &str = "/privmsg?folder=inbox";
