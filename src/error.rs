use thiserror::Error;

/// Errors surfaced by the client library.
///
/// Semantic failures reported by the forum itself (an action that was sent
/// but refused) are not errors: they come back as a `BridgeResult` with
/// `ok == false`. Only precondition violations and transport-level failures
/// surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input was missing or invalid before any request was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The moderation token could not be located on the context page.
    #[error("moderation token (tid) not found on the current page")]
    MissingToken,

    /// A form required to replay a request was not present in the page.
    #[error("form matching {selector:?} not found at {url}")]
    FormNotFound { url: String, selector: String },

    /// A page that must be readable (form capture, profile lookup) came back
    /// with a non-success status.
    #[error("unexpected HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Network-level failure from the HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The base URL or a joined request URL could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
