//! Moderation and posting client for Forumactif-style forums.
//!
//! The platform has no JSON API: every action is an HTML form submission
//! answered with a themed HTML page. This crate drives those forms over a
//! cookie-carrying HTTP session and runs every response through a heuristic
//! bridge that turns the page into a structured verdict (ok/failure, the
//! action performed, extracted ids and links).

pub mod bridge;
pub mod client;
pub mod constants;
pub mod context;
pub mod error;
pub mod moderation;
pub mod resources;
pub mod stats;
pub mod transport;

pub use bridge::{ActionKind, BridgeResult, Entity, Links};
pub use client::Client;
pub use context::{ContextCache, PageContext, PageType};
pub use error::{Error, Result};
pub use resources::{
    BanOptions, EditPost, NewTopic, PrivateMessage, Reply, SplitOptions, TargetIds,
};
pub use transport::{FormField, FormSnapshot, HttpTransport, PageResponse, Transport};
