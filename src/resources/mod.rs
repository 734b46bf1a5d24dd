//! Per-entity resource wrappers.
//!
//! Each wrapper holds a validated set of target ids plus a handle to the
//! transport and context cache, translates a high-level intent into the
//! platform's form requests, and passes every response through the bridge.
//! Wrappers are cheap, created per call site and discarded after use.

mod chat;
mod forum;
mod post;
mod topic;
mod user;

pub use chat::ChatResource;
pub use forum::{ForumResource, NewTopic};
pub use post::{EditPost, PostResource, SplitOptions};
pub use topic::{Reply, TopicResource};
pub use user::{BanOptions, PrivateMessage, UserResource};

use std::sync::Arc;

use crate::bridge::{self, BridgeResult};
use crate::context::ContextCache;
use crate::error::{Error, Result};
use crate::transport::{FormField, Transport};

/// Conversion of caller input into a clean target id list.
///
/// Accepts a single id or a collection; entries are deduplicated, validated
/// as positive, and invalid entries are silently dropped (string inputs that
/// do not parse simply contribute nothing).
pub trait TargetIds {
    fn into_ids(self) -> Vec<u32>;
}

fn sanitize<I: IntoIterator<Item = Option<u32>>>(input: I) -> Vec<u32> {
    let mut seen = Vec::new();
    for id in input.into_iter().flatten() {
        if id > 0 && !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

impl TargetIds for u32 {
    fn into_ids(self) -> Vec<u32> {
        sanitize([Some(self)])
    }
}

impl TargetIds for i64 {
    fn into_ids(self) -> Vec<u32> {
        sanitize([u32::try_from(self).ok()])
    }
}

impl TargetIds for Vec<u32> {
    fn into_ids(self) -> Vec<u32> {
        sanitize(self.into_iter().map(Some))
    }
}

impl TargetIds for &[u32] {
    fn into_ids(self) -> Vec<u32> {
        sanitize(self.iter().map(|&id| Some(id)))
    }
}

impl<const N: usize> TargetIds for [u32; N] {
    fn into_ids(self) -> Vec<u32> {
        sanitize(self.into_iter().map(Some))
    }
}

impl TargetIds for &str {
    fn into_ids(self) -> Vec<u32> {
        sanitize([self.trim().parse().ok()])
    }
}

impl TargetIds for Vec<&str> {
    fn into_ids(self) -> Vec<u32> {
        sanitize(self.into_iter().map(|s| s.trim().parse().ok()))
    }
}

/// Transport + context handle shared by every wrapper.
#[derive(Clone)]
pub(crate) struct Shared {
    pub transport: Arc<dyn Transport>,
    pub context: Arc<ContextCache>,
}

impl Shared {
    /// Moderation token from the context page, or a fast failure.
    pub async fn tid(&self) -> Result<String> {
        self.context
            .get(self.transport.as_ref())
            .await?
            .tid
            .ok_or(Error::MissingToken)
    }

    pub async fn round_trip_get(&self, url: &str) -> Result<BridgeResult> {
        let resp = self.transport.get(url).await?;
        Ok(bridge::parse(&resp))
    }

    pub async fn round_trip_post(&self, url: &str, fields: &[FormField]) -> Result<BridgeResult> {
        let resp = self.transport.post(url, fields).await?;
        Ok(bridge::parse(&resp))
    }
}

/// Reject an operation that has no valid targets left after sanitizing.
pub(crate) fn ensure_targets(ids: &[u32], what: &str) -> Result<()> {
    if ids.is_empty() {
        return Err(Error::Validation(format!("{what}: no valid target ids")));
    }
    Ok(())
}

/// Reject an empty required text field.
pub(crate) fn ensure_filled(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{what} is required")));
    }
    Ok(())
}
