//! Top-level client: one transport, one context cache, resource factories.

use std::sync::Arc;

use crate::context::ContextCache;
use crate::error::Result;
use crate::resources::{
    ChatResource, ForumResource, PostResource, Shared, TargetIds, TopicResource, UserResource,
};
use crate::transport::{HttpTransport, Transport};

/// Entry point for talking to one forum.
///
/// Holds the HTTP session (cookies included) and the cached moderation
/// context, and hands out short-lived per-entity resource wrappers:
///
/// ```no_run
/// # async fn demo() -> modactif::Result<()> {
/// let client = modactif::Client::new("https://myforum.forumactif.com")?;
/// let results = client.topic([42u32, 43]).lock().await?;
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct Client {
    shared: Shared,
}

impl Client {
    /// Connect to a forum, using its index page as the moderation context.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_context_page(base_url, "/")
    }

    /// Connect to a forum, reading moderation context (the `tid` token,
    /// charset, page type) from the given page instead of the index.
    pub fn with_context_page(base_url: &str, page: &str) -> Result<Self> {
        let transport = HttpTransport::new(base_url)?;
        Ok(Self::from_transport(Arc::new(transport), page))
    }

    /// Build a client over an existing transport. Useful for tests and for
    /// callers that manage their own HTTP session.
    pub fn from_transport(transport: Arc<dyn Transport>, context_page: &str) -> Self {
        let context = Arc::new(ContextCache::new(context_page));
        Self {
            shared: Shared { transport, context },
        }
    }

    #[must_use]
    pub fn forum(&self, ids: impl TargetIds) -> ForumResource {
        ForumResource::new(ids.into_ids(), self.shared.clone())
    }

    #[must_use]
    pub fn topic(&self, ids: impl TargetIds) -> TopicResource {
        TopicResource::new(ids.into_ids(), self.shared.clone())
    }

    #[must_use]
    pub fn post(&self, ids: impl TargetIds) -> PostResource {
        PostResource::new(ids.into_ids(), self.shared.clone())
    }

    #[must_use]
    pub fn user(&self, ids: impl TargetIds) -> UserResource {
        UserResource::new(ids.into_ids(), self.shared.clone())
    }

    #[must_use]
    pub fn chat(&self) -> ChatResource {
        ChatResource::new(self.shared.clone())
    }

    /// The underlying transport, for ad-hoc page fetches.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.shared.transport
    }

    /// The moderation context cache. Call [`ContextCache::invalidate`] after
    /// logging in or out so the next operation re-reads the token.
    #[must_use]
    pub fn context(&self) -> &Arc<ContextCache> {
        &self.shared.context
    }
}
