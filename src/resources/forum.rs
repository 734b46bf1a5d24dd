//! Forum-level operations: creating new topics.

use futures_util::future::try_join_all;

use super::{ensure_filled, ensure_targets, Shared};
use crate::bridge::BridgeResult;
use crate::error::Result;
use crate::transport::FormField;

/// Input for a new topic.
#[derive(Debug, Clone, Default)]
pub struct NewTopic {
    pub subject: String,
    pub message: String,
    /// Subscribe to reply notifications.
    pub notify: bool,
}

/// Wrapper over one or more target forums.
pub struct ForumResource {
    ids: Vec<u32>,
    shared: Shared,
}

impl ForumResource {
    pub(crate) fn new(ids: Vec<u32>, shared: Shared) -> Self {
        Self { ids, shared }
    }

    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Create the topic in every target forum.
    ///
    /// Results come back in the same order as the target ids regardless of
    /// request completion order.
    pub async fn post(&self, input: &NewTopic) -> Result<Vec<BridgeResult>> {
        ensure_filled(&input.subject, "Forum.post: subject")?;
        ensure_filled(&input.message, "Forum.post: message")?;
        ensure_targets(&self.ids, "Forum.post")?;

        let tasks = self.ids.iter().map(|&forum_id| {
            let fields = vec![
                FormField::text("post", 1),
                FormField::text("mode", "newtopic"),
                FormField::text("f", forum_id),
                FormField::text("subject", &input.subject),
                FormField::text("message", &input.message),
                FormField::text("notify", u8::from(input.notify)),
            ];
            async move { self.shared.round_trip_post("/post", &fields).await }
        });
        try_join_all(tasks).await
    }
}
