//! Topic-level operations: replying and moderation controls.

use futures_util::future::try_join_all;

use super::{ensure_filled, ensure_targets, Shared};
use crate::bridge::BridgeResult;
use crate::error::{Error, Result};
use crate::transport::FormField;

/// Input for a reply.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub message: String,
    /// Subscribe to reply notifications.
    pub notify: bool,
}

/// Wrapper over one or more target topics.
pub struct TopicResource {
    ids: Vec<u32>,
    shared: Shared,
}

impl TopicResource {
    pub(crate) fn new(ids: Vec<u32>, shared: Shared) -> Self {
        Self { ids, shared }
    }

    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Post the reply in every target topic.
    pub async fn post(&self, input: &Reply) -> Result<Vec<BridgeResult>> {
        ensure_filled(&input.message, "Topic.post: message")?;
        ensure_targets(&self.ids, "Topic.post")?;

        let tasks = self.ids.iter().map(|&topic_id| {
            let fields = vec![
                FormField::text("post", 1),
                FormField::text("mode", "reply"),
                FormField::text("t", topic_id),
                FormField::text("message", &input.message),
                FormField::text("notify", u8::from(input.notify)),
            ];
            async move { self.shared.round_trip_post("/post", &fields).await }
        });
        try_join_all(tasks).await
    }

    /// Lock every target topic.
    pub async fn lock(&self) -> Result<Vec<BridgeResult>> {
        self.modcp_get("lock").await
    }

    /// Unlock every target topic.
    pub async fn unlock(&self) -> Result<Vec<BridgeResult>> {
        self.modcp_get("unlock").await
    }

    /// Send every target topic to the trash.
    pub async fn trash(&self) -> Result<Vec<BridgeResult>> {
        self.modcp_get("trash").await
    }

    /// Move every target topic to another forum.
    pub async fn move_to(&self, forum_id: u32) -> Result<Vec<BridgeResult>> {
        if forum_id == 0 {
            return Err(Error::Validation(
                "Topic.move: destination forum id is required".to_string(),
            ));
        }
        ensure_targets(&self.ids, "Topic.move")?;
        let tid = self.shared.tid().await?;

        let url = format!("/modcp?tid={tid}");
        let tasks = self.ids.iter().map(|&topic_id| {
            let fields = vec![
                FormField::text("tid", &tid),
                FormField::text("new_forum", format!("f{forum_id}")),
                FormField::text("mode", "move"),
                FormField::text("t", topic_id),
                FormField::text("confirm", 1),
            ];
            let url = url.clone();
            async move { self.shared.round_trip_post(&url, &fields).await }
        });
        try_join_all(tasks).await
    }

    /// Permanently delete every target topic.
    pub async fn delete(&self) -> Result<Vec<BridgeResult>> {
        ensure_targets(&self.ids, "Topic.delete")?;
        let tid = self.shared.tid().await?;

        let url = format!("/modcp?tid={tid}");
        let tasks = self.ids.iter().map(|&topic_id| {
            let fields = vec![
                FormField::text("t", topic_id),
                FormField::text("mode", "delete"),
                FormField::text("confirm", 1),
            ];
            let url = url.clone();
            async move { self.shared.round_trip_post(&url, &fields).await }
        });
        try_join_all(tasks).await
    }

    /// Issue a modcp GET (`lock`/`unlock`/`trash`) for every target topic.
    async fn modcp_get(&self, mode: &str) -> Result<Vec<BridgeResult>> {
        ensure_targets(&self.ids, &format!("Topic.{mode}"))?;
        let tid = self.shared.tid().await?;

        let tasks = self.ids.iter().map(|&topic_id| {
            let url = format!("/modcp?mode={mode}&t={topic_id}&tid={tid}");
            async move { self.shared.round_trip_get(&url).await }
        });
        try_join_all(tasks).await
    }
}
