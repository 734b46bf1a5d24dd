//! Post-level operations: deleting, editing, and splitting posts.

use futures_util::future::try_join_all;

use super::{ensure_filled, ensure_targets, Shared};
use crate::bridge::BridgeResult;
use crate::error::Result;
use crate::moderation;
use crate::transport::FormField;

/// Input for a post edit.
#[derive(Debug, Clone, Default)]
pub struct EditPost {
    pub message: String,
}

/// Options for splitting posts into a new topic.
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Destination forum; resolved from the source topic when absent.
    pub new_forum_id: Option<u32>,
    /// Source topic; resolved from the first post when absent.
    pub topic_id: Option<u32>,
    /// Split this post and everything after it, instead of only the listed
    /// posts.
    pub beyond: bool,
}

/// Wrapper over one or more target posts.
pub struct PostResource {
    ids: Vec<u32>,
    shared: Shared,
}

impl PostResource {
    pub(crate) fn new(ids: Vec<u32>, shared: Shared) -> Self {
        Self { ids, shared }
    }

    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Delete every target post.
    pub async fn delete(&self) -> Result<Vec<BridgeResult>> {
        ensure_targets(&self.ids, "Post.delete")?;

        let tasks = self.ids.iter().map(|&post_id| {
            let fields = vec![
                FormField::text("p", post_id),
                FormField::text("mode", "delete"),
                FormField::text("confirm", ""),
            ];
            async move { self.shared.round_trip_post("/post", &fields).await }
        });
        try_join_all(tasks).await
    }

    /// Replace the body of every target post.
    ///
    /// The platform's edit form carries hidden routing fields and tokens, so
    /// the existing form is fetched and replayed with only the message
    /// changed.
    pub async fn update(&self, input: &EditPost) -> Result<Vec<BridgeResult>> {
        ensure_filled(&input.message, "Post.update: message")?;
        ensure_targets(&self.ids, "Post.update")?;

        let tasks = self.ids.iter().map(|&post_id| async move {
            let url = format!("/post?p={post_id}&mode=editpost");
            let mut form = self
                .shared
                .transport
                .get_form(&url, r#"form[name="post"]"#)
                .await?;
            form.set("message", &input.message);
            form.set("post", "1");
            self.shared.round_trip_post("/post", &form.to_fields()).await
        });
        try_join_all(tasks).await
    }

    /// Split the target posts out of their topic into a new one.
    ///
    /// Returns a single result: the platform performs the split as one
    /// operation over the whole post list.
    pub async fn split(&self, title: &str, options: &SplitOptions) -> Result<BridgeResult> {
        ensure_filled(title, "Post.split: subject")?;
        ensure_targets(&self.ids, "Post.split")?;
        let tid = self.shared.tid().await?;

        let first_post = self.ids[0];
        let transport = self.shared.transport.as_ref();
        let topic_id =
            moderation::resolve_topic_id(transport, options.topic_id, first_post).await?;
        let forum_id =
            moderation::resolve_forum_id(transport, topic_id, options.new_forum_id, &tid).await?;

        let split_type = if options.beyond {
            "split_type_beyond"
        } else {
            "split_type_all"
        };
        let fields = vec![
            FormField::text("subject", title.trim()),
            FormField::text("new_forum_id", format!("f{forum_id}")),
            FormField::list("post_id_list", self.ids.iter().copied()),
            FormField::text("t", topic_id),
            FormField::text("mode", "split"),
            FormField::text(split_type, 1),
        ];
        self.shared
            .round_trip_post(&format!("/modcp?tid={tid}"), &fields)
            .await
    }

    /// Split the first target post and everything after it into a new topic.
    pub async fn split_beyond(&self, title: &str, options: &SplitOptions) -> Result<BridgeResult> {
        let options = SplitOptions {
            beyond: true,
            ..options.clone()
        };
        self.split(title, &options).await
    }
}
