//! Chatbox operations.

use super::{ensure_filled, Shared};
use crate::bridge::BridgeResult;
use crate::error::Result;
use crate::transport::FormField;

/// Wrapper over the board-wide chatbox (no target ids).
pub struct ChatResource {
    shared: Shared,
}

impl ChatResource {
    pub(crate) fn new(shared: Shared) -> Self {
        Self { shared }
    }

    /// Send a chatbox message.
    ///
    /// The chatbox endpoint returns no confirmation prose, so the bridged
    /// result usually reports `Unknown`; callers get the uniform result type
    /// anyway and can inspect `status`/`raw`.
    pub async fn post(&self, message: &str) -> Result<BridgeResult> {
        ensure_filled(message, "Chat.post: message")?;
        let fields = vec![
            FormField::text("method", "send"),
            FormField::text("archive", 0),
            FormField::text("message", message),
        ];
        self.shared
            .round_trip_post("/chatbox/actions.forum", &fields)
            .await
    }
}
