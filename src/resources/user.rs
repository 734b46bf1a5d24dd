//! User-level operations: private messages, bans, unbans.

use futures_util::future::{join_all, try_join_all};

use super::{ensure_filled, ensure_targets, Shared};
use crate::bridge::BridgeResult;
use crate::error::{Error, Result};
use crate::moderation;
use crate::transport::FormField;

/// Input for a private message.
#[derive(Debug, Clone, Default)]
pub struct PrivateMessage {
    pub subject: String,
    pub message: String,
}

/// Options for a ban.
#[derive(Debug, Clone, Default)]
pub struct BanOptions {
    /// Ban duration in days; `0` means permanent.
    pub days: u32,
    pub reason: String,
}

/// Wrapper over one or more target users (numeric ids).
pub struct UserResource {
    ids: Vec<u32>,
    shared: Shared,
}

impl UserResource {
    pub(crate) fn new(ids: Vec<u32>, shared: Shared) -> Self {
        Self { ids, shared }
    }

    #[must_use]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Send one private message to every target user.
    ///
    /// The PM endpoint addresses recipients by username, so each numeric id
    /// is first resolved through its profile page. Lookups run concurrently
    /// with settled semantics: a failed lookup drops that recipient instead
    /// of aborting the batch. Resolving no recipient at all is an error.
    pub async fn pm(&self, input: &PrivateMessage) -> Result<BridgeResult> {
        ensure_filled(&input.subject, "User.pm: subject")?;
        ensure_filled(&input.message, "User.pm: message")?;
        ensure_targets(&self.ids, "User.pm")?;

        let transport = self.shared.transport.as_ref();
        let lookups = self
            .ids
            .iter()
            .map(|&user_id| moderation::resolve_username(transport, user_id));
        let usernames: Vec<String> = join_all(lookups)
            .await
            .into_iter()
            .zip(&self.ids)
            .filter_map(|(result, user_id)| match result {
                Ok(name) => Some(name),
                Err(error) => {
                    tracing::warn!(user_id, %error, "dropping unresolvable pm recipient");
                    None
                }
            })
            .collect();
        if usernames.is_empty() {
            return Err(Error::Validation(
                "User.pm: no recipient could be resolved".to_string(),
            ));
        }

        let fields = vec![
            FormField::text("username", usernames.join(", ")),
            FormField::text("mode", "post"),
            FormField::text("post", 1),
            FormField::text("subject", &input.subject),
            FormField::text("message", &input.message),
        ];
        self.shared.round_trip_post("/privmsg", &fields).await
    }

    /// Ban every target user.
    pub async fn ban(&self, options: &BanOptions) -> Result<Vec<BridgeResult>> {
        ensure_targets(&self.ids, "User.ban")?;
        let tid = self.shared.tid().await?;

        let url = format!("/modcp?tid={tid}");
        let tasks = self.ids.iter().map(|&user_id| {
            let fields = vec![
                FormField::text("tid", &tid),
                FormField::text("confirm", 1),
                FormField::text("mode", "ban"),
                FormField::text("user_id", user_id),
                FormField::text("ban_user_date", options.days),
                FormField::text("ban_user_reason", &options.reason),
            ];
            let url = url.clone();
            async move { self.shared.round_trip_post(&url, &fields).await }
        });
        try_join_all(tasks).await
    }

    /// Lift the ban on every target user, as one admin request.
    pub async fn unban(&self) -> Result<BridgeResult> {
        ensure_targets(&self.ids, "User.unban")?;
        let tid = self.shared.tid().await?;

        let url = format!(
            "/admin/index.forum?part=users_groups&sub=users&mode=ban_control&extended_admin=1&tid={tid}"
        );
        let fields = vec![
            FormField::list("users_to_unban", self.ids.iter().copied()),
            FormField::text("unban_users", 1),
        ];
        self.shared.round_trip_post(&url, &fields).await
    }
}
