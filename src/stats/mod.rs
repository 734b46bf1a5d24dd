//! Read-only page scrapers: pagination, topic, forum, and profile stats.

pub mod forum;
pub mod pagination;
pub mod profile;
pub mod topic;

pub use forum::{parse_forum_stats, ForumStats};
pub use pagination::{parse_pagination, Pagination};
pub use profile::{parse_profile_stats, parse_profile_stats_with, FieldRule, ProfileStats};
pub use topic::{parse_topic_stats, TopicStats};
