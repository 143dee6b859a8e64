//! Read access to groups, discussions, and their timelines.
//!
//! Handlers depend only on the [`Store`] trait. [`PgStore`] is used in
//! production; [`MemoryStore`] backs tests and local experiments.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::domain::{Comment, Discussion, Event, Group, User};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// How a group is addressed in a URL: numeric id or its public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Id(i64),
    Key(String),
}

impl GroupRef {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Key(raw.to_string()),
        }
    }
}

/// Which discussions to list by open/closed state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiscussionFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl DiscussionFilter {
    /// Unknown or missing filters list open discussions
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("closed") => Self::Closed,
            Some("all") => Self::All,
            _ => Self::Open,
        }
    }

    pub fn matches(self, discussion: &Discussion) -> bool {
        match self {
            Self::Open => !discussion.is_closed(),
            Self::Closed => discussion.is_closed(),
            Self::All => true,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn user_by_api_key(&self, api_key: &str) -> Result<Option<User>>;

    async fn member_group_ids(&self, user_id: i64) -> Result<Vec<i64>>;

    async fn group(&self, group: &GroupRef) -> Result<Option<Group>>;

    /// Direct children of a group, by name
    async fn subgroups(&self, parent_id: i64) -> Result<Vec<Group>>;

    /// Discussions in any of `group_ids` that a member of `viewer_group_ids`
    /// may see, most recently active first.
    ///
    /// Private discussions are only returned for groups in `viewer_group_ids`.
    /// Visibility is applied before `limit`.
    async fn discussions(
        &self,
        group_ids: &[i64],
        viewer_group_ids: &[i64],
        filter: DiscussionFilter,
        limit: i64,
    ) -> Result<Vec<Discussion>>;

    async fn discussion(&self, id: i64) -> Result<Option<Discussion>>;

    /// Timeline of a discussion ordered by `sequence_id`
    async fn events(&self, discussion_id: i64, limit: i64) -> Result<Vec<Event>>;

    async fn comment(&self, id: i64) -> Result<Option<Comment>>;

    async fn comments(&self, ids: &[i64]) -> Result<Vec<Comment>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_ref_parse() {
        assert_eq!(GroupRef::parse("42"), GroupRef::Id(42));
        assert_eq!(GroupRef::parse("dirt-bikes"), GroupRef::Key("dirt-bikes".to_string()));
        assert_eq!(GroupRef::parse("4x2"), GroupRef::Key("4x2".to_string()));
    }

    #[test]
    fn test_discussion_filter_parse() {
        assert_eq!(DiscussionFilter::parse(Some("closed")), DiscussionFilter::Closed);
        assert_eq!(DiscussionFilter::parse(Some("all")), DiscussionFilter::All);
        assert_eq!(DiscussionFilter::parse(Some("open")), DiscussionFilter::Open);
        assert_eq!(DiscussionFilter::parse(Some("bogus")), DiscussionFilter::Open);
        assert_eq!(DiscussionFilter::parse(None), DiscussionFilter::Open);
    }
}
