use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub parent_id: Option<i64>,
    pub description: String,
    pub is_visible_to_public: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Discussion {
    pub id: i64,
    pub key: String,
    pub group_id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
    /// "md" or "html"
    pub description_format: String,
    pub private: bool,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Discussion {
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub discussion_id: i64,
    pub author_id: i64,
    pub body: String,
    /// "md" or "html"
    pub body_format: String,
    pub created_at: DateTime<Utc>,
}

/// An entry in a discussion's timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub kind: String,
    pub discussion_id: i64,
    pub sequence_id: i64,
    pub actor_id: Option<i64>,
    pub eventable_type: Option<String>,
    pub eventable_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub const COMMENT: &'static str = "Comment";

    /// Id of the comment this event refers to, if any
    pub fn comment_id(&self) -> Option<i64> {
        match self.eventable_type.as_deref() {
            Some(Self::COMMENT) => self.eventable_id,
            _ => None,
        }
    }
}
