use crate::domain::{Comment, Discussion, Event, Group, User};
use crate::store::{DiscussionFilter, GroupRef, Result, Store};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

const GROUP_COLUMNS: &str =
    "id, key, name, parent_id, description, is_visible_to_public, created_at";
const DISCUSSION_COLUMNS: &str = "id, key, group_id, author_id, title, description, \
     description_format, private, closed_at, created_at, last_activity_at";
const COMMENT_COLUMNS: &str = "id, discussion_id, author_id, body, body_format, created_at";
const EVENT_COLUMNS: &str =
    "id, kind, discussion_id, sequence_id, actor_id, eventable_type, eventable_id, created_at";

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool to `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to database (max {} connections)", max_connections);
        Ok(Self { pool })
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

fn discussion_filter_clause(filter: DiscussionFilter) -> &'static str {
    match filter {
        DiscussionFilter::Open => "AND closed_at IS NULL",
        DiscussionFilter::Closed => "AND closed_at IS NOT NULL",
        DiscussionFilter::All => "",
    }
}

#[async_trait]
impl Store for PgStore {
    async fn user_by_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, username, api_key FROM users WHERE api_key = $1",
        )
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn member_group_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT group_id FROM memberships WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn group(&self, group: &GroupRef) -> Result<Option<Group>> {
        let query = match group {
            GroupRef::Id(id) => {
                sqlx::query_as::<_, Group>(&format!("SELECT {} FROM groups WHERE id = $1", GROUP_COLUMNS))
                    .bind(*id)
                    .fetch_optional(&self.pool)
                    .await
            }
            GroupRef::Key(key) => {
                sqlx::query_as::<_, Group>(&format!("SELECT {} FROM groups WHERE key = $1", GROUP_COLUMNS))
                    .bind(key.as_str())
                    .fetch_optional(&self.pool)
                    .await
            }
        };
        Ok(query?)
    }

    async fn subgroups(&self, parent_id: i64) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            "SELECT {} FROM groups WHERE parent_id = $1 ORDER BY name",
            GROUP_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn discussions(
        &self,
        group_ids: &[i64],
        viewer_group_ids: &[i64],
        filter: DiscussionFilter,
        limit: i64,
    ) -> Result<Vec<Discussion>> {
        let sql = format!(
            "SELECT {} FROM discussions WHERE group_id = ANY($1) \
             AND (NOT private OR group_id = ANY($2)) {} \
             ORDER BY last_activity_at DESC, id DESC LIMIT $3",
            DISCUSSION_COLUMNS,
            discussion_filter_clause(filter)
        );
        let discussions = sqlx::query_as::<_, Discussion>(&sql)
            .bind(group_ids)
            .bind(viewer_group_ids)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;
        Ok(discussions)
    }

    async fn discussion(&self, id: i64) -> Result<Option<Discussion>> {
        let discussion = sqlx::query_as::<_, Discussion>(&format!(
            "SELECT {} FROM discussions WHERE id = $1",
            DISCUSSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(discussion)
    }

    async fn events(&self, discussion_id: i64, limit: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE discussion_id = $1 ORDER BY sequence_id, id LIMIT $2",
            EVENT_COLUMNS
        ))
        .bind(discussion_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn comment(&self, id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn comments(&self, ids: &[i64]) -> Result<Vec<Comment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = ANY($1) ORDER BY id",
            COMMENT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }
}
