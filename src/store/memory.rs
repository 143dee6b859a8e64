use crate::domain::{Comment, Discussion, Event, Group, User};
use crate::security::constant_time_compare;
use crate::store::{DiscussionFilter, GroupRef, Result, Store};
use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-process store holding everything in vectors
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    memberships: Vec<(i64, i64)>,
    groups: Vec<Group>,
    discussions: Vec<Discussion>,
    comments: Vec<Comment>,
    events: Vec<Event>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.write().users.push(user);
    }

    pub fn add_member(&self, user_id: i64, group_id: i64) {
        let mut inner = self.write();
        if !inner.memberships.contains(&(user_id, group_id)) {
            inner.memberships.push((user_id, group_id));
        }
    }

    pub fn insert_group(&self, group: Group) {
        self.write().groups.push(group);
    }

    pub fn insert_discussion(&self, discussion: Discussion) {
        self.write().discussions.push(discussion);
    }

    pub fn insert_comment(&self, comment: Comment) {
        self.write().comments.push(comment);
    }

    pub fn insert_event(&self, event: Event) {
        self.write().events.push(event);
    }

    // Writers only push, so the data behind a poisoned lock is still consistent
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn take(limit: i64) -> usize {
    usize::try_from(limit.max(0)).unwrap_or(usize::MAX)
}

#[async_trait]
impl Store for MemoryStore {
    async fn user_by_api_key(&self, api_key: &str) -> Result<Option<User>> {
        Ok(self
            .read()
            .users
            .iter()
            .find(|u| {
                u.api_key
                    .as_deref()
                    .is_some_and(|key| constant_time_compare(key, api_key))
            })
            .cloned())
    }

    async fn member_group_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .read()
            .memberships
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, group)| *group)
            .collect())
    }

    async fn group(&self, group: &GroupRef) -> Result<Option<Group>> {
        Ok(self
            .read()
            .groups
            .iter()
            .find(|g| match group {
                GroupRef::Id(id) => g.id == *id,
                GroupRef::Key(key) => g.key == *key,
            })
            .cloned())
    }

    async fn subgroups(&self, parent_id: i64) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .read()
            .groups
            .iter()
            .filter(|g| g.parent_id == Some(parent_id))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn discussions(
        &self,
        group_ids: &[i64],
        viewer_group_ids: &[i64],
        filter: DiscussionFilter,
        limit: i64,
    ) -> Result<Vec<Discussion>> {
        let mut discussions: Vec<Discussion> = self
            .read()
            .discussions
            .iter()
            .filter(|d| group_ids.contains(&d.group_id) && filter.matches(d))
            .filter(|d| !d.private || viewer_group_ids.contains(&d.group_id))
            .cloned()
            .collect();
        discussions.sort_by(|a, b| {
            b.last_activity_at
                .cmp(&a.last_activity_at)
                .then(b.id.cmp(&a.id))
        });
        discussions.truncate(take(limit));
        Ok(discussions)
    }

    async fn discussion(&self, id: i64) -> Result<Option<Discussion>> {
        Ok(self.read().discussions.iter().find(|d| d.id == id).cloned())
    }

    async fn events(&self, discussion_id: i64, limit: i64) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .read()
            .events
            .iter()
            .filter(|e| e.discussion_id == discussion_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.sequence_id, e.id));
        events.truncate(take(limit));
        Ok(events)
    }

    async fn comment(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.read().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn comments(&self, ids: &[i64]) -> Result<Vec<Comment>> {
        Ok(self
            .read()
            .comments
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}
