//! Authorization: who may see or translate what.
//!
//! Handlers ask an [`Authorizer`] before returning or translating any record.
//! The default [`MembershipPolicy`] decides purely from group membership and
//! the visibility flags stored on the records themselves.

use crate::domain::{Discussion, Group, User};
use std::collections::HashSet;

/// The authenticated user plus the groups they belong to
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: User,
    pub group_ids: HashSet<i64>,
}

impl Actor {
    pub fn new(user: User, group_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            user,
            group_ids: group_ids.into_iter().collect(),
        }
    }

    pub fn is_member_of(&self, group_id: i64) -> bool {
        self.group_ids.contains(&group_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Show,
    /// Spend machine translation quota on a record
    Translate,
}

#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Group(&'a Group),
    Discussion(&'a Discussion),
}

pub trait Authorizer: Send + Sync {
    fn can_access(&self, actor: &Actor, action: Action, resource: Resource<'_>) -> bool;
}

/// Membership-based rules:
///
/// - a group is shown to members, or to anyone when it is public
/// - a discussion is shown to members of its group, or to anyone when not private
/// - only members of the discussion's group may translate it
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipPolicy;

impl Authorizer for MembershipPolicy {
    fn can_access(&self, actor: &Actor, action: Action, resource: Resource<'_>) -> bool {
        match (action, resource) {
            (Action::Show, Resource::Group(group)) => {
                group.is_visible_to_public || actor.is_member_of(group.id)
            }
            (Action::Show, Resource::Discussion(discussion)) => {
                !discussion.private || actor.is_member_of(discussion.group_id)
            }
            (Action::Translate, Resource::Discussion(discussion)) => {
                actor.is_member_of(discussion.group_id)
            }
            (Action::Translate, Resource::Group(_)) => false,
        }
    }
}
