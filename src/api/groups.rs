use crate::api::{ApiError, ApiQuery, AppState, CurrentActor, Result};
use crate::authz::{Action, Actor, Resource};
use crate::domain::{Discussion, Group};
use crate::store::{DiscussionFilter, GroupRef};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub groups: Vec<Group>,
}

#[derive(Debug, Serialize)]
pub struct DiscussionsResponse {
    pub discussions: Vec<Discussion>,
}

#[derive(Debug, Deserialize)]
pub struct DiscussionsParams {
    pub filter: Option<String>,
    pub per: Option<i64>,
}

/// Look up a group by id or key and check the actor may see it
async fn load_group(state: &AppState, actor: &Actor, raw: &str) -> Result<Group> {
    let group = state
        .store
        .group(&GroupRef::parse(raw))
        .await?
        .ok_or(ApiError::NotFound("Group"))?;

    if !state
        .authorizer
        .can_access(actor, Action::Show, Resource::Group(&group))
    {
        return Err(ApiError::Forbidden);
    }
    Ok(group)
}

pub async fn show(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<GroupsResponse>> {
    let group = load_group(&state, &actor, &id).await?;
    Ok(Json(GroupsResponse {
        groups: vec![group],
    }))
}

pub async fn subgroups(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> Result<Json<GroupsResponse>> {
    let parent = load_group(&state, &actor, &id).await?;

    let groups = state
        .store
        .subgroups(parent.id)
        .await?
        .into_iter()
        .filter(|g| {
            state
                .authorizer
                .can_access(&actor, Action::Show, Resource::Group(g))
        })
        .collect();

    Ok(Json(GroupsResponse { groups }))
}

pub async fn discussions(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<DiscussionsParams>,
) -> Result<Json<DiscussionsResponse>> {
    let group = load_group(&state, &actor, &id).await?;
    let filter = DiscussionFilter::parse(params.filter.as_deref());
    let limit = state.page_size(params.per);

    let viewer_group_ids: Vec<i64> = actor.group_ids.iter().copied().collect();

    let discussions = state
        .store
        .discussions(&[group.id], &viewer_group_ids, filter, limit)
        .await?
        .into_iter()
        .filter(|d| {
            state
                .authorizer
                .can_access(&actor, Action::Show, Resource::Discussion(d))
        })
        .collect();

    Ok(Json(DiscussionsResponse { discussions }))
}
