use crate::api::{ApiError, ApiQuery, AppState, CurrentActor, Result};
use crate::authz::{Action, Resource};
use crate::domain::{Comment, Discussion, Event};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct EventsParams {
    pub discussion_id: Option<i64>,
    pub per: Option<i64>,
}

/// A page of a discussion's timeline with the records it refers to
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
    pub comments: Vec<Comment>,
    pub discussions: Vec<Discussion>,
}

pub async fn index(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(params): ApiQuery<EventsParams>,
) -> Result<Json<EventsResponse>> {
    let discussion_id = params.discussion_id.ok_or(ApiError::NotFound("Discussion"))?;
    let discussion = state
        .store
        .discussion(discussion_id)
        .await?
        .ok_or(ApiError::NotFound("Discussion"))?;

    if !state
        .authorizer
        .can_access(&actor, Action::Show, Resource::Discussion(&discussion))
    {
        return Err(ApiError::Forbidden);
    }

    let events = state
        .store
        .events(discussion.id, state.page_size(params.per))
        .await?;

    let mut comment_ids: Vec<i64> = events.iter().filter_map(Event::comment_id).collect();
    comment_ids.sort_unstable();
    comment_ids.dedup();

    // Only comments that still belong to this discussion are side-loaded
    let comments = state
        .store
        .comments(&comment_ids)
        .await?
        .into_iter()
        .filter(|c| c.discussion_id == discussion.id)
        .collect();

    Ok(Json(EventsResponse {
        events,
        comments,
        discussions: vec![discussion],
    }))
}
