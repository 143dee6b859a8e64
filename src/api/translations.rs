use crate::api::{ApiError, ApiJson, AppState, CurrentActor, Result};
use crate::authz::{Action, Actor, Resource};
use crate::domain::Discussion;
use crate::translation::{Provider, ProviderDescriptor, TextFormat, TranslationRequest};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatableModel {
    Discussion,
    Comment,
}

#[derive(Debug, Deserialize)]
pub struct TranslationParams {
    pub model: TranslatableModel,
    pub id: i64,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct Translation {
    pub model: TranslatableModel,
    pub id: i64,
    pub locale: String,
    pub provider: &'static str,
    pub fields: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
pub struct TranslationsResponse {
    pub translations: Vec<Translation>,
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderDescriptor>,
}

async fn load_discussion(state: &AppState, actor: &Actor, id: i64) -> Result<Discussion> {
    let discussion = state
        .store
        .discussion(id)
        .await?
        .ok_or(ApiError::NotFound("Discussion"))?;

    if !state
        .authorizer
        .can_access(actor, Action::Translate, Resource::Discussion(&discussion))
    {
        return Err(ApiError::Forbidden);
    }
    Ok(discussion)
}

/// Translatable fields of a record: name, content and markup format
async fn translatable_fields(
    state: &AppState,
    actor: &Actor,
    params: &TranslationParams,
) -> Result<Vec<(&'static str, String, TextFormat)>> {
    match params.model {
        TranslatableModel::Discussion => {
            let discussion = load_discussion(state, actor, params.id).await?;
            let format = TextFormat::from_stored(&discussion.description_format);
            Ok(vec![
                ("title", discussion.title, TextFormat::Text),
                ("description", discussion.description, format),
            ])
        }
        TranslatableModel::Comment => {
            let comment = state
                .store
                .comment(params.id)
                .await?
                .ok_or(ApiError::NotFound("Comment"))?;
            load_discussion(state, actor, comment.discussion_id).await?;

            let format = TextFormat::from_stored(&comment.body_format);
            Ok(vec![("body", comment.body, format)])
        }
    }
}

/// Translate a discussion or comment into the `to` locale.
///
/// Empty fields are skipped. The first non-empty field picks a provider with
/// quota fallback; every later field uses that same provider, so all fields
/// share one provider and locale.
pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(params): ApiJson<TranslationParams>,
) -> Result<Json<TranslationsResponse>> {
    let target = TranslationRequest::new("", params.to.as_str())?;
    let fields = translatable_fields(&state, &actor, &params).await?;

    let provider = state.translator.pick_provider()?;
    let mut chosen: Option<&Provider> = None;
    let mut translation = Translation {
        model: params.model,
        id: params.id,
        locale: provider.normalize_locale(&target.target_locale),
        provider: provider.name(),
        fields: BTreeMap::new(),
    };

    for (name, content, format) in fields {
        if content.trim().is_empty() {
            continue;
        }

        let request = TranslationRequest {
            content,
            format,
            ..target.clone()
        };
        let result = match chosen {
            Some(provider) => state.translator.translate_with(provider, &request).await?,
            None => {
                let result = state.translator.translate_with_fallback(&request).await?;
                chosen = state.translator.provider(result.provider);
                result
            }
        };

        translation.locale = result.locale;
        translation.provider = result.provider;
        translation.fields.insert(name, result.translated_text);
    }

    info!(
        "User {} translated {:?} {} into {} ({} fields)",
        actor.user.id,
        translation.model,
        translation.id,
        translation.locale,
        translation.fields.len()
    );

    Ok(Json(TranslationsResponse {
        translations: vec![translation],
    }))
}

/// Configured providers in priority order
pub async fn providers(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.translator.descriptors(),
    })
}
