//! End-to-end tests for the HTTP API
//!
//! The router is driven in-process against a `MemoryStore`; translation
//! vendors are mocked with wiremock.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use townhall::{
    api::{self, AppState},
    config::{AzureConfig, TranslatorConfig, WatsonConfig},
    domain::{Comment, Discussion, Event, Group, User},
    store::MemoryStore,
    translation::ProviderRegistry,
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

// ==================== Test Helpers ====================

const ADA_KEY: &str = "ada-key";
const BOB_KEY: &str = "bob-key";

fn create_user(id: i64, username: &str, api_key: &str) -> User {
    User {
        id,
        name: username.to_uppercase(),
        username: username.to_string(),
        api_key: Some(api_key.to_string()),
    }
}

fn create_group(id: i64, key: &str, parent_id: Option<i64>, public: bool) -> Group {
    Group {
        id,
        key: key.to_string(),
        name: key.replace('-', " "),
        parent_id,
        description: String::new(),
        is_visible_to_public: public,
        created_at: Utc::now(),
    }
}

fn create_discussion(id: i64, group_id: i64, private: bool, closed: bool, age_minutes: i64) -> Discussion {
    let at = Utc::now() - Duration::minutes(age_minutes);
    Discussion {
        id,
        key: format!("d{}", id),
        group_id,
        author_id: 1,
        title: format!("Discussion {}", id),
        description: String::new(),
        description_format: "md".to_string(),
        private,
        closed_at: closed.then_some(at),
        created_at: at,
        last_activity_at: at,
    }
}

fn create_event(id: i64, sequence_id: i64, comment_id: Option<i64>) -> Event {
    Event {
        id,
        kind: (if comment_id.is_some() { "new_comment" } else { "new_discussion" }).to_string(),
        discussion_id: 100,
        sequence_id,
        actor_id: Some(1),
        eventable_type: comment_id.map(|_| Event::COMMENT.to_string()),
        eventable_id: comment_id,
        created_at: Utc::now(),
    }
}

/// Ada belongs to "founders" (private, id 10). Bob belongs to nothing.
///
/// - founders (10): subgroups founders-ops (11, public) and founders-vault (12, private)
/// - open-town (20): public
/// - discussion 100 in founders, private, with an HTML description and comment 500
/// - discussion 101 in founders, closed
/// - discussion 102 in open-town, not private
/// - discussion 103 in open-town, private
fn create_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_user(create_user(1, "ada", ADA_KEY));
    store.insert_user(create_user(2, "bob", BOB_KEY));

    store.insert_group(create_group(10, "founders", None, false));
    store.insert_group(create_group(11, "founders-ops", Some(10), true));
    store.insert_group(create_group(12, "founders-vault", Some(10), false));
    store.insert_group(create_group(20, "open-town", None, true));
    store.add_member(1, 10);

    let mut budget = create_discussion(100, 10, true, false, 10);
    budget.title = "Budget".to_string();
    budget.description = "<p>Hello</p>".to_string();
    budget.description_format = "html".to_string();
    store.insert_discussion(budget);
    store.insert_discussion(create_discussion(101, 10, true, true, 30));
    store.insert_discussion(create_discussion(102, 20, false, false, 5));
    store.insert_discussion(create_discussion(103, 20, true, false, 1));

    store.insert_comment(Comment {
        id: 500,
        discussion_id: 100,
        author_id: 1,
        body: "Looks good".to_string(),
        body_format: "md".to_string(),
        created_at: Utc::now(),
    });

    store.insert_event(create_event(1, 1, None));
    store.insert_event(create_event(2, 2, Some(500)));
    store.insert_event(create_event(3, 3, None));

    store
}

fn create_translator(azure: Option<&str>, watson: Option<&str>) -> ProviderRegistry {
    let config = TranslatorConfig {
        azure: AzureConfig {
            api_key: azure.map(|_| "azure-key".to_string()),
            region: None,
            endpoint: azure.unwrap_or("https://azure.invalid").to_string(),
        },
        watson: WatsonConfig {
            api_key: watson.map(|_| "watson-key".to_string()),
            url: watson.map(str::to_string),
        },
        request_timeout: std::time::Duration::from_secs(5),
    };
    ProviderRegistry::from_config(&config).expect("Should build registry")
}

fn create_app(translator: ProviderRegistry) -> Router {
    api::router(AppState::new(Arc::new(create_store()), translator))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Should build request");
    send(app, request).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Should build request");
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("Should respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn ids(body: &Value, key: &str) -> Vec<i64> {
    body[key]
        .as_array()
        .expect("Should be an array")
        .iter()
        .map(|item| item["id"].as_i64().expect("Should have an id"))
        .collect()
}

async fn mount_azure(server: &MockServer, status: u16, text: &str) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!([{ "translations": [{ "text": text }] }]))
    } else {
        ResponseTemplate::new(status).set_body_string(text)
    };
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_watson(server: &MockServer, translation: &str) {
    Mock::given(method("POST"))
        .and(path("/v3/translate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "translations": [{ "translation": translation }] })),
        )
        .mount(server)
        .await;
}

// ==================== Health Tests ====================

#[tokio::test]
async fn test_health_needs_no_api_key() {
    let app = create_app(create_translator(None, None));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("Should build request");

    let response = app.oneshot(request).await.expect("Should respond");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    assert_eq!(&bytes[..], b"ok");
}

// ==================== Authentication Tests ====================

#[tokio::test]
async fn test_missing_api_key_is_forbidden() {
    let app = create_app(create_translator(None, None));
    let (status, body) = get(app, "/api/b2/groups/20").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], 403);
}

#[tokio::test]
async fn test_unknown_api_key_is_forbidden() {
    let app = create_app(create_translator(None, None));
    let (status, _) = get(app, "/api/b2/groups/20?api_key=nope").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_empty_api_key_is_forbidden() {
    let app = create_app(create_translator(None, None));
    let (status, _) = get(app, "/api/b2/groups/20?api_key=").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ==================== Group Tests ====================

#[tokio::test]
async fn test_show_group_by_id() {
    let app = create_app(create_translator(None, None));
    let (status, body) = get(app, &format!("/api/b2/groups/10?api_key={}", ADA_KEY)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "groups"), vec![10]);
    assert_eq!(body["groups"][0]["key"], "founders");
}

#[tokio::test]
async fn test_show_group_by_key() {
    let app = create_app(create_translator(None, None));
    let (status, body) = get(app, &format!("/api/b2/groups/open-town?api_key={}", BOB_KEY)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "groups"), vec![20]);
}

#[tokio::test]
async fn test_show_private_group_to_non_member() {
    let app = create_app(create_translator(None, None));
    let (status, _) = get(app, &format!("/api/b2/groups/founders?api_key={}", BOB_KEY)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_show_unknown_group() {
    let app = create_app(create_translator(None, None));
    let (status, body) = get(app, &format!("/api/b2/groups/999?api_key={}", ADA_KEY)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Group not found");
}

#[tokio::test]
async fn test_subgroups_hide_private_groups_from_non_members() {
    let app = create_app(create_translator(None, None));
    let (status, body) = get(app, &format!("/api/b2/groups/10/subgroups?api_key={}", ADA_KEY)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "groups"), vec![11]);
}

#[tokio::test]
async fn test_subgroups_require_visible_parent() {
    let app = create_app(create_translator(None, None));
    let (status, _) = get(app, &format!("/api/b2/groups/10/subgroups?api_key={}", BOB_KEY)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ==================== Discussion Tests ====================

#[tokio::test]
async fn test_discussions_default_to_open() {
    let app = create_app(create_translator(None, None));
    let (status, body) = get(app, &format!("/api/b2/groups/10/discussions?api_key={}", ADA_KEY)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "discussions"), vec![100]);
}

#[tokio::test]
async fn test_discussions_filters() {
    let base = format!("/api/b2/groups/10/discussions?api_key={}", ADA_KEY);

    let (_, body) = get(create_app(create_translator(None, None)), &format!("{}&filter=closed", base)).await;
    assert_eq!(ids(&body, "discussions"), vec![101]);

    let (_, body) = get(create_app(create_translator(None, None)), &format!("{}&filter=all", base)).await;
    assert_eq!(ids(&body, "discussions"), vec![100, 101]);

    let (_, body) = get(create_app(create_translator(None, None)), &format!("{}&filter=bogus", base)).await;
    assert_eq!(ids(&body, "discussions"), vec![100]);

    let (_, body) = get(create_app(create_translator(None, None)), &format!("{}&filter=all&per=1", base)).await;
    assert_eq!(ids(&body, "discussions"), vec![100]);
}

#[tokio::test]
async fn test_discussions_hide_private_ones_from_non_members() {
    let app = create_app(create_translator(None, None));
    let (status, body) = get(app, &format!("/api/b2/groups/open-town/discussions?api_key={}", BOB_KEY)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "discussions"), vec![102]);
}

#[tokio::test]
async fn test_discussions_page_skips_hidden_private_discussions() {
    // 103 is private and newer than 102; the page must still be filled
    let app = create_app(create_translator(None, None));
    let (status, body) = get(
        app,
        &format!("/api/b2/groups/open-town/discussions?per=1&api_key={}", BOB_KEY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "discussions"), vec![102]);
}

#[tokio::test]
async fn test_discussions_invalid_per_returns_json_error() {
    let app = create_app(create_translator(None, None));
    let (status, body) = get(
        app,
        &format!("/api/b2/groups/open-town/discussions?per=lots&api_key={}", BOB_KEY),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["code"], 400);
}

// ==================== Event Tests ====================

#[tokio::test]
async fn test_events_side_load_comments_and_discussion() {
    let app = create_app(create_translator(None, None));
    let (status, body) = get(app, &format!("/api/b2/events?discussion_id=100&api_key={}", ADA_KEY)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "events"), vec![1, 2, 3]);
    assert_eq!(ids(&body, "comments"), vec![500]);
    assert_eq!(ids(&body, "discussions"), vec![100]);
}

#[tokio::test]
async fn test_events_per_limits_timeline() {
    let uri = format!("/api/b2/events?discussion_id=100&per=1&api_key={}", ADA_KEY);
    let (status, body) = get(create_app(create_translator(None, None)), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "events"), vec![1]);
    assert!(ids(&body, "comments").is_empty());

    let uri = format!("/api/b2/events?discussion_id=100&per=0&api_key={}", ADA_KEY);
    let (_, body) = get(create_app(create_translator(None, None)), &uri).await;
    assert!(ids(&body, "events").is_empty());
}

#[tokio::test]
async fn test_events_without_discussion_id() {
    let app = create_app(create_translator(None, None));
    let (status, _) = get(app, &format!("/api/b2/events?api_key={}", ADA_KEY)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_events_for_unknown_discussion() {
    let app = create_app(create_translator(None, None));
    let (status, _) = get(app, &format!("/api/b2/events?discussion_id=999&api_key={}", ADA_KEY)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_events_for_private_discussion_of_other_group() {
    let app = create_app(create_translator(None, None));
    let (status, _) = get(app, &format!("/api/b2/events?discussion_id=100&api_key={}", BOB_KEY)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ==================== Translation Tests ====================

#[tokio::test]
async fn test_translate_discussion_with_azure() {
    let server = MockServer::start().await;
    mount_azure(&server, 200, "Bonjour").await;

    let app = create_app(create_translator(Some(&server.uri()), None));
    let (status, body) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "discussion", "id": 100, "to": "fr_CA" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let translation = &body["translations"][0];
    assert_eq!(translation["model"], "discussion");
    assert_eq!(translation["id"], 100);
    assert_eq!(translation["provider"], "azure");
    assert_eq!(translation["locale"], "fr");
    assert_eq!(translation["fields"]["title"], "Bonjour");
    assert_eq!(translation["fields"]["description"], "Bonjour");

    let requests = server.received_requests().await.expect("Should record requests");
    assert_eq!(requests.len(), 2);
    assert!(requests
        .iter()
        .any(|r| r.url.query().is_some_and(|q| q.contains("textType=html"))));
}

#[tokio::test]
async fn test_translate_skips_empty_fields() {
    let server = MockServer::start().await;
    mount_azure(&server, 200, "Ferme").await;

    let app = create_app(create_translator(Some(&server.uri()), None));
    let (status, body) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "discussion", "id": 101, "to": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let fields = body["translations"][0]["fields"].as_object().expect("Should be an object");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields["title"], "Ferme");
}

#[tokio::test]
async fn test_translate_comment() {
    let server = MockServer::start().await;
    mount_watson(&server, "Se ve bien").await;

    let app = create_app(create_translator(None, Some(&server.uri())));
    let (status, body) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "comment", "id": 500, "to": "es-MX" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let translation = &body["translations"][0];
    assert_eq!(translation["provider"], "watson");
    assert_eq!(translation["locale"], "es");
    assert_eq!(translation["fields"]["body"], "Se ve bien");
}

#[tokio::test]
async fn test_translate_falls_back_when_azure_quota_is_exhausted() {
    let server = MockServer::start().await;
    mount_azure(&server, 429, "Too many requests").await;
    mount_watson(&server, "Hallo").await;

    let app = create_app(create_translator(Some(&server.uri()), Some(&server.uri())));
    let (status, body) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "comment", "id": 500, "to": "de" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translations"][0]["provider"], "watson");
    assert_eq!(body["translations"][0]["fields"]["body"], "Hallo");
}

#[tokio::test]
async fn test_translate_keeps_fallback_provider_for_all_fields() {
    let server = MockServer::start().await;
    mount_azure(&server, 429, "Too many requests").await;
    mount_watson(&server, "Hallo").await;

    let app = create_app(create_translator(Some(&server.uri()), Some(&server.uri())));
    let (status, body) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "discussion", "id": 100, "to": "zh_TW" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let translation = &body["translations"][0];
    assert_eq!(translation["provider"], "watson");
    assert_eq!(translation["locale"], "zh-tw");
    assert_eq!(translation["fields"]["title"], "Hallo");
    assert_eq!(translation["fields"]["description"], "Hallo");

    let requests = server.received_requests().await.expect("Should record requests");
    let azure_calls = requests.iter().filter(|r| r.url.path() == "/translate").count();
    let watson_calls = requests.iter().filter(|r| r.url.path() == "/v3/translate").count();
    assert_eq!(azure_calls, 1);
    assert_eq!(watson_calls, 2);
}

#[tokio::test]
async fn test_translate_unknown_model_returns_json_error() {
    let app = create_app(create_translator(Some("https://azure.example.com"), None));
    let (status, body) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "poll", "id": 1, "to": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["type"], "invalid_request_error");
    assert_eq!(body["error"]["code"], 422);
}

#[tokio::test]
async fn test_translate_quota_exhausted_everywhere() {
    let server = MockServer::start().await;
    mount_azure(&server, 429, "Too many requests").await;

    let app = create_app(create_translator(Some(&server.uri()), None));
    let (status, body) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "comment", "id": 500, "to": "de" }),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["type"], "translation_error");
}

#[tokio::test]
async fn test_translate_vendor_failure() {
    let server = MockServer::start().await;
    mount_azure(&server, 500, "boom").await;

    let app = create_app(create_translator(Some(&server.uri()), None));
    let (status, _) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "comment", "id": 500, "to": "de" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_translate_without_providers() {
    let app = create_app(create_translator(None, None));
    let (status, _) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "discussion", "id": 100, "to": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_translate_invalid_locale() {
    let app = create_app(create_translator(Some("https://azure.example.com"), None));
    let (status, body) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "discussion", "id": 100, "to": "!!" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn test_translate_requires_membership() {
    let app = create_app(create_translator(Some("https://azure.example.com"), None));
    let (status, _) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", BOB_KEY),
        json!({ "model": "discussion", "id": 102, "to": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_translate_unknown_comment() {
    let app = create_app(create_translator(Some("https://azure.example.com"), None));
    let (status, body) = post_json(
        app,
        &format!("/api/b2/translations?api_key={}", ADA_KEY),
        json!({ "model": "comment", "id": 9999, "to": "fr" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Comment not found");
}

#[tokio::test]
async fn test_list_providers() {
    let app = create_app(create_translator(None, Some("https://watson.example.com")));
    let (status, body) = get(app, &format!("/api/b2/translations/providers?api_key={}", BOB_KEY)).await;

    assert_eq!(status, StatusCode::OK);
    let providers = body["providers"].as_array().expect("Should be an array");
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0]["name"], "azure");
    assert_eq!(providers[0]["available"], false);
    assert_eq!(providers[1]["name"], "watson");
    assert_eq!(providers[1]["available"], true);
    assert!(providers[1]["supported_locales"]
        .as_array()
        .expect("Should be an array")
        .contains(&json!("zh-tw")));
}
