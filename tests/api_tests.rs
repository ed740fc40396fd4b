use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use fundmatch::ai::CompletionProvider;
use fundmatch::entities::investor::SocialLinks;
use fundmatch::entities::matches::{EmailStatus, ReviewStatus};
use fundmatch::error::AppError;
use fundmatch::storage::{NewCampaign, NewInvestor, NewMatch, SeaOrmStorage, Storage};
use fundmatch::{create_app, AppState};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Completion double that always answers with the same strings.
struct CannedProvider {
    json: String,
    text: String,
}

#[async_trait]
impl CompletionProvider for CannedProvider {
    async fn complete_json(&self, _prompt: &str) -> Result<String, AppError> {
        Ok(self.json.clone())
    }

    async fn complete_text(&self, _prompt: &str) -> Result<String, AppError> {
        Ok(self.text.clone())
    }
}

fn canned(json: &str, text: &str) -> Arc<dyn CompletionProvider> {
    Arc::new(CannedProvider {
        json: json.to_string(),
        text: text.to_string(),
    })
}

/// Completion double that pops scripted replies in order; Err strings
/// become completion errors.
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
        })
    }

    fn next_reply(&self) -> Result<String, AppError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("ran out of scripted replies")
            .map_err(AppError::CompletionError)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete_json(&self, _prompt: &str) -> Result<String, AppError> {
        self.next_reply()
    }

    async fn complete_text(&self, _prompt: &str) -> Result<String, AppError> {
        self.next_reply()
    }
}

/// Counts calls without ever producing a usable reply.
struct CountingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionProvider for CountingProvider {
    async fn complete_json(&self, _prompt: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("{}".to_string())
    }

    async fn complete_text(&self, _prompt: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(String::new())
    }
}

/// Fresh app over an in-memory SQLite database. A single pooled connection
/// keeps every query on the same memory database.
async fn test_state(provider: Arc<dyn CompletionProvider>) -> (Router, Arc<dyn Storage>) {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);
    let conn = Database::connect(options).await.expect("sqlite connect failed");
    Migrator::up(&conn, None).await.expect("migrations failed");

    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new(conn));
    let app = create_app(AppState {
        storage: storage.clone(),
        provider,
    });
    (app, storage)
}

fn investor(name: &str, focus: Option<&str>, stage: Option<&str>) -> NewInvestor {
    NewInvestor {
        name: name.to_string(),
        focus: focus.map(str::to_string),
        stage: stage.map(str::to_string),
        ..Default::default()
    }
}

// The rate limiter keys on x-forwarded-for, so every request carries one.
fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-forwarded-for", "127.0.0.1")
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-forwarded-for", "127.0.0.1")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("x-forwarded-for", "127.0.0.1")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-forwarded-for", "127.0.0.1")
        .body(Body::empty())
        .unwrap()
}

fn post_csv(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-forwarded-for", "127.0.0.1")
        .header("content-type", "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _storage) = test_state(canned("{}", "")).await;

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let (app, _storage) = test_state(canned("{}", "")).await;

    let response = app.oneshot(get("/not-a-real-route")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_and_list_campaigns_newest_first() {
    let (app, _storage) = test_state(canned("{}", "")).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/campaigns",
            json!({"name": "Seed Round", "description": "fintech"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["name"], "Seed Round");
    assert_eq!(created["description"], "fintech");
    assert_eq!(created["isActive"], true);
    assert!(created["id"].is_number());
    assert!(created["createdAt"].is_string());
    let first_id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/campaigns",
            json!({"name": "Series A", "isActive": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/api/campaigns"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["name"], "Series A");
    assert_eq!(listed[0]["isActive"], false);
    assert_eq!(listed[1]["name"], "Seed Round");

    let response = app
        .oneshot(get(&format!("/api/campaigns/{}", first_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["name"], "Seed Round");
}

#[tokio::test]
async fn test_create_campaign_rejects_blank_name() {
    let (app, storage) = test_state(canned("{}", "")).await;

    let response = app
        .oneshot(post_json("/api/campaigns", json!({"name": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("name must not be empty"));

    // Nothing was written
    assert!(storage.campaigns().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_campaign_not_found() {
    let (app, _storage) = test_state(canned("{}", "")).await;

    let response = app.oneshot(get("/api/campaigns/999")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Campaign not found");
}

#[tokio::test]
async fn test_generate_matches_persists_good_fit() {
    let (app, storage) = test_state(canned(
        r#"{"score": 80, "reason": "Portfolio overlaps the space"}"#,
        "",
    ))
    .await;
    storage
        .create_investors(vec![investor("Acme Fund", Some("fintech, payments"), None)])
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/campaigns",
            json!({"name": "Seed Round", "description": "A fintech startup building payment rails"}),
        ))
        .await
        .unwrap();
    let campaign = body_json(response).await;
    let id = campaign["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let generated = body_json(response).await;
    assert_eq!(generated["count"], 1);

    let response = app
        .oneshot(get(&format!("/api/campaigns/{}/matches", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let matches = body_json(response).await;
    let matches = matches.as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["matchScore"], 80);
    assert_eq!(matches[0]["matchReason"], "Portfolio overlaps the space");
    assert_eq!(matches[0]["status"], "pending");
    assert_eq!(matches[0]["emailStatus"], "not_sent");
    assert_eq!(matches[0]["investor"]["name"], "Acme Fund");
}

#[tokio::test]
async fn test_generate_matches_discards_low_scores() {
    let (app, storage) = test_state(canned(r#"{"score": 30, "reason": "Poor fit"}"#, "")).await;
    storage
        .create_investors(vec![investor("Acme Fund", Some("fintech"), None)])
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/campaigns",
            json!({"name": "Seed Round", "description": "fintech startup"}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 0);

    let response = app
        .oneshot(get(&format!("/api/campaigns/{}/matches", id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_generate_matches_threshold_is_exclusive() {
    // Exactly 50 is not good enough
    let (app, storage) = test_state(canned(r#"{"score": 50, "reason": "Borderline"}"#, "")).await;
    storage
        .create_investors(vec![investor("Acme Fund", Some("fintech"), None)])
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/campaigns",
            json!({"name": "Seed Round", "description": "fintech startup"}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 0);
}

#[tokio::test]
async fn test_generate_matches_rounds_fractional_scores() {
    let (app, storage) = test_state(canned(r#"{"score": 80.6, "reason": "Strong"}"#, "")).await;
    storage
        .create_investors(vec![investor("Acme Fund", Some("fintech"), None)])
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/campaigns",
            json!({"name": "Seed Round", "description": "fintech startup"}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    app.clone()
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();

    let response = app
        .oneshot(get(&format!("/api/campaigns/{}/matches", id)))
        .await
        .unwrap();
    let matches = body_json(response).await;
    assert_eq!(matches[0]["matchScore"], 81);
}

#[tokio::test]
async fn test_generate_matches_with_no_investors() {
    let (app, _storage) = test_state(canned(r#"{"score": 80}"#, "")).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/campaigns", json!({"name": "Seed Round"})))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["count"], 0);
}

#[tokio::test]
async fn test_generate_matches_never_scores_unrelated_investors() {
    let provider = Arc::new(CountingProvider {
        calls: AtomicUsize::new(0),
    });
    let (app, storage) = test_state(provider.clone()).await;
    storage
        .create_investors(vec![investor("Bio Fund", Some("biotech"), Some("Series B"))])
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/campaigns",
            json!({"name": "Seed Round", "description": "fintech startup"}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 0);

    // The pre-filter dropped the investor before any model call
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_generate_matches_missing_campaign() {
    let (app, _storage) = test_state(canned(r#"{"score": 80}"#, "")).await;

    let response = app
        .oneshot(post_empty("/api/campaigns/42/matches/generate"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Campaign not found");
}

#[tokio::test]
async fn test_generate_matches_caps_candidates() {
    let (app, storage) = test_state(canned(r#"{"score": 80, "reason": "Fit"}"#, "")).await;
    let rows: Vec<NewInvestor> = (0..30)
        .map(|i| investor(&format!("Fund {}", i), Some("fintech"), None))
        .collect();
    storage.create_investors(rows).await.unwrap();

    // No description, so every investor qualifies up to the cap
    let response = app
        .clone()
        .oneshot(post_json("/api/campaigns", json!({"name": "Broad Outreach"})))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 20);
}

#[tokio::test]
async fn test_generate_matches_survives_model_failures() {
    let provider = ScriptedProvider::new(vec![
        Err("model exploded"),
        Ok(r#"{"score": 80, "reason": "Fit"}"#),
    ]);
    let (app, storage) = test_state(provider).await;
    storage
        .create_investors(vec![
            investor("Fund A", Some("fintech"), None),
            investor("Fund B", Some("fintech"), None),
        ])
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/campaigns",
            json!({"name": "Seed Round", "description": "fintech startup"}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    // One candidate fails, the other is still scored and stored
    let response = app
        .clone()
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["count"], 1);

    let response = app
        .oneshot(get(&format!("/api/campaigns/{}/matches", id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_generate_matches_skips_already_matched_investors() {
    let (app, storage) = test_state(canned(r#"{"score": 80, "reason": "Fit"}"#, "")).await;
    storage
        .create_investors(vec![investor("Acme Fund", Some("fintech"), None)])
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/campaigns",
            json!({"name": "Seed Round", "description": "fintech startup"}),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 1);

    // Re-running adds nothing for the same investor
    let response = app
        .clone()
        .oneshot(post_empty(&format!("/api/campaigns/{}/matches/generate", id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 0);

    assert_eq!(storage.campaign_matches(id as i32).await.unwrap().len(), 1);
}

async fn seed_match(storage: &dyn Storage) -> i32 {
    storage
        .create_investors(vec![investor("Acme Fund", Some("fintech"), None)])
        .await
        .unwrap();
    let inv = storage.investors(None, None).await.unwrap().remove(0);
    let camp = storage
        .create_campaign(NewCampaign {
            name: "Seed Round".to_string(),
            description: Some("fintech startup".to_string()),
            is_active: true,
        })
        .await
        .unwrap();
    storage
        .create_match(NewMatch {
            campaign_id: camp.id,
            investor_id: inv.id,
            match_score: Some(75),
            match_reason: None,
            status: ReviewStatus::Pending,
            email_status: EmailStatus::NotSent,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_draft_email_stores_content() {
    let draft = "Subject: Intro\n\nHello, we are raising a seed round.";
    let (app, storage) = test_state(canned("{}", draft)).await;
    let match_id = seed_match(storage.as_ref()).await;

    let response = app
        .oneshot(post_empty(&format!("/api/matches/{}/email", match_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["content"], draft);

    let stored = storage.match_by_id(match_id).await.unwrap().unwrap();
    assert_eq!(stored.email_content.as_deref(), Some(draft));
}

#[tokio::test]
async fn test_draft_email_replaces_previous_draft() {
    let draft = "Subject: Second try\n\nNew angle.";
    let (app, storage) = test_state(canned("{}", draft)).await;
    let match_id = seed_match(storage.as_ref()).await;

    let response = app
        .clone()
        .oneshot(patch_json(
            &format!("/api/matches/{}", match_id),
            json!({"emailContent": "manual draft"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_empty(&format!("/api/matches/{}/email", match_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = storage.match_by_id(match_id).await.unwrap().unwrap();
    assert_eq!(stored.email_content.as_deref(), Some(draft));
}

#[tokio::test]
async fn test_draft_email_missing_match() {
    let (app, _storage) = test_state(canned("{}", "ignored")).await;

    let response = app
        .oneshot(post_empty("/api/matches/99/email"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Match not found");
}

#[tokio::test]
async fn test_draft_email_failure_leaves_match_untouched() {
    let provider = ScriptedProvider::new(vec![Err("model unavailable")]);
    let (app, storage) = test_state(provider).await;
    let match_id = seed_match(storage.as_ref()).await;

    let response = app
        .oneshot(post_empty(&format!("/api/matches/{}/email", match_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let stored = storage.match_by_id(match_id).await.unwrap().unwrap();
    assert!(stored.email_content.is_none());
}

#[tokio::test]
async fn test_update_match_is_partial() {
    let (app, storage) = test_state(canned("{}", "")).await;
    let match_id = seed_match(storage.as_ref()).await;

    let response = app
        .clone()
        .oneshot(patch_json(
            &format!("/api/matches/{}", match_id),
            json!({"status": "approved"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "approved");
    // Untouched fields keep their values
    assert_eq!(body["matchScore"], 75);
    assert_eq!(body["emailStatus"], "not_sent");

    let response = app
        .clone()
        .oneshot(patch_json(
            &format!("/api/matches/{}", match_id),
            json!({"emailStatus": "sent", "emailContent": "hello there"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["emailStatus"], "sent");
    assert_eq!(body["emailContent"], "hello there");
    assert_eq!(body["status"], "approved");

    // An empty patch is a no-op, not an error
    let response = app
        .oneshot(patch_json(&format!("/api/matches/{}", match_id), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["emailStatus"], "sent");
}

#[tokio::test]
async fn test_update_match_not_found() {
    let (app, _storage) = test_state(canned("{}", "")).await;

    let response = app
        .oneshot(patch_json("/api/matches/42", json!({"status": "approved"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Match not found");
}

#[tokio::test]
async fn test_update_match_rejects_unknown_status() {
    let (app, storage) = test_state(canned("{}", "")).await;
    let match_id = seed_match(storage.as_ref()).await;

    let response = app
        .oneshot(patch_json(
            &format!("/api/matches/{}", match_id),
            json!({"status": "maybe"}),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());

    let stored = storage.match_by_id(match_id).await.unwrap().unwrap();
    assert_eq!(stored.status, ReviewStatus::Pending);
}

#[tokio::test]
async fn test_list_investors_with_filters() {
    let (app, storage) = test_state(canned("{}", "")).await;
    storage
        .create_investors(vec![
            investor("Acme Ventures", Some("Fintech, Payments"), Some("Seed")),
            NewInvestor {
                name: "Beta Capital".to_string(),
                focus: Some("Biotech".to_string()),
                description: Some("Early-stage biotech specialist".to_string()),
                ..Default::default()
            },
            investor("Gamma Partners", Some("Consumer, Fintech"), None),
        ])
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/api/investors")).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);

    // search hits names case-insensitively
    let response = app
        .clone()
        .oneshot(get("/api/investors?search=acme"))
        .await
        .unwrap();
    let found = body_json(response).await;
    let found = found.as_array().unwrap().clone();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Acme Ventures");

    // search also hits descriptions
    let response = app
        .clone()
        .oneshot(get("/api/investors?search=specialist"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    // focus only looks at the focus column
    let response = app
        .oneshot(get("/api/investors?focus=fintech"))
        .await
        .unwrap();
    let found = body_json(response).await;
    let names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Acme Ventures", "Gamma Partners"]);
}

#[tokio::test]
async fn test_get_investor_and_missing() {
    let (app, storage) = test_state(canned("{}", "")).await;
    storage
        .create_investors(vec![NewInvestor {
            name: "Acme Ventures".to_string(),
            fund_type: Some("VC".to_string()),
            social_links: Some(SocialLinks {
                twitter: Some("https://twitter.com/acmevc".to_string()),
                linkedin: None,
                facebook: None,
            }),
            ..Default::default()
        }])
        .await
        .unwrap();
    let id = storage.investors(None, None).await.unwrap()[0].id;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/investors/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Acme Ventures");
    assert_eq!(body["fundType"], "VC");
    assert_eq!(body["socialLinks"]["twitter"], "https://twitter.com/acmevc");
    assert!(body["socialLinks"]["linkedin"].is_null());

    let response = app.oneshot(get("/api/investors/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Investor not found");
}

#[tokio::test]
async fn test_import_investors_endpoint() {
    let (app, _storage) = test_state(canned("{}", "")).await;

    let csv = "Investor Name,Fund Type,Website (if available),Fund Focus (Sectors),Fund Stage,Partner Name,Partner Email,Portfolio Companies,Location,Twitter Link,LinkedIn Link,Facebook Link,Number of Investments,Number of Exits,Fund Description,Founding Year\n\
        Acme Ventures,VC,https://acme.vc,\"Fintech, Payments\",Seed,Jane Roe,jane@acme.vc,\"Stripe, Plaid\",San Francisco,https://twitter.com/acmevc,,,120,18,Backs early fintech teams,2012\n\
        ,VC,,,Seed,,,,,,,,,,No name on this row,\n\
        Beta Capital,Angel,,Biotech,Series A,Sam Poe,sam@beta.vc,,Boston,,,,12,not-a-number,Biotech specialist,2018\n";

    let response = app
        .clone()
        .oneshot(post_csv("/api/investors/import", csv))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 2);
    let skipped = body["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["line"], 3);

    let response = app.oneshot(get("/api/investors")).await.unwrap();
    let listed = body_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    let beta = listed
        .iter()
        .find(|v| v["name"] == "Beta Capital")
        .unwrap();
    assert_eq!(beta["investmentCount"], 12);
    // Unparseable count falls back to zero instead of dropping the row
    assert_eq!(beta["exitCount"], 0);
    assert_eq!(beta["foundingYear"], 2018);
}
