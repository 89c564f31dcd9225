/// End-to-end API tests over the in-memory store
///
/// Run with: cargo test -p biddge-api --test api_tests

mod common;

use axum::http::StatusCode;
use biddge_shared::{
    auth::jwt::{create_token, Claims},
    store::{CommunityStore, UserStore},
};
use chrono::{Duration, Utc};
use common::{TestContext, TEST_JWT_SECRET};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_health_and_liveness() {
    let ctx = TestContext::new();

    let response = ctx.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["database"], "connected");

    let response = ctx.get("/api/test", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], "biddge_test");

    ctx.store.set_available(false);
    let response = ctx.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "degraded");
}

#[tokio::test]
async fn test_register_returns_token_for_profile() {
    let ctx = TestContext::new();

    let response = ctx
        .post(
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "analytical",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], "ada@example.com");
    assert_eq!(response.body["is_creator"], false);
    assert_eq!(response.body["joined_communities"], json!([]));
    assert!(response.body.get("password_hash").is_none());

    let token = response.body["token"].as_str().unwrap();
    let me = ctx.get("/api/users/me", Some(token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["name"], "Ada");
    assert_eq!(me.body["email"], "ada@example.com");
    assert!(me.body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let ctx = TestContext::new();
    ctx.register("Ada", "ada@example.com", false).await;

    let response = ctx
        .post(
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Imposter",
                "email": "ada@example.com",
                "password": "whatever",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "bad_request");
    assert_eq!(response.body["detail"], "Email already registered");
    assert_eq!(ctx.store.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_register_validates_body() {
    let ctx = TestContext::new();

    let response = ctx
        .post(
            "/api/auth/register",
            None,
            Some(json!({ "name": "Ada", "email": "not-an-email", "password": "pw" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "validation_error");
    assert_eq!(response.body["details"][0]["field"], "email");

    let response = ctx
        .post("/api/auth/register", None, Some(json!({ "email": "ada@example.com" })))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login() {
    let ctx = TestContext::new();
    ctx.register("Ada", "ada@example.com", true).await;

    let response = ctx
        .post(
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "correct horse battery" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_creator"], true);
    let token = response.body["token"].as_str().unwrap();
    assert_eq!(ctx.get("/api/users/me", Some(token)).await.status, StatusCode::OK);

    let wrong_password = ctx
        .post(
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["detail"], "Invalid email or password");

    let unknown = ctx
        .post(
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "correct horse battery" })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_login_does_not_stall_other_requests() {
    let ctx = Arc::new(TestContext::new());
    ctx.register("Ada", "ada@example.com", false).await;

    // One worker thread: if the login hashed on it, the liveness request
    // could only run after the login had finished
    let login = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move {
            ctx.post(
                "/api/auth/login",
                None,
                Some(json!({ "email": "ada@example.com", "password": "correct horse battery" })),
            )
            .await
            .status
        }
    });
    let liveness = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { ctx.get("/api/test", None).await.status }
    });

    assert_eq!(liveness.await.unwrap(), StatusCode::OK);
    assert!(!login.is_finished());
    assert_eq!(login.await.unwrap(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let ctx = TestContext::new();
    ctx.register("Ada", "ada@example.com", true).await;

    let missing = ctx.get("/api/users/me", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "unauthorized");

    let garbage = ctx.get("/api/users/me", Some("not.a.token")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let claims = Claims::with_expiration("ada@example.com", Duration::hours(-2));
    let expired = create_token(&claims, TEST_JWT_SECRET).unwrap();
    let response = ctx.get("/api/users/me", Some(&expired)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["detail"], "Token expired");

    // Signed correctly but for a user that does not exist
    let ghost = create_token(&Claims::new("ghost@example.com"), TEST_JWT_SECRET).unwrap();
    assert_eq!(
        ctx.get("/api/users/me", Some(&ghost)).await.status,
        StatusCode::UNAUTHORIZED
    );

    let create = ctx
        .post(
            "/api/communities",
            None,
            Some(json!({ "name": "X", "description": "d", "category": "c" })),
        )
        .await;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_creators_create_communities() {
    let ctx = TestContext::new();
    let member = ctx.register("Grace", "grace@example.com", false).await;

    let response = ctx
        .post(
            "/api/communities",
            Some(&member),
            Some(json!({ "name": "X", "description": "d", "category": "c" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["detail"], "Only creators can create communities");
    assert_eq!(ctx.store.count_communities().await.unwrap(), 0);
}

#[tokio::test]
async fn test_community_membership_scenario() {
    let ctx = TestContext::new();
    let token = ctx.register("Ada", "ada@example.com", true).await;

    let response = ctx
        .post(
            "/api/communities",
            Some(&token),
            Some(json!({
                "name": "X",
                "description": "The letter X",
                "category": "Alphabet",
                "image_url": "https://example.com/x.png",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["creator_id"], "ada@example.com");
    assert_eq!(response.body["creator_name"], "Ada");
    assert_eq!(response.body["member_count"], 0);
    let id = response.body["id"].as_str().unwrap().to_string();

    let list = ctx.get("/api/communities", None).await;
    assert_eq!(list.status, StatusCode::OK);
    let communities = list.body.as_array().unwrap();
    assert_eq!(communities.len(), 1);
    assert_eq!(communities[0]["name"], "X");
    assert_eq!(communities[0]["member_count"], 0);

    let join = ctx.post(&format!("/api/communities/{id}/join"), Some(&token), None).await;
    assert_eq!(join.status, StatusCode::OK);
    assert_eq!(join.body["message"], "Successfully joined community");

    let community = ctx.get(&format!("/api/communities/{id}"), None).await;
    assert_eq!(community.body["member_count"], 1);
    let me = ctx.get("/api/users/me", Some(&token)).await;
    assert_eq!(me.body["joined_communities"], json!([id]));

    let leave = ctx.post(&format!("/api/communities/{id}/leave"), Some(&token), None).await;
    assert_eq!(leave.status, StatusCode::OK);
    assert_eq!(leave.body["message"], "Successfully left community");

    let community = ctx.get(&format!("/api/communities/{id}"), None).await;
    assert_eq!(community.body["member_count"], 0);
    let me = ctx.get("/api/users/me", Some(&token)).await;
    assert_eq!(me.body["joined_communities"], json!([]));
}

#[tokio::test]
async fn test_membership_conflicts() {
    let ctx = TestContext::new();
    let creator = ctx.register("Ada", "ada@example.com", true).await;
    let member = ctx.register("Grace", "grace@example.com", false).await;
    let id = ctx.create_community(&creator, "Compilers").await;

    let leave = ctx.post(&format!("/api/communities/{id}/leave"), Some(&member), None).await;
    assert_eq!(leave.status, StatusCode::CONFLICT);
    assert_eq!(leave.body["detail"], "Not a member of this community");

    let first = ctx.post(&format!("/api/communities/{id}/join"), Some(&member), None).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = ctx.post(&format!("/api/communities/{id}/join"), Some(&member), None).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["detail"], "Already joined this community");

    let community = ctx.store.find_community(&id).await.unwrap().unwrap();
    assert_eq!(community.member_count, 1);
}

#[tokio::test]
async fn test_unknown_community_is_not_found() {
    let ctx = TestContext::new();
    let token = ctx.register("Ada", "ada@example.com", false).await;

    let get = ctx.get("/api/communities/does-not-exist", None).await;
    assert_eq!(get.status, StatusCode::NOT_FOUND);
    assert_eq!(get.body["detail"], "Community not found");

    let join = ctx.post("/api/communities/does-not-exist/join", Some(&token), None).await;
    assert_eq!(join.status, StatusCode::NOT_FOUND);

    let leave = ctx.post("/api/communities/does-not-exist/leave", Some(&token), None).await;
    assert_eq!(leave.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_featured_is_capped_and_newest_first() {
    let ctx = TestContext::new();
    let token = ctx.register("Ada", "ada@example.com", true).await;

    for i in 0..8 {
        ctx.create_community(&token, &format!("c{i}")).await;
    }

    let featured = ctx.get("/api/communities/featured", None).await;
    assert_eq!(featured.status, StatusCode::OK);
    let featured = featured.body.as_array().unwrap().clone();
    assert_eq!(featured.len(), 6);

    let stamps: Vec<chrono::DateTime<Utc>> = featured
        .iter()
        .map(|c| c["created_at"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
    assert!(featured.iter().all(|c| c["name"] != "c0" && c["name"] != "c1"));
}

#[tokio::test]
async fn test_featured_fails_open() {
    let ctx = TestContext::new();
    ctx.store.set_available(false);

    let featured = ctx.get("/api/communities/featured", None).await;
    assert_eq!(featured.status, StatusCode::OK);
    assert_eq!(featured.body, json!([]));

    // The full list does not swallow store errors
    let list = ctx.get("/api/communities", None).await;
    assert_eq!(list.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(list.body["error"], "internal_error");
    assert_eq!(list.body["detail"], "An internal error occurred");
}

#[tokio::test]
async fn test_debug_seed_hook_is_idempotent() {
    let ctx = TestContext::new();

    let first = ctx.post("/api/debug/seed", None, None).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["seeded"], true);
    assert_eq!(first.body["inserted"], 8);

    let second = ctx.post("/api/debug/seed", None, None).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["seeded"], false);
    assert_eq!(second.body["inserted"], 0);
    assert_eq!(second.body["existing"], 8);

    let list = ctx.get("/api/communities", None).await;
    assert_eq!(list.body.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_debug_db_report() {
    let ctx = TestContext::new();
    ctx.register("Ada", "ada@example.com", false).await;
    ctx.post("/api/debug/seed", None, None).await;

    let report = ctx.get("/api/debug/db", None).await;
    assert_eq!(report.status, StatusCode::OK);
    assert_eq!(report.body["success"], true);
    assert_eq!(report.body["database"], "biddge_test");
    assert_eq!(report.body["communities"]["count"], 8);
    assert_eq!(report.body["communities"]["sample"].as_array().unwrap().len(), 2);
    assert_eq!(report.body["users"]["count"], 1);

    ctx.store.set_available(false);
    let report = ctx.get("/api/debug/db", None).await;
    assert_eq!(report.status, StatusCode::OK);
    assert_eq!(report.body["success"], false);
    assert!(report.body["error"].is_string());
}
