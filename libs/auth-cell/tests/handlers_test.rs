use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use auth_cell::router::auth_routes;
use shared_database::store::ProviderStore;
use shared_models::auth::Role;
use shared_models::provider::VerificationStatus;
use shared_utils::test_utils::{bearer, new_user, seed_user, test_state};

async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    serde_json::from_slice(&bytes).expect("response is json")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn test_app() -> (Router, std::sync::Arc<shared_database::memory::MemoryStore>) {
    let (state, store) = test_state();
    (auth_routes(state), store)
}

#[tokio::test]
async fn signup_then_login_round_trip() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/signup",
            json!({
                "email": "ada@example.com",
                "name": "Ada Lovelace",
                "password": "correct-horse-battery"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["role"], "patient");
    // The password hash must never appear in a response.
    assert!(body["user"].get("password_hash").is_none());

    let response = app
        .oneshot(post_json(
            "/login",
            json!({
                "email": "Ada@Example.com",
                "password": "correct-horse-battery"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (app, _store) = test_app();
    let signup = json!({
        "email": "dup@example.com",
        "name": "First In",
        "password": "long-enough-password"
    });

    let response = app.clone().oneshot(post_json("/signup", signup.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(post_json("/signup", signup)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn bad_credentials_are_unauthorized_without_leaking_which_part() {
    let (app, _store) = test_app();

    app.clone()
        .oneshot(post_json(
            "/signup",
            json!({
                "email": "kay@example.com",
                "name": "Kay",
                "password": "long-enough-password"
            }),
        ))
        .await
        .unwrap();

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({ "email": "kay@example.com", "password": "not-the-password" }),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .oneshot(post_json(
            "/login",
            json!({ "email": "nobody@example.com", "password": "whatever-here" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        read_json(wrong_password).await["error"],
        read_json(unknown_email).await["error"]
    );
}

#[tokio::test]
async fn doctor_signup_starts_unverified_with_a_pending_profile() {
    let (app, store) = test_app();

    let response = app
        .oneshot(post_json(
            "/signup",
            json!({
                "email": "doc@example.com",
                "name": "Dr. Example",
                "password": "long-enough-password",
                "role": "doctor"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["user"]["verified"], false);

    let id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();
    let profile = store
        .find_profile(id)
        .await
        .unwrap()
        .expect("profile created alongside doctor account");
    assert_eq!(profile.verification, VerificationStatus::Pending);
    assert!(profile.working_days.is_empty());
}

#[tokio::test]
async fn admin_accounts_cannot_be_self_registered() {
    let (app, _store) = test_app();

    let response = app
        .oneshot(post_json(
            "/signup",
            json!({
                "email": "boss@example.com",
                "name": "Boss",
                "password": "long-enough-password",
                "role": "admin"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_returns_live_identity() {
    let (state, store) = test_state();
    let app = auth_routes(state);
    let user = seed_user(&store, Role::Patient, false).await;

    let response = app
        .oneshot(get_with_token("/me", &bearer(&user)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["user"]["id"], user.id.to_string());
}

#[tokio::test]
async fn me_with_a_stale_token_is_unauthorized() {
    let (app, _store) = test_app();
    // Token is validly signed, but its subject was never persisted.
    let ghost = new_user(Role::Patient, false);

    let response = app
        .oneshot(get_with_token("/me", &bearer(&ghost)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_without_a_token_is_unauthorized() {
    let (app, _store) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
