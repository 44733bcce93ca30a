//! HTTP-level tests for profile, app mode and account deletion.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, delete_json_auth, get_auth, post_json_auth, put_json_auth, TestApp, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

use beacon_db::models::sos_log::CreateSosLog;
use beacon_db::repositories::{SosLogRepo, UserRepo};

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_profile_renders_missing_fields_as_empty(pool: PgPool) {
    let user = create_user(&pool, "Asha", "asha@example.com").await;
    let app = TestApp::new(pool);
    let token = app.token_for(user.id);

    let response = get_auth(app.app(), "/api/v1/profile", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["data"],
        json!({
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "",
            "vehicle_number": "",
            "emergency_contact": "",
            "mode": "sweet",
        })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_is_partial(pool: PgPool) {
    let user = create_user(&pool, "Asha", "asha@example.com").await;
    let app = TestApp::new(pool);
    let token = app.token_for(user.id);

    let body = json!({ "phone": "+919811111111", "vehicleNumber": "DL 01 AB 1234" });
    let response = put_json_auth(app.app(), "/api/v1/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["phone"], "+919811111111");
    assert_eq!(json["data"]["vehicle_number"], "DL 01 AB 1234");
    assert_eq!(json["data"]["name"], "Asha");

    let body = json!({ "name": "  Asha K  " });
    let response = put_json_auth(app.app(), "/api/v1/profile", body, &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Asha K");
    assert_eq!(json["data"]["phone"], "+919811111111");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_email_change_is_validated(pool: PgPool) {
    let user = create_user(&pool, "Asha", "asha@example.com").await;
    create_user(&pool, "Ravi", "ravi@example.com").await;
    let app = TestApp::new(pool);
    let token = app.token_for(user.id);

    let response = put_json_auth(
        app.app(),
        "/api/v1/profile",
        json!({ "email": "nope" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        app.app(),
        "/api/v1/profile",
        json!({ "email": "Ravi@Example.com" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn select_mode_accepts_known_modes_only(pool: PgPool) {
    let user = create_user(&pool, "Asha", "asha@example.com").await;
    let app = TestApp::new(pool.clone());
    let token = app.token_for(user.id);

    let response = post_json_auth(
        app.app(),
        "/api/v1/select-mode",
        json!({ "mode": "street" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Mode set to street");

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.mode, "street");

    let response = post_json_auth(
        app.app(),
        "/api/v1/select-mode",
        json!({ "mode": "turbo" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_account_requires_the_password(pool: PgPool) {
    let user = create_user(&pool, "Asha", "asha@example.com").await;
    let app = TestApp::new(pool.clone());
    let token = app.token_for(user.id);

    let response = delete_json_auth(
        app.app(),
        "/api/v1/account",
        json!({ "password": "wrong-password" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = delete_json_auth(app.app(), "/api/v1/account", json!({ "password": "" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(UserRepo::find_by_id(&pool, user.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleted_account_keeps_sos_history_and_loses_access(pool: PgPool) {
    let user = create_user(&pool, "Asha", "asha@example.com").await;
    SosLogRepo::create(
        &pool,
        &CreateSosLog {
            user_id: Some(user.id),
            longitude: 77.1,
            latitude: 28.6,
            media_url: None,
        },
    )
    .await
    .unwrap();
    let app = TestApp::new(pool.clone());
    let token = app.token_for(user.id);

    let response = delete_json_auth(
        app.app(),
        "/api/v1/account",
        json!({ "password": TEST_PASSWORD }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Account deleted successfully");

    assert!(UserRepo::find_by_id(&pool, user.id).await.unwrap().is_none());
    assert_eq!(SosLogRepo::count(&pool).await.unwrap(), 1);

    // The still-unexpired token no longer resolves to an account.
    let response = get_auth(app.app(), "/api/v1/profile", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
