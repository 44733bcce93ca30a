//! HTTP-level tests for the in-app notification feed.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, get_auth, post_json, put_json_auth, TestApp};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn send_list_count_and_mark_seen(pool: PgPool) {
    let user = create_user(&pool, "Asha", "asha@example.com").await;
    let other = create_user(&pool, "Ravi", "ravi@example.com").await;
    let app = TestApp::new(pool);
    let token = app.token_for(user.id);

    for message in ["first", "second"] {
        let response = post_json(
            app.app(),
            "/api/v1/notifications/send",
            json!({ "user_id": user.id, "message": message }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["seen"], false);
    }
    post_json(
        app.app(),
        "/api/v1/notifications/send",
        json!({ "user_id": other.id, "message": "not yours" }),
    )
    .await;

    let json = body_json(get_auth(app.app(), "/api/v1/notifications", &token).await).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["message"], "second");
    assert_eq!(items[1]["message"], "first");

    let json =
        body_json(get_auth(app.app(), "/api/v1/notifications/unread-count", &token).await).await;
    assert_eq!(json["data"]["count"], 2);

    let response =
        put_json_auth(app.app(), "/api/v1/notifications/mark-seen", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["marked_seen"], 2);

    let json =
        body_json(get_auth(app.app(), "/api/v1/notifications/unread-count", &token).await).await;
    assert_eq!(json["data"]["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_respects_limit_and_offset(pool: PgPool) {
    let user = create_user(&pool, "Asha", "asha@example.com").await;
    let app = TestApp::new(pool);
    let token = app.token_for(user.id);

    for i in 0..3 {
        post_json(
            app.app(),
            "/api/v1/notifications/send",
            json!({ "user_id": user.id, "message": format!("n{i}") }),
        )
        .await;
    }

    let json = body_json(
        get_auth(app.app(), "/api/v1/notifications?limit=1&offset=1", &token).await,
    )
    .await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["message"], "n1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn send_to_unknown_user_is_404(pool: PgPool) {
    let app = TestApp::new(pool);

    let response = post_json(
        app.app(),
        "/api/v1/notifications/send",
        json!({ "user_id": 9999, "message": "hello" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "User with id 9999 not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_message_is_400(pool: PgPool) {
    let user = create_user(&pool, "Asha", "asha@example.com").await;
    let app = TestApp::new(pool);

    let response = post_json(
        app.app(),
        "/api/v1/notifications/send",
        json!({ "user_id": user.id, "message": "   " }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
