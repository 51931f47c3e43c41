//! HTTP tests for the category endpoints (/api/categorys).
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot` against
//! a fresh in-memory store per test.

mod common;

use axum::http::StatusCode;
use common::{id_of, TestApp};
use grimoire_api::config::CategoryDeletePolicy;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_create_then_fetch_preserves_keywords() {
    let app = TestApp::new();
    let keywords = ["snow", "ice", "aurora", "snow"];
    let created = app.create_category("Wizard Town", &keywords).await;
    assert_eq!(created["title"], "Wizard Town");
    assert_eq!(created["wizardIds"], json!([]));
    assert!(created["createdAt"].is_string());

    let fetched = app
        .get(&format!("/api/categorys/{}", id_of(&created)))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["keywords"], json!(keywords));
}

#[tokio::test]
async fn test_create_without_keywords_defaults_to_empty() {
    let app = TestApp::new();
    let response = app
        .post("/api/categorys", json!({ "title": "Bare" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["keywords"], json!([]));
}

#[tokio::test]
async fn test_create_missing_title_is_400() {
    let app = TestApp::new();
    let response = app
        .post("/api/categorys", json!({ "keywords": ["snow"] }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());

    let response = app.post("/api/categorys", json!({ "title": "   " })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = TestApp::new();
    let response = app.raw("POST", "/api/categorys", "{\"title\": ").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_duplicate_title_is_409() {
    let app = TestApp::new();
    app.create_category("Wizard Town", &[]).await;
    let response = app
        .post("/api/categorys", json!({ "title": "Wizard Town" }))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_unknown_and_malformed_ids_are_404() {
    let app = TestApp::new();
    let response = app
        .get(&format!("/api/categorys/{}", Uuid::now_v7()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/api/categorys/not-an-id").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_update_partial_fields() {
    let app = TestApp::new();
    let created = app.create_category("Wizard Town", &["snow", "ice"]).await;
    let uri = format!("/api/categorys/{}", id_of(&created));

    let response = app.put(&uri, json!({ "title": "Wizard City" })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Wizard City");
    assert_eq!(response.body["keywords"], json!(["snow", "ice"]));

    let response = app.put(&uri, json!({ "keywords": ["fire"] })).await;
    assert_eq!(response.body["title"], "Wizard City");
    assert_eq!(response.body["keywords"], json!(["fire"]));
}

#[tokio::test]
async fn test_update_cannot_patch_wizard_ids() {
    let app = TestApp::new();
    let created = app.create_category("Wizard Town", &[]).await;
    let uri = format!("/api/categorys/{}", id_of(&created));

    let response = app
        .put(&uri, json!({ "wizardIds": [Uuid::now_v7().to_string()] }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["wizardIds"], json!([]));
}

#[tokio::test]
async fn test_update_to_taken_title_is_409_and_changes_nothing() {
    let app = TestApp::new();
    let first = app.create_category("WizardTown", &[]).await;
    let second = app.create_category("WizardTown2", &[]).await;

    let response = app
        .put(
            &format!("/api/categorys/{}", id_of(&second)),
            json!({ "title": "WizardTown" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let first_now = app.get(&format!("/api/categorys/{}", id_of(&first))).await;
    let second_now = app.get(&format!("/api/categorys/{}", id_of(&second))).await;
    assert_eq!(first_now.body["title"], "WizardTown");
    assert_eq!(second_now.body["title"], "WizardTown2");
}

#[tokio::test]
async fn test_update_unknown_is_404_and_blank_title_is_400() {
    let app = TestApp::new();
    let response = app
        .put(
            &format!("/api/categorys/{}", Uuid::now_v7()),
            json!({ "title": "Anything" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let created = app.create_category("Wizard Town", &[]).await;
    let response = app
        .put(
            &format!("/api/categorys/{}", id_of(&created)),
            json!({ "title": "" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_then_delete_again() {
    let app = TestApp::new();
    let created = app.create_category("Wizard Town", &[]).await;
    let uri = format!("/api/categorys/{}", id_of(&created));

    let response = app.delete(&uri).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.body, serde_json::Value::Null);

    assert_eq!(app.get(&uri).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&uri).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_default_delete_orphans_wizards() {
    let app = TestApp::new();
    let category = app.create_category("Wizard Town", &[]).await;
    let wizard = app.create_wizard("Gandalf", &id_of(&category)).await;

    let response = app
        .delete(&format!("/api/categorys/{}", id_of(&category)))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let orphan = app.get(&format!("/api/wizards/{}", id_of(&wizard))).await;
    assert_eq!(orphan.status, StatusCode::OK);
    assert_eq!(orphan.body["categoryId"], category["id"]);
    assert!(orphan.body["category"].is_null());
}

#[tokio::test]
async fn test_restrict_delete_with_wizards_is_409() {
    let app = TestApp::with_policy(CategoryDeletePolicy::Restrict);
    let category = app.create_category("Wizard Town", &[]).await;
    let wizard = app.create_wizard("Gandalf", &id_of(&category)).await;
    let uri = format!("/api/categorys/{}", id_of(&category));

    assert_eq!(app.delete(&uri).await.status, StatusCode::CONFLICT);

    app.delete(&format!("/api/wizards/{}", id_of(&wizard))).await;
    assert_eq!(app.delete(&uri).await.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_cascade_delete_removes_wizards() {
    let app = TestApp::with_policy(CategoryDeletePolicy::Cascade);
    let category = app.create_category("Wizard Town", &[]).await;
    let wizard = app.create_wizard("Gandalf", &id_of(&category)).await;

    let response = app
        .delete(&format!("/api/categorys/{}", id_of(&category)))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let gone = app.get(&format!("/api/wizards/{}", id_of(&wizard))).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/api/wizards").await.body["count"], 0);
}
