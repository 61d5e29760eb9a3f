//! Integration tests for the user endpoints.

mod common;

use std::sync::Arc;

use axum::http::{header, Method, StatusCode};
use common::{
    create_empty_app, create_test_app, delete_request, get_request, json_request,
    parse_response_body, raw_json_request, response_bytes, stored_user_count, TestUser,
};
use persistence::storage::{MemoryStorage, Storage};
use serde_json::json;
use tower::ServiceExt;

fn seeded_storage(users: &[TestUser]) -> Arc<MemoryStorage> {
    let entities = users.iter().map(TestUser::to_entity).collect();
    Arc::new(MemoryStorage::with_data(vec![], entities))
}

#[tokio::test]
async fn test_create_then_get_user() {
    let (app, _) = create_empty_app();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/user",
            json!({"FirstName": "A", "LastName": "B", "Email": "a@b.com", "AddressId": 2}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let created = parse_response_body(response).await;
    let id = created["id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(location, format!("/api/user/{id}"));

    let response = app.oneshot(get_request(&location)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["firstName"], "A");
    assert_eq!(body["lastName"], "B");
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["addressId"], 2);
    assert!(body["middleName"].is_null());
}

#[tokio::test]
async fn test_create_user_with_unknown_address() {
    let (app, storage) = create_empty_app();
    let user = TestUser::new().with_address(404);

    let response = app
        .oneshot(json_request(Method::POST, "/api/user", user.to_json()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let stored = storage.fetch_user(1).await.unwrap().unwrap();
    assert_eq!(stored.address_id, Some(404));
    assert_eq!(stored.email.as_deref(), Some(user.email.as_str()));
}

#[tokio::test]
async fn test_create_identical_users_are_both_stored() {
    let (app, storage) = create_empty_app();
    let user = TestUser::new();

    for expected_id in 1..=2 {
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/user", user.to_json()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = parse_response_body(response).await;
        assert_eq!(body["id"], expected_id);
    }

    assert_eq!(stored_user_count(&storage).await, 2);
}

#[tokio::test]
async fn test_create_user_null_body() {
    let (app, storage) = create_empty_app();

    let response = app
        .oneshot(raw_json_request(Method::POST, "/api/user", "null"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response_bytes(response).await.is_empty());
    assert_eq!(stored_user_count(&storage).await, 0);
}

#[tokio::test]
async fn test_create_user_save_failure() {
    let (app, storage) = create_empty_app();
    storage.report_failed_commits(true);

    let response = app
        .oneshot(json_request(Method::POST, "/api/user", TestUser::new().to_json()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "An internal error occurred");
    assert_eq!(stored_user_count(&storage).await, 0);
}

#[tokio::test]
async fn test_list_users() {
    let users = vec![TestUser::new(), TestUser::new().with_address(1)];
    let app = create_test_app(seeded_storage(&users));

    let response = app.oneshot(get_request("/api/user")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["firstName"], users[0].first_name.as_str());
    assert!(list[0]["addressId"].is_null());
    assert_eq!(list[1]["addressId"], 1);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let app = create_test_app(seeded_storage(&[TestUser::new()]));

    let response = app.oneshot(get_request("/api/user/2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_update_user() {
    let storage = seeded_storage(&[TestUser::new().with_address(3)]);
    let app = create_test_app(storage.clone());
    let request_body = json!({
        "firstName": "Ada",
        "middleName": "King",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "addressId": null
    });

    let response = app
        .oneshot(json_request(Method::PUT, "/api/user/1", request_body.clone()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/api/user/1"
    );
    let body = parse_response_body(response).await;
    assert_eq!(body, request_body);

    let stored = storage.fetch_user(1).await.unwrap().unwrap();
    assert_eq!(stored.first_name.as_deref(), Some("Ada"));
    assert_eq!(stored.middle_name.as_deref(), Some("King"));
    assert!(stored.address_id.is_none());
}

#[tokio::test]
async fn test_update_user_not_found() {
    let (app, _) = create_empty_app();

    let response = app
        .oneshot(json_request(Method::PUT, "/api/user/9", TestUser::new().to_json()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_user_null_body() {
    let app = create_test_app(seeded_storage(&[TestUser::new()]));

    let response = app
        .oneshot(raw_json_request(Method::PUT, "/api/user/1", "null"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user_save_failure() {
    let user = TestUser::new();
    let storage = seeded_storage(&[user.clone()]);
    storage.report_failed_commits(true);
    let app = create_test_app(storage.clone());

    let response = app
        .oneshot(json_request(Method::PUT, "/api/user/1", TestUser::new().to_json()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let stored = storage.fetch_user(1).await.unwrap().unwrap();
    assert_eq!(stored.email.as_deref(), Some(user.email.as_str()));
}

#[tokio::test]
async fn test_delete_user() {
    let storage = seeded_storage(&[TestUser::new(), TestUser::new()]);
    let app = create_test_app(storage.clone());

    let response = app.oneshot(delete_request("/api/user/2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(storage.fetch_user(2).await.unwrap().is_none());
    assert_eq!(stored_user_count(&storage).await, 1);
}

#[tokio::test]
async fn test_delete_user_not_found() {
    let storage = seeded_storage(&[TestUser::new()]);
    let app = create_test_app(storage.clone());

    let response = app.oneshot(delete_request("/api/user/7")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(stored_user_count(&storage).await, 1);
}

#[tokio::test]
async fn test_delete_user_save_failure() {
    let storage = seeded_storage(&[TestUser::new()]);
    storage.report_failed_commits(true);
    let app = create_test_app(storage.clone());

    let response = app.oneshot(delete_request("/api/user/1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(stored_user_count(&storage).await, 1);
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let (app, _) = create_empty_app();

    let response = app.oneshot(get_request("/api/user/abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
