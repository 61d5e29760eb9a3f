//! Common test utilities for integration tests.
//!
//! The router is driven in-process with `oneshot` against the in-memory storage
//! backend, so no database is needed.

// Not every suite uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use fake::faker::address::raw::{BuildingNumber, CityName, PostCode, StreetName};
use fake::faker::internet::raw::SafeEmail;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use fake::Fake;
use persistence::db::DatabaseConfig;
use persistence::entities::{AddressEntity, UserEntity};
use persistence::storage::{MemoryStorage, Storage};
use roster_api::{
    app::create_app,
    config::{Config, LoggingConfig, SecurityConfig, ServerConfig},
};
use serde_json::{json, Value};

/// Test configuration pointing at the in-memory backend.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: "memory://".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig::default(),
    }
}

/// Create a test application router over the given storage.
pub fn create_test_app(storage: Arc<MemoryStorage>) -> Router {
    create_app(test_config(), storage)
}

/// Create a test application router over empty storage.
pub fn create_empty_app() -> (Router, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (create_test_app(storage.clone()), storage)
}

/// Build a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a request with a raw body and JSON content type.
pub fn raw_json_request(method: Method, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Build a GET request.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a DELETE request.
pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Raw response body bytes.
pub async fn response_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Number of addresses currently stored.
pub async fn stored_address_count(storage: &MemoryStorage) -> usize {
    storage.fetch_addresses().await.unwrap().len()
}

/// Number of users currently stored.
pub async fn stored_user_count(storage: &MemoryStorage) -> usize {
    storage.fetch_users().await.unwrap().len()
}

/// Test address data.
#[derive(Debug, Clone)]
pub struct TestAddress {
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub post_code: String,
}

impl TestAddress {
    pub fn new() -> Self {
        let number: String = BuildingNumber(EN).fake();
        let street: String = StreetName(EN).fake();
        Self {
            address_line1: format!("{number} {street}"),
            address_line2: format!("Unit {}", (1u32..500).fake::<u32>()),
            address_line3: CityName(EN).fake(),
            post_code: PostCode(EN).fake(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "addressLine1": self.address_line1,
            "addressLine2": self.address_line2,
            "addressLine3": self.address_line3,
            "postCode": self.post_code,
        })
    }

    pub fn to_entity(&self) -> AddressEntity {
        AddressEntity {
            id: 0,
            address_line1: Some(self.address_line1.clone()),
            address_line2: Some(self.address_line2.clone()),
            address_line3: Some(self.address_line3.clone()),
            post_code: Some(self.post_code.clone()),
        }
    }
}

impl Default for TestAddress {
    fn default() -> Self {
        Self::new()
    }
}

/// Test user data.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address_id: Option<i32>,
}

impl TestUser {
    pub fn new() -> Self {
        Self {
            first_name: FirstName(EN).fake(),
            last_name: LastName(EN).fake(),
            email: SafeEmail(EN).fake(),
            address_id: None,
        }
    }

    pub fn with_address(mut self, address_id: i32) -> Self {
        self.address_id = Some(address_id);
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "addressId": self.address_id,
        })
    }

    pub fn to_entity(&self) -> UserEntity {
        UserEntity {
            id: 0,
            first_name: Some(self.first_name.clone()),
            middle_name: None,
            last_name: Some(self.last_name.clone()),
            email: Some(self.email.clone()),
            address_id: self.address_id,
        }
    }
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new()
    }
}
