//! Response helpers shared by the resource handlers.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Routes that "created at" responses can point to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteName {
    GetAddress,
    GetUser,
}

impl RouteName {
    /// Path of the resource with `id` under this route.
    pub fn path(self, id: i32) -> String {
        match self {
            RouteName::GetAddress => format!("/api/address/{id}"),
            RouteName::GetUser => format!("/api/user/{id}"),
        }
    }
}

/// 201 Created with a `Location` header resolved from a named route.
#[derive(Debug)]
pub struct CreatedAtRoute<T> {
    route: RouteName,
    id: i32,
    body: T,
}

impl<T> CreatedAtRoute<T> {
    pub fn new(route: RouteName, id: i32, body: T) -> Self {
        Self { route, id, body }
    }

    pub fn location(&self) -> String {
        self.route.path(self.id)
    }
}

impl<T: Serialize> IntoResponse for CreatedAtRoute<T> {
    fn into_response(self) -> Response {
        let location = self.location();
        (
            StatusCode::CREATED,
            [(header::LOCATION, location)],
            Json(self.body),
        )
            .into_response()
    }
}
