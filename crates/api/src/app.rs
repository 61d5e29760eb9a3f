use axum::{middleware, routing::get, Router};
use persistence::storage::Storage;
use persistence::ProgramContext;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::mapping::Mapper;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{addresses, health, users};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: Arc<Config>,
    pub mapper: Mapper,
}

impl AppState {
    /// Fresh persistence context for one request.
    pub fn context(&self) -> ProgramContext {
        ProgramContext::new(Arc::clone(&self.storage))
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(config: Config, storage: Arc<dyn Storage>) -> Router {
    let config = Arc::new(config);
    let cors = cors_layer(&config);

    let state = AppState {
        storage,
        config: config.clone(),
        mapper: Mapper::new(),
    };

    let resource_routes = Router::new()
        .route(
            "/api/address",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            "/api/address/:id",
            get(addresses::get_address)
                .put(addresses::update_address)
                .delete(addresses::delete_address),
        )
        .route("/api/user", get(users::list_users).post(users::create_user))
        .route(
            "/api/user/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        );

    let operational_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(operational_routes)
        .merge(resource_routes)
        // Global middleware (bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
