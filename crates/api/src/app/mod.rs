//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and service wiring shared by every handler
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response bodies without a domain counterpart
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use courseadmin_core::DomainResult;

use crate::authz;
use crate::config::{ApiConfig, CorsOrigins};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Creates the in-memory stores and the optional bootstrap administrator.
pub fn build_app(config: &ApiConfig) -> DomainResult<Router> {
    let services = AppServices::in_memory(&config.signing_key)?;
    if let Some(admin) = &config.bootstrap_admin {
        services.bootstrap_admin(admin)?;
    }
    Ok(build_router(Arc::new(services), &config.cors_origins))
}

/// Router over already wired services.
///
/// Request flow: tracing, CORS, bearer validation, role gate, handler.
pub fn build_router(services: Arc<AppServices>, cors: &CorsOrigins) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
    };

    routes::router()
        .layer(axum::middleware::from_fn(authz::role_gate))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors)),
        )
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().filter_map(|origin| {
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring unusable CORS origin");
                    None
                }
            }
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([AUTHORIZATION])
}
