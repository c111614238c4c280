use axum::{
    Router,
    routing::{get, post},
};

pub mod accounts;
pub mod assignments;
pub mod courses;
pub mod enrollments;
pub mod modules;
pub mod session;
pub mod system;
pub mod tasks;

/// Router for every endpoint. Access rules live in `crate::authz`.
pub fn router() -> Router {
    Router::new()
        .route("/login", post(session::login))
        .route("/whoami", get(system::whoami))
        .route("/api/v1/register", post(accounts::register))
        .route("/api/v1/roles", get(accounts::list_roles))
        .nest("/api/v1/users", accounts::router())
        .nest("/api/v1/courses", courses::router())
        .nest("/api/v1/modules", modules::router())
        .nest("/api/v1/tasks", tasks::router())
        .nest("/api/v1/enrollments", enrollments::router())
        .nest("/api/v1/assignments", assignments::router())
}
