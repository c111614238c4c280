//! Route-level role gate.
//!
//! Every route's requirement is declared in [`ROUTE_POLICIES`], keyed by the
//! matched route pattern, so the whole access policy is reviewable in one
//! table. Routes missing from the table require an authenticated principal.

use axum::{
    extract::{MatchedPath, Request},
    http::Method,
    middleware::Next,
    response::Response,
};

use courseadmin_auth::{Access, check_access};

use crate::app::errors::ApiError;
use crate::context::SecurityContext;

const STAFF: &[&str] = &["TEACHER", "ADMIN"];
const ADMIN: &[&str] = &["ADMIN"];

pub const ROUTE_POLICIES: &[(&str, &str, Access)] = &[
    ("POST", "/login", Access::Anonymous),
    ("POST", "/api/v1/register", Access::Anonymous),
    ("GET", "/whoami", Access::Authenticated),
    // users & roles
    ("GET", "/api/v1/users", Access::AnyRole(ADMIN)),
    ("POST", "/api/v1/users/update_role/:id", Access::AnyRole(ADMIN)),
    ("GET", "/api/v1/roles", Access::AnyRole(ADMIN)),
    // courses
    ("GET", "/api/v1/courses", Access::Authenticated),
    ("POST", "/api/v1/courses", Access::AnyRole(STAFF)),
    ("GET", "/api/v1/courses/my_learn", Access::Authenticated),
    ("GET", "/api/v1/courses/my_courses", Access::AnyRole(STAFF)),
    ("GET", "/api/v1/courses/:id", Access::Authenticated),
    ("PUT", "/api/v1/courses/:id", Access::AnyRole(STAFF)),
    ("DELETE", "/api/v1/courses/:id", Access::AnyRole(STAFF)),
    // modules
    ("GET", "/api/v1/modules", Access::AnyRole(ADMIN)),
    ("POST", "/api/v1/modules", Access::AnyRole(STAFF)),
    ("GET", "/api/v1/modules/course/:course_id", Access::Authenticated),
    ("GET", "/api/v1/modules/:id", Access::Authenticated),
    ("PUT", "/api/v1/modules/:id", Access::AnyRole(STAFF)),
    ("DELETE", "/api/v1/modules/:id", Access::AnyRole(STAFF)),
    // tasks
    ("POST", "/api/v1/tasks", Access::AnyRole(STAFF)),
    ("GET", "/api/v1/tasks/student", Access::Authenticated),
    ("GET", "/api/v1/tasks/module/:module_id", Access::Authenticated),
    ("GET", "/api/v1/tasks/:id", Access::Authenticated),
    ("PUT", "/api/v1/tasks/:id", Access::AnyRole(STAFF)),
    ("DELETE", "/api/v1/tasks/:id", Access::AnyRole(STAFF)),
    // enrollments
    ("POST", "/api/v1/enrollments", Access::AnyRole(STAFF)),
    ("GET", "/api/v1/enrollments/all", Access::AnyRole(STAFF)),
    ("GET", "/api/v1/enrollments/students", Access::Authenticated),
    ("POST", "/api/v1/enrollments/courses/:course_id", Access::Authenticated),
    ("GET", "/api/v1/enrollments/courses/:course_id", Access::AnyRole(STAFF)),
    ("DELETE", "/api/v1/enrollments/cancel/:id", Access::Authenticated),
    ("GET", "/api/v1/enrollments/:id", Access::Authenticated),
    ("PUT", "/api/v1/enrollments/:id", Access::AnyRole(STAFF)),
    // assignments
    ("POST", "/api/v1/assignments", Access::AnyRole(STAFF)),
    ("GET", "/api/v1/assignments/student", Access::Authenticated),
    ("GET", "/api/v1/assignments/task/:task_id", Access::AnyRole(STAFF)),
    ("POST", "/api/v1/assignments/tasks/:task_id/submit", Access::Authenticated),
    ("GET", "/api/v1/assignments/:id", Access::Authenticated),
    ("PUT", "/api/v1/assignments/:id", Access::AnyRole(STAFF)),
    ("DELETE", "/api/v1/assignments/:id", Access::AnyRole(STAFF)),
    ("POST", "/api/v1/assignments/:id/submit", Access::AnyRole(STAFF)),
];

/// Access requirement for `method` on the matched route `path`.
pub fn policy_for(method: &Method, path: &str) -> Access {
    ROUTE_POLICIES
        .iter()
        .find(|(m, p, _)| *m == method.as_str() && *p == path)
        .map(|(_, _, access)| *access)
        .unwrap_or(Access::Authenticated)
}

/// Enforce [`ROUTE_POLICIES`] before the handler runs.
///
/// Runs inside the auth middleware, so the security context is present.
/// Unmatched requests fall through to the router's 404.
pub async fn role_gate(req: Request, next: Next) -> Result<Response, ApiError> {
    let Some(path) = req.extensions().get::<MatchedPath>().map(|p| p.as_str().to_string()) else {
        return Ok(next.run(req).await);
    };

    let access = policy_for(req.method(), &path);
    let principal = req
        .extensions()
        .get::<SecurityContext>()
        .and_then(SecurityContext::principal);

    if let Err(err) = check_access(&access, principal) {
        tracing::debug!(method = %req.method(), route = %path, required = ?access, error = %err, "access denied");
        return Err(err.into());
    }

    Ok(next.run(req).await)
}
