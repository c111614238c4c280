use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;

use courseadmin_core::{AssignmentId, DomainError, DomainResult, TaskId};
use courseadmin_courses::{Assignment, AssignmentChange, AssignmentDraft, Submission};

use crate::app::dto::GradeQuery;
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::SecurityContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_assignment))
        .route("/student", get(my_assignments))
        .route("/task/:task_id", get(assignments_of_task))
        .route("/tasks/:task_id/submit", post(submit_task))
        .route(
            "/:id",
            get(get_assignment).put(update_assignment).delete(delete_assignment),
        )
        .route("/:id/submit", post(grade_assignment))
}

pub async fn create_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Json(body): Json<AssignmentDraft>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    let caller = ctx.current_user_id()?;
    let assignment = services.assignments.create(caller, body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Student submission. An empty body submits without a score; a body that is
/// present must be a valid submission.
pub async fn submit_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(task_id): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    let caller = ctx.current_user_id()?;
    let task_id: TaskId = task_id.parse()?;
    let submission = parse_submission(&body)?;
    let assignment = services
        .assignments
        .submit(caller, task_id, submission, Utc::now())?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

fn parse_submission(body: &[u8]) -> DomainResult<Submission> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Submission::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| DomainError::validation(format!("invalid submission body: {err}")))
}

/// Teacher grading: sets the score and completes the assignment.
pub async fn grade_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
    Query(query): Query<GradeQuery>,
) -> ApiResult<Json<Assignment>> {
    let caller = ctx.current_user_id()?;
    let id: AssignmentId = id.parse()?;
    Ok(Json(services.assignments.grade(caller, id, query.score, Utc::now())?))
}

pub async fn my_assignments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
) -> ApiResult<Json<Vec<Assignment>>> {
    let caller = ctx.current_user_id()?;
    Ok(Json(services.assignments.mine(caller)?))
}

pub async fn assignments_of_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Vec<Assignment>>> {
    let caller = ctx.current_user_id()?;
    let task_id: TaskId = task_id.parse()?;
    Ok(Json(services.assignments.of_task(caller, task_id)?))
}

pub async fn get_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Assignment>> {
    let caller = ctx.current_user_id()?;
    let id: AssignmentId = id.parse()?;
    Ok(Json(services.assignments.get(caller, id)?))
}

pub async fn update_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
    Json(body): Json<AssignmentChange>,
) -> ApiResult<Json<Assignment>> {
    let caller = ctx.current_user_id()?;
    let id: AssignmentId = id.parse()?;
    Ok(Json(services.assignments.update(caller, id, body, Utc::now())?))
}

pub async fn delete_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let caller = ctx.current_user_id()?;
    let id: AssignmentId = id.parse()?;
    services.assignments.delete(caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}
