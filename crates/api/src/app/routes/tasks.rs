use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;

use courseadmin_core::{ModuleId, TaskId};
use courseadmin_courses::{Task, TaskDraft};

use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::SecurityContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_task))
        .route("/student", get(my_tasks))
        .route("/module/:module_id", get(tasks_of_module))
        .route("/:id", get(get_task).put(update_task).delete(delete_task))
}

pub async fn create_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Json(body): Json<TaskDraft>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let caller = ctx.current_user_id()?;
    let task = services.tasks.create(caller, body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Tasks the caller has assignments for.
pub async fn my_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let caller = ctx.current_user_id()?;
    Ok(Json(services.tasks.for_student(caller)?))
}

pub async fn tasks_of_module(
    Extension(services): Extension<Arc<AppServices>>,
    Path(module_id): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let module_id: ModuleId = module_id.parse()?;
    Ok(Json(services.tasks.of_module(module_id)?))
}

pub async fn get_task(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id: TaskId = id.parse()?;
    Ok(Json(services.tasks.get(id)?))
}

pub async fn update_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
    Json(body): Json<TaskDraft>,
) -> ApiResult<Json<Task>> {
    let caller = ctx.current_user_id()?;
    let id: TaskId = id.parse()?;
    Ok(Json(services.tasks.update(caller, id, body)?))
}

pub async fn delete_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let caller = ctx.current_user_id()?;
    let id: TaskId = id.parse()?;
    services.tasks.delete(caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}
