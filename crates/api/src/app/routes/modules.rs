use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;

use courseadmin_core::{CourseId, ModuleId};
use courseadmin_courses::{Module, ModuleDraft};

use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::SecurityContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_modules).post(create_module))
        .route("/course/:course_id", get(modules_of_course))
        .route("/:id", get(get_module).put(update_module).delete(delete_module))
}

pub async fn create_module(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Json(body): Json<ModuleDraft>,
) -> ApiResult<(StatusCode, Json<Module>)> {
    let caller = ctx.current_user_id()?;
    let module = services.modules.create(caller, body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(module)))
}

pub async fn list_modules(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<Module>>> {
    Ok(Json(services.modules.list()?))
}

pub async fn modules_of_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<Vec<Module>>> {
    let course_id: CourseId = course_id.parse()?;
    Ok(Json(services.modules.of_course(course_id)?))
}

pub async fn get_module(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Module>> {
    let id: ModuleId = id.parse()?;
    Ok(Json(services.modules.get(id)?))
}

pub async fn update_module(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
    Json(body): Json<ModuleDraft>,
) -> ApiResult<Json<Module>> {
    let caller = ctx.current_user_id()?;
    let id: ModuleId = id.parse()?;
    Ok(Json(services.modules.update(caller, id, body)?))
}

pub async fn delete_module(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let caller = ctx.current_user_id()?;
    let id: ModuleId = id.parse()?;
    services.modules.delete(caller, id)?;
    Ok(StatusCode::NO_CONTENT)
}
