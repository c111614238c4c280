use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;

use courseadmin_core::CourseId;
use courseadmin_courses::{Course, CourseDraft};

use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::SecurityContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/my_learn", get(my_learning))
        .route("/my_courses", get(my_teaching))
        .route("/:id", get(get_course).put(update_course).delete(delete_course))
}

pub async fn create_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Json(body): Json<CourseDraft>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let caller = ctx.current_user_id()?;
    let course = services.courses.create(caller, body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn list_courses(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(services.courses.list()?))
}

pub async fn my_learning(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
) -> ApiResult<Json<Vec<Course>>> {
    let caller = ctx.current_user_id()?;
    Ok(Json(services.courses.learning(caller)?))
}

pub async fn my_teaching(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
) -> ApiResult<Json<Vec<Course>>> {
    let caller = ctx.current_user_id()?;
    Ok(Json(services.courses.teaching(caller)?))
}

pub async fn get_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Course>> {
    let id: CourseId = id.parse()?;
    Ok(Json(services.courses.get(id)?))
}

pub async fn update_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
    Json(body): Json<CourseDraft>,
) -> ApiResult<Json<Course>> {
    let caller = ctx.current_user_id()?;
    let id: CourseId = id.parse()?;
    Ok(Json(services.courses.update(caller, id, body)?))
}

pub async fn delete_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Course>> {
    let caller = ctx.current_user_id()?;
    let id: CourseId = id.parse()?;
    Ok(Json(services.courses.delete(caller, id)?))
}
