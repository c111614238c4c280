use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::Utc;

use courseadmin_core::{CourseId, EnrollmentId};
use courseadmin_courses::{Enrollment, EnrollmentDraft};

use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::SecurityContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(enroll))
        .route("/all", get(list_enrollments))
        .route("/students", get(my_enrollments))
        .route("/courses/:course_id", post(self_enroll).get(enrollments_of_course))
        .route("/cancel/:id", delete(cancel_enrollment))
        .route("/:id", get(get_enrollment).put(update_enrollment))
}

/// Staff enrolls a user into a course.
pub async fn enroll(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<EnrollmentDraft>,
) -> ApiResult<(StatusCode, Json<Enrollment>)> {
    let enrollment = services.enrollments.enroll(body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

pub async fn self_enroll(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(course_id): Path<String>,
) -> ApiResult<(StatusCode, Json<Enrollment>)> {
    let caller = ctx.current_user_id()?;
    let course_id: CourseId = course_id.parse()?;
    let enrollment = services.enrollments.self_enroll(caller, course_id, Utc::now())?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

pub async fn list_enrollments(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<Enrollment>>> {
    Ok(Json(services.enrollments.list()?))
}

pub async fn my_enrollments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
) -> ApiResult<Json<Vec<Enrollment>>> {
    let caller = ctx.current_user_id()?;
    Ok(Json(services.enrollments.mine(caller)?))
}

pub async fn enrollments_of_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<Vec<Enrollment>>> {
    let course_id: CourseId = course_id.parse()?;
    Ok(Json(services.enrollments.of_course(course_id)?))
}

pub async fn cancel_enrollment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Enrollment>> {
    let caller = ctx.current_user_id()?;
    let id: EnrollmentId = id.parse()?;
    Ok(Json(services.enrollments.cancel(caller, id)?))
}

pub async fn get_enrollment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Enrollment>> {
    let caller = ctx.current_user_id()?;
    let id: EnrollmentId = id.parse()?;
    Ok(Json(services.enrollments.get(caller, id)?))
}

pub async fn update_enrollment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<String>,
    Json(body): Json<EnrollmentDraft>,
) -> ApiResult<Json<Enrollment>> {
    let caller = ctx.current_user_id()?;
    let id: EnrollmentId = id.parse()?;
    Ok(Json(services.enrollments.update(caller, id, body)?))
}
