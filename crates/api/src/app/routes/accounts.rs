use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;

use courseadmin_auth::{RegisterUser, RoleRecord, UserView};
use courseadmin_core::UserId;

use crate::app::errors::ApiResult;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/update_role/:id", post(update_roles))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterUser>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    let user = services.accounts.register(body, Utc::now())?;
    Ok((StatusCode::CREATED, Json(user.view())))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<UserView>>> {
    let users = services.accounts.list()?;
    Ok(Json(users.iter().map(|u| u.view()).collect()))
}

/// Replace a user's roles with the listed names (short or canonical form).
pub async fn update_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(names): Json<Vec<String>>,
) -> ApiResult<Json<UserView>> {
    let id: UserId = id.parse()?;
    let user = services.accounts.update_roles(id, &names)?;
    Ok(Json(user.view()))
}

pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<RoleRecord>>> {
    Ok(Json(services.roles.list()?))
}
