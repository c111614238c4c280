use std::sync::Arc;

use axum::{
    Extension, Json,
    http::{HeaderMap, HeaderValue, header::AUTHORIZATION},
};
use chrono::Utc;

use crate::app::dto::{LoginRequest, LoginResponse};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;

/// Exchange credentials for a bearer token.
///
/// The token is returned in the `Authorization` header and echoed in the body.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<LoginResponse>)> {
    let outcome = services
        .authenticator
        .login(&body.username, &body.password, Utc::now())?;

    let mut headers = HeaderMap::new();
    // Compact JWS is base64url with dots, always a valid header value.
    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", outcome.token.token)) {
        headers.insert(AUTHORIZATION, value);
    }

    Ok((
        headers,
        Json(LoginResponse {
            token: outcome.token.token,
            username: outcome.principal.username,
            message: "login successful".to_string(),
        }),
    ))
}
