use axum::{Extension, Json};

use crate::app::dto::WhoAmI;
use crate::app::errors::ApiResult;
use crate::context::SecurityContext;

pub async fn whoami(Extension(ctx): Extension<SecurityContext>) -> ApiResult<Json<WhoAmI>> {
    let principal = ctx.require_principal()?;
    Ok(Json(WhoAmI::from(principal)))
}
