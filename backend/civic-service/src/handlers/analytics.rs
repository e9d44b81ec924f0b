use actix_web::{get, web, HttpResponse};

use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::services::AuthenticatedUser;

#[get("/analytics/summary")]
pub async fn summary(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse> {
    if !caller.role.is_admin() {
        return Err(AppError::Unauthorized(
            "analytics are restricted to admins".to_string(),
        ));
    }

    let stats = state.reports.stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}
