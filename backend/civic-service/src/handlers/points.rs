use actix_web::{get, web, HttpResponse};

use crate::app_state::AppState;
use crate::error::Result;
use crate::services::AuthenticatedUser;

#[get("/points/balance")]
pub async fn get_balance(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse> {
    let balance = state.ledger.balance(caller.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user_id": caller.id,
        "balance": balance,
    })))
}

#[get("/points/history")]
pub async fn get_history(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse> {
    let entries = state.ledger.history(caller.id).await?;
    let balance = state.ledger.balance(caller.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user_id": caller.id,
        "balance": balance,
        "entries": entries,
    })))
}
