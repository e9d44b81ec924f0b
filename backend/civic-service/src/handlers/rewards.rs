use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::services::{AuthenticatedUser, NewReward};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRewardPayload {
    #[validate(length(min = 1, max = 120))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(range(min = 1))]
    pub point_cost: i64,

    #[validate(length(min = 1, max = 80))]
    pub sponsor: String,

    #[validate(length(min = 1, max = 80))]
    pub category: String,

    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

#[get("/rewards")]
pub async fn list_rewards(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
) -> Result<HttpResponse> {
    let rewards = state.rewards.catalog().await?;
    Ok(HttpResponse::Ok().json(rewards))
}

#[post("/rewards")]
pub async fn create_reward(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateRewardPayload>,
) -> Result<HttpResponse> {
    if !caller.role.is_admin() {
        return Err(AppError::Unauthorized(
            "only admins may publish rewards".to_string(),
        ));
    }
    payload.validate()?;

    let payload = payload.into_inner();
    let reward = state
        .rewards
        .create_reward(NewReward {
            title: payload.title,
            description: payload.description,
            point_cost: payload.point_cost,
            sponsor: payload.sponsor,
            category: payload.category,
            valid_from: payload.valid_from,
            valid_until: payload.valid_until,
        })
        .await?;
    Ok(HttpResponse::Created().json(reward))
}

#[post("/rewards/{reward_id}/redeem")]
pub async fn redeem_reward(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    reward_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let (redemption, new_balance) = state
        .rewards
        .redeem(caller.id, reward_id.into_inner(), Utc::now())
        .await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "redemption": redemption,
        "new_balance": new_balance,
    })))
}

#[get("/redemptions")]
pub async fn list_redemptions(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse> {
    let redemptions = state.rewards.redemptions(caller.id).await?;
    Ok(HttpResponse::Ok().json(redemptions))
}
