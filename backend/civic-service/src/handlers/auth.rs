use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::models::{User, UserRole};
use crate::repository::UserStore;
use crate::services::{AuthenticatedUser, SessionService};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 80))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8))]
    pub password: String,

    pub phone: Option<String>,
    pub pincode: Option<String>,
    pub landmark: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let password_hash = SessionService::hash_password(&payload.password)?;
    let mut user = User::new(
        payload.name.clone(),
        payload.email.to_lowercase(),
        password_hash,
        UserRole::Citizen,
    );
    user.phone = payload.phone.clone();
    user.pincode = payload.pincode.clone();
    user.landmark = payload.landmark.clone();

    state.store.insert_user(&user).await?;
    let access_token = state.sessions.issue(&user)?;

    tracing::info!(user_id = %user.id, "account registered");
    Ok(HttpResponse::Created().json(AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.sessions.token_ttl_secs(),
        user,
    }))
}

#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let user = state
        .store
        .user_by_email(&payload.email.to_lowercase())
        .await?
        .ok_or_else(|| AppError::Authentication("invalid email or password".to_string()))?;

    if !SessionService::verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Authentication(
            "invalid email or password".to_string(),
        ));
    }

    let access_token = state.sessions.issue(&user)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.sessions.token_ttl_secs(),
        user,
    }))
}

#[get("/auth/me")]
pub async fn me(state: web::Data<AppState>, caller: AuthenticatedUser) -> Result<HttpResponse> {
    let user = state
        .store
        .user_by_id(caller.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", caller.id)))?;
    let balance = state.ledger.balance(caller.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user": user,
        "points_balance": balance,
    })))
}
