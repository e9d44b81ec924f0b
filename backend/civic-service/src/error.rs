use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("insufficient balance for user {user_id}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        user_id: Uuid,
        balance: i64,
        requested: i64,
    },

    #[error("illegal transition for report {report_id}: {from} -> {to}")]
    IllegalTransition {
        report_id: Uuid,
        from: String,
        to: String,
    },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("reward {reward_id} is outside its validity window")]
    RewardExpired { reward_id: Uuid },

    #[error("reward {reward_id} already redeemed by user {user_id}")]
    AlreadyRedeemed { reward_id: Uuid, user_id: Uuid },

    #[error("offer {offer_id} has already been claimed")]
    AlreadyClaimed { offer_id: Uuid },

    #[error("offer {offer_id} cannot be claimed by its owner")]
    SelfClaim { offer_id: Uuid },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            AppError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::RewardExpired { .. } => "REWARD_EXPIRED",
            AppError::AlreadyRedeemed { .. } => "ALREADY_REDEEMED",
            AppError::AlreadyClaimed { .. } => "ALREADY_CLAIMED",
            AppError::SelfClaim { .. } => "SELF_CLAIM",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Authentication(_) => "AUTHENTICATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Token(_) => "TOKEN_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InsufficientBalance { .. } => StatusCode::CONFLICT,
            AppError::IllegalTransition { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::RewardExpired { .. } => StatusCode::GONE,
            AppError::AlreadyRedeemed { .. } => StatusCode::CONFLICT,
            AppError::AlreadyClaimed { .. } => StatusCode::CONFLICT,
            AppError::SelfClaim { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            AppError::Database(e) => Some(e.to_string()),
            AppError::Token(e) => Some(e.to_string()),
            _ => None,
        };

        let error_response = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            details,
        };

        HttpResponse::build(self.status_code()).json(error_response)
    }
}

// Convert validator errors to AppError
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rejections_are_client_errors() {
        let err = AppError::InsufficientBalance {
            user_id: Uuid::new_v4(),
            balance: 5,
            requested: 50,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");

        let err = AppError::RewardExpired {
            reward_id: Uuid::new_v4(),
        };
        assert_eq!(err.status_code(), StatusCode::GONE);

        let err = AppError::Unauthorized("citizens cannot triage reports".into());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
