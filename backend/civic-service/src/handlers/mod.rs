use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::services::AuthenticatedUser;

pub mod analytics;
pub mod auth;
pub mod health;
pub mod offers;
pub mod points;
pub mod reports;
pub mod rewards;

/// Recover the caller from the `Authorization: Bearer` header. Handlers take
/// `AuthenticatedUser` as an argument to require a valid session.
impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state missing".to_string()))?;

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Authentication("missing Authorization header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Authentication("invalid Authorization scheme, expected Bearer".to_string())
    })?;

    state.sessions.verify(token)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health).service(
        web::scope("/api/v1")
            .service(auth::register)
            .service(auth::login)
            .service(auth::me)
            .service(reports::create_report)
            .service(reports::list_reports)
            .service(reports::get_report)
            .service(reports::update_report_status)
            .service(reports::escalate_report)
            .service(reports::upvote_report)
            .service(reports::add_comment)
            .service(reports::list_comments)
            .service(points::get_balance)
            .service(points::get_history)
            .service(offers::create_offer)
            .service(offers::list_offers)
            .service(offers::claim_offer)
            .service(rewards::list_rewards)
            .service(rewards::create_reward)
            .service(rewards::redeem_reward)
            .service(rewards::list_redemptions)
            .service(analytics::summary),
    );
}
