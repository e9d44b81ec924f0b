use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::error::Result;
use crate::models::{OfferStatus, WasteCategory};
use crate::services::{AuthenticatedUser, NewOffer};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOfferPayload {
    #[validate(length(min = 1, max = 120))]
    pub title: String,

    pub category: WasteCategory,

    #[validate(range(min = 1))]
    pub quantity_kg: i32,

    #[validate(length(min = 1, max = 200))]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct OfferQuery {
    pub status: Option<OfferStatus>,
}

#[post("/offers")]
pub async fn create_offer(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateOfferPayload>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let payload = payload.into_inner();
    let offer = state
        .exchange
        .create_offer(
            caller.id,
            NewOffer {
                title: payload.title,
                category: payload.category,
                quantity_kg: payload.quantity_kg,
                location: payload.location,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(offer))
}

#[get("/offers")]
pub async fn list_offers(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
    query: web::Query<OfferQuery>,
) -> Result<HttpResponse> {
    let offers = state.exchange.list(query.status).await?;
    Ok(HttpResponse::Ok().json(offers))
}

#[post("/offers/{offer_id}/claim")]
pub async fn claim_offer(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    offer_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state
        .exchange
        .claim(offer_id.into_inner(), caller.id)
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}
