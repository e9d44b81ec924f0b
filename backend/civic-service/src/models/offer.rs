use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// Exchangeable waste categories and their per-kg point rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "waste_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    Plastic,
    Paper,
    Metal,
    Glass,
    Electronic,
    Organic,
}

impl WasteCategory {
    /// Points credited per kilogram when an offer in this category is claimed
    pub fn points_per_kg(&self) -> i64 {
        match self {
            WasteCategory::Plastic => 5,
            WasteCategory::Paper => 3,
            WasteCategory::Metal => 10,
            WasteCategory::Glass => 8,
            WasteCategory::Electronic => 20,
            WasteCategory::Organic => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Plastic => "plastic",
            WasteCategory::Paper => "paper",
            WasteCategory::Metal => "metal",
            WasteCategory::Glass => "glass",
            WasteCategory::Electronic => "electronic",
            WasteCategory::Organic => "organic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "offer_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Available,
    Claimed,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Available => "available",
            OfferStatus::Claimed => "claimed",
        }
    }
}

/// Marketplace listing of recyclable waste. Transitions to `claimed` exactly
/// once; the claim credits `point_value` to the owner's balance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WasteOffer {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub category: WasteCategory,
    pub quantity_kg: i32,
    pub point_value: i64,
    pub status: OfferStatus,
    pub claimant_id: Option<Uuid>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl WasteOffer {
    pub fn new(
        owner_id: Uuid,
        title: String,
        category: WasteCategory,
        quantity_kg: i32,
        location: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            category,
            quantity_kg,
            point_value: category.points_per_kg() * i64::from(quantity_kg),
            status: OfferStatus::Available,
            claimant_id: None,
            location,
            created_at: Utc::now(),
            claimed_at: None,
        }
    }

    /// Mark the offer claimed. Fails without mutating anything if the offer
    /// is no longer available or the claimant is the owner.
    pub fn claim(&mut self, claimant_id: Uuid) -> Result<(), AppError> {
        if self.status != OfferStatus::Available {
            return Err(AppError::AlreadyClaimed { offer_id: self.id });
        }
        if claimant_id == self.owner_id {
            return Err(AppError::SelfClaim { offer_id: self.id });
        }

        self.status = OfferStatus::Claimed;
        self.claimant_id = Some(claimant_id);
        self.claimed_at = Some(Utc::now());
        Ok(())
    }
}
