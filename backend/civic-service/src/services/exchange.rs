use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{LedgerEntry, OfferStatus, ReasonCode, WasteCategory, WasteOffer};
use crate::repository::{OfferStore, Store};
use crate::services::EntityLocks;

/// Input for a new marketplace listing
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub title: String,
    pub category: WasteCategory,
    pub quantity_kg: i32,
    pub location: String,
}

/// Result of a successful claim. The credit goes to the offer's owner, not
/// the claimant.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub offer: WasteOffer,
    pub credited: i64,
    pub owner_balance: i64,
}

/// Waste offer marketplace
#[derive(Clone)]
pub struct WasteExchange {
    store: Arc<dyn Store>,
    locks: Arc<EntityLocks>,
}

impl WasteExchange {
    pub fn new(store: Arc<dyn Store>, locks: Arc<EntityLocks>) -> Self {
        Self { store, locks }
    }

    pub async fn create_offer(&self, owner_id: Uuid, new: NewOffer) -> Result<WasteOffer> {
        if new.quantity_kg <= 0 {
            return Err(AppError::Validation(
                "offer quantity must be positive".to_string(),
            ));
        }

        let offer = WasteOffer::new(
            owner_id,
            new.title,
            new.category,
            new.quantity_kg,
            new.location,
        );
        self.store.insert_offer(&offer).await?;

        tracing::info!(
            offer_id = %offer.id,
            owner_id = %owner_id,
            category = offer.category.as_str(),
            point_value = offer.point_value,
            "waste offer listed"
        );
        Ok(offer)
    }

    pub async fn get(&self, id: Uuid) -> Result<WasteOffer> {
        self.store
            .offer_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("offer {id}")))
    }

    pub async fn list(&self, status: Option<OfferStatus>) -> Result<Vec<WasteOffer>> {
        self.store.list_offers(status).await
    }

    /// Claim an available offer. Credits `point_value` to the owner's ledger
    /// and records the claimant; at most one claim ever succeeds.
    pub async fn claim(&self, offer_id: Uuid, claimant_id: Uuid) -> Result<ClaimOutcome> {
        let _guard = self.locks.acquire(offer_id).await;

        let mut offer = self.get(offer_id).await?;
        offer.claim(claimant_id)?;

        let credit = LedgerEntry::new(offer.owner_id, offer.point_value, ReasonCode::WasteClaimed);
        let owner_balance = self.store.record_claim(&offer, &credit).await?;

        tracing::info!(
            offer_id = %offer_id,
            owner_id = %offer.owner_id,
            claimant_id = %claimant_id,
            credited = offer.point_value,
            "waste offer claimed"
        );
        Ok(ClaimOutcome {
            credited: offer.point_value,
            owner_balance,
            offer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;
    use crate::services::PointsLedger;

    fn setup() -> (WasteExchange, PointsLedger) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let locks = Arc::new(EntityLocks::new());
        (
            WasteExchange::new(store.clone(), locks.clone()),
            PointsLedger::new(store, locks),
        )
    }

    fn listing() -> NewOffer {
        NewOffer {
            title: "E-waste bundle".to_string(),
            category: WasteCategory::Electronic,
            quantity_kg: 2,
            location: "Indiranagar, Bangalore".to_string(),
        }
    }

    #[tokio::test]
    async fn test_claim_credits_owner_not_claimant() {
        let (exchange, ledger) = setup();
        let owner = Uuid::new_v4();
        let claimant = Uuid::new_v4();

        let offer = exchange.create_offer(owner, listing()).await.unwrap();
        assert_eq!(offer.point_value, 40);

        let outcome = exchange.claim(offer.id, claimant).await.unwrap();
        assert_eq!(outcome.credited, 40);
        assert_eq!(outcome.owner_balance, 40);
        assert_eq!(outcome.offer.status, OfferStatus::Claimed);

        assert_eq!(ledger.balance(owner).await.unwrap(), 40);
        assert_eq!(ledger.balance(claimant).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_second_claim_fails() {
        let (exchange, _) = setup();
        let owner = Uuid::new_v4();

        let offer = exchange.create_offer(owner, listing()).await.unwrap();
        exchange.claim(offer.id, Uuid::new_v4()).await.unwrap();

        let err = exchange.claim(offer.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyClaimed { .. }));
    }

    #[tokio::test]
    async fn test_self_claim_mutates_nothing() {
        let (exchange, ledger) = setup();
        let owner = Uuid::new_v4();

        let offer = exchange.create_offer(owner, listing()).await.unwrap();
        let err = exchange.claim(offer.id, owner).await.unwrap_err();
        assert!(matches!(err, AppError::SelfClaim { .. }));

        let offer = exchange.get(offer.id).await.unwrap();
        assert_eq!(offer.status, OfferStatus::Available);
        assert!(offer.claimant_id.is_none());
        assert_eq!(ledger.balance(owner).await.unwrap(), 0);
    }
}
