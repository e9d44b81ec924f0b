use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{LedgerEntry, ReasonCode, Redemption, RewardItem};
use crate::repository::{LedgerStore, RewardStore, Store};
use crate::services::{EntityLocks, PointsLedger};

/// Input for a new catalog entry
#[derive(Debug, Clone)]
pub struct NewReward {
    pub title: String,
    pub description: String,
    pub point_cost: i64,
    pub sponsor: String,
    pub category: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

/// Reward catalog and point redemption
///
/// A redemption debits the ledger and records the redemption as one atomic
/// store write; at most one redemption exists per (user, reward).
#[derive(Clone)]
pub struct RedemptionService {
    store: Arc<dyn Store>,
    locks: Arc<EntityLocks>,
}

impl RedemptionService {
    pub fn new(store: Arc<dyn Store>, locks: Arc<EntityLocks>) -> Self {
        Self { store, locks }
    }

    pub async fn create_reward(&self, new: NewReward) -> Result<RewardItem> {
        if new.point_cost <= 0 {
            return Err(AppError::Validation(
                "reward point cost must be positive".to_string(),
            ));
        }
        if new.valid_until < new.valid_from {
            return Err(AppError::Validation(
                "reward validity window ends before it starts".to_string(),
            ));
        }

        let reward = RewardItem::new(
            new.title,
            new.description,
            new.point_cost,
            new.sponsor,
            new.category,
            new.valid_from,
            new.valid_until,
        );
        self.store.insert_reward(&reward).await?;

        tracing::info!(
            reward_id = %reward.id,
            sponsor = %reward.sponsor,
            point_cost = reward.point_cost,
            "reward published"
        );
        Ok(reward)
    }

    pub async fn catalog(&self) -> Result<Vec<RewardItem>> {
        self.store.list_rewards().await
    }

    /// Redeem a reward for the user as of `now`. Returns the redemption and
    /// the user's new balance.
    pub async fn redeem(
        &self,
        user_id: Uuid,
        reward_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(Redemption, i64)> {
        let _guard = self.locks.acquire(user_id).await;

        let reward = self
            .store
            .reward_by_id(reward_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("reward {reward_id}")))?;

        if !reward.is_valid_at(now) {
            return Err(AppError::RewardExpired { reward_id });
        }
        if self.store.redemption(user_id, reward_id).await?.is_some() {
            return Err(AppError::AlreadyRedeemed { reward_id, user_id });
        }

        let balance = self.store.balance(user_id).await?;
        PointsLedger::guard_debit(user_id, balance, -reward.point_cost)?;

        let redemption = Redemption::new(user_id, reward_id);
        let debit = LedgerEntry::new(user_id, -reward.point_cost, ReasonCode::RewardRedeemed);
        let new_balance = self.store.record_redemption(&redemption, &debit).await?;

        tracing::info!(
            user_id = %user_id,
            reward_id = %reward_id,
            point_cost = reward.point_cost,
            balance = new_balance,
            "reward redeemed"
        );
        Ok((redemption, new_balance))
    }

    pub async fn redemptions(&self, user_id: Uuid) -> Result<Vec<Redemption>> {
        self.store.redemptions_for_user(user_id).await
    }
}
