use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{LedgerEntry, ReasonCode};
use crate::repository::{LedgerStore, Store};
use crate::services::EntityLocks;

/// Points ledger over the store
///
/// Owns the non-negativity invariant: a debit that would drive the balance
/// below zero is rejected before anything is written, and the check runs
/// under the user's entity lock.
#[derive(Clone)]
pub struct PointsLedger {
    store: Arc<dyn Store>,
    locks: Arc<EntityLocks>,
}

impl PointsLedger {
    pub fn new(store: Arc<dyn Store>, locks: Arc<EntityLocks>) -> Self {
        Self { store, locks }
    }

    /// Reject a debit the balance cannot cover. Shared with the redemption
    /// path, which performs its own atomic write after the same check.
    pub(crate) fn guard_debit(user_id: Uuid, balance: i64, amount: i64) -> Result<()> {
        if amount < 0 && balance + amount < 0 {
            return Err(AppError::InsufficientBalance {
                user_id,
                balance,
                requested: -amount,
            });
        }
        Ok(())
    }

    /// Apply a signed delta and return the new balance. Each call appends a
    /// fresh immutable entry; there is no deduplication.
    pub async fn apply_delta(
        &self,
        user_id: Uuid,
        amount: i64,
        reason: ReasonCode,
    ) -> Result<i64> {
        let _guard = self.locks.acquire(user_id).await;

        let balance = self.store.balance(user_id).await?;
        Self::guard_debit(user_id, balance, amount)?;

        let entry = LedgerEntry::new(user_id, amount, reason);
        let new_balance = self.store.append_entry(&entry).await?;

        tracing::debug!(
            user_id = %user_id,
            amount,
            reason = reason.as_str(),
            balance = new_balance,
            "ledger entry appended"
        );
        Ok(new_balance)
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<i64> {
        self.store.balance(user_id).await
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        self.store.entries(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    fn ledger() -> PointsLedger {
        PointsLedger::new(
            Arc::new(MemoryStore::new()),
            Arc::new(EntityLocks::new()),
        )
    }

    #[tokio::test]
    async fn test_balance_tracks_entry_sum() {
        let ledger = ledger();
        let user_id = Uuid::new_v4();

        assert_eq!(
            ledger
                .apply_delta(user_id, 5, ReasonCode::ReportSubmitted)
                .await
                .unwrap(),
            5
        );
        assert_eq!(
            ledger
                .apply_delta(user_id, 20, ReasonCode::WasteClaimed)
                .await
                .unwrap(),
            25
        );
        assert_eq!(
            ledger
                .apply_delta(user_id, -10, ReasonCode::RewardRedeemed)
                .await
                .unwrap(),
            15
        );

        let entries = ledger.history(user_id).await.unwrap();
        let sum: i64 = entries.iter().map(|e| e.amount).sum();
        assert_eq!(sum, ledger.balance(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_overdraw_rejected_and_state_unchanged() {
        let ledger = ledger();
        let user_id = Uuid::new_v4();

        ledger
            .apply_delta(user_id, 5, ReasonCode::ReportSubmitted)
            .await
            .unwrap();

        let err = ledger
            .apply_delta(user_id, -50, ReasonCode::RewardRedeemed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientBalance {
                balance: 5,
                requested: 50,
                ..
            }
        ));

        assert_eq!(ledger.balance(user_id).await.unwrap(), 5);
        assert_eq!(ledger.history(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_never_overdraw() {
        let ledger = ledger();
        let user_id = Uuid::new_v4();

        ledger
            .apply_delta(user_id, 100, ReasonCode::WasteClaimed)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .apply_delta(user_id, -30, ReasonCode::RewardRedeemed)
                    .await
                    .is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        // 100 points cover exactly three 30-point debits
        assert_eq!(successes, 3);
        let balance = ledger.balance(user_id).await.unwrap();
        assert_eq!(balance, 10);

        let entries = ledger.history(user_id).await.unwrap();
        let sum: i64 = entries.iter().map(|e| e.amount).sum();
        assert_eq!(sum, balance);
    }
}
