use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Why a balance was mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ledger_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    ReportSubmitted,
    WasteClaimed,
    RewardRedeemed,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::ReportSubmitted => "report_submitted",
            ReasonCode::WasteClaimed => "waste_claimed",
            ReasonCode::RewardRedeemed => "reward_redeemed",
        }
    }
}

/// Immutable record of one points mutation. A user's balance is the sum of
/// their entries at every point in time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub reason: ReasonCode,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(user_id: Uuid, amount: i64, reason: ReasonCode) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            reason,
            created_at: Utc::now(),
        }
    }
}
