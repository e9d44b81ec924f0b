use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sponsor-backed catalog entry. Immutable once published.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RewardItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub point_cost: i64,
    pub sponsor: String,
    pub category: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RewardItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: String,
        description: String,
        point_cost: i64,
        sponsor: String,
        category: String,
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            point_cost,
            sponsor,
            category,
            valid_from,
            valid_until,
            created_at: Utc::now(),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_from <= now && now <= self.valid_until
    }
}

/// Write-once record of a reward exchanged for points, unique per
/// (user, reward) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Redemption {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Uuid,
    pub redeemed_at: DateTime<Utc>,
}

impl Redemption {
    pub fn new(user_id: Uuid, reward_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            reward_id,
            redeemed_at: Utc::now(),
        }
    }
}
