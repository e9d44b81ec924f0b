/// In-memory store backed by `DashMap`
///
/// The development and test backend; selected when no `DATABASE_URL` is
/// configured. A user's entries and balance live in one map slot so readers
/// never observe one without the other.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    Comment, LedgerEntry, OfferStatus, Redemption, Report, RewardItem, User, WasteOffer,
};
use crate::repository::{
    LedgerStore, OfferStore, ReportFilter, ReportStats, ReportStore, RewardStore, UserStore,
};

#[derive(Debug, Default)]
struct UserLedger {
    entries: Vec<LedgerEntry>,
    balance: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
    ledgers: DashMap<Uuid, UserLedger>,
    reports: DashMap<Uuid, Report>,
    comments: DashMap<Uuid, Vec<Comment>>,
    offers: DashMap<Uuid, WasteOffer>,
    rewards: DashMap<Uuid, RewardItem>,
    redemptions: DashMap<(Uuid, Uuid), Redemption>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn credit(&self, entry: &LedgerEntry) -> i64 {
        let mut ledger = self.ledgers.entry(entry.user_id).or_default();
        ledger.entries.push(entry.clone());
        ledger.balance += entry.amount;
        ledger.balance
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        match self.emails.entry(user.email.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "email {} is already registered",
                user.email
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(())
            }
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let id = match self.emails.get(email) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn append_entry(&self, entry: &LedgerEntry) -> Result<i64> {
        Ok(self.credit(entry))
    }

    async fn balance(&self, user_id: Uuid) -> Result<i64> {
        Ok(self.ledgers.get(&user_id).map(|l| l.balance).unwrap_or(0))
    }

    async fn entries(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let mut entries = self
            .ledgers
            .get(&user_id)
            .map(|l| l.entries.clone())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert_report(&self, report: &Report) -> Result<()> {
        self.reports.insert(report.id, report.clone());
        Ok(())
    }

    async fn report_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        Ok(self.reports.get(&id).map(|r| r.clone()))
    }

    async fn update_report(&self, report: &Report) -> Result<()> {
        match self.reports.get_mut(&report.id) {
            Some(mut slot) => {
                *slot = report.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("report {}", report.id))),
        }
    }

    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        let mut reports: Vec<Report> = self
            .reports
            .iter()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.category.map_or(true, |c| r.category == c))
            .filter(|r| filter.reporter_id.map_or(true, |id| r.reporter_id == id))
            .map(|r| r.clone())
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = filter.offset.max(0) as usize;
        let limit = if filter.limit > 0 {
            filter.limit as usize
        } else {
            reports.len()
        };
        Ok(reports.into_iter().skip(offset).take(limit).collect())
    }

    async fn increment_upvotes(&self, id: Uuid) -> Result<i64> {
        match self.reports.get_mut(&id) {
            Some(mut report) => {
                report.upvote_count += 1;
                report.updated_at = Utc::now();
                Ok(report.upvote_count)
            }
            None => Err(AppError::NotFound(format!("report {id}"))),
        }
    }

    async fn add_comment(&self, comment: &Comment) -> Result<i64> {
        let count = match self.reports.get_mut(&comment.report_id) {
            Some(mut report) => {
                report.comment_count += 1;
                report.updated_at = Utc::now();
                report.comment_count
            }
            None => return Err(AppError::NotFound(format!("report {}", comment.report_id))),
        };
        self.comments
            .entry(comment.report_id)
            .or_default()
            .push(comment.clone());
        Ok(count)
    }

    async fn comments(&self, report_id: Uuid) -> Result<Vec<Comment>> {
        Ok(self
            .comments
            .get(&report_id)
            .map(|c| c.clone())
            .unwrap_or_default())
    }

    async fn flag_sla_breaches(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut flagged = 0;
        for mut report in self.reports.iter_mut() {
            if !report.sla_breached
                && report.status.is_awaiting_triage()
                && report.created_at <= cutoff
            {
                report.sla_breached = true;
                report.updated_at = Utc::now();
                flagged += 1;
            }
        }
        Ok(flagged)
    }

    async fn report_stats(&self) -> Result<ReportStats> {
        let mut stats = ReportStats::default();
        for report in self.reports.iter() {
            stats.total += 1;
            *stats
                .by_status
                .entry(report.status.as_str().to_string())
                .or_insert(0) += 1;
            *stats
                .by_category
                .entry(report.category.as_str().to_string())
                .or_insert(0) += 1;
            *stats
                .by_severity
                .entry(report.severity.as_str().to_string())
                .or_insert(0) += 1;
            if report.escalated {
                stats.escalated += 1;
            }
            if report.sla_breached {
                stats.sla_breached += 1;
            }
        }
        Ok(stats)
    }
}

#[async_trait]
impl OfferStore for MemoryStore {
    async fn insert_offer(&self, offer: &WasteOffer) -> Result<()> {
        self.offers.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn offer_by_id(&self, id: Uuid) -> Result<Option<WasteOffer>> {
        Ok(self.offers.get(&id).map(|o| o.clone()))
    }

    async fn list_offers(&self, status: Option<OfferStatus>) -> Result<Vec<WasteOffer>> {
        let mut offers: Vec<WasteOffer> = self
            .offers
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .map(|o| o.clone())
            .collect();
        offers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(offers)
    }

    async fn record_claim(&self, offer: &WasteOffer, credit: &LedgerEntry) -> Result<i64> {
        match self.offers.get_mut(&offer.id) {
            Some(mut slot) => *slot = offer.clone(),
            None => return Err(AppError::NotFound(format!("offer {}", offer.id))),
        }
        Ok(self.credit(credit))
    }
}

#[async_trait]
impl RewardStore for MemoryStore {
    async fn insert_reward(&self, reward: &RewardItem) -> Result<()> {
        self.rewards.insert(reward.id, reward.clone());
        Ok(())
    }

    async fn reward_by_id(&self, id: Uuid) -> Result<Option<RewardItem>> {
        Ok(self.rewards.get(&id).map(|r| r.clone()))
    }

    async fn list_rewards(&self) -> Result<Vec<RewardItem>> {
        let mut rewards: Vec<RewardItem> =
            self.rewards.iter().map(|r| r.clone()).collect();
        rewards.sort_by(|a, b| a.point_cost.cmp(&b.point_cost));
        Ok(rewards)
    }

    async fn redemption(&self, user_id: Uuid, reward_id: Uuid) -> Result<Option<Redemption>> {
        Ok(self
            .redemptions
            .get(&(user_id, reward_id))
            .map(|r| r.clone()))
    }

    async fn redemptions_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>> {
        let mut redemptions: Vec<Redemption> = self
            .redemptions
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        redemptions.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        Ok(redemptions)
    }

    async fn record_redemption(
        &self,
        redemption: &Redemption,
        debit: &LedgerEntry,
    ) -> Result<i64> {
        self.redemptions.insert(
            (redemption.user_id, redemption.reward_id),
            redemption.clone(),
        );
        Ok(self.credit(debit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReasonCode;

    #[tokio::test]
    async fn test_balance_is_sum_of_entries() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();

        for amount in [5, 20, -10, 250] {
            store
                .append_entry(&LedgerEntry::new(user_id, amount, ReasonCode::WasteClaimed))
                .await
                .unwrap();
            let entries = store.entries(user_id).await.unwrap();
            let sum: i64 = entries.iter().map(|e| e.amount).sum();
            assert_eq!(store.balance(user_id).await.unwrap(), sum);
        }
        assert_eq!(store.balance(user_id).await.unwrap(), 265);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let user = User::new(
            "Riya".to_string(),
            "riya@example.com".to_string(),
            "hash".to_string(),
            crate::models::UserRole::Citizen,
        );
        store.insert_user(&user).await.unwrap();

        let dup = User::new(
            "Other".to_string(),
            "riya@example.com".to_string(),
            "hash2".to_string(),
            crate::models::UserRole::Citizen,
        );
        let err = store.insert_user(&dup).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
