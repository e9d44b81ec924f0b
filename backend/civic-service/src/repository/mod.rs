/// Storage abstraction for the civic service
///
/// Each trait covers one aggregate. Compound operations that must be atomic
/// as a pair (redemption debit + record, offer claim + owner credit) are
/// single store methods so a backend can wrap them in one transaction.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Comment, LedgerEntry, OfferStatus, Redemption, Report, ReportCategory, ReportStatus,
    RewardItem, User, WasteOffer,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Filters for report listings
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub category: Option<ReportCategory>,
    pub reporter_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

/// Aggregate counts backing the admin analytics view
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportStats {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_category: BTreeMap<String, i64>,
    pub by_severity: BTreeMap<String, i64>,
    pub escalated: i64,
    pub sla_breached: i64,
}

#[async_trait]
pub trait UserStore {
    /// Insert a new account. Fails with `Conflict` on a duplicate email.
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>>;
}

#[async_trait]
pub trait LedgerStore {
    /// Append an immutable ledger entry and return the new balance.
    async fn append_entry(&self, entry: &LedgerEntry) -> Result<i64>;
    async fn balance(&self, user_id: Uuid) -> Result<i64>;
    /// All entries for a user, newest first.
    async fn entries(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>>;
}

#[async_trait]
pub trait ReportStore {
    async fn insert_report(&self, report: &Report) -> Result<()>;
    async fn report_by_id(&self, id: Uuid) -> Result<Option<Report>>;
    async fn update_report(&self, report: &Report) -> Result<()>;
    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>>;
    /// Audit append: allowed in any status, including resolved.
    async fn increment_upvotes(&self, id: Uuid) -> Result<i64>;
    /// Audit append: insert the comment and bump the report's comment count.
    async fn add_comment(&self, comment: &Comment) -> Result<i64>;
    async fn comments(&self, report_id: Uuid) -> Result<Vec<Comment>>;
    /// Flag every unresolved report created at or before `cutoff` that is
    /// still awaiting triage. Returns how many reports were newly flagged.
    async fn flag_sla_breaches(&self, cutoff: DateTime<Utc>) -> Result<u64>;
    async fn report_stats(&self) -> Result<ReportStats>;
}

#[async_trait]
pub trait OfferStore {
    async fn insert_offer(&self, offer: &WasteOffer) -> Result<()>;
    async fn offer_by_id(&self, id: Uuid) -> Result<Option<WasteOffer>>;
    async fn list_offers(&self, status: Option<OfferStatus>) -> Result<Vec<WasteOffer>>;
    /// Persist a claimed offer together with the owner's credit entry as one
    /// atomic write. Returns the owner's new balance.
    async fn record_claim(&self, offer: &WasteOffer, credit: &LedgerEntry) -> Result<i64>;
}

#[async_trait]
pub trait RewardStore {
    async fn insert_reward(&self, reward: &RewardItem) -> Result<()>;
    async fn reward_by_id(&self, id: Uuid) -> Result<Option<RewardItem>>;
    async fn list_rewards(&self) -> Result<Vec<RewardItem>>;
    async fn redemption(&self, user_id: Uuid, reward_id: Uuid) -> Result<Option<Redemption>>;
    async fn redemptions_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>>;
    /// Persist the redemption together with its point debit as one atomic
    /// write. Returns the user's new balance.
    async fn record_redemption(&self, redemption: &Redemption, debit: &LedgerEntry)
        -> Result<i64>;
}

/// Everything the service layer needs from a backend
pub trait Store:
    UserStore + LedgerStore + ReportStore + OfferStore + RewardStore + Send + Sync
{
}

impl<T> Store for T where
    T: UserStore + LedgerStore + ReportStore + OfferStore + RewardStore + Send + Sync
{
}
