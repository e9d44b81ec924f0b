/// PostgreSQL store backed by `sqlx`
///
/// Compound writes (claim + credit, redemption + debit, entry + balance)
/// run in one transaction. Balances live in `points_balances` and are kept
/// in step with `ledger_entries` inside the same transaction.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    Comment, LedgerEntry, OfferStatus, Redemption, Report, RewardItem, User, WasteOffer,
};
use crate::repository::{
    LedgerStore, OfferStore, ReportFilter, ReportStats, ReportStore, RewardStore, UserStore,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a ledger entry and bump the balance inside the caller's
    /// transaction. Returns the new balance.
    async fn append_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        entry: &LedgerEntry,
    ) -> Result<i64> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, user_id, amount, reason, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.amount)
        .bind(entry.reason)
        .bind(entry.created_at)
        .execute(&mut **tx)
        .await?;

        let balance: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO points_balances (user_id, balance)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET balance = points_balances.balance + EXCLUDED.balance
            RETURNING balance
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.amount)
        .fetch_one(&mut **tx)
        .await?;

        Ok(balance)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, phone, pincode, landmark, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.pincode)
        .bind(&user.landmark)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "email {} is already registered",
                user.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn append_entry(&self, entry: &LedgerEntry) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let balance = Self::append_in_tx(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(balance)
    }

    async fn balance(&self, user_id: Uuid) -> Result<i64> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM points_balances WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(balance.unwrap_or(0))
    }

    async fn entries(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM ledger_entries
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

#[async_trait]
impl ReportStore for PgStore {
    async fn insert_report(&self, report: &Report) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (
                id, reporter_id, title, description, category, location,
                severity, status, escalated, escalation_count, sla_breached,
                photo_url, upvote_count, comment_count, created_at, updated_at, resolved_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(report.id)
        .bind(report.reporter_id)
        .bind(&report.title)
        .bind(&report.description)
        .bind(report.category)
        .bind(&report.location)
        .bind(report.severity)
        .bind(report.status)
        .bind(report.escalated)
        .bind(report.escalation_count)
        .bind(report.sla_breached)
        .bind(&report.photo_url)
        .bind(report.upvote_count)
        .bind(report.comment_count)
        .bind(report.created_at)
        .bind(report.updated_at)
        .bind(report.resolved_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn report_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let report = sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    async fn update_report(&self, report: &Report) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET status = $2,
                escalated = $3,
                escalation_count = $4,
                sla_breached = $5,
                updated_at = $6,
                resolved_at = $7
            WHERE id = $1
            "#,
        )
        .bind(report.id)
        .bind(report.status)
        .bind(report.escalated)
        .bind(report.escalation_count)
        .bind(report.sla_breached)
        .bind(report.updated_at)
        .bind(report.resolved_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("report {}", report.id)));
        }
        Ok(())
    }

    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM reports WHERE 1=1");
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(reporter_id) = filter.reporter_id {
            query.push(" AND reporter_id = ").push_bind(reporter_id);
        }
        query.push(" ORDER BY created_at DESC");
        if filter.limit > 0 {
            query.push(" LIMIT ").push_bind(filter.limit);
        }
        query.push(" OFFSET ").push_bind(filter.offset.max(0));

        let reports = query
            .build_query_as::<Report>()
            .fetch_all(&self.pool)
            .await?;
        Ok(reports)
    }

    async fn increment_upvotes(&self, id: Uuid) -> Result<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE reports
            SET upvote_count = upvote_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING upvote_count
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        count.ok_or_else(|| AppError::NotFound(format!("report {id}")))
    }

    async fn add_comment(&self, comment: &Comment) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE reports
            SET comment_count = comment_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING comment_count
            "#,
        )
        .bind(comment.report_id)
        .fetch_optional(&mut *tx)
        .await?;

        let count =
            count.ok_or_else(|| AppError::NotFound(format!("report {}", comment.report_id)))?;

        sqlx::query(
            r#"
            INSERT INTO report_comments (id, report_id, author_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(comment.report_id)
        .bind(comment.author_id)
        .bind(&comment.body)
        .bind(comment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(count)
    }

    async fn comments(&self, report_id: Uuid) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT * FROM report_comments
            WHERE report_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn flag_sla_breaches(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET sla_breached = TRUE, updated_at = NOW()
            WHERE sla_breached = FALSE
              AND status IN ('reported', 'under_review')
              AND created_at <= $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn report_stats(&self) -> Result<ReportStats> {
        let mut stats = ReportStats::default();

        stats.total = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;

        let by_status: Vec<(String, i64)> =
            sqlx::query_as("SELECT status::TEXT, COUNT(*) FROM reports GROUP BY 1")
                .fetch_all(&self.pool)
                .await?;
        stats.by_status = by_status.into_iter().collect();

        let by_category: Vec<(String, i64)> =
            sqlx::query_as("SELECT category::TEXT, COUNT(*) FROM reports GROUP BY 1")
                .fetch_all(&self.pool)
                .await?;
        stats.by_category = by_category.into_iter().collect();

        let by_severity: Vec<(String, i64)> =
            sqlx::query_as("SELECT severity::TEXT, COUNT(*) FROM reports GROUP BY 1")
                .fetch_all(&self.pool)
                .await?;
        stats.by_severity = by_severity.into_iter().collect();

        stats.escalated =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE escalated")
                .fetch_one(&self.pool)
                .await?;
        stats.sla_breached =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE sla_breached")
                .fetch_one(&self.pool)
                .await?;

        Ok(stats)
    }
}

#[async_trait]
impl OfferStore for PgStore {
    async fn insert_offer(&self, offer: &WasteOffer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO waste_offers (
                id, owner_id, title, category, quantity_kg, point_value,
                status, claimant_id, location, created_at, claimed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(offer.id)
        .bind(offer.owner_id)
        .bind(&offer.title)
        .bind(offer.category)
        .bind(offer.quantity_kg)
        .bind(offer.point_value)
        .bind(offer.status)
        .bind(offer.claimant_id)
        .bind(&offer.location)
        .bind(offer.created_at)
        .bind(offer.claimed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn offer_by_id(&self, id: Uuid) -> Result<Option<WasteOffer>> {
        let offer = sqlx::query_as::<_, WasteOffer>("SELECT * FROM waste_offers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(offer)
    }

    async fn list_offers(&self, status: Option<OfferStatus>) -> Result<Vec<WasteOffer>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM waste_offers WHERE 1=1");
        if let Some(status) = status {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at DESC");

        let offers = query
            .build_query_as::<WasteOffer>()
            .fetch_all(&self.pool)
            .await?;
        Ok(offers)
    }

    async fn record_claim(&self, offer: &WasteOffer, credit: &LedgerEntry) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE waste_offers
            SET status = $2, claimant_id = $3, claimed_at = $4
            WHERE id = $1
            "#,
        )
        .bind(offer.id)
        .bind(offer.status)
        .bind(offer.claimant_id)
        .bind(offer.claimed_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("offer {}", offer.id)));
        }

        let balance = Self::append_in_tx(&mut tx, credit).await?;
        tx.commit().await?;
        Ok(balance)
    }
}

#[async_trait]
impl RewardStore for PgStore {
    async fn insert_reward(&self, reward: &RewardItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rewards (
                id, title, description, point_cost, sponsor, category,
                valid_from, valid_until, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(reward.id)
        .bind(&reward.title)
        .bind(&reward.description)
        .bind(reward.point_cost)
        .bind(&reward.sponsor)
        .bind(&reward.category)
        .bind(reward.valid_from)
        .bind(reward.valid_until)
        .bind(reward.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn reward_by_id(&self, id: Uuid) -> Result<Option<RewardItem>> {
        let reward = sqlx::query_as::<_, RewardItem>("SELECT * FROM rewards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reward)
    }

    async fn list_rewards(&self) -> Result<Vec<RewardItem>> {
        let rewards =
            sqlx::query_as::<_, RewardItem>("SELECT * FROM rewards ORDER BY point_cost ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rewards)
    }

    async fn redemption(&self, user_id: Uuid, reward_id: Uuid) -> Result<Option<Redemption>> {
        let redemption = sqlx::query_as::<_, Redemption>(
            "SELECT * FROM redemptions WHERE user_id = $1 AND reward_id = $2",
        )
        .bind(user_id)
        .bind(reward_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(redemption)
    }

    async fn redemptions_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>> {
        let redemptions = sqlx::query_as::<_, Redemption>(
            r#"
            SELECT * FROM redemptions
            WHERE user_id = $1
            ORDER BY redeemed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(redemptions)
    }

    async fn record_redemption(
        &self,
        redemption: &Redemption,
        debit: &LedgerEntry,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO redemptions (id, user_id, reward_id, redeemed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(redemption.id)
        .bind(redemption.user_id)
        .bind(redemption.reward_id)
        .bind(redemption.redeemed_at)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::AlreadyRedeemed {
                    reward_id: redemption.reward_id,
                    user_id: redemption.user_id,
                })
            }
            Err(e) => return Err(e.into()),
        }

        let balance = Self::append_in_tx(&mut tx, debit).await?;
        tx.commit().await?;
        Ok(balance)
    }
}
