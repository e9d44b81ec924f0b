use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Comment, ReasonCode, Report, ReportCategory, ReportStatus, UserRole};
use crate::repository::{ReportFilter, ReportStats, ReportStore, Store};
use crate::services::{EntityLocks, PointsLedger};

/// Input for a new report submission. The validation score is an opaque
/// confidence value in [0, 100] produced by the photo validation pipeline.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub location: String,
    pub photo_url: Option<String>,
    pub validation_score: f64,
}

/// Report intake and triage lifecycle
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn Store>,
    locks: Arc<EntityLocks>,
    ledger: PointsLedger,
    report_reward: i64,
    sla_window: Duration,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn Store>,
        locks: Arc<EntityLocks>,
        ledger: PointsLedger,
        report_reward: i64,
        sla_window_hours: i64,
    ) -> Self {
        Self {
            store,
            locks,
            ledger,
            report_reward,
            sla_window: Duration::hours(sla_window_hours),
        }
    }

    /// File a report and credit the submission reward to the reporter.
    /// Returns the report and the reporter's new balance.
    pub async fn submit(&self, reporter_id: Uuid, new: NewReport) -> Result<(Report, i64)> {
        let report = Report::new(
            reporter_id,
            new.title,
            new.description,
            new.category,
            new.location,
            new.photo_url,
            new.validation_score,
        );
        self.store.insert_report(&report).await?;

        let balance = self
            .ledger
            .apply_delta(reporter_id, self.report_reward, ReasonCode::ReportSubmitted)
            .await?;

        tracing::info!(
            report_id = %report.id,
            reporter_id = %reporter_id,
            category = report.category.as_str(),
            severity = report.severity.as_str(),
            "report submitted"
        );
        Ok((report, balance))
    }

    pub async fn get(&self, id: Uuid) -> Result<Report> {
        self.store
            .report_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("report {id}")))
    }

    pub async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>> {
        self.store.list_reports(filter).await
    }

    /// Move a report one step along the triage chain. The actor's role is
    /// enforced here; the automated triage path acts with the admin role.
    pub async fn transition(
        &self,
        report_id: Uuid,
        target: ReportStatus,
        actor: UserRole,
    ) -> Result<Report> {
        let _guard = self.locks.acquire(report_id).await;

        let mut report = self.get(report_id).await?;
        let from = report.status;
        report.transition(target, actor)?;
        self.store.update_report(&report).await?;

        tracing::info!(
            report_id = %report_id,
            from = from.as_str(),
            to = target.as_str(),
            "report status changed"
        );
        Ok(report)
    }

    pub async fn escalate(&self, report_id: Uuid) -> Result<Report> {
        let _guard = self.locks.acquire(report_id).await;

        let mut report = self.get(report_id).await?;
        report.escalate()?;
        self.store.update_report(&report).await?;

        tracing::info!(
            report_id = %report_id,
            escalation_count = report.escalation_count,
            "report escalated"
        );
        Ok(report)
    }

    pub async fn upvote(&self, report_id: Uuid) -> Result<i64> {
        self.store.increment_upvotes(report_id).await
    }

    pub async fn comment(&self, report_id: Uuid, author_id: Uuid, body: String) -> Result<Comment> {
        let comment = Comment::new(report_id, author_id, body);
        self.store.add_comment(&comment).await?;
        Ok(comment)
    }

    pub async fn comments(&self, report_id: Uuid) -> Result<Vec<Comment>> {
        self.get(report_id).await?;
        self.store.comments(report_id).await
    }

    /// Flag reports that sat in `reported`/`under_review` past the SLA
    /// window as of `now`. Advisory; returns how many were newly flagged.
    pub async fn flag_overdue(&self, now: DateTime<Utc>) -> Result<u64> {
        self.store.flag_sla_breaches(now - self.sla_window).await
    }

    pub async fn stats(&self) -> Result<ReportStats> {
        self.store.report_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::repository::MemoryStore;

    fn service() -> ReportService {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let locks = Arc::new(EntityLocks::new());
        let ledger = PointsLedger::new(store.clone(), locks.clone());
        ReportService::new(store, locks, ledger, 5, 72)
    }

    fn new_report(score: f64) -> NewReport {
        NewReport {
            title: "Waterlogging on Main Street".to_string(),
            description: "Heavy rains have caused severe waterlogging.".to_string(),
            category: ReportCategory::StagnantWater,
            location: "Main Street, Near Park".to_string(),
            photo_url: None,
            validation_score: score,
        }
    }

    #[tokio::test]
    async fn test_submit_credits_reporter() {
        let service = service();
        let reporter = Uuid::new_v4();

        let (report, balance) = service.submit(reporter, new_report(85.0)).await.unwrap();
        assert_eq!(balance, 5);
        assert_eq!(report.severity, Severity::High);
        assert_eq!(report.status, ReportStatus::Reported);
    }

    #[tokio::test]
    async fn test_admin_cannot_skip_under_review() {
        let service = service();
        let (report, _) = service
            .submit(Uuid::new_v4(), new_report(85.0))
            .await
            .unwrap();

        let err = service
            .transition(report.id, ReportStatus::InProgress, UserRole::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition { .. }));

        let report = service
            .transition(report.id, ReportStatus::UnderReview, UserRole::Admin)
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::UnderReview);
    }

    #[tokio::test]
    async fn test_citizen_cannot_triage() {
        let service = service();
        let (report, _) = service
            .submit(Uuid::new_v4(), new_report(50.0))
            .await
            .unwrap();

        let err = service
            .transition(report.id, ReportStatus::UnderReview, UserRole::Citizen)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(
            service.get(report.id).await.unwrap().status,
            ReportStatus::Reported
        );
    }

    #[tokio::test]
    async fn test_audit_appends_survive_resolution() {
        let service = service();
        let reporter = Uuid::new_v4();
        let (report, _) = service.submit(reporter, new_report(50.0)).await.unwrap();

        for status in [
            ReportStatus::UnderReview,
            ReportStatus::InProgress,
            ReportStatus::Resolved,
        ] {
            service
                .transition(report.id, status, UserRole::Admin)
                .await
                .unwrap();
        }

        // status and escalation are frozen, upvotes and comments are not
        assert!(service.escalate(report.id).await.is_err());
        assert_eq!(service.upvote(report.id).await.unwrap(), 1);
        service
            .comment(report.id, reporter, "Resolved quickly, thanks!".to_string())
            .await
            .unwrap();
        assert_eq!(service.comments(report.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sla_scan_flags_only_overdue_triage_states() {
        let service = service();
        let (overdue, _) = service
            .submit(Uuid::new_v4(), new_report(50.0))
            .await
            .unwrap();
        let (fresh, _) = service
            .submit(Uuid::new_v4(), new_report(50.0))
            .await
            .unwrap();

        // nothing is overdue yet
        assert_eq!(service.flag_overdue(Utc::now()).await.unwrap(), 0);

        // both reports age past the window, but one is already in progress
        service
            .transition(fresh.id, ReportStatus::UnderReview, UserRole::Admin)
            .await
            .unwrap();
        service
            .transition(fresh.id, ReportStatus::InProgress, UserRole::Admin)
            .await
            .unwrap();

        let later = Utc::now() + Duration::hours(100);
        assert_eq!(service.flag_overdue(later).await.unwrap(), 1);
        assert!(service.get(overdue.id).await.unwrap().sla_breached);
        assert!(!service.get(fresh.id).await.unwrap().sla_breached);

        // already-flagged reports are not counted twice
        assert_eq!(service.flag_overdue(later).await.unwrap(), 0);
    }
}
