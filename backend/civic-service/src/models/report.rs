use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::UserRole;

/// Sanitation issue categories, as reported by citizens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    GarbageOverflow,
    ImproperDisposal,
    FailedSegregation,
    CloggedDrains,
    StagnantWater,
    BrokenToilets,
}

impl ReportCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::GarbageOverflow => "garbage_overflow",
            ReportCategory::ImproperDisposal => "improper_disposal",
            ReportCategory::FailedSegregation => "failed_segregation",
            ReportCategory::CloggedDrains => "clogged_drains",
            ReportCategory::StagnantWater => "stagnant_water",
            ReportCategory::BrokenToilets => "broken_toilets",
        }
    }
}

/// Triage priority, assigned once at creation from the photo validation
/// confidence score and never reclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Classify a validation confidence score in [0, 100].
    ///
    /// The thresholds are load-bearing for compatibility: strictly greater
    /// than 70 is high, strictly greater than 40 is medium, anything else low.
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            Severity::High
        } else if score > 40.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Report status enum with state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Reported,
    UnderReview,
    InProgress,
    Resolved,
}

impl ReportStatus {
    /// Validate a state transition. Legal edges move strictly forward one
    /// step along reported -> under_review -> in_progress -> resolved; no
    /// skipping, no backward moves, and `resolved` is terminal.
    pub fn can_transition_to(&self, new_status: ReportStatus) -> bool {
        matches!(
            (self, new_status),
            (ReportStatus::Reported, ReportStatus::UnderReview)
                | (ReportStatus::UnderReview, ReportStatus::InProgress)
                | (ReportStatus::InProgress, ReportStatus::Resolved)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Resolved)
    }

    /// Statuses the SLA timer applies to
    pub fn is_awaiting_triage(&self) -> bool {
        matches!(self, ReportStatus::Reported | ReportStatus::UnderReview)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Reported => "reported",
            ReportStatus::UnderReview => "under_review",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Resolved => "resolved",
        }
    }
}

/// Citizen-filed sanitation report
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub location: String,
    pub severity: Severity,
    pub status: ReportStatus,
    pub escalated: bool,
    pub escalation_count: i32,
    pub sla_breached: bool,
    pub photo_url: Option<String>,
    pub upvote_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Report {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reporter_id: Uuid,
        title: String,
        description: String,
        category: ReportCategory,
        location: String,
        photo_url: Option<String>,
        validation_score: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reporter_id,
            title,
            description,
            category,
            location,
            severity: Severity::from_score(validation_score),
            status: ReportStatus::Reported,
            escalated: false,
            escalation_count: 0,
            sla_breached: false,
            photo_url,
            upvote_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        }
    }

    /// Move the report one step along the triage chain. Only admins (and the
    /// internal triage path, which acts with the admin role) may transition.
    pub fn transition(&mut self, target: ReportStatus, actor: UserRole) -> Result<(), AppError> {
        if !actor.is_admin() {
            return Err(AppError::Unauthorized(format!(
                "role {} may not transition report {}",
                actor.as_str(),
                self.id
            )));
        }
        if !self.status.can_transition_to(target) {
            return Err(AppError::IllegalTransition {
                report_id: self.id,
                from: self.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }

        self.status = target;
        self.updated_at = Utc::now();
        if target == ReportStatus::Resolved {
            self.resolved_at = Some(self.updated_at);
        }
        Ok(())
    }

    /// Flag the report as escalated. Permitted from any non-terminal status;
    /// the status itself does not change.
    pub fn escalate(&mut self) -> Result<(), AppError> {
        if self.status.is_terminal() {
            return Err(AppError::IllegalTransition {
                report_id: self.id,
                from: self.status.as_str().to_string(),
                to: "escalated".to_string(),
            });
        }

        self.escalated = true;
        self.escalation_count += 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether the report has sat in `reported`/`under_review` past the
    /// resolution window. Advisory only; nothing is aborted.
    pub fn is_overdue(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.status.is_awaiting_triage() && now - self.created_at >= window
    }
}

/// Audit-append discussion entry on a report. Comments stay writable after
/// the report is resolved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub report_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(report_id: Uuid, author_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            report_id,
            author_id,
            body,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(score: f64) -> Report {
        Report::new(
            Uuid::new_v4(),
            "Overflowing garbage bin".to_string(),
            "The bin has not been cleared for days.".to_string(),
            ReportCategory::GarbageOverflow,
            "Sector 15, Market Road".to_string(),
            None,
            score,
        )
    }

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(Severity::from_score(85.0), Severity::High);
        assert_eq!(Severity::from_score(70.0), Severity::Medium);
        assert_eq!(Severity::from_score(70.1), Severity::High);
        assert_eq!(Severity::from_score(41.0), Severity::Medium);
        assert_eq!(Severity::from_score(40.0), Severity::Low);
        assert_eq!(Severity::from_score(0.0), Severity::Low);
    }

    #[test]
    fn test_status_transitions() {
        assert!(ReportStatus::Reported.can_transition_to(ReportStatus::UnderReview));
        assert!(ReportStatus::UnderReview.can_transition_to(ReportStatus::InProgress));
        assert!(ReportStatus::InProgress.can_transition_to(ReportStatus::Resolved));

        // no skipping
        assert!(!ReportStatus::Reported.can_transition_to(ReportStatus::InProgress));
        assert!(!ReportStatus::Reported.can_transition_to(ReportStatus::Resolved));
        // no backward moves
        assert!(!ReportStatus::InProgress.can_transition_to(ReportStatus::UnderReview));
        // resolved is terminal
        assert!(!ReportStatus::Resolved.can_transition_to(ReportStatus::Reported));
        assert!(!ReportStatus::Resolved.can_transition_to(ReportStatus::UnderReview));
    }

    #[test]
    fn test_transition_requires_admin() {
        let mut report = sample_report(85.0);
        let err = report
            .transition(ReportStatus::UnderReview, UserRole::Citizen)
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(report.status, ReportStatus::Reported);

        report
            .transition(ReportStatus::UnderReview, UserRole::Admin)
            .unwrap();
        assert_eq!(report.status, ReportStatus::UnderReview);
    }

    #[test]
    fn test_transition_cannot_skip() {
        let mut report = sample_report(85.0);
        let err = report
            .transition(ReportStatus::InProgress, UserRole::Admin)
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition { .. }));
        assert_eq!(report.status, ReportStatus::Reported);
    }

    #[test]
    fn test_resolved_is_terminal() {
        let mut report = sample_report(50.0);
        report.transition(ReportStatus::UnderReview, UserRole::Admin).unwrap();
        report.transition(ReportStatus::InProgress, UserRole::Admin).unwrap();
        report.transition(ReportStatus::Resolved, UserRole::Admin).unwrap();
        assert!(report.resolved_at.is_some());

        let err = report
            .transition(ReportStatus::UnderReview, UserRole::Admin)
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition { .. }));
        assert!(matches!(report.escalate(), Err(AppError::IllegalTransition { .. })));
    }

    #[test]
    fn test_escalation_is_orthogonal_to_status() {
        let mut report = sample_report(50.0);
        report.escalate().unwrap();
        assert!(report.escalated);
        assert_eq!(report.escalation_count, 1);
        assert_eq!(report.status, ReportStatus::Reported);

        report.transition(ReportStatus::UnderReview, UserRole::Admin).unwrap();
        report.escalate().unwrap();
        assert_eq!(report.escalation_count, 2);
        assert_eq!(report.status, ReportStatus::UnderReview);
    }

    #[test]
    fn test_overdue_only_while_awaiting_triage() {
        let mut report = sample_report(50.0);
        report.created_at = Utc::now() - Duration::hours(100);

        assert!(report.is_overdue(Utc::now(), Duration::hours(72)));

        report.transition(ReportStatus::UnderReview, UserRole::Admin).unwrap();
        assert!(report.is_overdue(Utc::now(), Duration::hours(72)));

        report.transition(ReportStatus::InProgress, UserRole::Admin).unwrap();
        assert!(!report.is_overdue(Utc::now(), Duration::hours(72)));
    }
}
