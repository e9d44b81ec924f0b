//! SLA breach background scan
//!
//! Reports that sit in `reported` or `under_review` past the resolution
//! window are flagged `sla_breached`. The flag is advisory: it surfaces in
//! listings and analytics, nothing is aborted or transitioned.

use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;

use crate::services::ReportService;

/// Configuration for the SLA scan loop
#[derive(Clone)]
pub struct SlaMonitorConfig {
    pub enabled: bool,
    pub scan_interval: Duration,
}

impl Default for SlaMonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scan_interval: Duration::from_secs(300),
        }
    }
}

/// Start the SLA breach scan background job
pub async fn start_sla_monitor(reports: ReportService, config: SlaMonitorConfig) {
    if !config.enabled {
        tracing::info!("SLA monitor disabled by configuration");
        return;
    }

    tracing::info!(
        interval_secs = config.scan_interval.as_secs(),
        "Starting SLA breach monitor"
    );

    // Initial delay to let the server come up
    sleep(Duration::from_secs(10)).await;

    loop {
        match reports.flag_overdue(Utc::now()).await {
            Ok(0) => tracing::debug!("SLA scan: no new breaches"),
            Ok(flagged) => tracing::warn!(flagged, "SLA scan flagged overdue reports"),
            Err(e) => tracing::warn!(error = %e, "SLA scan failed"),
        }

        sleep(config.scan_interval).await;
    }
}
