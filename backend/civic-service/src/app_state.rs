use std::sync::Arc;

use crate::config::Config;
use crate::repository::Store;
use crate::services::{
    EntityLocks, PointsLedger, RedemptionService, ReportService, SessionService, WasteExchange,
};

/// Shared handler state: the store plus one instance of each domain service,
/// all serializing compound writes through the same per-entity lock registry.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub ledger: PointsLedger,
    pub reports: ReportService,
    pub rewards: RedemptionService,
    pub exchange: WasteExchange,
    pub sessions: SessionService,
}

impl AppState {
    pub fn build(store: Arc<dyn Store>, config: &Config) -> Self {
        let locks = Arc::new(EntityLocks::new());
        let ledger = PointsLedger::new(store.clone(), locks.clone());
        let reports = ReportService::new(
            store.clone(),
            locks.clone(),
            ledger.clone(),
            config.points.report_reward,
            config.sla.resolution_hours,
        );
        let rewards = RedemptionService::new(store.clone(), locks.clone());
        let exchange = WasteExchange::new(store.clone(), locks);
        let sessions = SessionService::new(&config.auth.jwt_secret, config.auth.token_ttl_hours);

        Self {
            store,
            ledger,
            reports,
            rewards,
            exchange,
            sessions,
        }
    }
}
