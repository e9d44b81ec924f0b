//! End-to-end citizen journey through the service layer, on the in-memory
//! backend.

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use civic_service::error::AppError;
use civic_service::models::{
    OfferStatus, ReportCategory, ReportStatus, Severity, UserRole, WasteCategory,
};
use civic_service::repository::{MemoryStore, Store};
use civic_service::services::{
    EntityLocks, NewOffer, NewReport, NewReward, PointsLedger, RedemptionService, ReportService,
    WasteExchange,
};

struct Fixture {
    ledger: PointsLedger,
    reports: ReportService,
    rewards: RedemptionService,
    exchange: WasteExchange,
}

fn fixture() -> Fixture {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let locks = Arc::new(EntityLocks::new());
    let ledger = PointsLedger::new(store.clone(), locks.clone());
    Fixture {
        reports: ReportService::new(store.clone(), locks.clone(), ledger.clone(), 5, 72),
        rewards: RedemptionService::new(store.clone(), locks.clone()),
        exchange: WasteExchange::new(store, locks),
        ledger,
    }
}

fn garbage_report() -> NewReport {
    NewReport {
        title: "Overflowing Garbage Bin".to_string(),
        description: "The bin has not been cleared for days.".to_string(),
        category: ReportCategory::GarbageOverflow,
        location: "Sector 15, Market Road".to_string(),
        photo_url: None,
        validation_score: 55.0,
    }
}

#[tokio::test]
async fn citizen_journey_report_offer_claim_redeem() {
    let fx = fixture();
    let citizen = Uuid::new_v4();
    let claimant = Uuid::new_v4();

    // starts from zero
    assert_eq!(fx.ledger.balance(citizen).await.unwrap(), 0);

    // filing a report earns 5 points
    let (_, balance) = fx.reports.submit(citizen, garbage_report()).await.unwrap();
    assert_eq!(balance, 5);

    // a 50-point reward is out of reach and the failure changes nothing
    let voucher = fx
        .rewards
        .create_reward(NewReward {
            title: "Starbucks Coffee Voucher".to_string(),
            description: "Get a free coffee at any Starbucks outlet".to_string(),
            point_cost: 50,
            sponsor: "Starbucks".to_string(),
            category: "Food & Beverage".to_string(),
            valid_from: Utc::now() - Duration::days(1),
            valid_until: Utc::now() + Duration::days(30),
        })
        .await
        .unwrap();
    let err = fx
        .rewards
        .redeem(citizen, voucher.id, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientBalance { .. }));
    assert_eq!(fx.ledger.balance(citizen).await.unwrap(), 5);

    // the citizen lists 4kg of plastic, worth 20 points on claim
    let offer = fx
        .exchange
        .create_offer(
            citizen,
            NewOffer {
                title: "Plastic Bottles - 4kg".to_string(),
                category: WasteCategory::Plastic,
                quantity_kg: 4,
                location: "Koramangala, Bangalore".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(offer.point_value, 20);

    // someone else claims it; the credit lands on the owner's balance
    let outcome = fx.exchange.claim(offer.id, claimant).await.unwrap();
    assert_eq!(outcome.owner_balance, 25);
    assert_eq!(outcome.offer.status, OfferStatus::Claimed);
    assert_eq!(fx.ledger.balance(citizen).await.unwrap(), 25);
    assert_eq!(fx.ledger.balance(claimant).await.unwrap(), 0);

    // the offer can only be claimed once
    let err = fx.exchange.claim(offer.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyClaimed { .. }));

    // the ledger held its invariant through the whole journey
    let entries = fx.ledger.history(citizen).await.unwrap();
    let sum: i64 = entries.iter().map(|e| e.amount).sum();
    assert_eq!(sum, 25);
}

#[tokio::test]
async fn high_confidence_report_must_still_walk_the_chain() {
    let fx = fixture();

    let (report, _) = fx
        .reports
        .submit(
            Uuid::new_v4(),
            NewReport {
                validation_score: 85.0,
                ..garbage_report()
            },
        )
        .await
        .unwrap();
    assert_eq!(report.severity, Severity::High);

    // severity does not buy a shortcut past under_review
    let err = fx
        .reports
        .transition(report.id, ReportStatus::InProgress, UserRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::IllegalTransition { .. }));

    for status in [
        ReportStatus::UnderReview,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
    ] {
        fx.reports
            .transition(report.id, status, UserRole::Admin)
            .await
            .unwrap();
    }
    assert!(fx.reports.get(report.id).await.unwrap().resolved_at.is_some());
}

#[tokio::test]
async fn redeeming_twice_fails_even_with_points_to_spare() {
    let fx = fixture();
    let user = Uuid::new_v4();

    // plenty of balance
    let offer_owner = user;
    let offer = fx
        .exchange
        .create_offer(
            offer_owner,
            NewOffer {
                title: "E-waste - 20kg".to_string(),
                category: WasteCategory::Electronic,
                quantity_kg: 20,
                location: "Lajpat Nagar, Delhi".to_string(),
            },
        )
        .await
        .unwrap();
    fx.exchange.claim(offer.id, Uuid::new_v4()).await.unwrap();
    assert_eq!(fx.ledger.balance(user).await.unwrap(), 400);

    let voucher = fx
        .rewards
        .create_reward(NewReward {
            title: "Amazon Gift Card".to_string(),
            description: String::new(),
            point_cost: 100,
            sponsor: "Amazon".to_string(),
            category: "Shopping".to_string(),
            valid_from: Utc::now() - Duration::days(1),
            valid_until: Utc::now() + Duration::days(30),
        })
        .await
        .unwrap();

    let (_, balance) = fx.rewards.redeem(user, voucher.id, Utc::now()).await.unwrap();
    assert_eq!(balance, 300);

    let err = fx
        .rewards
        .redeem(user, voucher.id, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyRedeemed { .. }));
    assert_eq!(fx.ledger.balance(user).await.unwrap(), 300);
}
