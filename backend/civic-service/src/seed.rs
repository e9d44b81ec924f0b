//! Demo fixtures for the in-memory backend
//!
//! An admin account and a starter reward catalog, so a fresh dev instance is
//! usable immediately.

use chrono::{Duration, Utc};

use crate::error::Result;
use crate::models::{User, UserRole};
use crate::repository::{Store, UserStore};
use crate::services::{NewReward, RedemptionService, SessionService};

const DEMO_ADMIN_EMAIL: &str = "admin@example.com";

pub async fn seed_demo_data(store: &dyn Store, rewards: &RedemptionService) -> Result<()> {
    if store.user_by_email(DEMO_ADMIN_EMAIL).await?.is_some() {
        return Ok(());
    }

    let password = std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "changeme-admin".into());
    let admin = User::new(
        "Admin User".to_string(),
        DEMO_ADMIN_EMAIL.to_string(),
        SessionService::hash_password(&password)?,
        UserRole::Admin,
    );
    store.insert_user(&admin).await?;

    let now = Utc::now();
    let catalog = [
        ("Starbucks Coffee Voucher", "Get a free coffee at any Starbucks outlet", 50, "Starbucks", "Food & Beverage"),
        ("Ola Ride Credits", "Free ride credits for your next trip", 60, "Ola", "Transportation"),
        ("Swiggy Food Discount", "Get 20% off on your next food order", 75, "Swiggy", "Food & Beverage"),
        ("Urban Company Service Discount", "30% off on home cleaning services", 90, "Urban Company", "Home Services"),
        ("Amazon Gift Card", "Shop anything on Amazon with this gift card", 100, "Amazon", "Shopping"),
        ("BookMyShow Movie Ticket", "Free movie ticket at participating theaters", 120, "BookMyShow", "Entertainment"),
        ("Flipkart Electronics Voucher", "Discount on electronics purchases", 150, "Flipkart", "Electronics"),
        ("Zomato Gold Membership", "One month of exclusive discounts and free delivery", 200, "Zomato", "Food & Beverage"),
    ];

    for (title, description, point_cost, sponsor, category) in catalog {
        rewards
            .create_reward(NewReward {
                title: title.to_string(),
                description: description.to_string(),
                point_cost,
                sponsor: sponsor.to_string(),
                category: category.to_string(),
                valid_from: now,
                valid_until: now + Duration::days(365),
            })
            .await?;
    }

    tracing::info!(
        admin_email = DEMO_ADMIN_EMAIL,
        rewards = catalog.len(),
        "demo data seeded"
    );
    Ok(())
}
