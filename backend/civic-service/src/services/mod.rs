pub mod exchange;
pub mod ledger;
pub mod lifecycle;
pub mod locks;
pub mod redemption;
pub mod session;

pub use exchange::{ClaimOutcome, NewOffer, WasteExchange};
pub use ledger::PointsLedger;
pub use lifecycle::{NewReport, ReportService};
pub use locks::EntityLocks;
pub use redemption::{NewReward, RedemptionService};
pub use session::{AuthenticatedUser, SessionService};
