pub mod ledger;
pub mod offer;
pub mod report;
pub mod reward;
pub mod user;

pub use ledger::{LedgerEntry, ReasonCode};
pub use offer::{OfferStatus, WasteCategory, WasteOffer};
pub use report::{Comment, Report, ReportCategory, ReportStatus, Severity};
pub use reward::{Redemption, RewardItem};
pub use user::{User, UserRole};
