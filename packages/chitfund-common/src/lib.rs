pub mod pool;
pub mod types;

pub use pool::{auction_terms, lift_terms, monthly_pool, AuctionTerms, LiftTerms, MonthlyPool};
pub use types::{ChitStatus, MemberStatus, PaymentMode, PayoutMode, TxnKind, TxnStatus};
