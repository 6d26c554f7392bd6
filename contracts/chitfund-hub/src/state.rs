use chitfund_common::types::{
    ChitStatus, MemberStatus, PaymentMode, PayoutMode, TxnKind, TxnStatus,
};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

pub const NEXT_CHIT_ID: Item<u64> = Item::new("next_chit_id");
pub const CHITS: Map<u64, Chit> = Map::new("chits");

/// Beneficiary records keyed by (chit_id, month). The key itself is the
/// at-most-one-record-per-month constraint.
pub const LIFTS: Map<(u64, u32), LiftRecord> = Map::new("lifts");

pub const NEXT_TXN_ID: Item<u64> = Item::new("next_txn_id");
pub const TRANSACTIONS: Map<u64, Transaction> = Map::new("txns");

/// (chit_id, user, month) -> transaction id. At most one completed
/// payment per key; also serves as the per-user paid-month index for the
/// sequential-payment gate.
pub const COMPLETED_PAYMENTS: Map<(u64, &Addr, u32), u64> = Map::new("completed_payments");

/// Completed-payment count per (chit_id, month). Maintained on every
/// payment write and removal to avoid iterating transactions in the
/// gating checks.
pub const MONTH_PAID_COUNT: Map<(u64, u32), u32> = Map::new("month_paid_count");

/// Secondary indexes over transactions.
pub const CHIT_TXNS: Map<(u64, u64), ()> = Map::new("chit_txns");
pub const USER_TXNS: Map<(&Addr, u64), ()> = Map::new("user_txns");

#[cw_serde]
pub struct Chit {
    pub name: String,
    pub organizer: Addr,
    pub total_members: u32,
    pub monthly_contribution: Uint128,
    pub total_months: u32,
    pub extra_charge_per_month: Uint128,
    /// Fixed amount the organizer retains from each month's pool.
    pub commission: Uint128,
    /// 1-based; reaches total_months + 1 when the chit completes.
    pub current_month: u32,
    pub start_date: Timestamp,
    pub status: ChitStatus,
    pub payout_mode: PayoutMode,
    /// In join order.
    pub members: Vec<Member>,
    pub created_at: Timestamp,
}

impl Chit {
    pub fn member(&self, user: &Addr) -> Option<&Member> {
        self.members.iter().find(|m| m.user == *user)
    }

    pub fn member_mut(&mut self, user: &Addr) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.user == *user)
    }

    pub fn approved_members(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|m| m.status == MemberStatus::Approved)
    }

    /// Surcharge owed by `user` in `month`. The extra charge applies to
    /// every month from the lift month onward, the lift month included.
    pub fn extra_amount_for(&self, user: &Addr, month: u32) -> Uint128 {
        match self.member(user).and_then(|m| m.lifted_in_month) {
            Some(lifted) if lifted <= month => self.extra_charge_per_month,
            _ => Uint128::zero(),
        }
    }
}

#[cw_serde]
pub struct Member {
    pub user: Addr,
    pub status: MemberStatus,
    pub has_lifted: bool,
    pub lifted_in_month: Option<u32>,
    pub joined_at: Timestamp,
}

/// One month's beneficiary. Immutable once written.
#[cw_serde]
pub struct LiftRecord {
    pub month: u32,
    pub member: Addr,
    /// Amount the beneficiary actually receives.
    pub payout: Uint128,
    pub base_collection: Uint128,
    pub extra_collection: Uint128,
    pub total_pool: Uint128,
    pub commission: Uint128,
    pub terms: PayoutTerms,
    pub lifted_at: Timestamp,
}

/// Strategy-specific figures recorded with the beneficiary.
#[cw_serde]
pub enum PayoutTerms {
    Lift {
        remaining_months: u32,
        extra_per_month: Uint128,
        extra_due_total: Uint128,
    },
    Auction {
        deduction: Uint128,
        dividend_per_member: Uint128,
    },
}

#[cw_serde]
pub struct Transaction {
    pub id: u64,
    pub user: Addr,
    pub chit_id: u64,
    pub month: u32,
    pub regular_amount: Uint128,
    pub extra_amount: Uint128,
    /// regular_amount + extra_amount, fixed at creation.
    pub total_amount: Uint128,
    pub kind: TxnKind,
    pub status: TxnStatus,
    pub payment_mode: PaymentMode,
    pub description: Option<String>,
    pub created_at: Timestamp,
}
