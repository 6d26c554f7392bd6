use chitfund_common::pool::MonthlyPool;
use chitfund_common::types::{ChitStatus, MemberStatus, PaymentMode, PayoutMode};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Timestamp, Uint128};

use crate::state::{Chit, LiftRecord, Transaction};

#[cw_serde]
pub struct InstantiateMsg {}

/// Configuration for a new chit group.
#[cw_serde]
pub struct ChitParams {
    pub name: String,
    pub total_members: u32,
    pub monthly_contribution: Uint128,
    pub total_months: u32,
    pub extra_charge_per_month: Uint128,
    pub commission: Uint128,
    pub start_date: Timestamp,
    pub payout_mode: PayoutMode,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Create a new chit group. The sender becomes its organizer.
    CreateChit { params: ChitParams },
    /// Request to join a chit. Membership starts as pending.
    JoinChit { chit_id: u64 },
    /// Approve or reject a member. Organizer only.
    UpdateMemberStatus {
        chit_id: u64,
        member: String,
        status: MemberStatus,
    },
    /// Move an open chit to active. Organizer only.
    StartChit { chit_id: u64 },
    /// Record the sender's contribution for a month. Months must be paid
    /// strictly in order.
    RecordPayment {
        chit_id: u64,
        month: u32,
        payment_mode: Option<PaymentMode>,
    },
    /// Select the month's beneficiary. Organizer only.
    SelectBeneficiary {
        chit_id: u64,
        month: u32,
        member: String,
    },
    /// Advance the chit to the next month once the current month is
    /// fully paid and its beneficiary is selected. Organizer only.
    AdvanceMonth { chit_id: u64 },
    /// Rename or reschedule a chit that has not started. Organizer only.
    UpdateChit {
        chit_id: u64,
        name: Option<String>,
        start_date: Option<Timestamp>,
    },
    /// Remove a member and their transactions for this chit. Organizer
    /// only.
    RemoveMember { chit_id: u64, member: String },
    /// Delete a chit and everything referencing it. Organizer only.
    DeleteChit { chit_id: u64 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Chit)]
    Chit { chit_id: u64 },
    #[returns(Vec<ChitSummary>)]
    Chits {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    /// Payment and selection readiness for a month, with projected pool
    /// figures.
    #[returns(MonthStatusResponse)]
    MonthStatus { chit_id: u64, month: u32 },
    /// The member's first unpaid month and its amount breakdown.
    #[returns(CurrentDueResponse)]
    CurrentDue { chit_id: u64, member: String },
    #[returns(Vec<MonthPaymentEntry>)]
    PaymentHistory { chit_id: u64, member: String },
    /// Current-month collection totals split by payment mode.
    #[returns(PaymentStatisticsResponse)]
    PaymentStatistics { chit_id: u64 },
    #[returns(Vec<LiftRecord>)]
    LiftHistory { chit_id: u64 },
    #[returns(MemberLiftStatusResponse)]
    MemberLiftStatus { chit_id: u64, member: String },
    /// Approved members who have not lifted yet.
    #[returns(Vec<Addr>)]
    AvailableMembers { chit_id: u64 },
    #[returns(Vec<Transaction>)]
    ChitTransactions {
        chit_id: u64,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(Vec<Transaction>)]
    UserTransactions {
        user: String,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    /// Completed-payment totals across every chit the organizer runs.
    #[returns(OrganizerStatsResponse)]
    OrganizerStats {
        organizer: String,
        limit: Option<u32>,
    },
    /// Read-only snapshot of one month, shaped for report generation.
    #[returns(MonthlyReportResponse)]
    MonthlyReport { chit_id: u64, month: u32 },
}

#[cw_serde]
pub struct ChitSummary {
    pub id: u64,
    pub name: String,
    pub organizer: Addr,
    pub status: ChitStatus,
    pub payout_mode: PayoutMode,
    pub current_month: u32,
    pub total_months: u32,
    pub total_members: u32,
    pub member_count: u32,
    pub monthly_contribution: Uint128,
}

#[cw_serde]
pub struct MonthStatusResponse {
    pub month: u32,
    /// Approved members.
    pub total_members: u32,
    pub paid_count: u32,
    pub all_paid: bool,
    pub beneficiary_selected: bool,
    /// all_paid and no beneficiary yet.
    pub ready_for_selection: bool,
    /// Total actually collected for the month so far.
    pub collected: Uint128,
    pub projected: MonthlyPool,
}

#[cw_serde]
pub struct CurrentDueResponse {
    /// Every month of the chit is paid.
    pub all_paid: bool,
    /// Paid up to the chit's current month; nothing due right now.
    pub up_to_date: bool,
    pub month: Option<u32>,
    pub regular_amount: Option<Uint128>,
    pub extra_amount: Option<Uint128>,
    pub total_amount: Option<Uint128>,
    pub has_lifted: bool,
    pub lifted_in_month: Option<u32>,
    pub total_months: u32,
    pub paid_months: u32,
}

#[cw_serde]
pub enum MonthPaymentStatus {
    Paid,
    Due,
    Locked,
}

#[cw_serde]
pub struct MonthPaymentEntry {
    pub month: u32,
    pub status: MonthPaymentStatus,
    /// Actual total for paid months, the base contribution otherwise.
    pub amount: Uint128,
    pub extra_amount: Uint128,
    pub txn_id: Option<u64>,
    pub paid_at: Option<Timestamp>,
}

#[cw_serde]
pub struct PaymentStatisticsResponse {
    pub month: u32,
    pub total_collected: Uint128,
    pub total_online: Uint128,
    pub total_cash: Uint128,
    pub online_count: u32,
    pub cash_count: u32,
    pub total_payments: u32,
}

#[cw_serde]
pub struct OrganizerStatsResponse {
    pub chit_count: u32,
    /// Sum of every completed payment across the organizer's chits.
    pub total_collected: Uint128,
    /// Newest first.
    pub recent_transactions: Vec<Transaction>,
}

/// Everything a monthly statement needs in one read: the month's
/// payments, their mode split, the beneficiary record and the pool
/// figures.
#[cw_serde]
pub struct MonthlyReportResponse {
    pub chit_id: u64,
    pub name: String,
    pub organizer: Addr,
    pub month: u32,
    pub total_months: u32,
    pub approved_members: u32,
    pub payments: Vec<Transaction>,
    pub total_online: Uint128,
    pub total_cash: Uint128,
    pub total_collected: Uint128,
    pub lift: Option<LiftRecord>,
    pub pool: MonthlyPool,
}

#[cw_serde]
pub struct MemberLiftStatusResponse {
    pub has_lifted: bool,
    pub lifted_in_month: Option<u32>,
    pub lift: Option<LiftRecord>,
    /// Surcharge the lift implies for each month from the lift onward.
    pub extra_per_month: Uint128,
}
