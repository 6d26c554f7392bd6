use cosmwasm_schema::cw_serde;

/// Lifecycle of a chit group. Transitions are monotonic:
/// Open -> Active -> Completed.
#[cw_serde]
pub enum ChitStatus {
    Open,
    Active,
    Completed,
}

/// Participation state of a member within a chit.
#[cw_serde]
pub enum MemberStatus {
    Pending,
    Approved,
    Rejected,
}

/// The payout strategy a chit runs on: lift (fixed commission retained
/// from the pool) or auction (pool discounted by outstanding months, the
/// discount redistributed as dividends).
#[cw_serde]
pub enum PayoutMode {
    Lift,
    Auction,
}

#[cw_serde]
pub enum TxnKind {
    Payment,
    Dividend,
    Lift,
}

#[cw_serde]
pub enum TxnStatus {
    Pending,
    Completed,
    Failed,
}

#[cw_serde]
pub enum PaymentMode {
    Online,
    Cash,
}
