use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("chit {chit_id} not found")]
    ChitNotFound { chit_id: u64 },

    #[error("chit name must not be empty")]
    EmptyName,

    #[error("total members must be between {min} and {max}, got {value}")]
    MembersOutOfRange { value: u32, min: u32, max: u32 },

    #[error("monthly contribution must be at least {min}, got {value}")]
    ContributionTooLow { value: Uint128, min: Uint128 },

    #[error("duration must be between {min} and {max} months, got {value}")]
    DurationOutOfRange { value: u32, min: u32, max: u32 },

    #[error("chit is not open for joining")]
    NotJoinable,

    #[error("already requested to join or joined")]
    AlreadyMember,

    #[error("chit is full ({total_members} members)")]
    ChitFull { total_members: u32 },

    #[error("member {address} not found in this chit")]
    MemberNotFound { address: String },

    #[error("member status must be approved or rejected")]
    InvalidMemberStatus,

    #[error("chit is not open")]
    ChitNotOpen,

    #[error("chit must be active")]
    ChitNotActive,

    #[error("chit has already completed all months")]
    ChitCompleted,

    #[error("invalid month {month}: must be between 1 and {total_months}")]
    InvalidMonth { month: u32, total_months: u32 },

    #[error("pay previous months first: month {next_month} is due")]
    PaymentOutOfSequence { next_month: u32 },

    #[error("month {month} is already paid")]
    DuplicatePayment { month: u32 },

    #[error("beneficiary already selected for month {month}")]
    AlreadySelected { month: u32 },

    #[error("no approved members in this chit")]
    NoApprovedMembers,

    #[error("only {paid} of {required} members have paid for month {month}")]
    InsufficientPayments {
        paid: u32,
        required: u32,
        month: u32,
    },

    #[error("member already received the payout in month {month}")]
    AlreadyBeneficiary { month: u32 },

    #[error("member must be an approved participant")]
    NotApprovedMember,

    #[error("{unpaid} member(s) have not paid for month {month}")]
    MembersUnpaid { unpaid: u32, month: u32 },

    #[error("no beneficiary selected for month {month}")]
    BeneficiaryNotSelected { month: u32 },
}
