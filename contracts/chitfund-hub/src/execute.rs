use chitfund_common::pool::{auction_terms, lift_terms, monthly_pool};
use chitfund_common::types::{ChitStatus, MemberStatus, PaymentMode, PayoutMode, TxnKind, TxnStatus};
use cosmwasm_std::{
    DepsMut, Env, Event, MessageInfo, Order, Response, StdResult, Storage, Timestamp, Uint128,
};
use cw_storage_plus::Bound;

use crate::error::ContractError;
use crate::msg::ChitParams;
use crate::state::{
    Chit, LiftRecord, Member, PayoutTerms, Transaction, CHITS, CHIT_TXNS, COMPLETED_PAYMENTS,
    LIFTS, MONTH_PAID_COUNT, NEXT_CHIT_ID, NEXT_TXN_ID, TRANSACTIONS, USER_TXNS,
};

const MIN_MEMBERS: u32 = 2;
const MAX_MEMBERS: u32 = 100;
const MIN_CONTRIBUTION: Uint128 = Uint128::new(1000);
const MIN_MONTHS: u32 = 3;
const MAX_MONTHS: u32 = 60;

fn load_chit(storage: &dyn Storage, chit_id: u64) -> Result<Chit, ContractError> {
    CHITS
        .may_load(storage, chit_id)?
        .ok_or(ContractError::ChitNotFound { chit_id })
}

fn ensure_organizer(chit: &Chit, info: &MessageInfo, action: &str) -> Result<(), ContractError> {
    if info.sender != chit.organizer {
        return Err(ContractError::Unauthorized {
            reason: format!("only the organizer can {}", action),
        });
    }
    Ok(())
}

fn next_txn_id(storage: &mut dyn Storage) -> StdResult<u64> {
    let id = NEXT_TXN_ID.load(storage)?;
    NEXT_TXN_ID.save(storage, &(id + 1))?;
    Ok(id)
}

fn insert_transaction(storage: &mut dyn Storage, txn: &Transaction) -> StdResult<()> {
    TRANSACTIONS.save(storage, txn.id, txn)?;
    CHIT_TXNS.save(storage, (txn.chit_id, txn.id), &())?;
    USER_TXNS.save(storage, (&txn.user, txn.id), &())?;
    Ok(())
}

/// Drop a transaction together with its indexes. Completed payments also
/// release their uniqueness entry and month counter.
fn remove_transaction(storage: &mut dyn Storage, txn: &Transaction) -> StdResult<()> {
    TRANSACTIONS.remove(storage, txn.id);
    CHIT_TXNS.remove(storage, (txn.chit_id, txn.id));
    USER_TXNS.remove(storage, (&txn.user, txn.id));
    if txn.kind == TxnKind::Payment && txn.status == TxnStatus::Completed {
        COMPLETED_PAYMENTS.remove(storage, (txn.chit_id, &txn.user, txn.month));
        let paid = MONTH_PAID_COUNT
            .may_load(storage, (txn.chit_id, txn.month))?
            .unwrap_or(0);
        if paid <= 1 {
            MONTH_PAID_COUNT.remove(storage, (txn.chit_id, txn.month));
        } else {
            MONTH_PAID_COUNT.save(storage, (txn.chit_id, txn.month), &(paid - 1))?;
        }
    }
    Ok(())
}

/// Create a new chit group with the sender as organizer.
pub fn create_chit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: ChitParams,
) -> Result<Response, ContractError> {
    if params.name.trim().is_empty() {
        return Err(ContractError::EmptyName);
    }
    if params.total_members < MIN_MEMBERS || params.total_members > MAX_MEMBERS {
        return Err(ContractError::MembersOutOfRange {
            value: params.total_members,
            min: MIN_MEMBERS,
            max: MAX_MEMBERS,
        });
    }
    if params.monthly_contribution < MIN_CONTRIBUTION {
        return Err(ContractError::ContributionTooLow {
            value: params.monthly_contribution,
            min: MIN_CONTRIBUTION,
        });
    }
    if params.total_months < MIN_MONTHS || params.total_months > MAX_MONTHS {
        return Err(ContractError::DurationOutOfRange {
            value: params.total_months,
            min: MIN_MONTHS,
            max: MAX_MONTHS,
        });
    }

    let chit_id = NEXT_CHIT_ID.load(deps.storage)?;
    NEXT_CHIT_ID.save(deps.storage, &(chit_id + 1))?;

    let chit = Chit {
        name: params.name,
        organizer: info.sender.clone(),
        total_members: params.total_members,
        monthly_contribution: params.monthly_contribution,
        total_months: params.total_months,
        extra_charge_per_month: params.extra_charge_per_month,
        commission: params.commission,
        current_month: 1,
        start_date: params.start_date,
        status: ChitStatus::Open,
        payout_mode: params.payout_mode,
        members: Vec::new(),
        created_at: env.block.time,
    };
    CHITS.save(deps.storage, chit_id, &chit)?;

    Ok(Response::new()
        .add_attribute("action", "create_chit")
        .add_attribute("chit_id", chit_id.to_string())
        .add_attribute("organizer", info.sender.to_string())
        .add_event(
            Event::new("chitfund_chit_created")
                .add_attribute("chit_id", chit_id.to_string())
                .add_attribute("name", chit.name.clone())
                .add_attribute("total_members", chit.total_members.to_string())
                .add_attribute("total_months", chit.total_months.to_string())
                .add_attribute(
                    "monthly_contribution",
                    chit.monthly_contribution.to_string(),
                ),
        ))
}

/// Request membership in a chit. The request starts as pending until the
/// organizer approves or rejects it.
pub fn join_chit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    chit_id: u64,
) -> Result<Response, ContractError> {
    let mut chit = load_chit(deps.storage, chit_id)?;

    // Joining is allowed while open, or while active with space left.
    if chit.status != ChitStatus::Open && chit.status != ChitStatus::Active {
        return Err(ContractError::NotJoinable);
    }
    if chit.member(&info.sender).is_some() {
        return Err(ContractError::AlreadyMember);
    }
    if chit.members.len() as u32 >= chit.total_members {
        return Err(ContractError::ChitFull {
            total_members: chit.total_members,
        });
    }

    chit.members.push(Member {
        user: info.sender.clone(),
        status: MemberStatus::Pending,
        has_lifted: false,
        lifted_in_month: None,
        joined_at: env.block.time,
    });
    CHITS.save(deps.storage, chit_id, &chit)?;

    Ok(Response::new()
        .add_attribute("action", "join_chit")
        .add_attribute("chit_id", chit_id.to_string())
        .add_attribute("member", info.sender.to_string()))
}

/// Approve or reject a membership request. Organizer only.
pub fn update_member_status(
    deps: DepsMut,
    info: MessageInfo,
    chit_id: u64,
    member: String,
    status: MemberStatus,
) -> Result<Response, ContractError> {
    let member_addr = deps.api.addr_validate(&member)?;
    let mut chit = load_chit(deps.storage, chit_id)?;
    ensure_organizer(&chit, &info, "update member status")?;

    if status == MemberStatus::Pending {
        return Err(ContractError::InvalidMemberStatus);
    }

    let entry = chit
        .member_mut(&member_addr)
        .ok_or(ContractError::MemberNotFound {
            address: member.clone(),
        })?;
    entry.status = status.clone();
    CHITS.save(deps.storage, chit_id, &chit)?;

    Ok(Response::new()
        .add_attribute("action", "update_member_status")
        .add_attribute("chit_id", chit_id.to_string())
        .add_attribute("member", member)
        .add_attribute("status", format!("{:?}", status)))
}

/// Move an open chit to active. Organizer only.
pub fn start_chit(
    deps: DepsMut,
    info: MessageInfo,
    chit_id: u64,
) -> Result<Response, ContractError> {
    let mut chit = load_chit(deps.storage, chit_id)?;
    ensure_organizer(&chit, &info, "start the chit")?;

    if chit.status != ChitStatus::Open {
        return Err(ContractError::ChitNotOpen);
    }
    chit.status = ChitStatus::Active;
    CHITS.save(deps.storage, chit_id, &chit)?;

    Ok(Response::new()
        .add_attribute("action", "start_chit")
        .add_attribute("chit_id", chit_id.to_string())
        .add_event(
            Event::new("chitfund_chit_started").add_attribute("chit_id", chit_id.to_string()),
        ))
}

/// Record the sender's monthly contribution. Months must be paid
/// strictly in order, one completed payment per month.
pub fn record_payment(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    chit_id: u64,
    month: u32,
    payment_mode: Option<PaymentMode>,
) -> Result<Response, ContractError> {
    let chit = load_chit(deps.storage, chit_id)?;

    if month < 1 || month > chit.total_months {
        return Err(ContractError::InvalidMonth {
            month,
            total_months: chit.total_months,
        });
    }

    if month > 1 {
        let paid_before = COMPLETED_PAYMENTS
            .prefix((chit_id, &info.sender))
            .keys(
                deps.storage,
                None,
                Some(Bound::exclusive(month)),
                Order::Ascending,
            )
            .count() as u32;
        if paid_before != month - 1 {
            return Err(ContractError::PaymentOutOfSequence {
                next_month: paid_before + 1,
            });
        }
    }

    if COMPLETED_PAYMENTS.has(deps.storage, (chit_id, &info.sender, month)) {
        return Err(ContractError::DuplicatePayment { month });
    }

    let regular_amount = chit.monthly_contribution;
    let extra_amount = chit.extra_amount_for(&info.sender, month);
    let total_amount = regular_amount + extra_amount;
    let payment_mode = payment_mode.unwrap_or(PaymentMode::Online);

    let txn = Transaction {
        id: next_txn_id(deps.storage)?,
        user: info.sender.clone(),
        chit_id,
        month,
        regular_amount,
        extra_amount,
        total_amount,
        kind: TxnKind::Payment,
        status: TxnStatus::Completed,
        payment_mode: payment_mode.clone(),
        description: None,
        created_at: env.block.time,
    };
    insert_transaction(deps.storage, &txn)?;
    COMPLETED_PAYMENTS.save(deps.storage, (chit_id, &info.sender, month), &txn.id)?;

    let paid = MONTH_PAID_COUNT
        .may_load(deps.storage, (chit_id, month))?
        .unwrap_or(0);
    MONTH_PAID_COUNT.save(deps.storage, (chit_id, month), &(paid + 1))?;

    Ok(Response::new()
        .add_attribute("action", "record_payment")
        .add_attribute("chit_id", chit_id.to_string())
        .add_attribute("month", month.to_string())
        .add_attribute("txn_id", txn.id.to_string())
        .add_event(
            Event::new("chitfund_payment_recorded")
                .add_attribute("chit_id", chit_id.to_string())
                .add_attribute("user", info.sender.to_string())
                .add_attribute("month", month.to_string())
                .add_attribute("regular_amount", regular_amount.to_string())
                .add_attribute("extra_amount", extra_amount.to_string())
                .add_attribute("total_amount", total_amount.to_string())
                .add_attribute("payment_mode", format!("{:?}", payment_mode)),
        ))
}

/// Select the month's beneficiary and write the payout record. The
/// gating checks run in a fixed order; the first failure wins.
pub fn select_beneficiary(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    chit_id: u64,
    month: u32,
    member: String,
) -> Result<Response, ContractError> {
    let member_addr = deps.api.addr_validate(&member)?;
    let mut chit = load_chit(deps.storage, chit_id)?;

    ensure_organizer(&chit, &info, "select the beneficiary")?;

    if month < 1 || month > chit.total_months {
        return Err(ContractError::InvalidMonth {
            month,
            total_months: chit.total_months,
        });
    }

    if LIFTS.has(deps.storage, (chit_id, month)) {
        return Err(ContractError::AlreadySelected { month });
    }

    let approved: Vec<_> = chit.approved_members().map(|m| m.user.clone()).collect();
    let required = approved.len() as u32;
    if required == 0 {
        return Err(ContractError::NoApprovedMembers);
    }

    let paid = MONTH_PAID_COUNT
        .may_load(deps.storage, (chit_id, month))?
        .unwrap_or(0);
    if paid < required {
        return Err(ContractError::InsufficientPayments {
            paid,
            required,
            month,
        });
    }

    // One payout per member over the life of the chit.
    let prior: Vec<LiftRecord> = LIFTS
        .prefix(chit_id)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|r| r.map(|(_, lift)| lift))
        .collect::<StdResult<_>>()?;
    if let Some(earlier) = prior.iter().find(|l| l.member == member_addr) {
        return Err(ContractError::AlreadyBeneficiary {
            month: earlier.month,
        });
    }

    if !approved.contains(&member_addr) {
        return Err(ContractError::NotApprovedMember);
    }

    let prior_lifters = prior.iter().filter(|l| l.month < month).count() as u32;
    let pool = monthly_pool(
        chit.monthly_contribution,
        required,
        prior_lifters,
        chit.extra_charge_per_month,
        chit.commission,
    );

    let (payout, terms) = match chit.payout_mode {
        PayoutMode::Lift => {
            let t = lift_terms(chit.total_months, month, chit.extra_charge_per_month);
            (
                pool.payout,
                PayoutTerms::Lift {
                    remaining_months: t.remaining_months,
                    extra_per_month: t.extra_per_month,
                    extra_due_total: t.extra_due_total,
                },
            )
        }
        PayoutMode::Auction => {
            let t = auction_terms(pool.total_pool, required, chit.total_months, month);
            (
                t.amount_received,
                PayoutTerms::Auction {
                    deduction: t.deduction,
                    dividend_per_member: t.dividend_per_member,
                },
            )
        }
    };

    let record = LiftRecord {
        month,
        member: member_addr.clone(),
        payout,
        base_collection: pool.base_collection,
        extra_collection: pool.extra_collection,
        total_pool: pool.total_pool,
        commission: pool.commission,
        terms: terms.clone(),
        lifted_at: env.block.time,
    };
    LIFTS.save(deps.storage, (chit_id, month), &record)?;

    let entry = chit
        .member_mut(&member_addr)
        .ok_or(ContractError::NotApprovedMember)?;
    entry.has_lifted = true;
    entry.lifted_in_month = Some(month);
    CHITS.save(deps.storage, chit_id, &chit)?;

    let payout_txn = Transaction {
        id: next_txn_id(deps.storage)?,
        user: member_addr.clone(),
        chit_id,
        month,
        regular_amount: payout,
        extra_amount: Uint128::zero(),
        total_amount: payout,
        kind: TxnKind::Lift,
        status: TxnStatus::Completed,
        payment_mode: PaymentMode::Online,
        description: Some(format!("Payout for month {}", month)),
        created_at: env.block.time,
    };
    insert_transaction(deps.storage, &payout_txn)?;

    // Auction mode returns the deduction to the members as dividends.
    if let PayoutTerms::Auction {
        dividend_per_member,
        ..
    } = &terms
    {
        if !dividend_per_member.is_zero() {
            for user in &approved {
                let dividend = Transaction {
                    id: next_txn_id(deps.storage)?,
                    user: user.clone(),
                    chit_id,
                    month,
                    regular_amount: *dividend_per_member,
                    extra_amount: Uint128::zero(),
                    total_amount: *dividend_per_member,
                    kind: TxnKind::Dividend,
                    status: TxnStatus::Completed,
                    payment_mode: PaymentMode::Online,
                    description: Some(format!("Dividend from month {} distribution", month)),
                    created_at: env.block.time,
                };
                insert_transaction(deps.storage, &dividend)?;
            }
        }
    }

    let mode_str = match chit.payout_mode {
        PayoutMode::Lift => "lift",
        PayoutMode::Auction => "auction",
    };

    Ok(Response::new()
        .add_attribute("action", "select_beneficiary")
        .add_attribute("chit_id", chit_id.to_string())
        .add_attribute("month", month.to_string())
        .add_attribute("member", member_addr.to_string())
        .add_attribute("payout", payout.to_string())
        .add_event(
            Event::new("chitfund_beneficiary_selected")
                .add_attribute("chit_id", chit_id.to_string())
                .add_attribute("month", month.to_string())
                .add_attribute("member", member_addr.to_string())
                .add_attribute("payout_mode", mode_str)
                .add_attribute("base_collection", pool.base_collection.to_string())
                .add_attribute("extra_collection", pool.extra_collection.to_string())
                .add_attribute("total_pool", pool.total_pool.to_string())
                .add_attribute("payout", payout.to_string()),
        ))
}

/// Advance to the next month once every approved member has paid the
/// current month and its beneficiary is selected. Advancing the final
/// month completes the chit. Organizer only.
pub fn advance_month(
    deps: DepsMut,
    info: MessageInfo,
    chit_id: u64,
) -> Result<Response, ContractError> {
    let mut chit = load_chit(deps.storage, chit_id)?;
    ensure_organizer(&chit, &info, "advance the month")?;

    match chit.status {
        ChitStatus::Active => {}
        ChitStatus::Completed => return Err(ContractError::ChitCompleted),
        ChitStatus::Open => return Err(ContractError::ChitNotActive),
    }

    let month = chit.current_month;
    let mut unpaid = 0u32;
    for m in chit.approved_members() {
        if !COMPLETED_PAYMENTS.has(deps.storage, (chit_id, &m.user, month)) {
            unpaid += 1;
        }
    }
    if unpaid > 0 {
        return Err(ContractError::MembersUnpaid { unpaid, month });
    }

    if !LIFTS.has(deps.storage, (chit_id, month)) {
        return Err(ContractError::BeneficiaryNotSelected { month });
    }

    chit.current_month += 1;
    let completed = chit.current_month > chit.total_months;
    if completed {
        chit.status = ChitStatus::Completed;
    }
    CHITS.save(deps.storage, chit_id, &chit)?;

    Ok(Response::new()
        .add_attribute("action", "advance_month")
        .add_attribute("chit_id", chit_id.to_string())
        .add_attribute("current_month", chit.current_month.to_string())
        .add_event(
            Event::new("chitfund_month_advanced")
                .add_attribute("chit_id", chit_id.to_string())
                .add_attribute("from_month", month.to_string())
                .add_attribute("current_month", chit.current_month.to_string())
                .add_attribute("completed", completed.to_string()),
        ))
}

/// Rename or reschedule a chit that has not started. Organizer only.
pub fn update_chit(
    deps: DepsMut,
    info: MessageInfo,
    chit_id: u64,
    name: Option<String>,
    start_date: Option<Timestamp>,
) -> Result<Response, ContractError> {
    let mut chit = load_chit(deps.storage, chit_id)?;
    ensure_organizer(&chit, &info, "update the chit")?;

    if chit.status != ChitStatus::Open {
        return Err(ContractError::ChitNotOpen);
    }

    if let Some(new_name) = name {
        if new_name.trim().is_empty() {
            return Err(ContractError::EmptyName);
        }
        chit.name = new_name;
    }
    if let Some(new_start) = start_date {
        chit.start_date = new_start;
    }
    CHITS.save(deps.storage, chit_id, &chit)?;

    Ok(Response::new()
        .add_attribute("action", "update_chit")
        .add_attribute("chit_id", chit_id.to_string()))
}

/// Remove a member and cascade-delete their transactions for this chit.
/// Organizer only.
pub fn remove_member(
    deps: DepsMut,
    info: MessageInfo,
    chit_id: u64,
    member: String,
) -> Result<Response, ContractError> {
    let member_addr = deps.api.addr_validate(&member)?;
    let mut chit = load_chit(deps.storage, chit_id)?;
    ensure_organizer(&chit, &info, "remove a member")?;

    let before = chit.members.len();
    chit.members.retain(|m| m.user != member_addr);
    if chit.members.len() == before {
        return Err(ContractError::MemberNotFound { address: member });
    }
    CHITS.save(deps.storage, chit_id, &chit)?;

    let txn_ids: Vec<u64> = CHIT_TXNS
        .prefix(chit_id)
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    let mut removed = 0u32;
    for id in txn_ids {
        let txn = TRANSACTIONS.load(deps.storage, id)?;
        if txn.user == member_addr {
            remove_transaction(deps.storage, &txn)?;
            removed += 1;
        }
    }

    Ok(Response::new()
        .add_attribute("action", "remove_member")
        .add_attribute("chit_id", chit_id.to_string())
        .add_attribute("member", member_addr.to_string())
        .add_attribute("transactions_removed", removed.to_string()))
}

/// Delete a chit together with its lift records and every transaction
/// referencing it. Organizer only.
pub fn delete_chit(
    deps: DepsMut,
    info: MessageInfo,
    chit_id: u64,
) -> Result<Response, ContractError> {
    let chit = load_chit(deps.storage, chit_id)?;
    ensure_organizer(&chit, &info, "delete the chit")?;

    let txn_ids: Vec<u64> = CHIT_TXNS
        .prefix(chit_id)
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    for id in &txn_ids {
        let txn = TRANSACTIONS.load(deps.storage, *id)?;
        remove_transaction(deps.storage, &txn)?;
    }

    let months: Vec<u32> = LIFTS
        .prefix(chit_id)
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    for m in months {
        LIFTS.remove(deps.storage, (chit_id, m));
    }

    CHITS.remove(deps.storage, chit_id);

    Ok(Response::new()
        .add_attribute("action", "delete_chit")
        .add_attribute("chit_id", chit_id.to_string())
        .add_attribute("transactions_removed", txn_ids.len().to_string()))
}
