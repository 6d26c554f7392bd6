use chitfund_common::pool::monthly_pool;
use chitfund_common::types::{MemberStatus, PaymentMode, TxnKind, TxnStatus};
use cosmwasm_std::{to_json_binary, Binary, Deps, Order, StdError, StdResult, Storage, Uint128};
use cw_storage_plus::Bound;

use crate::msg::{
    ChitSummary, CurrentDueResponse, MemberLiftStatusResponse, MonthPaymentEntry,
    MonthPaymentStatus, MonthStatusResponse, MonthlyReportResponse, OrganizerStatsResponse,
    PaymentStatisticsResponse,
};
use crate::state::{Transaction, CHITS, CHIT_TXNS, COMPLETED_PAYMENTS, LIFTS, TRANSACTIONS, USER_TXNS};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 100;

pub fn query_chit(deps: Deps, chit_id: u64) -> StdResult<Binary> {
    let chit = CHITS.load(deps.storage, chit_id)?;
    to_json_binary(&chit)
}

pub fn query_chits(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let summaries: Vec<ChitSummary> = CHITS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(id, chit)| ChitSummary {
            id,
            name: chit.name.clone(),
            organizer: chit.organizer.clone(),
            status: chit.status.clone(),
            payout_mode: chit.payout_mode.clone(),
            current_month: chit.current_month,
            total_months: chit.total_months,
            total_members: chit.total_members,
            member_count: chit.members.len() as u32,
            monthly_contribution: chit.monthly_contribution,
        })
        .collect();

    to_json_binary(&summaries)
}

/// Completed payment transactions of a chit for one month.
fn month_payments(storage: &dyn Storage, chit_id: u64, month: u32) -> StdResult<Vec<Transaction>> {
    let mut payments = Vec::new();
    for key in CHIT_TXNS
        .prefix(chit_id)
        .keys(storage, None, None, Order::Ascending)
    {
        let txn = TRANSACTIONS.load(storage, key?)?;
        if txn.month == month && txn.kind == TxnKind::Payment && txn.status == TxnStatus::Completed
        {
            payments.push(txn);
        }
    }
    Ok(payments)
}

pub fn query_month_status(deps: Deps, chit_id: u64, month: u32) -> StdResult<Binary> {
    let chit = CHITS.load(deps.storage, chit_id)?;

    let approved = chit.approved_members().count() as u32;
    let payments = month_payments(deps.storage, chit_id, month)?;
    let paid_count = payments.len() as u32;
    let collected: Uint128 = payments.iter().map(|t| t.total_amount).sum();

    let beneficiary_selected = LIFTS.has(deps.storage, (chit_id, month));
    let prior_lifters = LIFTS
        .prefix(chit_id)
        .keys(
            deps.storage,
            None,
            Some(Bound::exclusive(month)),
            Order::Ascending,
        )
        .count() as u32;

    let projected = monthly_pool(
        chit.monthly_contribution,
        approved,
        prior_lifters,
        chit.extra_charge_per_month,
        chit.commission,
    );

    let all_paid = paid_count >= approved;
    to_json_binary(&MonthStatusResponse {
        month,
        total_members: approved,
        paid_count,
        all_paid,
        beneficiary_selected,
        ready_for_selection: all_paid && !beneficiary_selected,
        collected,
        projected,
    })
}

pub fn query_current_due(deps: Deps, chit_id: u64, member: String) -> StdResult<Binary> {
    let member_addr = deps.api.addr_validate(&member)?;
    let chit = CHITS.load(deps.storage, chit_id)?;

    let entry = chit
        .member(&member_addr)
        .filter(|m| m.status == MemberStatus::Approved)
        .ok_or_else(|| StdError::generic_err("not an approved member of this chit"))?;
    let has_lifted = entry.has_lifted;
    let lifted_in_month = entry.lifted_in_month;

    let paid_months: Vec<u32> = COMPLETED_PAYMENTS
        .prefix((chit_id, &member_addr))
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    let first_unpaid = (1..=chit.total_months).find(|m| !paid_months.contains(m));

    let response = match first_unpaid {
        None => CurrentDueResponse {
            all_paid: true,
            up_to_date: true,
            month: None,
            regular_amount: None,
            extra_amount: None,
            total_amount: None,
            has_lifted,
            lifted_in_month,
            total_months: chit.total_months,
            paid_months: paid_months.len() as u32,
        },
        Some(due) if due > chit.current_month => CurrentDueResponse {
            all_paid: false,
            up_to_date: true,
            month: None,
            regular_amount: None,
            extra_amount: None,
            total_amount: None,
            has_lifted,
            lifted_in_month,
            total_months: chit.total_months,
            paid_months: paid_months.len() as u32,
        },
        Some(due) => {
            let regular = chit.monthly_contribution;
            let extra = chit.extra_amount_for(&member_addr, due);
            CurrentDueResponse {
                all_paid: false,
                up_to_date: false,
                month: Some(due),
                regular_amount: Some(regular),
                extra_amount: Some(extra),
                total_amount: Some(regular + extra),
                has_lifted,
                lifted_in_month,
                total_months: chit.total_months,
                paid_months: paid_months.len() as u32,
            }
        }
    };

    to_json_binary(&response)
}

pub fn query_payment_history(deps: Deps, chit_id: u64, member: String) -> StdResult<Binary> {
    let member_addr = deps.api.addr_validate(&member)?;
    let chit = CHITS.load(deps.storage, chit_id)?;

    if chit.member(&member_addr).is_none() {
        return Err(StdError::generic_err("not a member of this chit"));
    }

    let paid_months: Vec<u32> = COMPLETED_PAYMENTS
        .prefix((chit_id, &member_addr))
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;

    let mut history = Vec::with_capacity(chit.total_months as usize);
    for month in 1..=chit.total_months {
        if let Some(txn_id) =
            COMPLETED_PAYMENTS.may_load(deps.storage, (chit_id, &member_addr, month))?
        {
            let txn = TRANSACTIONS.load(deps.storage, txn_id)?;
            history.push(MonthPaymentEntry {
                month,
                status: MonthPaymentStatus::Paid,
                amount: txn.total_amount,
                extra_amount: txn.extra_amount,
                txn_id: Some(txn_id),
                paid_at: Some(txn.created_at),
            });
        } else {
            // Due only when it is the next unpaid month and the chit has
            // reached it; everything else is locked.
            let is_next_unpaid = month == paid_months.len() as u32 + 1;
            let is_due = is_next_unpaid && month <= chit.current_month;
            history.push(MonthPaymentEntry {
                month,
                status: if is_due {
                    MonthPaymentStatus::Due
                } else {
                    MonthPaymentStatus::Locked
                },
                amount: chit.monthly_contribution,
                extra_amount: Uint128::zero(),
                txn_id: None,
                paid_at: None,
            });
        }
    }

    to_json_binary(&history)
}

pub fn query_payment_statistics(deps: Deps, chit_id: u64) -> StdResult<Binary> {
    let chit = CHITS.load(deps.storage, chit_id)?;
    let payments = month_payments(deps.storage, chit_id, chit.current_month)?;

    let mut total_online = Uint128::zero();
    let mut total_cash = Uint128::zero();
    let mut online_count = 0u32;
    let mut cash_count = 0u32;
    for txn in &payments {
        match txn.payment_mode {
            PaymentMode::Online => {
                total_online += txn.total_amount;
                online_count += 1;
            }
            PaymentMode::Cash => {
                total_cash += txn.total_amount;
                cash_count += 1;
            }
        }
    }

    to_json_binary(&PaymentStatisticsResponse {
        month: chit.current_month,
        total_collected: total_online + total_cash,
        total_online,
        total_cash,
        online_count,
        cash_count,
        total_payments: payments.len() as u32,
    })
}

pub fn query_lift_history(deps: Deps, chit_id: u64) -> StdResult<Binary> {
    CHITS.load(deps.storage, chit_id)?;
    let lifts: Vec<_> = LIFTS
        .prefix(chit_id)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|r| r.map(|(_, lift)| lift))
        .collect::<StdResult<_>>()?;
    to_json_binary(&lifts)
}

pub fn query_member_lift_status(deps: Deps, chit_id: u64, member: String) -> StdResult<Binary> {
    let member_addr = deps.api.addr_validate(&member)?;
    let chit = CHITS.load(deps.storage, chit_id)?;

    let entry = chit
        .member(&member_addr)
        .ok_or_else(|| StdError::generic_err("member not found in this chit"))?;

    let lift = match entry.lifted_in_month {
        Some(month) => LIFTS.may_load(deps.storage, (chit_id, month))?,
        None => None,
    };
    let extra_per_month = if entry.has_lifted {
        chit.extra_charge_per_month
    } else {
        Uint128::zero()
    };

    to_json_binary(&MemberLiftStatusResponse {
        has_lifted: entry.has_lifted,
        lifted_in_month: entry.lifted_in_month,
        lift,
        extra_per_month,
    })
}

pub fn query_available_members(deps: Deps, chit_id: u64) -> StdResult<Binary> {
    let chit = CHITS.load(deps.storage, chit_id)?;
    let available: Vec<_> = chit
        .approved_members()
        .filter(|m| !m.has_lifted)
        .map(|m| m.user.clone())
        .collect();
    to_json_binary(&available)
}

pub fn query_chit_transactions(
    deps: Deps,
    chit_id: u64,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let mut txns = Vec::new();
    for key in CHIT_TXNS
        .prefix(chit_id)
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit)
    {
        txns.push(TRANSACTIONS.load(deps.storage, key?)?);
    }
    to_json_binary(&txns)
}

pub fn query_organizer_stats(
    deps: Deps,
    organizer: String,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let organizer = deps.api.addr_validate(&organizer)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;

    let chit_ids: Vec<u64> = CHITS
        .range(deps.storage, None, None, Order::Ascending)
        .filter_map(|r| r.ok())
        .filter(|(_, chit)| chit.organizer == organizer)
        .map(|(id, _)| id)
        .collect();

    let mut total_collected = Uint128::zero();
    let mut payments: Vec<Transaction> = Vec::new();
    for chit_id in &chit_ids {
        for key in CHIT_TXNS
            .prefix(*chit_id)
            .keys(deps.storage, None, None, Order::Ascending)
        {
            let txn = TRANSACTIONS.load(deps.storage, key?)?;
            if txn.kind == TxnKind::Payment && txn.status == TxnStatus::Completed {
                total_collected += txn.total_amount;
                payments.push(txn);
            }
        }
    }
    payments.sort_by(|a, b| b.id.cmp(&a.id));
    payments.truncate(limit);

    to_json_binary(&OrganizerStatsResponse {
        chit_count: chit_ids.len() as u32,
        total_collected,
        recent_transactions: payments,
    })
}

/// One month of a chit as a report generator consumes it: payments with
/// their mode split, the beneficiary record and the pool figures.
pub fn query_monthly_report(deps: Deps, chit_id: u64, month: u32) -> StdResult<Binary> {
    let chit = CHITS.load(deps.storage, chit_id)?;
    if month < 1 || month > chit.total_months {
        return Err(StdError::generic_err(format!(
            "invalid month {}: must be between 1 and {}",
            month, chit.total_months
        )));
    }

    let approved = chit.approved_members().count() as u32;
    let payments = month_payments(deps.storage, chit_id, month)?;
    let mut total_online = Uint128::zero();
    let mut total_cash = Uint128::zero();
    for txn in &payments {
        match txn.payment_mode {
            PaymentMode::Online => total_online += txn.total_amount,
            PaymentMode::Cash => total_cash += txn.total_amount,
        }
    }

    let lift = LIFTS.may_load(deps.storage, (chit_id, month))?;
    let prior_lifters = LIFTS
        .prefix(chit_id)
        .keys(
            deps.storage,
            None,
            Some(Bound::exclusive(month)),
            Order::Ascending,
        )
        .count() as u32;
    let pool = monthly_pool(
        chit.monthly_contribution,
        approved,
        prior_lifters,
        chit.extra_charge_per_month,
        chit.commission,
    );

    to_json_binary(&MonthlyReportResponse {
        chit_id,
        name: chit.name.clone(),
        organizer: chit.organizer.clone(),
        month,
        total_months: chit.total_months,
        approved_members: approved,
        total_online,
        total_cash,
        total_collected: total_online + total_cash,
        payments,
        lift,
        pool,
    })
}

pub fn query_user_transactions(
    deps: Deps,
    user: String,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&user)?;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let mut txns = Vec::new();
    for key in USER_TXNS
        .prefix(&addr)
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit)
    {
        txns.push(TRANSACTIONS.load(deps.storage, key?)?);
    }
    to_json_binary(&txns)
}
