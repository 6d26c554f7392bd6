use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::query;
use crate::state::{NEXT_CHIT_ID, NEXT_TXN_ID};

const CONTRACT_NAME: &str = "crates.io:chitfund-hub";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    _msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    NEXT_CHIT_ID.save(deps.storage, &1u64)?;
    NEXT_TXN_ID.save(deps.storage, &1u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "chitfund-hub")
        .add_attribute("sender", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateChit { params } => execute::create_chit(deps, env, info, params),
        ExecuteMsg::JoinChit { chit_id } => execute::join_chit(deps, env, info, chit_id),
        ExecuteMsg::UpdateMemberStatus {
            chit_id,
            member,
            status,
        } => execute::update_member_status(deps, info, chit_id, member, status),
        ExecuteMsg::StartChit { chit_id } => execute::start_chit(deps, info, chit_id),
        ExecuteMsg::RecordPayment {
            chit_id,
            month,
            payment_mode,
        } => execute::record_payment(deps, env, info, chit_id, month, payment_mode),
        ExecuteMsg::SelectBeneficiary {
            chit_id,
            month,
            member,
        } => execute::select_beneficiary(deps, env, info, chit_id, month, member),
        ExecuteMsg::AdvanceMonth { chit_id } => execute::advance_month(deps, info, chit_id),
        ExecuteMsg::UpdateChit {
            chit_id,
            name,
            start_date,
        } => execute::update_chit(deps, info, chit_id, name, start_date),
        ExecuteMsg::RemoveMember { chit_id, member } => {
            execute::remove_member(deps, info, chit_id, member)
        }
        ExecuteMsg::DeleteChit { chit_id } => execute::delete_chit(deps, info, chit_id),
    }
}

#[entry_point]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Chit { chit_id } => query::query_chit(deps, chit_id),
        QueryMsg::Chits { start_after, limit } => query::query_chits(deps, start_after, limit),
        QueryMsg::MonthStatus { chit_id, month } => {
            query::query_month_status(deps, chit_id, month)
        }
        QueryMsg::CurrentDue { chit_id, member } => {
            query::query_current_due(deps, chit_id, member)
        }
        QueryMsg::PaymentHistory { chit_id, member } => {
            query::query_payment_history(deps, chit_id, member)
        }
        QueryMsg::PaymentStatistics { chit_id } => query::query_payment_statistics(deps, chit_id),
        QueryMsg::LiftHistory { chit_id } => query::query_lift_history(deps, chit_id),
        QueryMsg::MemberLiftStatus { chit_id, member } => {
            query::query_member_lift_status(deps, chit_id, member)
        }
        QueryMsg::AvailableMembers { chit_id } => query::query_available_members(deps, chit_id),
        QueryMsg::ChitTransactions {
            chit_id,
            start_after,
            limit,
        } => query::query_chit_transactions(deps, chit_id, start_after, limit),
        QueryMsg::UserTransactions {
            user,
            start_after,
            limit,
        } => query::query_user_transactions(deps, user, start_after, limit),
        QueryMsg::OrganizerStats { organizer, limit } => {
            query::query_organizer_stats(deps, organizer, limit)
        }
        QueryMsg::MonthlyReport { chit_id, month } => {
            query::query_monthly_report(deps, chit_id, month)
        }
    }
}
