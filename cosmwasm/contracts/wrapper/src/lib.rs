//! Wrapper action: wraps the wallet's whole native balance and forwards the
//! wrapped tokens to the configured recipient.

use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Decimal, Deps, DepsMut, Env, MessageInfo, Response,
    StdError, StdResult, Uint128,
};

use smart_vaults_base::action::{
    self, begin_call, ActionParams, AUTHORIZER, RECIPIENT, RELAYED, THRESHOLD,
};
use smart_vaults_base::relayed::IsRelayerResponse;
use smart_vaults_base::wallet::{self, ExecuteMsg as WalletMsg};
use smart_vaults_base::{GasLimits, GasPayee, GasReport, SmartVaultsError, Threshold};

#[cosmwasm_schema::cw_serde]
pub struct InstantiateMsg {
    pub action: ActionParams,
    pub threshold: Threshold,
    pub recipient: String,
}

#[cosmwasm_schema::cw_serde]
pub enum ExecuteMsg {
    Authorize {
        who: String,
        what: String,
    },
    Unauthorize {
        who: String,
        what: String,
    },
    SetWallet {
        wallet: String,
    },
    SetRelayer {
        relayer: String,
        allowed: bool,
    },
    SetLimits {
        gas_price_limit: Decimal,
        total_cost_limit: Uint128,
        paying_gas_token: String,
    },
    SetGasPayee {
        payee: GasPayee,
    },
    SetThreshold {
        token: String,
        amount: Uint128,
    },
    SetRecipient {
        recipient: String,
    },
    /// Relayers attach their gas report; managers calling directly omit it.
    Call {
        gas: Option<GasReport>,
    },
}

#[cosmwasm_schema::cw_serde]
pub enum QueryMsg {
    Config {},
    Wallet {},
    Recipient {},
    Threshold {},
    GasLimits {},
    IsRelayer { relayer: String },
    Relayers {},
    IsAuthorized { who: String, what: String },
    Permissions { who: String },
}

#[cosmwasm_schema::cw_serde]
pub struct ConfigResponse {
    pub wallet: Addr,
    pub recipient: Option<Addr>,
    pub threshold: Threshold,
    pub gas_limits: GasLimits,
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, SmartVaultsError> {
    let res = action::instantiate_action(deps.branch(), msg.action)?;
    THRESHOLD.set(deps.storage, msg.threshold.token, msg.threshold.amount)?;
    let recipient = deps.api.addr_validate(&msg.recipient)?;
    RECIPIENT.save(deps.storage, &recipient)?;

    Ok(res.add_attribute("recipient", recipient))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, SmartVaultsError> {
    match msg {
        ExecuteMsg::Authorize { who, what } => AUTHORIZER.execute_authorize(deps, &info, who, what),
        ExecuteMsg::Unauthorize { who, what } => {
            AUTHORIZER.execute_unauthorize(deps, &info, who, what)
        }
        ExecuteMsg::SetWallet { wallet } => action::execute_set_wallet(deps, info, wallet),
        ExecuteMsg::SetRelayer { relayer, allowed } => {
            action::execute_set_relayer(deps, info, relayer, allowed)
        }
        ExecuteMsg::SetLimits {
            gas_price_limit,
            total_cost_limit,
            paying_gas_token,
        } => action::execute_set_limits(
            deps,
            info,
            gas_price_limit,
            total_cost_limit,
            paying_gas_token,
        ),
        ExecuteMsg::SetGasPayee { payee } => action::execute_set_gas_payee(deps, info, payee),
        ExecuteMsg::SetThreshold { token, amount } => {
            action::execute_set_threshold(deps, info, token, amount)
        }
        ExecuteMsg::SetRecipient { recipient } => {
            action::execute_set_recipient(deps, info, recipient)
        }
        ExecuteMsg::Call { gas } => execute_call(deps, info, gas),
    }
}

/// Wraps the native balance, pays the gas back and sends what is left of the
/// wrapped tokens to the recipient. The reimbursement is netted from the token
/// it is paid in so every unit of the balance is accounted for.
pub fn execute_call(
    deps: DepsMut,
    info: MessageInfo,
    gas: Option<GasReport>,
) -> Result<Response, SmartVaultsError> {
    let wallet = begin_call(deps.as_ref(), &info, gas.as_ref())?;
    let config = wallet::query_config(&deps.querier, &wallet)?;
    let balance = deps
        .querier
        .query_balance(&wallet, &config.native_denom)?
        .amount;

    THRESHOLD.check(deps.as_ref(), &wallet, &config.native_denom, balance)?;
    if balance.is_zero() {
        return Err(SmartVaultsError::ZeroBalance);
    }
    let recipient = RECIPIENT
        .may_load(deps.storage)?
        .ok_or(SmartVaultsError::InvalidInput)?;

    let reimbursement =
        RELAYED.reimbursement(deps.as_ref(), &wallet, &config, &info.sender, gas.as_ref())?;
    let (in_native, in_wrapped) = match &reimbursement {
        Some(r) => (
            r.amount_in(&config.native_denom),
            r.amount_in(&config.wrapped_native_denom),
        ),
        None => (Uint128::zero(), Uint128::zero()),
    };
    let wrapped = balance
        .checked_sub(in_native)
        .map_err(StdError::overflow)?;
    let forwarded = wrapped
        .checked_sub(in_wrapped)
        .map_err(StdError::overflow)?;

    let mut res = Response::new();
    if !wrapped.is_zero() {
        res = res.add_message(wallet::execute(&wallet, &WalletMsg::Wrap { amount: wrapped })?);
    }
    let reimbursed = reimbursement
        .as_ref()
        .map(|r| r.amount)
        .unwrap_or_default();
    if let Some(reimbursement) = reimbursement {
        res = res.add_message(reimbursement.into_msg(&wallet)?);
    }
    if !forwarded.is_zero() {
        res = res.add_message(wallet::execute(
            &wallet,
            &WalletMsg::Withdraw {
                token: config.wrapped_native_denom,
                amount: forwarded,
                recipient: recipient.to_string(),
            },
        )?);
    }

    Ok(res
        .add_attribute("action", "call")
        .add_attribute("wrapped", wrapped)
        .add_attribute("forwarded", forwarded)
        .add_attribute("recipient", recipient)
        .add_attribute("reimbursement", reimbursed))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&ConfigResponse {
            wallet: action::WALLET.load(deps.storage)?,
            recipient: RECIPIENT.may_load(deps.storage)?,
            threshold: THRESHOLD.load(deps.storage)?,
            gas_limits: RELAYED.limits(deps.storage)?,
        }),
        QueryMsg::Wallet {} => to_json_binary(&action::query_wallet(deps)?),
        QueryMsg::Recipient {} => to_json_binary(&action::query_recipient(deps)?),
        QueryMsg::Threshold {} => to_json_binary(&THRESHOLD.load(deps.storage)?),
        QueryMsg::GasLimits {} => to_json_binary(&RELAYED.limits(deps.storage)?),
        QueryMsg::IsRelayer { relayer } => {
            let relayer = deps.api.addr_validate(&relayer)?;
            to_json_binary(&IsRelayerResponse {
                is_relayer: RELAYED.is_relayer(deps.storage, &relayer),
            })
        }
        QueryMsg::Relayers {} => to_json_binary(&action::query_relayers(deps)?),
        QueryMsg::IsAuthorized { who, what } => {
            let who = deps.api.addr_validate(&who)?;
            to_json_binary(&AUTHORIZER.query_is_authorized(deps.storage, &who, &what))
        }
        QueryMsg::Permissions { who } => {
            let who = deps.api.addr_validate(&who)?;
            to_json_binary(&AUTHORIZER.query_permissions(deps.storage, &who)?)
        }
    }
}
