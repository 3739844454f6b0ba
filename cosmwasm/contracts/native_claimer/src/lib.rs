//! Native claimer action: pulls the wallet's claimable protocol fees in native
//! or wrapped native and leaves them in the wallet as wrapped native.

use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Decimal, Deps, DepsMut, Env, MessageInfo, Response,
    StdResult, Uint128,
};
use cw_storage_plus::Item;

use smart_vaults_base::action::{self, begin_call, ActionParams, AUTHORIZER, RELAYED, THRESHOLD};
use smart_vaults_base::capabilities::SET_FEE_CLAIMER;
use smart_vaults_base::interfaces::fee_claimer;
use smart_vaults_base::relayed::IsRelayerResponse;
use smart_vaults_base::wallet::{self, ExecuteMsg as WalletMsg};
use smart_vaults_base::{GasLimits, GasPayee, GasReport, SmartVaultsError, Threshold};

pub const FEE_CLAIMER: Item<Addr> = Item::new("fee_claimer");

#[cosmwasm_schema::cw_serde]
pub struct InstantiateMsg {
    pub action: ActionParams,
    pub fee_claimer: String,
    pub threshold: Threshold,
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
    SetFeeClaimer {
        fee_claimer: String,
    },
    SetThreshold {
        token: String,
        amount: Uint128,
    },
    Call {
        token: String,
        gas: Option<GasReport>,
    },
}

#[cosmwasm_schema::cw_serde]
pub enum QueryMsg {
    Config {},
    Wallet {},
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
    pub fee_claimer: Addr,
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
    let fee_claimer = deps.api.addr_validate(&msg.fee_claimer)?;
    FEE_CLAIMER.save(deps.storage, &fee_claimer)?;

    Ok(res.add_attribute("fee_claimer", fee_claimer))
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
        ExecuteMsg::SetFeeClaimer { fee_claimer } => {
            execute_set_fee_claimer(deps, info, fee_claimer)
        }
        ExecuteMsg::SetThreshold { token, amount } => {
            action::execute_set_threshold(deps, info, token, amount)
        }
        ExecuteMsg::Call { token, gas } => execute_call(deps, info, token, gas),
    }
}

pub fn execute_set_fee_claimer(
    deps: DepsMut,
    info: MessageInfo,
    fee_claimer: String,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_FEE_CLAIMER)?;
    let fee_claimer = deps.api.addr_validate(&fee_claimer)?;
    FEE_CLAIMER.save(deps.storage, &fee_claimer)?;

    Ok(Response::new()
        .add_attribute("action", "set_fee_claimer")
        .add_attribute("fee_claimer", fee_claimer))
}

/// Claims the wallet's balance of `token` from the fee claimer and wraps it
/// when it arrives as native. Both denoms are valued as native.
pub fn execute_call(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    gas: Option<GasReport>,
) -> Result<Response, SmartVaultsError> {
    let wallet = begin_call(deps.as_ref(), &info, gas.as_ref())?;
    let config = wallet::query_config(&deps.querier, &wallet)?;
    if !config.is_native_or_wrapped(&token) {
        return Err(SmartVaultsError::InvalidToken);
    }

    let fee_claimer = FEE_CLAIMER.load(deps.storage)?;
    let claimable = fee_claimer::query_balance(&deps.querier, &fee_claimer, &token, &wallet)?;
    THRESHOLD.check(deps.as_ref(), &wallet, &config.native_denom, claimable)?;
    if claimable.is_zero() {
        return Err(SmartVaultsError::ZeroBalance);
    }

    let reimbursement =
        RELAYED.reimbursement(deps.as_ref(), &wallet, &config, &info.sender, gas.as_ref())?;

    let claim = WalletMsg::Call {
        target: fee_claimer.to_string(),
        msg: to_json_binary(&fee_claimer::ExecuteMsg::WithdrawAll {
            token: token.clone(),
            recipient: wallet.to_string(),
        })?,
        funds: vec![],
    };
    let mut res = Response::new()
        .add_message(wallet::execute(&wallet, &claim)?)
        .add_attribute("action", "call")
        .add_attribute("token", &token)
        .add_attribute("claimed", claimable);

    if token == config.native_denom {
        // gas paid in native stays unwrapped
        let paid_in_native = reimbursement
            .as_ref()
            .map(|r| r.amount_in(&config.native_denom))
            .unwrap_or_default();
        let amount = claimable.saturating_sub(paid_in_native);
        if !amount.is_zero() {
            res = res
                .add_attribute("wrapped", amount)
                .add_message(wallet::execute(&wallet, &WalletMsg::Wrap { amount })?);
        }
    }
    if let Some(reimbursement) = reimbursement {
        res = res
            .add_attribute("reimbursement", reimbursement.amount)
            .add_message(reimbursement.into_msg(&wallet)?);
    }
    Ok(res)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&ConfigResponse {
            wallet: action::WALLET.load(deps.storage)?,
            fee_claimer: FEE_CLAIMER.load(deps.storage)?,
            threshold: THRESHOLD.load(deps.storage)?,
            gas_limits: RELAYED.limits(deps.storage)?,
        }),
        QueryMsg::Wallet {} => to_json_binary(&action::query_wallet(deps)?),
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
