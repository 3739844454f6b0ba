//! Withdrawer action: periodically sends the wallet's whole balance of one
//! token to the configured recipient.

use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Decimal, Deps, DepsMut, Env, MessageInfo, Response,
    StdResult, Uint128,
};
use cw_storage_plus::Item;

use smart_vaults_base::action::{
    self, begin_call, consume_time_lock, ActionParams, AUTHORIZER, RECIPIENT, RELAYED, TIME_LOCK,
};
use smart_vaults_base::capabilities::SET_TOKEN;
use smart_vaults_base::relayed::IsRelayerResponse;
use smart_vaults_base::wallet::{self, ExecuteMsg as WalletMsg};
use smart_vaults_base::{GasLimits, GasPayee, GasReport, SmartVaultsError, TimeLockState};

pub const TOKEN: Item<String> = Item::new("token");

#[cosmwasm_schema::cw_serde]
pub struct InstantiateMsg {
    pub action: ActionParams,
    /// Seconds between two withdrawals; zero disables the lock.
    pub time_lock: u64,
    pub token: String,
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
    SetTimeLock {
        period: u64,
    },
    SetRecipient {
        recipient: String,
    },
    SetToken {
        token: String,
    },
    Call {
        gas: Option<GasReport>,
    },
}

#[cosmwasm_schema::cw_serde]
pub enum QueryMsg {
    Config {},
    Wallet {},
    Recipient {},
    TimeLock {},
    GasLimits {},
    IsRelayer { relayer: String },
    Relayers {},
    IsAuthorized { who: String, what: String },
    Permissions { who: String },
}

#[cosmwasm_schema::cw_serde]
pub struct ConfigResponse {
    pub wallet: Addr,
    pub token: String,
    pub recipient: Option<Addr>,
    pub time_lock: TimeLockState,
    pub gas_limits: GasLimits,
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, SmartVaultsError> {
    let res = action::instantiate_action(deps.branch(), msg.action)?;
    let lock = TIME_LOCK.initialize(deps.storage, msg.time_lock, env.block.time.seconds())?;
    if msg.token.is_empty() {
        return Err(SmartVaultsError::InvalidInput);
    }
    TOKEN.save(deps.storage, &msg.token)?;
    let recipient = deps.api.addr_validate(&msg.recipient)?;
    RECIPIENT.save(deps.storage, &recipient)?;

    Ok(res
        .add_attribute("token", msg.token)
        .add_attribute("recipient", recipient)
        .add_attribute("time_lock", lock.period.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
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
        ExecuteMsg::SetTimeLock { period } => action::execute_set_time_lock(deps, info, period),
        ExecuteMsg::SetRecipient { recipient } => {
            action::execute_set_recipient(deps, info, recipient)
        }
        ExecuteMsg::SetToken { token } => execute_set_token(deps, info, token),
        ExecuteMsg::Call { gas } => execute_call(deps, env, info, gas),
    }
}

pub fn execute_set_token(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_TOKEN)?;
    if token.is_empty() {
        return Err(SmartVaultsError::InvalidInput);
    }
    TOKEN.save(deps.storage, &token)?;

    Ok(Response::new()
        .add_attribute("action", "set_token")
        .add_attribute("token", token))
}

pub fn execute_call(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    gas: Option<GasReport>,
) -> Result<Response, SmartVaultsError> {
    let wallet = begin_call(deps.as_ref(), &info, gas.as_ref())?;
    let lock = consume_time_lock(deps.branch(), &env)?;

    let config = wallet::query_config(&deps.querier, &wallet)?;
    let token = TOKEN.load(deps.storage)?;
    let balance = deps.querier.query_balance(&wallet, &token)?.amount;
    if balance.is_zero() {
        return Err(SmartVaultsError::ZeroBalance);
    }
    let recipient = RECIPIENT
        .may_load(deps.storage)?
        .ok_or(SmartVaultsError::InvalidInput)?;

    let reimbursement =
        RELAYED.reimbursement(deps.as_ref(), &wallet, &config, &info.sender, gas.as_ref())?;
    let reimbursed = reimbursement
        .as_ref()
        .map(|r| r.amount_in(&token))
        .unwrap_or_default();
    // gas paid in the withdrawn token comes out of the withdrawal
    let amount = balance.saturating_sub(reimbursed);

    let mut res = Response::new()
        .add_attribute("action", "call")
        .add_attribute("token", &token)
        .add_attribute("amount", amount)
        .add_attribute("recipient", &recipient)
        .add_attributes(lock.attributes);
    if let Some(reimbursement) = reimbursement {
        res = res
            .add_attribute("reimbursement", reimbursement.amount)
            .add_message(reimbursement.into_msg(&wallet)?);
    }
    if !amount.is_zero() {
        res = res.add_message(wallet::execute(
            &wallet,
            &WalletMsg::Withdraw {
                token,
                amount,
                recipient: recipient.to_string(),
            },
        )?);
    }
    Ok(res)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&ConfigResponse {
            wallet: action::WALLET.load(deps.storage)?,
            token: TOKEN.load(deps.storage)?,
            recipient: RECIPIENT.may_load(deps.storage)?,
            time_lock: TIME_LOCK.load(deps.storage)?,
            gas_limits: RELAYED.limits(deps.storage)?,
        }),
        QueryMsg::Wallet {} => to_json_binary(&action::query_wallet(deps)?),
        QueryMsg::Recipient {} => to_json_binary(&action::query_recipient(deps)?),
        QueryMsg::TimeLock {} => to_json_binary(&TIME_LOCK.load(deps.storage)?),
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

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::{
        mock_dependencies, mock_env, mock_info, MockApi, MockQuerier, MockStorage,
    };
    use cosmwasm_std::{
        coins, from_json, ContractResult, CosmosMsg, OwnedDeps, SystemResult, WasmMsg,
    };
    use smart_vaults_base::capabilities::{CALL, SET_TIME_LOCK};
    use smart_vaults_base::wallet::ConfigResponse as WalletConfig;

    const MONTH: u64 = 60 * 60 * 24 * 30;

    fn setup(balance: u128) -> OwnedDeps<MockStorage, MockApi, MockQuerier> {
        let mut deps = mock_dependencies();
        deps.querier.update_balance("wallet", coins(balance, "usdc"));
        deps.querier.update_wasm(|_| {
            let config = to_json_binary(&WalletConfig {
                native_denom: "native".into(),
                wrapped_native_token: Addr::unchecked("wrapped"),
                wrapped_native_denom: "wnative".into(),
                price_oracle: None,
                swap_connector: None,
                fee_collector: Addr::unchecked("collector"),
            });
            SystemResult::Ok(ContractResult::Ok(config.unwrap()))
        });

        instantiate(
            deps.as_mut(),
            mock_env(),
            mock_info("deployer", &[]),
            InstantiateMsg {
                action: ActionParams {
                    admin: "admin".into(),
                    wallet: "wallet".into(),
                    relayers: vec![],
                    gas_limits: GasLimits::default(),
                },
                time_lock: 0,
                token: "usdc".into(),
                recipient: "recipient".into(),
            },
        )
        .unwrap();
        AUTHORIZER
            .grant_all(&mut deps.storage, &Addr::unchecked("manager"), &[CALL, SET_TIME_LOCK])
            .unwrap();
        deps
    }

    fn call_at(deps: DepsMut, time: u64) -> Result<Response, SmartVaultsError> {
        let mut env = mock_env();
        env.block.time = cosmwasm_std::Timestamp::from_seconds(time);
        execute(deps, env, mock_info("manager", &[]), ExecuteMsg::Call { gas: None })
    }

    #[test]
    fn withdraws_whole_balance() {
        let mut deps = setup(1_000);
        let res = call_at(deps.as_mut(), 1_000).unwrap();

        let CosmosMsg::Wasm(WasmMsg::Execute { msg, .. }) = &res.messages[0].msg else {
            panic!("expected a wallet message");
        };
        assert_eq!(
            from_json::<WalletMsg>(msg).unwrap(),
            WalletMsg::Withdraw {
                token: "usdc".into(),
                amount: Uint128::new(1_000),
                recipient: "recipient".into(),
            }
        );
    }

    #[test]
    fn time_lock_paces_withdrawals() {
        let mut deps = setup(1_000);
        execute(
            deps.as_mut(),
            mock_env(),
            mock_info("manager", &[]),
            ExecuteMsg::SetTimeLock { period: MONTH },
        )
        .unwrap();

        let start = 1_700_000_000;
        call_at(deps.as_mut(), start).unwrap();
        let err = call_at(deps.as_mut(), start + MONTH - 1).unwrap_err();
        assert_eq!(err, SmartVaultsError::TimeLockNotExpired);

        // late executions keep the original cadence
        call_at(deps.as_mut(), start + MONTH + 10).unwrap();
        let lock: TimeLockState =
            from_json(query(deps.as_ref(), mock_env(), QueryMsg::TimeLock {}).unwrap()).unwrap();
        assert_eq!(lock.next_reset_time, Some(start + 2 * MONTH));
    }

    #[test]
    fn empty_balance_is_rejected() {
        let mut deps = setup(0);
        let err = call_at(deps.as_mut(), 1_000).unwrap_err();
        assert_eq!(err, SmartVaultsError::ZeroBalance);
    }
}
