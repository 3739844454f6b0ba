use cosmwasm_std::{
    coins, entry_point, to_json_binary, Addr, BankMsg, Binary, Coin, Decimal, Deps, DepsMut, Env,
    MessageInfo, Reply, Response, StdResult, SubMsg, Uint128, WasmMsg,
};
use cw_utils::PaymentError;

use smart_vaults_base::capabilities::{
    AUTHORIZE, CALL, CLAIM, COLLECT, EXIT, JOIN, REIMBURSE, SET_FEE_COLLECTOR, SET_PRICE_FEED,
    SET_PRICE_FEEDS, SET_PRICE_ORACLE, SET_STRATEGY, SET_SWAP_CONNECTOR, SWAP, UNAUTHORIZE, UNWRAP,
    WITHDRAW, WRAP,
};
use smart_vaults_base::interfaces::{strategy, swap_connector, wrapped_native};
use smart_vaults_base::math::mul_rate;
use smart_vaults_base::wallet::{Fee, FeeParams, PriceFeed, SwapLimit};
use smart_vaults_base::SmartVaultsError;

use crate::fees;
use crate::msg::{
    ConfigResponse, ExecuteMsg, InstantiateMsg, InvestedResponse, PriceFeedResponse, PriceResponse,
    QueryMsg,
};
use crate::price::{find_feed, get_price};
use crate::state::{
    Config, FeeKind, PendingSwap, AUTHORIZER, CONFIG, INVESTED, PENDING_SWAP, PERFORMANCE_FEE,
    PRICE_FEEDS, STRATEGIES, SWAP_FEE, WITHDRAW_FEE,
};

pub const SWAP_REPLY_ID: u64 = 1;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, SmartVaultsError> {
    let admin = deps.api.addr_validate(&msg.admin)?;
    AUTHORIZER.grant_all(deps.storage, &admin, &[AUTHORIZE, UNAUTHORIZE])?;

    let config = Config {
        native_denom: msg.native_denom,
        wrapped_native_token: deps.api.addr_validate(&msg.wrapped_native.contract)?,
        wrapped_native_denom: msg.wrapped_native.denom,
        price_oracle: msg
            .price_oracle
            .map(|oracle| deps.api.addr_validate(&oracle))
            .transpose()?,
        swap_connector: msg
            .swap_connector
            .map(|connector| deps.api.addr_validate(&connector))
            .transpose()?,
        fee_collector: deps.api.addr_validate(&msg.fee_collector)?,
    };
    if config.native_denom.is_empty() || config.wrapped_native_denom.is_empty() {
        return Err(SmartVaultsError::InvalidInput);
    }
    CONFIG.save(deps.storage, &config)?;

    let now = env.block.time.seconds();
    for (item, params) in [
        (&SWAP_FEE, msg.swap_fee),
        (&WITHDRAW_FEE, msg.withdraw_fee),
        (&PERFORMANCE_FEE, msg.performance_fee),
    ] {
        let fee = match params {
            Some(params) => fees::validate(params, now)?,
            None => Fee::default(),
        };
        item.save(deps.storage, &fee)?;
    }

    for feed in msg.price_feeds {
        save_price_feed(deps.branch(), feed)?;
    }
    for strategy in &msg.strategies {
        let strategy = deps.api.addr_validate(strategy)?;
        STRATEGIES.save(deps.storage, &strategy, &true)?;
    }

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("admin", admin)
        .add_attribute("fee_collector", config.fee_collector)
        .add_attribute("native_denom", config.native_denom))
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
        ExecuteMsg::SetPriceOracle { oracle } => execute_set_price_oracle(deps, info, oracle),
        ExecuteMsg::SetSwapConnector { connector } => {
            execute_set_swap_connector(deps, info, connector)
        }
        ExecuteMsg::SetFeeCollector { fee_collector } => {
            execute_set_fee_collector(deps, info, fee_collector)
        }
        ExecuteMsg::SetSwapFee { fee } => execute_set_fee(deps, env, info, FeeKind::Swap, fee),
        ExecuteMsg::SetWithdrawFee { fee } => {
            execute_set_fee(deps, env, info, FeeKind::Withdraw, fee)
        }
        ExecuteMsg::SetPerformanceFee { fee } => {
            execute_set_fee(deps, env, info, FeeKind::Performance, fee)
        }
        ExecuteMsg::SetPriceFeed { base, quote, feed } => {
            AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_PRICE_FEED)?;
            let feed = PriceFeed { base, quote, feed };
            save_price_feed(deps, feed.clone())?;
            Ok(price_feed_response(&feed))
        }
        ExecuteMsg::SetPriceFeeds { feeds } => execute_set_price_feeds(deps, info, feeds),
        ExecuteMsg::SetStrategy { strategy, allowed } => {
            execute_set_strategy(deps, info, strategy, allowed)
        }
        ExecuteMsg::Collect {} => execute_collect(deps, info),
        ExecuteMsg::Withdraw {
            token,
            amount,
            recipient,
        } => execute_withdraw(deps, env, info, token, amount, recipient),
        ExecuteMsg::Reimburse {
            token,
            amount,
            recipient,
        } => execute_reimburse(deps, info, token, amount, recipient),
        ExecuteMsg::Wrap { amount } => execute_wrap(deps, info, amount),
        ExecuteMsg::Unwrap { amount } => execute_unwrap(deps, info, amount),
        ExecuteMsg::Claim { strategy } => execute_claim(deps, info, strategy),
        ExecuteMsg::Join { strategy, amount } => execute_join(deps, info, strategy, amount),
        ExecuteMsg::Exit { strategy, ratio } => execute_exit(deps, env, info, strategy, ratio),
        ExecuteMsg::Swap {
            token_in,
            token_out,
            amount_in,
            limit,
            data,
        } => execute_swap(deps, env, info, token_in, token_out, amount_in, limit, data),
        ExecuteMsg::Call { target, msg, funds } => execute_call(deps, info, target, msg, funds),
    }
}

pub fn execute_set_price_oracle(
    deps: DepsMut,
    info: MessageInfo,
    oracle: String,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_PRICE_ORACLE)?;
    let oracle = deps.api.addr_validate(&oracle)?;
    CONFIG.update(deps.storage, |mut config| -> StdResult<_> {
        config.price_oracle = Some(oracle.clone());
        Ok(config)
    })?;

    Ok(Response::new()
        .add_attribute("action", "set_price_oracle")
        .add_attribute("price_oracle", oracle))
}

pub fn execute_set_swap_connector(
    deps: DepsMut,
    info: MessageInfo,
    connector: Option<String>,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_SWAP_CONNECTOR)?;
    let connector = connector
        .map(|connector| deps.api.addr_validate(&connector))
        .transpose()?;
    CONFIG.update(deps.storage, |mut config| -> StdResult<_> {
        config.swap_connector = connector.clone();
        Ok(config)
    })?;

    Ok(Response::new()
        .add_attribute("action", "set_swap_connector")
        .add_attribute(
            "swap_connector",
            connector.map(String::from).unwrap_or_default(),
        ))
}

pub fn execute_set_fee_collector(
    deps: DepsMut,
    info: MessageInfo,
    fee_collector: String,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_FEE_COLLECTOR)?;
    let fee_collector = deps.api.addr_validate(&fee_collector)?;
    CONFIG.update(deps.storage, |mut config| -> StdResult<_> {
        config.fee_collector = fee_collector.clone();
        Ok(config)
    })?;

    Ok(Response::new()
        .add_attribute("action", "set_fee_collector")
        .add_attribute("fee_collector", fee_collector))
}

pub fn execute_set_fee(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    kind: FeeKind,
    params: FeeParams,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, kind.capability())?;
    let fee = fees::validate(params, env.block.time.seconds())?;
    kind.item().save(deps.storage, &fee)?;

    Ok(Response::new()
        .add_attribute("action", kind.capability())
        .add_attribute("pct", fee.pct.to_string())
        .add_attribute("cap", fee.cap)
        .add_attribute("token", fee.token)
        .add_attribute("period", fee.period.to_string()))
}

fn save_price_feed(deps: DepsMut, feed: PriceFeed) -> Result<(), SmartVaultsError> {
    if feed.base.is_empty() || feed.quote.is_empty() || feed.base == feed.quote {
        return Err(SmartVaultsError::InvalidInput);
    }
    let key = (feed.base.as_str(), feed.quote.as_str());
    match feed.feed {
        Some(id) => PRICE_FEEDS.save(deps.storage, key, &id)?,
        None => PRICE_FEEDS.remove(deps.storage, key),
    }
    Ok(())
}

fn price_feed_response(feed: &PriceFeed) -> Response {
    Response::new()
        .add_attribute("action", "set_price_feed")
        .add_attribute("base", &feed.base)
        .add_attribute("quote", &feed.quote)
        .add_attribute("feed", feed.feed.clone().unwrap_or_default())
}

pub fn execute_set_price_feeds(
    mut deps: DepsMut,
    info: MessageInfo,
    feeds: Vec<PriceFeed>,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_PRICE_FEEDS)?;
    let count = feeds.len();
    for feed in feeds {
        save_price_feed(deps.branch(), feed)?;
    }

    Ok(Response::new()
        .add_attribute("action", "set_price_feeds")
        .add_attribute("count", count.to_string()))
}

pub fn execute_set_strategy(
    deps: DepsMut,
    info: MessageInfo,
    strategy: String,
    allowed: bool,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_STRATEGY)?;
    let strategy = deps.api.addr_validate(&strategy)?;
    STRATEGIES.save(deps.storage, &strategy, &allowed)?;

    Ok(Response::new()
        .add_attribute("action", "set_strategy")
        .add_attribute("strategy", strategy)
        .add_attribute("allowed", allowed.to_string()))
}

pub fn execute_collect(deps: DepsMut, info: MessageInfo) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, COLLECT)?;
    if info.funds.is_empty() {
        return Err(PaymentError::NoFunds {}.into());
    }
    let collected: Vec<String> = info.funds.iter().map(Coin::to_string).collect();

    Ok(Response::new()
        .add_attribute("action", "collect")
        .add_attribute("from", info.sender)
        .add_attribute("amount", collected.join(",")))
}

pub fn execute_withdraw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    amount: Uint128,
    recipient: String,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, WITHDRAW)?;
    if amount.is_zero() {
        return Err(SmartVaultsError::InvalidInput);
    }
    let recipient = deps.api.addr_validate(&recipient)?;
    let config = CONFIG.load(deps.storage)?;

    // withdrawals to the fee collector never pay the withdraw fee
    let (fee, fee_msg) = if recipient == config.fee_collector {
        (Uint128::zero(), None)
    } else {
        fees::pay_fee(deps, &env, &WITHDRAW_FEE, &config.fee_collector, &token, amount)?
    };

    let net = amount - fee;
    let mut res = Response::new();
    if let Some(msg) = fee_msg {
        res = res.add_message(msg);
    }
    if !net.is_zero() {
        res = res.add_message(BankMsg::Send {
            to_address: recipient.to_string(),
            amount: coins(net.u128(), &token),
        });
    }

    Ok(res
        .add_attribute("action", "withdraw")
        .add_attribute("token", token)
        .add_attribute("amount", net)
        .add_attribute("fee", fee)
        .add_attribute("recipient", recipient))
}

pub fn execute_reimburse(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    amount: Uint128,
    recipient: Option<String>,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, REIMBURSE)?;
    let recipient = match recipient {
        Some(recipient) => deps.api.addr_validate(&recipient)?,
        None => CONFIG.load(deps.storage)?.fee_collector,
    };

    let mut res = Response::new();
    if !amount.is_zero() {
        res = res.add_message(BankMsg::Send {
            to_address: recipient.to_string(),
            amount: coins(amount.u128(), &token),
        });
    }

    Ok(res
        .add_attribute("action", "reimburse")
        .add_attribute("token", token)
        .add_attribute("amount", amount)
        .add_attribute("recipient", recipient))
}

pub fn execute_wrap(
    deps: DepsMut,
    info: MessageInfo,
    amount: Uint128,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, WRAP)?;
    if amount.is_zero() {
        return Err(SmartVaultsError::InvalidInput);
    }
    let config = CONFIG.load(deps.storage)?;

    Ok(Response::new()
        .add_message(WasmMsg::Execute {
            contract_addr: config.wrapped_native_token.to_string(),
            msg: to_json_binary(&wrapped_native::ExecuteMsg::Deposit {})?,
            funds: coins(amount.u128(), &config.native_denom),
        })
        .add_attribute("action", "wrap")
        .add_attribute("amount", amount))
}

pub fn execute_unwrap(
    deps: DepsMut,
    info: MessageInfo,
    amount: Uint128,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, UNWRAP)?;
    if amount.is_zero() {
        return Err(SmartVaultsError::InvalidInput);
    }
    let config = CONFIG.load(deps.storage)?;

    Ok(Response::new()
        .add_message(WasmMsg::Execute {
            contract_addr: config.wrapped_native_token.to_string(),
            msg: to_json_binary(&wrapped_native::ExecuteMsg::Withdraw { amount })?,
            funds: coins(amount.u128(), &config.wrapped_native_denom),
        })
        .add_attribute("action", "unwrap")
        .add_attribute("amount", amount))
}

fn allowed_strategy(deps: Deps, strategy: &str) -> Result<Addr, SmartVaultsError> {
    let strategy = deps.api.addr_validate(strategy)?;
    if !STRATEGIES.may_load(deps.storage, &strategy)?.unwrap_or(false) {
        return Err(SmartVaultsError::StrategyNotAllowed);
    }
    Ok(strategy)
}

fn strategy_token(deps: Deps, strategy: &Addr) -> StdResult<String> {
    let res: strategy::TokenResponse = deps
        .querier
        .query_wasm_smart(strategy, &strategy::QueryMsg::Token {})?;
    Ok(res.token)
}

pub fn execute_claim(
    deps: DepsMut,
    info: MessageInfo,
    strategy: String,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, CLAIM)?;
    let strategy = allowed_strategy(deps.as_ref(), &strategy)?;

    Ok(Response::new()
        .add_message(WasmMsg::Execute {
            contract_addr: strategy.to_string(),
            msg: to_json_binary(&strategy::ExecuteMsg::Claim {})?,
            funds: vec![],
        })
        .add_attribute("action", "claim")
        .add_attribute("strategy", strategy))
}

pub fn execute_join(
    deps: DepsMut,
    info: MessageInfo,
    strategy: String,
    amount: Uint128,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, JOIN)?;
    if amount.is_zero() {
        return Err(SmartVaultsError::InvalidInput);
    }
    let strategy = allowed_strategy(deps.as_ref(), &strategy)?;
    let token = strategy_token(deps.as_ref(), &strategy)?;

    let invested = INVESTED.may_load(deps.storage, &strategy)?.unwrap_or_default() + amount;
    INVESTED.save(deps.storage, &strategy, &invested)?;

    Ok(Response::new()
        .add_message(WasmMsg::Execute {
            contract_addr: strategy.to_string(),
            msg: to_json_binary(&strategy::ExecuteMsg::Join {})?,
            funds: coins(amount.u128(), &token),
        })
        .add_attribute("action", "join")
        .add_attribute("strategy", strategy)
        .add_attribute("amount", amount)
        .add_attribute("invested", invested))
}

/// Exits `ratio` of the position. The part of the exited value above the
/// proportional invested amount is a gain and bears the performance fee.
pub fn execute_exit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    strategy: String,
    ratio: Decimal,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, EXIT)?;
    if ratio.is_zero() || ratio > Decimal::one() {
        return Err(SmartVaultsError::InvalidInput);
    }
    let strategy = allowed_strategy(deps.as_ref(), &strategy)?;
    let token = strategy_token(deps.as_ref(), &strategy)?;
    let value: strategy::ValueResponse = deps.querier.query_wasm_smart(
        &strategy,
        &strategy::QueryMsg::Value {
            account: env.contract.address.to_string(),
        },
    )?;

    let exit_value = value.value * ratio;
    let invested = INVESTED.may_load(deps.storage, &strategy)?.unwrap_or_default();
    let exited_investment = invested * ratio;
    INVESTED.save(deps.storage, &strategy, &(invested - exited_investment))?;

    let gain = exit_value.saturating_sub(exited_investment);
    let fee_collector = CONFIG.load(deps.storage)?.fee_collector;
    let (fee, fee_msg) = fees::pay_fee(deps, &env, &PERFORMANCE_FEE, &fee_collector, &token, gain)?;

    let mut res = Response::new().add_message(WasmMsg::Execute {
        contract_addr: strategy.to_string(),
        msg: to_json_binary(&strategy::ExecuteMsg::Exit { ratio })?,
        funds: vec![],
    });
    if let Some(msg) = fee_msg {
        res = res.add_message(msg);
    }

    Ok(res
        .add_attribute("action", "exit")
        .add_attribute("strategy", strategy)
        .add_attribute("value", exit_value)
        .add_attribute("gain", gain)
        .add_attribute("fee", fee))
}

#[allow(clippy::too_many_arguments)]
pub fn execute_swap(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token_in: String,
    token_out: String,
    amount_in: Uint128,
    limit: SwapLimit,
    data: Binary,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SWAP)?;
    let config = CONFIG.load(deps.storage)?;
    let connector = config
        .swap_connector
        .ok_or(SmartVaultsError::SwapConnectorNotSet)?;
    if amount_in.is_zero() || token_in == token_out {
        return Err(SmartVaultsError::InvalidInput);
    }

    let min_amount_out = match limit {
        SwapLimit::MinAmountOut(min_amount_out) => min_amount_out,
        SwapLimit::Slippage(slippage) => {
            if slippage > Decimal::one() {
                return Err(SmartVaultsError::InvalidInput);
            }
            let price = get_price(deps.as_ref(), &token_in, &token_out)?;
            mul_rate(mul_rate(amount_in, price)?, Decimal::one() - slippage)?
        }
    };

    let balance_before = deps
        .querier
        .query_balance(&env.contract.address, &token_out)?
        .amount;
    PENDING_SWAP.save(
        deps.storage,
        &PendingSwap {
            token_out: token_out.clone(),
            balance_before,
            min_amount_out,
        },
    )?;

    let swap = WasmMsg::Execute {
        contract_addr: connector.to_string(),
        msg: to_json_binary(&swap_connector::ExecuteMsg::Swap {
            token_out: token_out.clone(),
            min_amount_out,
            data,
        })?,
        funds: coins(amount_in.u128(), &token_in),
    };

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(swap, SWAP_REPLY_ID))
        .add_attribute("action", "swap")
        .add_attribute("token_in", token_in)
        .add_attribute("token_out", token_out)
        .add_attribute("amount_in", amount_in)
        .add_attribute("min_amount_out", min_amount_out))
}

pub fn execute_call(
    deps: DepsMut,
    info: MessageInfo,
    target: String,
    msg: Binary,
    funds: Vec<Coin>,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, CALL)?;
    let target = deps.api.addr_validate(&target)?;

    Ok(Response::new()
        .add_message(WasmMsg::Execute {
            contract_addr: target.to_string(),
            msg,
            funds,
        })
        .add_attribute("action", "call")
        .add_attribute("target", target))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, SmartVaultsError> {
    match msg.id {
        SWAP_REPLY_ID => reply_swap(deps, env),
        id => Err(SmartVaultsError::UnknownReply(id)),
    }
}

/// Measures the swap output from the wallet balance, enforces the minimum and
/// charges the swap fee on what was actually received.
fn reply_swap(deps: DepsMut, env: Env) -> Result<Response, SmartVaultsError> {
    let pending = PENDING_SWAP.load(deps.storage)?;
    PENDING_SWAP.remove(deps.storage);

    let balance_after = deps
        .querier
        .query_balance(&env.contract.address, &pending.token_out)?
        .amount;
    let amount_out = balance_after.saturating_sub(pending.balance_before);
    if amount_out < pending.min_amount_out {
        return Err(SmartVaultsError::MinAmountOutNotMet);
    }

    let fee_collector = CONFIG.load(deps.storage)?.fee_collector;
    let (fee, fee_msg) = fees::pay_fee(
        deps,
        &env,
        &SWAP_FEE,
        &fee_collector,
        &pending.token_out,
        amount_out,
    )?;

    let mut res = Response::new();
    if let Some(msg) = fee_msg {
        res = res.add_message(msg);
    }
    Ok(res
        .add_attribute("action", "swap_settled")
        .add_attribute("amount_out", amount_out)
        .add_attribute("fee", fee))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<Binary, SmartVaultsError> {
    let res = match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Price { base, quote } => to_json_binary(&PriceResponse {
            rate: get_price(deps, &base, &quote)?,
        }),
        QueryMsg::PriceFeed { base, quote } => to_json_binary(&PriceFeedResponse {
            feed: find_feed(deps, &base, &quote)?.map(|(feed, _)| feed),
        }),
        QueryMsg::SwapFee {} => to_json_binary(&SWAP_FEE.load(deps.storage)?),
        QueryMsg::WithdrawFee {} => to_json_binary(&WITHDRAW_FEE.load(deps.storage)?),
        QueryMsg::PerformanceFee {} => to_json_binary(&PERFORMANCE_FEE.load(deps.storage)?),
        QueryMsg::IsAuthorized { who, what } => {
            let who = deps.api.addr_validate(&who)?;
            to_json_binary(&AUTHORIZER.query_is_authorized(deps.storage, &who, &what))
        }
        QueryMsg::Permissions { who } => {
            let who = deps.api.addr_validate(&who)?;
            to_json_binary(&AUTHORIZER.query_permissions(deps.storage, &who)?)
        }
        QueryMsg::Invested { strategy } => {
            let strategy = deps.api.addr_validate(&strategy)?;
            to_json_binary(&InvestedResponse {
                amount: INVESTED.may_load(deps.storage, &strategy)?.unwrap_or_default(),
            })
        }
    }?;
    Ok(res)
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        native_denom: config.native_denom,
        wrapped_native_token: config.wrapped_native_token,
        wrapped_native_denom: config.wrapped_native_denom,
        price_oracle: config.price_oracle,
        swap_connector: config.swap_connector,
        fee_collector: config.fee_collector,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::{mock_dependencies, mock_env, mock_info};
    use cosmwasm_std::{from_json, CosmosMsg};
    use smart_vaults_base::capabilities::{SET_SWAP_FEE, SET_WITHDRAW_FEE};

    use crate::msg::WrappedNative;

    fn instantiate_msg() -> InstantiateMsg {
        InstantiateMsg {
            admin: "owner".into(),
            native_denom: "native".into(),
            wrapped_native: WrappedNative {
                contract: "wrapped".into(),
                denom: "wnative".into(),
            },
            fee_collector: "collector".into(),
            price_oracle: Some("oracle".into()),
            swap_connector: None,
            swap_fee: None,
            withdraw_fee: None,
            performance_fee: None,
            price_feeds: vec![],
            strategies: vec![],
        }
    }

    fn setup(deps: DepsMut) {
        instantiate(deps, mock_env(), mock_info("deployer", &[]), instantiate_msg()).unwrap();
    }

    fn grant(deps: DepsMut, who: &str, what: &str) {
        execute(
            deps,
            mock_env(),
            mock_info("owner", &[]),
            ExecuteMsg::Authorize {
                who: who.into(),
                what: what.into(),
            },
        )
        .unwrap();
    }

    #[test]
    fn instantiates_with_no_fees_and_no_connector() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());

        let config: ConfigResponse =
            from_json(query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap()).unwrap();
        assert_eq!(config.swap_connector, None);
        assert_eq!(config.fee_collector, Addr::unchecked("collector"));

        let fee: Fee =
            from_json(query(deps.as_ref(), mock_env(), QueryMsg::SwapFee {}).unwrap()).unwrap();
        assert_eq!(fee, Fee::default());

        let perms: smart_vaults_base::auth::PermissionsResponse = from_json(
            query(
                deps.as_ref(),
                mock_env(),
                QueryMsg::Permissions { who: "owner".into() },
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(perms.capabilities, vec!["authorize", "unauthorize"]);
    }

    #[test]
    fn every_mutation_is_guarded() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        let stranger = mock_info("stranger", &[]);

        let msgs = vec![
            ExecuteMsg::SetSwapConnector {
                connector: Some("connector".into()),
            },
            ExecuteMsg::SetFeeCollector {
                fee_collector: "stranger".into(),
            },
            ExecuteMsg::Withdraw {
                token: "native".into(),
                amount: Uint128::new(1),
                recipient: "stranger".into(),
            },
            ExecuteMsg::Wrap {
                amount: Uint128::new(1),
            },
            ExecuteMsg::Call {
                target: "anything".into(),
                msg: Binary::default(),
                funds: vec![],
            },
        ];
        for msg in msgs {
            let err = execute(deps.as_mut(), mock_env(), stranger.clone(), msg).unwrap_err();
            assert_eq!(err, SmartVaultsError::PermissionDenied);
        }
    }

    #[test]
    fn each_fee_setter_writes_only_its_own_schedule() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        grant(deps.as_mut(), "owner", SET_SWAP_FEE);
        let params = FeeParams {
            pct: Decimal::percent(3),
            cap: Uint128::zero(),
            token: String::new(),
            period: 0,
        };

        // the swap fee capability does not cover the performance fee
        let err = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("owner", &[]),
            ExecuteMsg::SetPerformanceFee {
                fee: params.clone(),
            },
        )
        .unwrap_err();
        assert_eq!(err, SmartVaultsError::PermissionDenied);

        execute(
            deps.as_mut(),
            mock_env(),
            mock_info("owner", &[]),
            ExecuteMsg::SetSwapFee { fee: params },
        )
        .unwrap();
        let swap: Fee =
            from_json(query(deps.as_ref(), mock_env(), QueryMsg::SwapFee {}).unwrap()).unwrap();
        assert_eq!(swap.pct, Decimal::percent(3));
        for other in [QueryMsg::WithdrawFee {}, QueryMsg::PerformanceFee {}] {
            let fee: Fee = from_json(query(deps.as_ref(), mock_env(), other).unwrap()).unwrap();
            assert_eq!(fee, Fee::default());
        }
    }

    #[test]
    fn swap_is_disabled_without_connector() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        grant(deps.as_mut(), "owner", SWAP);

        let err = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("owner", &[]),
            ExecuteMsg::Swap {
                token_in: "usdc".into(),
                token_out: "wnative".into(),
                amount_in: Uint128::new(100),
                limit: SwapLimit::MinAmountOut(Uint128::zero()),
                data: Binary::default(),
            },
        )
        .unwrap_err();
        assert_eq!(err, SmartVaultsError::SwapConnectorNotSet);
    }

    #[test]
    fn withdraw_charges_fee_except_to_collector() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        grant(deps.as_mut(), "owner", WITHDRAW);
        grant(deps.as_mut(), "owner", SET_WITHDRAW_FEE);
        execute(
            deps.as_mut(),
            mock_env(),
            mock_info("owner", &[]),
            ExecuteMsg::SetWithdrawFee {
                fee: FeeParams {
                    pct: Decimal::percent(1),
                    cap: Uint128::zero(),
                    token: String::new(),
                    period: 0,
                },
            },
        )
        .unwrap();

        let res = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("owner", &[]),
            ExecuteMsg::Withdraw {
                token: "native".into(),
                amount: Uint128::new(1_000),
                recipient: "alice".into(),
            },
        )
        .unwrap();
        assert_eq!(
            res.messages.iter().map(|m| m.msg.clone()).collect::<Vec<_>>(),
            vec![
                CosmosMsg::Bank(BankMsg::Send {
                    to_address: "collector".into(),
                    amount: coins(10, "native"),
                }),
                CosmosMsg::Bank(BankMsg::Send {
                    to_address: "alice".into(),
                    amount: coins(990, "native"),
                }),
            ]
        );

        let res = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("owner", &[]),
            ExecuteMsg::Withdraw {
                token: "native".into(),
                amount: Uint128::new(1_000),
                recipient: "collector".into(),
            },
        )
        .unwrap();
        assert_eq!(res.messages.len(), 1);
    }

    #[test]
    fn reimburse_defaults_to_fee_collector() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        grant(deps.as_mut(), "action", REIMBURSE);

        let res = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("action", &[]),
            ExecuteMsg::Reimburse {
                token: "wnative".into(),
                amount: Uint128::new(25),
                recipient: None,
            },
        )
        .unwrap();
        assert_eq!(
            res.messages[0].msg,
            CosmosMsg::Bank(BankMsg::Send {
                to_address: "collector".into(),
                amount: coins(25, "wnative"),
            })
        );
    }

    #[test]
    fn price_feeds_can_be_set_and_removed() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        grant(deps.as_mut(), "owner", SET_PRICE_FEED);

        let set = |feed: Option<&str>| ExecuteMsg::SetPriceFeed {
            base: "native".into(),
            quote: "usdc".into(),
            feed: feed.map(String::from),
        };
        let owner = mock_info("owner", &[]);
        execute(deps.as_mut(), mock_env(), owner, set(Some("native-usdc"))).unwrap();
        let res: PriceFeedResponse = from_json(
            query(
                deps.as_ref(),
                mock_env(),
                QueryMsg::PriceFeed {
                    base: "native".into(),
                    quote: "usdc".into(),
                },
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(res.feed, Some("native-usdc".to_string()));

        // asked the other way round, the same feed answers
        let res: PriceFeedResponse = from_json(
            query(
                deps.as_ref(),
                mock_env(),
                QueryMsg::PriceFeed {
                    base: "usdc".into(),
                    quote: "native".into(),
                },
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(res.feed, Some("native-usdc".to_string()));

        execute(deps.as_mut(), mock_env(), mock_info("owner", &[]), set(None)).unwrap();
        let err = query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::Price {
                base: "native".into(),
                quote: "usdc".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err, SmartVaultsError::PriceFeedNotSet);
    }

    #[test]
    fn strategies_must_be_allowed() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        grant(deps.as_mut(), "owner", JOIN);

        let err = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("owner", &[]),
            ExecuteMsg::Join {
                strategy: "strategy".into(),
                amount: Uint128::new(10),
            },
        )
        .unwrap_err();
        assert_eq!(err, SmartVaultsError::StrategyNotAllowed);
    }
}
