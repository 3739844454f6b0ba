//! In-memory stand-ins for the wallet's external collaborators. Each one
//! understands the message interface in `smart_vaults_base::interfaces` plus a
//! few admin messages tests use to steer it. Payouts come from the mock's own
//! bank balance, so tests mint reserves to it first.

use cosmwasm_std::{coins, BankMsg, Coin, MessageInfo, StdError, StdResult};

fn single_coin(info: &MessageInfo) -> StdResult<Coin> {
    match info.funds.as_slice() {
        [coin] if !coin.amount.is_zero() => Ok(coin.clone()),
        _ => Err(StdError::generic_err("exactly one non-zero coin expected")),
    }
}

fn pay(to: impl Into<String>, amount: cosmwasm_std::Uint128, denom: &str) -> BankMsg {
    BankMsg::Send {
        to_address: to.into(),
        amount: coins(amount.u128(), denom),
    }
}

pub mod oracle {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        to_json_binary, Binary, Decimal, Deps, DepsMut, Empty, Env, MessageInfo, Response,
        StdResult,
    };
    use cw_multi_test::{Contract, ContractWrapper};
    use cw_storage_plus::Map;
    use smart_vaults_base::interfaces::price_oracle::{QueryMsg, RateResponse};

    const RATES: Map<&str, Decimal> = Map::new("rates");

    #[cw_serde]
    pub struct InstantiateMsg {}

    #[cw_serde]
    pub enum ExecuteMsg {
        SetRate { feed: String, rate: Decimal },
    }

    pub fn instantiate(
        _: DepsMut,
        _: Env,
        _: MessageInfo,
        _: InstantiateMsg,
    ) -> StdResult<Response> {
        Ok(Response::new())
    }

    pub fn execute(deps: DepsMut, _: Env, _: MessageInfo, msg: ExecuteMsg) -> StdResult<Response> {
        match msg {
            ExecuteMsg::SetRate { feed, rate } => {
                RATES.save(deps.storage, &feed, &rate)?;
                Ok(Response::new().add_attribute("action", "set_rate"))
            }
        }
    }

    pub fn query(deps: Deps, _: Env, msg: QueryMsg) -> StdResult<Binary> {
        match msg {
            QueryMsg::Rate { feed } => to_json_binary(&RateResponse {
                rate: RATES.load(deps.storage, &feed)?,
            }),
        }
    }

    pub fn contract() -> Box<dyn Contract<Empty>> {
        Box::new(ContractWrapper::new(execute, instantiate, query))
    }
}

/// Fixed-rate venue. It does not enforce `min_amount_out`; the wallet does.
pub mod swap_connector {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        Binary, Decimal, Deps, DepsMut, Empty, Env, MessageInfo, Response, StdError, StdResult,
        Uint128,
    };
    use cw_multi_test::{Contract, ContractWrapper};
    use cw_storage_plus::Map;

    const RATES: Map<(&str, &str), Decimal> = Map::new("rates");

    #[cw_serde]
    pub struct InstantiateMsg {}

    #[cw_serde]
    pub enum ExecuteMsg {
        Swap {
            token_out: String,
            min_amount_out: Uint128,
            data: Binary,
        },
        SetRate {
            token_in: String,
            token_out: String,
            rate: Decimal,
        },
    }

    pub fn instantiate(
        _: DepsMut,
        _: Env,
        _: MessageInfo,
        _: InstantiateMsg,
    ) -> StdResult<Response> {
        Ok(Response::new())
    }

    pub fn execute(
        deps: DepsMut,
        _: Env,
        info: MessageInfo,
        msg: ExecuteMsg,
    ) -> StdResult<Response> {
        match msg {
            ExecuteMsg::Swap { token_out, .. } => {
                let coin_in = super::single_coin(&info)?;
                let rate = RATES
                    .may_load(deps.storage, (coin_in.denom.as_str(), token_out.as_str()))?
                    .ok_or_else(|| StdError::generic_err("no route"))?;
                let amount_out = coin_in.amount * rate;
                Ok(Response::new()
                    .add_message(super::pay(&info.sender, amount_out, &token_out))
                    .add_attribute("action", "swap")
                    .add_attribute("amount_out", amount_out))
            }
            ExecuteMsg::SetRate {
                token_in,
                token_out,
                rate,
            } => {
                RATES.save(deps.storage, (token_in.as_str(), token_out.as_str()), &rate)?;
                Ok(Response::new().add_attribute("action", "set_rate"))
            }
        }
    }

    pub fn query(_: Deps, _: Env, _: Empty) -> StdResult<Binary> {
        Err(StdError::generic_err("swap connector has no queries"))
    }

    pub fn contract() -> Box<dyn Contract<Empty>> {
        Box::new(ContractWrapper::new(execute, instantiate, query))
    }
}

/// Holds protocol fees on behalf of accounts until they withdraw them.
pub mod fee_claimer {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        to_json_binary, Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response, StdResult,
        Uint128,
    };
    use cw_multi_test::{Contract, ContractWrapper};
    use cw_storage_plus::Map;
    use smart_vaults_base::interfaces::fee_claimer::{BalanceResponse, QueryMsg};

    // (account, token) -> claimable
    const BALANCES: Map<(&str, &str), Uint128> = Map::new("balances");

    #[cw_serde]
    pub struct InstantiateMsg {}

    #[cw_serde]
    pub enum ExecuteMsg {
        /// Credits the attached coins to `account`.
        RegisterFee { account: String },
        WithdrawAll { token: String, recipient: String },
    }

    pub fn instantiate(
        _: DepsMut,
        _: Env,
        _: MessageInfo,
        _: InstantiateMsg,
    ) -> StdResult<Response> {
        Ok(Response::new())
    }

    pub fn execute(
        deps: DepsMut,
        _: Env,
        info: MessageInfo,
        msg: ExecuteMsg,
    ) -> StdResult<Response> {
        match msg {
            ExecuteMsg::RegisterFee { account } => {
                for coin in &info.funds {
                    let key = (account.as_str(), coin.denom.as_str());
                    BALANCES.update(deps.storage, key, |b| -> StdResult<_> {
                        Ok(b.unwrap_or_default() + coin.amount)
                    })?;
                }
                Ok(Response::new().add_attribute("action", "register_fee"))
            }
            ExecuteMsg::WithdrawAll { token, recipient } => {
                let key = (info.sender.as_str(), token.as_str());
                let amount = BALANCES.may_load(deps.storage, key)?.unwrap_or_default();
                BALANCES.remove(deps.storage, key);
                let mut res = Response::new()
                    .add_attribute("action", "withdraw_all")
                    .add_attribute("amount", amount);
                if !amount.is_zero() {
                    res = res.add_message(super::pay(recipient, amount, &token));
                }
                Ok(res)
            }
        }
    }

    pub fn query(deps: Deps, _: Env, msg: QueryMsg) -> StdResult<Binary> {
        match msg {
            QueryMsg::Balance { token, account } => to_json_binary(&BalanceResponse {
                amount: BALANCES
                    .may_load(deps.storage, (account.as_str(), token.as_str()))?
                    .unwrap_or_default(),
            }),
        }
    }

    pub fn contract() -> Box<dyn Contract<Empty>> {
        Box::new(ContractWrapper::new(execute, instantiate, query))
    }
}

/// 1:1 wrapped native issuer paying out of a minted reserve.
pub mod wrapped_native {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response, StdError, StdResult,
    };
    use cw_multi_test::{Contract, ContractWrapper};
    use cw_storage_plus::Item;
    use smart_vaults_base::interfaces::wrapped_native::ExecuteMsg;

    #[cw_serde]
    pub struct InstantiateMsg {
        pub native_denom: String,
        pub wrapped_denom: String,
    }

    const DENOMS: Item<InstantiateMsg> = Item::new("denoms");

    pub fn instantiate(
        deps: DepsMut,
        _: Env,
        _: MessageInfo,
        msg: InstantiateMsg,
    ) -> StdResult<Response> {
        DENOMS.save(deps.storage, &msg)?;
        Ok(Response::new())
    }

    pub fn execute(
        deps: DepsMut,
        _: Env,
        info: MessageInfo,
        msg: ExecuteMsg,
    ) -> StdResult<Response> {
        let denoms = DENOMS.load(deps.storage)?;
        let coin = super::single_coin(&info)?;
        match msg {
            ExecuteMsg::Deposit {} => {
                if coin.denom != denoms.native_denom {
                    return Err(StdError::generic_err("deposit expects native"));
                }
                Ok(Response::new()
                    .add_message(super::pay(&info.sender, coin.amount, &denoms.wrapped_denom))
                    .add_attribute("action", "deposit"))
            }
            ExecuteMsg::Withdraw { amount } => {
                if coin.denom != denoms.wrapped_denom || coin.amount != amount {
                    return Err(StdError::generic_err("withdraw expects the wrapped amount"));
                }
                Ok(Response::new()
                    .add_message(super::pay(&info.sender, amount, &denoms.native_denom))
                    .add_attribute("action", "withdraw"))
            }
        }
    }

    pub fn query(_: Deps, _: Env, _: Empty) -> StdResult<Binary> {
        Err(StdError::generic_err("wrapped native has no queries"))
    }

    pub fn contract() -> Box<dyn Contract<Empty>> {
        Box::new(ContractWrapper::new(execute, instantiate, query))
    }
}

/// Single-token strategy. Positions grow only when tests accrue yield into them.
pub mod strategy {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        to_json_binary, Addr, Binary, Decimal, Deps, DepsMut, Empty, Env, MessageInfo, Response,
        StdError, StdResult, Uint128,
    };
    use cw_multi_test::{Contract, ContractWrapper};
    use cw_storage_plus::{Item, Map};
    use smart_vaults_base::interfaces::strategy::{QueryMsg, TokenResponse, ValueResponse};

    const TOKEN: Item<String> = Item::new("token");
    const POSITIONS: Map<&Addr, Uint128> = Map::new("positions");
    const REWARDS: Map<&Addr, Uint128> = Map::new("rewards");

    #[cw_serde]
    pub struct InstantiateMsg {
        pub token: String,
    }

    #[cw_serde]
    pub enum ExecuteMsg {
        Join {},
        Exit { ratio: Decimal },
        Claim {},
        /// Adds the attached tokens to `account`'s position as yield.
        Accrue { account: String },
        /// Adds the attached tokens to `account`'s claimable rewards.
        Reward { account: String },
    }

    pub fn instantiate(
        deps: DepsMut,
        _: Env,
        _: MessageInfo,
        msg: InstantiateMsg,
    ) -> StdResult<Response> {
        TOKEN.save(deps.storage, &msg.token)?;
        Ok(Response::new())
    }

    fn credit<'a>(
        deps: DepsMut,
        info: &MessageInfo,
        map: &Map<'a, &'a Addr, Uint128>,
        account: &'a Addr,
    ) -> StdResult<Uint128> {
        let token = TOKEN.load(deps.storage)?;
        let coin = super::single_coin(info)?;
        if coin.denom != token {
            return Err(StdError::generic_err("unexpected token"));
        }
        map.update(deps.storage, account, |p| -> StdResult<_> {
            Ok(p.unwrap_or_default() + coin.amount)
        })
    }

    pub fn execute(
        deps: DepsMut,
        _: Env,
        info: MessageInfo,
        msg: ExecuteMsg,
    ) -> StdResult<Response> {
        match msg {
            ExecuteMsg::Join {} => {
                let position = credit(deps, &info, &POSITIONS, &info.sender)?;
                Ok(Response::new()
                    .add_attribute("action", "join")
                    .add_attribute("position", position))
            }
            ExecuteMsg::Accrue { account } => {
                let account = deps.api.addr_validate(&account)?;
                credit(deps, &info, &POSITIONS, &account)?;
                Ok(Response::new().add_attribute("action", "accrue"))
            }
            ExecuteMsg::Reward { account } => {
                let account = deps.api.addr_validate(&account)?;
                credit(deps, &info, &REWARDS, &account)?;
                Ok(Response::new().add_attribute("action", "reward"))
            }
            ExecuteMsg::Exit { ratio } => {
                let token = TOKEN.load(deps.storage)?;
                let position = POSITIONS.may_load(deps.storage, &info.sender)?.unwrap_or_default();
                let amount = position * ratio;
                POSITIONS.save(deps.storage, &info.sender, &(position - amount))?;
                let mut res = Response::new().add_attribute("action", "exit");
                if !amount.is_zero() {
                    res = res.add_message(super::pay(&info.sender, amount, &token));
                }
                Ok(res)
            }
            ExecuteMsg::Claim {} => {
                let token = TOKEN.load(deps.storage)?;
                let amount = REWARDS.may_load(deps.storage, &info.sender)?.unwrap_or_default();
                REWARDS.remove(deps.storage, &info.sender);
                let mut res = Response::new().add_attribute("action", "claim");
                if !amount.is_zero() {
                    res = res.add_message(super::pay(&info.sender, amount, &token));
                }
                Ok(res)
            }
        }
    }

    pub fn query(deps: Deps, _: Env, msg: QueryMsg) -> StdResult<Binary> {
        match msg {
            QueryMsg::Token {} => to_json_binary(&TokenResponse {
                token: TOKEN.load(deps.storage)?,
            }),
            QueryMsg::Value { account } => {
                let account = deps.api.addr_validate(&account)?;
                to_json_binary(&ValueResponse {
                    value: POSITIONS.may_load(deps.storage, &account)?.unwrap_or_default(),
                })
            }
        }
    }

    pub fn contract() -> Box<dyn Contract<Empty>> {
        Box::new(ContractWrapper::new(execute, instantiate, query))
    }
}
