//! Message interface of the wallet contract.
//!
//! The wallet crate uses these types as its own entry point messages; actions
//! use them to query the wallet and to build the messages they hand to it.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Coin, CosmosMsg, Decimal, QuerierWrapper, StdResult, Uint128,
    WasmMsg,
};

use crate::error::SmartVaultsError;

#[cw_serde]
pub struct FeeParams {
    /// Fraction of the operated amount, at most one.
    pub pct: Decimal,
    /// Maximum charged per period, denominated in `token`. Zero means uncapped.
    pub cap: Uint128,
    pub token: String,
    pub period: u64,
}

#[cw_serde]
#[derive(Default)]
pub struct Fee {
    pub pct: Decimal,
    pub cap: Uint128,
    pub token: String,
    pub period: u64,
    /// Fees charged in the current period, in `token` units.
    pub total_charged: Uint128,
    pub next_reset_time: u64,
}

#[cw_serde]
pub enum SwapLimit {
    /// Minimum out derived from the oracle price minus the given slippage.
    Slippage(Decimal),
    MinAmountOut(Uint128),
}

#[cw_serde]
pub struct PriceFeed {
    pub base: String,
    pub quote: String,
    /// `None` removes the feed.
    pub feed: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    Authorize {
        who: String,
        what: String,
    },
    Unauthorize {
        who: String,
        what: String,
    },
    SetPriceOracle {
        oracle: String,
    },
    SetSwapConnector {
        connector: Option<String>,
    },
    SetFeeCollector {
        fee_collector: String,
    },
    SetSwapFee {
        fee: FeeParams,
    },
    SetWithdrawFee {
        fee: FeeParams,
    },
    SetPerformanceFee {
        fee: FeeParams,
    },
    SetPriceFeed {
        base: String,
        quote: String,
        feed: Option<String>,
    },
    SetPriceFeeds {
        feeds: Vec<PriceFeed>,
    },
    SetStrategy {
        strategy: String,
        allowed: bool,
    },
    /// Takes custody of the attached funds.
    Collect {},
    Withdraw {
        token: String,
        amount: Uint128,
        recipient: String,
    },
    /// Fee-exempt transfer used to pay relayers back. `None` pays the fee collector.
    Reimburse {
        token: String,
        amount: Uint128,
        recipient: Option<String>,
    },
    Wrap {
        amount: Uint128,
    },
    Unwrap {
        amount: Uint128,
    },
    Claim {
        strategy: String,
    },
    Join {
        strategy: String,
        amount: Uint128,
    },
    Exit {
        strategy: String,
        ratio: Decimal,
    },
    Swap {
        token_in: String,
        token_out: String,
        amount_in: Uint128,
        limit: SwapLimit,
        data: Binary,
    },
    /// Executes an arbitrary contract message on behalf of the wallet.
    Call {
        target: String,
        msg: Binary,
        funds: Vec<Coin>,
    },
}

#[cw_serde]
pub enum QueryMsg {
    Config {},
    Price { base: String, quote: String },
    PriceFeed { base: String, quote: String },
    SwapFee {},
    WithdrawFee {},
    PerformanceFee {},
    IsAuthorized { who: String, what: String },
    Permissions { who: String },
    Invested { strategy: String },
}

#[cw_serde]
pub struct ConfigResponse {
    pub native_denom: String,
    pub wrapped_native_token: Addr,
    pub wrapped_native_denom: String,
    pub price_oracle: Option<Addr>,
    pub swap_connector: Option<Addr>,
    pub fee_collector: Addr,
}

impl ConfigResponse {
    pub fn is_native_or_wrapped(&self, token: &str) -> bool {
        token == self.native_denom || token == self.wrapped_native_denom
    }
}

#[cw_serde]
pub struct PriceResponse {
    pub rate: Decimal,
}

#[cw_serde]
pub struct PriceFeedResponse {
    pub feed: Option<String>,
}

#[cw_serde]
pub struct InvestedResponse {
    pub amount: Uint128,
}

pub fn query_config(querier: &QuerierWrapper, wallet: &Addr) -> StdResult<ConfigResponse> {
    querier.query_wasm_smart(wallet, &QueryMsg::Config {})
}

/// Rate to convert `base` units into `quote` units. A pair the wallet holds no
/// feed for, in either direction, fails with `PriceFeedNotSet`.
pub fn query_price(
    querier: &QuerierWrapper,
    wallet: &Addr,
    base: &str,
    quote: &str,
) -> Result<Decimal, SmartVaultsError> {
    if base == quote {
        return Ok(Decimal::one());
    }
    let feed: PriceFeedResponse = querier.query_wasm_smart(
        wallet,
        &QueryMsg::PriceFeed {
            base: base.to_string(),
            quote: quote.to_string(),
        },
    )?;
    if feed.feed.is_none() {
        return Err(SmartVaultsError::PriceFeedNotSet);
    }
    let res: PriceResponse = querier.query_wasm_smart(
        wallet,
        &QueryMsg::Price {
            base: base.to_string(),
            quote: quote.to_string(),
        },
    )?;
    Ok(res.rate)
}

pub fn execute(wallet: &Addr, msg: &ExecuteMsg) -> StdResult<CosmosMsg> {
    Ok(WasmMsg::Execute {
        contract_addr: wallet.to_string(),
        msg: to_json_binary(msg)?,
        funds: vec![],
    }
    .into())
}
