use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};

use smart_vaults_base::capabilities::{SET_PERFORMANCE_FEE, SET_SWAP_FEE, SET_WITHDRAW_FEE};
use smart_vaults_base::wallet::Fee;
use smart_vaults_base::Authorizer;

#[cw_serde]
pub struct Config {
    pub native_denom: String,
    pub wrapped_native_token: Addr,
    pub wrapped_native_denom: String,
    pub price_oracle: Option<Addr>,
    pub swap_connector: Option<Addr>,
    pub fee_collector: Addr,
}

/// Swap awaiting the connector's reply.
#[cw_serde]
pub struct PendingSwap {
    pub token_out: String,
    pub balance_before: Uint128,
    pub min_amount_out: Uint128,
}

pub const AUTHORIZER: Authorizer = Authorizer::new("permissions");
pub const CONFIG: Item<Config> = Item::new("config");

pub const SWAP_FEE: Item<Fee> = Item::new("swap_fee");
pub const WITHDRAW_FEE: Item<Fee> = Item::new("withdraw_fee");
pub const PERFORMANCE_FEE: Item<Fee> = Item::new("performance_fee");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeKind {
    Swap,
    Withdraw,
    Performance,
}

impl FeeKind {
    pub fn capability(self) -> &'static str {
        match self {
            FeeKind::Swap => SET_SWAP_FEE,
            FeeKind::Withdraw => SET_WITHDRAW_FEE,
            FeeKind::Performance => SET_PERFORMANCE_FEE,
        }
    }

    pub fn item(self) -> Item<'static, Fee> {
        match self {
            FeeKind::Swap => SWAP_FEE,
            FeeKind::Withdraw => WITHDRAW_FEE,
            FeeKind::Performance => PERFORMANCE_FEE,
        }
    }
}

// (base, quote) -> feed id understood by the price oracle
pub const PRICE_FEEDS: Map<(&str, &str), String> = Map::new("price_feeds");

pub const STRATEGIES: Map<&Addr, bool> = Map::new("strategies");
pub const INVESTED: Map<&Addr, Uint128> = Map::new("invested");

pub const PENDING_SWAP: Item<PendingSwap> = Item::new("pending_swap");
