use cosmwasm_schema::cw_serde;

use smart_vaults_base::wallet::{FeeParams, PriceFeed};

pub use smart_vaults_base::wallet::{
    ConfigResponse, ExecuteMsg, InvestedResponse, PriceFeedResponse, PriceResponse, QueryMsg,
};

#[cw_serde]
pub struct WrappedNative {
    pub contract: String,
    pub denom: String,
}

#[cw_serde]
pub struct InstantiateMsg {
    /// Receives the `authorize` and `unauthorize` capabilities.
    pub admin: String,
    pub native_denom: String,
    pub wrapped_native: WrappedNative,
    pub fee_collector: String,
    pub price_oracle: Option<String>,
    pub swap_connector: Option<String>,
    pub swap_fee: Option<FeeParams>,
    pub withdraw_fee: Option<FeeParams>,
    pub performance_fee: Option<FeeParams>,
    #[serde(default)]
    pub price_feeds: Vec<PriceFeed>,
    #[serde(default)]
    pub strategies: Vec<String>,
}
