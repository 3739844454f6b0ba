use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Deps, StdResult, Storage, Uint128};
use cw_storage_plus::Item;

use crate::error::SmartVaultsError;
use crate::math::mul_rate;
use crate::wallet;

#[cw_serde]
#[derive(Default)]
pub struct Threshold {
    pub token: String,
    /// Minimum value in `token` units; zero disables the check.
    pub amount: Uint128,
}

pub struct TokenThreshold<'a>(Item<'a, Threshold>);

impl<'a> TokenThreshold<'a> {
    pub const fn new(storage_key: &'a str) -> Self {
        TokenThreshold(Item::new(storage_key))
    }

    pub fn load(&self, storage: &dyn Storage) -> StdResult<Threshold> {
        Ok(self.0.may_load(storage)?.unwrap_or_default())
    }

    pub fn set(
        &self,
        storage: &mut dyn Storage,
        token: String,
        amount: Uint128,
    ) -> StdResult<Threshold> {
        let threshold = Threshold { token, amount };
        self.0.save(storage, &threshold)?;
        Ok(threshold)
    }

    /// Converts `amount` of `token` into the threshold token at the wallet's
    /// spot price and fails if it falls short of the minimum.
    pub fn check(
        &self,
        deps: Deps,
        wallet: &Addr,
        token: &str,
        amount: Uint128,
    ) -> Result<(), SmartVaultsError> {
        let threshold = self.load(deps.storage)?;
        if threshold.amount.is_zero() {
            return Ok(());
        }
        let rate = wallet::query_price(&deps.querier, wallet, token, &threshold.token)?;
        if mul_rate(amount, rate)? < threshold.amount {
            return Err(SmartVaultsError::MinThresholdNotMet);
        }
        Ok(())
    }
}
