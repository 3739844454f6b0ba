use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, CosmosMsg, Decimal, Deps, Empty, Order, StdResult, Storage, Uint128};
use cw_storage_plus::{Item, Map};

use crate::error::SmartVaultsError;
use crate::math::mul_rate;
use crate::wallet::{self, ConfigResponse};

/// Who receives gas reimbursements.
#[cw_serde]
#[derive(Default)]
pub enum GasPayee {
    #[default]
    Relayer,
    /// The wallet's fee collector, for deployments where it runs the relayers.
    FeeCollector,
}

#[cw_serde]
#[derive(Default)]
pub struct GasLimits {
    /// Native units per gas unit; zero means no ceiling.
    pub gas_price_limit: Decimal,
    /// Ceiling of a single reimbursement in `paying_gas_token`; zero means none.
    pub total_cost_limit: Uint128,
    pub paying_gas_token: String,
    #[serde(default)]
    pub payee: GasPayee,
}

/// Gas accounting supplied by the relayer with every relayed call.
#[cw_serde]
pub struct GasReport {
    pub gas_used: u64,
    pub gas_price: Decimal,
}

impl GasReport {
    /// Cost in native units.
    pub fn cost(&self) -> StdResult<Uint128> {
        mul_rate(Uint128::from(self.gas_used), self.gas_price)
    }
}

#[cw_serde]
pub struct IsRelayerResponse {
    pub is_relayer: bool,
}

#[cw_serde]
pub struct RelayersResponse {
    pub relayers: Vec<Addr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reimbursement {
    pub token: String,
    pub amount: Uint128,
    /// `None` pays the wallet's fee collector.
    pub recipient: Option<Addr>,
}

impl Reimbursement {
    /// Amount owed in `token`, zero when paid in a different token.
    pub fn amount_in(&self, token: &str) -> Uint128 {
        if self.token == token {
            self.amount
        } else {
            Uint128::zero()
        }
    }

    pub fn into_msg(self, wallet: &Addr) -> StdResult<CosmosMsg> {
        wallet::execute(
            wallet,
            &wallet::ExecuteMsg::Reimburse {
                token: self.token,
                amount: self.amount,
                recipient: self.recipient.map(String::from),
            },
        )
    }
}

pub struct RelayerGasAccounting<'a> {
    relayers: Map<'a, &'a Addr, Empty>,
    limits: Item<'a, GasLimits>,
}

impl<'a> RelayerGasAccounting<'a> {
    pub const fn new(relayers_key: &'a str, limits_key: &'a str) -> Self {
        RelayerGasAccounting {
            relayers: Map::new(relayers_key),
            limits: Item::new(limits_key),
        }
    }

    pub fn is_relayer(&self, storage: &dyn Storage, who: &Addr) -> bool {
        self.relayers.has(storage, who)
    }

    pub fn relayers(&self, storage: &dyn Storage) -> StdResult<Vec<Addr>> {
        self.relayers
            .keys(storage, None, None, Order::Ascending)
            .collect()
    }

    pub fn set_relayer(
        &self,
        storage: &mut dyn Storage,
        relayer: &Addr,
        allowed: bool,
    ) -> StdResult<()> {
        if allowed {
            self.relayers.save(storage, relayer, &Empty {})
        } else {
            self.relayers.remove(storage, relayer);
            Ok(())
        }
    }

    pub fn limits(&self, storage: &dyn Storage) -> StdResult<GasLimits> {
        Ok(self.limits.may_load(storage)?.unwrap_or_default())
    }

    pub fn set_limits(
        &self,
        storage: &mut dyn Storage,
        gas_price_limit: Decimal,
        total_cost_limit: Uint128,
        paying_gas_token: String,
    ) -> StdResult<GasLimits> {
        let mut limits = self.limits(storage)?;
        limits.gas_price_limit = gas_price_limit;
        limits.total_cost_limit = total_cost_limit;
        limits.paying_gas_token = paying_gas_token;
        self.limits.save(storage, &limits)?;
        Ok(limits)
    }

    pub fn set_payee(&self, storage: &mut dyn Storage, payee: GasPayee) -> StdResult<GasLimits> {
        let mut limits = self.limits(storage)?;
        limits.payee = payee;
        self.limits.save(storage, &limits)?;
        Ok(limits)
    }

    pub fn save_limits(&self, storage: &mut dyn Storage, limits: &GasLimits) -> StdResult<()> {
        self.limits.save(storage, limits)
    }

    /// Relayer whitelist and gas price ceiling. Direct calls without a gas
    /// report are not relayed and skip both checks.
    pub fn check(
        &self,
        storage: &dyn Storage,
        caller: &Addr,
        gas: Option<&GasReport>,
    ) -> Result<(), SmartVaultsError> {
        let Some(report) = gas else {
            return Ok(());
        };
        if !self.is_relayer(storage, caller) {
            return Err(SmartVaultsError::RelayerNotAllowed);
        }
        let limits = self.limits(storage)?;
        if !limits.gas_price_limit.is_zero() && report.gas_price > limits.gas_price_limit {
            return Err(SmartVaultsError::GasPriceLimitExceeded);
        }
        Ok(())
    }

    /// Reimbursement owed to `relayer` for a relayed call, priced in the
    /// paying gas token and clamped to the total cost limit.
    pub fn reimbursement(
        &self,
        deps: Deps,
        wallet: &Addr,
        config: &ConfigResponse,
        relayer: &Addr,
        gas: Option<&GasReport>,
    ) -> Result<Option<Reimbursement>, SmartVaultsError> {
        let Some(report) = gas else {
            return Ok(None);
        };
        let limits = self.limits(deps.storage)?;
        let token = if limits.paying_gas_token.is_empty() {
            config.native_denom.clone()
        } else {
            limits.paying_gas_token
        };

        let native_cost = report.cost()?;
        let mut amount = if config.is_native_or_wrapped(&token) {
            native_cost
        } else {
            let rate = wallet::query_price(&deps.querier, wallet, &config.native_denom, &token)?;
            mul_rate(native_cost, rate)?
        };
        if !limits.total_cost_limit.is_zero() {
            amount = amount.min(limits.total_cost_limit);
        }
        if amount.is_zero() {
            return Ok(None);
        }

        let recipient = match limits.payee {
            GasPayee::Relayer => Some(relayer.clone()),
            GasPayee::FeeCollector => None,
        };
        Ok(Some(Reimbursement {
            token,
            amount,
            recipient,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::mock_dependencies;

    const RELAYED: RelayerGasAccounting = RelayerGasAccounting::new("relayers", "gas_limits");

    fn report(gas_used: u64, gas_price: &str) -> GasReport {
        GasReport {
            gas_used,
            gas_price: gas_price.parse().unwrap(),
        }
    }

    fn wallet_config() -> ConfigResponse {
        ConfigResponse {
            native_denom: "native".into(),
            wrapped_native_token: Addr::unchecked("wrapper"),
            wrapped_native_denom: "wnative".into(),
            price_oracle: None,
            swap_connector: None,
            fee_collector: Addr::unchecked("collector"),
        }
    }

    #[test]
    fn direct_calls_skip_relayer_gates() {
        let deps = mock_dependencies();
        RELAYED.check(&deps.storage, &Addr::unchecked("manager"), None).unwrap();
    }

    #[test]
    fn rejects_unknown_relayers() {
        let mut deps = mock_dependencies();
        let bot = Addr::unchecked("bot");
        let gas = report(100, "1");

        let err = RELAYED.check(&deps.storage, &bot, Some(&gas)).unwrap_err();
        assert_eq!(err, SmartVaultsError::RelayerNotAllowed);

        RELAYED.set_relayer(&mut deps.storage, &bot, true).unwrap();
        RELAYED.check(&deps.storage, &bot, Some(&gas)).unwrap();

        RELAYED.set_relayer(&mut deps.storage, &bot, false).unwrap();
        let err = RELAYED.check(&deps.storage, &bot, Some(&gas)).unwrap_err();
        assert_eq!(err, SmartVaultsError::RelayerNotAllowed);
    }

    #[test]
    fn enforces_gas_price_ceiling() {
        let mut deps = mock_dependencies();
        let bot = Addr::unchecked("bot");
        RELAYED.set_relayer(&mut deps.storage, &bot, true).unwrap();
        RELAYED
            .set_limits(
                &mut deps.storage,
                "0.5".parse().unwrap(),
                Uint128::zero(),
                "wnative".into(),
            )
            .unwrap();

        RELAYED.check(&deps.storage, &bot, Some(&report(100, "0.5"))).unwrap();
        let err = RELAYED
            .check(&deps.storage, &bot, Some(&report(100, "0.51")))
            .unwrap_err();
        assert_eq!(err, SmartVaultsError::GasPriceLimitExceeded);

        // zero ceiling is unlimited
        RELAYED
            .set_limits(&mut deps.storage, Decimal::zero(), Uint128::zero(), "wnative".into())
            .unwrap();
        RELAYED.check(&deps.storage, &bot, Some(&report(100, "1000"))).unwrap();
    }

    #[test]
    fn reimburses_relayer_in_wrapped_native() {
        let mut deps = mock_dependencies();
        let bot = Addr::unchecked("bot");
        RELAYED
            .set_limits(&mut deps.storage, Decimal::one(), Uint128::zero(), "wnative".into())
            .unwrap();

        let reimbursement = RELAYED
            .reimbursement(
                deps.as_ref(),
                &Addr::unchecked("wallet"),
                &wallet_config(),
                &bot,
                Some(&report(100_000, "0.25")),
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            reimbursement,
            Reimbursement {
                token: "wnative".into(),
                amount: Uint128::new(25_000),
                recipient: Some(bot),
            }
        );
    }

    #[test]
    fn clamps_to_total_cost_limit_and_routes_to_fee_collector() {
        let mut deps = mock_dependencies();
        RELAYED
            .set_limits(&mut deps.storage, Decimal::zero(), Uint128::new(10_000), "native".into())
            .unwrap();
        RELAYED.set_payee(&mut deps.storage, GasPayee::FeeCollector).unwrap();

        let reimbursement = RELAYED
            .reimbursement(
                deps.as_ref(),
                &Addr::unchecked("wallet"),
                &wallet_config(),
                &Addr::unchecked("bot"),
                Some(&report(100_000, "0.25")),
            )
            .unwrap()
            .unwrap();
        assert_eq!(reimbursement.amount, Uint128::new(10_000));
        assert_eq!(reimbursement.recipient, None);
        assert_eq!(reimbursement.amount_in("native"), Uint128::new(10_000));
        assert_eq!(reimbursement.amount_in("wnative"), Uint128::zero());
    }

    #[test]
    fn direct_calls_are_not_reimbursed() {
        let deps = mock_dependencies();
        let reimbursement = RELAYED
            .reimbursement(
                deps.as_ref(),
                &Addr::unchecked("wallet"),
                &wallet_config(),
                &Addr::unchecked("manager"),
                None,
            )
            .unwrap();
        assert_eq!(reimbursement, None);
    }
}
