//! Storage layout and handlers shared by every action contract.
//!
//! Each action keeps its gates in the same namespaces, so the handlers below
//! can serve the configuration messages every action exposes. The contract's
//! own `call` composes them in a fixed order: authorization, relayer gates,
//! time-lock, threshold, operation, reimbursement.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Decimal, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Uint128};
use cw_storage_plus::Item;

use crate::auth::Authorizer;
use crate::capabilities::{
    AUTHORIZE, CALL, SET_LIMITS, SET_RECIPIENT, SET_RELAYER, SET_THRESHOLD, SET_TIME_LOCK,
    SET_WALLET, UNAUTHORIZE,
};
use crate::error::SmartVaultsError;
use crate::relayed::{GasLimits, GasPayee, GasReport, RelayerGasAccounting, RelayersResponse};
use crate::threshold::TokenThreshold;
use crate::time_lock::TimeLock;

pub const AUTHORIZER: Authorizer = Authorizer::new("permissions");
pub const WALLET: Item<Addr> = Item::new("wallet");
pub const RELAYED: RelayerGasAccounting = RelayerGasAccounting::new("relayers", "gas_limits");
pub const THRESHOLD: TokenThreshold = TokenThreshold::new("threshold");
pub const TIME_LOCK: TimeLock = TimeLock::new("time_lock");
pub const RECIPIENT: Item<Addr> = Item::new("recipient");

/// Instantiation parameters common to every action.
#[cw_serde]
pub struct ActionParams {
    pub admin: String,
    pub wallet: String,
    pub relayers: Vec<String>,
    pub gas_limits: GasLimits,
}

#[cw_serde]
pub struct WalletResponse {
    pub wallet: Addr,
}

#[cw_serde]
pub struct RecipientResponse {
    pub recipient: Option<Addr>,
}

/// Stores wallet, relayers and gas limits and hands the admin the
/// permission capabilities.
pub fn instantiate_action(
    deps: DepsMut,
    params: ActionParams,
) -> Result<Response, SmartVaultsError> {
    let admin = deps.api.addr_validate(&params.admin)?;
    AUTHORIZER.grant_all(deps.storage, &admin, &[AUTHORIZE, UNAUTHORIZE])?;

    let wallet = deps.api.addr_validate(&params.wallet)?;
    WALLET.save(deps.storage, &wallet)?;

    for relayer in &params.relayers {
        let relayer = deps.api.addr_validate(relayer)?;
        RELAYED.set_relayer(deps.storage, &relayer, true)?;
    }
    RELAYED.save_limits(deps.storage, &params.gas_limits)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("admin", admin)
        .add_attribute("wallet", wallet)
        .add_attribute("relayer_count", params.relayers.len().to_string()))
}

/// Steps one and two of every call: the `call` capability, then the relayer
/// whitelist and gas price ceiling for relayed calls. Returns the wallet.
pub fn begin_call(
    deps: Deps,
    info: &MessageInfo,
    gas: Option<&GasReport>,
) -> Result<Addr, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, CALL)?;
    RELAYED.check(deps.storage, &info.sender, gas)?;
    Ok(WALLET.load(deps.storage)?)
}

pub fn execute_set_wallet(
    deps: DepsMut,
    info: MessageInfo,
    wallet: String,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_WALLET)?;
    let wallet = deps.api.addr_validate(&wallet)?;
    WALLET.save(deps.storage, &wallet)?;

    Ok(Response::new()
        .add_attribute("action", "set_wallet")
        .add_attribute("wallet", wallet))
}

pub fn execute_set_relayer(
    deps: DepsMut,
    info: MessageInfo,
    relayer: String,
    allowed: bool,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_RELAYER)?;
    let relayer = deps.api.addr_validate(&relayer)?;
    RELAYED.set_relayer(deps.storage, &relayer, allowed)?;

    Ok(Response::new()
        .add_attribute("action", "set_relayer")
        .add_attribute("relayer", relayer)
        .add_attribute("allowed", allowed.to_string()))
}

pub fn execute_set_limits(
    deps: DepsMut,
    info: MessageInfo,
    gas_price_limit: Decimal,
    total_cost_limit: Uint128,
    paying_gas_token: String,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_LIMITS)?;
    let limits = RELAYED.set_limits(
        deps.storage,
        gas_price_limit,
        total_cost_limit,
        paying_gas_token,
    )?;

    Ok(Response::new()
        .add_attribute("action", "set_limits")
        .add_attribute("gas_price_limit", limits.gas_price_limit.to_string())
        .add_attribute("total_cost_limit", limits.total_cost_limit)
        .add_attribute("paying_gas_token", limits.paying_gas_token))
}

pub fn execute_set_gas_payee(
    deps: DepsMut,
    info: MessageInfo,
    payee: GasPayee,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_LIMITS)?;
    RELAYED.set_payee(deps.storage, payee.clone())?;

    Ok(Response::new()
        .add_attribute("action", "set_gas_payee")
        .add_attribute("payee", format!("{:?}", payee)))
}

pub fn execute_set_threshold(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    amount: Uint128,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_THRESHOLD)?;
    let threshold = THRESHOLD.set(deps.storage, token, amount)?;

    Ok(Response::new()
        .add_attribute("action", "set_threshold")
        .add_attribute("token", threshold.token)
        .add_attribute("amount", threshold.amount))
}

pub fn execute_set_time_lock(
    deps: DepsMut,
    info: MessageInfo,
    period: u64,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_TIME_LOCK)?;
    let state = TIME_LOCK.set_period(deps.storage, period)?;

    Ok(Response::new()
        .add_attribute("action", "set_time_lock")
        .add_attribute("period", state.period.to_string()))
}

pub fn execute_set_recipient(
    deps: DepsMut,
    info: MessageInfo,
    recipient: String,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_RECIPIENT)?;
    let recipient = deps.api.addr_validate(&recipient)?;
    RECIPIENT.save(deps.storage, &recipient)?;

    Ok(Response::new()
        .add_attribute("action", "set_recipient")
        .add_attribute("recipient", recipient))
}

/// Consumes the time-lock at the current block time.
pub fn consume_time_lock(deps: DepsMut, env: &Env) -> Result<Response, SmartVaultsError> {
    let state = TIME_LOCK.check_and_consume(deps.storage, env.block.time.seconds())?;
    let next = state.next_reset_time.unwrap_or_default();
    Ok(Response::new().add_attribute("next_reset_time", next.to_string()))
}

pub fn query_wallet(deps: Deps) -> StdResult<WalletResponse> {
    Ok(WalletResponse {
        wallet: WALLET.load(deps.storage)?,
    })
}

pub fn query_recipient(deps: Deps) -> StdResult<RecipientResponse> {
    Ok(RecipientResponse {
        recipient: RECIPIENT.may_load(deps.storage)?,
    })
}

pub fn query_relayers(deps: Deps) -> StdResult<RelayersResponse> {
    Ok(RelayersResponse {
        relayers: RELAYED.relayers(deps.storage)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::{mock_dependencies, mock_env, mock_info};

    fn setup(deps: DepsMut) {
        instantiate_action(
            deps,
            ActionParams {
                admin: "admin".into(),
                wallet: "wallet".into(),
                relayers: vec!["bot".into()],
                gas_limits: GasLimits::default(),
            },
        )
        .unwrap();
    }

    #[test]
    fn admin_only_manages_permissions() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        let admin = Addr::unchecked("admin");

        assert!(AUTHORIZER.is_authorized(&deps.storage, &admin, AUTHORIZE));
        assert!(!AUTHORIZER.is_authorized(&deps.storage, &admin, CALL));
        assert!(RELAYED.is_relayer(&deps.storage, &Addr::unchecked("bot")));
        assert_eq!(query_wallet(deps.as_ref()).unwrap().wallet, Addr::unchecked("wallet"));
    }

    #[test]
    fn call_requires_capability_before_relayer_checks() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        let gas = GasReport {
            gas_used: 1,
            gas_price: Decimal::one(),
        };

        // whitelisted relayer without the call capability
        let err = begin_call(deps.as_ref(), &mock_info("bot", &[]), Some(&gas)).unwrap_err();
        assert_eq!(err, SmartVaultsError::PermissionDenied);

        AUTHORIZER.grant(&mut deps.storage, &Addr::unchecked("bot"), CALL).unwrap();
        AUTHORIZER.grant(&mut deps.storage, &Addr::unchecked("stranger"), CALL).unwrap();
        begin_call(deps.as_ref(), &mock_info("bot", &[]), Some(&gas)).unwrap();

        let err = begin_call(deps.as_ref(), &mock_info("stranger", &[]), Some(&gas)).unwrap_err();
        assert_eq!(err, SmartVaultsError::RelayerNotAllowed);
        // managers may call directly without being reimbursed
        begin_call(deps.as_ref(), &mock_info("stranger", &[]), None).unwrap();
    }

    #[test]
    fn setters_are_guarded() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());

        let err = execute_set_time_lock(deps.as_mut(), mock_info("admin", &[]), 10).unwrap_err();
        assert_eq!(err, SmartVaultsError::PermissionDenied);

        AUTHORIZER
            .grant(&mut deps.storage, &Addr::unchecked("admin"), SET_TIME_LOCK)
            .unwrap();
        execute_set_time_lock(deps.as_mut(), mock_info("admin", &[]), 10).unwrap();
        assert_eq!(TIME_LOCK.load(&deps.storage).unwrap().period, 10);
    }

    #[test]
    fn consumes_time_lock_at_block_time() {
        let mut deps = mock_dependencies();
        let env = mock_env();
        let now = env.block.time.seconds();
        TIME_LOCK.initialize(&mut deps.storage, 60, now - 60).unwrap();

        let res = consume_time_lock(deps.as_mut(), &env).unwrap();
        assert_eq!(res.attributes[0].value, (now + 60).to_string());

        let err = consume_time_lock(deps.as_mut(), &env).unwrap_err();
        assert_eq!(err, SmartVaultsError::TimeLockNotExpired);
    }
}
