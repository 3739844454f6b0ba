//! Deployment of a complete environment: collaborator mocks, the registry, a
//! wallet, its actions and the smart vault tying them together, with every
//! permission the owner, the relayers and the actions need.

use anyhow::Result;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Coin, Decimal, Empty};
use cw_multi_test::{App, BankSudo, Contract, Executor, SudoMsg};
use serde::Deserialize;

use smart_vaults_base::action::ActionParams;
use smart_vaults_base::capabilities::*;
use smart_vaults_base::wallet::{FeeParams, PriceFeed};
use smart_vaults_base::{GasLimits, Threshold};

use crate::contracts::*;
use crate::mocks;

const LOCALNET: &str = include_str!("../deploy/localnet.json");

#[derive(Debug, Clone, Deserialize)]
pub struct DeployInput {
    pub accounts: Accounts,
    pub denoms: Denoms,
    pub wallet: WalletInput,
    #[serde(default)]
    pub oracle_rates: Vec<OracleRate>,
    #[serde(default)]
    pub swap_rates: Vec<SwapRate>,
    pub wrapper: ClaimerInput,
    pub withdrawer: WithdrawerInput,
    pub token_claimer: ClaimerInput,
    pub native_claimer: ClaimerInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Accounts {
    pub owner: String,
    pub relayers: Vec<String>,
    pub managers: Vec<String>,
    pub fee_collector: String,
    pub treasury: String,
    /// Hex encoded SEC1 public key.
    pub swap_signer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Denoms {
    pub native: String,
    pub wrapped: String,
    pub stable: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletInput {
    pub swap_fee: Option<FeeParams>,
    pub withdraw_fee: Option<FeeParams>,
    pub performance_fee: Option<FeeParams>,
    #[serde(default)]
    pub price_feeds: Vec<PriceFeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleRate {
    pub feed: String,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapRate {
    pub token_in: String,
    pub token_out: String,
    pub rate: Decimal,
}

/// Parameters of the thresholded actions.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimerInput {
    pub threshold: Threshold,
    pub gas_limits: GasLimits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawerInput {
    pub token: String,
    pub time_lock: u64,
    pub gas_limits: GasLimits,
}

impl DeployInput {
    pub fn localnet() -> Result<Self> {
        Ok(serde_json::from_str(LOCALNET)?)
    }
}

/// Addresses of a deployed environment.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub input: DeployInput,
    pub owner: Addr,
    pub registry: Addr,
    pub wallet: Addr,
    pub smart_vault: Addr,
    pub wrapper: Addr,
    pub withdrawer: Addr,
    pub token_claimer: Addr,
    pub native_claimer: Addr,
    pub oracle: Addr,
    pub swap_connector: Addr,
    pub fee_claimer: Addr,
    pub wrapped_native: Addr,
    pub strategy: Addr,
}

/// Capabilities each action holds on the wallet.
pub const WRAPPER_ON_WALLET: &[&str] = &[WRAP, WITHDRAW, REIMBURSE];
pub const WITHDRAWER_ON_WALLET: &[&str] = &[WITHDRAW, REIMBURSE];
pub const TOKEN_CLAIMER_ON_WALLET: &[&str] = &[CALL, SWAP, REIMBURSE];
pub const NATIVE_CLAIMER_ON_WALLET: &[&str] = &[CALL, WRAP, REIMBURSE];

/// Capabilities the owner holds on each action.
pub const WRAPPER_OWNER: &[&str] = &[
    CALL,
    SET_WALLET,
    SET_LIMITS,
    SET_RELAYER,
    SET_THRESHOLD,
    SET_RECIPIENT,
];
pub const WITHDRAWER_OWNER: &[&str] = &[
    CALL,
    SET_WALLET,
    SET_LIMITS,
    SET_RELAYER,
    SET_TIME_LOCK,
    SET_RECIPIENT,
    SET_TOKEN,
];
pub const TOKEN_CLAIMER_OWNER: &[&str] = &[
    CALL,
    SET_WALLET,
    SET_LIMITS,
    SET_RELAYER,
    SET_SWAP_SIGNER,
    SET_FEE_CLAIMER,
    SET_THRESHOLD,
];
pub const NATIVE_CLAIMER_OWNER: &[&str] = &[
    CALL,
    SET_WALLET,
    SET_LIMITS,
    SET_RELAYER,
    SET_FEE_CLAIMER,
    SET_THRESHOLD,
];

// Every contract in the workspace accepts this shape.
#[cw_serde]
enum PermissionMsg {
    Authorize { who: String, what: String },
}

/// Grants `what` to `who` on `contract`, sent by `owner`.
pub fn authorize(
    app: &mut App,
    owner: &Addr,
    contract: &Addr,
    who: &str,
    what: &[&str],
) -> Result<()> {
    for capability in what {
        app.execute_contract(
            owner.clone(),
            contract.clone(),
            &PermissionMsg::Authorize {
                who: who.to_string(),
                what: capability.to_string(),
            },
            &[],
        )?;
    }
    Ok(())
}

/// Mints `amount` to `to` out of thin air.
pub fn mint(app: &mut App, to: &Addr, amount: Vec<Coin>) -> Result<()> {
    app.sudo(SudoMsg::Bank(BankSudo::Mint {
        to_address: to.to_string(),
        amount,
    }))?;
    Ok(())
}

pub fn deploy(app: &mut App, input: DeployInput) -> Result<Deployment> {
    let owner = Addr::unchecked(&input.accounts.owner);
    let denoms = &input.denoms;

    // collaborators
    let oracle_code = app.store_code(mocks::oracle::contract());
    let connector_code = app.store_code(mocks::swap_connector::contract());
    let fee_claimer_code = app.store_code(mocks::fee_claimer::contract());
    let wrapped_code = app.store_code(mocks::wrapped_native::contract());
    let strategy_code = app.store_code(mocks::strategy::contract());

    let oracle = app.instantiate_contract(
        oracle_code,
        owner.clone(),
        &mocks::oracle::InstantiateMsg {},
        &[],
        "PriceOracle",
        None,
    )?;
    for rate in &input.oracle_rates {
        app.execute_contract(
            owner.clone(),
            oracle.clone(),
            &mocks::oracle::ExecuteMsg::SetRate {
                feed: rate.feed.clone(),
                rate: rate.rate,
            },
            &[],
        )?;
    }
    let swap_connector = app.instantiate_contract(
        connector_code,
        owner.clone(),
        &mocks::swap_connector::InstantiateMsg {},
        &[],
        "SwapConnector",
        None,
    )?;
    for rate in &input.swap_rates {
        app.execute_contract(
            owner.clone(),
            swap_connector.clone(),
            &mocks::swap_connector::ExecuteMsg::SetRate {
                token_in: rate.token_in.clone(),
                token_out: rate.token_out.clone(),
                rate: rate.rate,
            },
            &[],
        )?;
    }
    let fee_claimer = app.instantiate_contract(
        fee_claimer_code,
        owner.clone(),
        &mocks::fee_claimer::InstantiateMsg {},
        &[],
        "FeeClaimer",
        None,
    )?;
    let wrapped_native = app.instantiate_contract(
        wrapped_code,
        owner.clone(),
        &mocks::wrapped_native::InstantiateMsg {
            native_denom: denoms.native.clone(),
            wrapped_denom: denoms.wrapped.clone(),
        },
        &[],
        "WrappedNative",
        None,
    )?;
    let strategy = app.instantiate_contract(
        strategy_code,
        owner.clone(),
        &mocks::strategy::InstantiateMsg {
            token: denoms.stable.clone(),
        },
        &[],
        "Strategy",
        None,
    )?;

    let reserve = 1_000_000_000_000_000u128;
    mint(app, &wrapped_native, vec![Coin::new(reserve, &denoms.wrapped)])?;
    mint(
        app,
        &swap_connector,
        vec![
            Coin::new(reserve, &denoms.native),
            Coin::new(reserve, &denoms.stable),
            Coin::new(reserve, &denoms.wrapped),
        ],
    )?;

    // registry
    let registry_code = app.store_code(registry_contract());
    let registry = app.instantiate_contract(
        registry_code,
        owner.clone(),
        &registry::InstantiateMsg {
            admin: owner.to_string(),
        },
        &[],
        "Registry",
        None,
    )?;
    authorize(app, &owner, &registry, owner.as_str(), &[REGISTER, DEPRECATE])?;

    let register = |app: &mut App, namespace: &str, code: Box<dyn Contract<Empty>>| -> Result<u64> {
        let code_id = app.store_code(code);
        app.execute_contract(
            owner.clone(),
            registry.clone(),
            &registry::ExecuteMsg::Register {
                namespace: namespace.to_string(),
                code_id,
                stateless: false,
            },
            &[],
        )?;
        Ok(code_id)
    };
    let wallet_code = register(app, "smart-vaults.wallet", wallet_contract())?;
    let vault_code = register(app, "smart-vaults.smart-vault", smart_vault_contract())?;
    let wrapper_code = register(app, "smart-vaults.action.wrapper", wrapper_contract())?;
    let withdrawer_code = register(app, "smart-vaults.action.withdrawer", withdrawer_contract())?;
    let token_claimer_code =
        register(app, "smart-vaults.action.token-claimer", token_claimer_contract())?;
    let native_claimer_code =
        register(app, "smart-vaults.action.native-claimer", native_claimer_contract())?;

    // wallet
    let wallet = app.instantiate_contract(
        wallet_code,
        owner.clone(),
        &wallet::msg::InstantiateMsg {
            admin: owner.to_string(),
            native_denom: denoms.native.clone(),
            wrapped_native: wallet::msg::WrappedNative {
                contract: wrapped_native.to_string(),
                denom: denoms.wrapped.clone(),
            },
            fee_collector: input.accounts.fee_collector.clone(),
            price_oracle: Some(oracle.to_string()),
            swap_connector: Some(swap_connector.to_string()),
            swap_fee: input.wallet.swap_fee.clone(),
            withdraw_fee: input.wallet.withdraw_fee.clone(),
            performance_fee: input.wallet.performance_fee.clone(),
            price_feeds: input.wallet.price_feeds.clone(),
            strategies: vec![strategy.to_string()],
        },
        &[],
        "Wallet",
        None,
    )?;
    let owner_capabilities: Vec<&str> = WALLET_OWNER
        .iter()
        .copied()
        .filter(|c| *c != AUTHORIZE && *c != UNAUTHORIZE)
        .collect();
    authorize(app, &owner, &wallet, owner.as_str(), &owner_capabilities)?;
    authorize(
        app,
        &owner,
        &wallet,
        &input.accounts.fee_collector,
        &[SET_FEE_COLLECTOR],
    )?;

    // actions
    let action_params = |gas_limits: &GasLimits| ActionParams {
        admin: owner.to_string(),
        wallet: wallet.to_string(),
        relayers: input.accounts.relayers.clone(),
        gas_limits: gas_limits.clone(),
    };
    let wrapper = app.instantiate_contract(
        wrapper_code,
        owner.clone(),
        &wrapper::InstantiateMsg {
            action: action_params(&input.wrapper.gas_limits),
            threshold: input.wrapper.threshold.clone(),
            recipient: input.accounts.treasury.clone(),
        },
        &[],
        "Wrapper",
        None,
    )?;
    let withdrawer = app.instantiate_contract(
        withdrawer_code,
        owner.clone(),
        &withdrawer::InstantiateMsg {
            action: action_params(&input.withdrawer.gas_limits),
            time_lock: input.withdrawer.time_lock,
            token: input.withdrawer.token.clone(),
            recipient: input.accounts.treasury.clone(),
        },
        &[],
        "Withdrawer",
        None,
    )?;
    let token_claimer = app.instantiate_contract(
        token_claimer_code,
        owner.clone(),
        &token_claimer::InstantiateMsg {
            action: action_params(&input.token_claimer.gas_limits),
            swap_signer: Binary::from(hex::decode(&input.accounts.swap_signer)?),
            fee_claimer: fee_claimer.to_string(),
            threshold: input.token_claimer.threshold.clone(),
        },
        &[],
        "TokenClaimer",
        None,
    )?;
    let native_claimer = app.instantiate_contract(
        native_claimer_code,
        owner.clone(),
        &native_claimer::InstantiateMsg {
            action: action_params(&input.native_claimer.gas_limits),
            fee_claimer: fee_claimer.to_string(),
            threshold: input.native_claimer.threshold.clone(),
        },
        &[],
        "NativeClaimer",
        None,
    )?;

    for (action, on_wallet, owned) in [
        (&wrapper, WRAPPER_ON_WALLET, WRAPPER_OWNER),
        (&withdrawer, WITHDRAWER_ON_WALLET, WITHDRAWER_OWNER),
        (&token_claimer, TOKEN_CLAIMER_ON_WALLET, TOKEN_CLAIMER_OWNER),
        (&native_claimer, NATIVE_CLAIMER_ON_WALLET, NATIVE_CLAIMER_OWNER),
    ] {
        authorize(app, &owner, &wallet, action.as_str(), on_wallet)?;
        authorize(app, &owner, action, owner.as_str(), owned)?;
        for caller in input.accounts.relayers.iter().chain(&input.accounts.managers) {
            authorize(app, &owner, action, caller, &[CALL])?;
        }
    }

    let smart_vault = app.instantiate_contract(
        vault_code,
        owner.clone(),
        &smart_vault::InstantiateMsg {
            admin: owner.to_string(),
            wallet: wallet.to_string(),
            actions: vec![
                wrapper.to_string(),
                withdrawer.to_string(),
                token_claimer.to_string(),
                native_claimer.to_string(),
            ],
        },
        &[],
        "SmartVault",
        None,
    )?;
    authorize(app, &owner, &smart_vault, owner.as_str(), &[SET_WALLET, SET_ACTION])?;

    Ok(Deployment {
        input,
        owner,
        registry,
        wallet,
        smart_vault,
        wrapper,
        withdrawer,
        token_claimer,
        native_claimer,
        oracle,
        swap_connector,
        fee_claimer,
        wrapped_native,
        strategy,
    })
}
