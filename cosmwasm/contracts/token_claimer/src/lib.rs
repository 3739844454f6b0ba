//! Token claimer action: pulls the wallet's claimable protocol fees of a
//! non-native token and swaps them into wrapped native at a price quoted and
//! signed off-chain by the swap signer.

use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Decimal, Deps, DepsMut, Env, MessageInfo, Response,
    StdResult, Uint128,
};
use cw_storage_plus::Item;

use smart_vaults_base::action::{self, begin_call, ActionParams, AUTHORIZER, RELAYED, THRESHOLD};
use smart_vaults_base::capabilities::{SET_FEE_CLAIMER, SET_SWAP_SIGNER};
use smart_vaults_base::interfaces::fee_claimer;
use smart_vaults_base::relayed::IsRelayerResponse;
use smart_vaults_base::signature::SwapQuote;
use smart_vaults_base::wallet::{self, ExecuteMsg as WalletMsg, SwapLimit};
use smart_vaults_base::{GasLimits, GasPayee, GasReport, SmartVaultsError, Threshold};

// SEC1 encoded secp256k1 public key
pub const SWAP_SIGNER: Item<Binary> = Item::new("swap_signer");
pub const FEE_CLAIMER: Item<Addr> = Item::new("fee_claimer");

#[cosmwasm_schema::cw_serde]
pub struct InstantiateMsg {
    pub action: ActionParams,
    pub swap_signer: Binary,
    pub fee_claimer: String,
    pub threshold: Threshold,
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
    SetSwapSigner {
        swap_signer: Binary,
    },
    SetFeeClaimer {
        fee_claimer: String,
    },
    SetThreshold {
        token: String,
        amount: Uint128,
    },
    Call {
        token_in: String,
        amount_in: Uint128,
        min_amount_out: Uint128,
        deadline: u64,
        data: Binary,
        signature: Binary,
        gas: Option<GasReport>,
    },
}

#[cosmwasm_schema::cw_serde]
pub enum QueryMsg {
    Config {},
    Wallet {},
    Threshold {},
    GasLimits {},
    IsRelayer { relayer: String },
    Relayers {},
    IsAuthorized { who: String, what: String },
    Permissions { who: String },
}

#[cosmwasm_schema::cw_serde]
pub struct ConfigResponse {
    pub wallet: Addr,
    pub swap_signer: Binary,
    pub fee_claimer: Addr,
    pub threshold: Threshold,
    pub gas_limits: GasLimits,
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, SmartVaultsError> {
    let res = action::instantiate_action(deps.branch(), msg.action)?;
    THRESHOLD.set(deps.storage, msg.threshold.token, msg.threshold.amount)?;
    SWAP_SIGNER.save(deps.storage, &msg.swap_signer)?;
    let fee_claimer = deps.api.addr_validate(&msg.fee_claimer)?;
    FEE_CLAIMER.save(deps.storage, &fee_claimer)?;

    Ok(res
        .add_attribute("fee_claimer", fee_claimer)
        .add_attribute("swap_signer", msg.swap_signer.to_base64()))
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
        ExecuteMsg::SetSwapSigner { swap_signer } => {
            AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_SWAP_SIGNER)?;
            SWAP_SIGNER.save(deps.storage, &swap_signer)?;
            Ok(Response::new()
                .add_attribute("action", "set_swap_signer")
                .add_attribute("swap_signer", swap_signer.to_base64()))
        }
        ExecuteMsg::SetFeeClaimer { fee_claimer } => {
            AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_FEE_CLAIMER)?;
            let fee_claimer = deps.api.addr_validate(&fee_claimer)?;
            FEE_CLAIMER.save(deps.storage, &fee_claimer)?;
            Ok(Response::new()
                .add_attribute("action", "set_fee_claimer")
                .add_attribute("fee_claimer", fee_claimer))
        }
        ExecuteMsg::SetThreshold { token, amount } => {
            action::execute_set_threshold(deps, info, token, amount)
        }
        ExecuteMsg::Call {
            token_in,
            amount_in,
            min_amount_out,
            deadline,
            data,
            signature,
            gas,
        } => execute_call(
            deps,
            env,
            info,
            SwapCall {
                token_in,
                amount_in,
                min_amount_out,
                deadline,
                data,
                signature,
            },
            gas,
        ),
    }
}

/// Swap terms of a claim, as signed by the swap signer.
pub struct SwapCall {
    pub token_in: String,
    pub amount_in: Uint128,
    pub min_amount_out: Uint128,
    pub deadline: u64,
    pub data: Binary,
    pub signature: Binary,
}

/// Claims `token_in` from the fee claimer into the wallet and swaps
/// `amount_in` of it into wrapped native. The signed quote's output token is
/// always the wallet's wrapped native denom.
pub fn execute_call(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    call: SwapCall,
    gas: Option<GasReport>,
) -> Result<Response, SmartVaultsError> {
    let wallet = begin_call(deps.as_ref(), &info, gas.as_ref())?;
    let config = wallet::query_config(&deps.querier, &wallet)?;
    if config.is_native_or_wrapped(&call.token_in) {
        return Err(SmartVaultsError::InvalidToken);
    }

    let quote = SwapQuote {
        token_in: &call.token_in,
        token_out: &config.wrapped_native_denom,
        is_buy: false,
        amount_in: call.amount_in,
        min_amount_out: call.min_amount_out,
        deadline: call.deadline,
        data: call.data.as_slice(),
    };
    let signer = SWAP_SIGNER.load(deps.storage)?;
    quote.verify(deps.api, &call.signature, &signer)?;
    if env.block.time.seconds() > call.deadline {
        return Err(SmartVaultsError::DeadlineExpired);
    }

    let fee_claimer = FEE_CLAIMER.load(deps.storage)?;
    let claimable =
        fee_claimer::query_balance(&deps.querier, &fee_claimer, &call.token_in, &wallet)?;
    THRESHOLD.check(deps.as_ref(), &wallet, &call.token_in, claimable)?;

    let reimbursement =
        RELAYED.reimbursement(deps.as_ref(), &wallet, &config, &info.sender, gas.as_ref())?;

    let claim = WalletMsg::Call {
        target: fee_claimer.to_string(),
        msg: to_json_binary(&fee_claimer::ExecuteMsg::WithdrawAll {
            token: call.token_in.clone(),
            recipient: wallet.to_string(),
        })?,
        funds: vec![],
    };
    let swap = WalletMsg::Swap {
        token_in: call.token_in.clone(),
        token_out: config.wrapped_native_denom.clone(),
        amount_in: call.amount_in,
        limit: SwapLimit::MinAmountOut(call.min_amount_out),
        data: call.data,
    };

    let mut res = Response::new()
        .add_message(wallet::execute(&wallet, &claim)?)
        .add_message(wallet::execute(&wallet, &swap)?)
        .add_attribute("action", "call")
        .add_attribute("token_in", call.token_in)
        .add_attribute("claimed", claimable)
        .add_attribute("amount_in", call.amount_in)
        .add_attribute("min_amount_out", call.min_amount_out);
    // paid last so gas in wrapped native can come out of the swap proceeds
    if let Some(reimbursement) = reimbursement {
        res = res
            .add_attribute("reimbursement", reimbursement.amount)
            .add_message(reimbursement.into_msg(&wallet)?);
    }
    Ok(res)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&ConfigResponse {
            wallet: action::WALLET.load(deps.storage)?,
            swap_signer: SWAP_SIGNER.load(deps.storage)?,
            fee_claimer: FEE_CLAIMER.load(deps.storage)?,
            threshold: THRESHOLD.load(deps.storage)?,
            gas_limits: RELAYED.limits(deps.storage)?,
        }),
        QueryMsg::Wallet {} => to_json_binary(&action::query_wallet(deps)?),
        QueryMsg::Threshold {} => to_json_binary(&THRESHOLD.load(deps.storage)?),
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
