use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Order, Response,
    StdResult,
};
use cw_storage_plus::{Item, Map};

use smart_vaults_base::capabilities::{AUTHORIZE, SET_ACTION, SET_WALLET, UNAUTHORIZE};
use smart_vaults_base::{Authorizer, SmartVaultsError};

// State
pub const AUTHORIZER: Authorizer = Authorizer::new("permissions");
pub const WALLET: Item<Addr> = Item::new("wallet");
pub const ACTIONS: Map<&Addr, bool> = Map::new("actions"); // action -> whitelisted

#[cosmwasm_schema::cw_serde]
pub struct InstantiateMsg {
    pub admin: String,
    pub wallet: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[cosmwasm_schema::cw_serde]
pub enum ExecuteMsg {
    Authorize { who: String, what: String },
    Unauthorize { who: String, what: String },
    SetWallet { wallet: String },
    SetAction { action: String, whitelisted: bool },
}

#[cosmwasm_schema::cw_serde]
pub enum QueryMsg {
    Wallet {},
    IsActionWhitelisted { action: String },
    Actions {},
    IsAuthorized { who: String, what: String },
    Permissions { who: String },
}

#[cosmwasm_schema::cw_serde]
pub struct WalletResponse {
    pub wallet: Addr,
}

#[cosmwasm_schema::cw_serde]
pub struct IsActionWhitelistedResponse {
    pub whitelisted: bool,
}

#[cosmwasm_schema::cw_serde]
pub struct ActionsResponse {
    pub actions: Vec<Addr>,
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, SmartVaultsError> {
    let admin = deps.api.addr_validate(&msg.admin)?;
    AUTHORIZER.grant_all(deps.storage, &admin, &[AUTHORIZE, UNAUTHORIZE])?;

    let wallet = deps.api.addr_validate(&msg.wallet)?;
    WALLET.save(deps.storage, &wallet)?;

    for action in &msg.actions {
        let action = deps.api.addr_validate(action)?;
        ACTIONS.save(deps.storage, &action, &true)?;
    }

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("admin", admin)
        .add_attribute("wallet", wallet))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, SmartVaultsError> {
    match msg {
        ExecuteMsg::Authorize { who, what } => AUTHORIZER.execute_authorize(deps, &info, who, what),
        ExecuteMsg::Unauthorize { who, what } => {
            AUTHORIZER.execute_unauthorize(deps, &info, who, what)
        }
        ExecuteMsg::SetWallet { wallet } => execute_set_wallet(deps, info, wallet),
        ExecuteMsg::SetAction {
            action,
            whitelisted,
        } => execute_set_action(deps, info, action, whitelisted),
    }
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

pub fn execute_set_action(
    deps: DepsMut,
    info: MessageInfo,
    action: String,
    whitelisted: bool,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, SET_ACTION)?;
    let action = deps.api.addr_validate(&action)?;
    if whitelisted {
        ACTIONS.save(deps.storage, &action, &true)?;
    } else {
        ACTIONS.remove(deps.storage, &action);
    }

    Ok(Response::new()
        .add_attribute("action", "set_action")
        .add_attribute("target", action)
        .add_attribute("whitelisted", whitelisted.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Wallet {} => to_json_binary(&WalletResponse {
            wallet: WALLET.load(deps.storage)?,
        }),
        QueryMsg::IsActionWhitelisted { action } => {
            let action = deps.api.addr_validate(&action)?;
            to_json_binary(&IsActionWhitelistedResponse {
                whitelisted: ACTIONS.has(deps.storage, &action),
            })
        }
        QueryMsg::Actions {} => to_json_binary(&ActionsResponse {
            actions: ACTIONS
                .keys(deps.storage, None, None, Order::Ascending)
                .collect::<StdResult<_>>()?,
        }),
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
