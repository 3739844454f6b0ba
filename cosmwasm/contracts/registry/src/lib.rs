//! Registry of implementation code ids.
//!
//! Deployment tooling registers the code each contract is instantiated from,
//! together with its namespace, so deployed instances can be traced back to a
//! known implementation.

use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Response,
    StdResult,
};
use cw_storage_plus::Map;

use smart_vaults_base::capabilities::{AUTHORIZE, DEPRECATE, REGISTER, UNAUTHORIZE};
use smart_vaults_base::{Authorizer, SmartVaultsError};

#[cosmwasm_schema::cw_serde]
pub struct Implementation {
    pub namespace: String,
    pub code_id: u64,
    /// Stateless implementations can be shared by many instances.
    pub stateless: bool,
    pub deprecated: bool,
}

// State
pub const AUTHORIZER: Authorizer = Authorizer::new("permissions");
pub const IMPLEMENTATIONS: Map<u64, Implementation> = Map::new("implementations");

#[cosmwasm_schema::cw_serde]
pub struct InstantiateMsg {
    pub admin: String,
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
    Register {
        namespace: String,
        code_id: u64,
        stateless: bool,
    },
    Deprecate {
        code_id: u64,
    },
}

#[cosmwasm_schema::cw_serde]
pub enum QueryMsg {
    Implementation { code_id: u64 },
    /// Implementation the contract at `address` was instantiated from.
    ImplementationOf { address: String },
    IsAuthorized { who: String, what: String },
    Permissions { who: String },
}

#[cosmwasm_schema::cw_serde]
pub struct ImplementationResponse {
    pub implementation: Option<Implementation>,
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

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("admin", admin))
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
        ExecuteMsg::Register {
            namespace,
            code_id,
            stateless,
        } => execute_register(deps, info, namespace, code_id, stateless),
        ExecuteMsg::Deprecate { code_id } => execute_deprecate(deps, info, code_id),
    }
}

pub fn execute_register(
    deps: DepsMut,
    info: MessageInfo,
    namespace: String,
    code_id: u64,
    stateless: bool,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, REGISTER)?;
    if namespace.is_empty() || IMPLEMENTATIONS.has(deps.storage, code_id) {
        return Err(SmartVaultsError::InvalidInput);
    }
    IMPLEMENTATIONS.save(
        deps.storage,
        code_id,
        &Implementation {
            namespace: namespace.clone(),
            code_id,
            stateless,
            deprecated: false,
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "register")
        .add_attribute("namespace", namespace)
        .add_attribute("code_id", code_id.to_string())
        .add_attribute("stateless", stateless.to_string()))
}

pub fn execute_deprecate(
    deps: DepsMut,
    info: MessageInfo,
    code_id: u64,
) -> Result<Response, SmartVaultsError> {
    AUTHORIZER.assert_authorized(deps.storage, &info.sender, DEPRECATE)?;
    let mut implementation = IMPLEMENTATIONS
        .may_load(deps.storage, code_id)?
        .ok_or(SmartVaultsError::InvalidInput)?;
    if implementation.deprecated {
        return Err(SmartVaultsError::InvalidInput);
    }
    implementation.deprecated = true;
    IMPLEMENTATIONS.save(deps.storage, code_id, &implementation)?;

    Ok(Response::new()
        .add_attribute("action", "deprecate")
        .add_attribute("code_id", code_id.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Implementation { code_id } => to_json_binary(&ImplementationResponse {
            implementation: IMPLEMENTATIONS.may_load(deps.storage, code_id)?,
        }),
        QueryMsg::ImplementationOf { address } => {
            let address = deps.api.addr_validate(&address)?;
            let info = deps.querier.query_wasm_contract_info(&address)?;
            to_json_binary(&ImplementationResponse {
                implementation: IMPLEMENTATIONS.may_load(deps.storage, info.code_id)?,
            })
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::from_json;
    use cosmwasm_std::testing::{mock_dependencies, mock_env, mock_info};

    fn setup(deps: DepsMut) {
        instantiate(
            deps,
            mock_env(),
            mock_info("deployer", &[]),
            InstantiateMsg {
                admin: "admin".into(),
            },
        )
        .unwrap();
    }

    fn implementation(deps: Deps, code_id: u64) -> Option<Implementation> {
        let res: ImplementationResponse = from_json(
            query(deps, mock_env(), QueryMsg::Implementation { code_id }).unwrap(),
        )
        .unwrap();
        res.implementation
    }

    #[test]
    fn registers_and_deprecates() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        let admin = Addr::unchecked("admin");
        AUTHORIZER.grant_all(&mut deps.storage, &admin, &[REGISTER, DEPRECATE]).unwrap();

        let register = ExecuteMsg::Register {
            namespace: "action.wrapper".into(),
            code_id: 7,
            stateless: false,
        };
        execute(deps.as_mut(), mock_env(), mock_info("admin", &[]), register.clone()).unwrap();
        assert_eq!(
            implementation(deps.as_ref(), 7),
            Some(Implementation {
                namespace: "action.wrapper".into(),
                code_id: 7,
                stateless: false,
                deprecated: false,
            })
        );

        // code ids are registered once
        let err =
            execute(deps.as_mut(), mock_env(), mock_info("admin", &[]), register).unwrap_err();
        assert_eq!(err, SmartVaultsError::InvalidInput);

        execute(
            deps.as_mut(),
            mock_env(),
            mock_info("admin", &[]),
            ExecuteMsg::Deprecate { code_id: 7 },
        )
        .unwrap();
        assert!(implementation(deps.as_ref(), 7).unwrap().deprecated);

        let err = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("admin", &[]),
            ExecuteMsg::Deprecate { code_id: 8 },
        )
        .unwrap_err();
        assert_eq!(err, SmartVaultsError::InvalidInput);
    }

    #[test]
    fn registration_is_guarded() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());

        let err = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("stranger", &[]),
            ExecuteMsg::Register {
                namespace: "wallet".into(),
                code_id: 1,
                stateless: false,
            },
        )
        .unwrap_err();
        assert_eq!(err, SmartVaultsError::PermissionDenied);
        assert_eq!(implementation(deps.as_ref(), 1), None);
    }
}
