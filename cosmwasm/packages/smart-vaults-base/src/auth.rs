use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, DepsMut, Empty, MessageInfo, Order, Response, StdResult, Storage};
use cw_storage_plus::Map;

use crate::capabilities::{AUTHORIZE, UNAUTHORIZE};
use crate::error::SmartVaultsError;

#[cw_serde]
pub struct IsAuthorizedResponse {
    pub authorized: bool,
}

#[cw_serde]
pub struct PermissionsResponse {
    pub capabilities: Vec<String>,
}

/// Permission table of a single contract: (account, capability) -> granted.
///
/// Granting and revoking are themselves capabilities (`authorize` and
/// `unauthorize`), so holding an operational capability never lets an
/// account hand it out.
pub struct Authorizer<'a> {
    permissions: Map<'a, (&'a Addr, &'a str), Empty>,
}

impl<'a> Authorizer<'a> {
    pub const fn new(namespace: &'a str) -> Self {
        Authorizer {
            permissions: Map::new(namespace),
        }
    }

    pub fn is_authorized(&self, storage: &dyn Storage, who: &Addr, what: &str) -> bool {
        self.permissions.has(storage, (who, what))
    }

    pub fn assert_authorized(
        &self,
        storage: &dyn Storage,
        who: &Addr,
        what: &str,
    ) -> Result<(), SmartVaultsError> {
        if !self.is_authorized(storage, who, what) {
            return Err(SmartVaultsError::PermissionDenied);
        }
        Ok(())
    }

    /// Unchecked grant, for instantiation only.
    pub fn grant(&self, storage: &mut dyn Storage, who: &Addr, what: &str) -> StdResult<()> {
        self.permissions.save(storage, (who, what), &Empty {})
    }

    pub fn grant_all(&self, storage: &mut dyn Storage, who: &Addr, what: &[&str]) -> StdResult<()> {
        for capability in what {
            self.grant(storage, who, capability)?;
        }
        Ok(())
    }

    pub fn revoke(&self, storage: &mut dyn Storage, who: &Addr, what: &str) {
        self.permissions.remove(storage, (who, what));
    }

    pub fn permissions_of(&self, storage: &dyn Storage, who: &Addr) -> StdResult<Vec<String>> {
        self.permissions
            .prefix(who)
            .keys(storage, None, None, Order::Ascending)
            .collect()
    }

    pub fn execute_authorize(
        &self,
        deps: DepsMut,
        info: &MessageInfo,
        who: String,
        what: String,
    ) -> Result<Response, SmartVaultsError> {
        self.assert_authorized(deps.storage, &info.sender, AUTHORIZE)?;
        let who = deps.api.addr_validate(&who)?;
        self.grant(deps.storage, &who, &what)?;

        Ok(Response::new()
            .add_attribute("action", "authorize")
            .add_attribute("who", who)
            .add_attribute("what", what))
    }

    pub fn execute_unauthorize(
        &self,
        deps: DepsMut,
        info: &MessageInfo,
        who: String,
        what: String,
    ) -> Result<Response, SmartVaultsError> {
        self.assert_authorized(deps.storage, &info.sender, UNAUTHORIZE)?;
        let who = deps.api.addr_validate(&who)?;
        self.revoke(deps.storage, &who, &what);

        Ok(Response::new()
            .add_attribute("action", "unauthorize")
            .add_attribute("who", who)
            .add_attribute("what", what))
    }

    pub fn query_is_authorized(
        &self,
        storage: &dyn Storage,
        who: &Addr,
        what: &str,
    ) -> IsAuthorizedResponse {
        IsAuthorizedResponse {
            authorized: self.is_authorized(storage, who, what),
        }
    }

    pub fn query_permissions(
        &self,
        storage: &dyn Storage,
        who: &Addr,
    ) -> StdResult<PermissionsResponse> {
        Ok(PermissionsResponse {
            capabilities: self.permissions_of(storage, who)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::{mock_dependencies, mock_info};

    const AUTH: Authorizer = Authorizer::new("permissions");

    fn setup(deps: DepsMut) -> Addr {
        let admin = Addr::unchecked("admin");
        AUTH.grant_all(deps.storage, &admin, &[AUTHORIZE, UNAUTHORIZE])
            .unwrap();
        admin
    }

    #[test]
    fn admin_grants_and_revokes() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        let admin = mock_info("admin", &[]);
        let alice = Addr::unchecked("alice");

        AUTH.execute_authorize(deps.as_mut(), &admin, "alice".into(), "withdraw".into())
            .unwrap();
        assert!(AUTH.is_authorized(&deps.storage, &alice, "withdraw"));

        AUTH.execute_unauthorize(deps.as_mut(), &admin, "alice".into(), "withdraw".into())
            .unwrap();
        assert!(!AUTH.is_authorized(&deps.storage, &alice, "withdraw"));
    }

    #[test]
    fn latest_call_wins() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        let admin = mock_info("admin", &[]);
        let alice = Addr::unchecked("alice");

        for _ in 0..2 {
            AUTH.execute_authorize(deps.as_mut(), &admin, "alice".into(), "wrap".into())
                .unwrap();
        }
        AUTH.execute_unauthorize(deps.as_mut(), &admin, "alice".into(), "wrap".into())
            .unwrap();
        assert!(!AUTH.is_authorized(&deps.storage, &alice, "wrap"));

        AUTH.execute_unauthorize(deps.as_mut(), &admin, "alice".into(), "wrap".into())
            .unwrap();
        AUTH.execute_authorize(deps.as_mut(), &admin, "alice".into(), "wrap".into())
            .unwrap();
        assert!(AUTH.is_authorized(&deps.storage, &alice, "wrap"));
    }

    #[test]
    fn operational_capability_cannot_be_delegated() {
        let mut deps = mock_dependencies();
        setup(deps.as_mut());
        let alice = Addr::unchecked("alice");
        AUTH.grant(&mut deps.storage, &alice, "withdraw").unwrap();
        let sender = mock_info("alice", &[]);

        let err = AUTH
            .execute_authorize(deps.as_mut(), &sender, "bob".into(), "withdraw".into())
            .unwrap_err();
        assert_eq!(err, SmartVaultsError::PermissionDenied);

        let err = AUTH
            .execute_unauthorize(deps.as_mut(), &sender, "alice".into(), "withdraw".into())
            .unwrap_err();
        assert_eq!(err, SmartVaultsError::PermissionDenied);
        assert!(AUTH.is_authorized(&deps.storage, &alice, "withdraw"));
    }

    #[test]
    fn authorize_does_not_imply_unauthorize() {
        let mut deps = mock_dependencies();
        let granter = Addr::unchecked("granter");
        AUTH.grant(&mut deps.storage, &granter, AUTHORIZE).unwrap();

        let sender = mock_info("granter", &[]);

        AUTH.execute_authorize(deps.as_mut(), &sender, "bob".into(), "call".into())
            .unwrap();
        let err = AUTH
            .execute_unauthorize(deps.as_mut(), &sender, "bob".into(), "call".into())
            .unwrap_err();
        assert_eq!(err, SmartVaultsError::PermissionDenied);
    }

    #[test]
    fn lists_permissions_per_account() {
        let mut deps = mock_dependencies();
        let admin = setup(deps.as_mut());
        AUTH.grant(&mut deps.storage, &Addr::unchecked("other"), "call").unwrap();

        let res = AUTH.query_permissions(&deps.storage, &admin).unwrap();
        assert_eq!(res.capabilities, vec!["authorize".to_string(), "unauthorize".to_string()]);
    }
}
