//! `cw-multi-test` wrappers of the workspace contracts.

use cosmwasm_std::Empty;
use cw_multi_test::{Contract, ContractWrapper};

pub fn wallet_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        wallet::contract::execute,
        wallet::contract::instantiate,
        wallet::contract::query,
    )
    .with_reply(wallet::contract::reply);
    Box::new(contract)
}

pub fn smart_vault_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        smart_vault::execute,
        smart_vault::instantiate,
        smart_vault::query,
    );
    Box::new(contract)
}

pub fn registry_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(registry::execute, registry::instantiate, registry::query);
    Box::new(contract)
}

pub fn wrapper_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(wrapper::execute, wrapper::instantiate, wrapper::query);
    Box::new(contract)
}

pub fn withdrawer_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        withdrawer::execute,
        withdrawer::instantiate,
        withdrawer::query,
    );
    Box::new(contract)
}

pub fn token_claimer_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        token_claimer::execute,
        token_claimer::instantiate,
        token_claimer::query,
    );
    Box::new(contract)
}

pub fn native_claimer_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        native_claimer::execute,
        native_claimer::instantiate,
        native_claimer::query,
    );
    Box::new(contract)
}
