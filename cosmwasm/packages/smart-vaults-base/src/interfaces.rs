//! Messages understood by the wallet's external collaborators. Only the parts
//! the vault contracts rely on are described here.

pub mod price_oracle {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::Decimal;

    #[cw_serde]
    pub enum QueryMsg {
        /// Latest rate published by `feed`: quote units per base unit.
        Rate { feed: String },
    }

    #[cw_serde]
    pub struct RateResponse {
        pub rate: Decimal,
    }
}

pub mod swap_connector {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{Binary, Uint128};

    #[cw_serde]
    pub enum ExecuteMsg {
        /// Swaps the attached coin into `token_out` and sends it back to the sender.
        Swap {
            token_out: String,
            min_amount_out: Uint128,
            data: Binary,
        },
    }
}

pub mod fee_claimer {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{Addr, QuerierWrapper, StdResult, Uint128};

    #[cw_serde]
    pub enum ExecuteMsg {
        /// Pays the sender's whole claimable balance of `token` to `recipient`.
        WithdrawAll { token: String, recipient: String },
    }

    #[cw_serde]
    pub enum QueryMsg {
        Balance { token: String, account: String },
    }

    #[cw_serde]
    pub struct BalanceResponse {
        pub amount: Uint128,
    }

    pub fn query_balance(
        querier: &QuerierWrapper,
        fee_claimer: &Addr,
        token: &str,
        account: &Addr,
    ) -> StdResult<Uint128> {
        let res: BalanceResponse = querier.query_wasm_smart(
            fee_claimer,
            &QueryMsg::Balance {
                token: token.to_string(),
                account: account.to_string(),
            },
        )?;
        Ok(res.amount)
    }
}

pub mod wrapped_native {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::Uint128;

    #[cw_serde]
    pub enum ExecuteMsg {
        /// Issues the attached native amount as wrapped tokens to the sender.
        Deposit {},
        /// Burns the attached wrapped tokens and returns `amount` native to the sender.
        Withdraw { amount: Uint128 },
    }
}

pub mod strategy {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{Decimal, Uint128};

    #[cw_serde]
    pub enum ExecuteMsg {
        Join {},
        /// Pays `ratio` of the sender's position back to the sender.
        Exit { ratio: Decimal },
        Claim {},
    }

    #[cw_serde]
    pub enum QueryMsg {
        Token {},
        Value { account: String },
    }

    #[cw_serde]
    pub struct TokenResponse {
        pub token: String,
    }

    #[cw_serde]
    pub struct ValueResponse {
        pub value: Uint128,
    }
}
