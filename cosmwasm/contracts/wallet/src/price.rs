use cosmwasm_std::{Addr, Decimal, Deps, Fraction, StdError, StdResult};

use smart_vaults_base::interfaces::price_oracle::{QueryMsg as OracleQueryMsg, RateResponse};
use smart_vaults_base::SmartVaultsError;

use crate::state::{CONFIG, PRICE_FEEDS};

/// Feed registered for the pair, looked up as `(base, quote)` and then as
/// `(quote, base)`. The flag is set when the feed was found inverted.
pub fn find_feed(deps: Deps, base: &str, quote: &str) -> StdResult<Option<(String, bool)>> {
    if let Some(feed) = PRICE_FEEDS.may_load(deps.storage, (base, quote))? {
        return Ok(Some((feed, false)));
    }
    Ok(PRICE_FEEDS
        .may_load(deps.storage, (quote, base))?
        .map(|feed| (feed, true)))
}

/// Rate converting `base` units into `quote` units. Uses the feed registered
/// for the pair, or the inverse of the feed registered the other way round.
pub fn get_price(deps: Deps, base: &str, quote: &str) -> Result<Decimal, SmartVaultsError> {
    if base == quote {
        return Ok(Decimal::one());
    }

    match find_feed(deps, base, quote)? {
        Some((feed, false)) => query_rate(deps, &feed),
        Some((feed, true)) => {
            let rate = query_rate(deps, &feed)?;
            rate.inv().ok_or_else(|| {
                StdError::generic_err(format!("zero rate reported by feed {feed}")).into()
            })
        }
        None => Err(SmartVaultsError::PriceFeedNotSet),
    }
}

fn query_rate(deps: Deps, feed: &str) -> Result<Decimal, SmartVaultsError> {
    let oracle: Addr = CONFIG
        .load(deps.storage)?
        .price_oracle
        .ok_or(SmartVaultsError::PriceOracleNotSet)?;
    let res: RateResponse = deps.querier.query_wasm_smart(
        oracle,
        &OracleQueryMsg::Rate {
            feed: feed.to_string(),
        },
    )?;
    Ok(res.rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::mock_dependencies;

    use crate::state::Config;

    #[test]
    fn same_token_needs_no_feed() {
        let deps = mock_dependencies();
        assert_eq!(get_price(deps.as_ref(), "usdc", "usdc").unwrap(), Decimal::one());
    }

    #[test]
    fn missing_feed_is_reported() {
        let mut deps = mock_dependencies();
        CONFIG
            .save(
                &mut deps.storage,
                &Config {
                    native_denom: "native".into(),
                    wrapped_native_token: Addr::unchecked("wrapper"),
                    wrapped_native_denom: "wnative".into(),
                    price_oracle: Some(Addr::unchecked("oracle")),
                    swap_connector: None,
                    fee_collector: Addr::unchecked("collector"),
                },
            )
            .unwrap();

        let err = get_price(deps.as_ref(), "native", "usdc").unwrap_err();
        assert_eq!(err, SmartVaultsError::PriceFeedNotSet);
    }

    #[test]
    fn feed_is_found_in_either_direction() {
        let mut deps = mock_dependencies();
        PRICE_FEEDS
            .save(&mut deps.storage, ("native", "usdc"), &"native-usdc".to_string())
            .unwrap();

        assert_eq!(
            find_feed(deps.as_ref(), "native", "usdc").unwrap(),
            Some(("native-usdc".to_string(), false))
        );
        assert_eq!(
            find_feed(deps.as_ref(), "usdc", "native").unwrap(),
            Some(("native-usdc".to_string(), true))
        );
        assert_eq!(find_feed(deps.as_ref(), "usdc", "atom").unwrap(), None);
    }
}
