use cosmwasm_std::{coins, Addr, BankMsg, CosmosMsg, Decimal, DepsMut, Env, StdError, Uint128};
use cw_storage_plus::Item;

use smart_vaults_base::math::{add_seconds, mul_rate};
use smart_vaults_base::wallet::{Fee, FeeParams};
use smart_vaults_base::SmartVaultsError;

use crate::price::get_price;

pub fn validate(params: FeeParams, now: u64) -> Result<Fee, SmartVaultsError> {
    if params.pct > Decimal::one() {
        return Err(SmartVaultsError::InvalidFeePct);
    }
    let capped = !params.cap.is_zero();
    if capped && (params.token.is_empty() || params.period == 0) {
        return Err(SmartVaultsError::InvalidInput);
    }
    let next_reset_time = if capped {
        add_seconds(now, params.period)?
    } else {
        0
    };
    Ok(Fee {
        pct: params.pct,
        cap: params.cap,
        token: params.token,
        period: params.period,
        total_charged: Uint128::zero(),
        next_reset_time,
    })
}

/// Fee owed on `amount`, rounded down. Uncapped schedules charge the full
/// percentage. Capped ones track what was charged in the current period, in
/// the cap token, and only charge what is left of the cap; `price` converts
/// the operated token into the cap token.
pub fn apply(
    fee: &mut Fee,
    now: u64,
    amount: Uint128,
    price: impl FnOnce() -> Result<Decimal, SmartVaultsError>,
) -> Result<Uint128, SmartVaultsError> {
    let fee_amount = amount * fee.pct;
    if fee.token.is_empty() || fee.cap.is_zero() || fee.period == 0 || fee_amount.is_zero() {
        return Ok(fee_amount);
    }

    if now >= fee.next_reset_time {
        fee.total_charged = Uint128::zero();
        fee.next_reset_time = add_seconds(now, fee.period)?;
    }

    let price = price()?;
    let fee_in_cap_token = mul_rate(fee_amount, price)?;
    let total = fee
        .total_charged
        .checked_add(fee_in_cap_token)
        .map_err(StdError::from)?;
    if total <= fee.cap {
        fee.total_charged = total;
        Ok(fee_amount)
    } else if fee.total_charged < fee.cap {
        let remaining = fee.cap - fee.total_charged;
        fee.total_charged = fee.cap;
        Ok(remaining.multiply_ratio(Decimal::one().atomics(), price.atomics()))
    } else {
        // cap already exhausted, e.g. after lowering it mid-period
        Ok(Uint128::zero())
    }
}

/// Charges the schedule stored in `item` on `amount` of `token` and returns the
/// fee together with the transfer to the fee collector, if any.
pub fn pay_fee(
    deps: DepsMut,
    env: &Env,
    item: &Item<Fee>,
    fee_collector: &Addr,
    token: &str,
    amount: Uint128,
) -> Result<(Uint128, Option<CosmosMsg>), SmartVaultsError> {
    let mut fee = item.may_load(deps.storage)?.unwrap_or_default();
    let cap_token = fee.token.clone();
    let charged = apply(&mut fee, env.block.time.seconds(), amount, || {
        get_price(deps.as_ref(), token, &cap_token)
    })?;
    item.save(deps.storage, &fee)?;

    let msg = (!charged.is_zero()).then(|| {
        BankMsg::Send {
            to_address: fee_collector.to_string(),
            amount: coins(charged.u128(), token),
        }
        .into()
    });
    Ok((charged, msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capped(pct: u64, cap: u128, period: u64) -> Fee {
        validate(
            FeeParams {
                pct: Decimal::percent(pct),
                cap: Uint128::new(cap),
                token: "usdc".into(),
                period,
            },
            0,
        )
        .unwrap()
    }

    fn at_price(rate: u64) -> impl FnOnce() -> Result<Decimal, SmartVaultsError> {
        move || Ok(Decimal::from_ratio(rate, 1u64))
    }

    #[test]
    fn rejects_invalid_schedules() {
        let err = validate(
            FeeParams {
                pct: Decimal::percent(101),
                cap: Uint128::zero(),
                token: String::new(),
                period: 0,
            },
            0,
        )
        .unwrap_err();
        assert_eq!(err, SmartVaultsError::InvalidFeePct);

        let err = validate(
            FeeParams {
                pct: Decimal::percent(1),
                cap: Uint128::new(10),
                token: String::new(),
                period: 10,
            },
            0,
        )
        .unwrap_err();
        assert_eq!(err, SmartVaultsError::InvalidInput);

        // a period reaching past the end of time
        let err = validate(
            FeeParams {
                pct: Decimal::percent(1),
                cap: Uint128::new(10),
                token: "usdc".into(),
                period: u64::MAX,
            },
            1,
        )
        .unwrap_err();
        assert!(matches!(err, SmartVaultsError::Std(StdError::Overflow { .. })));
    }

    #[test]
    fn uncapped_fee_charges_percentage() {
        let mut fee = Fee {
            pct: Decimal::percent(2),
            ..Fee::default()
        };
        let charged = apply(&mut fee, 0, Uint128::new(1_000), || unreachable!()).unwrap();
        assert_eq!(charged, Uint128::new(20));

        let mut none = Fee::default();
        let charged = apply(&mut none, 0, Uint128::new(1_000), || unreachable!()).unwrap();
        assert_eq!(charged, Uint128::zero());
    }

    #[test]
    fn cap_bounds_fees_within_a_period() {
        // 10% fee capped at 300 usdc per 100 seconds, token priced at 2 usdc
        let mut fee = capped(10, 300, 100);

        let charged = apply(&mut fee, 10, Uint128::new(1_000), at_price(2)).unwrap();
        assert_eq!(charged, Uint128::new(100));
        assert_eq!(fee.total_charged, Uint128::new(200));

        // only 100 usdc of headroom left: 50 tokens
        let charged = apply(&mut fee, 20, Uint128::new(1_000), at_price(2)).unwrap();
        assert_eq!(charged, Uint128::new(50));
        assert_eq!(fee.total_charged, Uint128::new(300));

        let charged = apply(&mut fee, 30, Uint128::new(1_000), at_price(2)).unwrap();
        assert_eq!(charged, Uint128::zero());
    }

    #[test]
    fn cap_resets_once_the_period_elapses() {
        let mut fee = capped(10, 300, 100);
        apply(&mut fee, 10, Uint128::new(5_000), at_price(1)).unwrap();
        assert_eq!(fee.total_charged, Uint128::new(300));

        let charged = apply(&mut fee, 100, Uint128::new(1_000), at_price(1)).unwrap();
        assert_eq!(charged, Uint128::new(100));
        assert_eq!(fee.total_charged, Uint128::new(100));
        assert_eq!(fee.next_reset_time, 200);
    }
}
