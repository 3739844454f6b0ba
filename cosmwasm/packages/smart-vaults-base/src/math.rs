use cosmwasm_std::{Decimal, OverflowError, OverflowOperation, StdError, StdResult, Uint128};

/// `amount * rate`, rounded down.
pub fn mul_rate(amount: Uint128, rate: Decimal) -> StdResult<Uint128> {
    amount
        .checked_multiply_ratio(rate.atomics(), Decimal::one().atomics())
        .map_err(|_| StdError::overflow(OverflowError::new(OverflowOperation::Mul, amount, rate)))
}

/// Block time `secs` seconds after `time`.
pub fn add_seconds(time: u64, secs: u64) -> StdResult<u64> {
    time.checked_add(secs)
        .ok_or_else(|| StdError::overflow(OverflowError::new(OverflowOperation::Add, time, secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_rate_rounds_down() {
        let rate = Decimal::from_ratio(1u128, 1300u128);
        assert_eq!(mul_rate(Uint128::new(1_000_000), rate).unwrap(), Uint128::new(769));
        assert_eq!(
            mul_rate(Uint128::new(600), Decimal::percent(250)).unwrap(),
            Uint128::new(1_500)
        );
    }

    #[test]
    fn overflow_is_an_error() {
        let err = mul_rate(Uint128::MAX, Decimal::percent(200)).unwrap_err();
        assert!(matches!(err, StdError::Overflow { .. }));

        let err = add_seconds(u64::MAX - 1, 2).unwrap_err();
        assert!(matches!(err, StdError::Overflow { .. }));
        assert_eq!(add_seconds(10, 5).unwrap(), 15);
    }
}
