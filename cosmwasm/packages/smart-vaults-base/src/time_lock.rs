use cosmwasm_schema::cw_serde;
use cosmwasm_std::{StdResult, Storage};
use cw_storage_plus::Item;

use crate::error::SmartVaultsError;
use crate::math::add_seconds;

#[cw_serde]
#[derive(Default)]
pub struct TimeLockState {
    /// Seconds between two executions.
    pub period: u64,
    /// Earliest block time of the next execution. `None` until the lock is
    /// first armed; an unarmed lock never blocks.
    pub next_reset_time: Option<u64>,
}

pub struct TimeLock<'a>(Item<'a, TimeLockState>);

impl<'a> TimeLock<'a> {
    pub const fn new(storage_key: &'a str) -> Self {
        TimeLock(Item::new(storage_key))
    }

    pub fn load(&self, storage: &dyn Storage) -> StdResult<TimeLockState> {
        Ok(self.0.may_load(storage)?.unwrap_or_default())
    }

    /// First configuration: a non-zero period arms the lock one period from now.
    pub fn initialize(
        &self,
        storage: &mut dyn Storage,
        period: u64,
        now: u64,
    ) -> StdResult<TimeLockState> {
        let next_reset_time = if period > 0 {
            Some(add_seconds(now, period)?)
        } else {
            None
        };
        let state = TimeLockState {
            period,
            next_reset_time,
        };
        self.0.save(storage, &state)?;
        Ok(state)
    }

    /// Changes the period and keeps the current schedule.
    pub fn set_period(&self, storage: &mut dyn Storage, period: u64) -> StdResult<TimeLockState> {
        let mut state = self.load(storage)?;
        state.period = period;
        self.0.save(storage, &state)?;
        Ok(state)
    }

    /// Fails while the lock has not expired; otherwise re-arms it on a fixed
    /// cadence, one period after the previous reset time.
    pub fn check_and_consume(
        &self,
        storage: &mut dyn Storage,
        now: u64,
    ) -> Result<TimeLockState, SmartVaultsError> {
        let mut state = self.load(storage)?;
        let next_reset_time = match state.next_reset_time {
            Some(next) if now < next => return Err(SmartVaultsError::TimeLockNotExpired),
            Some(next) => add_seconds(next, state.period)?,
            None => add_seconds(now, state.period)?,
        };
        state.next_reset_time = Some(next_reset_time);
        self.0.save(storage, &state)?;
        Ok(state)
    }
}
