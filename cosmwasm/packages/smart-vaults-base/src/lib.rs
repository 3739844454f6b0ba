//! Shared building blocks for the smart vaults contracts.
//!
//! Every contract in the workspace composes the gate components defined here
//! (authorizer, time-lock, token threshold, relayer gas accounting) and talks
//! to the wallet and its external collaborators through the message types in
//! [`wallet`] and [`interfaces`].

pub mod action;
pub mod auth;
pub mod capabilities;
pub mod error;
pub mod interfaces;
pub mod math;
pub mod relayed;
pub mod signature;
pub mod threshold;
pub mod time_lock;
pub mod wallet;

pub use auth::Authorizer;
pub use error::SmartVaultsError;
pub use relayed::{GasLimits, GasPayee, GasReport, RelayerGasAccounting, Reimbursement};
pub use threshold::{Threshold, TokenThreshold};
pub use time_lock::{TimeLock, TimeLockState};
