use cosmwasm_std::StdError;
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SmartVaultsError {
    #[error("{0}")]
    Std(#[from] StdError),
    #[error("{0}")]
    Payment(#[from] PaymentError),
    #[error("Sender is not allowed to perform this operation")]
    PermissionDenied,
    #[error("Sender is not a whitelisted relayer")]
    RelayerNotAllowed,
    #[error("Gas price exceeds the configured limit")]
    GasPriceLimitExceeded,
    #[error("Time-lock has not expired yet")]
    TimeLockNotExpired,
    #[error("Value does not reach the configured minimum threshold")]
    MinThresholdNotMet,
    #[error("No price feed configured for the requested pair")]
    PriceFeedNotSet,
    #[error("Price oracle is not set")]
    PriceOracleNotSet,
    #[error("Swap connector is not set")]
    SwapConnectorNotSet,
    #[error("Swap quote signature is invalid")]
    InvalidSignature,
    #[error("Swap quote deadline has expired")]
    DeadlineExpired,
    #[error("Swap output is below the minimum amount out")]
    MinAmountOutNotMet,
    #[error("Strategy is not allowed")]
    StrategyNotAllowed,
    #[error("Token is not supported by this action")]
    InvalidToken,
    #[error("Fee percentage must not exceed one")]
    InvalidFeePct,
    #[error("Input parameters are invalid")]
    InvalidInput,
    #[error("Nothing to operate on: balance is zero")]
    ZeroBalance,
    #[error("Unknown reply id {0}")]
    UnknownReply(u64),
}
