//! Capability names. Each one guards the execute message of the same name.

pub const AUTHORIZE: &str = "authorize";
pub const UNAUTHORIZE: &str = "unauthorize";

// wallet
pub const COLLECT: &str = "collect";
pub const WITHDRAW: &str = "withdraw";
pub const REIMBURSE: &str = "reimburse";
pub const WRAP: &str = "wrap";
pub const UNWRAP: &str = "unwrap";
pub const CLAIM: &str = "claim";
pub const JOIN: &str = "join";
pub const EXIT: &str = "exit";
pub const SWAP: &str = "swap";
pub const CALL: &str = "call";
pub const SET_STRATEGY: &str = "setStrategy";
pub const SET_PRICE_FEED: &str = "setPriceFeed";
pub const SET_PRICE_FEEDS: &str = "setPriceFeeds";
pub const SET_PRICE_ORACLE: &str = "setPriceOracle";
pub const SET_SWAP_CONNECTOR: &str = "setSwapConnector";
pub const SET_FEE_COLLECTOR: &str = "setFeeCollector";
pub const SET_SWAP_FEE: &str = "setSwapFee";
pub const SET_PERFORMANCE_FEE: &str = "setPerformanceFee";
pub const SET_WITHDRAW_FEE: &str = "setWithdrawFee";

// smart vault
pub const SET_WALLET: &str = "setWallet";
pub const SET_ACTION: &str = "setAction";

// registry
pub const REGISTER: &str = "register";
pub const DEPRECATE: &str = "deprecate";

// actions
pub const SET_LIMITS: &str = "setLimits";
pub const SET_RELAYER: &str = "setRelayer";
pub const SET_THRESHOLD: &str = "setThreshold";
pub const SET_TIME_LOCK: &str = "setTimeLock";
pub const SET_RECIPIENT: &str = "setRecipient";
pub const SET_TOKEN: &str = "setToken";
pub const SET_SWAP_SIGNER: &str = "setSwapSigner";
pub const SET_FEE_CLAIMER: &str = "setFeeClaimer";

/// Capabilities the wallet owner receives at deployment.
pub const WALLET_OWNER: &[&str] = &[
    AUTHORIZE,
    UNAUTHORIZE,
    COLLECT,
    WITHDRAW,
    WRAP,
    UNWRAP,
    CLAIM,
    JOIN,
    EXIT,
    SWAP,
    CALL,
    SET_STRATEGY,
    SET_PRICE_FEED,
    SET_PRICE_FEEDS,
    SET_PRICE_ORACLE,
    SET_SWAP_CONNECTOR,
    SET_SWAP_FEE,
    SET_PERFORMANCE_FEE,
    SET_WITHDRAW_FEE,
];
