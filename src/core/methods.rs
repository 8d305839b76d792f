//! Method and error-code constants for the wallet transport protocol
//!
//! Centralized registry for every RPC method the session manager issues and
//! every EIP-1193 error code it interprets.

/// Wallet RPC methods
pub mod rpc {
    /// Prompt the user to authorize accounts
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    /// Read already-authorized accounts (never prompts)
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    pub const PERSONAL_SIGN: &str = "personal_sign";

    pub const ALL: &[&str] = &[REQUEST_ACCOUNTS, ACCOUNTS, CHAIN_ID, SWITCH_CHAIN, ADD_CHAIN, PERSONAL_SIGN];
}

/// EIP-1193 provider error codes
pub mod codes {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const CHAIN_DISCONNECTED: i64 = 4901;
    /// Target chain has not been added to the wallet
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// A prompt for the same method is already open
    pub const REQUEST_PENDING: i64 = -32002;
    pub const INTERNAL: i64 = -32603;
}

/// Environment variables read by `SessionConfig::from_env`
pub mod env {
    pub const MAINNET_ID: &str = "LAUNCHPAD_MAINNET_ID";
    pub const TESTNET_ID: &str = "LAUNCHPAD_TESTNET_ID";
    pub const OVERLAP: &str = "LAUNCHPAD_OVERLAP";
    pub const TIMEOUT_MS: &str = "LAUNCHPAD_TIMEOUT_MS";
    pub const LOG_JSON: &str = "LAUNCHPAD_LOG_JSON";
}
