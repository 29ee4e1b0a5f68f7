//! Solidity bindings for the contracts intents are verified against.

pub mod disperse;
pub mod erc20;
pub mod lock;
