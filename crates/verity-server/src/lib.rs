//! Storage, chain access and per-kind services of the Verity verification engine

pub mod chain;
pub mod config;
pub mod error;
pub mod postgres;
pub mod services;
pub mod state;
pub mod store;
