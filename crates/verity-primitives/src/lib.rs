//! Core types, intents and resolvers of the Verity verification engine
//!
//! Everything in this crate is pure: chain access and persistence live in `verity-server`.

pub mod abi;
pub mod codec;
pub mod error;
pub mod intents;
pub mod resolution;
pub mod signature;
pub mod status;
pub mod transaction;

pub use error::{PrimitivesError, Result};
pub use status::{AddressMatch, Status};
