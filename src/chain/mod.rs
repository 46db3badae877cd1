pub mod calls;
pub mod client;
pub mod error;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use client::{AlloyChainClient, ChainClient, ClientSettings};
pub use error::ChainError;
pub use types::{Confirmation, Payload, TokenSpec, UnitKind};
