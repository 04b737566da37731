//! Public runtime API surface.
//!
//! Consumers drive games through [`GameService`] and read players through
//! [`PlayerLedger`]; every failure surfaces as a [`RuntimeError`].

mod errors;
mod ledger;
mod service;

pub use errors::{Result, RuntimeError};
pub use ledger::PlayerLedger;
pub use service::GameService;
