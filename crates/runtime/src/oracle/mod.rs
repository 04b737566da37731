//! In-memory collaborators for the rules engine.
//!
//! These implement the `terra-core` collaborator traits. The catalog is
//! immutable and shared by every game; each game gets its own board and deck,
//! which carry interior mutability because the engine reaches them through
//! shared references.
mod board;
mod catalog;
mod deck;

pub use board::{Hex, HexBoard};
pub use catalog::StaticCatalog;
pub use deck::SharedDeck;
