//! In-memory repository implementations for local hosting and tests.

mod sessions;

pub use sessions::InMemoryGameRepository;
