//! Storage implementations.

pub mod json;
#[cfg(feature = "memory")]
pub mod memory;

pub use json::JsonFileStore;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
