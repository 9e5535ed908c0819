//! Session registry, storage and reconciliation for remote sessions.
//!
//! Provides:
//! - `SessionRegistry` - Ordered name → host bookkeeping, most recently used first
//! - `ReconciliationEngine` - Drive intents against remote hosts
//! - Storage implementations (memory, JSON file)

pub mod engine;
pub mod error;
pub mod registry;
pub mod report;
pub mod storage;

pub use engine::ReconciliationEngine;
pub use error::{EngineError, InvalidInput};
pub use registry::SessionRegistry;
pub use report::{ActionReport, HostRefresh, RefreshResult};
