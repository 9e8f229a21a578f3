//! rollcall Engine Library
//!
//! This crate derives display statuses and matches versions against task
//! filters, reading persisted state through the [`Store`] interface.

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod state;
pub mod store;

pub use config::{EngineConfig, Limit};
pub use display::{ChildStatus, DisplayStatusReport};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, StoreError};
pub use state::{MemoryStore, Snapshot};
pub use store::Store;
