//! User Cache - user lookup service with an epoch-invalidated read-through cache
//!
//! Lookups by id, email, page, count and email uniqueness are served from
//! memory with per-query TTLs. Every committed mutation advances the cache
//! epoch, invalidating all cached views at once.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::{TtlPolicy, UserService};
pub use tasks::spawn_sweep_task;
