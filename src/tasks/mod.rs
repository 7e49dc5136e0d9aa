//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Sweep: Reclaims cache entries invalidated by epoch advance or TTL expiry

mod sweep;

pub use sweep::spawn_sweep_task;
