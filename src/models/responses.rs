//! Response DTOs for the user API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use uuid::Uuid;

use crate::cache::CacheStats;
use crate::models::User;

/// Response body for user creation (POST /users)
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    /// Success message
    pub message: String,
    /// Id assigned to the new user
    pub id: Uuid,
}

impl CreatedResponse {
    /// Creates a new CreatedResponse
    pub fn new(id: Uuid) -> Self {
        Self {
            message: format!("User '{}' created successfully", id),
            id,
        }
    }
}

/// Response body for user deletion (DELETE /users/:id)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The id that was deleted
    pub id: Uuid,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(id: Uuid) -> Self {
        Self {
            message: format!("User '{}' deleted successfully", id),
            id,
        }
    }
}

/// Response body for a listing (GET /users)
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    pub page: u32,
    pub page_size: u32,
    pub users: Vec<User>,
}

/// Response body for the user count (GET /count)
#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Response body for the uniqueness check (GET /emails/:email/unique)
#[derive(Debug, Clone, Serialize)]
pub struct UniqueResponse {
    pub email: String,
    pub unique: bool,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of store loads
    pub loads: u64,
    /// Number of failed store loads
    pub load_failures: u64,
    /// Misses served by joining an in-flight load
    pub coalesced: u64,
    /// Number of bulk invalidations
    pub invalidations: u64,
    /// Current epoch
    pub epoch: u64,
    /// Resident entries, valid or not
    pub total_entries: usize,
    /// Resident entries still valid
    pub valid_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            loads: stats.loads,
            load_failures: stats.load_failures,
            coalesced: stats.coalesced,
            invalidations: stats.invalidations,
            epoch: stats.epoch,
            total_entries: stats.total_entries,
            valid_entries: stats.valid_entries,
        }
    }
}

/// Response body for clearing the cache (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared".to_string(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
