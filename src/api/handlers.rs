//! API Handlers
//!
//! HTTP request handlers for each user service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    ClearResponse, CountResponse, CreateUserRequest, CreatedResponse, DeleteResponse,
    HealthResponse, ListQuery, PageResponse, StatsResponse, UniqueResponse, UpdateUserRequest,
    User,
};
use crate::service::UserService;
use crate::store::{InMemoryUserStore, UserStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User service with its read-through cache
    pub service: UserService,
}

impl AppState {
    /// Creates a new AppState around the given service.
    pub fn new(service: UserService) -> Self {
        Self { service }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Backs the service with an empty in-memory store.
    pub fn from_config(config: &crate::config::Config) -> Self {
        let store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
        Self::new(UserService::new(store, config.ttl_policy()))
    }
}

/// Handler for GET /users?page=&page_size=
pub async fn list_users_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse>> {
    let users = state.service.list_users(query.page, query.page_size).await?;

    Ok(Json(PageResponse {
        page: query.page,
        page_size: query.page_size,
        users,
    }))
}

/// Handler for POST /users
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<CreatedResponse>> {
    let id = state.service.create_user(req).await?;

    Ok(Json(CreatedResponse::new(id)))
}

/// Handler for GET /users/:id
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>> {
    Ok(Json(state.service.get_user(id).await?))
}

/// Handler for PUT /users/:id
pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    Ok(Json(state.service.update_user(id, req).await?))
}

/// Handler for DELETE /users/:id
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    state.service.delete_user(id).await?;

    Ok(Json(DeleteResponse::new(id)))
}

/// Handler for GET /emails/:email
pub async fn get_user_by_email_handler(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.service.get_user_by_email(&email).await?))
}

/// Handler for GET /emails/:email/unique
pub async fn email_unique_handler(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UniqueResponse>> {
    let unique = state.service.is_email_unique(&email).await?;

    Ok(Json(UniqueResponse { email, unique }))
}

/// Handler for GET /count
pub async fn count_handler(State(state): State<AppState>) -> Result<Json<CountResponse>> {
    let count = state.service.count_users().await?;

    Ok(Json(CountResponse { count }))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.service.cache_stats().await.into())
}

/// Handler for DELETE /cache
///
/// Drops every cached entry. Diagnostic only.
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.service.clear_cache().await;

    Json(ClearResponse::cleared())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
