//! API Module
//!
//! HTTP handlers and routing for the user service REST API.
//!
//! # Endpoints
//! - `GET /users` - List a page of users
//! - `POST /users` - Create a user
//! - `GET /users/:id` - Retrieve a user by id
//! - `PUT /users/:id` - Update a user
//! - `DELETE /users/:id` - Delete a user
//! - `GET /emails/:email` - Retrieve a user by email
//! - `GET /emails/:email/unique` - Check whether an email is free
//! - `GET /count` - Count users
//! - `GET /stats` - Get cache statistics
//! - `DELETE /cache` - Clear the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
