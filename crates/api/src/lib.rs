//! HTTP API layer for tutorhub.
//!
//! - **Endpoints**: JSON REST resources under `/auth`, `/admin`, `/bookings`, ...
//! - **Extractors**: bearer-token identity
//! - **Middleware**: token verification, shared application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;

/// The API router with token authentication applied and state attached.
pub fn app(state: AppState) -> Router {
    router()
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .with_state(state)
}
