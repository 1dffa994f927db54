//! API endpoints.

mod admin;
mod auth;
mod bookings;
mod combos;
mod notifications;
mod order_combo;
mod posts;
mod reviews;
mod schedule;

use axum::Router;

use crate::middleware::AppState;

/// Largest page any list endpoint returns.
pub const MAX_LIMIT: u64 = 100;

const fn default_limit() -> u64 {
    20
}

/// Clamp a requested page size to `1..=MAX_LIMIT`.
#[must_use]
pub const fn clamp_limit(limit: u64) -> u64 {
    if limit == 0 {
        1
    } else if limit > MAX_LIMIT {
        MAX_LIMIT
    } else {
        limit
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/bookings", bookings::router())
        .nest("/schedule", schedule::router())
        .nest("/combos", combos::router())
        .nest("/order-combo", order_combo::router())
        .nest("/posts", posts::router())
        .nest("/reviews", reviews::router())
        .nest("/notifications", notifications::router())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(25), 25);
        assert_eq!(clamp_limit(10_000), MAX_LIMIT);
    }
}
