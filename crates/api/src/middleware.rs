//! API middleware and shared state.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;
use tutorhub_common::Config;
use tutorhub_core::{
    AccountService, AdminStatsService, BookingService, ComboService, EmailService,
    NotificationService, OrderComboService, PostService, ReviewService, ScheduleService,
    TokenService, TutorRequestService,
};
use tutorhub_db::repositories::{
    AccountRepository, BookingRepository, ComboRepository, NotificationRepository,
    OrderComboRepository, PostBookmarkRepository, PostCommentRepository, PostLikeRepository,
    PostRepository, ReviewRepository, ScheduleRepository, TutorRequestRepository,
};

use crate::extractors::AuthUser;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Access token signing and verification.
    pub tokens: TokenService,
    /// Registration, login and profiles.
    pub account_service: AccountService,
    /// Tutor upgrade requests.
    pub tutor_request_service: TutorRequestService,
    /// Combo catalog.
    pub combo_service: ComboService,
    /// Combo purchases.
    pub order_combo_service: OrderComboService,
    /// Tutor availability.
    pub schedule_service: ScheduleService,
    /// Lesson bookings.
    pub booking_service: BookingService,
    /// Tutor reviews.
    pub review_service: ReviewService,
    /// Posts feed.
    pub post_service: PostService,
    /// In-app notifications.
    pub notification_service: NotificationService,
    /// Admin dashboard counters.
    pub stats_service: AdminStatsService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let account_repo = AccountRepository::new(Arc::clone(&db));
        let tutor_request_repo = TutorRequestRepository::new(Arc::clone(&db));
        let combo_repo = ComboRepository::new(Arc::clone(&db));
        let order_repo = OrderComboRepository::new(Arc::clone(&db));
        let schedule_repo = ScheduleRepository::new(Arc::clone(&db));
        let booking_repo = BookingRepository::new(Arc::clone(&db));
        let review_repo = ReviewRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let notification_repo = NotificationRepository::new(Arc::clone(&db));

        let tokens = TokenService::new(&config.auth);
        let notification_service = NotificationService::new(notification_repo);
        let email_service = EmailService::new(config.email.clone());

        Self {
            account_service: AccountService::new(account_repo.clone(), tokens.clone()),
            tutor_request_service: TutorRequestService::new(
                tutor_request_repo.clone(),
                account_repo.clone(),
                notification_service.clone(),
                email_service,
            ),
            combo_service: ComboService::new(combo_repo.clone()),
            order_combo_service: OrderComboService::new(
                order_repo.clone(),
                combo_repo,
                account_repo.clone(),
                notification_service.clone(),
                config.orders.auto_approve_max_slots,
            ),
            schedule_service: ScheduleService::new(schedule_repo.clone(), account_repo.clone()),
            booking_service: BookingService::new(
                booking_repo.clone(),
                schedule_repo,
                account_repo.clone(),
                notification_service.clone(),
            ),
            review_service: ReviewService::new(
                review_repo,
                account_repo.clone(),
                notification_service.clone(),
            ),
            post_service: PostService::new(
                post_repo.clone(),
                PostLikeRepository::new(Arc::clone(&db)),
                PostCommentRepository::new(Arc::clone(&db)),
                PostBookmarkRepository::new(Arc::clone(&db)),
                notification_service.clone(),
            ),
            stats_service: AdminStatsService::new(
                account_repo,
                tutor_request_repo,
                order_repo,
                booking_repo,
                post_repo,
            ),
            notification_service,
            tokens,
        }
    }
}

/// Authentication middleware.
///
/// A valid bearer token puts the caller's [`AuthUser`] into the request
/// extensions. Missing or invalid tokens pass through; handlers that need
/// an identity reject via the extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(header) = req.headers().get(AUTHORIZATION)
        && let Ok(value) = header.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        match state.tokens.verify(token.trim()) {
            Ok(claims) => {
                req.extensions_mut().insert(AuthUser {
                    id: claims.sub,
                    role: claims.role,
                });
            }
            Err(_) => tracing::debug!("Ignoring invalid bearer token"),
        }
    }

    next.run(req).await
}
