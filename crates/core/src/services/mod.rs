//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod booking;
pub mod combo;
pub mod email;
pub mod notification;
pub mod order_combo;
pub mod post;
pub mod review;
pub mod schedule;
pub mod stats;
pub mod token;
pub mod tutor_request;

pub use account::{AccountService, AuthSession, LoginInput, RegisterInput, UpdateProfileInput};
pub use booking::{BookingService, CreateBookingInput};
pub use combo::{ComboService, CreateComboInput};
pub use email::{EmailMessage, EmailService};
pub use notification::{Notice, NotificationService};
pub use order_combo::OrderComboService;
pub use post::{BookmarkState, CommentInput, CreatePostInput, LikeState, PostService};
pub use review::{CreateReviewInput, ReviewService, TutorReviews};
pub use schedule::{CreateScheduleInput, ScheduleService};
pub use stats::{AdminStats, AdminStatsService};
pub use token::{Claims, TokenService};
pub use tutor_request::{
    CertificateInput, EvidenceInput, SubmitTutorRequestInput, TutorRequestDetail,
    TutorRequestService,
};
