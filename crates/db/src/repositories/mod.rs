//! Repositories wrapping entity queries.

mod account;
mod booking;
mod combo;
mod notification;
mod order_combo;
mod post;
mod post_bookmark;
mod post_comment;
mod post_like;
mod review;
mod schedule;
mod tutor_request;

pub use account::AccountRepository;
pub use booking::BookingRepository;
pub use combo::ComboRepository;
pub use notification::NotificationRepository;
pub use order_combo::OrderComboRepository;
pub use post::PostRepository;
pub use post_bookmark::PostBookmarkRepository;
pub use post_comment::PostCommentRepository;
pub use post_like::PostLikeRepository;
pub use review::ReviewRepository;
pub use schedule::ScheduleRepository;
pub use tutor_request::TutorRequestRepository;
