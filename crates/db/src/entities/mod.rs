//! Database entities.

#![allow(missing_docs)]

pub mod account;
pub mod booking;
pub mod combo;
pub mod notification;
pub mod order_combo;
pub mod post;
pub mod post_bookmark;
pub mod post_comment;
pub mod post_like;
pub mod review;
pub mod schedule;
pub mod tutor_certificate;
pub mod tutor_evidence;
pub mod tutor_request;

pub use account::Entity as Account;
pub use booking::Entity as Booking;
pub use combo::Entity as Combo;
pub use notification::Entity as Notification;
pub use order_combo::Entity as OrderCombo;
pub use post::Entity as Post;
pub use post_bookmark::Entity as PostBookmark;
pub use post_comment::Entity as PostComment;
pub use post_like::Entity as PostLike;
pub use review::Entity as Review;
pub use schedule::Entity as Schedule;
pub use tutor_certificate::Entity as TutorCertificate;
pub use tutor_evidence::Entity as TutorEvidence;
pub use tutor_request::Entity as TutorRequest;
