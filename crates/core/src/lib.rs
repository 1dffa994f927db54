//! Core business logic for tutorhub.

pub mod services;

pub use services::*;
