//! Shared utilities

pub mod error;

pub use error::{BoothError, BoothResult, UserNotice};
