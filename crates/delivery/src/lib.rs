//! Where accepted submissions go: storage and administrator notification.

pub mod config;
pub mod notification;
pub mod repository;

pub use config::*;
pub use notification::*;
pub use repository::*;
