//! Shared helpers for the HTTP-level tests.

pub mod fixtures;
pub mod mocks;
pub mod setup;
