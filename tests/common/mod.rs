//! Common test utilities and helpers
//!
//! Recording stubs for the outbound traits plus small filesystem helpers
//! shared by the integration tests.

#![allow(dead_code)]

pub mod mock_services;
pub mod test_helpers;
