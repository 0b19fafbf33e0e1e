//! Shared storage integration tests.
//!
//! Tests the UserStore interface against every implementation.
//! Each implementation module imports these test functions and runs them.

pub mod user_store_tests;
