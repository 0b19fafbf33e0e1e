//! Startup profit estimator.
//!
//! A small web application: users register and sign in, submit a startup's
//! expenses and state, and get back a profit estimate from a linear regression
//! model along with bar and pie charts of the expense split.

pub mod auth;
pub mod charts;
pub mod config;
pub mod handlers;
pub mod interfaces;
pub mod prediction;
pub mod storage;
pub mod utils;
