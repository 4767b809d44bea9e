//! HTTP-level tests for routes that do not touch the database.
//!
//! Run with: cargo test --test integration

mod common;

mod auth_tests;
mod health_tests;
mod site_tests;
mod websocket_tests;
