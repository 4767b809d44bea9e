//! Database-backed request tests for the content API and dashboard.
//!
//! Requires a running PostgreSQL database and `DATABASE_URL`
//! (docker compose -f docker/docker-compose.dev.yml up -d). Tests skip
//! themselves when `DATABASE_URL` is unset.
//!
//! Run with: cargo test --test db_e2e

mod test_helpers;

mod test_articles;
mod test_refresh_tokens;
mod test_site;
mod test_staff;
mod test_tags;
mod test_users;
