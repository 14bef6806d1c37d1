//! API endpoint integration tests
//!
//! Exercise the composed router end to end against a real Postgres.
//! Tests needing the database are `#[ignore]`d; run them with
//! `cargo test -p relocrm-integration-tests -- --ignored` and `TEST_DATABASE_URL` set.

#![allow(dead_code)]

mod applicants;
mod auth;
mod common;
mod properties;
mod reminders;
mod shuls;
