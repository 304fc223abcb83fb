//! Integration tests for the Sprout API.
//!
//! These tests verify the complete flow of ingesting, querying and deleting
//! measurements through the HTTP API, including the outbox fallback during
//! a bus outage and the cascade reaction to fleet deletion events.

mod common;

mod batch_tests;
mod cascade_tests;
mod health_tests;
mod measurements_tests;
mod outbox_tests;
mod query_tests;
