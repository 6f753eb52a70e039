//! Integration tests for both harvest stages
//!
//! These tests use wiremock to stand in for the catalog and temp directories
//! for the checkpoint and record files.

mod discovery_tests;
mod extraction_tests;
