//! End-to-end test suite for NANDA reputation scoring.
//!
//! Integration tests live in `tests/` and drive the scorer, stores, service
//! and HTTP router together. [`helpers`] holds shared fixtures.

pub mod helpers;
