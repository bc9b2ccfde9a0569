//! Shared test utilities for docpolish integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring a `DocumentService` to a scripted backend
//! - Helpers for waiting on jobs to reach a terminal state

pub mod harness;

pub use harness::TestHarness;
