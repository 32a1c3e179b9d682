//! Test utilities for fncache integration tests
//!
//! `TestFixture` owns a catalog in a temporary directory and can reopen it,
//! so tests can check what survives a restart.

#![allow(dead_code)]

pub mod test_fixture;
