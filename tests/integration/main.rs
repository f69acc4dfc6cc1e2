//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one engine through the
//! public API, with mock ports standing in for relays and the UI.

mod mock_hw;
mod reconciliation_tests;
mod rule_engine_tests;
