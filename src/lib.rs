//! AquaCore: decision core of the aquarium dashboard.
//!
//! Two engines, both pure computation over caller-supplied state:
//!
//! - [`rules`]: automation rules with hysteresis-gated, fail-safe-on
//!   actuator control and deterministic replay over history.
//! - [`species`]: merging per-species safe ranges into one tank profile,
//!   with conflicts, compromise recommendations and severity tiers.
//!
//! [`app`] composes them behind port traits for the surrounding
//! application.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod interval;
pub mod rules;
pub mod snapshot;
pub mod species;

pub use error::{Error, Result};
