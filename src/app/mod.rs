//! Application core: composition of both engines, zero I/O.
//!
//! One [`TankService`](service::TankService) per tank owns a rule engine
//! and a species selection over a shared catalog.  All interaction with
//! hardware and the UI happens through the **port traits** defined in
//! [`ports`], keeping this layer testable without real devices.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
