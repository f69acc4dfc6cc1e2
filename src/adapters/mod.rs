//! Adapters: ready-made implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                      |
//! |-------------|---------------|----------------------------------|
//! | `dry_run`   | ActuatorPort  | In-memory command ledger         |
//! | `log_sink`  | EventSink     | The `log` facade                 |
//!
//! Real device drivers live with the actuator collaborator; these two
//! cover replays, previews and headless runs.

pub mod dry_run;
pub mod log_sink;
