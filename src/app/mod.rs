//! Application core: pure domain logic, zero I/O.
//!
//! Routing of inbound telegrams, the per-cycle composition of the node and
//! the events it reports.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod service;
