//! Device-under-test access for the fractb testbench.
//!
//! The harness never owns a simulator. It talks to whatever evaluates the
//! escape-time core through the [`Dut`] trait: drive a signal by name,
//! evaluate one step, sample a signal by name. This crate defines that seam,
//! the core's port contract ([`PinMap`]), and two in-process devices:
//!
//! - [`EscapeCore`]: a cycle-level behavioral model of the core in Q8.24.
//! - [`ScriptedDut`]: a closure-driven stand-in with a fixed latency.

#![warn(missing_docs)]

pub mod dut;
pub mod error;
pub mod model;
pub mod pins;
pub mod scripted;

pub use dut::{CoreInputs, Dut};
pub use error::DutError;
pub use model::EscapeCore;
pub use pins::{CoreKind, Direction, Pin, PinMap};
pub use scripted::{ProtocolCounters, Responder, ScriptedDut};
