//! Error types for device-under-test access.

/// Errors raised by a [`Dut`](crate::Dut) backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DutError {
    /// The named signal does not exist on this device.
    #[error("unknown signal '{name}'")]
    UnknownSignal {
        /// The signal name that was requested.
        name: String,
    },

    /// An attempt was made to drive an output signal.
    #[error("signal '{name}' is an output and cannot be driven")]
    NotAnInput {
        /// The output signal name.
        name: String,
    },

    /// The simulation backend failed to evaluate a step.
    #[error("simulation backend error: {reason}")]
    Backend {
        /// Description of the backend failure.
        reason: String,
    },
}
