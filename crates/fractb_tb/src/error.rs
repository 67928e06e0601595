//! Error types for driving sweeps.
//!
//! Every failure that stops a sweep is a [`TbError`]. Per-point problems that
//! do not stop a sweep (timeouts, count mismatches) are not errors; they are
//! recorded in the samples and statistics instead.

use std::io;
use std::path::PathBuf;

use fractb_common::RangeError;
use fractb_dut::{CoreKind, DutError};

/// Errors that abort a driver invocation or a whole sweep.
#[derive(Debug, thiserror::Error)]
pub enum TbError {
    /// The device backend rejected a signal access or failed to step.
    #[error("device error: {0}")]
    Dut(#[from] DutError),

    /// A coordinate or constant cannot be encoded as Q8.24.
    #[error("stimulus out of range: {0}")]
    Range(#[from] RangeError),

    /// The sweep description is unusable.
    #[error("invalid sweep: {reason}")]
    InvalidSweep {
        /// Why the sweep was rejected.
        reason: String,
    },

    /// The pin map belongs to a different core variant than the sweep.
    #[error("pin map describes a {pins} core but the sweep verifies {family}")]
    PinKindMismatch {
        /// Variant the pin map was built for.
        pins: CoreKind,
        /// Variant the sweep's family needs.
        family: CoreKind,
    },

    /// An output file could not be created.
    #[error("failed to open output {}: {source}", path.display())]
    SinkOpen {
        /// The path that could not be opened.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Writing to an output sink failed.
    #[error("output write failed: {0}")]
    SinkIo(#[from] io::Error),

    /// The worker pool for a parallel sweep could not be built.
    #[error("failed to start worker pool: {reason}")]
    WorkerPool {
        /// Description of the pool failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dut_display() {
        let e = TbError::from(DutError::UnknownSignal {
            name: "x0_i".into(),
        });
        assert_eq!(e.to_string(), "device error: unknown signal 'x0_i'");
    }

    #[test]
    fn range_display() {
        let e = TbError::from(RangeError { value: 300.0 });
        assert!(e.to_string().starts_with("stimulus out of range: value 300"));
    }

    #[test]
    fn invalid_sweep_display() {
        let e = TbError::InvalidSweep {
            reason: "zero columns".into(),
        };
        assert_eq!(e.to_string(), "invalid sweep: zero columns");
    }

    #[test]
    fn pin_kind_mismatch_display() {
        let e = TbError::PinKindMismatch {
            pins: CoreKind::Mandelbrot,
            family: CoreKind::Julia,
        };
        assert_eq!(
            e.to_string(),
            "pin map describes a mandelbrot core but the sweep verifies julia"
        );
    }

    #[test]
    fn sink_open_display() {
        let e = TbError::SinkOpen {
            path: PathBuf::from("/no/such/dir/out.csv"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            e.to_string(),
            "failed to open output /no/such/dir/out.csv: not found"
        );
    }

    #[test]
    fn sink_io_display() {
        let e = TbError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(e.to_string(), "output write failed: pipe closed");
    }

    #[test]
    fn worker_pool_display() {
        let e = TbError::WorkerPool {
            reason: "no threads".into(),
        };
        assert_eq!(e.to_string(), "failed to start worker pool: no threads");
    }
}
