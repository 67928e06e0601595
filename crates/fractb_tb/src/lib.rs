//! Hardware-in-the-loop verification of escape-time cores.
//!
//! The testbench drives a [`Dut`](fractb_dut::Dut) one point at a time
//! through its reset/start/done handshake, compares each reported iteration
//! count with the floating-point reference, and summarizes the sweep:
//!
//! - [`stimulus`]: Q8.24 encoding of the words driven onto the core.
//! - [`driver`]: one computation per invocation, bounded by a toggle budget.
//! - [`sweep`]: grid enumeration, comparison, and statistics.
//! - [`sink`]: per-sample outputs, including the `x,y,iter` CSV frame.
//! - [`trace`]: VCD waveforms of driver activity.
//! - [`report`]: the end-of-sweep summary.

#![warn(missing_docs)]

pub mod driver;
pub mod error;
pub mod report;
pub mod sink;
pub mod stimulus;
pub mod sweep;
pub mod trace;

pub use driver::{DriverConfig, DutDriver, Phase, RunOutcome, DEFAULT_MAX_CYCLES};
pub use error::TbError;
pub use report::Report;
pub use sink::{CollectSink, CsvSink, FnSink, NullSink, SampleSink};
pub use stimulus::{FixedCoordinate, StimulusFrame};
pub use sweep::{classify, validate, verify_coordinate, RunStatistics, Sample, SweepRunner};
pub use trace::{MemoryTrace, TraceSink, VcdTrace};
