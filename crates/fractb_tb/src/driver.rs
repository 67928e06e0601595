//! The reset/stimulus/run/read protocol for one core evaluation.
//!
//! [`DutDriver::run`] walks a device through a fixed sequence of phases:
//!
//! ```text
//! Idle → ResetAsserted → ResetReleased → StimulusLoaded → StartPulsed → Running → Done | TimedOut
//! ```
//!
//! A half-cycle is one clock toggle followed by one [`Dut::step`]. Reset and
//! start are each held for one full cycle (low half, high half). While
//! running, the driver toggles the clock until `done` is observed or the
//! toggle budget [`DriverConfig::max_cycles`] is spent. The budget is the
//! only wait in the harness; there is no unbounded polling.
//!
//! The driver keeps no state between invocations. Step 1 resets the device,
//! so every invocation starts from the same device state.

use serde::Serialize;
use tracing::{trace, warn};

use fractb_dut::{CoreKind, Dut, Pin, PinMap};

use crate::error::TbError;
use crate::stimulus::StimulusFrame;
use crate::trace::TraceSink;

/// Default run-phase toggle budget.
pub const DEFAULT_MAX_CYCLES: u64 = 10_000;

/// Protocol position of a driver invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Before any signal is touched.
    Idle,
    /// Reset held high for one cycle.
    ResetAsserted,
    /// Reset dropped.
    ResetReleased,
    /// Data inputs driven.
    StimulusLoaded,
    /// Start held high for one cycle and dropped.
    StartPulsed,
    /// Toggling the clock, waiting for `done`.
    Running,
    /// `done` observed.
    Done,
    /// Budget exhausted without `done`.
    TimedOut,
}

/// Result of one driver invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The device raised `done`.
    Completed {
        /// Value of the `iter` output when `done` was seen.
        iterations: u32,
        /// Run-phase clock toggles until `done` was seen.
        cycles: u64,
    },
    /// The toggle budget ran out first.
    TimedOut {
        /// Run-phase clock toggles spent (equal to the budget).
        cycles: u64,
    },
}

impl RunOutcome {
    /// The reported iteration count, if the run completed.
    pub fn iterations(&self) -> Option<u32> {
        match *self {
            RunOutcome::Completed { iterations, .. } => Some(iterations),
            RunOutcome::TimedOut { .. } => None,
        }
    }

    /// Run-phase clock toggles consumed.
    pub fn cycles(&self) -> u64 {
        match *self {
            RunOutcome::Completed { cycles, .. } | RunOutcome::TimedOut { cycles } => cycles,
        }
    }

    /// Whether the run hit the budget.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunOutcome::TimedOut { .. })
    }

    /// The count as written to frame outputs: `-1` for a timeout.
    pub fn as_signed(&self) -> i64 {
        self.iterations().map_or(-1, i64::from)
    }
}

/// Driver settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Run-phase clock toggles allowed before giving up on `done`.
    pub max_cycles: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

/// Drives single computations through a device's pins.
#[derive(Clone, Debug)]
pub struct DutDriver {
    config: DriverConfig,
    pins: PinMap,
}

impl DutDriver {
    /// Creates a driver for the device whose ports are named by `pins`.
    pub fn new(config: DriverConfig, pins: PinMap) -> Self {
        Self { config, pins }
    }

    /// The driver's settings.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The pin names this driver uses.
    pub fn pins(&self) -> &PinMap {
        &self.pins
    }

    /// Runs one computation and returns exactly one outcome.
    ///
    /// Every simulation step is reported to `trace` when one is supplied.
    /// A timeout is not an error: it is returned as [`RunOutcome::TimedOut`]
    /// after logging a warning that names the stimulus.
    pub fn run<D: Dut + ?Sized>(
        &self,
        dut: &mut D,
        frame: &StimulusFrame,
        trace: Option<&mut (dyn TraceSink + '_)>,
    ) -> Result<RunOutcome, TbError> {
        if frame.constant.is_some() != (self.pins.kind == CoreKind::Julia) {
            return Err(TbError::PinKindMismatch {
                pins: self.pins.kind,
                family: if frame.constant.is_some() {
                    CoreKind::Julia
                } else {
                    CoreKind::Mandelbrot
                },
            });
        }

        let mut session = Session::new(dut, &self.pins, trace)?;
        session.enter(Phase::Idle);

        session.set(Pin::Clk, 0)?;
        session.set(Pin::Start, 0)?;
        session.set(Pin::Rst, 1)?;
        session.enter(Phase::ResetAsserted);
        session.full_cycle()?;
        session.set(Pin::Rst, 0)?;
        session.enter(Phase::ResetReleased);

        session.set(Pin::X0, frame.point.x.to_bits() as u64)?;
        session.set(Pin::Y0, frame.point.y.to_bits() as u64)?;
        if let Some(c) = frame.constant {
            session.set(Pin::Cx, c.x.to_bits() as u64)?;
            session.set(Pin::Cy, c.y.to_bits() as u64)?;
        }
        session.set(Pin::MaxIter, frame.max_iter as u64)?;
        session.enter(Phase::StimulusLoaded);

        session.set(Pin::Start, 1)?;
        session.full_cycle()?;
        session.set(Pin::Start, 0)?;
        session.enter(Phase::StartPulsed);

        session.enter(Phase::Running);
        let mut clk = true;
        let mut cycles = 0;
        while !session.done()? && cycles < self.config.max_cycles {
            clk = !clk;
            session.half_cycle(clk)?;
            cycles += 1;
        }

        if session.done()? {
            let iterations = session.get(Pin::Iter)? as u32;
            session.enter(Phase::Done);
            Ok(RunOutcome::Completed { iterations, cycles })
        } else {
            session.enter(Phase::TimedOut);
            warn!(
                x0 = frame.point.x.decode(),
                y0 = frame.point.y.decode(),
                x0_raw = format_args!("0x{:08x}", frame.point.x.to_bits()),
                y0_raw = format_args!("0x{:08x}", frame.point.y.to_bits()),
                max_iter = frame.max_iter,
                budget = self.config.max_cycles,
                "device did not assert {} within the cycle budget",
                self.pins.done
            );
            Ok(RunOutcome::TimedOut { cycles })
        }
    }
}

/// Per-invocation plumbing: signal access by role plus optional tracing.
struct Session<'a, 't, D: Dut + ?Sized> {
    dut: &'a mut D,
    pins: &'a PinMap,
    trace: Option<&'a mut (dyn TraceSink + 't)>,
    snapshot: Vec<(Pin, u64)>,
}

impl<'a, 't, D: Dut + ?Sized> Session<'a, 't, D> {
    fn new(
        dut: &'a mut D,
        pins: &'a PinMap,
        mut trace: Option<&'a mut (dyn TraceSink + 't)>,
    ) -> Result<Self, TbError> {
        if let Some(t) = trace.as_deref_mut() {
            t.declare(pins)?;
        }
        Ok(Self {
            dut,
            pins,
            trace,
            snapshot: Vec::new(),
        })
    }

    fn enter(&self, phase: Phase) {
        trace!(?phase, "driver phase");
    }

    fn set(&mut self, pin: Pin, value: u64) -> Result<(), TbError> {
        Ok(self.dut.set_signal(self.pins.name(pin), value)?)
    }

    fn get(&self, pin: Pin) -> Result<u64, TbError> {
        Ok(self.dut.get_signal(self.pins.name(pin))?)
    }

    fn done(&self) -> Result<bool, TbError> {
        Ok(self.get(Pin::Done)? & 1 == 1)
    }

    /// Drives the clock to `level` and evaluates once.
    fn half_cycle(&mut self, level: bool) -> Result<(), TbError> {
        self.set(Pin::Clk, level as u64)?;
        self.dut.step()?;
        self.record()
    }

    /// Low half followed by high half.
    fn full_cycle(&mut self) -> Result<(), TbError> {
        self.half_cycle(false)?;
        self.half_cycle(true)
    }

    fn record(&mut self) -> Result<(), TbError> {
        let Some(trace) = self.trace.as_deref_mut() else {
            return Ok(());
        };
        self.snapshot.clear();
        for pin in self.pins.pins() {
            let value = self.dut.get_signal(self.pins.name(pin))?;
            self.snapshot.push((pin, value));
        }
        trace.record(&self.snapshot)
    }
}
