//! Grid sweeps: encode, drive, compare, and record every sample point.
//!
//! For each grid point the runner encodes a [`StimulusFrame`], runs the
//! device through [`DutDriver`], asks the reference oracle for the expected
//! count, and classifies the pair. A timeout is always a mismatch; otherwise
//! a point matches when `|hardware - reference| <= tolerance`.
//!
//! Points are independent: the driver resets the device for every point, so
//! the serial and parallel runners produce identical samples in identical
//! order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use fractb_common::{Coordinate, GridPoint, SweepSpec};
use fractb_dut::{CoreKind, Dut, PinMap};

use crate::driver::{DriverConfig, DutDriver, RunOutcome};
use crate::error::TbError;
use crate::sink::SampleSink;
use crate::stimulus::{FixedCoordinate, StimulusFrame};
use crate::trace::TraceSink;

/// Rows handed to the worker pool per batch in a parallel sweep.
const ROWS_PER_WORKER_BATCH: usize = 4;

/// The verdict for one sampled point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Sample {
    /// The sampled coordinate.
    pub coordinate: Coordinate,
    /// What the device reported.
    pub outcome: RunOutcome,
    /// What the reference model computed.
    pub reference: u32,
    /// Whether the two agree within tolerance.
    pub matched: bool,
}

/// Running totals for a sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Points verified.
    pub total_samples: u64,
    /// Points that did not match (timeouts included).
    pub mismatch_count: u64,
    /// Points whose run hit the toggle budget.
    pub timeout_count: u64,
    /// Run-phase toggles summed over completed points.
    pub completed_cycles: u64,
}

impl RunStatistics {
    /// Folds one sample into the totals.
    pub fn record(&mut self, sample: &Sample) {
        self.total_samples += 1;
        if !sample.matched {
            self.mismatch_count += 1;
        }
        match sample.outcome {
            RunOutcome::TimedOut { .. } => self.timeout_count += 1,
            RunOutcome::Completed { cycles, .. } => self.completed_cycles += cycles,
        }
    }

    /// Points that passed.
    pub fn passed(&self) -> u64 {
        self.total_samples - self.mismatch_count
    }
}

/// Decides whether a device outcome agrees with the reference count.
pub fn classify(outcome: &RunOutcome, reference: u32, tolerance: u32) -> bool {
    match outcome.iterations() {
        Some(hw) => hw.abs_diff(reference) <= tolerance,
        None => false,
    }
}

/// Runs sweeps against a device.
#[derive(Clone, Debug, Default)]
pub struct SweepRunner {
    config: DriverConfig,
    pins: Option<PinMap>,
}

impl SweepRunner {
    /// Creates a runner whose driver uses `config`.
    pub fn new(config: DriverConfig) -> Self {
        Self { config, pins: None }
    }

    /// Uses `pins` instead of the family's default port names.
    pub fn with_pins(mut self, pins: PinMap) -> Self {
        self.pins = Some(pins);
        self
    }

    /// Builds the driver for `spec`, checking the pin map fits its family.
    pub fn driver_for(&self, spec: &SweepSpec) -> Result<DutDriver, TbError> {
        let pins = match &self.pins {
            Some(p) => p.clone(),
            None => PinMap::for_family(&spec.family),
        };
        let family = CoreKind::from(&spec.family);
        if pins.kind != family {
            return Err(TbError::PinKindMismatch {
                pins: pins.kind,
                family,
            });
        }
        Ok(DutDriver::new(self.config, pins))
    }

    /// Verifies every grid point of `spec` on `dut`, in row-major order.
    ///
    /// Each sample is passed to `sink` as soon as it is produced. The sweep
    /// stops at the first error; mismatches and timeouts are not errors.
    pub fn run<D: Dut + ?Sized>(
        &self,
        spec: &SweepSpec,
        dut: &mut D,
        sink: &mut dyn SampleSink,
        mut trace: Option<&mut (dyn TraceSink + '_)>,
    ) -> Result<RunStatistics, TbError> {
        validate(spec)?;
        let driver = self.driver_for(spec)?;
        debug!(
            family = %spec.family,
            columns = spec.resolution.columns(),
            rows = spec.resolution.rows(),
            max_iter = spec.max_iter,
            tolerance = spec.tolerance,
            budget = driver.config().max_cycles,
            "starting sweep"
        );

        let mut stats = RunStatistics::default();
        for point in spec.grid().points() {
            let sample = verify_point(&driver, spec, point, dut, trace.as_deref_mut())?;
            stats.record(&sample);
            sink.accept(&sample)?;
        }
        if let Some(t) = trace {
            t.finish()?;
        }
        sink.finish()?;
        Ok(stats)
    }

    /// Verifies `spec` across `jobs` worker threads.
    ///
    /// Every worker builds its own device with `factory` and its own driver,
    /// so no device is ever shared. Samples reach `sink` in the same order
    /// as in [`run`](Self::run).
    pub fn run_parallel<D, F>(
        &self,
        spec: &SweepSpec,
        jobs: usize,
        factory: F,
        sink: &mut dyn SampleSink,
    ) -> Result<RunStatistics, TbError>
    where
        D: Dut,
        F: Fn() -> D + Sync,
    {
        validate(spec)?;
        let driver = self.driver_for(spec)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .build()
            .map_err(|e| TbError::WorkerPool {
                reason: e.to_string(),
            })?;
        debug!(family = %spec.family, jobs, "starting parallel sweep");

        let grid = spec.grid();
        let rows: Vec<u32> = (0..grid.rows()).collect();
        let batch = jobs.max(1) * ROWS_PER_WORKER_BATCH;
        let mut stats = RunStatistics::default();

        for chunk in rows.chunks(batch) {
            let verified: Vec<Vec<Sample>> = pool.install(|| {
                chunk
                    .par_iter()
                    .map_init(&factory, |dut, &row| {
                        grid.row(row)
                            .map(|point| verify_point(&driver, spec, point, dut, None))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<Vec<_>, _>>()
            })?;
            for sample in verified.iter().flatten() {
                stats.record(sample);
                sink.accept(sample)?;
            }
        }
        sink.finish()?;
        Ok(stats)
    }
}

/// Verifies a single coordinate, outside of any grid.
pub fn verify_coordinate<D: Dut + ?Sized>(
    driver: &DutDriver,
    spec: &SweepSpec,
    coordinate: Coordinate,
    dut: &mut D,
    trace: Option<&mut (dyn TraceSink + '_)>,
) -> Result<Sample, TbError> {
    let point = GridPoint {
        column: 0,
        row: 0,
        coordinate,
    };
    verify_point(driver, spec, point, dut, trace)
}

fn verify_point<D: Dut + ?Sized>(
    driver: &DutDriver,
    spec: &SweepSpec,
    point: GridPoint,
    dut: &mut D,
    trace: Option<&mut (dyn TraceSink + '_)>,
) -> Result<Sample, TbError> {
    let frame = StimulusFrame::encode(&spec.family, point.coordinate, spec.max_iter)?;
    let outcome = driver.run(dut, &frame, trace)?;
    let reference = fractb_oracle::iterations(spec.family, point.coordinate, spec.max_iter);
    Ok(Sample {
        coordinate: point.coordinate,
        outcome,
        reference,
        matched: classify(&outcome, reference, spec.tolerance),
    })
}

/// Rejects sweeps that cannot run, before any device interaction.
///
/// Checking the region corners and the Julia constant up front catches a
/// region configured outside the Q8.24 range without driving a single point.
pub fn validate(spec: &SweepSpec) -> Result<(), TbError> {
    if spec.resolution.columns() == 0 || spec.resolution.rows() == 0 {
        return Err(TbError::InvalidSweep {
            reason: "resolution must be at least one sample per axis".into(),
        });
    }
    if spec.max_iter == 0 {
        return Err(TbError::InvalidSweep {
            reason: "max_iter must be positive".into(),
        });
    }
    if !(spec.x.min <= spec.x.max && spec.y.min <= spec.y.max) {
        return Err(TbError::InvalidSweep {
            reason: format!(
                "empty region x=[{}, {}] y=[{}, {}]",
                spec.x.min, spec.x.max, spec.y.min, spec.y.max
            ),
        });
    }
    for corner in spec.corners() {
        FixedCoordinate::encode(corner)?;
    }
    if let Some(c) = spec.family.constant() {
        FixedCoordinate::encode(c)?;
    }
    Ok(())
}
