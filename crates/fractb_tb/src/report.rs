//! End-of-sweep summaries.
//!
//! A [`Report`] condenses [`RunStatistics`] into the figures an engineer
//! checks after a sweep. Its `Display` form is the human summary line; it
//! also serializes to JSON for CI consumption.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::sweep::RunStatistics;

/// Summary of one finished sweep.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// Sweep name, when it came from a configuration file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Points verified.
    pub total_samples: u64,
    /// Points that did not match, timeouts included.
    pub mismatch_count: u64,
    /// Points that hit the toggle budget.
    pub timeout_count: u64,
    /// Mean run-phase toggles over completed points.
    pub mean_cycles: f64,
    /// Wall-clock duration of the sweep in seconds.
    pub elapsed_secs: f64,
}

impl Report {
    /// Builds a report from sweep totals and the time they took.
    pub fn new(stats: &RunStatistics, elapsed: Duration) -> Self {
        let completed = stats.total_samples - stats.timeout_count;
        let mean_cycles = if completed == 0 {
            0.0
        } else {
            stats.completed_cycles as f64 / completed as f64
        };
        Self {
            name: None,
            total_samples: stats.total_samples,
            mismatch_count: stats.mismatch_count,
            timeout_count: stats.timeout_count,
            mean_cycles,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    /// Attaches a sweep name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fraction of points that mismatched, in `[0, 1]`. Zero for an empty sweep.
    pub fn mismatch_rate(&self) -> f64 {
        if self.total_samples == 0 {
            0.0
        } else {
            self.mismatch_count as f64 / self.total_samples as f64
        }
    }

    /// Percentage of points that passed.
    pub fn pass_percentage(&self) -> f64 {
        100.0 * (1.0 - self.mismatch_rate())
    }

    /// Whether every point matched.
    pub fn is_full_pass(&self) -> bool {
        self.mismatch_count == 0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "[{name}] ")?;
        }
        if self.is_full_pass() {
            write!(f, "All {} sample points passed.", self.total_samples)?;
        } else {
            // Truncated, so a failing sweep never reads 100.00%.
            let hundredths =
                (self.total_samples - self.mismatch_count) * 10_000 / self.total_samples;
            write!(
                f,
                "{} mismatches found. {}.{:02}% passed.",
                self.mismatch_count,
                hundredths / 100,
                hundredths % 100
            )?;
        }
        if self.timeout_count > 0 {
            write!(
                f,
                "\nWARNING: {} of {} points timed out without asserting done.",
                self.timeout_count, self.total_samples
            )?;
        }
        Ok(())
    }
}
