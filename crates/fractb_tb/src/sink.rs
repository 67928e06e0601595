//! Destinations for per-point sweep results.
//!
//! The sweep runner hands every [`Sample`] to a [`SampleSink`] as soon as it
//! is verified. [`CsvSink`] writes the frame format consumed by the plotting
//! scripts: a `x,y,iter` header followed by one row per sample in row-major
//! order, with `-1` standing in for a timeout.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::TbError;
use crate::sweep::Sample;

/// Receives samples in sweep order.
pub trait SampleSink {
    /// Accepts one verified sample.
    fn accept(&mut self, sample: &Sample) -> Result<(), TbError>;

    /// Called once after the last sample.
    fn finish(&mut self) -> Result<(), TbError> {
        Ok(())
    }
}

/// Fans samples out to several sinks, in order.
impl SampleSink for Vec<Box<dyn SampleSink + '_>> {
    fn accept(&mut self, sample: &Sample) -> Result<(), TbError> {
        for sink in self.iter_mut() {
            sink.accept(sample)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), TbError> {
        for sink in self.iter_mut() {
            sink.finish()?;
        }
        Ok(())
    }
}

/// Writes samples as `x,y,iter` CSV rows.
pub struct CsvSink<W: Write> {
    writer: W,
    header_written: bool,
    rows: u64,
}

impl CsvSink<BufWriter<File>> {
    /// Creates (or truncates) a CSV file at `path`.
    pub fn create(path: &Path) -> Result<Self, TbError> {
        let file = File::create(path).map_err(|source| TbError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> CsvSink<W> {
    /// Creates a CSV sink writing to the given output.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
            rows: 0,
        }
    }

    /// Data rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> Result<(), TbError> {
        if !self.header_written {
            writeln!(self.writer, "x,y,iter")?;
            self.header_written = true;
        }
        Ok(())
    }
}

impl<W: Write> SampleSink for CsvSink<W> {
    fn accept(&mut self, sample: &Sample) -> Result<(), TbError> {
        self.write_header()?;
        writeln!(
            self.writer,
            "{},{},{}",
            sample.coordinate.x,
            sample.coordinate.y,
            sample.outcome.as_signed()
        )?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), TbError> {
        // An empty sweep still produces a valid frame.
        self.write_header()?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every sample in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    /// Samples in the order they were accepted.
    pub samples: Vec<Sample>,
}

impl CollectSink {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples that did not match.
    pub fn mismatches(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(|s| !s.matched)
    }
}

impl SampleSink for CollectSink {
    fn accept(&mut self, sample: &Sample) -> Result<(), TbError> {
        self.samples.push(*sample);
        Ok(())
    }
}

/// Discards samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl SampleSink for NullSink {
    fn accept(&mut self, _sample: &Sample) -> Result<(), TbError> {
        Ok(())
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> SampleSink for FnSink<F>
where
    F: FnMut(&Sample) -> Result<(), TbError>,
{
    fn accept(&mut self, sample: &Sample) -> Result<(), TbError> {
        (self.0)(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RunOutcome;
    use fractb_common::Coordinate;

    fn sample(x: f64, y: f64, outcome: RunOutcome) -> Sample {
        Sample {
            coordinate: Coordinate::new(x, y),
            outcome,
            reference: 3,
            matched: outcome.iterations() == Some(3),
        }
    }

    #[test]
    fn csv_header_and_rows() {
        let mut sink = CsvSink::new(Vec::new());
        sink.accept(&sample(
            -2.0,
            -1.5,
            RunOutcome::Completed {
                iterations: 3,
                cycles: 8,
            },
        ))
        .unwrap();
        sink.accept(&sample(0.25, 0.5, RunOutcome::TimedOut { cycles: 100 }))
            .unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.rows(), 2);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "x,y,iter\n-2,-1.5,3\n0.25,0.5,-1\n");
    }

    #[test]
    fn csv_empty_sweep_has_header() {
        let mut sink = CsvSink::new(Vec::new());
        sink.finish().unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "x,y,iter\n");
    }

    #[test]
    fn csv_create_fails_in_missing_directory() {
        let err = CsvSink::create(Path::new("/nonexistent/dir/frame.csv"))
            .err()
            .unwrap();
        assert!(matches!(err, TbError::SinkOpen { .. }));
        assert!(err.to_string().contains("frame.csv"));
    }

    #[test]
    fn collect_and_filter() {
        let mut sink = CollectSink::new();
        sink.accept(&sample(
            0.0,
            0.0,
            RunOutcome::Completed {
                iterations: 3,
                cycles: 2,
            },
        ))
        .unwrap();
        sink.accept(&sample(1.0, 0.0, RunOutcome::TimedOut { cycles: 2 }))
            .unwrap();
        assert_eq!(sink.samples.len(), 2);
        assert_eq!(sink.mismatches().count(), 1);
    }

    #[test]
    fn fan_out_reaches_every_sink() {
        let mut seen = 0;
        {
            let mut sinks: Vec<Box<dyn SampleSink + '_>> = vec![
                Box::new(NullSink),
                Box::new(FnSink(|_: &Sample| {
                    seen += 1;
                    Ok(())
                })),
            ];
            let s = sample(0.0, 0.0, RunOutcome::TimedOut { cycles: 1 });
            sinks.accept(&s).unwrap();
            sinks.accept(&s).unwrap();
            sinks.finish().unwrap();
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn fn_sink_errors_propagate() {
        let mut sink = FnSink(|_: &Sample| Err(TbError::InvalidSweep { reason: "x".into() }));
        let s = sample(0.0, 0.0, RunOutcome::TimedOut { cycles: 1 });
        assert!(sink.accept(&s).is_err());
    }
}
