//! Waveform tracing of driver activity.
//!
//! The [`TraceSink`] trait receives one snapshot of every DUT pin after each
//! simulation step the driver performs. [`VcdTrace`] writes those snapshots
//! as an IEEE 1364 Value Change Dump viewable in GTKWave or Surfer;
//! [`MemoryTrace`] keeps them in memory.
//!
//! Timestamps belong to the sink, not the driver, so a single trace spanning
//! many driver invocations stays strictly increasing.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use fractb_dut::{Pin, PinMap};

use crate::error::TbError;

/// Receives pin snapshots from the driver.
pub trait TraceSink {
    /// Announces the pins that will appear in snapshots. Called at the start
    /// of every driver invocation; sinks should ignore repeated declarations.
    fn declare(&mut self, pins: &PinMap) -> Result<(), TbError>;

    /// Records the state of every declared pin after one simulation step.
    fn record(&mut self, snapshot: &[(Pin, u64)]) -> Result<(), TbError>;

    /// Flushes buffered output.
    fn finish(&mut self) -> Result<(), TbError>;
}

/// VCD writer for driver traces.
///
/// Each recorded snapshot advances time by one unit (`1ns`). Only pins whose
/// value changed since the previous snapshot are written.
pub struct VcdTrace<W: Write> {
    writer: W,
    signals: Vec<(Pin, String, u32)>, // (pin, id_code, width)
    last: Vec<Option<u64>>,
    time: u64,
    declared: bool,
}

impl VcdTrace<BufWriter<File>> {
    /// Creates a VCD file at `path`.
    pub fn create(path: &Path) -> Result<Self, TbError> {
        let file = File::create(path).map_err(|source| TbError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> VcdTrace<W> {
    /// Creates a VCD trace writing to the given output.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            signals: Vec::new(),
            last: Vec::new(),
            time: 0,
            declared: false,
        }
    }

    /// Number of snapshots recorded so far.
    pub fn snapshots(&self) -> u64 {
        self.time
    }

    /// Consumes the trace and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Uses printable ASCII characters starting from `!` (0x21).
    fn make_id_code(index: u32) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            let c = (b'!' + (idx % 94) as u8) as char;
            result.push(c);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    fn format_value(value: u64, width: u32) -> String {
        if width == 1 {
            let bit = if value & 1 == 1 { "1" } else { "0" };
            bit.to_string()
        } else {
            format!("b{:0w$b}", value, w = width as usize)
        }
    }
}

impl<W: Write> TraceSink for VcdTrace<W> {
    fn declare(&mut self, pins: &PinMap) -> Result<(), TbError> {
        if self.declared {
            return Ok(());
        }
        writeln!(self.writer, "$date")?;
        writeln!(self.writer, "  fractb driver trace")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  fractb {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  1ns")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$scope module {}_core $end", pins.kind)?;
        for (index, pin) in pins.pins().enumerate() {
            let id_code = Self::make_id_code(index as u32);
            let width = pin.width();
            writeln!(
                self.writer,
                "$var wire {width} {id_code} {} $end",
                pins.name(pin)
            )?;
            self.signals.push((pin, id_code, width));
        }
        writeln!(self.writer, "$upscope $end")?;
        writeln!(self.writer, "$enddefinitions $end")?;
        self.last = vec![None; self.signals.len()];
        self.declared = true;
        Ok(())
    }

    fn record(&mut self, snapshot: &[(Pin, u64)]) -> Result<(), TbError> {
        if !self.declared {
            return Err(TbError::SinkIo(io::Error::new(
                io::ErrorKind::InvalidInput,
                "trace snapshot recorded before pins were declared",
            )));
        }
        let first = self.time == 0;
        writeln!(self.writer, "#{}", self.time)?;
        if first {
            writeln!(self.writer, "$dumpvars")?;
        }
        for &(pin, value) in snapshot {
            let Some(slot) = self.signals.iter().position(|(p, _, _)| *p == pin) else {
                continue;
            };
            if self.last[slot] == Some(value) {
                continue;
            }
            let (_, id_code, width) = &self.signals[slot];
            let val_str = Self::format_value(value, *width);
            if *width == 1 {
                writeln!(self.writer, "{val_str}{id_code}")?;
            } else {
                writeln!(self.writer, "{val_str} {id_code}")?;
            }
            self.last[slot] = Some(value);
        }
        if first {
            writeln!(self.writer, "$end")?;
        }
        self.time += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), TbError> {
        if !self.declared {
            writeln!(self.writer, "$enddefinitions $end")?;
            self.declared = true;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// A trace kept in memory, one entry per simulation step.
#[derive(Debug, Default)]
pub struct MemoryTrace {
    /// Recorded snapshots, oldest first.
    pub snapshots: Vec<Vec<(Pin, u64)>>,
}

impl MemoryTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of one pin across all snapshots.
    pub fn series(&self, pin: Pin) -> Vec<u64> {
        self.snapshots
            .iter()
            .filter_map(|snap| snap.iter().find(|(p, _)| *p == pin).map(|&(_, v)| v))
            .collect()
    }
}

impl TraceSink for MemoryTrace {
    fn declare(&mut self, _pins: &PinMap) -> Result<(), TbError> {
        Ok(())
    }

    fn record(&mut self, snapshot: &[(Pin, u64)]) -> Result<(), TbError> {
        self.snapshots.push(snapshot.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), TbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(trace: VcdTrace<Vec<u8>>) -> String {
        String::from_utf8(trace.into_inner()).unwrap()
    }

    #[test]
    fn id_code_first() {
        assert_eq!(VcdTrace::<Vec<u8>>::make_id_code(0), "!");
    }

    #[test]
    fn id_code_sequential() {
        assert_eq!(VcdTrace::<Vec<u8>>::make_id_code(1), "\"");
        assert_eq!(VcdTrace::<Vec<u8>>::make_id_code(93), "~");
        assert_eq!(VcdTrace::<Vec<u8>>::make_id_code(94).len(), 2);
    }

    #[test]
    fn format_values() {
        assert_eq!(VcdTrace::<Vec<u8>>::format_value(1, 1), "1");
        assert_eq!(VcdTrace::<Vec<u8>>::format_value(0, 1), "0");
        assert_eq!(VcdTrace::<Vec<u8>>::format_value(0b1010, 4), "b1010");
        assert_eq!(VcdTrace::<Vec<u8>>::format_value(5, 8), "b00000101");
    }

    #[test]
    fn declare_writes_vars_once() {
        let mut trace = VcdTrace::new(Vec::new());
        trace.declare(&PinMap::mandelbrot()).unwrap();
        trace.declare(&PinMap::mandelbrot()).unwrap();
        trace.finish().unwrap();
        let out = output(trace);
        assert_eq!(out.matches("$scope module mandelbrot_core $end").count(), 1);
        assert!(out.contains("$var wire 1 ! clk_i $end"));
        assert!(out.contains("$var wire 32 $ x0_i $end"));
        assert!(out.contains("$var wire 1 ' done_o $end"));
        assert!(!out.contains("cx_i"));
        assert_eq!(out.matches("$enddefinitions $end").count(), 1);
    }

    #[test]
    fn julia_declares_constant_ports() {
        let mut trace = VcdTrace::new(Vec::new());
        trace.declare(&PinMap::julia()).unwrap();
        let out = output(trace);
        assert!(out.contains("zx_i"));
        assert!(out.contains("cx_i"));
        assert!(out.contains("cy_i"));
    }

    #[test]
    fn records_only_changes() {
        let mut trace = VcdTrace::new(Vec::new());
        trace.declare(&PinMap::mandelbrot()).unwrap();
        trace.record(&[(Pin::Clk, 0), (Pin::Rst, 1)]).unwrap();
        trace.record(&[(Pin::Clk, 1), (Pin::Rst, 1)]).unwrap();
        trace.finish().unwrap();
        assert_eq!(trace.snapshots(), 2);
        let out = output(trace);
        assert!(out.contains("#0\n$dumpvars\n0!\n1\"\n$end\n"));
        assert!(out.contains("#1\n1!\n"));
        assert_eq!(out.matches("1\"").count(), 1);
    }

    #[test]
    fn multi_bit_values_are_binary() {
        let mut trace = VcdTrace::new(Vec::new());
        trace.declare(&PinMap::mandelbrot()).unwrap();
        trace.record(&[(Pin::Iter, 3)]).unwrap();
        let out = output(trace);
        assert!(out.contains(&format!("b{:032b} ", 3)));
    }

    #[test]
    fn record_before_declare_fails() {
        let mut trace = VcdTrace::new(Vec::new());
        assert!(trace.record(&[(Pin::Clk, 1)]).is_err());
    }

    #[test]
    fn finish_empty_trace() {
        let mut trace = VcdTrace::new(Vec::new());
        trace.finish().unwrap();
        assert!(output(trace).contains("$enddefinitions $end"));
    }

    #[test]
    fn create_in_missing_directory_fails() {
        let err = VcdTrace::create(Path::new("/nonexistent/dir/trace.vcd"))
            .err()
            .unwrap();
        assert!(matches!(err, TbError::SinkOpen { .. }));
        assert!(err.to_string().contains("trace.vcd"));
    }

    #[test]
    fn memory_trace_series() {
        let mut trace = MemoryTrace::new();
        trace.record(&[(Pin::Clk, 0), (Pin::Done, 0)]).unwrap();
        trace.record(&[(Pin::Clk, 1), (Pin::Done, 1)]).unwrap();
        assert_eq!(trace.series(Pin::Clk), vec![0, 1]);
        assert_eq!(trace.series(Pin::Done), vec![0, 1]);
    }
}
