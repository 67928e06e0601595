//! A programmable stand-in device for exercising the driver protocol.
//!
//! [`ScriptedDut`] honors the same reset/start/done handshake as a real core
//! but computes its answer with a caller-supplied closure and raises `done`
//! after a fixed number of rising clock edges. It also counts protocol
//! events so tests can check how it was driven.

use std::fmt;

use crate::dut::{CoreInputs, Dut, InputPorts};
use crate::error::DutError;
use crate::pins::{Pin, PinMap};

/// Computes the `iter` output from the inputs latched at `start`.
pub type Responder = Box<dyn FnMut(&CoreInputs) -> u32 + Send>;

/// Counters describing how a [`ScriptedDut`] has been driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProtocolCounters {
    /// Calls to [`Dut::step`].
    pub steps: u64,
    /// Rising edges seen with `rst` high.
    pub resets: u64,
    /// Rising edges that latched a start request.
    pub starts: u64,
}

/// A device that answers after a fixed latency using a closure.
pub struct ScriptedDut {
    ports: InputPorts,
    latency: Option<u32>,
    responder: Responder,
    remaining: Option<u32>,
    done: bool,
    iter: u32,
    latched: Option<CoreInputs>,
    counters: ProtocolCounters,
}

impl ScriptedDut {
    /// Creates a device that raises `done` on the `latency`-th rising edge
    /// after the edge that sampled `start`.
    pub fn new(pins: PinMap, latency: u32, responder: Responder) -> Self {
        Self {
            ports: InputPorts::new(pins),
            latency: Some(latency),
            responder,
            remaining: None,
            done: false,
            iter: 0,
            latched: None,
            counters: ProtocolCounters::default(),
        }
    }

    /// Creates a device that never raises `done`.
    pub fn hung(pins: PinMap) -> Self {
        let mut dut = Self::new(pins, 0, Box::new(|_| 0));
        dut.latency = None;
        dut
    }

    /// Protocol event counters accumulated so far.
    pub fn counters(&self) -> ProtocolCounters {
        self.counters
    }

    /// Inputs captured by the most recent start, if any.
    pub fn latched(&self) -> Option<CoreInputs> {
        self.latched
    }

    fn finish(&mut self) {
        let inputs = self.latched.unwrap_or_default();
        self.iter = (self.responder)(&inputs);
        self.done = true;
        self.remaining = None;
    }

    fn on_rising_edge(&mut self) {
        if self.ports.rst {
            self.counters.resets += 1;
            self.done = false;
            self.iter = 0;
            self.remaining = None;
            return;
        }
        if let Some(left) = self.remaining {
            if left <= 1 {
                self.finish();
            } else {
                self.remaining = Some(left - 1);
            }
            return;
        }
        if self.ports.start {
            self.counters.starts += 1;
            self.latched = Some(self.ports.data);
            self.done = false;
            match self.latency {
                Some(0) => self.finish(),
                Some(n) => self.remaining = Some(n),
                None => {}
            }
        }
    }
}

impl fmt::Debug for ScriptedDut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedDut")
            .field("latency", &self.latency)
            .field("done", &self.done)
            .field("iter", &self.iter)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

impl Dut for ScriptedDut {
    fn set_signal(&mut self, name: &str, value: u64) -> Result<(), DutError> {
        self.ports.drive(name, value)
    }

    fn step(&mut self) -> Result<(), DutError> {
        self.counters.steps += 1;
        if self.ports.take_rising_edge() {
            self.on_rising_edge();
        }
        Ok(())
    }

    fn get_signal(&self, name: &str) -> Result<u64, DutError> {
        let pin = self.ports.resolve(name)?;
        Ok(match pin {
            Pin::Done => self.done as u64,
            Pin::Iter => self.iter as u64,
            input => self.ports.sample(input).unwrap_or_default(),
        })
    }
}
