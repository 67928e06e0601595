//! The capability interface a simulated device exposes to the harness.

use fractb_common::Fixed;

use crate::error::DutError;
use crate::pins::{Pin, PinMap};

/// A clocked device stepped by an external simulation engine.
///
/// The harness only ever drives inputs by name, asks the backend to evaluate
/// one step, and samples signals by name. Clocking is explicit: the driver
/// toggles the clock input and calls [`step`](Dut::step) once per half-cycle.
pub trait Dut {
    /// Drives an input signal. Values wider than the port are truncated.
    fn set_signal(&mut self, name: &str, value: u64) -> Result<(), DutError>;

    /// Evaluates the device once with the currently driven inputs.
    fn step(&mut self) -> Result<(), DutError>;

    /// Samples a signal (input or output).
    fn get_signal(&self, name: &str) -> Result<u64, DutError>;
}

impl<D: Dut + ?Sized> Dut for &mut D {
    fn set_signal(&mut self, name: &str, value: u64) -> Result<(), DutError> {
        (**self).set_signal(name, value)
    }

    fn step(&mut self) -> Result<(), DutError> {
        (**self).step()
    }

    fn get_signal(&self, name: &str) -> Result<u64, DutError> {
        (**self).get_signal(name)
    }
}

impl<D: Dut + ?Sized> Dut for Box<D> {
    fn set_signal(&mut self, name: &str, value: u64) -> Result<(), DutError> {
        (**self).set_signal(name, value)
    }

    fn step(&mut self) -> Result<(), DutError> {
        (**self).step()
    }

    fn get_signal(&self, name: &str) -> Result<u64, DutError> {
        (**self).get_signal(name)
    }
}

/// Data inputs as a core sees them at the moment `start` is sampled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreInputs {
    /// Seed / point real part.
    pub x0: Fixed,
    /// Seed / point imaginary part.
    pub y0: Fixed,
    /// Julia constant real part (zero on Mandelbrot cores).
    pub cx: Fixed,
    /// Julia constant imaginary part (zero on Mandelbrot cores).
    pub cy: Fixed,
    /// Iteration cap.
    pub max_iter: u32,
}

/// Input-side port state shared by the in-crate device models.
#[derive(Clone, Debug)]
pub(crate) struct InputPorts {
    pub(crate) pins: PinMap,
    pub(crate) clk: bool,
    pub(crate) rst: bool,
    pub(crate) start: bool,
    pub(crate) data: CoreInputs,
    prev_clk: bool,
}

impl InputPorts {
    pub(crate) fn new(pins: PinMap) -> Self {
        Self {
            pins,
            clk: false,
            rst: false,
            start: false,
            data: CoreInputs::default(),
            prev_clk: false,
        }
    }

    /// Resolves `name` and stores `value` into the matching input.
    pub(crate) fn drive(&mut self, name: &str, value: u64) -> Result<(), DutError> {
        let pin = self
            .pins
            .lookup(name)
            .ok_or_else(|| DutError::UnknownSignal { name: name.into() })?;
        let v = value & pin.mask();
        match pin {
            Pin::Clk => self.clk = v != 0,
            Pin::Rst => self.rst = v != 0,
            Pin::Start => self.start = v != 0,
            Pin::X0 => self.data.x0 = Fixed::from_bits(v as u32),
            Pin::Y0 => self.data.y0 = Fixed::from_bits(v as u32),
            Pin::Cx => self.data.cx = Fixed::from_bits(v as u32),
            Pin::Cy => self.data.cy = Fixed::from_bits(v as u32),
            Pin::MaxIter => self.data.max_iter = v as u32,
            Pin::Done | Pin::Iter => return Err(DutError::NotAnInput { name: name.into() }),
        }
        Ok(())
    }

    /// Reads back an input; `None` for outputs.
    pub(crate) fn sample(&self, pin: Pin) -> Option<u64> {
        Some(match pin {
            Pin::Clk => self.clk as u64,
            Pin::Rst => self.rst as u64,
            Pin::Start => self.start as u64,
            Pin::X0 => self.data.x0.to_bits() as u64,
            Pin::Y0 => self.data.y0.to_bits() as u64,
            Pin::Cx => self.data.cx.to_bits() as u64,
            Pin::Cy => self.data.cy.to_bits() as u64,
            Pin::MaxIter => self.data.max_iter as u64,
            Pin::Done | Pin::Iter => return None,
        })
    }

    /// Records the current clock level and reports whether it rose since
    /// the previous evaluation.
    pub(crate) fn take_rising_edge(&mut self) -> bool {
        let rose = self.clk && !self.prev_clk;
        self.prev_clk = self.clk;
        rose
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<Pin, DutError> {
        self.pins
            .lookup(name)
            .ok_or_else(|| DutError::UnknownSignal { name: name.into() })
    }
}
