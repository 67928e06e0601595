//! Cycle-level behavioral model of the escape-time core.
//!
//! [`EscapeCore`] reproduces the core's externally visible behavior in
//! Q8.24 arithmetic so the harness can run without an RTL simulator. All
//! state changes happen on rising clock edges:
//!
//! - `rst` high: return to idle, clear `done` and `iter`.
//! - idle (or finished) with `start` high: latch the data inputs and begin.
//! - busy: every `iteration_latency` edges, either finish (`|z|² > 4` or the
//!   count reached `max_iter`, raising `done`) or apply one `z ← z² + c`.
//!
//! `done` then stays high until the next reset or start.

use fractb_common::Fixed;

use crate::dut::{CoreInputs, Dut, InputPorts};
use crate::error::DutError;
use crate::pins::{CoreKind, Pin, PinMap};

/// `4.0` in Q16.48, the scale of a full Q8.24 product.
const ESCAPE_RADIUS_SQ_WIDE: i64 = 4 << 48;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CoreState {
    Idle,
    Busy,
    Finished,
}

/// Behavioral model of a Mandelbrot or Julia escape-time core.
#[derive(Clone, Debug)]
pub struct EscapeCore {
    ports: InputPorts,
    iteration_latency: u32,
    state: CoreState,
    zx: Fixed,
    zy: Fixed,
    cx: Fixed,
    cy: Fixed,
    limit: u32,
    count: u32,
    wait: u32,
    done: bool,
}

impl EscapeCore {
    /// Creates a core of the given kind with its default port names.
    pub fn new(kind: CoreKind) -> Self {
        let pins = match kind {
            CoreKind::Mandelbrot => PinMap::mandelbrot(),
            CoreKind::Julia => PinMap::julia(),
        };
        Self::with_pins(pins)
    }

    /// Creates a core whose ports are named by `pins`.
    pub fn with_pins(pins: PinMap) -> Self {
        Self {
            ports: InputPorts::new(pins),
            iteration_latency: 1,
            state: CoreState::Idle,
            zx: Fixed::ZERO,
            zy: Fixed::ZERO,
            cx: Fixed::ZERO,
            cy: Fixed::ZERO,
            limit: 0,
            count: 0,
            wait: 0,
            done: false,
        }
    }

    /// Sets how many clock edges each iteration takes (minimum 1).
    pub fn with_iteration_latency(mut self, edges: u32) -> Self {
        self.iteration_latency = edges.max(1);
        self
    }

    /// The port names this core answers to.
    pub fn pins(&self) -> &PinMap {
        &self.ports.pins
    }

    /// Clock toggles after the start pulse needed to finish `max_iter`
    /// iterations in the worst case (the point never escapes).
    pub fn worst_case_toggles(&self, max_iter: u32) -> u64 {
        2 * (max_iter as u64 + 1) * self.iteration_latency as u64
    }

    fn kind(&self) -> CoreKind {
        self.ports.pins.kind
    }

    fn latch(&mut self, inputs: CoreInputs) {
        match self.kind() {
            CoreKind::Mandelbrot => {
                self.zx = Fixed::ZERO;
                self.zy = Fixed::ZERO;
                self.cx = inputs.x0;
                self.cy = inputs.y0;
            }
            CoreKind::Julia => {
                self.zx = inputs.x0;
                self.zy = inputs.y0;
                self.cx = inputs.cx;
                self.cy = inputs.cy;
            }
        }
        self.limit = inputs.max_iter;
        self.count = 0;
        self.wait = 0;
        self.done = false;
        self.state = CoreState::Busy;
    }

    fn iterate(&mut self) {
        // Compare in Q16.48; narrowed squares wrap once |z| exceeds about 11.3.
        let mag = self
            .zx
            .wide_mul(self.zx)
            .saturating_add(self.zy.wide_mul(self.zy));
        if mag > ESCAPE_RADIUS_SQ_WIDE || self.count >= self.limit {
            self.done = true;
            self.state = CoreState::Finished;
            return;
        }
        let x2 = self.zx.mul(self.zx);
        let y2 = self.zy.mul(self.zy);
        let xy = self.zx.mul(self.zy);
        self.zy = xy.wrapping_add(xy).wrapping_add(self.cy);
        self.zx = x2.wrapping_sub(y2).wrapping_add(self.cx);
        self.count += 1;
    }

    fn on_rising_edge(&mut self) {
        if self.ports.rst {
            self.state = CoreState::Idle;
            self.done = false;
            self.count = 0;
            self.wait = 0;
            return;
        }
        match self.state {
            CoreState::Idle | CoreState::Finished => {
                if self.ports.start {
                    self.latch(self.ports.data);
                }
            }
            CoreState::Busy => {
                self.wait += 1;
                if self.wait >= self.iteration_latency {
                    self.wait = 0;
                    self.iterate();
                }
            }
        }
    }
}

impl Dut for EscapeCore {
    fn set_signal(&mut self, name: &str, value: u64) -> Result<(), DutError> {
        self.ports.drive(name, value)
    }

    fn step(&mut self) -> Result<(), DutError> {
        if self.ports.take_rising_edge() {
            self.on_rising_edge();
        }
        Ok(())
    }

    fn get_signal(&self, name: &str) -> Result<u64, DutError> {
        let pin = self.ports.resolve(name)?;
        Ok(match pin {
            Pin::Done => self.done as u64,
            Pin::Iter => self.count as u64,
            input => self.ports.sample(input).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractb_common::Coordinate;

    fn tick(core: &mut EscapeCore) {
        core.set_signal("clk_i", 0).unwrap();
        core.step().unwrap();
        core.set_signal("clk_i", 1).unwrap();
        core.step().unwrap();
    }

    fn run_point(core: &mut EscapeCore, x0: Fixed, y0: Fixed, c: Option<Coordinate>, max_iter: u32) -> u32 {
        core.set_signal("rst_i", 1).unwrap();
        tick(core);
        core.set_signal("rst_i", 0).unwrap();
        let pins = core.pins().clone();
        core.set_signal(&pins.x0, x0.to_bits() as u64).unwrap();
        core.set_signal(&pins.y0, y0.to_bits() as u64).unwrap();
        if let Some(c) = c {
            core.set_signal(&pins.cx, Fixed::encode(c.x).unwrap().to_bits() as u64)
                .unwrap();
            core.set_signal(&pins.cy, Fixed::encode(c.y).unwrap().to_bits() as u64)
                .unwrap();
        }
        core.set_signal("max_iter_i", max_iter as u64).unwrap();
        core.set_signal("start_i", 1).unwrap();
        tick(core);
        core.set_signal("start_i", 0).unwrap();
        for _ in 0..100_000 {
            if core.get_signal("done_o").unwrap() == 1 {
                return core.get_signal("iter_o").unwrap() as u32;
            }
            tick(core);
        }
        panic!("core never finished");
    }

    fn fx(v: f64) -> Fixed {
        Fixed::encode(v).unwrap()
    }

    #[test]
    fn origin_runs_to_cap() {
        let mut core = EscapeCore::new(CoreKind::Mandelbrot);
        assert_eq!(run_point(&mut core, fx(0.0), fx(0.0), None, 1000), 1000);
    }

    #[test]
    fn exact_points_match_reference() {
        let mut core = EscapeCore::new(CoreKind::Mandelbrot);
        for &(x, y, n) in &[(1.0, 1.0, 1000), (-2.5, 0.0, 100), (-1.0, 0.0, 300), (-2.0, 0.0, 50)] {
            assert_eq!(
                run_point(&mut core, fx(x), fx(y), None, n),
                fractb_oracle::mandelbrot_iterations(x, y, n),
                "mismatch at ({x}, {y})"
            );
        }
    }

    #[test]
    fn zero_cap_finishes_immediately() {
        let mut core = EscapeCore::new(CoreKind::Mandelbrot);
        assert_eq!(run_point(&mut core, fx(0.0), fx(0.0), None, 0), 0);
    }

    #[test]
    fn julia_seed_outside_radius() {
        let mut core = EscapeCore::new(CoreKind::Julia);
        let c = Some(Coordinate::new(-0.8, 0.156));
        assert_eq!(run_point(&mut core, fx(3.0), fx(0.0), c, 1000), 0);
    }

    #[test]
    fn large_seeds_escape_without_wrapping() {
        let mut core = EscapeCore::new(CoreKind::Julia);
        let c = Some(Coordinate::new(0.0, 0.0));
        for &(x, y) in &[(12.0, 0.0), (0.0, -20.0), (100.0, 100.0), (-127.5, 127.5)] {
            assert_eq!(run_point(&mut core, fx(x), fx(y), c, 100), 0, "seed ({x}, {y})");
        }
    }

    #[test]
    fn julia_zero_constant_unit_disk() {
        let mut core = EscapeCore::new(CoreKind::Julia);
        let c = Some(Coordinate::new(0.0, 0.0));
        assert_eq!(run_point(&mut core, fx(0.5), fx(0.5), c, 200), 200);
    }

    #[test]
    fn reset_clears_done() {
        let mut core = EscapeCore::new(CoreKind::Mandelbrot);
        run_point(&mut core, fx(1.0), fx(1.0), None, 10);
        assert_eq!(core.get_signal("done_o").unwrap(), 1);
        core.set_signal("rst_i", 1).unwrap();
        tick(&mut core);
        assert_eq!(core.get_signal("done_o").unwrap(), 0);
        assert_eq!(core.get_signal("iter_o").unwrap(), 0);
    }

    #[test]
    fn state_changes_only_on_rising_edge() {
        let mut core = EscapeCore::new(CoreKind::Mandelbrot);
        core.set_signal("max_iter_i", 0).unwrap();
        core.set_signal("start_i", 1).unwrap();
        core.set_signal("clk_i", 0).unwrap();
        core.step().unwrap();
        core.step().unwrap();
        assert_eq!(core.get_signal("done_o").unwrap(), 0);
        core.set_signal("clk_i", 1).unwrap();
        core.step().unwrap();
        core.set_signal("start_i", 0).unwrap();
        core.step().unwrap();
        tick(&mut core);
        assert_eq!(core.get_signal("done_o").unwrap(), 1);
    }

    #[test]
    fn iteration_latency_stretches_run() {
        let mut fast = EscapeCore::new(CoreKind::Mandelbrot);
        let mut slow = EscapeCore::new(CoreKind::Mandelbrot).with_iteration_latency(3);
        assert_eq!(slow.worst_case_toggles(10), 3 * fast.worst_case_toggles(10));
        assert_eq!(
            run_point(&mut fast, fx(1.0), fx(1.0), None, 10),
            run_point(&mut slow, fx(1.0), fx(1.0), None, 10)
        );
    }

    #[test]
    fn inputs_read_back() {
        let mut core = EscapeCore::new(CoreKind::Julia);
        core.set_signal("cx_i", fx(-0.8).to_bits() as u64).unwrap();
        assert_eq!(
            core.get_signal("cx_i").unwrap(),
            fx(-0.8).to_bits() as u64
        );
    }

    #[test]
    fn unknown_signal_errors() {
        let core = EscapeCore::new(CoreKind::Mandelbrot);
        assert!(matches!(
            core.get_signal("bogus"),
            Err(DutError::UnknownSignal { .. })
        ));
    }
}
