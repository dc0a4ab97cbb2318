//! Destinations for the value changes produced by the emitter.  A sink only has to be able to
//! declare 1-bit signals and record timestamped changes on them; the encoding is up to the
//! implementation.  `vcd::VcdSink` writes a VCD file, `memory::MemorySink` keeps every event for
//! inspection.
use embedded_hal::digital::PinState;

use crate::error::Result;

pub mod memory;
pub mod vcd;

/// Handle to a signal declared on a sink.  Only meaningful to the sink that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signal(usize);

impl Signal {
    pub(crate) fn new(index: usize) -> Self {
        Signal(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Everything a sink needs to know about a signal up front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalDecl {
    pub scope: String,
    pub name: String,
    pub width: u32,
    pub init: PinState,
}

impl SignalDecl {
    /// A 1-bit wire starting low
    pub fn wire(scope: &str, name: &str) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
            width: 1,
            init: PinState::Low,
        }
    }
}

pub trait Sink {
    /// Register a signal.  Must be called before the first `record_change`.
    fn declare_signal(&mut self, decl: SignalDecl) -> Result<Signal>;
    /// Record that `signal` holds `value` from `step` onwards.  Steps must not go backwards.
    fn record_change(&mut self, signal: Signal, step: u64, value: PinState) -> Result<()>;
    /// Flush anything buffered.  Called once at the end of a successful run.
    fn finish(&mut self) -> Result<()>;
}

/// `0` or `1`, as drawn in the trace
pub fn bit_char(value: PinState) -> char {
    match value {
        PinState::Low => '0',
        PinState::High => '1',
    }
}
