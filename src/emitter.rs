//! Turns TMS/TDI/TDO bit sequences into clocked value changes on a `Sink`.
//!
//! Every clock period takes two steps: at the first the clock goes low and the sampled lines
//! take their new values, at the second the clock rises.  The step is passed into every call and
//! the next free step is returned, so the caller decides where a transaction lands.
use embedded_hal::digital::PinState;
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::sink::{Signal, SignalDecl, Sink};

/// Scope holding the four JTAG lines in the trace
pub const SCOPE: &str = "capture";

/// Handles for the four JTAG lines
#[derive(Clone, Copy, Debug)]
pub struct Lines {
    pub tck: Signal,
    pub tms: Signal,
    pub tdi: Signal,
    pub tdo: Signal,
}

pub struct Emitter<T> {
    pub sink: T,
    lines: Lines,
}

impl<T, U> Emitter<T>
    where T: core::ops::DerefMut<Target=U>,
          U: Sink + ?Sized
{
    /// Declare tck, tms, tdi and tdo on `sink`, in that order
    pub fn new(mut sink: T) -> Result<Self> {
        let tck = sink.declare_signal(SignalDecl::wire(SCOPE, "tck"))?;
        let tms = sink.declare_signal(SignalDecl::wire(SCOPE, "tms"))?;
        let tdi = sink.declare_signal(SignalDecl::wire(SCOPE, "tdi"))?;
        let tdo = sink.declare_signal(SignalDecl::wire(SCOPE, "tdo"))?;

        Ok(Self {
            sink,
            lines: Lines { tck, tms, tdi, tdo },
        })
    }

    pub fn lines(&self) -> Lines {
        self.lines
    }

    fn change(&mut self, signal: Signal, step: u64, value: PinState) -> Result<()> {
        trace!("step {}: signal {} = {:?}", step, signal.index(), value);
        self.sink.record_change(signal, step, value)
    }

    /// One clock period with `signal` set to `value` while the clock is low
    pub fn clock_one(&mut self, signal: Signal, step: u64, value: PinState) -> Result<u64> {
        let tck = self.lines.tck;
        self.change(tck, step, PinState::Low)?;
        self.change(signal, step, value)?;
        self.change(tck, step + 1, PinState::High)?;
        Ok(step + 2)
    }

    /// One clock period with every signal in `signals` set to the matching entry of `values`
    /// while the clock is low
    pub fn clock_many(&mut self, signals: &[Signal], step: u64, values: &[PinState])
        -> Result<u64>
    {
        if signals.len() != values.len() {
            return Err(Error::LengthMismatch { signals: signals.len(), values: values.len() });
        }

        let tck = self.lines.tck;
        self.change(tck, step, PinState::Low)?;
        for (signal, value) in signals.iter().zip(values) {
            self.change(*signal, step, *value)?;
        }
        self.change(tck, step + 1, PinState::High)?;
        Ok(step + 2)
    }

    /// Clock `tms` out on the mode-select line, one bit per period.  TDI is driven low first,
    /// even when `tms` is empty: downstream traces expect that framing change, so an empty
    /// sequence still records it and returns `step` untouched.
    pub fn send_mode(&mut self, mut step: u64, tms: &[PinState]) -> Result<u64> {
        debug!("step {}: mode {}", step, bits_to_string(tms));
        let tdi = self.lines.tdi;
        self.change(tdi, step, PinState::Low)?;

        let line = self.lines.tms;
        for bit in tms {
            step = self.clock_one(line, step, *bit)?;
        }
        Ok(step)
    }

    /// Shift `data` into the device on TDI, most significant bit first.  TMS is low for every
    /// period except the last, where it goes high to leave the shift state.
    pub fn send_data(&mut self, step: u64, data: &[PinState]) -> Result<u64> {
        debug!("step {}: tdi {}", step, bits_to_string(data));
        let tdi = self.lines.tdi;
        self.shift(tdi, "tdi", step, data)
    }

    /// Record `data` coming out of the device on TDO, with the same framing as `send_data`
    pub fn receive_data(&mut self, step: u64, data: &[PinState]) -> Result<u64> {
        debug!("step {}: tdo {}", step, bits_to_string(data));
        let tdo = self.lines.tdo;
        self.shift(tdo, "tdo", step, data)
    }

    fn shift(&mut self, line: Signal, name: &'static str, mut step: u64, data: &[PinState])
        -> Result<u64>
    {
        let (last, rest) = match data.split_last() {
            Some(split) => split,
            None => return Err(Error::EmptyPayload { line: name }),
        };

        // First step => clear TMS
        let tms = self.lines.tms;
        self.change(tms, step, PinState::Low)?;

        for bit in rest {
            step = self.clock_one(line, step, *bit)?;
        }

        // Last step => set TMS to exit the shift state
        self.clock_many(&[line, tms], step, &[*last, PinState::High])
    }
}

fn bits_to_string(bits: &[PinState]) -> String {
    bits.iter().map(|b| crate::sink::bit_char(*b)).collect()
}
