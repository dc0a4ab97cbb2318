//! Implement the `Sink` trait on top of the `vcd` crate's writer.
//!
//! Declarations are buffered and the header is written when the first change arrives, so the
//! emitter can declare its signals and start clocking without a separate "end of definitions"
//! call.  Changes that don't alter a signal's value are dropped and a `#step` line is only
//! written when something actually changes at that step.
use std::io::Write;

use ::vcd::{IdCode, SimulationCommand, TimescaleUnit, Value, Writer};
use embedded_hal::digital::PinState;
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::sink::{bit_char, Signal, SignalDecl, Sink};

/// Every step is one nanosecond
pub const TIMESCALE_NS: u32 = 1;

fn level(value: PinState) -> Value {
    match value {
        PinState::Low => Value::V0,
        PinState::High => Value::V1,
    }
}

struct Var {
    decl: SignalDecl,
    code: Option<IdCode>,
    value: PinState,
}

pub struct VcdSink<W: Write> {
    writer: Writer<W>,
    date: String,
    vars: Vec<Var>,
    // None until the header has been written
    now: Option<u64>,
    // latest step handed to record_change, written or not
    latest: u64,
}

impl<W: Write> VcdSink<W> {
    /// Wrap `out`.  `date` goes verbatim into the `$date` section.
    pub fn new(out: W, date: &str) -> Self {
        Self {
            writer: Writer::new(out),
            date: date.into(),
            vars: Vec::new(),
            now: None,
            latest: 0,
        }
    }

    fn write_header(&mut self) -> Result<()> {
        self.writer.date(&self.date)?;
        self.writer.timescale(TIMESCALE_NS, TimescaleUnit::NS)?;

        // One module per scope, in the order the scopes were first seen
        let mut scopes: Vec<String> = Vec::new();
        for v in &self.vars {
            if !scopes.contains(&v.decl.scope) {
                scopes.push(v.decl.scope.clone());
            }
        }
        for scope in &scopes {
            self.writer.add_module(scope)?;
            for v in self.vars.iter_mut().filter(|v| &v.decl.scope == scope) {
                v.code = Some(self.writer.add_wire(v.decl.width, &v.decl.name)?);
            }
            self.writer.upscope()?;
        }
        self.writer.enddefinitions()?;

        self.writer.timestamp(0)?;
        self.writer.begin(SimulationCommand::Dumpvars)?;
        for v in &self.vars {
            if let Some(code) = v.code {
                self.writer.change_scalar(code, level(v.value))?;
            }
        }
        self.writer.end()?;

        debug!("vcd header written with {} signals in {} scopes", self.vars.len(), scopes.len());
        self.now = Some(0);
        Ok(())
    }
}

impl<W: Write> Sink for VcdSink<W> {
    fn declare_signal(&mut self, decl: SignalDecl) -> Result<Signal> {
        if self.now.is_some() {
            return Err(Error::DeclarationClosed);
        }
        let value = decl.init;
        self.vars.push(Var { decl, code: None, value });
        Ok(Signal::new(self.vars.len() - 1))
    }

    fn record_change(&mut self, signal: Signal, step: u64, value: PinState) -> Result<()> {
        if signal.index() >= self.vars.len() {
            return Err(Error::UnknownSignal(signal));
        }
        if self.now.is_none() {
            self.write_header()?;
        }
        if step < self.latest {
            return Err(Error::StepRegression { step, current: self.latest });
        }
        self.latest = step;
        let now = self.now.unwrap_or(0);

        let var = &mut self.vars[signal.index()];
        if var.value == value {
            return Ok(());
        }
        var.value = value;
        let code = match var.code {
            Some(code) => code,
            None => return Err(Error::UnknownSignal(signal)),
        };
        trace!("#{} {}{}", step, bit_char(value), var.decl.name);

        if step > now {
            self.writer.timestamp(step)?;
            self.now = Some(step);
        }
        self.writer.change_scalar(code, level(value))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.now.is_none() {
            self.write_header()?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
