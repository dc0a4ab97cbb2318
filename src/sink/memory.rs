//! A `Sink` that keeps every declaration and change in memory
use embedded_hal::digital::PinState;

use crate::error::{Error, Result};
use crate::sink::{Signal, SignalDecl, Sink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub signal: Signal,
    pub step: u64,
    pub value: PinState,
}

/// Records events verbatim, repeats included, so tests can check exactly what the emitter did.
#[derive(Default)]
pub struct MemorySink {
    decls: Vec<SignalDecl>,
    events: Vec<Event>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declarations(&self) -> &[SignalDecl] {
        &self.decls
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Look up a declared signal by name
    pub fn signal(&self, name: &str) -> Option<Signal> {
        self.decls.iter().position(|d| d.name == name).map(Signal::new)
    }

    /// Events recorded on one signal, in order
    pub fn events_for(&self, signal: Signal) -> Vec<Event> {
        self.events.iter().filter(|e| e.signal == signal).copied().collect()
    }

    /// Events recorded at one step, in order
    pub fn events_at(&self, step: u64) -> Vec<Event> {
        self.events.iter().filter(|e| e.step == step).copied().collect()
    }
}

impl Sink for MemorySink {
    fn declare_signal(&mut self, decl: SignalDecl) -> Result<Signal> {
        if !self.events.is_empty() {
            return Err(Error::DeclarationClosed);
        }
        self.decls.push(decl);
        Ok(Signal::new(self.decls.len() - 1))
    }

    fn record_change(&mut self, signal: Signal, step: u64, value: PinState) -> Result<()> {
        if signal.index() >= self.decls.len() {
            return Err(Error::UnknownSignal(signal));
        }
        if let Some(last) = self.events.last() {
            if step < last.step {
                return Err(Error::StepRegression { step, current: last.step });
            }
        }
        self.events.push(Event { signal, step, value });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
