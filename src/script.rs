//! Transaction scripts: the sequence of TMS walks and data shifts that make up a trace.
//!
//! `ScriptBuilder` tracks the TAP state as transactions are added, so TMS walks are computed
//! from the target state rather than written out by hand.
use embedded_hal::digital::PinState;
use log::debug;

use crate::emitter::Emitter;
use crate::error::{Error, Result};
use crate::sink::Sink;
use crate::statemachine::{path, JtagState, RESET_SEQUENCE};

/// Instruction selecting the IDCODE register
pub const IDCODE_INSTRUCTION: u8 = 0x04;
/// IDCODE the fixture device reports
pub const DEFAULT_IDCODE: u32 = 0x0015_A083;

/// Parse a string of `0` and `1` characters
pub fn parse_bits(s: &str) -> Result<Vec<PinState>> {
    s.chars()
        .map(|c| match c {
            '0' => Ok(PinState::Low),
            '1' => Ok(PinState::High),
            _ => Err(Error::InvalidBit(c)),
        })
        .collect()
}

/// The low `width` bits of `value`, most significant first
pub fn msb_first(value: u64, width: usize) -> Vec<PinState> {
    (0..width)
        .rev()
        .map(|i| PinState::from(i < 64 && (value >> i) & 1 == 1))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    /// Walk the TAP state machine
    Mode(Vec<PinState>),
    /// Shift bits into the device on TDI
    DataIn(Vec<PinState>),
    /// Bits the device shifts out on TDO
    DataOut(Vec<PinState>),
}

impl Transaction {
    /// Number of clock periods this transaction takes
    pub fn periods(&self) -> usize {
        match self {
            Transaction::Mode(bits)
            | Transaction::DataIn(bits)
            | Transaction::DataOut(bits) => bits.len(),
        }
    }

    pub fn apply<T, U>(&self, emitter: &mut Emitter<T>, step: u64) -> Result<u64>
        where T: core::ops::DerefMut<Target=U>,
              U: Sink + ?Sized
    {
        match self {
            Transaction::Mode(bits) => emitter.send_mode(step, bits),
            Transaction::DataIn(bits) => emitter.send_data(step, bits),
            Transaction::DataOut(bits) => emitter.receive_data(step, bits),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    transactions: Vec<Transaction>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Total clock periods; a run advances the step by twice this
    pub fn periods(&self) -> usize {
        self.transactions.iter().map(Transaction::periods).sum()
    }

    /// Reset the TAP, load `instruction` into the 8-bit instruction register, read the 32-bit
    /// `idcode` back out of the data register and return to Idle.
    pub fn read_idcode(instruction: u8, idcode: u32) -> Result<Self> {
        let mut b = ScriptBuilder::new();
        b.reset();
        b.goto(JtagState::ShiftIR)?;
        b.shift_in(&msb_first(instruction.into(), 8))?;
        b.goto(JtagState::ShiftDR)?;
        b.shift_out(&msb_first(idcode.into(), 32))?;
        b.goto(JtagState::Idle)?;
        Ok(b.build())
    }

    /// Play every transaction through `emitter` starting at `step`.  Returns the next free step.
    pub fn run<T, U>(&self, emitter: &mut Emitter<T>, mut step: u64) -> Result<u64>
        where T: core::ops::DerefMut<Target=U>,
              U: Sink + ?Sized
    {
        for t in &self.transactions {
            step = t.apply(emitter, step)?;
        }
        Ok(step)
    }
}

/// Builds a `Script` while keeping track of where the TAP ends up
pub struct ScriptBuilder {
    // None until the first reset
    state: Option<JtagState>,
    script: Script,
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self {
            state: None,
            script: Script::new(),
        }
    }

    pub fn state(&self) -> Option<JtagState> {
        self.state
    }

    /// Drive TMS high for 5 clocks, then low, leaving the TAP in Idle
    pub fn reset(&mut self) {
        self.script.push(Transaction::Mode(RESET_SEQUENCE.to_vec()));
        self.state = Some(JtagState::Idle);
        debug!("reset -> {:?}", JtagState::Idle);
    }

    /// Walk to `target` by the shortest TMS sequence
    pub fn goto(&mut self, target: JtagState) -> Result<()> {
        let current = self.state.ok_or(Error::UnknownState)?;
        if current == target {
            return Ok(());
        }
        let tms = path(current, target);
        debug!("{:?} -> {:?} in {} clocks", current, target, tms.len());
        self.script.push(Transaction::Mode(tms));
        self.state = Some(target);
        Ok(())
    }

    /// Shift `data` in on TDI.  Must be in ShiftIR or ShiftDR; ends in the matching Exit1 state.
    pub fn shift_in(&mut self, data: &[PinState]) -> Result<()> {
        self.check_shift(data, "tdi")?;
        self.script.push(Transaction::DataIn(data.to_vec()));
        self.exit_shift();
        Ok(())
    }

    /// Expect `data` out on TDO.  Must be in ShiftIR or ShiftDR; ends in the matching Exit1 state.
    pub fn shift_out(&mut self, data: &[PinState]) -> Result<()> {
        self.check_shift(data, "tdo")?;
        self.script.push(Transaction::DataOut(data.to_vec()));
        self.exit_shift();
        Ok(())
    }

    fn check_shift(&self, data: &[PinState], line: &'static str) -> Result<()> {
        let state = self.state.ok_or(Error::UnknownState)?;
        if !state.is_shift() {
            return Err(Error::NotShifting(state));
        }
        if data.is_empty() {
            return Err(Error::EmptyPayload { line });
        }
        Ok(())
    }

    // The last bit of a shift is clocked with TMS high
    fn exit_shift(&mut self) {
        self.state = self.state.map(|s| s.next(PinState::High));
    }

    pub fn build(self) -> Script {
        self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::memory::MemorySink;

    fn bits(s: &str) -> Vec<PinState> {
        parse_bits(s).unwrap()
    }

    #[test]
    fn parse_and_expand() {
        assert_eq!(bits("10"), vec![PinState::High, PinState::Low]);
        assert!(matches!(parse_bits("1x0"), Err(Error::InvalidBit('x'))));
        assert_eq!(msb_first(4, 8), bits("00000100"));
        assert_eq!(msb_first(0x15A083, 32), bits(&format!("{:032b}", 0x15A083)));
        assert!(msb_first(0, 0).is_empty());
    }

    #[test]
    fn idcode_script_matches_hand_written_walk() {
        let script = Script::read_idcode(IDCODE_INSTRUCTION, DEFAULT_IDCODE).unwrap();
        let expected = vec![
            Transaction::Mode(bits("111110")),
            Transaction::Mode(bits("1100")),
            Transaction::DataIn(bits("00000100")),
            Transaction::Mode(bits("1100")),
            Transaction::DataOut(bits("00000000000101011010000010000011")),
            Transaction::Mode(bits("10")),
        ];
        assert_eq!(script.transactions(), expected.as_slice());
        assert_eq!(script.periods(), 56);
    }

    #[test]
    fn idcode_script_runs_to_step_112() {
        let script = Script::read_idcode(IDCODE_INSTRUCTION, DEFAULT_IDCODE).unwrap();
        let mut sink = MemorySink::new();
        let mut emitter = Emitter::new(&mut sink).unwrap();
        let lines = emitter.lines();

        assert_eq!(script.run(&mut emitter, 0).unwrap(), 112);

        let last = sink.events().last().unwrap();
        assert_eq!(last.signal, lines.tck);
        assert_eq!(last.step, 111);
        assert_eq!(sink.events_for(lines.tck).len(), 112);
    }

    #[test]
    fn builder_tracks_state() {
        let mut b = ScriptBuilder::new();
        assert!(matches!(b.goto(JtagState::Idle), Err(Error::UnknownState)));
        assert!(matches!(b.shift_in(&bits("1")), Err(Error::UnknownState)));

        b.reset();
        assert_eq!(b.state(), Some(JtagState::Idle));
        assert!(matches!(b.shift_in(&bits("1")), Err(Error::NotShifting(JtagState::Idle))));

        b.goto(JtagState::ShiftDR).unwrap();
        assert!(matches!(b.shift_out(&[]), Err(Error::EmptyPayload { line: "tdo" })));
        b.shift_out(&bits("01")).unwrap();
        assert_eq!(b.state(), Some(JtagState::Exit1DR));

        // no transaction for a walk to where we already are
        b.goto(JtagState::Exit1DR).unwrap();
        assert_eq!(b.build().transactions().len(), 3);
    }
}
