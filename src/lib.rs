//! This crate generates waveform fixtures of JTAG bus traffic.  Nothing talks to hardware: the
//! TCK, TMS, TDI and TDO lines are synthesized and written as value changes to a trace, by
//! default a VCD file that any waveform viewer can open.
//!
//! At the lowest level is the `Sink` trait, which only knows how to declare 1-bit signals and
//! record changes on them.  `VcdSink` encodes to VCD, `MemorySink` keeps everything in memory so
//! it can be inspected.
//!
//! On top of a sink sits the `Emitter`, which clocks bits out one period at a time (two steps
//! per period) and provides the three JTAG transactions: walking the TAP with TMS, shifting data
//! in on TDI and shifting data out on TDO.  The current step is passed in and returned by every
//! call.
//!
//! The `Script` layer strings transactions together.  `ScriptBuilder` follows the TAP state
//! machine so you can ask for a state (e.g., ShiftIR) and it works out the TMS sequence, and
//! `Script::read_idcode` is the canned IDCODE read the command line tool writes.
//!
//! # Example
//! ```
//! use jtag_vcd::emitter::Emitter;
//! use jtag_vcd::script::{Script, DEFAULT_IDCODE, IDCODE_INSTRUCTION};
//! use jtag_vcd::sink::vcd::VcdSink;
//! use jtag_vcd::sink::Sink;
//!
//! let mut out = Vec::new();
//! let mut sink = VcdSink::new(&mut out, "Mon Jan  1 00:00:00 2024");
//! let mut emitter = Emitter::new(&mut sink).unwrap();
//! let script = Script::read_idcode(IDCODE_INSTRUCTION, DEFAULT_IDCODE).unwrap();
//! assert_eq!(script.run(&mut emitter, 0).unwrap(), 112);
//! sink.finish().unwrap();
//! ```
use std::io::Write;

use log::info;

pub mod emitter;
pub mod error;
pub mod script;
pub mod sink;
pub mod statemachine;

pub use error::{Error, Result};

use emitter::Emitter;
use script::{Script, DEFAULT_IDCODE, IDCODE_INSTRUCTION};
use sink::vcd::VcdSink;
use sink::Sink;

/// Write the IDCODE read fixture as VCD to `out`, stamped with `date`.  Returns the step after
/// the last clock period.
pub fn generate<W: Write>(out: W, date: &str) -> Result<u64> {
    let script = Script::read_idcode(IDCODE_INSTRUCTION, DEFAULT_IDCODE)?;

    let mut sink = VcdSink::new(out, date);
    let mut emitter = Emitter::new(&mut sink)?;
    let step = script.run(&mut emitter, 0)?;
    sink.finish()?;

    info!("{} transactions, {} clock periods, final step {}",
          script.transactions().len(), script.periods(), step);
    Ok(step)
}
