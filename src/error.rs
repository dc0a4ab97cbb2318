//! Error type shared by the sinks, the emitter and the script builder.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::sink::Signal;
use crate::statemachine::JtagState;

#[derive(Error, Debug)]
pub enum Error {
    #[error("trace write error: {0}")]
    Io(#[from] io::Error),

    #[error("could not create {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{signals} signals clocked with {values} values")]
    LengthMismatch { signals: usize, values: usize },

    #[error("empty payload shifted on {line}")]
    EmptyPayload { line: &'static str },

    #[error("step {step} is earlier than the current step {current}")]
    StepRegression { step: u64, current: u64 },

    #[error("signal {0:?} was not declared on this sink")]
    UnknownSignal(Signal),

    #[error("signals cannot be declared once value changes were recorded")]
    DeclarationClosed,

    #[error("invalid bit {0:?}, expected '0' or '1'")]
    InvalidBit(char),

    #[error("TAP state is unknown, reset first")]
    UnknownState,

    #[error("cannot shift data in state {0:?}")]
    NotShifting(JtagState),
}

pub type Result<T> = std::result::Result<T, Error>;
