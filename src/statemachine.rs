//! The JTAG TAP controller state machine.  `JtagState::next` follows one TMS bit, and `path`
//! finds the shortest TMS sequence from one state to another, which is how the script builder
//! decides what to clock out on TMS between transactions.
use embedded_hal::digital::PinState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JtagState {
    Reset = 0,
    Idle = 1,
    SelectDR = 2,
    CaptureDR = 3,
    ShiftDR = 4,
    Exit1DR = 5,
    PauseDR = 6,
    Exit2DR = 7,
    UpdateDR = 8,
    SelectIR = 9,
    CaptureIR = 10,
    ShiftIR = 11,
    Exit1IR = 12,
    PauseIR = 13,
    Exit2IR = 14,
    UpdateIR = 15,
}

/// Drive TMS high for 5 clocks to reach Reset from anywhere, then low once to settle in Idle
pub const RESET_SEQUENCE: [PinState; 6] = [
    PinState::High,
    PinState::High,
    PinState::High,
    PinState::High,
    PinState::High,
    PinState::Low,
];

impl JtagState {
    pub const ALL: [JtagState; 16] = [
        JtagState::Reset,
        JtagState::Idle,
        JtagState::SelectDR,
        JtagState::CaptureDR,
        JtagState::ShiftDR,
        JtagState::Exit1DR,
        JtagState::PauseDR,
        JtagState::Exit2DR,
        JtagState::UpdateDR,
        JtagState::SelectIR,
        JtagState::CaptureIR,
        JtagState::ShiftIR,
        JtagState::Exit1IR,
        JtagState::PauseIR,
        JtagState::Exit2IR,
        JtagState::UpdateIR,
    ];

    /// Successors as `[tms low, tms high]`
    fn edges(self) -> [JtagState; 2] {
        use JtagState::*;
        match self {
            Reset     => [Idle, Reset],
            Idle      => [Idle, SelectDR],
            SelectDR  => [CaptureDR, SelectIR],
            CaptureDR => [ShiftDR, Exit1DR],
            ShiftDR   => [ShiftDR, Exit1DR],
            Exit1DR   => [PauseDR, UpdateDR],
            PauseDR   => [PauseDR, Exit2DR],
            Exit2DR   => [ShiftDR, UpdateDR],
            UpdateDR  => [Idle, SelectDR],
            SelectIR  => [CaptureIR, Reset],
            CaptureIR => [ShiftIR, Exit1IR],
            ShiftIR   => [ShiftIR, Exit1IR],
            Exit1IR   => [PauseIR, UpdateIR],
            PauseIR   => [PauseIR, Exit2IR],
            Exit2IR   => [ShiftIR, UpdateIR],
            UpdateIR  => [Idle, SelectDR],
        }
    }

    /// State after one clock with TMS at `tms`
    pub fn next(self, tms: PinState) -> JtagState {
        match tms {
            PinState::Low => self.edges()[0],
            PinState::High => self.edges()[1],
        }
    }

    /// State after clocking out every bit of `tms`
    pub fn walk(self, tms: &[PinState]) -> JtagState {
        tms.iter().fold(self, |state, bit| state.next(*bit))
    }

    /// Whether data shifts through TDI/TDO in this state
    pub fn is_shift(self) -> bool {
        matches!(self, JtagState::ShiftDR | JtagState::ShiftIR)
    }
}

#[derive(Clone)]
struct Path {
    path: Vec<PinState>,
    state: JtagState,
}

/// Shortest TMS sequence that takes the TAP from `from` to `to`.  Ties go to the path that takes
/// the TMS-low edge first.  Empty when already there.
pub fn path(from: JtagState, to: JtagState) -> Vec<PinState> {
    if from == to {
        return Vec::new();
    }

    let mut paths = vec![Path { path: Vec::new(), state: from }];
    let mut seen = [false; 16];
    seen[from as usize] = true;

    // Every state is reachable from every other, so this terminates within 16 rounds
    loop {
        let mut newpaths = Vec::new();

        for p in paths {
            for tms in [PinState::Low, PinState::High] {
                let mut p1 = p.clone();
                p1.state = p.state.next(tms);
                p1.path.push(tms);

                if p1.state == to {
                    return p1.path;
                }
                if !seen[p1.state as usize] {
                    seen[p1.state as usize] = true;
                    newpaths.push(p1);
                }
            }
        }

        paths = newpaths;
    }
}
