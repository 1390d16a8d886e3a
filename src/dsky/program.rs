use super::code::Code;
use strum_macros::{Display, EnumIter};

/// Programs the interpreter accepts through `V37`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Program {
    Idle,
    BrakingPhase,
    ApproachPhase,
    ManualDescent,
}

impl Program {
    /// Codes that count as a landing program for the ALT/VEL lamps.
    const LANDING_CODES: [u8; 3] = [63, 64, 66];

    pub fn from_code(code: Code) -> Option<Program> {
        match code.value() {
            0 => Some(Program::Idle),
            63 => Some(Program::BrakingPhase),
            64 => Some(Program::ApproachPhase),
            66 => Some(Program::ManualDescent),
            _ => None,
        }
    }

    pub fn code(self) -> Code {
        let value = match self {
            Program::Idle => 0,
            Program::BrakingPhase => 63,
            Program::ApproachPhase => 64,
            Program::ManualDescent => 66,
        };
        Code::new(value).unwrap_or(Code::ZERO)
    }

    pub fn is_landing(code: Code) -> bool { Self::LANDING_CODES.contains(&code.value()) }

    /// Throttle applied when this program's ignition is confirmed.
    pub fn ignition_thrust(self) -> f64 {
        match self {
            Program::BrakingPhase => 10.0,
            _ => 0.0,
        }
    }
}

/// An action armed by a program selection that waits for the operator's PRO.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmation {
    /// Light the descent engine for the given program.
    Ignition { program: Program },
}
