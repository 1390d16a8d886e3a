//! The DSKY command surface: keypad input, verb/noun interpreter, display registers and
//! status lamps.

mod code;
mod command_state;
pub(crate) mod dictionary;
mod directive;
mod dsky_context;
mod indicators;
mod interpreter;
mod key;
mod noun_layout;
mod program;


pub use code::{Code, CodeParseError, Register};
pub use command_state::{CodeField, CommandState};
pub use directive::{Directive, LampTestSnapshot};
pub use dsky_context::DskyContext;
pub use indicators::{IndicatorName, IndicatorSet};
pub use interpreter::{CommandInterpreter, InterpreterState};
pub use key::{Key, KeyParseError};
pub use noun_layout::{NounLayout, RegisterSource};
pub use program::{PendingConfirmation, Program};
