use super::code::{Code, Register};
use std::fmt;

/// Contents of the VERB or NOUN window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeField {
    /// A committed code.
    Set(Code),
    /// Digits echoed while the operator types, blank right after VERB/NOUN.
    Typing(String),
}

impl CodeField {
    /// The committed code, `None` while typing.
    pub fn code(&self) -> Option<Code> {
        match self {
            CodeField::Set(c) => Some(*c),
            CodeField::Typing(_) => None,
        }
    }

    /// Whether a non-zero code is committed.
    pub fn is_set_nonzero(&self) -> bool { self.code().is_some_and(|c| !c.is_zero()) }
}

impl Default for CodeField {
    fn default() -> Self { CodeField::Set(Code::ZERO) }
}

impl fmt::Display for CodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeField::Set(c) => write!(f, "{c}"),
            CodeField::Typing(buffer) => write!(f, "{buffer:<2}"),
        }
    }
}

/// Everything the DSKY windows show, written only by the command interpreter.
///
/// While `priority_lock` is set the verb, noun and registers hold the alarm display
/// (`V05 N09`, R1 = alarm code) and ignore ordinary updates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandState {
    pub program: Code,
    pub verb: CodeField,
    pub noun: CodeField,
    pub registers: [Register; 3],
    pub priority_lock: bool,
    pub alarm_code: Option<String>,
}

impl CommandState {
    /// Fresh display for a scenario start.
    pub fn new(program: Code, verb: Code, noun: Code) -> Self {
        Self {
            program,
            verb: CodeField::Set(verb),
            noun: CodeField::Set(noun),
            registers: [Register::zero(), Register::zero(), Register::zero()],
            priority_lock: false,
            alarm_code: None,
        }
    }

    pub fn r1(&self) -> &Register { &self.registers[0] }
    pub fn r2(&self) -> &Register { &self.registers[1] }
    pub fn r3(&self) -> &Register { &self.registers[2] }

    /// Committed verb, zero while the field is being typed.
    pub fn verb_code(&self) -> Code { self.verb.code().unwrap_or(Code::ZERO) }

    /// Committed noun, zero while the field is being typed.
    pub fn noun_code(&self) -> Code { self.noun.code().unwrap_or(Code::ZERO) }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PROG {} VERB {} NOUN {} | R1 {} R2 {} R3 {}",
            self.program, self.verb, self.noun, self.r1(), self.r2(), self.r3()
        )
    }
}
