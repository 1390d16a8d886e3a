use std::fmt;
use std::str::FromStr;
use strum_macros::Display;

/// A two-digit decimal code as shown in the PROG, VERB and NOUN windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code(u8);

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum CodeParseError {
    #[strum(to_string = "code `{text}` must be one or two decimal digits")]
    Malformed { text: String },
}

impl std::error::Error for CodeParseError {}

impl Code {
    pub const ZERO: Code = Code(0);

    /// Creates a code, `None` above 99.
    pub const fn new(value: u8) -> Option<Code> {
        if value <= 99 { Some(Code(value)) } else { None }
    }

    pub const fn value(self) -> u8 { self.0 }
    pub const fn is_zero(self) -> bool { self.0 == 0 }

    /// Commits a keypad buffer of up to two digits, left-padded with zeros.
    /// An empty buffer commits `00`.
    pub fn from_buffer(buffer: &str) -> Result<Code, CodeParseError> {
        if buffer.is_empty() {
            return Ok(Code::ZERO);
        }
        buffer.parse()
    }
}

impl FromStr for Code {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.len() > 2 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeParseError::Malformed { text: s.to_string() });
        }
        trimmed
            .parse::<u8>()
            .map(Code)
            .map_err(|_| CodeParseError::Malformed { text: s.to_string() })
    }
}

impl TryFrom<String> for Code {
    type Error = CodeParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<Code> for String {
    fn from(value: Code) -> Self { value.to_string() }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:02}", self.0) }
}

/// One of the three five-digit data registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Register {
    /// Sign and up to five decimal digits.
    Numeric { negative: bool, magnitude: u32 },
    /// Verbatim text, used for alarm codes.
    Raw(String),
}

impl Register {
    pub const MAX_MAGNITUDE: u32 = 99_999;

    pub const fn zero() -> Register { Register::Numeric { negative: false, magnitude: 0 } }

    pub fn positive(magnitude: u32) -> Register {
        Register::Numeric { negative: false, magnitude: magnitude.min(Self::MAX_MAGNITUDE) }
    }

    /// Rounds a signed value to the nearest integer, saturating at five digits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_signed(value: f64) -> Register {
        let magnitude = if value.is_finite() {
            value.abs().round().min(f64::from(Self::MAX_MAGNITUDE)) as u32
        } else {
            Self::MAX_MAGNITUDE
        };
        Register::Numeric { negative: value < 0.0, magnitude }
    }

    /// Like [`Register::from_signed`] but always displayed with a plus sign.
    pub fn from_unsigned(value: f64) -> Register {
        match Register::from_signed(value.max(0.0)) {
            Register::Numeric { magnitude, .. } => Register::positive(magnitude),
            raw @ Register::Raw(_) => raw,
        }
    }
}

impl Default for Register {
    fn default() -> Self { Register::zero() }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Numeric { negative, magnitude } => {
                write!(f, "{}{magnitude:05}", if *negative { '-' } else { '+' })
            }
            Register::Raw(text) => f.write_str(text),
        }
    }
}
