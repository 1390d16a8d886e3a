use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use strum_macros::Display;

/// A single keypad event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Digit(u8),
    Verb,
    Noun,
    Entr,
    Clr,
    KeyRel,
    Pro,
    Rset,
    ThrustUp,
    ThrustDown,
    LampTest,
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[strum(to_string = "unknown key `{token}`")]
    UnknownKey { token: String },
}

impl std::error::Error for KeyParseError {}

/// Tokenizer for console key sequences such as `V37N63E` or `VERB 3 7 ENTR`.
/// Longer names come first so `VERB` is not split into `V` + junk.
static KEY_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(VERB|NOUN|ENTR|CLR|KEY[_ ]?REL|KR|PRO|RSET|LAMP|THR_UP|THR_DN|[VNEPR+\-0-9]|\S+)",
    )
    .unwrap()
});

impl Key {
    /// Splits a console line into keys.
    ///
    /// # Arguments
    /// * `line` – Whitespace-separated or packed key tokens.
    ///
    /// # Returns
    /// All keys in order, or the first token that is not a key.
    pub fn parse_sequence(line: &str) -> Result<Vec<Key>, KeyParseError> {
        KEY_TOKEN_REGEX.find_iter(line).map(|m| m.as_str().parse::<Key>()).collect()
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_uppercase();
        let key = match token.as_str() {
            "VERB" | "V" => Key::Verb,
            "NOUN" | "N" => Key::Noun,
            "ENTR" | "E" => Key::Entr,
            "CLR" => Key::Clr,
            "KEY_REL" | "KEY REL" | "KEYREL" | "KR" => Key::KeyRel,
            "PRO" | "P" => Key::Pro,
            "RSET" | "R" => Key::Rset,
            "LAMP" => Key::LampTest,
            "THR_UP" | "+" => Key::ThrustUp,
            "THR_DN" | "-" => Key::ThrustDown,
            t if t.len() == 1 && t.as_bytes()[0].is_ascii_digit() => Key::Digit(t.as_bytes()[0] - b'0'),
            _ => return Err(KeyParseError::UnknownKey { token: s.to_string() }),
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Key::Digit(d) => return write!(f, "{d}"),
            Key::Verb => "VERB",
            Key::Noun => "NOUN",
            Key::Entr => "ENTR",
            Key::Clr => "CLR",
            Key::KeyRel => "KEY REL",
            Key::Pro => "PRO",
            Key::Rset => "RSET",
            Key::ThrustUp => "THR+",
            Key::ThrustDown => "THR-",
            Key::LampTest => "LAMP",
        };
        f.write_str(label)
    }
}
