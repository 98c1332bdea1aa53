use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of characters in a party code
pub const PARTY_CODE_LEN: usize = 6;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Error returned when a party code cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartyCodeError {
    #[error("Party code must be {PARTY_CODE_LEN} characters, got {0}")]
    Length(usize),
    #[error("Party code contains invalid character '{0}'")]
    InvalidCharacter(char),
}

/// Short join code shared with guests, always 6 characters of `[A-Z0-9]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartyCode(String);

impl PartyCode {
    /// Draw a fresh code uniformly over the charset
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..PARTY_CODE_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();
        Self(code)
    }

    /// Parse user input: surrounding whitespace is ignored and letters are uppercased
    pub fn parse(input: &str) -> Result<Self, PartyCodeError> {
        let normalized = input.trim().to_uppercase();

        let len = normalized.chars().count();
        if len != PARTY_CODE_LEN {
            return Err(PartyCodeError::Length(len));
        }

        if let Some(bad) = normalized
            .chars()
            .find(|c| !c.is_ascii_uppercase() && !c.is_ascii_digit())
        {
            return Err(PartyCodeError::InvalidCharacter(bad));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PartyCode {
    type Err = PartyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PartyCode {
    type Error = PartyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PartyCode> for String {
    fn from(code: PartyCode) -> Self {
        code.0
    }
}
