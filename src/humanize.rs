//! Human-readable size formatting and parsing utilities

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid size format '{input}': {reason}")]
    InvalidSizeFormat { input: String, reason: &'static str },
}

impl ParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        ParseError::InvalidSizeFormat {
            input: input.to_string(),
            reason,
        }
    }
}

/// Byte size wrapper with human-readable parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ByteSize(pub u64);

const KIB: u64 = 1024;

/// Unit letters accepted before the trailing `B`, each one power of 1024 above the last.
const UNITS: &[(char, u32)] = &[('K', 1), ('M', 2), ('G', 3), ('T', 4), ('P', 5), ('E', 6)];

impl ByteSize {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn to_human_readable(&self) -> String {
        const DISPLAY_UNITS: &[(&str, u64)] = &[
            ("B", 1),
            ("KB", KIB),
            ("MB", KIB.pow(2)),
            ("GB", KIB.pow(3)),
            ("TB", KIB.pow(4)),
            ("PB", KIB.pow(5)),
            ("EB", KIB.pow(6)),
        ];

        for (i, &(unit, divisor)) in DISPLAY_UNITS.iter().enumerate().rev() {
            if self.0 >= divisor {
                let value = self.0 / divisor;
                let remainder = self.0 % divisor;

                if remainder == 0 || i == 0 {
                    return format!("{}{}", value, unit);
                }
                let decimal = (remainder as u128 * 10 / divisor as u128) as u64;
                if decimal > 0 {
                    return format!("{}.{}{}", value, decimal, unit);
                }
                return format!("{}{}", value, unit);
            }
        }

        format!("{}B", self.0)
    }
}

impl FromStr for ByteSize {
    type Err = ParseError;

    /// Accepts `"1024"`, `"1B"`, `"10MB"`, `"2GB"` ... `"1EB"`.
    ///
    /// Unit letters are case-sensitive and must be followed by `B`; `"10M"`
    /// and `"10mb"` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::new(s, "empty size"));
        }

        let Some(head) = s.strip_suffix('B') else {
            return parse_count(s, s).map(ByteSize);
        };

        let (digits, exponent) = match head.chars().last() {
            Some(c) if c.is_ascii_digit() => (head, 0),
            Some(c) => {
                let exponent = UNITS
                    .iter()
                    .find(|(letter, _)| *letter == c)
                    .map(|&(_, exp)| exp)
                    .ok_or_else(|| ParseError::new(s, "unknown unit"))?;
                (&head[..head.len() - c.len_utf8()], exponent)
            }
            None => return Err(ParseError::new(s, "missing number")),
        };

        let count = parse_count(digits, s)?;
        count
            .checked_mul(KIB.pow(exponent))
            .map(ByteSize)
            .ok_or_else(|| ParseError::new(s, "size overflows 64 bits"))
    }
}

fn parse_count(digits: &str, input: &str) -> Result<u64, ParseError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(input, "expected a decimal number"));
    }
    digits
        .parse::<u64>()
        .map_err(|_| ParseError::new(input, "number out of range"))
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}
