//! Two-fraction-digit fixed-point decimal used for hours and costs.
//!
//! # Invariants
//! - Values are held as whole hundredths; no floating point on write paths.
//! - Parsing never rounds: input with more than two fraction digits is rejected.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const SCALE: i64 = 100;
const FRACTION_DIGITS: usize = 2;

/// Decimal amount with exactly two fraction digits, matching `DECIMAL(7,2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    hundredths: i64,
}

impl Amount {
    pub const ZERO: Amount = Amount { hundredths: 0 };

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self { hundredths }
    }

    pub const fn hundredths(self) -> i64 {
        self.hundredths
    }

    pub const fn is_negative(self) -> bool {
        self.hundredths < 0
    }
}

/// Error returned when user or stored text is not a two-digit decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Invalid(String),
    TooManyFractionDigits(String),
    OutOfRange(String),
}

impl Display for ParseAmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(input) => write!(f, "{input} is not a valid decimal number."),
            Self::TooManyFractionDigits(input) => {
                write!(f, "{input} has more than {FRACTION_DIGITS} decimal places.")
            }
            Self::OutOfRange(input) => write!(f, "{input} is out of range."),
        }
    }
}

impl Error for ParseAmountError {}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = || ParseAmountError::Invalid(input.to_string());

        let (negative, unsigned) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..]),
            Some(b'+') => (false, &input[1..]),
            _ => (false, input),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(invalid());
        }
        // Surplus digits are fine as long as they are zeros: no rounding needed.
        let fraction = if fraction.len() > FRACTION_DIGITS {
            let (kept, surplus) = fraction.split_at(FRACTION_DIGITS);
            if surplus.bytes().any(|byte| byte != b'0') {
                return Err(ParseAmountError::TooManyFractionDigits(input.to_string()));
            }
            kept
        } else {
            fraction
        };

        let out_of_range = || ParseAmountError::OutOfRange(input.to_string());
        let whole_value = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|_| out_of_range())?
        };
        let fraction_value = format!("{fraction:0<width$}", width = FRACTION_DIGITS)
            .parse::<i64>()
            .map_err(|_| invalid())?;

        let magnitude = whole_value
            .checked_mul(SCALE)
            .and_then(|value| value.checked_add(fraction_value))
            .ok_or_else(out_of_range)?;

        Ok(Self::from_hundredths(if negative {
            -magnitude
        } else {
            magnitude
        }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.hundredths.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / scale, magnitude % scale)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(whole) => whole
                .checked_mul(SCALE)
                .map(Self::from_hundredths)
                .ok_or(FromSqlError::OutOfRange(whole)),
            // NUMERIC affinity turns "4.50" into REAL 4.5; DECIMAL(7,2) stays
            // well inside f64's exact integer range after scaling.
            ValueRef::Real(value) => Ok(Self::from_hundredths((value * SCALE as f64).round() as i64)),
            ValueRef::Text(text) => std::str::from_utf8(text)
                .map_err(|err| FromSqlError::Other(Box::new(err)))?
                .parse()
                .map_err(|err| FromSqlError::Other(Box::new(err))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}
