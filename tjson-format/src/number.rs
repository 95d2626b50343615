//! Exact parsing of JSON number literals
//!
//! Literals are decomposed into sign, significant digits and a base-10
//! exponent without going through floating point, so integral checks and
//! range checks are exact for any literal length.

use crate::error::RangeReason;
use smallvec::SmallVec;
use std::fmt;

/// Exponents are clamped to this magnitude; anything larger is out of range
/// (positive) or fractional (negative) for every integer target anyway.
const EXPONENT_CLAMP: i64 = 1_000_000;

/// Digits of `u64::MAX`, the widest integer target
const MAX_INTEGER_DIGITS: usize = 20;

/// Failure to interpret a literal as an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralError {
    /// Text is not a JSON number
    Malformed,
    /// Text is longer than the configured limit
    TooLong {
        /// Length of the literal in bytes
        len: usize,
        /// Configured maximum
        max: usize,
    },
    /// Literal is a number, but not one the target can hold
    Range(RangeReason),
}

impl From<RangeReason> for LiteralError {
    fn from(reason: RangeReason) -> Self {
        LiteralError::Range(reason)
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralError::Malformed => f.write_str("malformed number literal"),
            LiteralError::TooLong { len, max } => {
                write!(f, "number literal of {} bytes exceeds {} bytes", len, max)
            }
            LiteralError::Range(reason) => write!(f, "{}", reason),
        }
    }
}

/// Number literal with exact representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLiteral {
    /// Sign: false = non-negative, true = negative
    pub negative: bool,
    /// ASCII digits '0'..'9', MSB-first, no leading zeros
    pub digits: SmallVec<[u8; 24]>,
    /// Base-10 exponent applied to `digits`
    pub exponent: i64,
}

impl NumberLiteral {
    /// Parse from JSON number text
    pub fn parse(text: &str) -> Result<Self, LiteralError> {
        let s = text.trim();
        if s.is_empty() {
            return Err(LiteralError::Malformed);
        }

        let (negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };

        let (mantissa, exponent) = match s.find(['e', 'E']) {
            Some(e_pos) => (&s[..e_pos], Self::parse_exponent(&s[e_pos + 1..])?),
            None => (s, 0),
        };

        let (digits, decimal_places) = Self::parse_mantissa(mantissa)?;

        Ok(Self {
            negative,
            digits: Self::remove_leading_zeros(digits),
            exponent: exponent - decimal_places as i64,
        })
    }

    /// Parse a literal meant for an integer target, rejecting literals
    /// longer than `max_len` bytes without parsing them.
    ///
    /// A plain integer (`-?[0-9]+`) too long to parse but with more
    /// significant digits than any integer target holds is reported as
    /// out of range rather than too long.
    pub fn parse_bounded(text: &str, max_len: usize) -> Result<Self, LiteralError> {
        if text.len() > max_len {
            if plain_integer_digits(text).is_some_and(|digits| digits > MAX_INTEGER_DIGITS) {
                return Err(RangeReason::Overflow.into());
            }
            return Err(LiteralError::TooLong {
                len: text.len(),
                max: max_len,
            });
        }
        Self::parse(text)
    }

    /// Parse mantissa and return (digits, decimal_places)
    fn parse_mantissa(s: &str) -> Result<(SmallVec<[u8; 24]>, usize), LiteralError> {
        let mut digits = SmallVec::new();
        let mut decimal_places = 0;
        let mut found_dot = false;

        for byte in s.bytes() {
            match byte {
                b'0'..=b'9' => {
                    digits.push(byte);
                    if found_dot {
                        decimal_places += 1;
                    }
                }
                b'.' if !found_dot => found_dot = true,
                _ => return Err(LiteralError::Malformed),
            }
        }

        if digits.is_empty() {
            return Err(LiteralError::Malformed);
        }

        Ok((digits, decimal_places))
    }

    /// Parse the exponent part, saturating at the clamp
    fn parse_exponent(s: &str) -> Result<i64, LiteralError> {
        let (negative, s) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        if s.is_empty() {
            return Err(LiteralError::Malformed);
        }

        let mut exponent: i64 = 0;
        for byte in s.bytes() {
            if !byte.is_ascii_digit() {
                return Err(LiteralError::Malformed);
            }
            exponent = (exponent * 10 + i64::from(byte - b'0')).min(EXPONENT_CLAMP);
        }

        Ok(if negative { -exponent } else { exponent })
    }

    fn remove_leading_zeros(mut digits: SmallVec<[u8; 24]>) -> SmallVec<[u8; 24]> {
        let zeros = digits
            .iter()
            .take(digits.len() - 1)
            .take_while(|&&d| d == b'0')
            .count();
        digits.drain(..zeros);
        digits
    }

    /// True when every digit is zero (`0`, `-0`, `0.000`, `0e5`)
    pub fn is_zero(&self) -> bool {
        self.digits.iter().all(|&d| d == b'0')
    }

    /// Absolute value as an integer, ignoring the sign
    pub fn magnitude(&self) -> Result<u64, RangeReason> {
        if self.is_zero() {
            return Ok(0);
        }

        let digits: &[u8] = &self.digits;
        if self.exponent >= 0 {
            let exponent = self.exponent as usize;
            // `digits` has no leading zeros
            if digits.len() + exponent > MAX_INTEGER_DIGITS {
                return Err(RangeReason::Overflow);
            }
            let mut value = accumulate(digits)?;
            for _ in 0..exponent {
                value = value.checked_mul(10).ok_or(RangeReason::Overflow)?;
            }
            Ok(value)
        } else {
            let fraction = self.exponent.unsigned_abs() as usize;
            if fraction >= digits.len() {
                return Err(RangeReason::Fractional);
            }
            let (int_part, frac_part) = digits.split_at(digits.len() - fraction);
            if frac_part.iter().any(|&d| d != b'0') {
                return Err(RangeReason::Fractional);
            }
            accumulate(int_part)
        }
    }

    /// Value as an unsigned integer
    pub fn to_u64(&self) -> Result<u64, RangeReason> {
        if self.negative && !self.is_zero() {
            return Err(RangeReason::Negative);
        }
        self.magnitude()
    }

    /// Value as a signed integer
    pub fn to_i64(&self) -> Result<i64, RangeReason> {
        let magnitude = self.magnitude()?;
        if self.negative {
            if magnitude > i64::MAX as u64 + 1 {
                return Err(RangeReason::Overflow);
            }
            Ok((magnitude as i64).wrapping_neg())
        } else {
            i64::try_from(magnitude).map_err(|_| RangeReason::Overflow)
        }
    }
}

/// Significant digits of a `-?[0-9]+` literal; `None` for any other text
fn plain_integer_digits(text: &str) -> Option<usize> {
    let digits = text.trim().strip_prefix('-').unwrap_or(text.trim());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.trim_start_matches('0').len())
}

fn accumulate(digits: &[u8]) -> Result<u64, RangeReason> {
    digits.iter().try_fold(0u64, |acc, &d| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(d - b'0')))
            .ok_or(RangeReason::Overflow)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn magnitude(text: &str) -> Result<u64, RangeReason> {
        NumberLiteral::parse(text).unwrap().magnitude()
    }

    #[test]
    fn test_parse_plain_integer() {
        let literal = NumberLiteral::parse("9223372039002259454").unwrap();
        assert!(!literal.negative);
        assert_eq!(literal.exponent, 0);
        assert_eq!(literal.to_u64(), Ok(9_223_372_039_002_259_454));
    }

    #[test]
    fn test_integral_forms_accepted() {
        assert_eq!(magnitude("5.0"), Ok(5));
        assert_eq!(magnitude("1e2"), Ok(100));
        assert_eq!(magnitude("1E+2"), Ok(100));
        assert_eq!(magnitude("100e-2"), Ok(1));
        assert_eq!(magnitude("0.000"), Ok(0));
        assert_eq!(magnitude("0e99"), Ok(0));
    }

    #[test]
    fn test_fractional_rejected() {
        assert_eq!(magnitude("3.5"), Err(RangeReason::Fractional));
        assert_eq!(magnitude("0.5"), Err(RangeReason::Fractional));
        assert_eq!(magnitude("1e-1"), Err(RangeReason::Fractional));
        assert_eq!(magnitude("12.01"), Err(RangeReason::Fractional));
    }

    #[test]
    fn test_overflow_detected() {
        assert_eq!(magnitude("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(magnitude("18446744073709551616"), Err(RangeReason::Overflow));
        assert_eq!(magnitude("1e20"), Err(RangeReason::Overflow));
        assert_eq!(magnitude("1e999999999999999999"), Err(RangeReason::Overflow));
        assert_eq!(magnitude("1e-999999999999999999"), Err(RangeReason::Fractional));
    }

    #[test]
    fn test_negative_values() {
        let literal = NumberLiteral::parse("-1").unwrap();
        assert_eq!(literal.to_u64(), Err(RangeReason::Negative));
        assert_eq!(literal.to_i64(), Ok(-1));

        let min = NumberLiteral::parse("-9223372036854775808").unwrap();
        assert_eq!(min.to_i64(), Ok(i64::MIN));

        let below_min = NumberLiteral::parse("-9223372036854775809").unwrap();
        assert_eq!(below_min.to_i64(), Err(RangeReason::Overflow));
    }

    #[test]
    fn test_malformed_rejected() {
        for text in ["", "-", "abc", "1.2.3", "1e", "1e+", "+5", "0x10", "1_000"] {
            assert_eq!(
                NumberLiteral::parse(text),
                Err(LiteralError::Malformed),
                "text {:?}",
                text
            );
        }
    }

    #[test]
    fn test_parse_bounded() {
        assert_eq!(
            NumberLiteral::parse_bounded("123456", 4),
            Err(LiteralError::TooLong { len: 6, max: 4 })
        );
        assert!(NumberLiteral::parse_bounded("1234", 4).is_ok());
    }

    #[test]
    fn test_overlong_plain_integers_are_out_of_range() {
        let huge = "9".repeat(5000);
        assert_eq!(
            NumberLiteral::parse_bounded(&huge, 4096),
            Err(LiteralError::Range(RangeReason::Overflow))
        );
        assert_eq!(
            NumberLiteral::parse_bounded(&format!("-{}", huge), 4096),
            Err(LiteralError::Range(RangeReason::Overflow))
        );

        // within u64 digits, only too long for the configured limit
        assert_eq!(
            NumberLiteral::parse_bounded("123456", 4),
            Err(LiteralError::TooLong { len: 6, max: 4 })
        );
        let fractional = format!("1.{}", "5".repeat(5000));
        assert!(matches!(
            NumberLiteral::parse_bounded(&fractional, 4096),
            Err(LiteralError::TooLong { .. })
        ));
    }

    #[test]
    fn test_leading_zeros_removed() {
        let literal = NumberLiteral::parse("000120").unwrap();
        assert_eq!(literal.digits.as_slice(), b"120");
        let zero = NumberLiteral::parse("0000").unwrap();
        assert_eq!(zero.digits.as_slice(), b"0");
    }

    proptest! {
        #[test]
        fn prop_u64_text_is_exact(value in any::<u64>()) {
            let literal = NumberLiteral::parse(&value.to_string()).unwrap();
            prop_assert_eq!(literal.to_u64(), Ok(value));
        }

        #[test]
        fn prop_i64_text_is_exact(value in any::<i64>()) {
            let literal = NumberLiteral::parse(&value.to_string()).unwrap();
            prop_assert_eq!(literal.to_i64(), Ok(value));
        }
    }
}
