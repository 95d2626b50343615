//! Unsigned integer widths and their signed carriers
//!
//! JSON numbers are read by the host as signed values. Each width maps onto
//! the narrowest signed carrier that holds its whole range; 64-bit values
//! have no such carrier and travel as decimal text.

use crate::error::RangeReason;
use crate::number::{LiteralError, NumberLiteral};
use std::fmt;
use std::str::FromStr;

/// One of the four supported unsigned integer widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsignedWidth {
    /// 8-bit, `u8`
    U8,
    /// 16-bit, `u16`
    U16,
    /// 32-bit, `u32`
    U32,
    /// 64-bit, `u64`
    U64,
}

impl UnsignedWidth {
    /// Every width, narrowest first
    pub const ALL: [UnsignedWidth; 4] = [
        UnsignedWidth::U8,
        UnsignedWidth::U16,
        UnsignedWidth::U32,
        UnsignedWidth::U64,
    ];

    /// Largest representable value
    pub fn max(self) -> u64 {
        match self {
            UnsignedWidth::U8 => u64::from(u8::MAX),
            UnsignedWidth::U16 => u64::from(u16::MAX),
            UnsignedWidth::U32 => u64::from(u32::MAX),
            UnsignedWidth::U64 => u64::MAX,
        }
    }

    /// Rust name of the primitive, e.g. `u32`
    pub fn name(self) -> &'static str {
        match self {
            UnsignedWidth::U8 => "u8",
            UnsignedWidth::U16 => "u16",
            UnsignedWidth::U32 => "u32",
            UnsignedWidth::U64 => "u64",
        }
    }

    /// Render `value` as signed-safe decimal text.
    ///
    /// Narrow widths are widened into their signed carrier first, so the
    /// top bit of the unsigned value never becomes a sign bit.
    pub fn widen(self, value: u64) -> String {
        debug_assert!(value <= self.max(), "{} exceeds {}", value, self.name());
        match self {
            UnsignedWidth::U8 => i16::from(value as u8).to_string(),
            UnsignedWidth::U16 => i32::from(value as u16).to_string(),
            UnsignedWidth::U32 => i64::from(value as u32).to_string(),
            UnsignedWidth::U64 => value.to_string(),
        }
    }

    /// Parse number text into a value of this width.
    ///
    /// A leading `-` is rejected before any numeric parsing.
    pub fn narrow(self, text: &str) -> Result<u64, LiteralError> {
        self.narrow_bounded(text, usize::MAX)
    }

    /// [`narrow`](Self::narrow) with a cap on the literal length
    pub fn narrow_bounded(self, text: &str, max_len: usize) -> Result<u64, LiteralError> {
        if text.trim_start().starts_with('-') {
            return Err(RangeReason::Negative.into());
        }
        let literal = NumberLiteral::parse_bounded(text, max_len)?;
        let value = literal.to_u64()?;
        if value > self.max() {
            return Err(RangeReason::Overflow.into());
        }
        Ok(value)
    }
}

impl fmt::Display for UnsignedWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnsignedWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnsignedWidth::ALL
            .into_iter()
            .find(|width| width.name() == s)
            .ok_or_else(|| format!("unknown unsigned width '{}' (expected u8, u16, u32 or u64)", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_max_values() {
        assert_eq!(UnsignedWidth::U8.max(), 255);
        assert_eq!(UnsignedWidth::U16.max(), 65_535);
        assert_eq!(UnsignedWidth::U32.max(), 4_294_967_295);
        assert_eq!(UnsignedWidth::U64.max(), 18_446_744_073_709_551_615);
    }

    #[test]
    fn test_top_bit_values_widen_positive() {
        assert_eq!(UnsignedWidth::U8.widen(137), "137");
        assert_eq!(UnsignedWidth::U16.widen(32_894), "32894");
        assert_eq!(UnsignedWidth::U32.widen(2_147_516_414), "2147516414");
        assert_eq!(
            UnsignedWidth::U64.widen(9_223_372_039_002_259_454),
            "9223372039002259454"
        );
    }

    #[test]
    fn test_narrow_rejects_negative_before_parsing() {
        for width in UnsignedWidth::ALL {
            assert_eq!(
                width.narrow("-1"),
                Err(LiteralError::Range(RangeReason::Negative))
            );
            assert_eq!(
                width.narrow("-0"),
                Err(LiteralError::Range(RangeReason::Negative))
            );
            assert_eq!(
                width.narrow("-not-a-number"),
                Err(LiteralError::Range(RangeReason::Negative))
            );
        }
    }

    #[test]
    fn test_narrow_rejects_above_max() {
        assert_eq!(
            UnsignedWidth::U8.narrow("256"),
            Err(LiteralError::Range(RangeReason::Overflow))
        );
        assert_eq!(
            UnsignedWidth::U16.narrow("65536"),
            Err(LiteralError::Range(RangeReason::Overflow))
        );
        assert_eq!(
            UnsignedWidth::U32.narrow("4294967296"),
            Err(LiteralError::Range(RangeReason::Overflow))
        );
        assert_eq!(
            UnsignedWidth::U64.narrow("18446744073709551616"),
            Err(LiteralError::Range(RangeReason::Overflow))
        );
        assert_eq!(UnsignedWidth::U8.narrow("255"), Ok(255));
    }

    #[test]
    fn test_narrow_bounded_reports_overlong_integers_as_overflow() {
        let huge = "9".repeat(5000);
        for width in UnsignedWidth::ALL {
            assert_eq!(
                width.narrow_bounded(&huge, 4096),
                Err(LiteralError::Range(RangeReason::Overflow)),
                "width {}",
                width
            );
            assert_eq!(
                width.narrow_bounded(&format!("-{}", huge), 4096),
                Err(LiteralError::Range(RangeReason::Negative))
            );
        }
    }

    #[test]
    fn test_narrow_rejects_fraction() {
        assert_eq!(
            UnsignedWidth::U32.narrow("3.5"),
            Err(LiteralError::Range(RangeReason::Fractional))
        );
        assert_eq!(UnsignedWidth::U32.narrow("3.0"), Ok(3));
    }

    #[test]
    fn test_width_from_str() {
        assert_eq!("u16".parse::<UnsignedWidth>(), Ok(UnsignedWidth::U16));
        assert!("u128".parse::<UnsignedWidth>().is_err());
    }

    proptest! {
        #[test]
        fn prop_u8_roundtrip(value in any::<u8>()) {
            let width = UnsignedWidth::U8;
            prop_assert_eq!(width.narrow(&width.widen(u64::from(value))), Ok(u64::from(value)));
        }

        #[test]
        fn prop_u16_roundtrip(value in any::<u16>()) {
            let width = UnsignedWidth::U16;
            prop_assert_eq!(width.narrow(&width.widen(u64::from(value))), Ok(u64::from(value)));
        }

        #[test]
        fn prop_u32_roundtrip(value in any::<u32>()) {
            let width = UnsignedWidth::U32;
            prop_assert_eq!(width.narrow(&width.widen(u64::from(value))), Ok(u64::from(value)));
        }

        #[test]
        fn prop_u64_roundtrip(value in any::<u64>()) {
            let width = UnsignedWidth::U64;
            prop_assert_eq!(width.narrow(&width.widen(value)), Ok(value));
        }
    }
}
