//! CLR numeric primitives and numeric literal utilities.
//!
//! The input language exposes the ten CLR numeric kinds through aliases
//! (`sbyte`, `byte`, ..., `double`). This module owns the closed kind set,
//! the exact integer ranges, and the C# binary-operator promotion rules the
//! numeric proof pass relies on.

use serde::{Deserialize, Serialize};

/// The closed set of CLR numeric primitive kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumericKind {
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
}

impl NumericKind {
    /// Map an input-language numeric alias to its kind.
    pub fn from_alias(name: &str) -> Option<Self> {
        Some(match name {
            "sbyte" => Self::SByte,
            "byte" => Self::Byte,
            "short" => Self::Int16,
            "ushort" => Self::UInt16,
            "int" => Self::Int32,
            "uint" => Self::UInt32,
            "long" => Self::Int64,
            "ulong" => Self::UInt64,
            "float" => Self::Single,
            "double" => Self::Double,
            _ => return None,
        })
    }

    /// The input-language alias for this kind.
    pub const fn alias(self) -> &'static str {
        match self {
            Self::SByte => "sbyte",
            Self::Byte => "byte",
            Self::Int16 => "short",
            Self::UInt16 => "ushort",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Int64 => "long",
            Self::UInt64 => "ulong",
            Self::Single => "float",
            Self::Double => "double",
        }
    }

    /// The C# keyword for this kind (same spelling as the alias).
    pub const fn csharp_keyword(self) -> &'static str {
        self.alias()
    }

    /// The fully-qualified CLR type name.
    pub const fn clr_name(self) -> &'static str {
        match self {
            Self::SByte => "System.SByte",
            Self::Byte => "System.Byte",
            Self::Int16 => "System.Int16",
            Self::UInt16 => "System.UInt16",
            Self::Int32 => "System.Int32",
            Self::UInt32 => "System.UInt32",
            Self::Int64 => "System.Int64",
            Self::UInt64 => "System.UInt64",
            Self::Single => "System.Single",
            Self::Double => "System.Double",
        }
    }

    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Single | Self::Double)
    }

    /// Inclusive integer range for integer kinds; `None` for floating kinds.
    pub const fn integer_range(self) -> Option<(i128, i128)> {
        Some(match self {
            Self::SByte => (i8::MIN as i128, i8::MAX as i128),
            Self::Byte => (u8::MIN as i128, u8::MAX as i128),
            Self::Int16 => (i16::MIN as i128, i16::MAX as i128),
            Self::UInt16 => (u16::MIN as i128, u16::MAX as i128),
            Self::Int32 => (i32::MIN as i128, i32::MAX as i128),
            Self::UInt32 => (u32::MIN as i128, u32::MAX as i128),
            Self::Int64 => (i64::MIN as i128, i64::MAX as i128),
            Self::UInt64 => (u64::MIN as i128, u64::MAX as i128),
            Self::Single | Self::Double => return None,
        })
    }

    /// Whether an integer value fits this kind exactly.
    pub fn fits_integer(self, value: i128) -> bool {
        match self.integer_range() {
            Some((min, max)) => value >= min && value <= max,
            // Floating kinds accept any integer literal; exact binary range
            // checks for Single/Double are not enforced.
            None => true,
        }
    }

    /// The result kind of a C# binary arithmetic operator applied to two
    /// operands of the given kinds, following C#'s binary numeric promotions.
    /// Returns `None` for combinations C# rejects (ulong mixed with a signed
    /// kind that has no implicit conversion to ulong).
    pub fn binary_promotion(left: Self, right: Self) -> Option<Self> {
        use NumericKind::*;
        if left == Double || right == Double {
            return Some(Double);
        }
        if left == Single || right == Single {
            return Some(Single);
        }
        if left == UInt64 || right == UInt64 {
            let other = if left == UInt64 { right } else { left };
            return match other {
                UInt64 | UInt32 | UInt16 | Byte => Some(UInt64),
                _ => None,
            };
        }
        if left == Int64 || right == Int64 {
            return Some(Int64);
        }
        if left == UInt32 || right == UInt32 {
            let other = if left == UInt32 { right } else { left };
            return match other {
                SByte | Int16 | Int32 => Some(Int64),
                _ => Some(UInt32),
            };
        }
        Some(Int32)
    }
}

impl std::fmt::Display for NumericKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Parse a numeric literal text representation into a f64 value.
/// Supports standard floating point literals as well as 0x, 0b, and 0o
/// prefixes, and numeric separators (`_`).
pub fn parse_numeric_literal_value(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    if text.len() > 2 {
        let prefix = &text[0..2];
        if prefix.eq_ignore_ascii_case("0x") {
            return parse_radix_digits(&text[2..], 16);
        } else if prefix.eq_ignore_ascii_case("0b") {
            return parse_radix_digits(&text[2..], 2);
        } else if prefix.eq_ignore_ascii_case("0o") {
            return parse_radix_digits(&text[2..], 8);
        }
    }

    if text.contains('_') {
        let mut cleaned = String::with_capacity(text.len());
        for c in text.chars() {
            if c != '_' {
                cleaned.push(c);
            }
        }
        return cleaned.parse::<f64>().ok();
    }

    text.parse::<f64>().ok()
}

fn parse_radix_digits(text: &str, base: u32) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    let mut value = 0.0;
    let base_float = f64::from(base);

    for byte in text.bytes() {
        if byte == b'_' {
            continue;
        }

        let digit = match byte {
            b'0'..=b'9' => u32::from(byte - b'0'),
            b'a'..=b'f' => u32::from(byte - b'a' + 10),
            b'A'..=b'F' => u32::from(byte - b'A' + 10),
            _ => return None,
        };

        if digit >= base {
            return None;
        }

        value = value * base_float + f64::from(digit);
    }

    Some(value)
}

/// Interpret a parsed literal value as an exact integer, if it is one.
pub fn literal_as_integer(value: f64) -> Option<i128> {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 2f64.powi(110) {
        Some(value as i128)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_round_trip() {
        for kind in [
            NumericKind::SByte,
            NumericKind::Byte,
            NumericKind::Int16,
            NumericKind::UInt16,
            NumericKind::Int32,
            NumericKind::UInt32,
            NumericKind::Int64,
            NumericKind::UInt64,
            NumericKind::Single,
            NumericKind::Double,
        ] {
            assert_eq!(NumericKind::from_alias(kind.alias()), Some(kind));
        }
        assert_eq!(NumericKind::from_alias("number"), None);
    }

    #[test]
    fn integer_ranges() {
        assert!(NumericKind::Int32.fits_integer(i128::from(i32::MAX)));
        assert!(!NumericKind::Int32.fits_integer(i128::from(i32::MAX) + 1));
        assert!(NumericKind::Byte.fits_integer(255));
        assert!(!NumericKind::Byte.fits_integer(-1));
        assert!(NumericKind::Double.fits_integer(i128::MAX));
    }

    #[test]
    fn binary_promotions() {
        use NumericKind::*;
        assert_eq!(NumericKind::binary_promotion(Int32, Int32), Some(Int32));
        assert_eq!(NumericKind::binary_promotion(SByte, Byte), Some(Int32));
        assert_eq!(NumericKind::binary_promotion(Int32, Int64), Some(Int64));
        assert_eq!(NumericKind::binary_promotion(UInt32, Int32), Some(Int64));
        assert_eq!(NumericKind::binary_promotion(UInt32, UInt16), Some(UInt32));
        assert_eq!(NumericKind::binary_promotion(UInt64, Int32), None);
        assert_eq!(NumericKind::binary_promotion(UInt64, Byte), Some(UInt64));
        assert_eq!(NumericKind::binary_promotion(Single, Int64), Some(Single));
        assert_eq!(NumericKind::binary_promotion(Double, Single), Some(Double));
    }

    #[test]
    fn parse_literal_values() {
        assert_eq!(parse_numeric_literal_value("123"), Some(123.0));
        assert_eq!(parse_numeric_literal_value("123.456"), Some(123.456));
        assert_eq!(parse_numeric_literal_value("1_000"), Some(1000.0));
        assert_eq!(parse_numeric_literal_value("0b11"), Some(3.0));
        assert_eq!(parse_numeric_literal_value("0o10"), Some(8.0));
        assert_eq!(parse_numeric_literal_value("0xFF"), Some(255.0));
        assert_eq!(parse_numeric_literal_value("0xg"), None);
        assert_eq!(parse_numeric_literal_value("0b2"), None);
    }

    #[test]
    fn literal_integer_classification() {
        assert_eq!(literal_as_integer(3.0), Some(3));
        assert_eq!(literal_as_integer(1.5), None);
        assert_eq!(literal_as_integer(-42.0), Some(-42));
    }
}
