//! Per-type value parsers.
//!
//! The engine never looks inside a token: it hands the remaining tokens to the
//! field's [`ArgValue`] impl and only learns whether the parse succeeded and
//! how many tokens were consumed.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// No token was left to parse.
    #[error("missing value")]
    Missing,
    #[error("invalid value '{token}': {reason}")]
    Invalid { token: String, reason: String },
    /// A single-assignment flag matched a second time.
    #[error("may only be given once")]
    Repeated,
}

impl ValueError {
    pub fn invalid(token: &str, reason: impl Display) -> Self {
        Self::Invalid {
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A type that can be read from the leading tokens of the remaining argv.
pub trait ArgValue: Sized {
    /// Parse a value from the front of `tokens`.
    ///
    /// Returns the value and the number of tokens consumed. Must not report
    /// any consumption on failure, so the engine can offer the same token to
    /// a later field.
    fn parse_tokens(tokens: &[&str]) -> Result<(Self, usize), ValueError>;

    /// Record one matched occurrence into an existing slot.
    ///
    /// Scalars overwrite whatever was there; collections append.
    fn store(slot: &mut Self, tokens: &[&str]) -> Result<usize, ValueError> {
        let (value, consumed) = Self::parse_tokens(tokens)?;
        *slot = value;
        Ok(consumed)
    }
}

fn first_token<'t>(tokens: &[&'t str]) -> Result<&'t str, ValueError> {
    tokens.first().copied().ok_or(ValueError::Missing)
}

/// Parse exactly one token with `FromStr`.
///
/// Handy for implementing [`ArgValue`] on your own types; see also
/// [`impl_arg_value_from_str!`](crate::impl_arg_value_from_str).
pub fn parse_single<T>(tokens: &[&str]) -> Result<(T, usize), ValueError>
where
    T: FromStr,
    T::Err: Display,
{
    let token = first_token(tokens)?;
    token
        .parse::<T>()
        .map(|v| (v, 1))
        .map_err(|e| ValueError::invalid(token, e))
}

/// Implement [`ArgValue`] for types that parse from a single token via `FromStr`.
#[macro_export]
macro_rules! impl_arg_value_from_str {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::ArgValue for $ty {
            fn parse_tokens(tokens: &[&str]) -> ::std::result::Result<(Self, usize), $crate::ValueError> {
                $crate::value::parse_single::<$ty>(tokens)
            }
        }
    )+};
}

// Integer syntax follows C's `strtol(.., 0)`: optional leading whitespace and
// sign, `0x`/`0X` for hexadecimal, a leading `0` for octal, decimal otherwise.
// The whole token must be digits.
fn split_integer(token: &str) -> Result<(bool, u128), &'static str> {
    let s = token.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (16, rest)
    } else if s.len() > 1 && s.starts_with('0') {
        (8, &s[1..])
    } else {
        (10, s)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err("not an integer");
    }
    u128::from_str_radix(digits, radix)
        .map(|magnitude| (negative, magnitude))
        .map_err(|_| "out of range")
}

fn signed_magnitude(negative: bool, magnitude: u128) -> Option<i128> {
    if !negative {
        return i128::try_from(magnitude).ok();
    }
    if magnitude == 1u128 << 127 {
        return Some(i128::MIN);
    }
    i128::try_from(magnitude).ok().map(|m| -m)
}

macro_rules! impl_integer {
    ($($ty:ty),+) => {$(
        impl ArgValue for $ty {
            fn parse_tokens(tokens: &[&str]) -> Result<(Self, usize), ValueError> {
                let token = first_token(tokens)?;
                let (negative, magnitude) =
                    split_integer(token).map_err(|reason| ValueError::invalid(token, reason))?;
                let value = if negative {
                    signed_magnitude(true, magnitude).and_then(|v| <$ty>::try_from(v).ok())
                } else {
                    <$ty>::try_from(magnitude).ok()
                };
                value.map(|v| (v, 1)).ok_or_else(|| {
                    ValueError::invalid(token, concat!("out of range for ", stringify!($ty)))
                })
            }
        }
    )+};
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl_arg_value_from_str!(f32, f64, char, String, PathBuf);

impl ArgValue for bool {
    fn parse_tokens(tokens: &[&str]) -> Result<(Self, usize), ValueError> {
        let token = first_token(tokens)?;
        let value = match token.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => return Err(ValueError::invalid(token, "expected true or false")),
        };
        Ok((value, 1))
    }
}

impl<T: ArgValue> ArgValue for Option<T> {
    fn parse_tokens(tokens: &[&str]) -> Result<(Self, usize), ValueError> {
        T::parse_tokens(tokens).map(|(v, n)| (Some(v), n))
    }
}

/// Each occurrence contributes one element.
impl<T: ArgValue> ArgValue for Vec<T> {
    fn parse_tokens(tokens: &[&str]) -> Result<(Self, usize), ValueError> {
        T::parse_tokens(tokens).map(|(v, n)| (vec![v], n))
    }

    fn store(slot: &mut Self, tokens: &[&str]) -> Result<usize, ValueError> {
        let (value, consumed) = T::parse_tokens(tokens)?;
        slot.push(value);
        Ok(consumed)
    }
}
