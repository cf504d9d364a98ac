//! Numeric storage for [`Value::Number`](super::Value::Number).
//!
//! A [`Number`] always carries an `f64` approximation. When it was built
//! straight from decimal source text (the tokenizer, or
//! [`Number::from_decimal_str`]) it additionally carries a [`Decimal`],
//! used by the schema engine to do exact `multipleOf`/`enum`/`const`
//! comparisons instead of floating-point ones. Numbers built from `f64`
//! or integer constructors carry no decimal text and compare as floats.
//!
//! This is the crate's default [`NumericBackend`]; callers who need full
//! arbitrary-precision semantics can implement the trait themselves and
//! inject it through [`crate::schema::ValidationOptions`].

use std::cmp::Ordering;
use std::fmt;

/// An exact decimal: `sign * mantissa * 10^-scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    negative: bool,
    mantissa: u128,
    scale: u32,
}

impl Decimal {
    /// Parses a JSON number literal (the grammar in §4.3 of the design
    /// notes) into an exact decimal. Returns `None` for literals that
    /// don't fit in `u128` mantissa after normalizing the exponent, in
    /// which case callers fall back to `f64`.
    pub fn parse(text: &str) -> Option<Decimal> {
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (mantissa_part, exp) = match rest.split_once(['e', 'E']) {
            Some((m, e)) => (m, e.parse::<i32>().ok()?),
            None => (rest, 0),
        };

        let (int_part, frac_part) = match mantissa_part.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa_part, ""),
        };

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        let mantissa: u128 = digits.parse().ok()?;
        let scale = frac_part.len() as i64 - exp as i64;

        if scale >= 0 {
            Some(Decimal { negative, mantissa, scale: scale as u32 })
        } else {
            let shift = (-scale) as u32;
            let factor = 10u128.checked_pow(shift)?;
            let mantissa = mantissa.checked_mul(factor)?;
            Some(Decimal { negative, mantissa, scale: 0 })
        }
    }

    fn aligned(a: &Decimal, b: &Decimal) -> Option<(u128, u128, u32)> {
        let scale = a.scale.max(b.scale);
        let fa = 10u128.checked_pow(scale - a.scale)?;
        let fb = 10u128.checked_pow(scale - b.scale)?;
        Some((a.mantissa.checked_mul(fa)?, b.mantissa.checked_mul(fb)?, scale))
    }

    /// `true` if `self` is an exact integer multiple of `of` (`of != 0`).
    pub fn is_multiple_of(&self, of: &Decimal) -> Option<bool> {
        if of.mantissa == 0 {
            return None;
        }
        let (na, nb, _) = Self::aligned(self, of)?;
        Some(na % nb == 0)
    }

    pub fn compare(&self, other: &Decimal) -> Option<Ordering> {
        let (na, nb, _) = Self::aligned(self, other)?;
        let signed = |neg: bool, mag: u128| -> i128 {
            if neg { -(mag as i128) } else { mag as i128 }
        };
        Some(signed(self.negative, na).cmp(&signed(other.negative, nb)))
    }

    pub fn to_f64(&self) -> f64 {
        let mag = self.mantissa as f64 / 10f64.powi(self.scale as i32);
        if self.negative { -mag } else { mag }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative && self.mantissa != 0 {
            write!(f, "-")?;
        }
        if self.scale == 0 {
            write!(f, "{}", self.mantissa)
        } else {
            let s = self.mantissa.to_string();
            let scale = self.scale as usize;
            if s.len() <= scale {
                write!(f, "0.{:0>width$}", s, width = scale)
            } else {
                let (int_part, frac_part) = s.split_at(s.len() - scale);
                write!(f, "{}.{}", int_part, frac_part)
            }
        }
    }
}

/// A JSON number: an `f64` approximation, plus exact decimal text when
/// available.
#[derive(Debug, Clone, Copy)]
pub struct Number {
    approx: f64,
    decimal: Option<Decimal>,
}

impl Number {
    pub fn from_f64(v: f64) -> Number {
        Number { approx: v, decimal: None }
    }

    pub fn from_i64(v: i64) -> Number {
        Number { approx: v as f64, decimal: Decimal::parse(&v.to_string()) }
    }

    pub fn from_u64(v: u64) -> Number {
        Number { approx: v as f64, decimal: Decimal::parse(&v.to_string()) }
    }

    /// Builds a `Number` from JSON source text, retaining exact decimal
    /// semantics for schema validation. `text` must already be a valid
    /// JSON number literal (the tokenizer guarantees this).
    pub fn from_decimal_str(text: &str) -> Number {
        Number {
            approx: text.parse().unwrap_or(f64::NAN),
            decimal: Decimal::parse(text),
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.approx
    }

    pub fn decimal(&self) -> Option<&Decimal> {
        self.decimal.as_ref()
    }

    /// `true` if the value has zero fractional part (used by the `integer`
    /// type keyword).
    pub fn is_integer(&self) -> bool {
        self.approx.fract() == 0.0 && self.approx.is_finite()
    }

    /// Exact-when-possible multiple-of check; falls back to `f64` when
    /// either operand lacks decimal text.
    pub fn is_multiple_of(&self, of: &Number) -> bool {
        if let (Some(a), Some(b)) = (&self.decimal, &of.decimal) {
            if let Some(result) = a.is_multiple_of(b) {
                return result;
            }
        }
        if of.approx == 0.0 {
            return false;
        }
        let ratio = self.approx / of.approx;
        (ratio - ratio.round()).abs() < f64::EPSILON * ratio.abs().max(1.0)
    }

    /// Shortest round-trip decimal text for [`Format::Compact`]/[`Format::Pretty`]
    /// output: prefers the original decimal text when present (schema-preserving),
    /// otherwise the shortest `f64` representation.
    pub fn to_json_text(&self) -> String {
        match &self.decimal {
            Some(d) => d.to_string(),
            None => {
                if self.approx.fract() == 0.0 && self.approx.abs() < 1e17 {
                    format!("{}", self.approx as i64)
                } else {
                    format!("{}", self.approx)
                }
            }
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (&self.decimal, &other.decimal) {
            (Some(a), Some(b)) => a.compare(b) == Some(Ordering::Equal),
            _ => self.approx == other.approx,
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.decimal, &other.decimal) {
            (Some(a), Some(b)) => a.compare(b),
            _ => self.approx.partial_cmp(&other.approx),
        }
    }
}

/// An injectable numeric capability, per the crate's arbitrary-precision
/// design notes. The default implementation is backed by [`Decimal`]; a
/// caller wanting true bignum semantics can provide their own.
pub trait NumericBackend {
    fn multiple_of(&self, n: &Number, of: &Number) -> bool {
        n.is_multiple_of(of)
    }
    fn compare(&self, a: &Number, b: &Number) -> Option<Ordering> {
        a.partial_cmp(b)
    }
}

/// The backend used when no custom one is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecimalBackend;

impl NumericBackend for DecimalBackend {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_multiple_of_avoids_fp_drift() {
        let n = Number::from_decimal_str("5");
        let of = Number::from_decimal_str("0.1");
        assert!(n.is_multiple_of(&of));
    }

    #[test]
    fn decimal_round_trip() {
        let n = Number::from_decimal_str("3.1400");
        assert_eq!(n.to_json_text(), "3.1400");
    }

    #[test]
    fn decimal_equality_ignores_trailing_zero_formatting() {
        let a = Number::from_decimal_str("1.50");
        let b = Number::from_decimal_str("1.5");
        assert_eq!(a, b);
    }

    #[test]
    fn negative_decimal_compare() {
        let a = Number::from_decimal_str("-1.5");
        let b = Number::from_decimal_str("1.5");
        assert!(a < b);
    }
}
