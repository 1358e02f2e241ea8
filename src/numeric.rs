use anyhow::{Context, Result};

// Multipliers selected by the last character of an integer property.
const SUFFIXES: [(char, u32); 3] = [('k', 1_000), ('m', 1_000_000), ('b', 1_000_000_000)];

// Parses an integer property value, such as a record count.
//
// A trailing 'k', 'm' or 'b' (in any case) multiplies the number by
// a thousand, a million or a billion, so "10M" stands for ten million.
// Only plain decimal digits are accepted before the suffix.
pub fn parse_integer<I: ParsableNumber>(s: &str) -> Result<I> {
    let s = s.trim();
    let suffix = s.chars().next_back().and_then(|last| {
        SUFFIXES
            .iter()
            .find(|(c, _)| last.eq_ignore_ascii_case(c))
            .map(|(_, mult)| *mult)
    });

    match suffix {
        Some(mult) => {
            let digits = &s[..s.len() - 1];
            I::from_str(digits)?
                .checked_mul_u32(mult)
                .with_context(|| format!("{} does not fit into the integer type", s))
        }
        None => I::from_str(s),
    }
}

// Parses a floating point property value, such as a proportion
// or the zipfian skewness. Infinities and NaN are rejected.
pub fn parse_real(s: &str) -> Result<f64> {
    let value: f64 = s.trim().parse()?;
    anyhow::ensure!(value.is_finite(), "{} is not a finite number", s.trim());
    Ok(value)
}

// Integer types which may hold a property value. The std integers share
// no trait for checked arithmetic, hence the macro below.
pub trait ParsableNumber: Sized {
    fn checked_mul_u32(self, mult: u32) -> Option<Self>;
    fn from_str(s: &str) -> Result<Self>;
}

macro_rules! impl_parsable_number {
    ($typ:ty) => {
        impl ParsableNumber for $typ {
            fn checked_mul_u32(self, mult: u32) -> Option<Self> {
                self.checked_mul(<$typ>::try_from(mult).ok()?)
            }
            fn from_str(s: &str) -> Result<Self> {
                s.parse::<$typ>()
                    .with_context(|| format!("{:?} is not a valid integer", s))
            }
        }
    };
}

impl_parsable_number!(u64);
impl_parsable_number!(usize);
