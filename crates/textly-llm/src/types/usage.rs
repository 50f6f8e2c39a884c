use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Monetary cost of completion calls, held as integer micro-units
///
/// Providers report cost as a decimal number with at most six significant
/// fractional digits. Keeping it as an integer count of millionths makes
/// running totals exact: `0.01 + 0.002` is `0.012`, not a float neighbour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cost(i64);

impl Cost {
    pub const ZERO: Cost = Cost(0);

    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Parse a decimal string such as `"0.001"` or `"1.5e-4"`.
    ///
    /// Returns `None` for anything that is not a finite number.
    pub fn parse_decimal(raw: &str) -> Option<Self> {
        let value: f64 = raw.trim().parse().ok()?;
        Self::from_f64(value)
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Self((value * MICROS_PER_UNIT).round() as i64))
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / MICROS_PER_UNIT
    }

    /// Interpret a provider extension field as a cost, falling back to zero
    ///
    /// The field is opaque: a JSON number, a numeric string, or anything
    /// else. Absent or unparseable values count as zero.
    pub fn from_extension(value: Option<&serde_json::Value>) -> Self {
        let parsed = match value {
            Some(serde_json::Value::Number(n)) => Self::parse_decimal(&n.to_string()),
            Some(serde_json::Value::String(s)) => Self::parse_decimal(s),
            _ => None,
        };
        parsed.unwrap_or_default()
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:06}", sign, abs / 1_000_000, abs % 1_000_000)
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        Cost(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Cost) {
        *self = *self + rhs;
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Cost {
        iter.fold(Cost::ZERO, Add::add)
    }
}

impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Cost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Cost::from_f64(value).ok_or_else(|| serde::de::Error::custom("cost must be a finite number"))
    }
}

/// Usage snapshot attributed to one completion call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub cost: Cost,
}

impl TokenUsage {
    /// True when the snapshot carries any non-zero token count
    pub fn has_token_counts(&self) -> bool {
        self.input_tokens > 0 || self.output_tokens > 0 || self.reasoning_tokens > 0
    }
}
