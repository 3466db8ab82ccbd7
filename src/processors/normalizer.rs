//! Per-field coercions from raw text to typed values.
//!
//! The `parse_*` functions are explicit: `Ok(None)` for an empty cell,
//! `Err(CoercionFailure)` for text that does not parse. [`FieldNormalizer`]
//! wraps them with coerce-or-null semantics and keeps a per-field tally of
//! the failures it swallowed.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFailure {
    pub raw: String,
    pub expected: &'static str,
}

impl fmt::Display for CoercionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot read '{}' as {}", self.raw, self.expected)
    }
}

impl std::error::Error for CoercionFailure {}

pub type Coerced<T> = std::result::Result<Option<T>, CoercionFailure>;

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

pub fn parse_float(raw: Option<&str>) -> Coerced<f64> {
    let Some(value) = non_empty(raw) else {
        return Ok(None);
    };

    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
        _ => Err(CoercionFailure {
            raw: value.to_string(),
            expected: "float",
        }),
    }
}

/// Integers also accept integral float spellings such as `2011.0`.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

pub fn parse_int(raw: Option<&str>) -> Coerced<i64> {
    let Some(value) = non_empty(raw) else {
        return Ok(None);
    };

    if let Ok(parsed) = value.parse::<i64>() {
        return Ok(Some(parsed));
    }

    // `as` saturates, so anything outside i64 has to be rejected first
    match value.parse::<f64>() {
        Ok(parsed) if parsed.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&parsed) => {
            Ok(Some(parsed as i64))
        }
        _ => Err(CoercionFailure {
            raw: value.to_string(),
            expected: "integer",
        }),
    }
}

pub fn parse_date(raw: Option<&str>, format: &str) -> Coerced<NaiveDate> {
    let Some(value) = non_empty(raw) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(value, format)
        .map(Some)
        .map_err(|_| CoercionFailure {
            raw: value.to_string(),
            expected: "date",
        })
}

/// Join-key text: trimmed and uppercased.
pub fn key_text(raw: Option<&str>) -> Option<String> {
    non_empty(raw).map(str::to_uppercase)
}

/// Display text: trimmed, original casing kept.
pub fn display_text(raw: Option<&str>) -> Option<String> {
    non_empty(raw).map(str::to_string)
}

/// `Y` (any case) is true, everything else false.
pub fn flag(raw: Option<&str>) -> bool {
    non_empty(raw).is_some_and(|value| value.eq_ignore_ascii_case("Y"))
}

/// Coerce-or-null normalizer that remembers what it had to discard.
#[derive(Debug, Default)]
pub struct FieldNormalizer {
    failures: BTreeMap<&'static str, usize>,
}

impl FieldNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn float(&mut self, field: &'static str, raw: Option<&str>) -> Option<f64> {
        let coerced = parse_float(raw);
        self.settle(field, coerced)
    }

    pub fn int(&mut self, field: &'static str, raw: Option<&str>) -> Option<i64> {
        let coerced = parse_int(raw);
        self.settle(field, coerced)
    }

    /// Years are stored as `i32`; values outside that range count as failures.
    pub fn year(&mut self, field: &'static str, raw: Option<&str>) -> Option<i32> {
        let coerced = parse_int(raw).and_then(|year| {
            year.map(i32::try_from).transpose().map_err(|_| CoercionFailure {
                raw: raw.unwrap_or_default().trim().to_string(),
                expected: "year",
            })
        });
        self.settle(field, coerced)
    }

    pub fn date(&mut self, field: &'static str, raw: Option<&str>, format: &str) -> Option<NaiveDate> {
        let coerced = parse_date(raw, format);
        self.settle(field, coerced)
    }

    /// Coded values; text outside the code set counts as a failure.
    pub fn code<T>(
        &mut self,
        field: &'static str,
        raw: Option<&str>,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        let coerced = match non_empty(raw) {
            None => Ok(None),
            Some(value) => parse(value).map(Some).ok_or_else(|| CoercionFailure {
                raw: value.to_string(),
                expected: "code",
            }),
        };
        self.settle(field, coerced)
    }

    fn settle<T>(&mut self, field: &'static str, coerced: Coerced<T>) -> Option<T> {
        match coerced {
            Ok(value) => value,
            Err(failure) => {
                trace!(field, %failure, "coerced to null");
                *self.failures.entry(field).or_insert(0) += 1;
                None
            }
        }
    }

    pub fn failures(&self) -> &BTreeMap<&'static str, usize> {
        &self.failures
    }

    pub fn into_failures(self) -> BTreeMap<&'static str, usize> {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(Some(" 37.5 ")), Ok(Some(37.5)));
        assert_eq!(parse_float(Some("")), Ok(None));
        assert_eq!(parse_float(None), Ok(None));
        assert!(parse_float(Some("n/a")).is_err());
        assert!(parse_float(Some("NaN")).is_err());
    }

    #[test]
    fn test_parse_int_accepts_integral_floats() {
        assert_eq!(parse_int(Some("2011")), Ok(Some(2011)));
        assert_eq!(parse_int(Some("2011.0")), Ok(Some(2011)));
        assert!(parse_int(Some("2011.5")).is_err());
        assert!(parse_int(Some("two")).is_err());
    }

    #[test]
    fn test_parse_int_rejects_out_of_range_floats() {
        assert!(parse_int(Some("1e30")).is_err());
        assert!(parse_int(Some("-1e30")).is_err());
        assert!(parse_int(Some("9223372036854775808.0")).is_err());
        assert!(parse_int(Some("inf")).is_err());
        assert_eq!(parse_int(Some("-9223372036854775808.0")), Ok(Some(i64::MIN)));
        assert_eq!(parse_int(Some("1e3")), Ok(Some(1000)));

        let mut normalizer = FieldNormalizer::new();
        assert_eq!(normalizer.int("INJURED", Some("1e30")), None);
        assert_eq!(normalizer.failures().get("INJURED"), Some(&1));
    }

    #[test]
    fn test_parse_date_fixed_format() {
        let date = parse_date(Some("20220314"), "%Y%m%d").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2022, 3, 14));

        assert!(parse_date(Some("2022-03-14"), "%Y%m%d").is_err());
        assert!(parse_date(Some("20221345"), "%Y%m%d").is_err());
        assert_eq!(parse_date(Some("  "), "%Y%m%d"), Ok(None));
    }

    #[test]
    fn test_text_normalization() {
        assert_eq!(key_text(Some("  Chevrolet ")), Some("CHEVROLET".to_string()));
        assert_eq!(display_text(Some("  Chevrolet ")), Some("Chevrolet".to_string()));
        assert_eq!(display_text(Some("   ")), None);
    }

    #[test]
    fn test_flags() {
        assert!(flag(Some("Y")));
        assert!(flag(Some(" y ")));
        assert!(!flag(Some("N")));
        assert!(!flag(None));
    }

    #[test]
    fn test_normalizer_counts_failures() {
        let mut normalizer = FieldNormalizer::new();

        assert_eq!(normalizer.float("comb08", Some("abc")), None);
        assert_eq!(normalizer.float("comb08", Some("")), None);
        assert_eq!(normalizer.float("comb08", Some("xyz")), None);
        assert_eq!(normalizer.year("year", Some("99999999999")), None);
        assert_eq!(normalizer.year("year", Some("2011")), Some(2011));

        assert_eq!(normalizer.code("status_code", Some("X"), |_| None::<u8>), None);
        assert_eq!(normalizer.code("status_code", Some(" E "), |c| (c == "E").then_some(1)), Some(1));

        assert_eq!(normalizer.failures().get("comb08"), Some(&2));
        assert_eq!(normalizer.failures().get("status_code"), Some(&1));
        assert_eq!(normalizer.failures().get("year"), Some(&1));
    }
}
