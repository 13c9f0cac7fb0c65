// 🔢 Number → English words
// The only piece of real logic in the system: every conversion record's
// `output_words` is derived here, once, at creation time.
//
// Decomposition:
//   0..=9     → ONES
//   10..=19   → TEENS
//   20..=99   → TENS stem, hyphen, ones word
//   100..     → <quotient> <scale> [<remainder>] for the widest band that fits

use serde_json::Value;
use thiserror::Error;

/// Largest magnitude we can spell (signed 64-bit max).
pub const MAX_MAGNITUDE: u64 = i64::MAX as u64;

// ============================================================================
// LEXICAL TABLES
// ============================================================================

static ONES: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

static TEENS: [&str; 10] = [
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];

/// Indexed by tens digit; 0 and 1 never reach this table.
static TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

// ============================================================================
// BANDS
// ============================================================================

/// Magnitude grouping used to split a number into quotient and remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Hundred,
    Thousand,
    Million,
    Billion,
    Trillion,
    Quadrillion,
    Quintillion,
}

impl Band {
    /// Smallest to largest.
    pub const ALL: [Band; 7] = [
        Band::Hundred,
        Band::Thousand,
        Band::Million,
        Band::Billion,
        Band::Trillion,
        Band::Quadrillion,
        Band::Quintillion,
    ];

    /// Divisor that separates the quotient words from the remainder
    pub fn base(&self) -> u64 {
        match self {
            Band::Hundred => 100,
            Band::Thousand => 1_000,
            Band::Million => 1_000_000,
            Band::Billion => 1_000_000_000,
            Band::Trillion => 1_000_000_000_000,
            Band::Quadrillion => 1_000_000_000_000_000,
            Band::Quintillion => 1_000_000_000_000_000_000,
        }
    }

    pub fn scale_name(&self) -> &'static str {
        match self {
            Band::Hundred => "hundred",
            Band::Thousand => "thousand",
            Band::Million => "million",
            Band::Billion => "billion",
            Band::Trillion => "trillion",
            Band::Quadrillion => "quadrillion",
            Band::Quintillion => "quintillion",
        }
    }

    /// Widest band whose base fits in `num`. `None` below 100.
    pub fn containing(num: u64) -> Option<Band> {
        Band::ALL.iter().rev().copied().find(|band| num >= band.base())
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value handed over is not an integer at all
    #[error("An integer type number was not provided (got {found}).")]
    NotAnInteger { found: String },

    /// No scale name exists past quintillion, so we refuse instead of guessing
    #[error("The absolute value of {value} is greater than 9223372036854775807.")]
    OutOfRange { value: i128 },
}

// ============================================================================
// CONVERSION
// ============================================================================

/// Convert an integer to English words.
///
/// Accepts any integer type that widens into `i128` so callers holding
/// out-of-range values (e.g. `9223372036854775808`) get an error, not a
/// silent truncation.
///
/// ```
/// use numbers_api::words::convert;
///
/// assert_eq!(convert(1129).unwrap(), "one thousand one hundred twenty-nine");
/// assert_eq!(convert(-22).unwrap(), "negative twenty-two");
/// ```
pub fn convert(num: impl Into<i128>) -> Result<String, ConversionError> {
    let num = num.into();
    let magnitude = u64::try_from(num.unsigned_abs())
        .ok()
        .filter(|m| *m <= MAX_MAGNITUDE)
        .ok_or(ConversionError::OutOfRange { value: num })?;

    let words = spell(magnitude);
    if num < 0 {
        Ok(format!("negative {}", words))
    } else {
        Ok(words)
    }
}

/// Convert a dynamically typed value (e.g. a JSON request field).
pub fn convert_value(value: &Value) -> Result<String, ConversionError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                convert(i)
            } else if let Some(u) = n.as_u64() {
                convert(u)
            } else {
                Err(ConversionError::NotAnInteger {
                    found: n.to_string(),
                })
            }
        }
        other => Err(ConversionError::NotAnInteger {
            found: other.to_string(),
        }),
    }
}

fn spell(num: u64) -> String {
    match num {
        0..=9 => ONES[num as usize].to_string(),
        10..=19 => TEENS[(num - 10) as usize].to_string(),
        20..=99 => {
            let stem = TENS[(num / 10) as usize];
            match num % 10 {
                0 => stem.to_string(),
                ones => format!("{}-{}", stem, spell(ones)),
            }
        }
        _ => spell_band(num, Band::containing(num).unwrap_or(Band::Hundred)),
    }
}

/// `<quotient words> <scale name> [<remainder words>]`
fn spell_band(num: u64, band: Band) -> String {
    let quotient = num / band.base();
    let remainder = num % band.base();

    let head = format!("{} {}", spell(quotient), band.scale_name());
    if remainder == 0 {
        head
    } else {
        format!("{} {}", head, spell(remainder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_ones_and_teens() {
        assert_eq!(convert(0).unwrap(), "zero");
        assert_eq!(convert(7).unwrap(), "seven");
        assert_eq!(convert(10).unwrap(), "ten");
        assert_eq!(convert(13).unwrap(), "thirteen");
        assert_eq!(convert(19).unwrap(), "nineteen");
    }

    #[test]
    fn test_tens() {
        assert_eq!(convert(20).unwrap(), "twenty");
        assert_eq!(convert(22).unwrap(), "twenty-two");
        assert_eq!(convert(30).unwrap(), "thirty");
        assert_eq!(convert(40).unwrap(), "forty");
        assert_eq!(convert(99).unwrap(), "ninety-nine");
    }

    #[test]
    fn test_hundreds() {
        assert_eq!(convert(100).unwrap(), "one hundred");
        assert_eq!(convert(105).unwrap(), "one hundred five");
        assert_eq!(convert(999).unwrap(), "nine hundred ninety-nine");
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(convert(1000).unwrap(), "one thousand");
        assert_eq!(convert(1129).unwrap(), "one thousand one hundred twenty-nine");
        assert_eq!(
            convert(99999).unwrap(),
            "ninety-nine thousand nine hundred ninety-nine"
        );
        assert_eq!(
            convert(999_999).unwrap(),
            "nine hundred ninety-nine thousand nine hundred ninety-nine"
        );
        assert_eq!(convert(1_000_000).unwrap(), "one million");
        assert_eq!(convert(1_000_000_000).unwrap(), "one billion");
        assert_eq!(convert(1_000_000_000_000_000_000_i64).unwrap(), "one quintillion");
    }

    #[test]
    fn test_exact_powers_pick_their_own_scale() {
        // Each power of 1000 names its own band, never the one below.
        let names = ["thousand", "million", "billion", "trillion", "quadrillion", "quintillion"];
        let mut power: i64 = 1;
        for name in names {
            power *= 1000;
            assert_eq!(convert(power).unwrap(), format!("one {}", name));
            assert!(convert(power - 1).unwrap().starts_with("nine hundred ninety-nine"));
        }
    }

    #[test]
    fn test_zero_groups_are_skipped() {
        assert_eq!(
            convert(81_020_010_000_099_i64).unwrap(),
            "eighty-one trillion twenty billion ten million ninety-nine"
        );
        assert_eq!(convert(1_000_001).unwrap(), "one million one");
    }

    #[test]
    fn test_i64_max() {
        assert_eq!(
            convert(i64::MAX).unwrap(),
            "nine quintillion two hundred twenty-three quadrillion three hundred \
             seventy-two trillion thirty-six billion eight hundred fifty-four million \
             seven hundred seventy-five thousand eight hundred seven"
        );
    }

    #[test]
    fn test_negative() {
        assert_eq!(convert(-1).unwrap(), "negative one");
        assert_eq!(
            convert(-i64::MAX).unwrap(),
            format!("negative {}", convert(i64::MAX).unwrap())
        );
    }

    #[test]
    fn test_out_of_range() {
        let too_big = i64::MAX as i128 + 1;
        assert_eq!(
            convert(too_big),
            Err(ConversionError::OutOfRange { value: too_big })
        );
        assert!(convert(i64::MIN).is_err());
        assert!(convert(u64::MAX).is_err());
        assert!(convert(1_000_000_000_000_000_000_000_i128).is_err());
    }

    #[test]
    fn test_convert_value() {
        assert_eq!(convert_value(&json!(22)).unwrap(), "twenty-two");
        assert_eq!(convert_value(&json!(-5)).unwrap(), "negative five");
        assert!(matches!(
            convert_value(&json!(u64::MAX)),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(matches!(
            convert_value(&json!(1.5)),
            Err(ConversionError::NotAnInteger { .. })
        ));
        assert!(matches!(
            convert_value(&json!("12")),
            Err(ConversionError::NotAnInteger { .. })
        ));
        assert!(matches!(
            convert_value(&Value::Null),
            Err(ConversionError::NotAnInteger { .. })
        ));
    }

    #[test]
    fn test_band_containing() {
        assert_eq!(Band::containing(99), None);
        assert_eq!(Band::containing(100), Some(Band::Hundred));
        assert_eq!(Band::containing(999), Some(Band::Hundred));
        assert_eq!(Band::containing(1000), Some(Band::Thousand));
        assert_eq!(Band::containing(MAX_MAGNITUDE), Some(Band::Quintillion));
    }

    proptest! {
        #[test]
        fn test_alphabet(n in 0..=i64::MAX) {
            let words = convert(n).unwrap();
            prop_assert!(!words.is_empty());
            prop_assert!(words.chars().all(|c| c.is_ascii_lowercase() || c == ' ' || c == '-'));
            prop_assert!(!words.contains("  "));
            prop_assert!(!words.starts_with(' ') && !words.ends_with(' '));
        }

        #[test]
        fn test_sign_symmetry(n in 1..=i64::MAX) {
            prop_assert_eq!(convert(-n).unwrap(), format!("negative {}", convert(n).unwrap()));
        }

        #[test]
        fn test_idempotent(n in -i64::MAX..=i64::MAX) {
            prop_assert_eq!(convert(n).unwrap(), convert(n).unwrap());
        }

        #[test]
        fn test_zero_only_alone(n in 1..=i64::MAX) {
            prop_assert!(!convert(n).unwrap().contains("zero"));
        }
    }
}
