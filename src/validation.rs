// 📐 Boundary validation for incoming numbers
// Requests are checked here before the converter ever sees them, with
// field-level messages a client can show directly.

use serde_json::Value;
use std::num::IntErrorKind;

use crate::words::MAX_MAGNITUDE;

pub const INPUT_NUMBER_FIELD: &str = "input_number";

const MSG_REQUIRED: &str = "This field is required.";
const MSG_INVALID: &str = "A valid integer is required.";

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn input_number(message: impl Into<String>) -> Self {
        ValidationError {
            field: INPUT_NUMBER_FIELD.to_string(),
            message: message.into(),
        }
    }

    fn too_large() -> Self {
        Self::input_number(format!(
            "Ensure this value is less than or equal to {}.",
            MAX_MAGNITUDE
        ))
    }

    fn too_small() -> Self {
        Self::input_number(format!(
            "Ensure this value is greater than or equal to -{}.",
            MAX_MAGNITUDE
        ))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// INPUT NUMBER
// ============================================================================

/// Validate the `input_number` field of a request body.
///
/// Accepts JSON integers, integral floats and numeric strings. Range is
/// `[-9223372036854775807, 9223372036854775807]`.
pub fn validate_input_number(value: Option<&Value>) -> Result<i64, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::input_number(MSG_REQUIRED)),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                check_range(i as i128)
            } else if let Some(u) = n.as_u64() {
                check_range(u as i128)
            } else {
                n.as_f64()
                    .map(from_float)
                    .unwrap_or_else(|| Err(ValidationError::input_number(MSG_INVALID)))
            }
        }
        Some(Value::String(s)) => parse_input_number(s),
        Some(_) => Err(ValidationError::input_number(MSG_INVALID)),
    }
}

/// Parse a textual number (CLI arguments, CSV cells, JSON strings).
pub fn parse_input_number(raw: &str) -> Result<i64, ValidationError> {
    match raw.trim().parse::<i128>() {
        Ok(n) => check_range(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Err(ValidationError::too_large()),
            IntErrorKind::NegOverflow => Err(ValidationError::too_small()),
            IntErrorKind::Empty => Err(ValidationError::input_number(MSG_REQUIRED)),
            _ => Err(ValidationError::input_number(MSG_INVALID)),
        },
    }
}

fn check_range(n: i128) -> Result<i64, ValidationError> {
    let max = MAX_MAGNITUDE as i128;
    if n > max {
        Err(ValidationError::too_large())
    } else if n < -max {
        Err(ValidationError::too_small())
    } else {
        Ok(n as i64)
    }
}

// Literals past u64 (e.g. 1000000000000000000000) arrive as floats
fn from_float(f: f64) -> Result<i64, ValidationError> {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;

    if !f.is_finite() || f.fract() != 0.0 {
        return Err(ValidationError::input_number(MSG_INVALID));
    }
    if f >= BOUND {
        Err(ValidationError::too_large())
    } else if f <= -BOUND {
        Err(ValidationError::too_small())
    } else {
        check_range(f as i128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(result: Result<i64, ValidationError>) -> String {
        result.unwrap_err().message
    }

    #[test]
    fn test_accepts_integers() {
        assert_eq!(validate_input_number(Some(&json!(0))), Ok(0));
        assert_eq!(validate_input_number(Some(&json!(-42))), Ok(-42));
        assert_eq!(validate_input_number(Some(&json!(i64::MAX))), Ok(i64::MAX));
        assert_eq!(validate_input_number(Some(&json!(-i64::MAX))), Ok(-i64::MAX));
    }

    #[test]
    fn test_accepts_numeric_strings_and_integral_floats() {
        assert_eq!(validate_input_number(Some(&json!("1155"))), Ok(1155));
        assert_eq!(validate_input_number(Some(&json!(" 12 "))), Ok(12));
        assert_eq!(validate_input_number(Some(&json!(33.0))), Ok(33));
    }

    #[test]
    fn test_required() {
        assert_eq!(message(validate_input_number(None)), "This field is required.");
        assert_eq!(
            message(validate_input_number(Some(&Value::Null))),
            "This field is required."
        );
    }

    #[test]
    fn test_rejects_non_integers() {
        for value in [json!(1.5), json!("abc"), json!(true), json!([1]), json!({"n": 1})] {
            assert_eq!(
                message(validate_input_number(Some(&value))),
                "A valid integer is required.",
                "value: {}",
                value
            );
        }
    }

    #[test]
    fn test_upper_bound() {
        let expected = "Ensure this value is less than or equal to 9223372036854775807.";

        assert_eq!(message(validate_input_number(Some(&json!(u64::MAX)))), expected);
        assert_eq!(message(parse_input_number("9223372036854775808")), expected);

        let huge: Value = serde_json::from_str("1000000000000000000000").unwrap();
        let err = validate_input_number(Some(&huge)).unwrap_err();
        assert_eq!(err.field, "input_number");
        assert_eq!(err.message, expected);

        assert_eq!(
            message(parse_input_number("99999999999999999999999999999999999999999999")),
            expected
        );
    }

    #[test]
    fn test_lower_bound() {
        let expected = "Ensure this value is greater than or equal to -9223372036854775807.";

        assert_eq!(message(validate_input_number(Some(&json!(i64::MIN)))), expected);
        assert_eq!(message(parse_input_number("-9223372036854775808")), expected);
    }

    #[test]
    fn test_display() {
        let err = parse_input_number("x").unwrap_err();
        assert_eq!(err.to_string(), "input_number: A valid integer is required.");
    }
}
