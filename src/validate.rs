//! Single setting validation
//!
//! Coerces one raw override string to the type its declaration names and
//! checks the constraints that apply to that type. Constraints are scoped by
//! type, not by presence: a `minimum` on a `bool` or an `enum` on an
//! `integer` is never looked at, even when its text is garbage.

use std::str::FromStr;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::schema::{SettingDeclaration, SettingType, TypedValue};

/// Validate `value` for the setting `name` against its declaration.
///
/// Returns the coerced value, or the first problem found for this setting.
/// For numeric types the value itself is parsed before the bounds are.
pub fn validate_field(
    name: &str,
    value: &str,
    declaration: &SettingDeclaration,
) -> Result<TypedValue, ValidationError> {
    check(value, declaration).map_err(|kind| ValidationError::new(name, kind))
}

fn check(value: &str, declaration: &SettingDeclaration) -> Result<TypedValue, ValidationErrorKind> {
    match &declaration.setting_type {
        SettingType::Unknown(other) => Err(ValidationErrorKind::UnknownType(other.clone())),
        SettingType::Integer => {
            let parsed = value
                .parse::<i64>()
                .map_err(|_| ValidationErrorKind::ExpectedInteger(value.to_string()))?;
            check_bounds(value, parsed, declaration)?;
            Ok(TypedValue::Integer(parsed))
        }
        SettingType::Number => {
            // finite only: NaN slips past every bound
            let parsed = value
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| ValidationErrorKind::ExpectedNumber(value.to_string()))?;
            check_bounds(value, parsed, declaration)?;
            Ok(TypedValue::Number(parsed))
        }
        SettingType::String => {
            if !declaration.enum_values.is_empty()
                && !declaration.enum_values.iter().any(|allowed| allowed == value)
            {
                return Err(ValidationErrorKind::IllegalString(value.to_string()));
            }
            Ok(TypedValue::String(value.to_string()))
        }
        SettingType::Bool => parse_bool(value)
            .map(TypedValue::Bool)
            .ok_or_else(|| ValidationErrorKind::ExpectedBoolean(value.to_string())),
    }
}

/// Inclusive range check. Bound text is parsed with the value's own type.
fn check_bounds<T>(raw: &str, value: T, declaration: &SettingDeclaration) -> Result<(), ValidationErrorKind>
where
    T: FromStr + PartialOrd,
{
    if let Some(minimum) = &declaration.minimum {
        let min = minimum
            .parse::<T>()
            .map_err(|_| ValidationErrorKind::BadMinimum(minimum.clone()))?;
        if value < min {
            return Err(ValidationErrorKind::TooSmall(raw.to_string()));
        }
    }

    if let Some(maximum) = &declaration.maximum {
        let max = maximum
            .parse::<T>()
            .map_err(|_| ValidationErrorKind::BadMaximum(maximum.clone()))?;
        if value > max {
            return Err(ValidationErrorKind::TooLarge(raw.to_string()));
        }
    }

    Ok(())
}

/// Canonical boolean literals
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(t: &str) -> SettingDeclaration {
        SettingDeclaration::new(t)
    }

    #[test]
    fn test_parse_bool_literals() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(t), Some(true), "{}", t);
        }
        for f in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(f), Some(false), "{}", f);
        }
        for bad in ["yes", "no", "tRUE", "", " true"] {
            assert_eq!(parse_bool(bad), None, "{}", bad);
        }
    }

    #[test]
    fn test_integer_accepts_sign() {
        assert_eq!(validate_field("f", "+7", &decl("integer")).unwrap(), TypedValue::Integer(7));
        assert_eq!(validate_field("f", "-7", &decl("integer")).unwrap(), TypedValue::Integer(-7));
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let err = validate_field("f", "1.5", &decl("integer")).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::ExpectedInteger("1.5".into()));
    }

    #[test]
    fn test_number_rejects_non_finite() {
        let bounded = decl("number").with_minimum("0").with_maximum("1");
        for raw in ["NaN", "nan", "inf", "-inf", "+Infinity"] {
            let err = validate_field("f", raw, &bounded).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::ExpectedNumber(raw.into()), "{}", raw);
            assert!(validate_field("f", raw, &decl("number")).is_err(), "{}", raw);
        }
        assert_eq!(validate_field("f", "1e0", &bounded).unwrap(), TypedValue::Number(1.0));
    }

    #[test]
    fn test_value_parse_failure_wins_over_bad_bound() {
        let d = decl("integer").with_minimum("hello");
        let err = validate_field("f", "hound", &d).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::ExpectedInteger("hound".into()));
    }

    #[test]
    fn test_minimum_checked_before_maximum() {
        let d = decl("number").with_minimum("x").with_maximum("y");
        let err = validate_field("f", "1", &d).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::BadMinimum("x".into()));
    }

    #[test]
    fn test_bad_maximum_reported_after_minimum_passes() {
        let d = decl("number").with_minimum("0").with_maximum("y");
        let err = validate_field("f", "1", &d).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::BadMaximum("y".into()));
    }

    #[test]
    fn test_integer_bound_must_be_integer() {
        let d = decl("integer").with_maximum("10.5");
        let err = validate_field("f", "3", &d).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::BadMaximum("10.5".into()));
    }

    #[test]
    fn test_string_enum_is_case_sensitive() {
        let d = decl("string").with_enum(["cat", "dog"]);
        assert!(validate_field("f", "Cat", &d).is_err());
        assert!(validate_field("f", "dog", &d).is_ok());
    }

    #[test]
    fn test_unknown_type_ignores_value() {
        let err = validate_field("f", "1", &decl("")).unwrap_err();
        assert_eq!(err.to_string(), r#"Setting "f": Bad spec: Unknown type """#);
    }
}
