//! Validation helpers for definitions
//!
//! Option, section and settings definitions are checked with these helpers
//! before anything is registered. Each check reports a [`ValidationError`]
//! naming the offending field; [`Validator::collect_errors`] gathers them so
//! the caller sees every problem at once.

pub use crate::error::ValidationError;

/// Common validators for definition values
pub struct Validator;

impl Validator {
    /// Validates that a numeric value is within a range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Validates that a lower bound does not exceed an upper bound
    pub fn ordered<T>(min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if min > max {
            Err(ValidationError::with_value(
                field,
                "minimum must not exceed maximum",
                format!("{}..{}", min, max),
            ))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Validates that a list has at least one entry
    pub fn has_entries<T>(values: &[T], field: &str) -> Result<(), ValidationError> {
        if values.is_empty() {
            Err(ValidationError::new(field, "must list at least one value"))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is an octal file mode
    pub fn octal_mode(value: &str, field: &str) -> Result<(), ValidationError> {
        match u32::from_str_radix(value, 8) {
            Ok(mode) if mode <= 0o7777 => Ok(()),
            _ => Err(ValidationError::with_value(
                field,
                "must be an octal file mode",
                value,
            )),
        }
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_valid() {
        assert!(Validator::in_range(50, 0, 100, "test").is_ok());
        assert!(Validator::in_range(0, 0, 100, "test").is_ok());
        assert!(Validator::in_range(100, 0, 100, "test").is_ok());
    }

    #[test]
    fn test_in_range_invalid() {
        assert!(Validator::in_range(-1, 0, 100, "test").is_err());
        assert!(Validator::in_range(101, 0, 100, "test").is_err());
    }

    #[test]
    fn test_ordered() {
        assert!(Validator::ordered(0, 10, "test").is_ok());
        assert!(Validator::ordered(5, 5, "test").is_ok());
        assert!(Validator::ordered(10, 0, "test").is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(Validator::not_empty("hello", "test").is_ok());
        assert!(Validator::not_empty("", "test").is_err());
        assert!(Validator::not_empty("   ", "test").is_err());
    }

    #[test]
    fn test_has_entries() {
        assert!(Validator::has_entries(&["a"], "test").is_ok());
        assert!(Validator::has_entries::<&str>(&[], "test").is_err());
    }

    #[test]
    fn test_octal_mode() {
        assert!(Validator::octal_mode("600", "test").is_ok());
        assert!(Validator::octal_mode("0644", "test").is_ok());
        assert!(Validator::octal_mode("abc", "test").is_err());
        assert!(Validator::octal_mode("999", "test").is_err());
    }

    #[test]
    fn test_collect_errors_some_err() {
        let results = vec![
            Ok(()),
            Err(ValidationError::new("field1", "error1")),
            Ok(()),
            Err(ValidationError::new("field2", "error2")),
        ];
        let result = Validator::collect_errors(results);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().len(), 2);
    }
}
