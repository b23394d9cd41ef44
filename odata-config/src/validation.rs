// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty after trimming
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate a `$format` alias.
    ///
    /// Tokens containing `/` are read as literal content types and never
    /// reach alias lookup, and `,` would clash with list syntax in query
    /// options, so neither may appear in an alias.
    pub fn alias(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        if let Some(c) = value.trim().chars().find(|c| matches!(c, '/' | ',' | ';')) {
            return Err(ConfigError::ValidationError(format!(
                "{} '{}' must not contain '{}'",
                field, value, c
            )));
        }
        Ok(())
    }

    /// Validate that an optional list, when given, is not empty
    pub fn non_empty_list<T>(value: Option<&[T]>, field: &str) -> Result<()> {
        if value.is_some_and(|items| items.is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "{} must list at least one entry when given",
                field
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("  ", "field").is_err());
    }

    #[test]
    fn test_alias_validation() {
        assert!(ConfigValidator::alias("csv", "alias").is_ok());
        assert!(ConfigValidator::alias(" json ", "alias").is_ok());
        assert!(ConfigValidator::alias("text/csv", "alias").is_err());
        assert!(ConfigValidator::alias("a,b", "alias").is_err());
        assert!(ConfigValidator::alias("", "alias").is_err());
    }

    #[test]
    fn test_non_empty_list_validation() {
        assert!(ConfigValidator::non_empty_list::<u8>(None, "kinds").is_ok());
        assert!(ConfigValidator::non_empty_list(Some(&[1u8][..]), "kinds").is_ok());
        assert!(ConfigValidator::non_empty_list::<u8>(Some(&[][..]), "kinds").is_err());
    }
}
