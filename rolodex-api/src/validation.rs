//! Validation Traits
//!
//! Request-shape checks shared by route handlers. Business-field rules for
//! spreadsheet rows live in [`crate::services::row_validator`].

use crate::error::{ApiError, ApiResult};

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use rolodex_api::validation::ValidateNonEmpty;
///
/// fn start_edit(user_id: Option<&str>) -> ApiResult<()> {
///     user_id.validate_non_empty("userId")?;
///     // ... rest of logic
/// }
/// ```
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty.
    ///
    /// # Errors
    /// Returns `ApiError::missing_field` if the value is absent, empty, or
    /// whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for &str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        (*self).validate_non_empty(field_name)
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Inclusive range check for pagination parameters.
pub trait ValidateRange: Sized {
    fn validate_range(&self, field_name: &str, min: Self, max: Self) -> ApiResult<()>;
}

impl ValidateRange for u64 {
    fn validate_range(&self, field_name: &str, min: u64, max: u64) -> ApiResult<()> {
        if *self < min || *self > max {
            return Err(ApiError::invalid_range(field_name, min, max));
        }
        Ok(())
    }
}

/// Trait for checking if an update request has any fields set.
///
/// # Example
/// ```ignore
/// use rolodex_api::validation::HasUpdates;
///
/// fn update_contact(req: UpdateContactRequest) -> ApiResult<()> {
///     req.validate_has_updates()?;
///     // ... rest of logic
/// }
/// ```
pub trait HasUpdates {
    /// Check if any update fields are set.
    fn has_any_updates(&self) -> bool;

    /// Validate that at least one update field is set.
    fn validate_has_updates(&self) -> ApiResult<()> {
        if !self.has_any_updates() {
            return Err(ApiError::invalid_input(
                "At least one field must be provided for update",
            ));
        }
        Ok(())
    }
}
