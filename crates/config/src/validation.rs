//! Range checks for preference values

use crate::error::ValidationError;
use std::fmt::Display;
use std::ops::RangeInclusive;

/// Collects every out-of-range field instead of stopping at the first
#[derive(Debug, Default)]
pub struct RangeChecks {
    errors: Vec<ValidationError>,
}

impl RangeChecks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<T>(mut self, field: &'static str, value: T, allowed: RangeInclusive<T>) -> Self
    where
        T: PartialOrd + Display,
    {
        if !allowed.contains(&value) {
            self.errors.push(ValidationError {
                field,
                expected: format!("{}..={}", allowed.start(), allowed.end()),
                actual: value.to_string(),
            });
        }
        self
    }

    pub fn finish(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
