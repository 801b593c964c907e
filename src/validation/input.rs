//! Scenario length validation.

use thiserror::Error;

/// Why a scenario was rejected before any external call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Scenario cannot be empty")]
    Empty,
    #[error("Scenario must be at least {min} character(s)")]
    TooShort { min: usize },
    #[error("Scenario must be {max} characters or less (currently: {actual})")]
    TooLong { max: usize, actual: usize },
}

/// Enforces scenario length bounds over the trimmed text, counted in
/// characters. Pure: no side effects, no I/O.
#[derive(Debug, Clone)]
pub struct InputValidator {
    min_length: usize,
    max_length: usize,
}

impl InputValidator {
    pub fn new(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
        }
    }

    pub fn validate(&self, scenario: &str) -> Result<(), InputError> {
        let length = scenario.trim().chars().count();
        if length == 0 {
            return Err(InputError::Empty);
        }
        if length < self.min_length {
            return Err(InputError::TooShort {
                min: self.min_length,
            });
        }
        if length > self.max_length {
            return Err(InputError::TooLong {
                max: self.max_length,
                actual: length,
            });
        }
        Ok(())
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}
