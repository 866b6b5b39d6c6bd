/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, CompletionLog, Settings),
/// the pure metric calculations over them, and the validation rules that
/// the form boundary applies before data reaches the store.

pub mod habit;
pub mod log;
pub mod settings;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use log::*;
pub use settings::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors raised when user input fails validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid target days: {0}")]
    InvalidTargetDays(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
