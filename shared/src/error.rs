//! Error handling for the dashboard core
//!
//! Tray-level precondition mismatches are not errors: the transition engine
//! skips them silently. The variants below cover what callers can actually
//! act on.

use thiserror::Error;

use crate::models::ActionKind;
use crate::types::TargetType;

/// Dashboard core error types
#[derive(Error, Debug)]
pub enum FarmError {
    #[error("Unknown crop: {0}")]
    UnknownCrop(String),

    #[error("Nothing is selected")]
    EmptySelection,

    #[error("Selection mixes {0} and {1} targets")]
    MixedSelection(TargetType, TargetType),

    #[error("No tray in the target is eligible for {0}")]
    NoEligibleTrays(ActionKind),

    #[error("Invalid crop catalog: {0}")]
    InvalidCatalog(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for dashboard operations
pub type FarmResult<T> = Result<T, FarmError>;

impl FarmError {
    /// Stable machine-readable code for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            FarmError::UnknownCrop(_) => "UNKNOWN_CROP",
            FarmError::EmptySelection => "EMPTY_SELECTION",
            FarmError::MixedSelection(..) => "MIXED_SELECTION",
            FarmError::NoEligibleTrays(_) => "NO_ELIGIBLE_TRAYS",
            FarmError::InvalidCatalog(_) => "INVALID_CATALOG",
            FarmError::Configuration(_) => "CONFIGURATION_ERROR",
            FarmError::Validation(_) => "VALIDATION_ERROR",
            FarmError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
