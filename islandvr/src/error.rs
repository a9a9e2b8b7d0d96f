use std::fmt;
use std::io;

/// Failures at the edges of the navigation core: building surfaces from raw
/// geometry and loading configuration. Navigation itself never errors.
#[derive(Debug)]
pub enum NavError {
    /// Configuration text could not be parsed
    Config { context: String, message: String },

    /// I/O operation failures
    Io { operation: String, source: io::Error },

    /// Geometry handed over by the loader cannot be used as a navigable surface
    InvalidSurface { surface: String, reason: String },

    /// A value is outside the range the navigation core accepts
    Validation { item: String, reason: String },
}

pub type NavResult<T> = Result<T, NavError>;

impl NavError {
    pub fn invalid_surface(surface: impl Into<String>, reason: impl Into<String>) -> Self {
        NavError::InvalidSurface {
            surface: surface.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(item: impl Into<String>, reason: impl Into<String>) -> Self {
        NavError::Validation {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::Config { context, message } => {
                write!(f, "Configuration error in {}: {}", context, message)
            }
            NavError::Io { operation, source } => {
                write!(f, "I/O error during '{}': {}", operation, source)
            }
            NavError::InvalidSurface { surface, reason } => {
                write!(f, "Invalid navigable surface '{}': {}", surface, reason)
            }
            NavError::Validation { item, reason } => {
                write!(f, "Validation failed for {}: {}", item, reason)
            }
        }
    }
}

impl std::error::Error for NavError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NavError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
