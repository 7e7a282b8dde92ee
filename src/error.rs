//! Error handling for the probekit library
//!
//! Containers treat precondition violations as programmer errors and allocation
//! failure as fatal, so this error type only surfaces from the checked `try_*`
//! accessors and from the configuration layer.

use thiserror::Error;

/// Main error type for the probekit library
#[derive(Error, Debug)]
pub enum ProbeError {
    /// I/O related errors (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A checked lookup found no entry for the key
    #[error("Key not found: {context}")]
    KeyNotFound {
        /// Description of the container and key that was looked up
        context: String,
    },

    /// Index out of bounds access
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Invalid data format or corruption
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Error message describing the issue
        message: String,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl ProbeError {
    /// Create a key not found error
    pub fn key_not_found<S: Into<String>>(context: S) -> Self {
        Self::KeyNotFound {
            context: context.into(),
        }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::KeyNotFound { .. } => true,
            Self::OutOfBounds { .. } => false,
            Self::InvalidData { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::KeyNotFound { .. } => "lookup",
            Self::OutOfBounds { .. } => "bounds",
            Self::InvalidData { .. } => "data",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(ProbeError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}

/// Assert that a range is within bounds
#[inline]
pub fn check_range(start: usize, end: usize, size: usize) -> Result<()> {
    if start > end {
        return Err(ProbeError::invalid_data(format!(
            "Invalid range: start {} > end {}",
            start, end
        )));
    }
    if end > size {
        return Err(ProbeError::out_of_bounds(end, size));
    }
    Ok(())
}
