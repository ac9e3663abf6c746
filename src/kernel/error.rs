//! Simulator error types
//!
//! Queue and memory operations never fail; they tolerate misuse silently.
//! Everything here comes from configuration: bad numbers, bad names, bad files.

use std::fmt;

/// Simulator result type
pub type SimResult<T> = Result<T, SimError>;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Frame count must be at least one
    ZeroFrames,
    /// Round-Robin quantum must be at least one
    ZeroQuantum,
    /// Algorithm name did not match any known policy
    UnknownAlgorithm(String),
    /// Scenario name did not match any fixture
    UnknownScenario(String),
    /// Configuration document was malformed
    InvalidConfig(String),
    /// Configuration file could not be read
    Io(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ZeroFrames => write!(f, "frame count must be positive"),
            SimError::ZeroQuantum => write!(f, "time quantum must be positive"),
            SimError::UnknownAlgorithm(name) => write!(f, "unknown algorithm: {}", name),
            SimError::UnknownScenario(name) => write!(f, "unknown scenario: {}", name),
            SimError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            SimError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::InvalidConfig(e.to_string())
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e.to_string())
    }
}
