//! Error types for the blob engine.
//!
//! This module provides a unified error type [`BlobError`] and a convenient [`Result`] alias.

use std::fmt;

/// Main error type for the engine.
///
/// Non-finite or out-of-range point data is not represented here: the
/// validator repairs it in place and reports it as an event instead.
#[derive(Debug)]
pub enum BlobError {
    /// The three per-point sequences disagree with the configured point count.
    ConfigurationMismatch {
        expected: usize,
        positions: usize,
        velocities: usize,
        targets: usize,
    },
    /// A configuration value is outside its accepted range.
    InvalidParameter { name: &'static str, reason: String },
    /// A ring needs at least three control points.
    InsufficientPoints { count: usize },
    /// The simulation thread could not be spawned.
    ThreadSpawn(std::io::Error),
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConfigurationMismatch {
                expected,
                positions,
                velocities,
                targets,
            } => write!(
                f,
                "configuration mismatch: expected {expected} points, got positions={positions} velocities={velocities} targets={targets}"
            ),
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter `{name}`: {reason}")
            }
            Self::InsufficientPoints { count } => {
                write!(f, "a blob needs at least 3 control points, got {count}")
            }
            Self::ThreadSpawn(err) => write!(f, "failed to spawn simulation thread: {err}"),
        }
    }
}

impl std::error::Error for BlobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ThreadSpawn(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenient Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, BlobError>;

impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        Self::ThreadSpawn(err)
    }
}
