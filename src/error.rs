// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

/// Errors that can occur during grid construction, I/O, or a solve.
#[derive(Debug)]
pub enum TofError {
    /// Grid dimensionality is not 2 or 3.
    InvalidDimensions(usize),
    /// Grid topology arrays are inconsistent (CSR shape, index bounds, etc.).
    InvalidTopology {
        /// Explanation of the inconsistency.
        reason: String,
    },
    /// A per-cell or per-face input array has the wrong length.
    LengthMismatch {
        /// Which array is wrong.
        name: &'static str,
        /// The length implied by the grid.
        expected: usize,
        /// The length provided.
        got: usize,
    },
    /// Source terms do not sum to zero within tolerance.
    UnbalancedSource {
        /// The cumulative source over all cells.
        sum: f64,
        /// The tolerance that was exceeded (1% of the largest source magnitude).
        limit: f64,
    },
    /// A cyclic component's linear system has no unique solution.
    SingularComponent {
        /// Number of cells in the component.
        size: usize,
    },
    /// Unsupported file format (unrecognized extension).
    UnsupportedFileFormat(String),
    /// Unsupported data type in file.
    UnsupportedDtype(String),
    /// I/O error occurred.
    IoError(std::io::Error),
    /// Other error with a descriptive message.
    Other(String),
}

impl fmt::Display for TofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TofError::InvalidDimensions(d) => {
                write!(f, "invalid grid dimensionality: {} (must be 2 or 3)", d)
            }
            TofError::InvalidTopology { reason } => {
                write!(f, "invalid grid topology: {}", reason)
            }
            TofError::LengthMismatch {
                name,
                expected,
                got,
            } => {
                write!(
                    f,
                    "array '{}' has length {} but the grid requires {}",
                    name, got, expected
                )
            }
            TofError::UnbalancedSource { sum, limit } => {
                write!(
                    f,
                    "source terms do not sum to zero: cumulative source {} exceeds tolerance {}",
                    sum, limit
                )
            }
            TofError::SingularComponent { size } => {
                write!(
                    f,
                    "linear system for cyclic component of {} cells is singular \
                     (closed loop with no sink?)",
                    size
                )
            }
            TofError::UnsupportedFileFormat(ext) => {
                write!(f, "unsupported file format: {}", ext)
            }
            TofError::UnsupportedDtype(dtype) => {
                write!(f, "unsupported dtype: {}", dtype)
            }
            TofError::IoError(e) => write!(f, "I/O error: {}", e),
            TofError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TofError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TofError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TofError {
    fn from(e: std::io::Error) -> Self {
        TofError::IoError(e)
    }
}

/// Convenience type alias for Results with TofError.
pub type Result<T> = std::result::Result<T, TofError>;
