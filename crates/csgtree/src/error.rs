//! Error types for CSG parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a CSG parse.
///
/// A parse either yields a complete [`ParsedCsg`](crate::ParsedCsg) or one of
/// these; no partial tree is ever handed out.
#[derive(Error, Debug)]
pub enum CsgError {
    /// The intermediate CSG file could not be read.
    #[error("failed to read CSG file {}: {source}", path.display())]
    IntermediateRead {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A closing `}` appeared with no open block to close.
    #[error("unbalanced block close at line {line}: no open block")]
    UnbalancedClose {
        /// Line number (1-indexed).
        line: usize,
    },

    /// Input ended while blocks were still open.
    #[error("input ended with {} unclosed block(s): {}", open.len(), open.join(" > "))]
    UnclosedBlocks {
        /// Variant ids of the blocks left open, outermost first.
        open: Vec<String>,
    },
}

impl CsgError {
    /// Create a read error for `path`.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IntermediateRead {
            path: path.into(),
            source,
        }
    }

    /// Whether this error describes unbalanced block structure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnbalancedClose { .. } | Self::UnclosedBlocks { .. }
        )
    }
}

/// Result type for CSG parsing.
pub type Result<T> = std::result::Result<T, CsgError>;
