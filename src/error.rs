//! Crate error type.
//!
//! Everything fatal funnels into [`Error`]; the binary prints it as a
//! single `ERROR:` line and exits nonzero. Rendering itself never fails:
//! numeric edge cases produce clamped or black output instead.

use std::path::PathBuf;

/// Fatal error raised while loading a scene or writing output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Scene file violates the format; carries the offending tag for
    /// context.
    #[error("scene file parse error at tag <{tag}> Error: {message}")]
    Parse {
        /// Raw text of the tag being parsed.
        tag: String,
        /// What went wrong.
        message: String,
    },

    /// A file could not be opened or read.
    #[error("\"{}\" could not be opened: {source}", .path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An asset (mesh or texture) failed to load or decode.
    #[error("{}: {message}", .path.display())]
    Asset {
        /// Path of the asset.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Inconsistent render configuration, rejected before rendering starts.
    #[error("{0}")]
    Config(String),

    /// PNG/APNG encoding failed.
    #[error("writing image failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
