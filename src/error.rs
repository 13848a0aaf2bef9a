/// Crate-level error types for lorelink diagnostics.
use std::path::PathBuf;

use crate::types::RootKind;

/// Structural failures only. Headers that fail to qualify, ambiguous keywords
/// and empty lookups are ordinary results, never errors.
#[allow(clippy::error_impl_error, reason = "crate-level error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested config file does not exist.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// A document was requested that is not part of the loaded roots.
    #[error("document not loaded: {root}:{}", path.display())]
    DocumentNotFound {
        /// Path relative to the root.
        path: PathBuf,
        /// Root the document was looked up in.
        root: RootKind,
    },

    /// Resolve, search or lookup was called before any rebuild completed.
    #[error("index unavailable: no documents have been indexed yet")]
    IndexUnavailable,

    /// The keyword rule table cannot be turned into a matcher.
    #[error("invalid keyword rule: {reason}")]
    InvalidRule {
        /// Description of the problem.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// Neither a world nor a campaign directory is configured.
    #[error("no world or campaign directory configured")]
    NoRootsConfigured,

    /// A configured root exists but is not a directory.
    #[error("{kind} root is not a directory: {}", path.display())]
    RootNotDirectory {
        /// Which root was misconfigured.
        kind: RootKind,
        /// The offending path.
        path: PathBuf,
    },

    /// A configured root does not exist on disk.
    #[error("{kind} root not found: {}", path.display())]
    RootNotFound {
        /// Which root was misconfigured.
        kind: RootKind,
        /// The missing path.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// TOML serialization failed.
    #[error("toml serialize: {0}")]
    TomlSer(
        /// The wrapped TOML serialization error.
        #[from]
        toml::ser::Error,
    ),
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        return Self::InvalidRule { reason: e.to_string() };
    }
}
