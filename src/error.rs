use std::path::PathBuf;

/// Error type for esearch queries and their interactive follow-up.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A search or exclude pattern is not a valid regular expression.
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        /// The raw pattern as given by the user.
        pattern: String,
        /// The underlying regex compilation error.
        source: regex::Error,
    },

    /// No editor is configured to open the selected ebuild.
    #[error("please set EDITOR")]
    MissingEditor,

    /// The selected ebuild number is outside `1..=available`.
    #[error("no such ebuild: {selection} (choose 1-{available})")]
    NoSuchEbuild {
        /// The number entered by the user.
        selection: usize,
        /// Number of ebuilds listed.
        available: usize,
    },

    /// Input was neither a number nor empty with a default available.
    #[error("please enter a valid number: {0:?}")]
    InvalidSelection(String),

    /// The user interrupted the selection prompt.
    #[error("interrupted")]
    InputInterrupted,

    /// Filesystem error while scanning a directory or reading a file.
    #[error("{}: {source}", .path.display())]
    Io {
        /// Path that was being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Error writing results or the prompt.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// The search index is missing or malformed.
    #[error("{0}")]
    Index(String),

    /// The search index was generated by an older version.
    #[error("search index is out of date (version {found}, need {needed}); please regenerate it")]
    IndexOutOfDate {
        /// Version recorded in the index file.
        found: u32,
        /// Minimum version this build understands.
        needed: u32,
    },

    /// Invalid package version string.
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    /// Invalid IUSE flag entry.
    #[error("invalid IUSE entry: {0}")]
    InvalidIUse(String),

    /// Error parsing a metadata cache entry.
    #[error("invalid cache entry: {0}")]
    InvalidCacheEntry(String),

    /// The editor command could not be started.
    #[error("failed to run editor '{editor}': {source}")]
    Editor {
        /// The editor command line.
        editor: String,
        /// The underlying spawn error.
        source: std::io::Error,
    },
}

/// Result type for esearch operations.
pub type Result<T> = std::result::Result<T, Error>;
