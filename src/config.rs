use std::path::PathBuf;

/// Output style for search results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Multi-line block per package.
    #[default]
    Normal,
    /// Normal block plus unstable version and USE flags.
    Verbose,
    /// One line per package with a two-letter status prefix.
    Compact,
    /// Compact line plus a numbered list of ebuilds to open.
    EbuildList,
    /// User template, see [`crate::format::CustomFormat`].
    Custom(String),
}

/// Options controlling a single query.
///
/// Built once from the command line and never mutated during the search.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    /// Match patterns against descriptions instead of names.
    pub search_descriptions: bool,
    /// Match patterns against `category/name`.
    pub full_name: bool,
    /// Keep only installed packages.
    pub installed_only: bool,
    /// Keep only packages that are not installed.
    pub not_installed_only: bool,
    /// Raw exclude patterns.
    pub exclude: Vec<String>,
    /// How results are printed.
    pub output: OutputMode,
    /// Primary ebuild repository, consulted first.
    pub primary_tree: PathBuf,
    /// Overlay repositories in priority order.
    pub overlays: Vec<PathBuf>,
    /// User USE settings (`flag` or `-flag`) applied in verbose mode.
    pub use_flags: Vec<String>,
    /// Emit ANSI colour codes.
    pub color: bool,
}

impl SearchConfig {
    /// All repositories in scan order: primary tree first, then overlays.
    pub fn repositories(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.primary_tree).chain(self.overlays.iter())
    }
}
