use serde::{Deserialize, Serialize};

/// One package entry of the search index.
///
/// Records are produced by the index generator and are read-only for the
/// whole query. An absent [`installed`](Self::installed) version is the
/// only signal that a package is not installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Bare package name, e.g. `foo`.
    pub name: String,
    /// Qualified name, e.g. `app-misc/foo`.
    pub full_name: String,
    /// Whether the latest version is masked.
    #[serde(default)]
    pub masked: bool,
    /// Latest available version, including any `-rN` revision.
    pub latest: String,
    /// Installed version, if any.
    #[serde(default)]
    pub installed: Option<String>,
    /// Size of the distfiles, already formatted (e.g. `1,024 kB`).
    #[serde(default)]
    pub size: String,
    /// Upstream homepage.
    #[serde(default)]
    pub homepage: String,
    /// One-line package description.
    #[serde(default)]
    pub description: String,
    /// License expression as written in the ebuild.
    #[serde(default)]
    pub license: String,
}

impl PackageRecord {
    /// The category part of [`full_name`](Self::full_name).
    ///
    /// # Examples
    ///
    /// ```
    /// use esearch::PackageRecord;
    ///
    /// let rec = PackageRecord::new("foo", "app-misc/foo", "1.0");
    /// assert_eq!(rec.category(), "app-misc");
    /// ```
    pub fn category(&self) -> &str {
        self.full_name
            .split_once('/')
            .map_or(self.full_name.as_str(), |(cat, _)| cat)
    }

    /// Whether any version of the package is installed.
    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    /// Whether the installed version equals the latest available one.
    pub fn is_up_to_date(&self) -> bool {
        self.installed.as_deref() == Some(self.latest.as_str())
    }

    /// Build a minimal record; remaining fields are empty.
    pub fn new(name: &str, full_name: &str, latest: &str) -> Self {
        PackageRecord {
            name: name.to_string(),
            full_name: full_name.to_string(),
            masked: false,
            latest: latest.to_string(),
            installed: None,
            size: String::new(),
            homepage: String::new(),
            description: String::new(),
            license: String::new(),
        }
    }
}
