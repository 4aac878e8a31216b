use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::version::{EbuildName, VersionScheme};

/// Where an ebuild was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repository {
    /// The main tree.
    Primary,
    /// An overlay, numbered from 1 in configuration order.
    Overlay(usize),
}

/// One ebuild in the numbered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbuildEntry {
    /// Repository the file was found in.
    pub repository: Repository,
    /// Package name and version taken from the file name.
    pub name: EbuildName,
    /// Full path of the `.ebuild` file.
    pub path: PathBuf,
    /// Position in the listing, starting at 1 and unique across the query.
    pub number: usize,
}

/// The ebuild offered when the user just presses enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultSelection {
    /// `name-version` shown in the prompt.
    pub label: String,
    /// Full path of the `.ebuild` file.
    pub path: PathBuf,
}

/// Numbering state shared by every package listed in one query.
#[derive(Debug, Clone, Default)]
pub struct EbuildListing {
    paths: Vec<PathBuf>,
    default: Option<DefaultSelection>,
    found_in_overlay: bool,
}

impl EbuildListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ebuilds listed so far.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Path of ebuild `number` (1-based).
    pub fn get(&self, number: usize) -> Option<&Path> {
        number
            .checked_sub(1)
            .and_then(|i| self.paths.get(i))
            .map(PathBuf::as_path)
    }

    pub fn default_selection(&self) -> Option<&DefaultSelection> {
        self.default.as_ref()
    }

    pub fn clear_default(&mut self) {
        self.default = None;
    }

    /// Whether any overlay contributed an ebuild.
    pub fn found_in_overlay(&self) -> bool {
        self.found_in_overlay
    }

    fn push(&mut self, path: PathBuf) -> usize {
        self.paths.push(path);
        self.paths.len()
    }
}

/// Scans the primary tree and overlays for `<repo>/<category>/<name>/*.ebuild`.
#[derive(Debug, Clone)]
pub struct EbuildLocator<V> {
    primary: PathBuf,
    overlays: Vec<PathBuf>,
    scheme: V,
}

impl<V: VersionScheme> EbuildLocator<V> {
    pub fn new(primary: PathBuf, overlays: Vec<PathBuf>, scheme: V) -> Self {
        EbuildLocator {
            primary,
            overlays,
            scheme,
        }
    }

    /// Configured overlays, in label order.
    pub fn overlays(&self) -> &[PathBuf] {
        &self.overlays
    }

    /// List the ebuilds of `full_name`, numbering them in `listing`.
    ///
    /// Within each repository entries are sorted by version; the primary
    /// tree comes first, then overlays in configuration order. When
    /// `default_stem` names one of the files (e.g. `foo-1.2`), it becomes
    /// the listing's default selection.
    pub fn locate(
        &self,
        full_name: &str,
        default_stem: Option<&str>,
        listing: &mut EbuildListing,
    ) -> Result<Vec<EbuildEntry>> {
        let repositories = std::iter::once((Repository::Primary, &self.primary)).chain(
            self.overlays
                .iter()
                .enumerate()
                .map(|(i, dir)| (Repository::Overlay(i + 1), dir)),
        );

        let mut listed = Vec::new();
        for (repository, root) in repositories {
            let dir = root.join(full_name);
            let mut found = self.scan(&dir)?;
            found.sort_by(|(a, _, a_stem), (b, _, b_stem)| {
                self.scheme
                    .compare(&a.full_version(), &b.full_version())
                    .then_with(|| a_stem.cmp(b_stem))
            });
            debug!(dir = %dir.display(), count = found.len(), "scanned ebuilds");

            if !found.is_empty() && matches!(repository, Repository::Overlay(_)) {
                listing.found_in_overlay = true;
            }

            for (name, path, stem) in found {
                if default_stem == Some(stem.as_str()) {
                    listing.default = Some(DefaultSelection {
                        label: stem,
                        path: path.clone(),
                    });
                }
                let number = listing.push(path.clone());
                listed.push(EbuildEntry {
                    repository,
                    name,
                    path,
                    number,
                });
            }
        }
        Ok(listed)
    }

    /// Ebuilds directly inside `dir`; a missing directory has none.
    fn scan(&self, dir: &Path) -> Result<Vec<(EbuildName, PathBuf, String)>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(Error::Io {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|f| f.strip_suffix(".ebuild")) else {
                continue;
            };
            match self.scheme.split(stem) {
                Some(name) => found.push((name, entry.path(), stem.to_string())),
                None => debug!(file = stem, "skipping ebuild with unparsable version"),
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::PmsVersion;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "EAPI=8\n").unwrap();
    }

    fn numbered(entries: &[EbuildEntry]) -> Vec<(usize, String)> {
        entries
            .iter()
            .map(|e| (e.number, e.name.to_string()))
            .collect()
    }

    #[test]
    fn numbering_is_global_and_version_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = tmp.path().join("gentoo");
        touch(&tree, "cat/foo/foo-1.10.ebuild");
        touch(&tree, "cat/foo/foo-1.9.ebuild");
        touch(&tree, "cat/bar/bar-2.0-r1.ebuild");
        touch(&tree, "cat/bar/bar-2.0.ebuild");
        touch(&tree, "cat/bar/metadata.xml");

        let locator = EbuildLocator::new(tree, Vec::new(), PmsVersion);
        let mut listing = EbuildListing::new();
        let foo = locator.locate("cat/foo", None, &mut listing).unwrap();
        let bar = locator.locate("cat/bar", None, &mut listing).unwrap();

        assert_eq!(
            numbered(&foo),
            vec![(1, "foo-1.9".to_string()), (2, "foo-1.10".to_string())]
        );
        assert_eq!(
            numbered(&bar),
            vec![(3, "bar-2.0".to_string()), (4, "bar-2.0-r1".to_string())]
        );
        assert_eq!(listing.len(), 4);
        assert_eq!(listing.get(3), Some(bar[0].path.as_path()));
        assert_eq!(listing.get(0), None);
        assert_eq!(listing.get(5), None);
        assert!(!listing.found_in_overlay());
    }

    #[test]
    fn overlays_follow_primary() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = tmp.path().join("gentoo");
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        touch(&tree, "cat/foo/foo-1.0.ebuild");
        touch(&second, "cat/foo/foo-9999.ebuild");

        let locator = EbuildLocator::new(tree, vec![first, second], PmsVersion);
        let mut listing = EbuildListing::new();
        let entries = locator.locate("cat/foo", None, &mut listing).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].repository, Repository::Primary);
        assert_eq!(entries[1].repository, Repository::Overlay(2));
        assert_eq!(entries[1].number, 2);
        assert!(listing.found_in_overlay());
    }

    #[test]
    fn default_selection_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = tmp.path().join("gentoo");
        touch(&tree, "cat/foo/foo-1.0.ebuild");
        touch(&tree, "cat/foo/foo-1.1.ebuild");

        let locator = EbuildLocator::new(tree, Vec::new(), PmsVersion);
        let mut listing = EbuildListing::new();
        locator
            .locate("cat/foo", Some("foo-1.0"), &mut listing)
            .unwrap();

        let default = listing.default_selection().unwrap();
        assert_eq!(default.label, "foo-1.0");
        assert_eq!(Some(default.path.as_path()), listing.get(1));

        listing.clear_default();
        assert!(listing.default_selection().is_none());
    }

    #[test]
    fn missing_package_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let locator = EbuildLocator::new(tmp.path().to_path_buf(), Vec::new(), PmsVersion);
        let mut listing = EbuildListing::new();
        let entries = locator.locate("cat/none", Some("none-1"), &mut listing).unwrap();
        assert!(entries.is_empty());
        assert!(listing.is_empty());
        assert!(listing.default_selection().is_none());
    }
}
