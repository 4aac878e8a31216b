use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::PackageRecord;

/// Oldest index layout this version can read.
pub const INDEX_VERSION: u32 = 1;

/// File name of the index inside the index directory.
pub const INDEX_FILE: &str = "esearchdb.json";

/// Default directory holding the index.
pub const DEFAULT_INDEX_DIR: &str = "/var/cache/edb/esearch";

/// On-disk form of the package index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    pub version: u32,
    pub packages: Vec<PackageRecord>,
}

/// Load the package index from `dir`.
///
/// # Examples
///
/// ```no_run
/// let packages = esearch::index::load("/var/cache/edb/esearch".as_ref()).unwrap();
/// println!("{} packages", packages.len());
/// ```
pub fn load(dir: &Path) -> Result<Vec<PackageRecord>> {
    let path = dir.join(INDEX_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::Index(format!(
                "could not find esearch index at {}; please generate it first",
                path.display()
            )))
        }
        Err(source) => return Err(Error::Io { path, source }),
    };

    let index: Index = serde_json::from_str(&content)
        .map_err(|e| Error::Index(format!("{}: {e}", path.display())))?;
    if index.version < INDEX_VERSION {
        return Err(Error::IndexOutOfDate {
            found: index.version,
            needed: INDEX_VERSION,
        });
    }
    debug!(path = %path.display(), packages = index.packages.len(), "loaded index");
    Ok(index.packages)
}
