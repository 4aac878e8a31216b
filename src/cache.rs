use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::flags::{FlagResolver, FlagSummary};
use crate::iuse::IUse;
use crate::version::{PmsVersion, VersionScheme};

/// Read the `IUSE` line of a md5-cache entry.
///
/// Entries are `KEY=VALUE` lines in arbitrary order. An entry without
/// `IUSE` declares no flags.
///
/// See [PMS 14.2](https://projects.gentoo.org/pms/9/pms.html#mddict-cache-file-format).
fn cached_iuse(input: &str) -> Result<Vec<IUse>> {
    let mut iuse = Vec::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some(("IUSE", value)) => iuse = IUse::parse_line(value)?,
            Some(_) => {}
            None => return Err(Error::InvalidCacheEntry(line.to_string())),
        }
    }
    Ok(iuse)
}

/// [`FlagResolver`] reading the `metadata/md5-cache` of every repository.
#[derive(Debug, Clone)]
pub struct Md5CacheResolver<V = PmsVersion> {
    repositories: Vec<PathBuf>,
    use_flags: Vec<String>,
    scheme: V,
}

impl Md5CacheResolver<PmsVersion> {
    pub fn new(repositories: Vec<PathBuf>, use_flags: Vec<String>) -> Self {
        Md5CacheResolver::with_scheme(repositories, use_flags, PmsVersion)
    }
}

impl<V: VersionScheme> Md5CacheResolver<V> {
    pub fn with_scheme(repositories: Vec<PathBuf>, use_flags: Vec<String>, scheme: V) -> Self {
        Md5CacheResolver {
            repositories,
            use_flags,
            scheme,
        }
    }

    /// Highest version of `name` in one category directory.
    fn best_in(&self, dir: &Path, name: &str) -> Result<Option<(String, PathBuf)>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(Error::Io {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        let mut best: Option<(String, PathBuf)> = None;
        for entry in entries {
            let entry = entry.map_err(|source| Error::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str() else {
                continue;
            };
            let Some(split) = self.scheme.split(stem) else {
                continue;
            };
            if split.name != name {
                continue;
            }
            let version = split.full_version();
            let newer = match &best {
                Some((current, _)) => self.scheme.compare(&version, current).is_gt(),
                None => true,
            };
            if newer {
                best = Some((version, entry.path()));
            }
        }
        Ok(best)
    }
}

impl<V: VersionScheme> FlagResolver for Md5CacheResolver<V> {
    fn resolve(&self, full_name: &str) -> Result<Option<FlagSummary>> {
        let Some((category, name)) = full_name.split_once('/') else {
            return Ok(None);
        };

        let mut best: Option<(String, PathBuf)> = None;
        for repo in &self.repositories {
            let dir = repo.join("metadata").join("md5-cache").join(category);
            if let Some((version, path)) = self.best_in(&dir, name)? {
                let newer = match &best {
                    Some((current, _)) => self.scheme.compare(&version, current).is_gt(),
                    None => true,
                };
                if newer {
                    best = Some((version, path));
                }
            }
        }

        let Some((version, path)) = best else {
            debug!(package = full_name, "no md5-cache entry");
            return Ok(None);
        };
        debug!(package = full_name, path = %path.display(), "reading md5-cache entry");

        let content = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let iuse = cached_iuse(&content)?;
        Ok(Some(FlagSummary::resolve(version, iuse, &self.use_flags)))
    }
}
