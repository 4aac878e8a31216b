use tracing::debug;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::pattern::Pattern;
use crate::record::PackageRecord;

/// Packages matching one search pattern, in index order.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    /// The compiled search pattern.
    pub pattern: Pattern,
    /// Records that matched it and survived exclusion.
    pub records: Vec<&'a PackageRecord>,
}

impl Partition<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Test one record against a compiled pattern.
///
/// Installed filters are applied first; `installed_only` wins when both
/// filters are set, which leaves nothing to match. The same function
/// decides inclusion and exclusion.
pub fn matches(pattern: &Pattern, record: &PackageRecord, config: &SearchConfig) -> bool {
    if config.installed_only && !record.is_installed() {
        return false;
    }
    if config.not_installed_only && record.is_installed() {
        return false;
    }

    let field = if pattern.match_full_name {
        &record.full_name
    } else if config.search_descriptions {
        &record.description
    } else {
        &record.name
    };
    pattern.is_match(field)
}

/// Scan the index once per pattern and collect the matching records.
///
/// # Examples
///
/// ```
/// use esearch::{search, PackageRecord, Pattern, SearchConfig};
///
/// let index = vec![
///     PackageRecord::new("foo", "cat/foo", "1.0"),
///     PackageRecord::new("bar", "cat/bar", "2.0"),
/// ];
/// let config = SearchConfig::default();
/// let patterns = Pattern::compile_all(&["^f"], &config).unwrap();
/// let found = search(patterns, &index, &config);
/// assert_eq!(found[0].records.len(), 1);
/// assert_eq!(found[0].records[0].name, "foo");
/// ```
pub fn search<'a>(
    patterns: Vec<Pattern>,
    index: &'a [PackageRecord],
    config: &SearchConfig,
) -> Vec<Partition<'a>> {
    patterns
        .into_iter()
        .map(|pattern| {
            let records: Vec<&PackageRecord> = index
                .iter()
                .filter(|record| matches(&pattern, record, config))
                .collect();
            debug!(pattern = %pattern.source, found = records.len(), "searched index");
            Partition { pattern, records }
        })
        .collect()
}

/// Drop every record matching any of `exclude` from every partition.
pub fn exclude(partitions: &mut [Partition<'_>], exclude: &[Pattern], config: &SearchConfig) {
    for pattern in exclude {
        for partition in partitions.iter_mut() {
            let before = partition.records.len();
            partition
                .records
                .retain(|record| !matches(pattern, record, config));
            debug!(
                exclude = %pattern.source,
                search = %partition.pattern.source,
                removed = before - partition.records.len(),
                "applied exclude pattern"
            );
        }
    }
}

/// Compile, search and filter in one step.
///
/// Exclude patterns follow the same compile rules as search patterns.
/// Everything is compiled before the index is scanned, so an invalid
/// pattern never yields partial results.
pub fn run_query<'a, S: AsRef<str>>(
    raw: &[S],
    index: &'a [PackageRecord],
    config: &SearchConfig,
) -> Result<Vec<Partition<'a>>> {
    let patterns = Pattern::compile_all(raw, config)?;
    let excludes = Pattern::compile_all(&config.exclude, config)?;

    let mut partitions = search(patterns, index, config);
    if !excludes.is_empty() {
        exclude(&mut partitions, &excludes, config);
    }
    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> Vec<PackageRecord> {
        let mut foo = PackageRecord::new("foo", "cat/foo", "1.0");
        foo.installed = Some("1.0".to_string());
        foo.description = "A foo utility".to_string();
        let mut bar = PackageRecord::new("bar", "cat/bar", "2.0");
        bar.description = "Bar library".to_string();
        let mut foobar = PackageRecord::new("foobar", "other/foobar", "0.3");
        foobar.installed = Some("0.2".to_string());
        foobar.description = "Glue between foo and bar".to_string();
        vec![foo, bar, foobar]
    }

    fn names<'a>(partition: &Partition<'a>) -> Vec<&'a str> {
        partition.records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn wildcard_matches_all() {
        let index = index();
        let found = run_query(&["*"], &index, &SearchConfig::default()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(names(&found[0]), vec!["foo", "bar", "foobar"]);
    }

    #[test]
    fn partitions_per_pattern_in_index_order() {
        let index = index();
        let found = run_query(&["bar", "^foo"], &index, &SearchConfig::default()).unwrap();
        assert_eq!(found[0].pattern.source, "bar");
        assert_eq!(names(&found[0]), vec!["bar", "foobar"]);
        assert_eq!(names(&found[1]), vec!["foo", "foobar"]);
    }

    #[test]
    fn installed_filters() {
        let index = index();
        let mut config = SearchConfig {
            installed_only: true,
            ..Default::default()
        };
        let found = run_query(&["*"], &index, &config).unwrap();
        assert_eq!(names(&found[0]), vec!["foo", "foobar"]);

        config.installed_only = false;
        config.not_installed_only = true;
        let found = run_query(&["*"], &index, &config).unwrap();
        assert_eq!(names(&found[0]), vec!["bar"]);

        config.installed_only = true;
        let found = run_query(&["*"], &index, &config).unwrap();
        assert!(found[0].is_empty());
    }

    #[test]
    fn field_selection() {
        let index = index();
        let config = SearchConfig {
            search_descriptions: true,
            ..Default::default()
        };
        let found = run_query(&["utility|glue"], &index, &config).unwrap();
        assert_eq!(names(&found[0]), vec!["foo", "foobar"]);

        let found = run_query(&["^other/"], &index, &SearchConfig::default()).unwrap();
        assert_eq!(names(&found[0]), vec!["foobar"]);

        // Bare names never contain the category.
        let found = run_query(&["^cat"], &index, &SearchConfig::default()).unwrap();
        assert!(found[0].is_empty());
    }

    #[test]
    fn exclusion_is_a_union() {
        let index = index();
        let mut config = SearchConfig {
            exclude: vec!["^bar$".to_string()],
            ..Default::default()
        };
        let found = run_query(&["*"], &index, &config).unwrap();
        assert_eq!(names(&found[0]), vec!["foo", "foobar"]);

        config.exclude.push("^foo$".to_string());
        let found = run_query(&["*", "o"], &index, &config).unwrap();
        assert_eq!(names(&found[0]), vec!["foobar"]);
        assert_eq!(names(&found[1]), vec!["foobar"]);
    }

    #[test]
    fn exclusion_is_idempotent() {
        let index = index();
        let once = SearchConfig {
            exclude: vec!["bar".to_string()],
            ..Default::default()
        };
        let twice = SearchConfig {
            exclude: vec!["bar".to_string(), "bar".to_string()],
            ..Default::default()
        };
        let a = run_query(&["*"], &index, &once).unwrap();
        let b = run_query(&["*"], &index, &twice).unwrap();
        assert_eq!(names(&a[0]), names(&b[0]));
        assert_eq!(names(&a[0]), vec!["foo"]);
    }

    #[test]
    fn exclusion_uses_its_own_full_name_flag() {
        let index = index();
        let config = SearchConfig {
            exclude: vec!["^other/".to_string()],
            ..Default::default()
        };
        let found = run_query(&["foo"], &index, &config).unwrap();
        assert_eq!(names(&found[0]), vec!["foo"]);
    }

    #[test]
    fn invalid_exclude_aborts() {
        let index = index();
        let config = SearchConfig {
            exclude: vec!["(".to_string()],
            ..Default::default()
        };
        assert!(run_query(&["foo"], &index, &config).is_err());
    }
}
