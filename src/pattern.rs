use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{Error, Result};

/// A user pattern compiled into a case-insensitive matcher.
///
/// The field the pattern is tested against is decided once, at compile
/// time, and is the same whether the pattern is used to include or to
/// exclude packages.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The pattern exactly as the user wrote it.
    pub source: String,
    /// Case-insensitive expression built from `source`.
    pub regex: Regex,
    /// Match against `category/name` rather than the bare name.
    pub match_full_name: bool,
}

impl Pattern {
    /// Compile a raw pattern under the given search options.
    ///
    /// `*` matches everything. A literal `++` is escaped so package names
    /// such as `g++` can be searched without knowing regex syntax.
    /// Patterns containing `/` match the full name unless descriptions are
    /// being searched.
    ///
    /// # Examples
    ///
    /// ```
    /// use esearch::{Pattern, SearchConfig};
    ///
    /// let config = SearchConfig::default();
    /// let pat = Pattern::compile("dev-lang/", &config).unwrap();
    /// assert!(pat.match_full_name);
    /// assert!(pat.is_match("dev-lang/rust"));
    ///
    /// assert!(Pattern::compile("(", &config).is_err());
    /// ```
    pub fn compile(raw: &str, config: &SearchConfig) -> Result<Pattern> {
        let expr = if raw == "*" {
            ".*".to_string()
        } else {
            raw.replace("++", r"\+\+")
        };

        let regex = RegexBuilder::new(&expr)
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: raw.to_string(),
                source,
            })?;

        let match_full_name =
            (config.full_name || raw.contains('/')) && !config.search_descriptions;
        debug!(pattern = raw, regex = %expr, match_full_name, "compiled pattern");

        Ok(Pattern {
            source: raw.to_string(),
            regex,
            match_full_name,
        })
    }

    /// Compile every pattern, failing on the first invalid one.
    pub fn compile_all<S: AsRef<str>>(raw: &[S], config: &SearchConfig) -> Result<Vec<Pattern>> {
        raw.iter()
            .map(|p| Pattern::compile(p.as_ref(), config))
            .collect()
    }

    /// Unanchored search of `haystack`.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}
