use std::collections::BTreeSet;

use crate::error::Result;
use crate::iuse::IUse;

/// USE flag state of the best available version of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSummary {
    /// Best (possibly unstable) version the flags were taken from.
    pub version: String,
    /// Flags declared by that version.
    pub iuse: Vec<IUse>,
    /// Flags that end up enabled.
    pub enabled: BTreeSet<String>,
}

impl FlagSummary {
    /// Combine ebuild defaults with user settings.
    ///
    /// User entries are applied in order on top of the `+flag` defaults:
    /// `flag` enables, `-flag` disables and `-*` clears everything set so far.
    ///
    /// # Examples
    ///
    /// ```
    /// use esearch::{FlagSummary, IUse};
    ///
    /// let iuse = IUse::parse_line("+ssl gtk -debug").unwrap();
    /// let user = vec!["gtk".to_string(), "-ssl".to_string()];
    /// let summary = FlagSummary::resolve("1.0".to_string(), iuse, &user);
    /// assert!(summary.enabled.contains("gtk"));
    /// assert!(!summary.enabled.contains("ssl"));
    /// ```
    pub fn resolve(version: String, iuse: Vec<IUse>, user: &[String]) -> FlagSummary {
        let mut enabled: BTreeSet<String> = iuse
            .iter()
            .filter(|flag| flag.enabled_by_default())
            .map(|flag| flag.name.clone())
            .collect();

        for setting in user {
            match setting.strip_prefix('-') {
                Some("*") => enabled.clear(),
                Some(flag) => {
                    enabled.remove(flag);
                }
                None => {
                    enabled.insert(setting.clone());
                }
            }
        }

        let declared: BTreeSet<&str> = iuse.iter().map(|flag| flag.name.as_str()).collect();
        enabled.retain(|flag| declared.contains(flag.as_str()));

        FlagSummary {
            version,
            iuse,
            enabled,
        }
    }

    /// Declared flags sorted by name, each paired with its final state.
    pub fn sorted_flags(&self) -> Vec<(&str, bool)> {
        let mut flags: Vec<(&str, bool)> = self
            .iuse
            .iter()
            .map(|flag| (flag.name.as_str(), self.enabled.contains(&flag.name)))
            .collect();
        flags.sort_unstable();
        flags.dedup_by(|a, b| a.0 == b.0);
        flags
    }
}

/// Looks up the best version of a package and its USE flags.
pub trait FlagResolver {
    /// `Ok(None)` when no version of `full_name` is known.
    fn resolve(&self, full_name: &str) -> Result<Option<FlagSummary>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(iuse: &str, user: &[&str]) -> FlagSummary {
        let user: Vec<String> = user.iter().map(|s| s.to_string()).collect();
        FlagSummary::resolve("1.0".to_string(), IUse::parse_line(iuse).unwrap(), &user)
    }

    #[test]
    fn defaults_only() {
        let s = summary("+ssl -debug test", &[]);
        assert_eq!(s.enabled.iter().collect::<Vec<_>>(), vec!["ssl"]);
    }

    #[test]
    fn user_overrides() {
        let s = summary("+ssl -debug test", &["debug", "-ssl", "unrelated"]);
        assert_eq!(s.enabled.iter().collect::<Vec<_>>(), vec!["debug"]);
    }

    #[test]
    fn minus_star_clears() {
        let s = summary("+ssl +ipv6 test", &["-*", "test"]);
        assert_eq!(s.enabled.iter().collect::<Vec<_>>(), vec!["test"]);
    }

    #[test]
    fn sorted_flags() {
        let s = summary("zlib +ssl acl", &[]);
        assert_eq!(
            s.sorted_flags(),
            vec![("acl", false), ("ssl", true), ("zlib", false)]
        );
    }
}
