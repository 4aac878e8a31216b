use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use winnow::ascii::{digit0, digit1};
use winnow::combinator::{alt, opt, preceded, repeat, separated};
use winnow::prelude::*;
use winnow::token::one_of;

use crate::error::{Error, Result};

/// Version suffix kind, in ascending order of precedence.
///
/// See [PMS 3.2](https://projects.gentoo.org/pms/9/pms.html#version-specifications).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SuffixKind {
    Alpha,
    Beta,
    Pre,
    Rc,
    P,
}

impl SuffixKind {
    fn as_str(&self) -> &'static str {
        match self {
            SuffixKind::Alpha => "alpha",
            SuffixKind::Beta => "beta",
            SuffixKind::Pre => "pre",
            SuffixKind::Rc => "rc",
            SuffixKind::P => "p",
        }
    }
}

/// A package version such as `1.2.3b_rc1_p2-r3`.
///
/// Ordering follows the PMS version comparison algorithm, so two versions
/// may compare equal while being spelled differently (`1.0` and `1.00`).
///
/// See [PMS 3.3](https://projects.gentoo.org/pms/9/pms.html#version-comparison).
#[derive(Debug, Clone)]
pub struct Version {
    numbers: Vec<String>,
    letter: Option<char>,
    suffixes: Vec<(SuffixKind, String)>,
    revision: String,
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_version
            .parse(s)
            .map_err(|_| Error::InvalidVersion(s.to_string()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.numbers.join("."))?;
        if let Some(letter) = self.letter {
            write!(f, "{letter}")?;
        }
        for (kind, num) in &self.suffixes {
            write!(f, "_{}{num}", kind.as_str())?;
        }
        if self.revision != "0" {
            write!(f, "-r{}", self.revision)?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_integers(&self.numbers[0], &other.numbers[0])
            .then_with(|| cmp_components(&self.numbers[1..], &other.numbers[1..]))
            .then_with(|| self.letter.cmp(&other.letter))
            .then_with(|| cmp_suffixes(&self.suffixes, &other.suffixes))
            .then_with(|| cmp_integers(&self.revision, &other.revision))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

/// Compare two digit strings numerically without overflowing.
fn cmp_integers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Numeric components after the first; a leading zero switches to a
/// fractional string comparison.
fn cmp_components(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = if x.starts_with('0') || y.starts_with('0') {
            x.trim_end_matches('0').cmp(y.trim_end_matches('0'))
        } else {
            cmp_integers(x, y)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn cmp_suffixes(a: &[(SuffixKind, String)], b: &[(SuffixKind, String)]) -> Ordering {
    for ((ka, na), (kb, nb)) in a.iter().zip(b) {
        let ord = ka.cmp(kb).then_with(|| cmp_integers(na, nb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    // An extra `_p` sorts after no suffix, anything else before it.
    match a.len().cmp(&b.len()) {
        Ordering::Equal => Ordering::Equal,
        Ordering::Greater => extra_suffix_order(a[b.len()].0),
        Ordering::Less => extra_suffix_order(b[a.len()].0).reverse(),
    }
}

fn extra_suffix_order(kind: SuffixKind) -> Ordering {
    if kind == SuffixKind::P {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

// Winnow parsers

fn parse_suffix(input: &mut &str) -> ModalResult<(SuffixKind, String)> {
    preceded(
        '_',
        (
            alt((
                "alpha".value(SuffixKind::Alpha),
                "beta".value(SuffixKind::Beta),
                "pre".value(SuffixKind::Pre),
                "rc".value(SuffixKind::Rc),
                "p".value(SuffixKind::P),
            )),
            digit0.map(|s: &str| s.to_string()),
        ),
    )
    .parse_next(input)
}

fn parse_version(input: &mut &str) -> ModalResult<Version> {
    let numbers: Vec<String> =
        separated(1.., digit1.map(|s: &str| s.to_string()), '.').parse_next(input)?;
    let letter = opt(one_of('a'..='z')).parse_next(input)?;
    let suffixes: Vec<(SuffixKind, String)> = repeat(0.., parse_suffix).parse_next(input)?;
    let revision = opt(preceded("-r", digit1))
        .parse_next(input)?
        .unwrap_or("0")
        .to_string();
    Ok(Version {
        numbers,
        letter,
        suffixes,
        revision,
    })
}

/// An ebuild file stem split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbuildName {
    /// Package name, e.g. `foo-bar`.
    pub name: String,
    /// Version without revision, e.g. `1.2_rc1`.
    pub version: String,
    /// Revision in `rN` form; `r0` when the file has none.
    pub revision: String,
}

impl EbuildName {
    /// Version with a `-rN` suffix unless the revision is `r0`.
    pub fn full_version(&self) -> String {
        if self.revision == "r0" {
            self.version.clone()
        } else {
            format!("{}-{}", self.version, self.revision)
        }
    }
}

impl fmt::Display for EbuildName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.full_version())
    }
}

/// Version splitting and ordering used when listing ebuilds.
pub trait VersionScheme {
    /// Split `name-version[-rN]`; `None` if the stem carries no valid version.
    fn split(&self, stem: &str) -> Option<EbuildName>;

    /// Compare two versions, revisions included.
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// [`VersionScheme`] implementing the PMS rules.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use esearch::{PmsVersion, VersionScheme};
///
/// let split = PmsVersion.split("foo-bar-1.2_rc1-r2").unwrap();
/// assert_eq!(split.name, "foo-bar");
/// assert_eq!(split.version, "1.2_rc1");
/// assert_eq!(split.revision, "r2");
///
/// assert_eq!(PmsVersion.compare("1.2_rc1", "1.2"), Ordering::Less);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PmsVersion;

impl VersionScheme for PmsVersion {
    fn split(&self, stem: &str) -> Option<EbuildName> {
        let parts: Vec<&str> = stem.split('-').collect();
        let last = parts.last()?;

        let has_revision = parts.len() >= 3
            && last.len() > 1
            && last.starts_with('r')
            && last[1..].bytes().all(|b| b.is_ascii_digit());
        let (revision, end) = if has_revision {
            (last.to_string(), parts.len() - 1)
        } else {
            ("r0".to_string(), parts.len())
        };
        if end < 2 {
            return None;
        }

        let version = parts[end - 1];
        version.parse::<Version>().ok()?;
        let name = parts[..end - 1].join("-");
        if name.is_empty() {
            return None;
        }

        Some(EbuildName {
            name,
            version: version.to_string(),
            revision,
        })
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        match (a.parse::<Version>(), b.parse::<Version>()) {
            (Ok(va), Ok(vb)) => va.cmp(&vb),
            _ => a.cmp(b),
        }
    }
}
