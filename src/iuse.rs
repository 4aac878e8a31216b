use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default state for an IUSE flag.
///
/// See [PMS 7.2](https://projects.gentoo.org/pms/9/pms.html#mandatory-ebuilddefined-variables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IUseDefault {
    /// `+flag`
    Enabled,
    /// `-flag`
    Disabled,
}

/// A single USE flag entry from the `IUSE` variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IUse {
    /// Flag name without its default prefix.
    pub name: String,
    pub default: Option<IUseDefault>,
}

impl IUse {
    /// Parse a space-separated `IUSE` line.
    ///
    /// # Examples
    ///
    /// ```
    /// use esearch::{IUse, IUseDefault};
    ///
    /// let flags = IUse::parse_line("+ssl -debug test").unwrap();
    /// assert_eq!(flags.len(), 3);
    /// assert_eq!(flags[0].default, Some(IUseDefault::Enabled));
    /// assert_eq!(flags[2].name, "test");
    /// ```
    pub fn parse_line(input: &str) -> Result<Vec<IUse>> {
        input.split_whitespace().map(str::parse).collect()
    }

    /// Whether the ebuild turns this flag on unless told otherwise.
    pub fn enabled_by_default(&self) -> bool {
        self.default == Some(IUseDefault::Enabled)
    }
}

impl FromStr for IUse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, default) = match s.as_bytes().first() {
            Some(b'+') => (&s[1..], Some(IUseDefault::Enabled)),
            Some(b'-') => (&s[1..], Some(IUseDefault::Disabled)),
            Some(_) => (s, None),
            None => return Err(Error::InvalidIUse("empty IUSE entry".to_string())),
        };
        if name.is_empty() {
            return Err(Error::InvalidIUse(s.to_string()));
        }
        Ok(IUse {
            name: name.to_string(),
            default,
        })
    }
}

impl fmt::Display for IUse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.default {
            Some(IUseDefault::Enabled) => write!(f, "+{}", self.name),
            Some(IUseDefault::Disabled) => write!(f, "-{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
