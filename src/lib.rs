//! Search a pre-built Gentoo package index.
//!
//! A replacement for `emerge --search`: patterns are matched against a
//! package index generated ahead of time, so queries never touch the
//! ebuild repository except when listing ebuilds or USE flags.
//!
//! # Overview
//!
//! A query runs as a single pass:
//!
//! 1. every pattern is compiled into a [`Pattern`] (an invalid one aborts
//!    the query before anything is printed),
//! 2. [`search`] collects one [`Partition`] of matching records per pattern,
//! 3. [`exclude`] drops records matching any exclude pattern,
//! 4. a [`Renderer`] formats each partition, listing ebuilds through an
//!    [`EbuildLocator`] when asked to,
//! 5. for ebuild listings, a [`Terminal`] asks which ebuild to open.
//!
//! [`run`] chains all of these.
//!
//! # Examples
//!
//! ```
//! use esearch::{run_query, PackageRecord, SearchConfig};
//!
//! let mut foo = PackageRecord::new("foo", "app-misc/foo", "1.0");
//! foo.installed = Some("1.0".to_string());
//! let index = vec![foo, PackageRecord::new("foobar", "dev-libs/foobar", "0.3")];
//!
//! let config = SearchConfig {
//!     installed_only: true,
//!     ..Default::default()
//! };
//! let found = run_query(&["foo"], &index, &config).unwrap();
//! assert_eq!(found[0].records.len(), 1);
//! assert_eq!(found[0].records[0].full_name, "app-misc/foo");
//! ```

mod cache;
mod config;
mod ebuild;
mod error;
mod flags;
mod format;
pub mod index;
mod iuse;
mod pattern;
mod query;
mod record;
mod render;
mod search;
mod select;
mod version;

// Re-export public types
pub use cache::Md5CacheResolver;
pub use config::{OutputMode, SearchConfig};
pub use ebuild::{DefaultSelection, EbuildEntry, EbuildListing, EbuildLocator, Repository};
pub use error::{Error, Result};
pub use flags::{FlagResolver, FlagSummary};
pub use format::CustomFormat;
pub use iuse::{IUse, IUseDefault};
pub use pattern::Pattern;
pub use query::run;
pub use record::PackageRecord;
pub use render::{Palette, RenderContext, RenderedPartition, Renderer};
pub use search::{exclude, matches, run_query, search, Partition};
pub use select::{CommandLauncher, Launcher, Terminal};
pub use version::{EbuildName, PmsVersion, SuffixKind, Version, VersionScheme};
