use std::fmt::Display;
use std::io::Write;

use console::style;
use tracing::warn;

use crate::config::{OutputMode, SearchConfig};
use crate::ebuild::{EbuildEntry, EbuildListing, EbuildLocator, Repository};
use crate::error::Result;
use crate::flags::{FlagResolver, FlagSummary};
use crate::format::CustomFormat;
use crate::record::PackageRecord;
use crate::search::Partition;
use crate::version::{PmsVersion, VersionScheme};

/// Terminal colours, switched off for `--nocolor` and piped tests.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Palette { color }
    }

    pub fn bold<D: Display>(&self, text: D) -> String {
        style(text).force_styling(self.color).bold().to_string()
    }

    pub fn red<D: Display>(&self, text: D) -> String {
        style(text).force_styling(self.color).red().bright().to_string()
    }

    pub fn green<D: Display>(&self, text: D) -> String {
        style(text).force_styling(self.color).green().bright().to_string()
    }

    pub fn darkgreen<D: Display>(&self, text: D) -> String {
        style(text).force_styling(self.color).green().to_string()
    }

    pub fn turquoise<D: Display>(&self, text: D) -> String {
        style(text).force_styling(self.color).cyan().bright().to_string()
    }

    pub fn blue<D: Display>(&self, text: D) -> String {
        style(text).force_styling(self.color).blue().bright().to_string()
    }
}

/// State carried across every partition of one query.
#[derive(Debug, Default)]
pub struct RenderContext {
    /// Ebuild numbering shared by all listed packages.
    pub listing: EbuildListing,
    /// Packages rendered over all partitions.
    pub matched: usize,
    /// Whether the first listed package has been offered as the default.
    default_offered: bool,
}

/// Rendered output of one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPartition {
    /// The search pattern as typed.
    pub pattern: String,
    /// Rendered records, without headers.
    pub text: String,
    /// Number of records in the partition.
    pub count: usize,
}

/// Renders partitions in the configured [`OutputMode`].
pub struct Renderer<'c, V = PmsVersion> {
    config: &'c SearchConfig,
    palette: Palette,
    format: Option<CustomFormat>,
    resolver: Option<&'c dyn FlagResolver>,
    locator: Option<&'c EbuildLocator<V>>,
}

impl<'c, V: VersionScheme> Renderer<'c, V> {
    pub fn new(config: &'c SearchConfig) -> Self {
        let format = match &config.output {
            OutputMode::Custom(template) => Some(CustomFormat::parse(template)),
            _ => None,
        };
        Renderer {
            config,
            palette: Palette::new(config.color),
            format,
            resolver: None,
            locator: None,
        }
    }

    /// Flag lookups for verbose output.
    pub fn with_resolver(mut self, resolver: &'c dyn FlagResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Ebuild scanning for ebuild listings.
    pub fn with_locator(mut self, locator: &'c EbuildLocator<V>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Render every partition, numbering ebuilds in `ctx` as it goes.
    pub fn render(
        &self,
        partitions: &[Partition<'_>],
        ctx: &mut RenderContext,
    ) -> Result<Vec<RenderedPartition>> {
        partitions
            .iter()
            .map(|partition| self.render_partition(partition, ctx))
            .collect()
    }

    fn render_partition(
        &self,
        partition: &Partition<'_>,
        ctx: &mut RenderContext,
    ) -> Result<RenderedPartition> {
        let mut blocks = Vec::with_capacity(partition.len());
        for record in &partition.records {
            let block = match &self.config.output {
                OutputMode::Normal => self.normal(record, None),
                OutputMode::Verbose => self.normal(record, Some(self.flags(record))),
                OutputMode::Compact => self.compact(record),
                OutputMode::Custom(_) => match &self.format {
                    Some(format) => format.render(record),
                    None => String::new(),
                },
                OutputMode::EbuildList => {
                    let default_stem = (!ctx.default_offered)
                        .then(|| format!("{}-{}", record.name, record.latest));
                    ctx.default_offered = true;
                    self.ebuilds(record, default_stem.as_deref(), &mut ctx.listing)?
                }
            };
            blocks.push(block);
        }
        ctx.matched += partition.len();

        Ok(RenderedPartition {
            pattern: partition.pattern.source.clone(),
            text: blocks.join("\n"),
            count: partition.len(),
        })
    }

    /// Print rendered partitions, with headers in normal and verbose mode.
    pub fn write<W: Write>(&self, out: &mut W, rendered: &[RenderedPartition]) -> Result<()> {
        let p = &self.palette;
        for part in rendered {
            match self.config.output {
                OutputMode::Normal | OutputMode::Verbose => {
                    writeln!(out, "[ Results for search key : {} ]", p.bold(&part.pattern))?;
                    writeln!(out, "[ Applications found : {} ]", p.bold(part.count))?;
                    writeln!(out)?;
                    writeln!(out, "{}", part.text)?;
                }
                _ => writeln!(out, "{}", part.text)?,
            }
        }
        Ok(())
    }

    fn normal(&self, record: &PackageRecord, flags: Option<Option<FlagSummary>>) -> String {
        let p = &self.palette;
        let installed = record.installed.as_deref().unwrap_or("[ Not Installed ]");
        let masked = if record.masked {
            p.red(" [ Masked ]")
        } else {
            String::new()
        };

        let mut block = format!(
            "{}  {}{}\n      {} {}\n      {} {}\n",
            p.green("*"),
            p.bold(&record.full_name),
            masked,
            p.darkgreen("Latest version available:"),
            record.latest,
            p.darkgreen("Latest version installed:"),
            installed,
        );

        if let Some(summary) = flags {
            let (version, use_line) = match summary {
                Some(summary) => (summary.version.clone(), self.use_line(&summary)),
                None => ("-".to_string(), "-".to_string()),
            };
            block.push_str(&format!(
                "      {}         {}\n      {}       {}\n",
                p.darkgreen("Unstable version:"),
                version,
                p.darkgreen("Use Flags (stable):"),
                use_line,
            ));
        }

        block.push_str(&format!(
            "      {} {}\n      {}    {}\n      {} {}\n      {}     {}\n",
            p.darkgreen("Size of downloaded files:"),
            record.size,
            p.darkgreen("Homepage:"),
            record.homepage,
            p.darkgreen("Description:"),
            record.description,
            p.darkgreen("License:"),
            record.license,
        ));
        block
    }

    fn flags(&self, record: &PackageRecord) -> Option<FlagSummary> {
        let resolver = self.resolver?;
        match resolver.resolve(&record.full_name) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(package = %record.full_name, "failed to resolve USE flags: {e}");
                None
            }
        }
    }

    fn use_line(&self, summary: &FlagSummary) -> String {
        let p = &self.palette;
        let flags: Vec<String> = summary
            .sorted_flags()
            .into_iter()
            .map(|(flag, enabled)| {
                if enabled {
                    p.red(format!("+{flag}"))
                } else {
                    p.blue(format!("-{flag}"))
                }
            })
            .collect();
        if flags.is_empty() {
            "-".to_string()
        } else {
            flags.join(" ")
        }
    }

    fn compact(&self, record: &PackageRecord) -> String {
        let p = &self.palette;
        let status = if record.is_up_to_date() {
            "I"
        } else if !record.is_installed() {
            "N"
        } else {
            "U"
        };
        let paint = |text: &str| {
            if status == "U" {
                p.turquoise(text)
            } else {
                p.darkgreen(text)
            }
        };
        let masked = if record.masked { "M" } else { " " };

        format!(
            " [{}{}] {} ({}):  {}",
            p.red(masked),
            paint(status),
            p.bold(&record.full_name),
            paint(&record.latest),
            record.description,
        )
    }

    fn ebuilds(
        &self,
        record: &PackageRecord,
        default_stem: Option<&str>,
        listing: &mut EbuildListing,
    ) -> Result<String> {
        let mut lines = vec![self.compact(record)];
        if let Some(locator) = self.locator {
            let entries = locator.locate(&record.full_name, default_stem, listing)?;
            lines.extend(entries.iter().map(|entry| self.ebuild_line(entry)));
        }
        Ok(lines.join("\n"))
    }

    fn ebuild_line(&self, entry: &EbuildEntry) -> String {
        let p = &self.palette;
        let repo = match entry.repository {
            Repository::Primary => p.darkgreen("Portage    "),
            Repository::Overlay(n) => p.red(format!("Overlay {n}  ")),
        };
        format!(" {} [{}] {}", repo, p.bold(entry.number), entry.name)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;
    use crate::iuse::IUse;
    use crate::search::run_query;

    fn index() -> Vec<PackageRecord> {
        let mut foo = PackageRecord::new("foo", "cat/foo", "1.0");
        foo.installed = Some("1.0".to_string());
        foo.size = "12 kB".to_string();
        foo.homepage = "https://foo.example".to_string();
        foo.description = "Foo tool".to_string();
        foo.license = "MIT".to_string();
        let mut bar = PackageRecord::new("bar", "cat/bar", "2.0");
        bar.description = "Bar lib".to_string();
        let mut baz = PackageRecord::new("baz", "other/baz", "3.1");
        baz.masked = true;
        baz.installed = Some("3.0".to_string());
        baz.description = "Baz".to_string();
        vec![foo, bar, baz]
    }

    fn render(patterns: &[&str], config: &SearchConfig) -> (String, RenderContext) {
        let index = index();
        let partitions = run_query(patterns, &index, config).unwrap();
        let renderer: Renderer = Renderer::new(config);
        let mut ctx = RenderContext::default();
        let rendered = renderer.render(&partitions, &mut ctx).unwrap();
        let mut out = Vec::new();
        renderer.write(&mut out, &rendered).unwrap();
        (String::from_utf8(out).unwrap(), ctx)
    }

    fn compact() -> SearchConfig {
        SearchConfig {
            output: OutputMode::Compact,
            ..Default::default()
        }
    }

    #[test]
    fn compact_prefixes() {
        let (out, _) = render(&["^foo$"], &compact());
        assert_eq!(out, " [ I] cat/foo (1.0):  Foo tool\n");

        let (out, _) = render(&["^bar$"], &compact());
        assert_eq!(out, " [ N] cat/bar (2.0):  Bar lib\n");

        let (out, _) = render(&["^baz$"], &compact());
        assert_eq!(out, " [MU] other/baz (3.1):  Baz\n");
    }

    #[test]
    fn compact_masked_installed() {
        let mut rec = PackageRecord::new("q", "cat/q", "1");
        rec.masked = true;
        rec.installed = Some("1".to_string());
        let config = compact();
        let renderer: Renderer = Renderer::new(&config);
        assert!(renderer.compact(&rec).starts_with(" [MI] "));
    }

    #[test]
    fn normal_block() {
        let (out, ctx) = render(&["^foo$"], &SearchConfig::default());
        let expected = "\
[ Results for search key : ^foo$ ]
[ Applications found : 1 ]

*  cat/foo
      Latest version available: 1.0
      Latest version installed: 1.0
      Size of downloaded files: 12 kB
      Homepage:    https://foo.example
      Description: Foo tool
      License:     MIT

";
        assert_eq!(out, expected);
        assert_eq!(ctx.matched, 1);
    }

    #[test]
    fn normal_blocks_per_pattern() {
        let (out, ctx) = render(&["^foo$", "a"], &SearchConfig::default());
        assert!(out.contains("[ Results for search key : a ]\n[ Applications found : 2 ]\n"));
        assert!(out.contains("      Latest version installed: [ Not Installed ]\n"));
        assert!(out.find("cat/foo").unwrap() < out.find("cat/bar").unwrap());
        assert_eq!(ctx.matched, 3);
    }

    #[test]
    fn normal_masked_marker() {
        let (out, _) = render(&["^baz$"], &SearchConfig::default());
        assert!(out.contains("*  other/baz [ Masked ]\n"));
    }

    #[test]
    fn custom_format() {
        let config = SearchConfig {
            output: OutputMode::Custom(r"%n: %d\n".to_string()),
            ..Default::default()
        };
        let index = index();
        let partitions = run_query(&["^foo$"], &index, &config).unwrap();
        let renderer: Renderer = Renderer::new(&config);
        let rendered = renderer
            .render(&partitions, &mut RenderContext::default())
            .unwrap();
        assert_eq!(rendered[0].text, "foo: Foo tool\n");
        assert_eq!(rendered[0].count, 1);
    }

    #[test]
    fn empty_partition_still_has_header() {
        let (out, ctx) = render(&["nothing"], &SearchConfig::default());
        assert!(out.starts_with("[ Results for search key : nothing ]\n[ Applications found : 0 ]\n"));
        assert_eq!(ctx.matched, 0);
    }

    struct FakeResolver {
        asked: RefCell<Vec<String>>,
    }

    impl FlagResolver for FakeResolver {
        fn resolve(&self, full_name: &str) -> Result<Option<FlagSummary>> {
            self.asked.borrow_mut().push(full_name.to_string());
            match full_name {
                "cat/foo" => Ok(Some(FlagSummary::resolve(
                    "1.1_rc1".to_string(),
                    IUse::parse_line("zlib +ssl -acl").unwrap(),
                    &[],
                ))),
                "cat/bar" => Ok(Some(FlagSummary::resolve(
                    "2.0".to_string(),
                    Vec::new(),
                    &[],
                ))),
                _ => Err(Error::InvalidCacheEntry("broken".to_string())),
            }
        }
    }

    #[test]
    fn verbose_flags() {
        let config = SearchConfig {
            output: OutputMode::Verbose,
            ..Default::default()
        };
        let resolver = FakeResolver {
            asked: RefCell::new(Vec::new()),
        };
        let index = index();
        let partitions = run_query(&["^(foo|bar|baz)$"], &index, &config).unwrap();
        let renderer: Renderer = Renderer::new(&config).with_resolver(&resolver);
        let rendered = renderer
            .render(&partitions, &mut RenderContext::default())
            .unwrap();
        let text = &rendered[0].text;

        assert!(text.contains("      Unstable version:         1.1_rc1\n"));
        assert!(text.contains("      Use Flags (stable):       -acl +ssl -zlib\n"));
        assert!(text.contains("      Unstable version:         2.0\n      Use Flags (stable):       -\n"));
        assert!(text.contains("      Unstable version:         -\n"));
        assert_eq!(*resolver.asked.borrow(), vec!["cat/foo", "cat/bar", "other/baz"]);
    }

    #[test]
    fn ebuild_listing() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = tmp.path().join("gentoo");
        let overlay = tmp.path().join("local");
        for rel in [
            "cat/foo/foo-1.0.ebuild",
            "cat/foo/foo-0.9.ebuild",
            "cat/bar/bar-2.0.ebuild",
            "cat/bar/bar-1.5.ebuild",
        ] {
            let path = tree.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        let extra = overlay.join("cat/bar/bar-9999.ebuild");
        fs::create_dir_all(extra.parent().unwrap()).unwrap();
        fs::write(&extra, "").unwrap();

        let config = SearchConfig {
            output: OutputMode::EbuildList,
            primary_tree: tree.clone(),
            overlays: vec![overlay.clone()],
            ..Default::default()
        };
        let locator = EbuildLocator::new(tree, vec![overlay], PmsVersion);
        let index = index();
        let partitions = run_query(&["^foo$", "^bar$"], &index, &config).unwrap();
        let renderer = Renderer::new(&config).with_locator(&locator);
        let mut ctx = RenderContext::default();
        let rendered = renderer.render(&partitions, &mut ctx).unwrap();

        assert_eq!(
            rendered[0].text,
            " [ I] cat/foo (1.0):  Foo tool\n \
             Portage     [1] foo-0.9\n \
             Portage     [2] foo-1.0"
        );
        assert_eq!(
            rendered[1].text,
            " [ N] cat/bar (2.0):  Bar lib\n \
             Portage     [3] bar-1.5\n \
             Portage     [4] bar-2.0\n \
             Overlay 1   [5] bar-9999"
        );
        assert_eq!(ctx.matched, 2);
        assert_eq!(ctx.listing.len(), 5);
        assert!(ctx.listing.found_in_overlay());
        let default = ctx.listing.default_selection().unwrap();
        assert_eq!(default.label, "foo-1.0");
        assert_eq!(Some(default.path.as_path()), ctx.listing.get(2));
    }
}
