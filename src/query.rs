use std::io::{BufRead, Write};

use tracing::debug;

use crate::cache::Md5CacheResolver;
use crate::config::{OutputMode, SearchConfig};
use crate::ebuild::EbuildLocator;
use crate::error::Result;
use crate::record::PackageRecord;
use crate::render::{RenderContext, Renderer};
use crate::search::run_query;
use crate::select::Terminal;
use crate::version::PmsVersion;

/// Search `index` for `patterns`, print the results to the terminal and,
/// for ebuild listings, let the user open one of the listed ebuilds.
///
/// An invalid pattern fails before anything is printed. Errors from the
/// selection prompt are returned after the results have been written.
///
/// # Examples
///
/// ```
/// use std::io::empty;
/// use esearch::{run, CommandLauncher, OutputMode, PackageRecord, Palette, SearchConfig, Terminal};
///
/// let index = vec![PackageRecord::new("foo", "app-misc/foo", "1.0")];
/// let config = SearchConfig { output: OutputMode::Compact, ..Default::default() };
/// let mut term = Terminal {
///     input: std::io::BufReader::new(empty()),
///     output: Vec::new(),
///     editor: None,
///     launcher: &CommandLauncher,
///     palette: Palette::new(false),
/// };
/// run(&["foo"], &index, &config, &mut term).unwrap();
/// assert_eq!(String::from_utf8(term.output).unwrap(), " [ N] app-misc/foo (1.0):  \n");
/// ```
pub fn run<S, R, W>(
    patterns: &[S],
    index: &[PackageRecord],
    config: &SearchConfig,
    term: &mut Terminal<'_, R, W>,
) -> Result<()>
where
    S: AsRef<str>,
    R: BufRead,
    W: Write,
{
    let partitions = run_query(patterns, index, config)?;

    let resolver = Md5CacheResolver::new(
        config.repositories().cloned().collect(),
        config.use_flags.clone(),
    );
    let locator = EbuildLocator::new(
        config.primary_tree.clone(),
        config.overlays.clone(),
        PmsVersion,
    );
    let mut renderer = Renderer::new(config);
    match config.output {
        OutputMode::Verbose => renderer = renderer.with_resolver(&resolver),
        OutputMode::EbuildList => renderer = renderer.with_locator(&locator),
        _ => {}
    }

    let mut ctx = RenderContext::default();
    let rendered = renderer.render(&partitions, &mut ctx)?;
    renderer.write(&mut term.output, &rendered)?;
    term.output.flush()?;
    debug!(matched = ctx.matched, ebuilds = ctx.listing.len(), "rendered results");

    if config.output == OutputMode::EbuildList {
        term.choose(&mut ctx, locator.overlays())?;
    }
    Ok(())
}
