//! esearch command-line interface.
//!
//! Replacement for `emerge --search` using a pre-built index.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use esearch::{CommandLauncher, Error, OutputMode, Palette, SearchConfig, Terminal};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "esearch",
    about = "Replacement for 'emerge search' with search-index",
    version
)]
#[command(group(ArgGroup::new("mode").args(["compact", "verbose", "ebuild", "own"])))]
struct Cli {
    /// Patterns to search for (regular expressions, `*` for everything)
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Search package descriptions as well
    #[arg(short = 'S', long = "searchdesc", conflicts_with = "fullname")]
    searchdesc: bool,

    /// Search packages full name (includes category)
    #[arg(short = 'F', long)]
    fullname: bool,

    /// Find only packages which are installed
    #[arg(short = 'I', long = "instonly")]
    instonly: bool,

    /// Find only packages which are not installed
    #[arg(short = 'N', long = "notinst")]
    notinst: bool,

    /// Exclude packages matching XPATTERN from search result
    #[arg(short = 'x', long, value_name = "XPATTERN")]
    exclude: Vec<String>,

    /// More compact output format
    #[arg(short, long)]
    compact: bool,

    /// Give a lot of additional information (slow!)
    #[arg(short, long)]
    verbose: bool,

    /// View ebuilds of found packages
    #[arg(short, long)]
    ebuild: bool,

    /// Use your own output format (%c %n %p %m %va %vi %s %h %d %l)
    #[arg(short, long, value_name = "FORMAT")]
    own: Option<String>,

    /// Directory to load the esearch index from
    #[arg(short, long, value_name = "DIR", default_value = esearch::index::DEFAULT_INDEX_DIR)]
    directory: PathBuf,

    /// Don't use ANSI codes for colored output
    #[arg(short, long)]
    nocolor: bool,

    /// Main ebuild repository
    #[arg(long, env = "PORTDIR", default_value = "/var/db/repos/gentoo")]
    portdir: PathBuf,

    /// Overlay repositories, separated by whitespace
    #[arg(long, env = "PORTDIR_OVERLAY", default_value = "")]
    overlays: String,

    /// USE flag settings applied in verbose mode
    #[arg(long = "use", env = "USE", default_value = "")]
    use_flags: String,

    /// Print debug logging to stderr
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        if self.compact {
            OutputMode::Compact
        } else if self.verbose {
            OutputMode::Verbose
        } else if self.ebuild {
            OutputMode::EbuildList
        } else if let Some(format) = &self.own {
            OutputMode::Custom(format.clone())
        } else {
            OutputMode::Normal
        }
    }

    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            search_descriptions: self.searchdesc,
            full_name: self.fullname,
            installed_only: self.instonly,
            not_installed_only: self.notinst,
            exclude: self.exclude.clone(),
            output: self.output_mode(),
            primary_tree: self.portdir.clone(),
            overlays: self.overlays.split_whitespace().map(PathBuf::from).collect(),
            use_flags: self
                .use_flags
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            color: !self.nocolor && console::colors_enabled(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = cli.search_config();
    let palette = Palette::new(config.color);

    match search(&cli, &config, palette) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::InputInterrupted) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {}", palette.red("!!! Error:"), e);
            ExitCode::FAILURE
        }
    }
}

fn search(cli: &Cli, config: &SearchConfig, palette: Palette) -> esearch::Result<()> {
    if !cli.directory.is_dir() {
        return Err(Error::Index(format!(
            "directory '{}' does not exist",
            cli.directory.display()
        )));
    }
    let index = esearch::index::load(&cli.directory)?;
    debug!(?config, "searching");

    let stdin = io::stdin();
    let mut term = Terminal {
        input: stdin.lock(),
        output: io::stdout().lock(),
        editor: std::env::var("EDITOR").ok(),
        launcher: &CommandLauncher,
        palette,
    };
    esearch::run(&cli.patterns, &index, config, &mut term)
}
