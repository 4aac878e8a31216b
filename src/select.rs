use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::render::{Palette, RenderContext};

/// Opens a file in the user's editor.
pub trait Launcher {
    fn open(&self, editor: &str, path: &Path) -> Result<()>;
}

/// Runs the editor command line with the path appended and waits for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLauncher;

impl Launcher for CommandLauncher {
    fn open(&self, editor: &str, path: &Path) -> Result<()> {
        let mut words = editor.split_whitespace();
        let program = words.next().ok_or(Error::MissingEditor)?;
        debug!(editor, path = %path.display(), "launching editor");

        let status = Command::new(program)
            .args(words)
            .arg(path)
            .status()
            .map_err(|source| Error::Editor {
                editor: editor.to_string(),
                source,
            })?;
        if !status.success() {
            warn!(editor, %status, "editor exited unsuccessfully");
        }
        Ok(())
    }
}

/// The user-facing side of a query: where results go and where answers come from.
pub struct Terminal<'a, R, W> {
    /// Where answers to the prompt are read from.
    pub input: R,
    /// Where results and the prompt are written.
    pub output: W,
    /// Editor command, usually `$EDITOR`.
    pub editor: Option<String>,
    /// Opens the chosen ebuild.
    pub launcher: &'a dyn Launcher,
    /// Colours for the prompt and overlay legend.
    pub palette: Palette,
}

impl<R: BufRead, W: Write> Terminal<'_, R, W> {
    /// Ask which listed ebuild to open and open it.
    ///
    /// Prints the overlay legend first. Nothing is asked when no package
    /// matched; a single listed ebuild is opened without asking. An empty
    /// or non-numeric answer opens the default selection, which is only
    /// offered when exactly one package matched.
    pub fn choose(&mut self, ctx: &mut RenderContext, overlays: &[PathBuf]) -> Result<()> {
        if ctx.listing.found_in_overlay() {
            for (i, dir) in overlays.iter().enumerate() {
                let legend = format!("Overlay {} : {}", i + 1, dir.display());
                writeln!(self.output, "{}", self.palette.red(legend))?;
            }
        }

        if ctx.matched == 0 {
            return Ok(());
        }
        if ctx.matched > 1 {
            ctx.listing.clear_default();
        }

        let path = if ctx.listing.len() == 1 {
            self.resolve("1", ctx)?
        } else {
            let answer = self.ask(ctx)?;
            self.resolve(answer.trim(), ctx)?
        };

        let editor = match self.editor.as_deref() {
            Some(editor) if !editor.trim().is_empty() => editor,
            _ => {
                writeln!(self.output)?;
                return Err(Error::MissingEditor);
            }
        };
        self.launcher.open(editor, &path)
    }

    fn ask(&mut self, ctx: &RenderContext) -> Result<String> {
        let p = self.palette;
        match ctx.listing.default_selection() {
            Some(default) => write!(
                self.output,
                "\n{} ({}): ",
                p.bold("Show Ebuild"),
                p.darkgreen(&default.label)
            )?,
            None => write!(self.output, "\n{} ", p.bold("Show Ebuild:"))?,
        }
        self.output.flush()?;

        match read_answer(&mut self.input) {
            Ok(line) => Ok(line),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(Error::InputInterrupted),
            Err(e) => Err(Error::Output(e)),
        }
    }

    fn resolve(&mut self, answer: &str, ctx: &RenderContext) -> Result<PathBuf> {
        let listing = &ctx.listing;
        match answer.parse::<usize>() {
            Ok(number) => match listing.get(number) {
                Some(path) => Ok(path.to_path_buf()),
                None => {
                    writeln!(self.output)?;
                    Err(Error::NoSuchEbuild {
                        selection: number,
                        available: listing.len(),
                    })
                }
            },
            Err(_) => match listing.default_selection() {
                Some(default) => Ok(default.path.clone()),
                None => {
                    writeln!(self.output)?;
                    Err(Error::InvalidSelection(answer.to_string()))
                }
            },
        }
    }
}

/// Read one line; unlike [`BufRead::read_line`], an interrupted read is
/// reported instead of retried. End of input reads as an empty line.
fn read_answer<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = Vec::new();
    loop {
        let buf = input.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(end) => {
                line.extend_from_slice(&buf[..=end]);
                input.consume(end + 1);
                break;
            }
            None => {
                let len = buf.len();
                line.extend_from_slice(buf);
                input.consume(len);
            }
        }
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}
