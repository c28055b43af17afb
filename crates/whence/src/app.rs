//! Argument surface and the run loop around the resolver.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use whence_resolve::{ResolveOptions, Resolver, SearchPath};

use crate::render::{self, Mode};

#[derive(Debug, Parser)]
#[command(
    name = "whence",
    version,
    about = "Reveals the actual location and file type for a path or command.\n\
             Also handles shell builtins, aliases, and functions.",
    propagate_version = true
)]
pub struct App {
    /// Paths or command names to resolve.
    #[arg(value_name = "PATH", required_unless_present = "path_list")]
    pub names: Vec<String>,

    /// Show all aliases, functions, builtins, and file paths found.
    #[arg(
        short = 'a',
        long = "all",
        conflicts_with_all = ["no_builtins", "dir", "mime"]
    )]
    pub all: bool,

    /// Don't check shell builtins.
    #[arg(short = 'B', long = "no-builtins")]
    pub no_builtins: bool,

    /// Ignore files in the CWD, and try $PATH instead.
    #[arg(short = 'c', long = "ignore-cwd")]
    pub ignore_cwd: bool,

    /// Print the parent directory of the final target.
    /// This enables --no-builtins.
    #[arg(short = 'd', long = "dir", conflicts_with = "mime")]
    pub dir: bool,

    /// Show mime type instead of human readable form.
    /// This enables --no-builtins.
    #[arg(short = 'm', long = "mime")]
    pub mime: bool,

    /// List directories in $PATH, one per line.
    #[arg(short = 'p', long = "path", conflicts_with = "names")]
    pub path_list: bool,

    /// Short output, print only the target. On error nothing is
    /// printed and non-zero is returned. Broken symlinks are prepended
    /// with 'dead:', circular ones with 'circular:'.
    #[arg(short = 's', long = "short")]
    pub short: bool,

    /// Print some debugging info.
    #[arg(short = 'D', long = "debug")]
    pub debug: bool,
}

pub fn run(app: App) -> Result<ExitCode> {
    if app.path_list {
        let search = SearchPath::from_env();
        return match print_search_dirs(&search) {
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(ExitCode::from(3)),
            Err(err) => Err(err.into()),
            Ok(()) => Ok(if search.dirs().is_empty() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }),
        };
    }

    let options = ResolveOptions {
        ignore_cwd: app.ignore_cwd,
        use_mime: app.mime,
        suppress_builtins: app.no_builtins || app.dir || app.mime,
        all_candidates: app.all,
    };
    debug!(?options, names = ?app.names, "resolving");
    let mut resolver = Resolver::new(options);
    let resolution = resolver.resolve(&app.names);

    let mode = Mode {
        dir_only: app.dir,
        short: app.short,
    };
    match print_resolution(&resolution, mode) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => return Ok(ExitCode::from(3)),
        Err(err) => return Err(err.into()),
        Ok(()) => {}
    }

    for err in &resolution.errors {
        eprintln!("{err}");
    }

    let errs = resolution.unresolved.len();
    if errs > 0 && !app.short {
        report_unresolved(&resolution.unresolved, app.ignore_cwd);
    }
    Ok(ExitCode::from(errs.min(u8::MAX as usize) as u8))
}

fn print_search_dirs(search: &SearchPath) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for dir in search.dirs() {
        writeln!(stdout, "{}", dir.display())?;
    }
    Ok(())
}

fn print_resolution(resolution: &whence_resolve::Resolution, mode: Mode) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    let mut first = true;
    for entry in &resolution.names {
        for candidate in &entry.candidates {
            let text = render::candidate(candidate, mode);
            if text.is_empty() {
                continue;
            }
            if !mode.short && !mode.dir_only && !first {
                writeln!(stdout)?;
            }
            writeln!(stdout, "{text}")?;
            first = false;
        }
    }
    Ok(())
}

fn report_unresolved(unresolved: &[String], ignore_cwd: bool) {
    let errs = unresolved.len();
    eprintln!(
        "\nThere {} resolving {} {}.",
        if errs == 1 {
            "was an error"
        } else {
            "were errors"
        },
        errs,
        if errs == 1 { "path" } else { "paths" },
    );

    for name in unresolved {
        let mut msg = format!("'{name}' is not a known program or file path.");
        if ignore_cwd {
            let path = Path::new(name);
            if path.exists() {
                msg.push_str("\nIt is an existing file, but was ignored.");
            } else if path.is_symlink() {
                msg.push_str("\nIt is an existing symlink, but was ignored.");
            }
        }
        eprintln!("\n    {}", msg.replace('\n', "\n    "));
    }
}
