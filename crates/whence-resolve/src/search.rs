//! Search-path emulation and name location.

use std::env;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::links;

/// Ordered directory list derived from the `PATH` environment variable.
///
/// Order is preserved exactly as declared; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Build from the process `PATH` variable. An unset variable yields
    /// an empty search path.
    pub fn from_env() -> Self {
        Self::from_value(env::var_os("PATH").unwrap_or_default())
    }

    /// Build from an explicit separator-joined value. Entries are
    /// trimmed of surrounding whitespace and empty entries dropped.
    pub fn from_value(value: impl AsRef<OsStr>) -> Self {
        let dirs = env::split_paths(value.as_ref())
            .filter_map(|p| {
                let trimmed = p.to_string_lossy().trim().to_string();
                (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
            })
            .collect();
        Self { dirs }
    }

    /// Directories in declared order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Locate `name` the way a shell would: the name itself first
    /// (unless `ignore_cwd`), then joined onto each search directory in
    /// order. Absence is a normal outcome, never an error.
    pub fn locate(&self, name: &Path, ignore_cwd: bool) -> Option<PathBuf> {
        if entry_exists(name) {
            if !ignore_cwd {
                debug!(path = %name.display(), "exists as given");
                return Some(name.to_path_buf());
            }
            debug!(path = %name.display(), "exists as given, ignored");
        }

        for dir in &self.dirs {
            let candidate = dir.join(name);
            if entry_exists(&candidate) {
                debug!(path = %candidate.display(), "located in search path");
                return Some(candidate);
            }
        }
        None
    }
}

/// Whether a path names an existing filesystem entry.
///
/// A dangling symlink still counts: it must be reported as found but
/// broken, not as absent. `symlink_metadata` succeeds in exactly those
/// cases.
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Whether a path is a symlink whose target is gone.
pub fn entry_broken(path: &Path) -> bool {
    path.is_symlink() && !path.exists()
}

/// Expand a leading `~` and absolutize paths that climb through `..`.
pub fn expand(raw: &str) -> PathBuf {
    let path = if let Some(rest) = raw.strip_prefix("~/") {
        match home::home_dir() {
            Some(h) => h.join(rest),
            None => PathBuf::from(raw),
        }
    } else if raw == "~" {
        home::home_dir().unwrap_or_else(|| PathBuf::from(raw))
    } else {
        PathBuf::from(raw)
    };

    if path.components().any(|c| c == Component::ParentDir) {
        links::normalize(&path)
    } else {
        path
    }
}
