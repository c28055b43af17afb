//! Symlink chain traversal with explicit cycle detection.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// The ordered hops from a starting path toward its terminal target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkChain {
    /// Every hop up to the non-symlink terminal target. Empty when the
    /// starting path is not a symlink at all.
    Complete { hops: Vec<PathBuf> },
    /// Traversal revisited `entry`; the chain ends with that repeated
    /// hop, so the last element always equals an earlier one.
    Circular { hops: Vec<PathBuf>, entry: PathBuf },
}

impl LinkChain {
    pub fn hops(&self) -> &[PathBuf] {
        match self {
            LinkChain::Complete { hops } | LinkChain::Circular { hops, .. } => hops,
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, LinkChain::Circular { .. })
    }

    /// The hop at which the chain loops back on itself.
    pub fn cycle_entry(&self) -> Option<&Path> {
        match self {
            LinkChain::Circular { entry, .. } => Some(entry),
            LinkChain::Complete { .. } => None,
        }
    }

    /// Terminal target of a complete, non-empty chain.
    pub fn target(&self) -> Option<&Path> {
        match self {
            LinkChain::Complete { hops } => hops.last().map(PathBuf::as_path),
            LinkChain::Circular { .. } => None,
        }
    }
}

/// Follow the symlink chain starting at `path`.
///
/// Each hop is resolved relative to the link's own directory and
/// lexically normalized. Cycles are found by membership against the
/// hops already collected (including the starting path), never by
/// recursion depth, so arbitrarily long cycles terminate
/// deterministically.
pub fn follow_links(path: &Path) -> LinkChain {
    let start = normalize(path);
    let mut hops: Vec<PathBuf> = Vec::new();
    let mut current = start.clone();

    loop {
        let raw_target = match fs::read_link(&current) {
            // Not a symlink (or unreadable): terminal target reached.
            Err(_) => break,
            Ok(t) => t,
        };
        let base = current.parent().unwrap_or_else(|| Path::new("/"));
        let next = normalize(&base.join(raw_target));

        if next == start || hops.contains(&next) {
            debug!(entry = %next.display(), "circular link detected");
            hops.push(next.clone());
            return LinkChain::Circular { hops, entry: next };
        }
        hops.push(next.clone());
        current = next;
    }

    LinkChain::Complete { hops }
}

/// Lexically normalize a path: absolutize against the working directory
/// and collapse `.` and `..` components without touching the
/// filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(path)
    };

    let mut out = PathBuf::new();
    for comp in absolute.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                // pop() is a no-op at the root, matching lexical
                // resolution of "/.."
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
