//! Per-name orchestration and the precedence policy.

use std::path::PathBuf;

use tracing::debug;

use crate::error::Error;
use crate::filetype;
use crate::links::{self, LinkChain};
use crate::search::{self, SearchPath};
use crate::shell::{BuiltinInfo, Definition, DefinitionKind, ShellProbe};

/// Caller-selected behavior for one resolution batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Skip the current-directory/explicit-path check and go straight
    /// to the search path.
    pub ignore_cwd: bool,
    /// Classify targets with MIME strings instead of descriptions.
    pub use_mime: bool,
    /// Never choose a builtin candidate.
    pub suppress_builtins: bool,
    /// Return every candidate per name instead of the best one.
    pub all_candidates: bool,
}

/// A file-kind candidate: the located path, its link chain, and the
/// classified content type of the terminal target.
///
/// Built once per requested name, fully resolved during construction,
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    /// The name as the caller supplied it.
    pub requested: String,
    /// The path after search-path lookup.
    pub path: PathBuf,
    /// Whether anything exists at `path`, dangling symlinks included.
    pub exists: bool,
    /// Whether `path` is a symlink whose target is gone.
    pub broken: bool,
    /// Every intermediate symlink hop, in order. Empty when `path` is
    /// not a symlink.
    pub hops: Vec<PathBuf>,
    /// The terminal target of the chain (equal to `path` when the
    /// chain is empty or circular).
    pub target: PathBuf,
    pub filetype: String,
    /// The hop at which a circular chain looped back, if any.
    pub cycle_entry: Option<PathBuf>,
    /// Whether classification completed; false for non-existing paths.
    pub resolved: bool,
}

impl ResolvedFile {
    /// Resolve a name end to end: expansion, search-path lookup, link
    /// chain, classification. Failures land in the flags and sentinel
    /// strings; this never errors.
    pub fn resolve(name: &str, search: &SearchPath, options: ResolveOptions) -> Self {
        let requested = search::expand(name);
        let (path, exists) = match search.locate(&requested, options.ignore_cwd) {
            Some(p) => (p, true),
            None => (requested, false),
        };
        let broken = search::entry_broken(&path);

        let mut out = Self {
            requested: name.to_string(),
            target: path.clone(),
            path,
            exists,
            broken,
            hops: Vec::new(),
            filetype: String::new(),
            cycle_entry: None,
            resolved: false,
        };
        if !exists {
            return out;
        }
        debug!(path = %out.path.display(), "resolving file candidate");

        match links::follow_links(&out.path) {
            LinkChain::Complete { hops } => {
                if let Some(last) = hops.last() {
                    out.target = last.clone();
                }
                out.hops = hops;
                out.filetype = filetype::classify(&out.target, options.use_mime, out.broken);
            }
            LinkChain::Circular { hops, entry } => {
                let depth = hops.len();
                out.filetype = format!(
                    "<circular link: {} {} deep>",
                    depth,
                    if depth == 1 { "level" } else { "levels" },
                );
                out.hops = hops;
                out.cycle_entry = Some(entry);
            }
        }
        if out.filetype == filetype::DIRECTORY {
            out.target = links::normalize(&out.target);
        }
        out.resolved = true;
        out
    }

    pub fn is_circular(&self) -> bool {
        self.cycle_entry.is_some()
    }
}

/// One way a name resolves. A name can produce several of these at
/// once, e.g. a function that shadows a file on disk.
#[derive(Debug, Clone)]
pub enum Candidate {
    Alias(Definition),
    Function(Definition),
    Builtin(BuiltinInfo),
    File(ResolvedFile),
}

/// Everything gathered for one name before precedence is applied.
#[derive(Debug, Default)]
struct CandidateSet {
    definition: Option<Definition>,
    builtin: Option<BuiltinInfo>,
    file: Option<ResolvedFile>,
}

impl CandidateSet {
    fn is_empty(&self) -> bool {
        self.definition.is_none() && self.builtin.is_none() && self.file.is_none()
    }
}

/// The chosen candidates for one name.
#[derive(Debug)]
pub struct NameResolution {
    pub name: String,
    /// Zero or one candidate in single-result mode; possibly several
    /// in all-candidates mode. Empty when the only candidate was a
    /// suppressed builtin.
    pub candidates: Vec<Candidate>,
}

/// Per-name outcomes of one resolution batch.
#[derive(Debug, Default)]
pub struct Resolution {
    /// One entry per name that produced at least one candidate, in
    /// input order.
    pub names: Vec<NameResolution>,
    /// Names with no candidate of any kind, in input order.
    pub unresolved: Vec<String>,
    /// Per-name pattern errors; resolution continued past them.
    pub errors: Vec<Error>,
}

/// Gathers candidates per name and applies the precedence policy:
/// alias/function over builtin, builtin over file, file over a
/// suppressed or file-aliased builtin.
#[derive(Debug)]
pub struct Resolver {
    search: SearchPath,
    probe: ShellProbe,
    options: ResolveOptions,
}

impl Resolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self::with_parts(SearchPath::from_env(), ShellProbe::new(), options)
    }

    pub fn with_parts(search: SearchPath, probe: ShellProbe, options: ResolveOptions) -> Self {
        Self {
            search,
            probe,
            options,
        }
    }

    /// Directories consulted for bare names, in order.
    pub fn search_dirs(&self) -> &[PathBuf] {
        self.search.dirs()
    }

    /// Resolve a batch of names. Each name lands in `names` with its
    /// chosen candidates or in `unresolved`, never both.
    pub fn resolve(&mut self, names: &[String]) -> Resolution {
        let mut resolution = Resolution::default();

        // One pass over the alias file serves the whole batch.
        let (mut definitions, errors) = self.probe.scan_definitions(names, &self.search);
        resolution.errors = errors;

        for name in names {
            let file = ResolvedFile::resolve(name, &self.search, self.options);
            let set = CandidateSet {
                definition: definitions.remove(name),
                builtin: self.probe.builtin_info(name),
                file: file.exists.then_some(file),
            };

            if set.is_empty() {
                debug!(name = %name, "unresolved");
                resolution.unresolved.push(name.clone());
                continue;
            }

            let candidates = if self.options.all_candidates {
                all_of(set, self.options)
            } else {
                pick(set, self.options).into_iter().collect()
            };
            resolution.names.push(NameResolution {
                name: name.clone(),
                candidates,
            });
        }
        resolution
    }
}

/// Single-result mode: the precedence policy.
fn pick(set: CandidateSet, options: ResolveOptions) -> Option<Candidate> {
    if let Some(def) = set.definition {
        return Some(definition_candidate(def));
    }
    if !options.suppress_builtins {
        if let Some(builtin) = set.builtin.filter(|b| !b.is_file_alias()) {
            return Some(Candidate::Builtin(builtin));
        }
    }
    set.file.map(Candidate::File)
}

/// All-candidates mode: no precedence, but file-aliased and suppressed
/// builtins still stay out to avoid duplicate file-kind reporting.
fn all_of(set: CandidateSet, options: ResolveOptions) -> Vec<Candidate> {
    let mut out = Vec::new();
    if let Some(def) = set.definition {
        out.push(definition_candidate(def));
    }
    if let Some(builtin) = set.builtin {
        if !builtin.is_file_alias() && !options.suppress_builtins {
            out.push(Candidate::Builtin(builtin));
        }
    }
    if let Some(file) = set.file {
        out.push(Candidate::File(file));
    }
    out
}

fn definition_candidate(def: Definition) -> Candidate {
    match def.kind {
        DefinitionKind::Alias => Candidate::Alias(def),
        DefinitionKind::Function => Candidate::Function(def),
    }
}
