//! Shell entity probing: aliases, functions, and builtins.
//!
//! Alias and function lookup scans the user's interactive-shell alias
//! file once per batch of names. Builtin lookup shells out to the
//! interpreter's own `type` classification. Every external failure
//! degrades to "no match"; nothing here aborts a resolution batch.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;
use tracing::debug;

use crate::error::Error;
use crate::search::SearchPath;

/// External program that prints full function definitions out of a
/// shell source file.
const DEFINITION_HELPER: &str = "findfunc";

/// Conventional alias-file locations, in lookup order.
fn alias_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = home::home_dir() {
        candidates.push(home.join(".bash_aliases"));
        candidates.push(home.join("bash.alias.sh"));
    }
    candidates.push(PathBuf::from("/etc/.bash_aliases"));
    candidates
}

/// An alias or function definition matched in the alias file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub file: PathBuf,
    pub name: String,
    /// 1-based line number of the matched line.
    pub line: usize,
    /// The trimmed matched line, or the helper's full function source.
    pub text: String,
    pub kind: DefinitionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Alias,
    Function,
}

/// What the shell's `type` query reported for a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinInfo {
    pub name: String,
    /// Raw `type` output, e.g. `"cd is a shell builtin"`.
    pub description: String,
    pub kind: BuiltinKind,
    /// First description line from `help <name>`, when available.
    pub help: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinKind {
    Builtin,
    Keyword,
    Alias,
    Function,
    /// `type` reported a plain file on disk; that candidate belongs to
    /// the file resolver, not here.
    File(PathBuf),
    Unknown,
}

impl BuiltinInfo {
    /// Classify prose `type` output. The `"<name> is <path>"` form is
    /// the file case and must not be treated as a real builtin.
    fn from_description(name: &str, description: String, help: Option<String>) -> Self {
        let kind = if description.contains("builtin") {
            BuiltinKind::Builtin
        } else if description.contains("keyword") {
            BuiltinKind::Keyword
        } else if description.contains("alias") {
            BuiltinKind::Alias
        } else if description.contains("function") {
            BuiltinKind::Function
        } else if let Some((_, path)) = description.rsplit_once(" is ") {
            BuiltinKind::File(PathBuf::from(path.trim()))
        } else {
            BuiltinKind::Unknown
        };
        Self {
            name: name.to_string(),
            description,
            kind,
            help,
        }
    }

    pub fn is_file_alias(&self) -> bool {
        matches!(self.kind, BuiltinKind::File(_))
    }
}

#[derive(Debug)]
enum HelperState {
    Unprobed,
    Found(PathBuf),
    Missing,
}

/// Probes the shell's own namespace for a batch of names.
///
/// Carries the process-lifetime caches as fields so test runs get
/// fresh, isolated state: the discovered helper location (including a
/// remembered failed discovery) and prior search-path lookups.
#[derive(Debug)]
pub struct ShellProbe {
    alias_file: Option<PathBuf>,
    shell_matches: bool,
    helper: HelperState,
    located: HashMap<String, PathBuf>,
}

impl Default for ShellProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellProbe {
    /// Pick the first existing alias file and gate scanning on the
    /// login shell being the one whose syntax we parse.
    pub fn new() -> Self {
        let alias_file = alias_file_candidates().into_iter().find(|p| p.exists());
        let shell_matches = env::var("SHELL")
            .map(|s| s.contains("bash"))
            .unwrap_or(false);
        Self::with_alias_file(alias_file, shell_matches)
    }

    /// Construction seam for tests and embedders.
    pub fn with_alias_file(alias_file: Option<PathBuf>, shell_matches: bool) -> Self {
        Self {
            alias_file,
            shell_matches,
            helper: HelperState::Unprobed,
            located: HashMap::new(),
        }
    }

    /// Scan the alias file once, matching every still-unmatched name
    /// against every line; the first matching line per name wins.
    ///
    /// Returns the matches plus one `InvalidPattern` error per name
    /// that could not be compiled into a search pattern; the other
    /// names are still scanned.
    pub fn scan_definitions(
        &mut self,
        names: &[String],
        search: &SearchPath,
    ) -> (HashMap<String, Definition>, Vec<Error>) {
        let mut matches = HashMap::new();
        let mut errors = Vec::new();

        let Some(alias_file) = self.alias_file.clone() else {
            debug!("no alias file, skipping alias/function scan");
            return (matches, errors);
        };
        if !self.shell_matches {
            debug!("login shell does not match, skipping alias/function scan");
            return (matches, errors);
        }

        // Request order, so a line satisfying two patterns is always
        // claimed by the name listed first.
        let mut patterns: Vec<(String, Regex)> = Vec::new();
        for name in names {
            match definition_pattern(name) {
                Ok(pattern) => patterns.push((name.clone(), pattern)),
                Err(source) => errors.push(Error::InvalidPattern {
                    name: name.clone(),
                    source,
                }),
            }
        }
        if patterns.is_empty() {
            return (matches, errors);
        }

        let content = match fs::read_to_string(&alias_file) {
            Ok(c) => c,
            Err(err) => {
                debug!(file = %alias_file.display(), %err, "cannot read alias file");
                return (matches, errors);
            }
        };

        for (idx, line) in content.lines().enumerate() {
            if patterns.is_empty() {
                break;
            }
            let lineno = idx + 1;
            let trimmed = line.trim();

            let Some(pos) = patterns.iter().position(|(_, p)| p.is_match(trimmed)) else {
                continue;
            };
            let (name, _) = patterns.remove(pos);
            let kind = if trimmed.starts_with("alias") {
                DefinitionKind::Alias
            } else {
                DefinitionKind::Function
            };
            debug!(name = %name, lineno, "matched in alias file");

            let text = match kind {
                DefinitionKind::Alias => trimmed.to_string(),
                DefinitionKind::Function => self
                    .function_source(&name, &alias_file, search)
                    .unwrap_or_else(|| trimmed.to_string()),
            };
            matches.insert(
                name.clone(),
                Definition {
                    file: alias_file.clone(),
                    name,
                    line: lineno,
                    text,
                    kind,
                },
            );
        }

        (matches, errors)
    }

    /// Ask the shell what it makes of `name` via `type`. Nonzero exit
    /// or empty output means "not a builtin", never an error.
    pub fn builtin_info(&self, name: &str) -> Option<BuiltinInfo> {
        let description = bash_output(&format!("type {name}"))?;
        if description.is_empty() {
            return None;
        }
        let help = bash_output(&format!("help {name}"))
            .and_then(|out| out.lines().nth(1).map(|l| l.trim().to_string()))
            .filter(|l| !l.is_empty());
        Some(BuiltinInfo::from_description(name, description, help))
    }

    /// Locate an executable on the search path, remembering prior
    /// results for the lifetime of the probe.
    pub fn locate_command(&mut self, name: &str, search: &SearchPath) -> Option<PathBuf> {
        if let Some(prev) = self.located.get(name) {
            debug!(name, path = %prev.display(), "using cached location");
            return Some(prev.clone());
        }
        for dir in search.dirs() {
            let full = dir.join(name);
            if full.exists() {
                self.located.insert(name.to_string(), full.clone());
                return Some(full);
            }
        }
        None
    }

    /// Full function source via the external helper, when available.
    fn function_source(&mut self, name: &str, file: &Path, search: &SearchPath) -> Option<String> {
        let helper = self.helper_path(search)?.to_path_buf();
        match Command::new(&helper)
            .arg("--short")
            .arg(name)
            .arg(file)
            .output()
        {
            Ok(out) if out.status.success() => {
                let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
                (!text.is_empty()).then_some(text)
            }
            Ok(out) => {
                debug!(name, code = ?out.status.code(), "definition helper returned nonzero");
                None
            }
            Err(err) => {
                debug!(name, %err, "definition helper failed to run");
                None
            }
        }
    }

    /// Discover the helper once; a failed discovery is remembered and
    /// never retried within this probe's lifetime.
    fn helper_path(&mut self, search: &SearchPath) -> Option<&Path> {
        if matches!(self.helper, HelperState::Unprobed) {
            self.helper = match self.locate_command(DEFINITION_HELPER, search) {
                Some(path) => {
                    debug!(path = %path.display(), "found definition helper");
                    HelperState::Found(path)
                }
                None => {
                    debug!("definition helper not available");
                    HelperState::Missing
                }
            };
        }
        match &self.helper {
            HelperState::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// The alternation tried against each alias-file line: an
/// `alias <name>=` assignment, a `function <name>` declaration, or a
/// bare `<name>()` declaration. The name is interpolated raw, so
/// pathological names fail to compile.
fn definition_pattern(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(^alias {name}=)|(^function {name}\(?\)? ?\{{?$)|(^{name}\(\)$)"
    ))
}

fn bash_output(script: &str) -> Option<String> {
    match Command::new("bash").arg("-c").arg(script).output() {
        Ok(out) if out.status.success() => {
            Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
        }
        Ok(out) => {
            debug!(script, code = ?out.status.code(), "shell probe returned nonzero");
            None
        }
        Err(err) => {
            debug!(script, %err, "shell probe failed to run");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_alias_file(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let file = dir.path().join("aliases");
        std::fs::write(&file, content).unwrap();
        (dir, file)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pattern_matches_the_three_forms() {
        let pattern = definition_pattern("ll").unwrap();
        assert!(pattern.is_match("alias ll='ls -la'"));
        assert!(pattern.is_match("function ll() {"));
        assert!(pattern.is_match("function ll {"));
        assert!(pattern.is_match("ll()"));
        assert!(!pattern.is_match("xll()"));
        assert!(!pattern.is_match("# alias ll='ls -la'"));
    }

    #[test]
    fn pattern_rejects_unbalanced_names() {
        assert!(definition_pattern("fo(o").is_err());
    }

    #[test]
    fn alias_match_carries_line_and_text() {
        let (_dir, file) = write_alias_file("# comment\nalias ll='ls -la'\n");
        let mut probe = ShellProbe::with_alias_file(Some(file.clone()), true);
        let (matches, errors) =
            probe.scan_definitions(&names(&["ll"]), &SearchPath::from_value(""));

        assert!(errors.is_empty());
        let def = &matches["ll"];
        assert_eq!(def.kind, DefinitionKind::Alias);
        assert_eq!(def.line, 2);
        assert_eq!(def.text, "alias ll='ls -la'");
        assert_eq!(def.file, file);
    }

    #[test]
    fn first_matching_line_wins() {
        let (_dir, file) = write_alias_file("alias ll='first'\nalias ll='second'\n");
        let mut probe = ShellProbe::with_alias_file(Some(file), true);
        let (matches, _) = probe.scan_definitions(&names(&["ll"]), &SearchPath::from_value(""));
        assert_eq!(matches["ll"].line, 1);
        assert_eq!(matches["ll"].text, "alias ll='first'");
    }

    #[test]
    fn overlapping_patterns_claim_in_request_order() {
        // "l+" and "ll" both match this line; the name requested first
        // claims it, every run.
        let (_dir, file) = write_alias_file("alias ll='ls -la'\n");
        let mut probe = ShellProbe::with_alias_file(Some(file), true);
        let (matches, _) =
            probe.scan_definitions(&names(&["l+", "ll"]), &SearchPath::from_value(""));
        assert_eq!(matches["l+"].line, 1);
        assert!(!matches.contains_key("ll"));
    }

    #[test]
    fn function_match_without_helper_keeps_the_line() {
        let (_dir, file) = write_alias_file("function greet() {\n    echo hi\n}\n");
        // Empty search path: the definition helper cannot be found.
        let mut probe = ShellProbe::with_alias_file(Some(file), true);
        let (matches, _) = probe.scan_definitions(&names(&["greet"]), &SearchPath::from_value(""));
        let def = &matches["greet"];
        assert_eq!(def.kind, DefinitionKind::Function);
        assert_eq!(def.text, "function greet() {");
    }

    #[test]
    fn bare_function_form_matches() {
        let (_dir, file) = write_alias_file("greet()\n{\n    echo hi\n}\n");
        let mut probe = ShellProbe::with_alias_file(Some(file), true);
        let (matches, _) = probe.scan_definitions(&names(&["greet"]), &SearchPath::from_value(""));
        assert_eq!(matches["greet"].kind, DefinitionKind::Function);
    }

    #[test]
    fn non_matching_shell_scans_nothing() {
        let (_dir, file) = write_alias_file("alias ll='ls -la'\n");
        let mut probe = ShellProbe::with_alias_file(Some(file), false);
        let (matches, errors) =
            probe.scan_definitions(&names(&["ll"]), &SearchPath::from_value(""));
        assert!(matches.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn missing_alias_file_scans_nothing() {
        let mut probe = ShellProbe::with_alias_file(None, true);
        let (matches, errors) =
            probe.scan_definitions(&names(&["ll"]), &SearchPath::from_value(""));
        assert!(matches.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn invalid_name_reports_but_does_not_abort() {
        let (_dir, file) = write_alias_file("alias ll='ls -la'\n");
        let mut probe = ShellProbe::with_alias_file(Some(file), true);
        let (matches, errors) =
            probe.scan_definitions(&names(&["fo(o", "ll"]), &SearchPath::from_value(""));
        assert_eq!(errors.len(), 1);
        assert!(matches.contains_key("ll"));
        assert!(!matches.contains_key("fo(o"));
    }

    #[test]
    fn description_classification() {
        let info = BuiltinInfo::from_description("cd", "cd is a shell builtin".into(), None);
        assert_eq!(info.kind, BuiltinKind::Builtin);
        assert!(!info.is_file_alias());

        let info = BuiltinInfo::from_description("if", "if is a shell keyword".into(), None);
        assert_eq!(info.kind, BuiltinKind::Keyword);

        let info = BuiltinInfo::from_description("ls", "ls is /usr/bin/ls".into(), None);
        assert_eq!(info.kind, BuiltinKind::File(PathBuf::from("/usr/bin/ls")));
        assert!(info.is_file_alias());
    }

    #[test]
    fn locate_command_is_memoized() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("tool");
        std::fs::write(&exe, "x").unwrap();
        let search = SearchPath::from_value(dir.path());

        let mut probe = ShellProbe::with_alias_file(None, false);
        assert_eq!(probe.locate_command("tool", &search), Some(exe.clone()));

        // A removed file still resolves from the cache within a run.
        std::fs::remove_file(&exe).unwrap();
        assert_eq!(probe.locate_command("tool", &search), Some(exe));
    }

    #[test]
    fn builtin_probe_absorbs_failures() {
        let probe = ShellProbe::with_alias_file(None, false);
        // A name no shell classifies; either bash is absent (None) or
        // `type` exits nonzero (None). Never a panic or error.
        assert!(probe.builtin_info("definitely-not-a-builtin-xyz").is_none());
    }
}
