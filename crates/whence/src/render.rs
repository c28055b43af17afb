//! Plain-text rendering, one formatter per candidate kind.

use std::path::Path;

use whence_resolve::{
    BuiltinInfo, Candidate, Definition, ResolvedFile, entry_broken, entry_exists, normalize,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Mode {
    pub dir_only: bool,
    pub short: bool,
}

pub fn candidate(candidate: &Candidate, mode: Mode) -> String {
    match candidate {
        Candidate::Alias(def) | Candidate::Function(def) => definition(def, mode),
        Candidate::Builtin(info) => builtin(info, mode),
        Candidate::File(file) => file_entry(file, mode),
    }
}

fn definition(def: &Definition, mode: Mode) -> String {
    if mode.dir_only {
        return def
            .file
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
    }
    if mode.short {
        return def.file.display().to_string();
    }

    // Helper output spans lines; a single matched line stays inline.
    let info = if def.text.contains('\n') {
        format!("line {}:\n{}", def.line, def.text)
    } else {
        format!("line {}: {}", def.line, def.text)
    };
    format!(
        "{}:\n    -> {}\n        -> {}",
        def.file.display(),
        def.name,
        info.replace('\n', "\n           "),
    )
}

fn builtin(info: &BuiltinInfo, mode: Mode) -> String {
    if mode.short {
        return info.description.clone();
    }
    if mode.dir_only {
        // A builtin has no parent directory; suppressed upstream.
        return String::new();
    }

    let mut out = format!(
        "{}:\n    -> {}",
        info.name,
        info.description.replace("shell", "BASH"),
    );
    if let Some(help) = &info.help {
        out.push_str("\n        Desc.: ");
        out.push_str(help);
    }
    out
}

fn file_entry(file: &ResolvedFile, mode: Mode) -> String {
    if !file.exists {
        return String::new();
    }
    if !file.resolved {
        return file.path.display().to_string();
    }
    if mode.dir_only {
        return target_dir(file);
    }
    if mode.short {
        return short_target(file);
    }

    let mut lines = vec![format!("{}:", file.path.display())];
    let mut indent = 4;
    for hop in &file.hops {
        let status = hop_status(file, hop);
        lines.push(format!(
            "{}-> {}{}",
            " ".repeat(indent),
            hop.display(),
            status,
        ));
        indent += 4;
    }

    indent += 7;
    lines.push(format!(
        "{:>indent$} {}",
        "Type:",
        file.filetype,
        indent = indent,
    ));
    lines.join("\n")
}

fn hop_status(file: &ResolvedFile, hop: &Path) -> &'static str {
    if let Some(entry) = &file.cycle_entry {
        if hop == entry {
            return " (circular)";
        }
        return "";
    }
    if entry_broken(hop) {
        " (broken)"
    } else if !entry_exists(hop) {
        " (missing)"
    } else {
        ""
    }
}

fn short_target(file: &ResolvedFile) -> String {
    if file.broken {
        let marker = if file.is_circular() { "circular" } else { "dead" };
        format!("{}:{}", marker, file.target.display())
    } else {
        file.target.display().to_string()
    }
}

fn target_dir(file: &ResolvedFile) -> String {
    match file.target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.display().to_string(),
        _ => normalize(Path::new("")).display().to_string(),
    }
}
