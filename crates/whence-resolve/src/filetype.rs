//! Content-type classification of terminal targets, like `file(1)`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

/// Sentinel returned when no type could be determined.
pub const UNKNOWN: &str = "<unknown>";

/// Classification given to directories in human-readable form.
pub const DIRECTORY: &str = "directory";

const SNIFF_LEN: usize = 8192;

/// Classify the file at `path` by content.
///
/// `broken_hint` marks a path already known to be the target of a
/// dangling symlink; read failures then produce the broken-link
/// sentinel instead of the generic one. All I/O failures degrade to a
/// sentinel string, this never errors.
pub fn classify(path: &Path, use_mime: bool, broken_hint: bool) -> String {
    // Sniffing a directory's content is not meaningful.
    if path.is_dir() {
        return if use_mime { "inode/directory" } else { DIRECTORY }.to_string();
    }

    let mut buf = vec![0u8; SNIFF_LEN];
    let len = match File::open(path).and_then(|mut f| f.read(&mut buf)) {
        Ok(n) => n,
        Err(err) => {
            debug!(path = %path.display(), %err, "cannot read for sniffing");
            if broken_hint {
                return format!("<broken link to: {}>", path.display());
            }
            return UNKNOWN.to_string();
        }
    };
    buf.truncate(len);

    match infer::get(&buf) {
        Some(kind) if use_mime => kind.mime_type().to_string(),
        Some(kind) => describe(kind),
        None => fallback(&buf, use_mime),
    }
}

/// Human-readable names for common magic-byte matches; anything else
/// falls back to the mime string.
fn describe(kind: infer::Type) -> String {
    match kind.mime_type() {
        "application/x-executable" => "ELF executable".to_string(),
        "application/vnd.microsoft.portable-executable" => "PE executable".to_string(),
        "application/x-mach-binary" => "Mach-O executable".to_string(),
        "application/wasm" => "WebAssembly binary".to_string(),
        "application/pdf" => "PDF document".to_string(),
        "application/zip" => "Zip archive data".to_string(),
        "application/gzip" => "gzip compressed data".to_string(),
        "application/x-bzip2" => "bzip2 compressed data".to_string(),
        "application/x-xz" => "XZ compressed data".to_string(),
        "application/zstd" => "Zstandard compressed data".to_string(),
        "application/x-tar" => "POSIX tar archive".to_string(),
        "image/png" => "PNG image data".to_string(),
        "image/jpeg" => "JPEG image data".to_string(),
        "image/gif" => "GIF image data".to_string(),
        other => format!("{} data", other),
    }
}

/// No magic-byte match: distinguish empty files, scripts, and plain
/// text from opaque binary data.
fn fallback(buf: &[u8], use_mime: bool) -> String {
    if buf.is_empty() {
        return if use_mime { "inode/x-empty" } else { "empty" }.to_string();
    }

    if !text_like(buf) {
        return if use_mime { "application/octet-stream" } else { "data" }.to_string();
    }

    if let Some(interp) = shebang(buf) {
        return if use_mime {
            format!("text/x-script.{interp}")
        } else {
            format!("{interp} script text")
        };
    }

    if use_mime {
        "text/plain".to_string()
    } else if buf.is_ascii() {
        "ASCII text".to_string()
    } else {
        "UTF-8 Unicode text".to_string()
    }
}

fn text_like(buf: &[u8]) -> bool {
    match std::str::from_utf8(buf) {
        Ok(_) => true,
        // error_len() of None means the sniff window cut a multi-byte
        // sequence short, which is still text.
        Err(err) => err.error_len().is_none(),
    }
}

/// Interpreter name from a `#!` first line, if any.
fn shebang(buf: &[u8]) -> Option<String> {
    let rest = buf.strip_prefix(b"#!")?;
    let line = rest.split(|&b| b == b'\n').next()?;
    let line = String::from_utf8_lossy(line);
    let mut words = line.trim().split_whitespace();
    let first = words.next()?;
    let interp = Path::new(first).file_name()?.to_string_lossy().into_owned();
    if interp == "env" {
        return words.next().map(str::to_string);
    }
    Some(interp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn directory_short_circuits() {
        let dir = tempdir().unwrap();
        assert_eq!(classify(dir.path(), false, false), "directory");
        assert_eq!(classify(dir.path(), true, false), "inode/directory");
    }

    #[test]
    fn missing_path_is_unknown() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("gone");
        assert_eq!(classify(&gone, false, false), UNKNOWN);
    }

    #[test]
    fn broken_hint_embeds_the_path() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("gone");
        assert_eq!(
            classify(&gone, false, true),
            format!("<broken link to: {}>", gone.display())
        );
    }

    #[test]
    fn empty_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("empty");
        std::fs::write(&file, "").unwrap();
        assert_eq!(classify(&file, false, false), "empty");
        assert_eq!(classify(&file, true, false), "inode/x-empty");
    }

    #[test]
    fn plain_text() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello there\n").unwrap();
        assert_eq!(classify(&file, false, false), "ASCII text");
        assert_eq!(classify(&file, true, false), "text/plain");
    }

    #[test]
    fn shebang_script() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("script");
        std::fs::write(&file, "#!/bin/sh\necho hi\n").unwrap();
        assert_eq!(classify(&file, false, false), "sh script text");
    }

    #[test]
    fn env_shebang_names_the_interpreter() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("script");
        std::fs::write(&file, "#!/usr/bin/env python3\nprint()\n").unwrap();
        assert_eq!(classify(&file, false, false), "python3 script text");
    }

    #[test]
    fn png_magic_bytes() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("image");
        std::fs::write(&file, b"\x89PNG\r\n\x1a\n0000").unwrap();
        assert_eq!(classify(&file, true, false), "image/png");
        assert_eq!(classify(&file, false, false), "PNG image data");
    }

    #[test]
    fn elf_magic_bytes() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("binary");
        let mut content = vec![0x7f, b'E', b'L', b'F', 0x02, 0x01, 0x01, 0x00];
        content.resize(64, 0);
        std::fs::write(&file, &content).unwrap();
        assert_eq!(classify(&file, false, false), "ELF executable");
    }

    #[test]
    fn binary_garbage_is_data() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("blob");
        std::fs::write(&file, [0xffu8, 0xfe, 0x00, 0x01, 0x02]).unwrap();
        assert_eq!(classify(&file, false, false), "data");
    }

    #[test]
    fn classification_is_idempotent() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("stable");
        std::fs::write(&file, "same content\n").unwrap();
        let first = classify(&file, false, false);
        let second = classify(&file, false, false);
        assert_eq!(first, second);
    }
}
