//! Current-directory precedence needs a controlled working directory,
//! so this test lives in its own binary and is the only one that calls
//! `set_current_dir`.

use std::path::Path;

use tempfile::tempdir;
use whence_resolve::SearchPath;

#[test]
fn cwd_wins_unless_ignored() {
    let cwd = tempdir().unwrap();
    let elsewhere = tempdir().unwrap();
    std::fs::write(cwd.path().join("foo"), "local\n").unwrap();
    std::fs::write(elsewhere.path().join("foo"), "on path\n").unwrap();

    std::env::set_current_dir(cwd.path()).unwrap();
    let search = SearchPath::from_value(elsewhere.path());

    let found = search.locate(Path::new("foo"), false).unwrap();
    assert_eq!(found, Path::new("foo"));

    let found = search.locate(Path::new("foo"), true).unwrap();
    assert_eq!(found, elsewhere.path().join("foo"));
}
