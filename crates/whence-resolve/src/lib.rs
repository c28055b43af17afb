//! Command and path name resolution.
//!
//! Resolves a textual name the way an interactive shell would invoke
//! it: as an alias, a shell function, a shell builtin, or a file path
//! reached by following zero or more symbolic links, classified by
//! content type.
//!
//! The pieces compose one-directionally: [`SearchPath`] locates a
//! candidate file, [`links::follow_links`] walks its symlink chain,
//! [`filetype::classify`] names the terminal target's content, and
//! [`ShellProbe`] independently checks the shell's own namespace.
//! [`Resolver`] merges all of it per name and applies precedence.

mod error;
pub mod filetype;
pub mod links;
pub mod resolve;
pub mod search;
pub mod shell;

pub use error::{Error, Result};
pub use links::{LinkChain, normalize};
pub use resolve::{
    Candidate, NameResolution, Resolution, ResolveOptions, ResolvedFile, Resolver,
};
pub use search::{SearchPath, entry_broken, entry_exists};
pub use shell::{BuiltinInfo, BuiltinKind, Definition, DefinitionKind, ShellProbe};
