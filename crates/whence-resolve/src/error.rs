use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that cross component boundaries.
///
/// Everything else (missing files, unreadable links, failed shell
/// probes) is absorbed locally into sentinel values so that batch
/// resolution always runs to completion.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot search alias file for {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}
