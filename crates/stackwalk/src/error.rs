use thiserror::Error;

use crate::graph::PackageId;

/// Errors surfaced by graph construction, walking and stream decoding.
#[derive(Error, Debug)]
pub enum WalkError {
    /// There is nothing to enumerate without at least one root.
    #[error("no direct dependencies were provided")]
    NoDirectDependencies,

    /// The package universe does not fit the fixed-width stream encoding.
    #[error("{count} packages exceed the {max} addressable by the stream encoding")]
    CapacityOverflow { count: usize, max: usize },

    /// An input referenced a package id outside `[0, count)`.
    #[error("package id {id} is out of range for {count} packages")]
    PackageOutOfRange { id: PackageId, count: usize },

    /// Writing to the sink failed; the run is terminated without retry.
    #[error("failed to write to the stack stream: {0}")]
    Io(#[from] std::io::Error),

    /// The reader hit end of file before the stop marker, meaning the
    /// producer died mid-stream.
    #[error("stack stream ended before the stop marker")]
    PrematureStreamEnd,
}

pub type Result<T> = std::result::Result<T, WalkError>;
