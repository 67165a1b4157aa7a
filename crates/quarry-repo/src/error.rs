use std::path::PathBuf;

/// Errors from repository layout and discovery operations.
///
/// All of these are fatal to the requested operation; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// No control directory was found up to the filesystem root.
    #[error("no repository found (searched upward from {0})")]
    NotARepository(PathBuf),

    /// The target path already sits inside a repository rooted elsewhere.
    #[error("cannot create a repository inside the repository at {0}")]
    AlreadyInitialized(PathBuf),

    /// The target exists and is not an empty directory (or is not a
    /// directory at all).
    #[error("{0} is not an empty directory")]
    NotEmpty(PathBuf),

    /// A path component exists but is a regular file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The configuration file is absent.
    #[error("configuration file missing: {0}")]
    MissingConfig(PathBuf),

    /// The configuration file is present but does not parse.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The declared repository format version is not understood.
    #[error("unsupported repositoryformatversion {0}")]
    UnsupportedFormat(u32),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
