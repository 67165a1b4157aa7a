use quarry_types::{IdError, ObjectId};

/// Errors from object codec and store operations.
///
/// Corruption errors indicate a violated format invariant; there is no
/// recovery path and they must reach the caller unmodified.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The object frame is malformed (bad tag boundary or declared length).
    #[error("corrupt object: {0}")]
    CorruptObject(String),

    /// A tree payload violates the entry binary format.
    #[error("corrupt tree: {0}")]
    CorruptTree(String),

    /// A commit or tag header block violates the KVLM format.
    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    /// The frame carries a type tag this implementation does not know.
    #[error("unknown object type: {0}")]
    UnknownType(String),

    /// An embedded object id failed to parse.
    #[error(transparent)]
    Id(#[from] IdError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
