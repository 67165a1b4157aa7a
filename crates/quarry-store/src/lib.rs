//! Content-addressed object storage for Quarry.
//!
//! This crate implements a hash-keyed object store in the git tradition.
//! Every piece of data -- file contents, directory listings, commits, tags --
//! is stored as an immutable object identified by the SHA-1 hash of its
//! framed encoding (`<tag> <len>\0<payload>`).
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`Commit`] -- KVLM headers plus a commit message
//! - [`Tag`] -- annotated tag, same KVLM encoding as commits
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one zlib-compressed file per object under a
//!   two-level fan-out directory (`objects/<2 hex>/<38 hex>`)
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. The digest covers the frame, so identical payloads under different type
//!    tags never collide.
//! 3. An existing object file is never overwritten; the second write of the
//!    same content is a no-op.
//! 4. Corrupt data is propagated as a typed error, never skipped or defaulted.

pub mod error;
pub mod kvlm;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use kvlm::{Commit, Kvlm, Tag};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{parse_frame, Blob, Object, ObjectKind};
pub use traits::{hash_source, ObjectStore};
pub use tree::{EntryKind, Tree, TreeEntry};
