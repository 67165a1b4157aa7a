use std::io::Read;

use quarry_types::ObjectId;

use crate::error::StoreResult;
use crate::object::{Object, ObjectKind};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. Content-addressing guarantees this:
///   the same frame always produces the same id.
/// - Writing the same object twice is a no-op (idempotent).
/// - Concurrent reads are always safe (objects are immutable).
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed id.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound) if
    /// the object does not exist, and with a corruption error if the stored
    /// bytes violate the frame or codec format.
    fn read(&self, id: &ObjectId) -> StoreResult<Object>;

    /// Write an object and return its content-addressed id.
    fn write(&self, object: &Object) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;
}

/// Ingest arbitrary external bytes as a typed object.
///
/// Reads the source to the end, builds an object of `kind`, and either
/// writes it to `store` or, when no store is given, just computes and
/// returns the id (dry-run hashing with no filesystem effect).
pub fn hash_source<R: Read>(
    mut source: R,
    kind: ObjectKind,
    store: Option<&dyn ObjectStore>,
) -> StoreResult<ObjectId> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;
    let object = Object::deserialize(kind, &data)?;
    match store {
        Some(store) => store.write(&object),
        None => Ok(object.id()),
    }
}
