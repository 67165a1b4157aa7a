use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use quarry_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{parse_frame, Object};
use crate::traits::ObjectStore;

/// Loose-object store: one zlib-compressed frame per file.
///
/// Objects live under a two-level fan-out layout: the first two hex
/// characters of the id name a subdirectory, the remaining 38 name the
/// file. Compression covers the whole frame, so decompression happens
/// before frame parsing on read.
pub struct LooseObjectStore {
    objects_dir: PathBuf,
}

impl LooseObjectStore {
    /// Create a store rooted at an `objects/` directory.
    pub fn new(objects_dir: impl Into<PathBuf>) -> Self {
        Self {
            objects_dir: objects_dir.into(),
        }
    }

    /// The fan-out path for an id.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        let (fanout, rest) = hex.split_at(2);
        self.objects_dir.join(fanout).join(rest)
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Object> {
        let path = self.object_path(id);
        if !path.is_file() {
            return Err(StoreError::NotFound(*id));
        }
        let file = fs::File::open(&path)?;
        let mut frame = Vec::new();
        ZlibDecoder::new(file).read_to_end(&mut frame)?;
        let (kind, payload) = parse_frame(&frame)?;
        debug!(id = %id, kind = %kind, bytes = payload.len(), "object read");
        Object::deserialize(kind, payload)
    }

    fn write(&self, object: &Object) -> StoreResult<ObjectId> {
        let frame = object.frame();
        let id = ObjectId::from_bytes(&frame);
        let path = self.object_path(&id);
        if path.exists() {
            // Content-addressing: an existing file already holds these
            // exact bytes, so the second write is a no-op. Best-effort
            // under the single-writer assumption; no locking.
            return Ok(id);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut encoder = ZlibEncoder::new(fs::File::create(&path)?, Compression::default());
        encoder.write_all(&frame)?;
        encoder.finish()?;
        debug!(id = %id, kind = %object.kind(), bytes = frame.len(), "object written");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}

impl std::fmt::Debug for LooseObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LooseObjectStore")
            .field("objects_dir", &self.objects_dir)
            .finish()
    }
}
