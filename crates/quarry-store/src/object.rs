use quarry_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::kvlm::{Commit, Tag};
use crate::tree::Tree;

/// The kind of object stored. The `Display` form is the wire type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Commit: KVLM headers plus a message.
    Commit,
    /// Annotated tag: same KVLM encoding as commits.
    Tag,
}

impl ObjectKind {
    /// The ASCII type tag used in the frame.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }

    /// Parse a wire type tag.
    pub fn from_tag(tag: &[u8]) -> StoreResult<Self> {
        match tag {
            b"blob" => Ok(Self::Blob),
            b"tree" => Ok(Self::Tree),
            b"commit" => Ok(Self::Commit),
            b"tag" => Ok(Self::Tag),
            other => Err(StoreError::UnknownType(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Raw content object (analogous to a file's bytes).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// A typed object: the unit of storage.
///
/// The enum is closed on purpose. Adding a kind forces every dispatch site
/// (frame encode, frame decode, CLI listings) to be updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// The kind of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Canonical payload encoding, independent of storage framing.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Self::Blob(blob) => blob.data.clone(),
            Self::Tree(tree) => tree.serialize(),
            Self::Commit(commit) => commit.serialize(),
            Self::Tag(tag) => tag.serialize(),
        }
    }

    /// Decode a payload under the given kind.
    pub fn deserialize(kind: ObjectKind, data: &[u8]) -> StoreResult<Self> {
        Ok(match kind {
            ObjectKind::Blob => Self::Blob(Blob::new(data.to_vec())),
            ObjectKind::Tree => Self::Tree(Tree::deserialize(data)?),
            ObjectKind::Commit => Self::Commit(Commit::deserialize(data)?),
            ObjectKind::Tag => Self::Tag(Tag::deserialize(data)?),
        })
    }

    /// The framed encoding: `<tag> <decimal length>\0<payload>`.
    ///
    /// The frame is what gets hashed and compressed, so the id covers the
    /// type tag and length, not just the payload bytes.
    pub fn frame(&self) -> Vec<u8> {
        let payload = self.serialize();
        let mut out = Vec::with_capacity(payload.len() + 16);
        out.extend_from_slice(self.kind().tag().as_bytes());
        out.push(b' ');
        out.extend_from_slice(payload.len().to_string().as_bytes());
        out.push(0);
        out.extend_from_slice(&payload);
        out
    }

    /// Content-addressed id: SHA-1 over the frame.
    pub fn id(&self) -> ObjectId {
        ObjectId::from_bytes(&self.frame())
    }
}

/// Split a decompressed frame into its kind and payload.
///
/// The declared ASCII-decimal length must equal the payload size exactly.
pub fn parse_frame(data: &[u8]) -> StoreResult<(ObjectKind, &[u8])> {
    let space = data
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| StoreError::CorruptObject("missing type tag terminator".into()))?;
    let kind = ObjectKind::from_tag(&data[..space])?;
    let nul = data[space..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| space + i)
        .ok_or_else(|| StoreError::CorruptObject("missing length terminator".into()))?;
    let len_str = std::str::from_utf8(&data[space + 1..nul])
        .map_err(|_| StoreError::CorruptObject("length is not ascii".into()))?;
    let declared: usize = len_str
        .parse()
        .map_err(|_| StoreError::CorruptObject(format!("bad length {len_str:?}")))?;
    let payload = &data[nul + 1..];
    if declared != payload.len() {
        return Err(StoreError::CorruptObject(format!(
            "bad length: declared {declared}, payload is {} bytes",
            payload.len()
        )));
    }
    Ok((kind, payload))
}
