use quarry_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// Key-value list with message: the ordered header multimap plus unkeyed
/// trailing message that commits and tags are encoded as.
///
/// Distinct keys keep their insertion order on round-trip, and a repeated
/// key keeps the relative order of its values. The message lives in its own
/// field, so an (unlikely) empty header key can never collide with it.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Kvlm {
    headers: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
    message: Vec<u8>,
}

impl Kvlm {
    /// Create an empty KVLM.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under a key, preserving insertion order.
    pub fn append(&mut self, key: &[u8], value: Vec<u8>) {
        if let Some((_, values)) = self.headers.iter_mut().find(|(k, _)| k == key) {
            values.push(value);
        } else {
            self.headers.push((key.to_vec(), vec![value]));
        }
    }

    /// First value stored under a key, if any.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.first())
            .map(Vec::as_slice)
    }

    /// All values stored under a key, in insertion order.
    pub fn all(&self, key: &[u8]) -> Vec<&[u8]> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.iter().map(Vec::as_slice).collect())
            .unwrap_or_default()
    }

    /// Iterate headers in insertion order.
    pub fn headers(&self) -> impl Iterator<Item = (&[u8], &[Vec<u8>])> {
        self.headers
            .iter()
            .map(|(k, values)| (k.as_slice(), values.as_slice()))
    }

    /// The unkeyed trailing message.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Replace the trailing message.
    pub fn set_message(&mut self, message: Vec<u8>) {
        self.message = message;
    }

    /// Encode as header lines, one blank line, then the message.
    ///
    /// A newline inside a value is escaped by inserting a space after it
    /// (the continuation-line convention), so an encoded value never
    /// contains a bare newline. The message is emitted verbatim.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, values) in &self.headers {
            for value in values {
                out.extend_from_slice(key);
                out.push(b' ');
                for &b in value {
                    out.push(b);
                    if b == b'\n' {
                        out.push(b' ');
                    }
                }
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    /// Decode header lines and the trailing message. Iterative by design:
    /// stack depth does not grow with header count.
    pub fn deserialize(data: &[u8]) -> StoreResult<Self> {
        let mut kvlm = Self::default();
        let mut pos = 0;
        loop {
            let space = find(data, b' ', pos);
            let newline = find(data, b'\n', pos);
            match (space, newline) {
                // A header line: `key value\n`, value possibly continued
                // across newline-space pairs.
                (Some(space), Some(newline)) if newline > space => {
                    let key = &data[pos..space];
                    let mut end = newline;
                    while data.get(end + 1) == Some(&b' ') {
                        end = find(data, b'\n', end + 1).ok_or_else(|| {
                            StoreError::CorruptHeader("unterminated continuation line".into())
                        })?;
                    }
                    // Undo the escaping: drop the space after each newline.
                    let mut value = Vec::with_capacity(end - space);
                    let mut i = space + 1;
                    while i < end {
                        value.push(data[i]);
                        i += if data[i] == b'\n' { 2 } else { 1 };
                    }
                    kvlm.append(key, value);
                    pos = end + 1;
                }
                // The newline comes first: the header block is over and the
                // rest is the message. The newline must be the blank line
                // sitting exactly at the current position.
                (_, Some(newline)) => {
                    if newline != pos {
                        return Err(StoreError::CorruptHeader(
                            "headers must end with a blank line".into(),
                        ));
                    }
                    kvlm.message = data[pos + 1..].to_vec();
                    return Ok(kvlm);
                }
                _ => {
                    return Err(StoreError::CorruptHeader(
                        "missing blank-line message separator".into(),
                    ))
                }
            }
        }
    }
}

fn find(data: &[u8], needle: u8, from: usize) -> Option<usize> {
    data.get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

fn parse_id(value: &[u8]) -> StoreResult<ObjectId> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| StoreError::CorruptHeader("id header is not ascii".into()))?;
    Ok(ObjectId::from_hex(hex.trim())?)
}

/// A commit object: KVLM headers (`tree`, `parent`, `author`, `committer`,
/// optionally `gpgsig`) plus the commit message.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Commit {
    pub kvlm: Kvlm,
}

impl Commit {
    pub fn new(kvlm: Kvlm) -> Self {
        Self { kvlm }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.kvlm.serialize()
    }

    pub fn deserialize(data: &[u8]) -> StoreResult<Self> {
        Ok(Self {
            kvlm: Kvlm::deserialize(data)?,
        })
    }

    /// The root tree this commit snapshots.
    pub fn tree(&self) -> StoreResult<Option<ObjectId>> {
        self.kvlm.get(b"tree").map(parse_id).transpose()
    }

    /// Parent commit ids, in header order. Empty for an initial commit.
    pub fn parents(&self) -> StoreResult<Vec<ObjectId>> {
        self.kvlm.all(b"parent").into_iter().map(parse_id).collect()
    }

    /// The `author` header, verbatim.
    pub fn author(&self) -> Option<&[u8]> {
        self.kvlm.get(b"author")
    }

    /// The commit message.
    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }

    /// First line of the message, trimmed.
    pub fn summary(&self) -> String {
        let message = String::from_utf8_lossy(self.kvlm.message());
        message.trim().lines().next().unwrap_or("").to_string()
    }
}

/// An annotated tag object: same KVLM encoding as a commit, with `object`,
/// `type`, `tag`, and `tagger` headers.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Tag {
    pub kvlm: Kvlm,
}

impl Tag {
    pub fn new(kvlm: Kvlm) -> Self {
        Self { kvlm }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.kvlm.serialize()
    }

    pub fn deserialize(data: &[u8]) -> StoreResult<Self> {
        Ok(Self {
            kvlm: Kvlm::deserialize(data)?,
        })
    }

    /// The id of the tagged object.
    pub fn target(&self) -> StoreResult<Option<ObjectId>> {
        self.kvlm.get(b"object").map(parse_id).transpose()
    }

    /// The tag name from the `tag` header.
    pub fn tag_name(&self) -> Option<&[u8]> {
        self.kvlm.get(b"tag")
    }

    /// The tag message.
    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }
}
