use quarry_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// Classification of a tree entry, derived from its mode prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Subtree (mode `04xxxx`).
    Directory,
    /// Regular file (mode `10xxxx`).
    Regular,
    /// Symbolic link; blob contents are the link target (mode `12xxxx`).
    Symlink,
    /// Submodule reference, pointing at a commit (mode `16xxxx`).
    Submodule,
}

impl EntryKind {
    /// The type tag of the object the entry points at, as shown by listings.
    pub fn object_tag(&self) -> &'static str {
        match self {
            Self::Directory => "tree",
            Self::Regular | Self::Symlink => "blob",
            Self::Submodule => "commit",
        }
    }
}

/// A single (mode, name, target) entry inside a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    // Normalized to 6 bytes: a 5-byte raw mode gains one leading space.
    mode: String,
    /// Entry name: a single path component, no slashes.
    pub name: String,
    /// Content-addressed id of the referenced object.
    pub id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry. The mode must be 5 or 6 bytes.
    pub fn new(mode: impl Into<String>, name: impl Into<String>, id: ObjectId) -> StoreResult<Self> {
        let raw = mode.into();
        let mode = match raw.len() {
            6 => raw,
            5 => format!(" {raw}"),
            n => {
                return Err(StoreError::CorruptTree(format!(
                    "mode must be 5 or 6 bytes, got {n}"
                )))
            }
        };
        Ok(Self {
            mode,
            name: name.into(),
            id,
        })
    }

    /// The normalized 6-byte mode (space-padded when the raw form is 5 bytes).
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// The mode as read from or written to the wire, without padding.
    fn raw_mode(&self) -> &str {
        self.mode.strip_prefix(' ').unwrap_or(&self.mode)
    }

    /// The mode zero-padded to 6 characters, the form listings print.
    pub fn display_mode(&self) -> String {
        format!("{:0>6}", self.raw_mode())
    }

    /// Classify the entry by its mode prefix.
    pub fn kind(&self) -> StoreResult<EntryKind> {
        let raw = self.raw_mode();
        let prefix = if raw.len() == 5 { &raw[..1] } else { &raw[..2] };
        match prefix {
            "4" | "04" => Ok(EntryKind::Directory),
            "10" => Ok(EntryKind::Regular),
            "12" => Ok(EntryKind::Symlink),
            "16" => Ok(EntryKind::Submodule),
            other => Err(StoreError::CorruptTree(format!(
                "unknown entry mode prefix {other:?}"
            ))),
        }
    }

    // Serialization order key: non-files get a trailing slash so that a
    // directory `a` sorts before a file `ab`, matching the reference
    // ecosystem's expectations.
    fn sort_key(&self) -> String {
        if self.mode.starts_with("10") {
            self.name.clone()
        } else {
            format!("{}/", self.name)
        }
    }
}

/// Directory listing object.
///
/// Semantically a mapping from name to (mode, target), but persisted order
/// is significant: entries are serialized in sort-key order so identical
/// trees always hash to the same id.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode to the binary entry format, sorted by entry sort key.
    ///
    /// Each entry is `<mode> <name>\0<20 raw id bytes>`; the mode is written
    /// in its raw 5-or-6-byte form, never re-padded.
    pub fn serialize(&self) -> Vec<u8> {
        let mut sorted: Vec<&TreeEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.sort_key());
        let mut out = Vec::new();
        for entry in sorted {
            out.extend_from_slice(entry.raw_mode().as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.name.as_bytes());
            out.push(0);
            out.extend_from_slice(entry.id.as_bytes());
        }
        out
    }

    /// Decode the binary entry format.
    pub fn deserialize(data: &[u8]) -> StoreResult<Self> {
        let mut entries = Vec::new();
        let mut pos = 0;
        while pos < data.len() {
            let space = data[pos..]
                .iter()
                .position(|&b| b == b' ')
                .map(|i| pos + i)
                .ok_or_else(|| StoreError::CorruptTree("entry missing mode terminator".into()))?;
            let gap = space - pos;
            if gap != 5 && gap != 6 {
                return Err(StoreError::CorruptTree(format!(
                    "mode is {gap} bytes, expected 5 or 6"
                )));
            }
            let mode = std::str::from_utf8(&data[pos..space])
                .map_err(|_| StoreError::CorruptTree("mode is not ascii".into()))?;
            let nul = data[space..]
                .iter()
                .position(|&b| b == 0)
                .map(|i| space + i)
                .ok_or_else(|| StoreError::CorruptTree("entry missing name terminator".into()))?;
            let name = std::str::from_utf8(&data[space + 1..nul])
                .map_err(|_| StoreError::CorruptTree("entry name is not utf-8".into()))?;
            let id_end = nul + 21;
            if data.len() < id_end {
                return Err(StoreError::CorruptTree("truncated entry id".into()));
            }
            let mut raw = [0u8; 20];
            raw.copy_from_slice(&data[nul + 1..id_end]);
            entries.push(TreeEntry::new(mode, name, ObjectId::from_hash(raw))?);
            pos = id_end;
        }
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mode: &str, name: &str, seed: &[u8]) -> TreeEntry {
        TreeEntry::new(mode, name, ObjectId::from_bytes(seed)).unwrap()
    }

    #[test]
    fn entry_wire_layout() {
        let id = ObjectId::from_bytes(b"target");
        let tree = Tree::new(vec![TreeEntry::new("100644", "hello.txt", id).unwrap()]);
        let mut expected = b"100644 hello.txt\0".to_vec();
        expected.extend_from_slice(id.as_bytes());
        assert_eq!(tree.serialize(), expected);
    }

    #[test]
    fn roundtrip_preserves_entries() {
        let tree = Tree::new(vec![
            entry("100644", "readme.md", b"1"),
            entry("40000", "src", b"2"),
            entry("120000", "link", b"3"),
        ]);
        let decoded = Tree::deserialize(&tree.serialize()).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded.get("src").unwrap().mode(), " 40000");
        assert_eq!(decoded.get("readme.md").unwrap().mode(), "100644");
    }

    #[test]
    fn five_byte_mode_roundtrips_unpadded() {
        let tree = Tree::new(vec![entry("40000", "dir", b"d")]);
        let bytes = tree.serialize();
        assert!(bytes.starts_with(b"40000 dir\0"));
        let decoded = Tree::deserialize(&bytes).unwrap();
        assert_eq!(decoded.serialize(), bytes);
        assert_eq!(decoded, tree);
    }

    #[test]
    fn directory_sorts_before_prefixed_file() {
        // "a" is a directory, so it sorts as "a/", ahead of the file "ab".
        let tree = Tree::new(vec![
            entry("100644", "ab", b"f"),
            entry("40000", "a", b"d"),
        ]);
        let decoded = Tree::deserialize(&tree.serialize()).unwrap();
        assert_eq!(decoded.entries[0].name, "a");
        assert_eq!(decoded.entries[1].name, "ab");
    }

    #[test]
    fn file_sorts_before_same_named_directory() {
        let tree = Tree::new(vec![
            entry("40000", "foo", b"d"),
            entry("100644", "foo", b"f"),
        ]);
        let decoded = Tree::deserialize(&tree.serialize()).unwrap();
        assert_eq!(decoded.entries[0].kind().unwrap(), EntryKind::Regular);
        assert_eq!(decoded.entries[1].kind().unwrap(), EntryKind::Directory);
    }

    #[test]
    fn serialization_is_order_independent() {
        let a = Tree::new(vec![
            entry("100644", "one", b"1"),
            entry("100644", "two", b"2"),
        ]);
        let b = Tree::new(vec![
            entry("100644", "two", b"2"),
            entry("100644", "one", b"1"),
        ]);
        assert_eq!(a.serialize(), b.serialize());
    }

    #[test]
    fn kind_classification() {
        assert_eq!(entry("40000", "d", b"x").kind().unwrap(), EntryKind::Directory);
        assert_eq!(entry("100644", "f", b"x").kind().unwrap(), EntryKind::Regular);
        assert_eq!(entry("100755", "x", b"x").kind().unwrap(), EntryKind::Regular);
        assert_eq!(entry("120000", "l", b"x").kind().unwrap(), EntryKind::Symlink);
        assert_eq!(entry("160000", "s", b"x").kind().unwrap(), EntryKind::Submodule);
    }

    #[test]
    fn unknown_mode_prefix_is_corrupt() {
        let err = entry("999999", "weird", b"x").kind().unwrap_err();
        assert!(matches!(err, StoreError::CorruptTree(_)));
    }

    #[test]
    fn display_mode_zero_pads() {
        assert_eq!(entry("40000", "d", b"x").display_mode(), "040000");
        assert_eq!(entry("100644", "f", b"x").display_mode(), "100644");
    }

    #[test]
    fn entry_kind_object_tags() {
        assert_eq!(EntryKind::Directory.object_tag(), "tree");
        assert_eq!(EntryKind::Regular.object_tag(), "blob");
        assert_eq!(EntryKind::Symlink.object_tag(), "blob");
        assert_eq!(EntryKind::Submodule.object_tag(), "commit");
    }

    #[test]
    fn rejects_bad_mode_length() {
        let err = TreeEntry::new("0644", "f", ObjectId::from_bytes(b"x")).unwrap_err();
        assert!(matches!(err, StoreError::CorruptTree(_)));
    }

    #[test]
    fn deserialize_rejects_bad_mode_gap() {
        let err = Tree::deserialize(b"0644 name\0aaaaaaaaaaaaaaaaaaaa").unwrap_err();
        assert!(matches!(err, StoreError::CorruptTree(_)));
    }

    #[test]
    fn deserialize_rejects_missing_name_terminator() {
        let err = Tree::deserialize(b"100644 name-without-nul").unwrap_err();
        assert!(matches!(err, StoreError::CorruptTree(_)));
    }

    #[test]
    fn deserialize_rejects_truncated_id() {
        let err = Tree::deserialize(b"100644 short\0only-8b").unwrap_err();
        assert!(matches!(err, StoreError::CorruptTree(_)));
    }

    #[test]
    fn empty_tree_serializes_to_nothing() {
        assert!(Tree::default().serialize().is_empty());
        assert!(Tree::deserialize(b"").unwrap().is_empty());
    }
}
