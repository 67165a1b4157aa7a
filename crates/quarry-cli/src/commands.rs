use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use quarry_repo::Repository;
use quarry_store::{
    hash_source, EntryKind, LooseObjectStore, Object, ObjectKind, ObjectStore,
};
use quarry_types::ObjectId;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::CatFile(args) => cmd_cat_file(args),
        Command::HashObject(args) => cmd_hash_object(args),
        Command::Log(args) => cmd_log(args),
        Command::LsTree(args) => cmd_ls_tree(args),
    }
}

/// Locate the enclosing repository and open its loose-object store.
fn open_store() -> anyhow::Result<(Repository, LooseObjectStore)> {
    let repo = Repository::find(Path::new("."))?;
    let store = LooseObjectStore::new(repo.git_path("objects"));
    Ok((repo, store))
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    let repo = Repository::create(&path)?;
    println!(
        "{} Initialized empty quarry repository in {}",
        "✓".green().bold(),
        repo.git_dir().display().to_string().bold()
    );
    Ok(())
}

fn cmd_cat_file(args: CatFileArgs) -> anyhow::Result<()> {
    let (_repo, store) = open_store()?;
    let id = ObjectId::from_hex(&args.object)?;
    cat_file(&store, &id, args.r#type.into(), &mut io::stdout().lock())
}

fn cmd_hash_object(args: HashObjectArgs) -> anyhow::Result<()> {
    let file = fs::File::open(&args.path)
        .with_context(|| format!("cannot open {}", args.path.display()))?;
    let id = if args.write {
        let (_repo, store) = open_store()?;
        hash_source(file, args.r#type.into(), Some(&store))?
    } else {
        hash_source(file, args.r#type.into(), None)?
    };
    println!("{id}");
    Ok(())
}

fn cmd_log(args: LogArgs) -> anyhow::Result<()> {
    let (_repo, store) = open_store()?;
    let id = ObjectId::from_hex(&args.commit)?;
    log_graphviz(&store, id, &mut io::stdout().lock())
}

fn cmd_ls_tree(args: LsTreeArgs) -> anyhow::Result<()> {
    let (_repo, store) = open_store()?;
    let id = ObjectId::from_hex(&args.tree)?;
    ls_tree(&store, &id, args.recursive, Path::new(""), &mut io::stdout().lock())
}

/// Write an object's payload, verifying it has the expected type first.
fn cat_file(
    store: &dyn ObjectStore,
    id: &ObjectId,
    kind: ObjectKind,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let object = store.read(id)?;
    if object.kind() != kind {
        bail!("object {id} is a {}, not a {kind}", object.kind());
    }
    out.write_all(&object.serialize())?;
    Ok(())
}

/// Render the ancestry reachable from `start` as a graphviz digraph:
/// one node per commit, one edge per parent link. The visited set guards
/// against cycles, and the walk is an explicit stack rather than recursion.
fn log_graphviz(
    store: &dyn ObjectStore,
    start: ObjectId,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    writeln!(out, "digraph quarrylog{{")?;
    writeln!(out, "  node[shape=rect]")?;

    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let object = store.read(&id)?;
        let Object::Commit(commit) = object else {
            bail!("object {id} is a {}, not a commit", object.kind());
        };

        let label = commit.summary().replace('\\', "\\\\").replace('"', "\\\"");
        writeln!(out, "  c_{id} [label=\"{}: {label}\"]", id.short_hex())?;

        for parent in commit.parents()? {
            writeln!(out, "  c_{id} -> c_{parent};")?;
            stack.push(parent);
        }
    }

    writeln!(out, "}}")?;
    Ok(())
}

/// List a tree's entries, one `<mode> <type> <id>\t<path>` line each,
/// descending into subtrees when `recursive` is set.
fn ls_tree(
    store: &dyn ObjectStore,
    id: &ObjectId,
    recursive: bool,
    prefix: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let object = store.read(id)?;
    let Object::Tree(tree) = object else {
        bail!("object {id} is a {}, not a tree", object.kind());
    };

    for entry in &tree.entries {
        let kind = entry.kind()?;
        let path = prefix.join(&entry.name);
        if recursive && kind == EntryKind::Directory {
            ls_tree(store, &entry.id, recursive, &path, out)?;
        } else {
            writeln!(
                out,
                "{} {} {}\t{}",
                entry.display_mode(),
                kind.object_tag(),
                entry.id,
                path.display()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_store::{Blob, Commit, InMemoryObjectStore, Kvlm, Tree, TreeEntry};

    fn commit_object(tree_hex: &str, parents: &[ObjectId], message: &str) -> Object {
        let mut kvlm = Kvlm::new();
        kvlm.append(b"tree", tree_hex.as_bytes().to_vec());
        for parent in parents {
            kvlm.append(b"parent", parent.to_hex().into_bytes());
        }
        kvlm.set_message(format!("{message}\n").into_bytes());
        Object::Commit(Commit::new(kvlm))
    }

    #[test]
    fn cat_file_writes_payload() {
        let store = InMemoryObjectStore::new();
        let id = store
            .write(&Object::Blob(Blob::new(b"hello".to_vec())))
            .unwrap();

        let mut out = Vec::new();
        cat_file(&store, &id, ObjectKind::Blob, &mut out).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn cat_file_rejects_type_mismatch() {
        let store = InMemoryObjectStore::new();
        let id = store
            .write(&Object::Blob(Blob::new(b"hello".to_vec())))
            .unwrap();

        let mut out = Vec::new();
        let err = cat_file(&store, &id, ObjectKind::Tree, &mut out).unwrap_err();
        assert!(err.to_string().contains("not a tree"));
        assert!(out.is_empty());
    }

    #[test]
    fn log_renders_digraph_with_edges() {
        let store = InMemoryObjectStore::new();
        let tree_hex = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
        let root = store.write(&commit_object(tree_hex, &[], "initial")).unwrap();
        let tip_object = commit_object(tree_hex, &[root], "second change");
        let tip = store.write(&tip_object).unwrap();

        let mut out = Vec::new();
        log_graphviz(&store, tip, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("digraph quarrylog{\n  node[shape=rect]\n"));
        assert!(text.ends_with("}\n"));
        assert!(text.contains(&format!("c_{tip} [label=\"{}: second change\"]", tip.short_hex())));
        assert!(text.contains(&format!("c_{root} [label=\"{}: initial\"]", root.short_hex())));
        assert!(text.contains(&format!("c_{tip} -> c_{root};")));
    }

    #[test]
    fn log_escapes_label_characters() {
        let store = InMemoryObjectStore::new();
        let tree_hex = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
        let id = store
            .write(&commit_object(tree_hex, &[], r#"say "hi" \ bye"#))
            .unwrap();

        let mut out = Vec::new();
        log_graphviz(&store, id, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#"say \"hi\" \\ bye"#));
    }

    #[test]
    fn log_handles_merge_cycles_once() {
        let store = InMemoryObjectStore::new();
        let tree_hex = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
        let base = store.write(&commit_object(tree_hex, &[], "base")).unwrap();
        let left = store.write(&commit_object(tree_hex, &[base], "left")).unwrap();
        let right = store.write(&commit_object(tree_hex, &[base], "right")).unwrap();
        let merge = store
            .write(&commit_object(tree_hex, &[left, right], "merge"))
            .unwrap();

        let mut out = Vec::new();
        log_graphviz(&store, merge, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        // The shared base appears exactly once as a node.
        let base_node = format!("c_{base} [label=");
        assert_eq!(text.matches(&base_node).count(), 1);
    }

    #[test]
    fn log_rejects_non_commit() {
        let store = InMemoryObjectStore::new();
        let id = store
            .write(&Object::Blob(Blob::new(b"not a commit".to_vec())))
            .unwrap();
        let mut out = Vec::new();
        assert!(log_graphviz(&store, id, &mut out).is_err());
    }

    #[test]
    fn ls_tree_formats_entries() {
        let store = InMemoryObjectStore::new();
        let blob_id = store
            .write(&Object::Blob(Blob::new(b"contents".to_vec())))
            .unwrap();
        let tree_id = store
            .write(&Object::Tree(Tree::new(vec![TreeEntry::new(
                "100644", "file.txt", blob_id,
            )
            .unwrap()])))
            .unwrap();

        let mut out = Vec::new();
        ls_tree(&store, &tree_id, false, Path::new(""), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("100644 blob {blob_id}\tfile.txt\n")
        );
    }

    #[test]
    fn ls_tree_recurses_with_path_prefix() {
        let store = InMemoryObjectStore::new();
        let blob_id = store
            .write(&Object::Blob(Blob::new(b"deep".to_vec())))
            .unwrap();
        let inner = store
            .write(&Object::Tree(Tree::new(vec![TreeEntry::new(
                "100644", "leaf.txt", blob_id,
            )
            .unwrap()])))
            .unwrap();
        let outer = store
            .write(&Object::Tree(Tree::new(vec![TreeEntry::new(
                "40000", "nested", inner,
            )
            .unwrap()])))
            .unwrap();

        let mut flat = Vec::new();
        ls_tree(&store, &outer, false, Path::new(""), &mut flat).unwrap();
        assert_eq!(
            String::from_utf8(flat).unwrap(),
            format!("040000 tree {inner}\tnested\n")
        );

        let mut deep = Vec::new();
        ls_tree(&store, &outer, true, Path::new(""), &mut deep).unwrap();
        assert_eq!(
            String::from_utf8(deep).unwrap(),
            format!("100644 blob {blob_id}\tnested/leaf.txt\n")
        );
    }

    // -----------------------------------------------------------------------
    // End-to-end against a real repository layout
    // -----------------------------------------------------------------------

    #[test]
    fn init_hash_and_cat_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::create(dir.path()).unwrap();
        let store = LooseObjectStore::new(repo.git_path("objects"));

        let id = hash_source(&b"hello"[..], ObjectKind::Blob, Some(&store)).unwrap();
        assert_eq!(id.to_hex().len(), 40);

        let hex = id.to_hex();
        let object_file = repo
            .git_path("objects")
            .join(&hex[..2])
            .join(&hex[2..]);
        assert!(object_file.is_file());
        assert!(fs::metadata(&object_file).unwrap().len() > 0);

        let mut out = Vec::new();
        cat_file(&store, &id, ObjectKind::Blob, &mut out).unwrap();
        assert_eq!(out, b"hello");
    }
}
