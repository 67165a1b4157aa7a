use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quarry_store::ObjectKind;

#[derive(Parser)]
#[command(
    name = "quarry",
    about = "Quarry — a content-addressed object database in the git tradition",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new, empty repository
    Init(InitArgs),
    /// Print the raw contents of an object
    CatFile(CatFileArgs),
    /// Compute an object id, optionally storing the object
    HashObject(HashObjectArgs),
    /// Render commit ancestry as a graphviz digraph
    Log(LogArgs),
    /// List the entries of a tree object
    LsTree(LsTreeArgs),
}

/// Object type tags accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl From<ObjectType> for ObjectKind {
    fn from(value: ObjectType) -> Self {
        match value {
            ObjectType::Blob => ObjectKind::Blob,
            ObjectType::Tree => ObjectKind::Tree,
            ObjectType::Commit => ObjectKind::Commit,
            ObjectType::Tag => ObjectKind::Tag,
        }
    }
}

#[derive(Args)]
pub struct InitArgs {
    /// Where to create the repository
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CatFileArgs {
    /// Expected object type
    #[arg(value_enum)]
    pub r#type: ObjectType,
    /// The 40-hex object id
    pub object: String,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Object type to hash as
    #[arg(short = 't', long = "type", value_enum, default_value = "blob")]
    pub r#type: ObjectType,
    /// Store the object in the repository, not just hash it
    #[arg(short, long)]
    pub write: bool,
    /// File to read
    pub path: PathBuf,
}

#[derive(Args)]
pub struct LogArgs {
    /// Commit id to start the walk at
    pub commit: String,
}

#[derive(Args)]
pub struct LsTreeArgs {
    /// Recurse into subtrees
    #[arg(short)]
    pub recursive: bool,
    /// Tree id to list
    pub tree: String,
}
