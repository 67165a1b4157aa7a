use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{RepoError, RepoResult};

/// Name of the control directory under the worktree root.
pub const GIT_DIR: &str = ".git";

/// Default branch the fresh `HEAD` points at.
pub const DEFAULT_BRANCH: &str = "master";

const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file to name the repository.\n";

/// A repository: worktree root, control directory, and validated config.
///
/// Constructed by discovery ([`Repository::find`]) or explicit creation
/// ([`Repository::create`]); owns no mutable state beyond the on-disk
/// layout it manages.
#[derive(Clone, Debug)]
pub struct Repository {
    worktree: PathBuf,
    git_dir: PathBuf,
    config: Config,
}

impl Repository {
    /// Open and validate the repository rooted at `path`.
    ///
    /// The control directory must exist, the config file must be present
    /// and parsable, and the declared format version must be 0.
    pub fn open(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let worktree = path.into();
        let git_dir = worktree.join(GIT_DIR);
        if !git_dir.is_dir() {
            return Err(RepoError::NotARepository(worktree));
        }

        let config_path = git_dir.join("config");
        if !config_path.is_file() {
            return Err(RepoError::MissingConfig(config_path));
        }
        let raw = fs::read_to_string(&config_path)?;
        let config: Config =
            toml::from_str(&raw).map_err(|e| RepoError::InvalidConfig(e.to_string()))?;
        let version = config.core.repository_format_version;
        if version != 0 {
            return Err(RepoError::UnsupportedFormat(version));
        }

        Ok(Self {
            worktree,
            git_dir,
            config,
        })
    }

    /// Create a new repository at `path`.
    ///
    /// Fails with [`RepoError::AlreadyInitialized`] if `path` sits inside a
    /// repository rooted elsewhere, and with [`RepoError::NotEmpty`] if the
    /// target exists but is not a directory or its control directory is
    /// already populated. Creates the worktree directory when absent, then
    /// the fixed skeleton: `branches/`, `objects/`, `refs/tags/`,
    /// `refs/heads/`, `description`, `HEAD`, and the default `config`.
    pub fn create(path: impl AsRef<Path>) -> RepoResult<Self> {
        let worktree = real_path(path.as_ref())?;
        if let Some(existing) = Self::discover(&worktree)? {
            if existing.worktree != worktree {
                return Err(RepoError::AlreadyInitialized(existing.worktree));
            }
        }

        let git_dir = worktree.join(GIT_DIR);
        if worktree.exists() {
            if !worktree.is_dir() {
                return Err(RepoError::NotEmpty(worktree));
            }
            if git_dir.exists() && fs::read_dir(&git_dir)?.next().is_some() {
                return Err(RepoError::NotEmpty(worktree));
            }
        } else {
            fs::create_dir_all(&worktree)?;
        }

        fs::create_dir_all(git_dir.join("branches"))?;
        fs::create_dir_all(git_dir.join("objects"))?;
        fs::create_dir_all(git_dir.join("refs").join("tags"))?;
        fs::create_dir_all(git_dir.join("refs").join("heads"))?;

        fs::write(git_dir.join("description"), DEFAULT_DESCRIPTION)?;
        fs::write(
            git_dir.join("HEAD"),
            format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
        )?;
        let rendered = toml::to_string(&Config::default())
            .map_err(|e| RepoError::InvalidConfig(e.to_string()))?;
        fs::write(git_dir.join("config"), rendered)?;

        debug!(worktree = %worktree.display(), "repository created");
        Self::open(worktree)
    }

    /// Walk upward from `path` until a control directory appears.
    ///
    /// Returns `Ok(None)` when the walk reaches the filesystem root without
    /// finding one. Iterative on purpose: depth does not grow the stack.
    pub fn discover(path: impl AsRef<Path>) -> RepoResult<Option<Self>> {
        let mut current = real_path(path.as_ref())?;
        loop {
            if current.join(GIT_DIR).is_dir() {
                debug!(root = %current.display(), "repository discovered");
                return Self::open(current).map(Some);
            }
            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Like [`Repository::discover`], but a missing repository is an error.
    pub fn find(path: impl AsRef<Path>) -> RepoResult<Self> {
        let start = path.as_ref().to_path_buf();
        Self::discover(&start)?.ok_or(RepoError::NotARepository(start))
    }

    /// The worktree root.
    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    /// The control directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The validated configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Join a relative path onto the control directory. Pure; no I/O.
    pub fn git_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.git_dir.join(rel)
    }

    /// Resolve a directory under the control directory, optionally creating
    /// it. Fails with [`RepoError::NotADirectory`] if the path exists but
    /// is a regular file; returns `Ok(None)` when absent and not created.
    pub fn dir(&self, rel: impl AsRef<Path>, create: bool) -> RepoResult<Option<PathBuf>> {
        let path = self.git_path(rel);
        if path.exists() {
            if path.is_dir() {
                return Ok(Some(path));
            }
            return Err(RepoError::NotADirectory(path));
        }
        if create {
            fs::create_dir_all(&path)?;
            return Ok(Some(path));
        }
        Ok(None)
    }

    /// Resolve a file path under the control directory, optionally creating
    /// its parent directory. Returns `Ok(None)` when the parent is absent
    /// and not created.
    pub fn file(&self, rel: impl AsRef<Path>, create_parent: bool) -> RepoResult<Option<PathBuf>> {
        let rel = rel.as_ref();
        match rel.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                Ok(self.dir(parent, create_parent)?.map(|_| self.git_path(rel)))
            }
            _ => Ok(Some(self.git_path(rel))),
        }
    }
}

/// Canonicalize a path that may not exist yet.
///
/// `fs::canonicalize` fails on missing paths, but `create` must accept a
/// target it is about to make. Canonicalize the longest existing ancestor
/// and rejoin the remaining components lexically.
fn real_path(path: &Path) -> std::io::Result<PathBuf> {
    if let Ok(real) = path.canonicalize() {
        return Ok(real);
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    while !existing.exists() {
        let Some(parent) = existing.parent() else {
            return Ok(absolute.clone());
        };
        if let Some(name) = existing.file_name() {
            tail.push(name.to_owned());
        }
        existing = parent;
    }
    let mut real = existing.canonicalize()?;
    for segment in tail.iter().rev() {
        real.push(segment);
    }
    Ok(real)
}
