use serde::{Deserialize, Serialize};

/// Repository configuration, stored at `.git/config`.
///
/// Only the `[core]` section is modeled; the file is TOML-compatible and
/// carries the same keys git writes for a fresh repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub core: CoreConfig,
}

/// The `[core]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// On-disk layout version. Only version 0 is understood.
    #[serde(rename = "repositoryformatversion")]
    pub repository_format_version: u32,

    /// Whether file mode changes are tracked.
    pub filemode: bool,

    /// Whether the repository has no worktree.
    pub bare: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig {
                repository_format_version: 0,
                filemode: false,
                bare: false,
            },
        }
    }
}
