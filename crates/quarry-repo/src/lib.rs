//! Repository layout, discovery, and configuration for Quarry.
//!
//! A repository is a worktree directory plus a `.git` control directory
//! holding objects, refs, and configuration. This crate owns the layout:
//!
//! - [`Repository::create`] bootstraps the control-directory skeleton
//! - [`Repository::find`] / [`Repository::discover`] walk upward from a
//!   path until a control directory appears
//! - [`Config`] is the minimal `[core]` schema the layout requires
//!
//! The object database consumes the paths this crate resolves; it has no
//! reverse dependency on it.

pub mod config;
pub mod error;
pub mod repo;

pub use config::{Config, CoreConfig};
pub use error::{RepoError, RepoResult};
pub use repo::Repository;
