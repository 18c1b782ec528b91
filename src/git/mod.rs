//! Version control queries and the git-flow branch policy
//!
//! # Example
//!
//! ```no_run
//! use qualigate::git::{BranchPolicy, GitRepository};
//! use std::path::Path;
//!
//! let repo = GitRepository::open(Path::new("."))?;
//! let branch = BranchPolicy::new(&repo).classify()?;
//! println!("{} stable={}", branch.identifier, branch.stable);
//! # Ok::<(), qualigate::GateError>(())
//! ```

pub mod branch;
mod repository;

pub use branch::{
    is_development, is_stable, normalized_identifier, BranchClassification, BranchPolicy,
};
pub use repository::GitRepository;

use crate::error::Result;

/// Read-only view of the checkout
pub trait VersionControl {
    /// Short name of the checked-out branch.
    fn current_branch(&self) -> Result<String>;

    /// `git describe` output for HEAD, `None` when no tag is reachable.
    fn nearest_tag(&self, include_lightweight: bool) -> Result<Option<String>>;
}
