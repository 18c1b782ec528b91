//! libgit2-backed [`VersionControl`]

use git2::{DescribeOptions, ErrorClass, ErrorCode, Repository};
use std::path::Path;
use tracing::debug;

use super::VersionControl;
use crate::error::{GateError, Result};

/// Git checkout found by walking up from a path
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the repository containing `path` (or any subdirectory of it).
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)?;
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self { repo })
    }

    /// Check if a path is inside a git repository.
    pub fn is_git_repo(path: &Path) -> bool {
        Repository::discover(path).is_ok()
    }
}

impl VersionControl for GitRepository {
    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        if self.repo.head_detached()? {
            let target = head
                .target()
                .map(|oid| oid.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(GateError::DetachedHead(target));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| {
                GateError::Vcs(git2::Error::from_str(
                    "HEAD branch name is not valid UTF-8",
                ))
            })
    }

    fn nearest_tag(&self, include_lightweight: bool) -> Result<Option<String>> {
        let mut opts = DescribeOptions::new();
        if include_lightweight {
            opts.describe_tags();
        }

        match self.repo.describe(&opts) {
            Ok(describe) => Ok(Some(describe.format(None)?)),
            // "no tags can describe" / "no reference found"
            Err(e) if e.code() == ErrorCode::NotFound || e.class() == ErrorClass::Describe => {
                debug!("No tag reachable from HEAD: {}", e.message());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
