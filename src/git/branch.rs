//! Git-flow branch classification
//!
//! Stable checkouts (master, dev, release/*, hotfix/*, or a commit carrying
//! a release tag) belong to the release pipeline. Everything else is a
//! development branch, where branch-gated analysis runs.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use super::VersionControl;
use crate::error::Result;

static RELEASE_FLOW_BRANCH: OnceLock<Regex> = OnceLock::new();
static RELEASE_TAG: OnceLock<Regex> = OnceLock::new();
static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();

fn release_flow_branch() -> &'static Regex {
    RELEASE_FLOW_BRANCH.get_or_init(|| Regex::new(r"^(release|hotfix)/.*$").expect("valid regex"))
}

fn release_tag() -> &'static Regex {
    // ASCII digits only: `\d` would also accept other Unicode numerals
    RELEASE_TAG.get_or_init(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("valid regex"))
}

fn unsafe_chars() -> &'static Regex {
    UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^a-zA-Z0-9.\-]+").expect("valid regex"))
}

/// True for master, dev, release/*, hotfix/*, or a `X.Y.Z` nearest tag.
pub fn is_stable(branch: &str, nearest_tag: Option<&str>) -> bool {
    branch.eq_ignore_ascii_case("master")
        || branch.eq_ignore_ascii_case("dev")
        || release_flow_branch().is_match(branch)
        || nearest_tag.is_some_and(|tag| release_tag().is_match(tag))
}

pub fn is_development(branch: &str, nearest_tag: Option<&str>) -> bool {
    !is_stable(branch, nearest_tag)
}

/// Branch name safe for file names and version suffixes.
///
/// `feature/FOO-123 test` becomes `feature-FOO-123-test`.
pub fn normalized_identifier(branch: &str) -> String {
    unsafe_chars().replace_all(branch, "-").into_owned()
}

/// Where the current checkout sits in the release flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchClassification {
    pub branch: String,
    pub nearest_tag: Option<String>,
    pub stable: bool,
    pub identifier: String,
}

impl BranchClassification {
    pub fn new(branch: impl Into<String>, nearest_tag: Option<String>) -> Self {
        let branch = branch.into();
        let stable = is_stable(&branch, nearest_tag.as_deref());
        let identifier = normalized_identifier(&branch);
        Self {
            branch,
            nearest_tag,
            stable,
            identifier,
        }
    }

    pub fn is_development(&self) -> bool {
        !self.stable
    }
}

/// Classifies the checkout behind a [`VersionControl`].
pub struct BranchPolicy<'a> {
    vcs: &'a dyn VersionControl,
}

impl<'a> BranchPolicy<'a> {
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self { vcs }
    }

    /// Query the branch and nearest tag (lightweight tags included).
    ///
    /// Fails if the branch cannot be determined; callers decide whether
    /// that is fatal.
    pub fn classify(&self) -> Result<BranchClassification> {
        let branch = self.vcs.current_branch()?;
        let tag = self.vcs.nearest_tag(true)?;
        let classification = BranchClassification::new(branch, tag);
        debug!(
            "Branch {} (tag {:?}) classified as {}",
            classification.branch,
            classification.nearest_tag,
            if classification.stable { "stable" } else { "development" }
        );
        Ok(classification)
    }

    pub fn is_stable(&self) -> Result<bool> {
        Ok(self.classify()?.stable)
    }

    pub fn is_development(&self) -> Result<bool> {
        Ok(!self.is_stable()?)
    }

    pub fn normalized_identifier(&self) -> Result<String> {
        Ok(normalized_identifier(&self.vcs.current_branch()?))
    }
}
