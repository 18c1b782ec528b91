//! Persisted violation limits
//!
//! Limits live in a flat `key=value` properties file committed with the
//! project. Saves go through a temp file and a rename so an interrupted
//! build never leaves a half-written file; updates hold an exclusive lock
//! on a sidecar `.lock` file for the whole read-merge-write cycle.

use crate::error::{GateError, Result};
use fd_lock::RwLock;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default limits file name in the repository root
pub const DEFAULT_LIMITS_FILE: &str = "static-analysis.properties";

const HEADER: &str = "# Static analysis violation limits. Lowered automatically on local builds.\n";

/// Check that `key` survives a save and reload unchanged.
///
/// Keys are written unescaped, so separators, leading comment markers and
/// whitespace are rejected.
pub fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        Some("key is empty")
    } else if key.contains(['=', ':']) {
        Some("key contains '=' or ':'")
    } else if key.starts_with(['#', '!']) {
        Some("key starts with a comment marker")
    } else if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("key contains whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(GateError::Config(format!(
            "invalid limits key '{}': {}",
            key, reason
        ))),
        None => Ok(()),
    }
}

/// Tool name to violation-count limit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisLimits {
    limits: BTreeMap<String, u32>,
}

impl AnalysisLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties-file content. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut limits = BTreeMap::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let corrupt = |reason: String| GateError::CorruptLimits {
                path: path.to_path_buf(),
                line: idx + 1,
                reason,
            };

            let split_at = line
                .find(['=', ':'])
                .ok_or_else(|| corrupt(format!("missing '=' in '{}'", line)))?;
            let key = line[..split_at].trim();
            let value = line[split_at + 1..].trim();

            if key.is_empty() {
                return Err(corrupt("empty key".to_string()));
            }
            let limit: u32 = value
                .parse()
                .map_err(|_| corrupt(format!("'{}' is not a non-negative integer", value)))?;

            limits.insert(key.to_string(), limit);
        }

        Ok(Self { limits })
    }

    /// Render as properties-file content, keys sorted.
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        for (key, limit) in &self.limits {
            out.push_str(&format!("{}={}\n", key, limit));
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.limits.get(key).copied()
    }

    pub fn set(&mut self, key: impl Into<String>, limit: u32) {
        self.limits.insert(key.into(), limit);
    }

    pub fn remove(&mut self, key: &str) -> Option<u32> {
        self.limits.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.limits.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

/// File-backed store for [`AnalysisLimits`]
#[derive(Debug, Clone)]
pub struct LimitsStore {
    path: PathBuf,
}

impl LimitsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for user-facing remediation messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Load the limits. `Ok(None)` means the file does not exist yet and
    /// every check should be skipped.
    pub fn load(&self) -> Result<Option<AnalysisLimits>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No limits file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let limits = AnalysisLimits::parse(&content, &self.path)?;
        debug!(
            "Loaded {} limits from {}",
            limits.len(),
            self.path.display()
        );
        Ok(Some(limits))
    }

    /// Replace the whole file atomically.
    pub fn save(&self, limits: &AnalysisLimits) -> Result<()> {
        for (key, _) in limits.iter() {
            validate_key(key)?;
        }

        // Write to temp file first, then rename (atomic on POSIX)
        let tmp_file = self.tmp_path();
        fs::write(&tmp_file, limits.render())?;
        if let Err(e) = fs::rename(&tmp_file, &self.path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(e.into());
        }

        debug!("Saved {} limits to {}", limits.len(), self.path.display());
        Ok(())
    }

    /// Set one limit under the writer lock: re-load, merge, save.
    ///
    /// Other keys written concurrently by another evaluation are preserved.
    pub fn update(&self, key: &str, limit: u32) -> Result<AnalysisLimits> {
        validate_key(key)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock.write()?;

        let mut limits = self.load()?.unwrap_or_default();
        limits.set(key, limit);
        self.save(&limits)?;
        Ok(limits)
    }

    /// Writer lock sidecar, e.g. `static-analysis.properties.lock`.
    pub fn lock_path(&self) -> PathBuf {
        sidecar(&self.path, ".lock")
    }

    /// Staging file for atomic saves.
    pub fn tmp_path(&self) -> PathBuf {
        sidecar(&self.path, ".tmp")
    }
}

/// `path` with `suffix` appended to the full file name.
pub(crate) fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
