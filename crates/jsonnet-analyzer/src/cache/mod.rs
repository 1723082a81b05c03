//! Parsed and annotated trees for imported files, keyed by canonical path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::debug;

use crate::analysis::walker::{AnnotatedTree, walk};
use crate::syntax::{ParseError, parse};

#[derive(Debug, Error)]
pub enum CacheError {
    /// Nothing is cached under the key, or the specifier matched no file.
    #[error("node cache miss for {0}")]
    Miss(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug)]
pub struct CachedTree {
    pub path: PathBuf,
    pub tree: AnnotatedTree,
}

impl CachedTree {
    fn build(
        path: PathBuf,
        source: &str,
    ) -> Result<Self, CacheError> {
        let name = path.to_string_lossy();
        let ast = parse(&name, source)?;
        let tree = walk(Arc::from(source), Arc::new(ast));
        Ok(Self {
            path,
            tree,
        })
    }
}

type Slot = Arc<OnceCell<Arc<CachedTree>>>;

/// Concurrent cache with single-flight population per path.
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: DashMap<PathBuf, Slot>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure lookup. Never touches the filesystem beyond canonicalizing `key`.
    pub fn get(
        &self,
        key: &Path,
    ) -> Result<Arc<CachedTree>, CacheError> {
        let key = canonical(key);
        self.entries
            .get(&key)
            .and_then(|slot| slot.value().get().cloned())
            .ok_or_else(|| CacheError::Miss(key.display().to_string()))
    }

    /// Resolve `specifier` against `search_paths`, then return the cached tree
    /// or read, parse and walk the file exactly once. Failures are not
    /// remembered, so a later call retries.
    pub fn load(
        &self,
        specifier: &str,
        search_paths: &[PathBuf],
    ) -> Result<Arc<CachedTree>, CacheError> {
        let path = resolve_import(specifier, search_paths).ok_or_else(|| CacheError::Miss(specifier.to_string()))?;

        // Clone the slot out so the shard lock is not held while parsing.
        let slot = self.entries.entry(path.clone()).or_default().clone();
        if let Some(cached) = slot.get() {
            debug!("Node cache hit for {}", path.display());
            return Ok(cached.clone());
        }

        let cached = slot.get_or_try_init(|| {
            debug!("Loading {} into node cache", path.display());
            let source = std::fs::read_to_string(&path).map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
            CachedTree::build(path.clone(), &source).map(Arc::new)
        })?;
        Ok(cached.clone())
    }

    /// Cache `source` under `path`, replacing any previous entry.
    pub fn insert(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<Arc<CachedTree>, CacheError> {
        let key = canonical(path);
        let cached = Arc::new(CachedTree::build(key.clone(), source)?);
        let slot = OnceCell::new();
        let _ = slot.set(cached.clone());
        self.entries.insert(key, Arc::new(slot));
        Ok(cached)
    }

    pub fn invalidate(
        &self,
        path: &Path,
    ) {
        if self.entries.remove(&canonical(path)).is_some() {
            debug!("Invalidated {}", path.display());
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.value().get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// First existing file for `specifier`: absolute specifiers as-is, relative
/// ones tried under each search root in order.
pub fn resolve_import(
    specifier: &str,
    search_paths: &[PathBuf],
) -> Option<PathBuf> {
    let candidate = Path::new(specifier);
    if candidate.is_absolute() {
        return candidate.is_file().then(|| canonical(candidate));
    }
    search_paths.iter().map(|root| root.join(candidate)).find(|path| path.is_file()).map(|path| canonical(&path))
}

#[cfg(test)]
#[path = "../../tests/src/cache/node_cache_tests.rs"]
mod tests;
