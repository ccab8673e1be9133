//! In-memory cache of island analyses.
//!
//! Keys are supplied by the caller (an asset id, a path, a content hash); the
//! cache never inspects the mesh to decide whether an entry is still valid.
//! Call [`IslandCache::invalidate`] when the mesh behind a key changes.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MaskResult;
use crate::partition::{IslandAnalysis, PartitionParams, partition_islands};
use crate::types::UvMesh;

/// Caller-chosen identity of a mesh.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeshKey {
    Id(u64),
    Name(String),
}

impl From<u64> for MeshKey {
    fn from(id: u64) -> Self {
        MeshKey::Id(id)
    }
}

impl From<&str> for MeshKey {
    fn from(name: &str) -> Self {
        MeshKey::Name(name.to_string())
    }
}

impl From<String> for MeshKey {
    fn from(name: String) -> Self {
        MeshKey::Name(name)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    params: PartitionParams,
    analysis: IslandAnalysis,
}

/// Analyses keyed by mesh, valid only for the parameters they were made with.
#[derive(Debug, Clone, Default)]
pub struct IslandCache {
    entries: HashMap<MeshKey, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl IslandCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached analysis for `key`, if it was produced with `params`.
    pub fn get(&mut self, key: &MeshKey, params: &PartitionParams) -> Option<&IslandAnalysis> {
        match self.entries.get(key) {
            Some(entry) if entry.params == *params => {
                self.hits += 1;
                trace!(key = ?key, "Island cache hit");
                Some(&entry.analysis)
            }
            _ => {
                self.misses += 1;
                trace!(key = ?key, "Island cache miss");
                None
            }
        }
    }

    /// Store an analysis, e.g. one loaded from disk. Replaces any entry for
    /// the same key.
    pub fn insert(&mut self, key: MeshKey, params: PartitionParams, analysis: IslandAnalysis) {
        debug!(key = ?key, islands = analysis.island_count(), "Caching island analysis");
        self.entries.insert(key, CacheEntry { params, analysis });
    }

    /// Cached analysis, or partition `mesh` and cache the result.
    ///
    /// Failed analyses are not cached.
    pub fn get_or_analyze(
        &mut self,
        key: MeshKey,
        mesh: &UvMesh,
        params: &PartitionParams,
    ) -> MaskResult<&IslandAnalysis> {
        match self.entries.entry(key) {
            Entry::Occupied(occupied) if occupied.get().params == *params => {
                self.hits += 1;
                Ok(&occupied.into_mut().analysis)
            }
            Entry::Occupied(mut occupied) => {
                self.misses += 1;
                debug!(key = ?occupied.key(), "Parameters changed, re-analyzing");
                let analysis = partition_islands(mesh, params)?;
                occupied.insert(CacheEntry {
                    params: params.clone(),
                    analysis,
                });
                Ok(&occupied.into_mut().analysis)
            }
            Entry::Vacant(vacant) => {
                self.misses += 1;
                let analysis = partition_islands(mesh, params)?;
                let entry = vacant.insert(CacheEntry {
                    params: params.clone(),
                    analysis,
                });
                Ok(&entry.analysis)
            }
        }
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&mut self, key: &MeshKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!(key = ?key, "Invalidated island analysis");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
