//! Named masks evaluated into per-vertex weights.
//!
//! A weight of 1 lets a deformation through fully; 0 reverts the vertex to
//! its original position. A mask that is not active (disabled, nothing
//! targeted, zero strength, empty name or unsupported type) yields 0, or 1
//! when inverted. Hosts rely on that asymmetry: an empty inverted mask blocks
//! everything.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::UvGrid;
use crate::error::{MaskError, MaskResult, ValidationIssue};
use crate::island::UvIsland;
use crate::selection::IslandSelection;
use crate::types::{Uv, UvMesh};

/// Largest accepted feather radius in UV units.
pub const MAX_FEATHER_RADIUS: f64 = 0.5;

/// What a mask selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MaskType {
    /// Whole UV islands (plus any explicit vertices).
    #[default]
    UvIsland,
    /// Explicit vertices only.
    VertexGroup,
    /// Declared, no weight computation.
    Gradient,
    /// Declared, no weight computation.
    Texture,
    /// Declared, no weight computation.
    Distance,
}

impl MaskType {
    /// Whether weights can be computed for this type.
    pub fn is_supported(self) -> bool {
        matches!(self, MaskType::UvIsland | MaskType::VertexGroup)
    }
}

impl fmt::Display for MaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MaskType::UvIsland => "UvIsland",
            MaskType::VertexGroup => "VertexGroup",
            MaskType::Gradient => "Gradient",
            MaskType::Texture => "Texture",
            MaskType::Distance => "Distance",
        };
        f.write_str(name)
    }
}

/// Distance used for feathering around targeted vertices.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatherMetric {
    /// Euclidean UV distance to the nearest targeted vertex.
    #[default]
    UvDistance,
    /// `|a - b| * scale` on vertex indices. Only meaningful for meshes whose
    /// vertex order follows the surface.
    IndexDistance { scale: f64 },
}

impl FeatherMetric {
    /// Index metric with the scale older tooling used.
    pub fn legacy_index() -> Self {
        FeatherMetric::IndexDistance { scale: 0.01 }
    }
}

/// Source of [`MaskContext`] generations. Zero is left for the default context.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Geometry a mask is evaluated against: UVs plus the current island set.
///
/// Each call to [`MaskContext::new`] gets a fresh generation. Clones share it.
#[derive(Debug, Clone, Default)]
pub struct MaskContext {
    generation: u64,
    uvs: Vec<Uv>,
    islands: Vec<UvIsland>,
    vertex_islands: Vec<Vec<u32>>,
    island_ids: HashSet<u32>,
}

impl MaskContext {
    /// Bind a mesh and its islands. Precomputes vertex to island membership.
    pub fn new(mesh: &UvMesh, islands: Vec<UvIsland>) -> Self {
        let mut vertex_islands: Vec<Vec<u32>> = vec![Vec::new(); mesh.vertex_count()];
        let mut island_ids = HashSet::with_capacity(islands.len());
        for island in &islands {
            island_ids.insert(island.id);
            for &v in &island.vertex_indices {
                if let Some(list) = vertex_islands.get_mut(v as usize)
                    && !list.contains(&island.id)
                {
                    list.push(island.id);
                }
            }
        }
        debug!(
            vertices = vertex_islands.len(),
            islands = islands.len(),
            "Bound mask context"
        );
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            uvs: mesh.uvs.clone(),
            islands,
            vertex_islands,
            island_ids,
        }
    }

    /// Identity of this binding. Mask caches built against another
    /// generation are discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.uvs.len()
    }

    /// UV of a vertex.
    pub fn uv(&self, vertex: u32) -> Option<&Uv> {
        self.uvs.get(vertex as usize)
    }

    /// The bound islands.
    pub fn islands(&self) -> &[UvIsland] {
        &self.islands
    }

    /// Ids of islands containing a vertex.
    pub fn islands_of_vertex(&self, vertex: u32) -> &[u32] {
        self.vertex_islands
            .get(vertex as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether an island id exists in the bound set.
    pub fn has_island(&self, id: u32) -> bool {
        self.island_ids.contains(&id)
    }

    /// Look up an island by id.
    pub fn island(&self, id: u32) -> Option<&UvIsland> {
        self.islands.iter().find(|i| i.id == id)
    }
}

/// Result of validating one mask. Errors make the mask inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskValidation {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl MaskValidation {
    /// No errors (warnings allowed).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }
}

/// Targeted vertices used for feathering, with a UV grid for radius queries.
#[derive(Debug, Clone)]
struct FeatherSources {
    /// Ascending vertex ids.
    vertices: Vec<u32>,
    /// Items are indices into `vertices`.
    grid: UvGrid,
}

#[derive(Debug, Clone, Default)]
struct WeightCache {
    /// Generation of the context the entries were computed against.
    generation: u64,
    weights: HashMap<u32, f64>,
    feather: Option<FeatherSources>,
}

/// A named selection of islands and vertices.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mask {
    name: String,
    mask_type: MaskType,
    target_island_ids: BTreeSet<u32>,
    target_vertex_indices: BTreeSet<u32>,
    strength: f64,
    is_inverted: bool,
    feather_radius: f64,
    is_enabled: bool,
    feather_metric: FeatherMetric,
    #[cfg_attr(feature = "serde", serde(skip))]
    cache: WeightCache,
}

impl Mask {
    /// An enabled mask at full strength with no targets.
    pub fn new(name: impl Into<String>, mask_type: MaskType) -> Self {
        Self {
            name: name.into(),
            mask_type,
            target_island_ids: BTreeSet::new(),
            target_vertex_indices: BTreeSet::new(),
            strength: 1.0,
            is_inverted: false,
            feather_radius: 0.0,
            is_enabled: true,
            feather_metric: FeatherMetric::default(),
            cache: WeightCache::default(),
        }
    }

    /// An island mask targeting the selected islands.
    pub fn from_selection(name: impl Into<String>, selection: &IslandSelection) -> Self {
        Self::new(name, MaskType::UvIsland).with_islands(selection.ids().iter().copied())
    }

    /// Add target islands.
    pub fn with_islands(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.target_island_ids.extend(ids);
        self
    }

    /// Add target vertices.
    pub fn with_vertices(mut self, vertices: impl IntoIterator<Item = u32>) -> Self {
        self.target_vertex_indices.extend(vertices);
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.set_strength(strength);
        self
    }

    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.is_inverted = inverted;
        self
    }

    pub fn with_feather(mut self, radius: f64) -> Self {
        self.set_feather_radius(radius);
        self
    }

    pub fn with_feather_metric(mut self, metric: FeatherMetric) -> Self {
        self.feather_metric = metric;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mask_type(&self) -> MaskType {
        self.mask_type
    }

    pub fn target_island_ids(&self) -> &BTreeSet<u32> {
        &self.target_island_ids
    }

    pub fn target_vertex_indices(&self) -> &BTreeSet<u32> {
        &self.target_vertex_indices
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn is_inverted(&self) -> bool {
        self.is_inverted
    }

    pub fn feather_radius(&self) -> f64 {
        self.feather_radius
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn feather_metric(&self) -> FeatherMetric {
        self.feather_metric
    }

    pub fn set_mask_type(&mut self, mask_type: MaskType) {
        self.mask_type = mask_type;
        self.invalidate_cache();
    }

    pub fn set_target_islands(&mut self, ids: impl IntoIterator<Item = u32>) {
        self.target_island_ids = ids.into_iter().collect();
        self.invalidate_cache();
    }

    pub fn add_target_island(&mut self, id: u32) {
        if self.target_island_ids.insert(id) {
            self.invalidate_cache();
        }
    }

    pub fn remove_target_island(&mut self, id: u32) {
        if self.target_island_ids.remove(&id) {
            self.invalidate_cache();
        }
    }

    pub fn set_target_vertices(&mut self, vertices: impl IntoIterator<Item = u32>) {
        self.target_vertex_indices = vertices.into_iter().collect();
        self.invalidate_cache();
    }

    pub fn add_target_vertex(&mut self, vertex: u32) {
        if self.target_vertex_indices.insert(vertex) {
            self.invalidate_cache();
        }
    }

    pub fn remove_target_vertex(&mut self, vertex: u32) {
        if self.target_vertex_indices.remove(&vertex) {
            self.invalidate_cache();
        }
    }

    /// Set strength, clamped to `[0, 1]` (NaN becomes 0).
    pub fn set_strength(&mut self, strength: f64) {
        self.strength = if strength.is_nan() {
            0.0
        } else {
            strength.clamp(0.0, 1.0)
        };
        self.invalidate_cache();
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.is_inverted = inverted;
        self.invalidate_cache();
    }

    /// Set feather radius, clamped to `[0, MAX_FEATHER_RADIUS]`.
    pub fn set_feather_radius(&mut self, radius: f64) {
        self.feather_radius = if radius.is_nan() {
            0.0
        } else {
            radius.clamp(0.0, MAX_FEATHER_RADIUS)
        };
        self.invalidate_cache();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
        self.invalidate_cache();
    }

    pub fn set_feather_metric(&mut self, metric: FeatherMetric) {
        self.feather_metric = metric;
        self.invalidate_cache();
    }

    /// Drop cached weights. Call after the bound geometry changes.
    pub fn invalidate_cache(&mut self) {
        self.cache = WeightCache::default();
    }

    /// Number of cached vertex weights.
    pub fn cached_weight_count(&self) -> usize {
        self.cache.weights.len()
    }

    pub fn has_targets(&self) -> bool {
        !self.target_island_ids.is_empty() || !self.target_vertex_indices.is_empty()
    }

    /// Enabled, targeted, positive strength, named and of a supported type.
    pub fn is_active(&self) -> bool {
        self.is_enabled
            && self.has_targets()
            && self.strength > 0.0
            && !self.name.trim().is_empty()
            && self.mask_type.is_supported()
    }

    /// Error when the mask type has no weight computation.
    pub fn ensure_supported(&self) -> MaskResult<()> {
        if self.mask_type.is_supported() {
            Ok(())
        } else {
            Err(MaskError::UnsupportedMaskType {
                name: self.name.clone(),
                mask_type: self.mask_type.to_string(),
            })
        }
    }

    /// Weight of an inactive mask, and of vertices the bound geometry does not
    /// know about.
    #[inline]
    pub fn passthrough_weight(&self) -> f64 {
        if self.is_inverted { 1.0 } else { 0.0 }
    }

    /// Weight of a vertex in `[0, 1]`, memoized per vertex.
    pub fn vertex_weight(&mut self, vertex: u32, ctx: &MaskContext) -> f64 {
        if !self.is_active() {
            return self.passthrough_weight();
        }
        if self.cache.generation != ctx.generation {
            if !self.cache.weights.is_empty() || self.cache.feather.is_some() {
                debug!(
                    mask = %self.name,
                    from = self.cache.generation,
                    to = ctx.generation,
                    "Context changed, dropping cached weights"
                );
            }
            self.cache = WeightCache {
                generation: ctx.generation,
                ..WeightCache::default()
            };
        }
        if let Some(&w) = self.cache.weights.get(&vertex) {
            return w;
        }
        if self.feather_radius > 0.0 && self.cache.feather.is_none() {
            self.cache.feather = Some(self.feather_sources(ctx));
        }
        let w = self.compute_weight(vertex, ctx);
        self.cache.weights.insert(vertex, w);
        w
    }

    /// Weights for every vertex of the bound geometry.
    pub fn weights(&mut self, ctx: &MaskContext) -> Vec<f64> {
        (0..ctx.vertex_count() as u32)
            .map(|v| self.vertex_weight(v, ctx))
            .collect()
    }

    fn base_weight(&self, vertex: u32, ctx: &MaskContext) -> f64 {
        let direct = self.target_vertex_indices.contains(&vertex);
        let via_island = self.mask_type == MaskType::UvIsland
            && ctx
                .islands_of_vertex(vertex)
                .iter()
                .any(|id| self.target_island_ids.contains(id));
        if direct || via_island { 1.0 } else { 0.0 }
    }

    fn compute_weight(&self, vertex: u32, ctx: &MaskContext) -> f64 {
        let mut weight = self.base_weight(vertex, ctx);

        if weight == 0.0
            && self.feather_radius > 0.0
            && let Some(distance) = self.feather_distance(vertex, ctx)
        {
            weight = (1.0 - distance / self.feather_radius).max(0.0);
        }

        if self.is_inverted {
            weight = 1.0 - weight;
        }

        let off = self.passthrough_weight();
        off + (weight - off) * self.strength
    }

    /// Targeted vertices known to the context.
    fn feather_sources(&self, ctx: &MaskContext) -> FeatherSources {
        let mut set: BTreeSet<u32> = self
            .target_vertex_indices
            .iter()
            .copied()
            .filter(|&v| (v as usize) < ctx.vertex_count())
            .collect();
        if self.mask_type == MaskType::UvIsland {
            for &id in &self.target_island_ids {
                if let Some(island) = ctx.island(id) {
                    set.extend(island.vertex_indices.iter().copied());
                }
            }
        }

        let vertices: Vec<u32> = set.into_iter().collect();
        let mut grid = UvGrid::new(self.feather_radius);
        for (i, &v) in vertices.iter().enumerate() {
            if let Some(uv) = ctx.uv(v) {
                grid.insert(uv, i as u32);
            }
        }
        trace!(mask = %self.name, sources = vertices.len(), "Built feather sources");
        FeatherSources { vertices, grid }
    }

    /// Distance to the nearest targeted vertex within the feather radius.
    fn feather_distance(&self, vertex: u32, ctx: &MaskContext) -> Option<f64> {
        let sources = self.cache.feather.as_ref()?;
        match self.feather_metric {
            FeatherMetric::UvDistance => {
                let p = ctx.uv(vertex)?;
                sources
                    .grid
                    .query(p, self.feather_radius)
                    .filter_map(|i| ctx.uv(sources.vertices[i as usize]))
                    .map(|q| (p - q).norm())
                    .reduce(f64::min)
            }
            FeatherMetric::IndexDistance { scale } => {
                let idx = sources.vertices.partition_point(|&v| v < vertex);
                let below = idx.checked_sub(1).map(|i| sources.vertices[i]);
                let above = sources.vertices.get(idx).copied();
                below
                    .into_iter()
                    .chain(above)
                    .map(|t| t.abs_diff(vertex) as f64 * scale.abs())
                    .reduce(f64::min)
            }
        }
    }

    /// Blend deformed positions toward the originals by weight.
    ///
    /// For each vertex, `w = weight * global_strength`; where `w < 1` the
    /// vertex becomes `lerp(original, deformed, w)`.
    pub fn apply_to_mesh(
        &mut self,
        vertices: &mut [Point3<f64>],
        original: &[Point3<f64>],
        ctx: &MaskContext,
        global_strength: f64,
    ) {
        for (i, (vertex, orig)) in vertices.iter_mut().zip(original).enumerate() {
            let w = self.vertex_weight(i as u32, ctx) * global_strength;
            if w < 1.0 {
                *vertex = orig.lerp(&*vertex, w);
            }
        }
    }

    /// Check the mask against the current island set. Never mutates.
    pub fn validate(&self, islands: &[UvIsland]) -> MaskValidation {
        let mut result = MaskValidation::default();

        if self.name.trim().is_empty() {
            result.errors.push(ValidationIssue::EmptyMaskName);
        }
        if self.strength <= 0.0 {
            result.errors.push(ValidationIssue::NonPositiveStrength {
                strength: self.strength,
            });
        }
        if !self.mask_type.is_supported() {
            result.errors.push(ValidationIssue::UnsupportedMaskType {
                mask_type: self.mask_type.to_string(),
            });
        }
        if !self.has_targets() {
            result.warnings.push(ValidationIssue::NoTargets);
        }
        for &id in &self.target_island_ids {
            if !islands.iter().any(|island| island.id == id) {
                result
                    .warnings
                    .push(ValidationIssue::StaleIslandReference { island_id: id });
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two separate triangles: island 0 near the origin, island 1 far away.
    fn context() -> MaskContext {
        let uvs = vec![
            Uv::new(0.0, 0.0),
            Uv::new(0.1, 0.0),
            Uv::new(0.0, 0.1),
            Uv::new(0.2, 0.0),
            Uv::new(0.9, 0.9),
            Uv::new(1.0, 0.9),
            Uv::new(0.9, 1.0),
        ];
        let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[0, 1, 2], [4, 5, 6]]);
        let islands = vec![
            UvIsland::from_triangles(0, &mesh, vec![0]),
            UvIsland::from_triangles(1, &mesh, vec![1]),
        ];
        MaskContext::new(&mesh, islands)
    }

    #[test]
    fn test_island_mask_weights() {
        let ctx = context();
        let mut mask = Mask::new("face", MaskType::UvIsland).with_islands([0]);
        assert_eq!(mask.weights(&ctx), vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(mask.cached_weight_count(), 7);
    }

    #[test]
    fn test_new_context_drops_cached_weights() {
        let ctx = context();
        let mut mask = Mask::new("face", MaskType::UvIsland)
            .with_islands([0])
            .with_feather(0.2);
        let before = mask.weights(&ctx);
        assert_eq!(before[0], 1.0);
        assert_eq!(before[4], 0.0);

        // Same vertices, but island 0 is now the far triangle
        let uvs: Vec<Uv> = (0..7).map(|v| *ctx.uv(v).unwrap()).collect();
        let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[4, 5, 6], [0, 1, 2]]);
        let swapped = MaskContext::new(
            &mesh,
            vec![
                UvIsland::from_triangles(0, &mesh, vec![0]),
                UvIsland::from_triangles(1, &mesh, vec![1]),
            ],
        );
        assert_ne!(swapped.generation(), ctx.generation());

        let after = mask.weights(&swapped);
        assert_eq!(after[0], 0.0);
        assert_eq!(after[4], 1.0);
        assert_eq!(after[5], 1.0);
        // Vertex 3 sits 0.2 from island 0's old corner, now well outside the radius
        assert_eq!(after[3], 0.0);
        assert_eq!(mask.cached_weight_count(), 7);
    }

    #[test]
    fn test_cloned_context_keeps_cache() {
        let ctx = context();
        let mut mask = Mask::new("face", MaskType::UvIsland).with_islands([1]);
        mask.vertex_weight(4, &ctx);
        let copy = ctx.clone();
        assert_eq!(copy.generation(), ctx.generation());
        mask.vertex_weight(5, &copy);
        assert_eq!(mask.cached_weight_count(), 2);
    }

    #[test]
    fn test_vertex_group_ignores_islands() {
        let ctx = context();
        let mut mask = Mask::new("pins", MaskType::VertexGroup)
            .with_islands([0])
            .with_vertices([5]);
        assert_eq!(mask.vertex_weight(0, &ctx), 0.0);
        assert_eq!(mask.vertex_weight(5, &ctx), 1.0);
    }

    #[test]
    fn test_inactive_mask_passthrough() {
        let ctx = context();
        let mut empty = Mask::new("empty", MaskType::UvIsland);
        assert_eq!(empty.vertex_weight(0, &ctx), 0.0);
        empty.set_inverted(true);
        assert_eq!(empty.vertex_weight(0, &ctx), 1.0);

        let mut disabled = Mask::new("off", MaskType::UvIsland).with_islands([0]);
        disabled.set_enabled(false);
        assert_eq!(disabled.vertex_weight(0, &ctx), 0.0);

        let mut gradient = Mask::new("g", MaskType::Gradient).with_vertices([0]);
        assert!(!gradient.is_active());
        assert_eq!(gradient.vertex_weight(0, &ctx), 0.0);
        assert!(gradient.ensure_supported().is_err());
    }

    #[test]
    fn test_invert_and_strength() {
        let ctx = context();
        let mut mask = Mask::new("m", MaskType::UvIsland)
            .with_islands([0])
            .with_strength(0.5);
        assert!((mask.vertex_weight(0, &ctx) - 0.5).abs() < 1e-12);
        assert_eq!(mask.vertex_weight(4, &ctx), 0.0);

        mask.set_inverted(true);
        // Inverted: target 1 -> 0, lerp(1, 0, 0.5)
        assert!((mask.vertex_weight(0, &ctx) - 0.5).abs() < 1e-12);
        assert_eq!(mask.vertex_weight(4, &ctx), 1.0);
    }

    #[test]
    fn test_uv_feather_falloff() {
        let ctx = context();
        let mut mask = Mask::new("m", MaskType::UvIsland)
            .with_islands([0])
            .with_feather(0.2);
        // Vertex 3 is 0.1 from vertex 1
        assert!((mask.vertex_weight(3, &ctx) - 0.5).abs() < 1e-9);
        assert_eq!(mask.vertex_weight(4, &ctx), 0.0);
    }

    #[test]
    fn test_index_feather_metric() {
        let ctx = context();
        let mut mask = Mask::new("m", MaskType::VertexGroup)
            .with_vertices([1])
            .with_feather(0.5)
            .with_feather_metric(FeatherMetric::IndexDistance { scale: 0.1 });
        // |3 - 1| * 0.1 = 0.2 -> 1 - 0.2 / 0.5
        assert!((mask.vertex_weight(3, &ctx) - 0.6).abs() < 1e-9);
        assert!((mask.vertex_weight(0, &ctx) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_setters_invalidate_cache() {
        let ctx = context();
        let mut mask = Mask::new("m", MaskType::UvIsland).with_islands([0]);
        assert_eq!(mask.vertex_weight(4, &ctx), 0.0);
        mask.add_target_island(1);
        assert_eq!(mask.cached_weight_count(), 0);
        assert_eq!(mask.vertex_weight(4, &ctx), 1.0);
    }

    #[test]
    fn test_clamping() {
        let mask = Mask::new("m", MaskType::UvIsland)
            .with_strength(3.0)
            .with_feather(2.0);
        assert_eq!(mask.strength(), 1.0);
        assert_eq!(mask.feather_radius(), MAX_FEATHER_RADIUS);
    }

    #[test]
    fn test_apply_to_mesh_blends() {
        let ctx = context();
        let mut mask = Mask::new("m", MaskType::UvIsland).with_islands([0]);
        let original = vec![Point3::origin(); 7];
        let mut deformed = vec![Point3::new(1.0, 0.0, 0.0); 7];
        mask.apply_to_mesh(&mut deformed, &original, &ctx, 0.5);
        assert!((deformed[0].x - 0.5).abs() < 1e-12);
        assert_eq!(deformed[4].x, 0.0);
    }

    #[test]
    fn test_validation() {
        let ctx = context();
        let mask = Mask::new("m", MaskType::UvIsland).with_islands([0, 7]);
        let v = mask.validate(ctx.islands());
        assert!(v.is_valid());
        assert_eq!(v.warnings, vec![ValidationIssue::StaleIslandReference { island_id: 7 }]);

        let bad = Mask::new("", MaskType::Texture).with_strength(0.0);
        let v = bad.validate(ctx.islands());
        assert_eq!(v.errors.len(), 3);
        assert_eq!(v.warnings, vec![ValidationIssue::NoTargets]);
    }

    #[test]
    fn test_from_selection() {
        let mut selection = IslandSelection::new();
        selection.select(1);
        let mask = Mask::from_selection("picked", &selection);
        assert_eq!(mask.mask_type(), MaskType::UvIsland);
        assert!(mask.target_island_ids().contains(&1));
    }
}
