//! Mask registry with cached per-mask and combined weights.
//!
//! The service owns the masks and the bound [`MaskContext`]. Weights are
//! computed on demand and kept until a mask changes or the geometry is
//! replaced; every such change is also queued as a [`MaskEvent`] for the host
//! to pick up with [`MaskService::drain_events`].

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MaskError, MaskResult, ValidationIssue};
use crate::mask::{Mask, MaskContext, MaskValidation};
use crate::tracing_ext::{OperationTimer, log_mask_validation};

/// How the weights of several active masks are folded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CombineMode {
    /// Per-vertex maximum.
    #[default]
    Union,
    /// Per-vertex minimum.
    Intersection,
    /// `max(0, acc - w)`.
    Difference,
}

impl CombineMode {
    #[inline]
    pub fn combine(self, acc: f64, weight: f64) -> f64 {
        match self {
            CombineMode::Union => acc.max(weight),
            CombineMode::Intersection => acc.min(weight),
            CombineMode::Difference => (acc - weight).max(0.0),
        }
    }
}

/// Changes reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskEvent {
    MaskAdded(String),
    MaskRemoved(String),
    MaskModified(String),
    GeometryChanged,
}

/// Whether cached weights reflect the current masks and geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    #[default]
    Dirty,
    Cached,
}

/// Receives one combined weight per vertex.
pub trait DeformationHost {
    /// Number of vertices the host deforms.
    fn vertex_count(&self) -> usize;

    /// Apply the final weight of one vertex.
    fn apply_weight(&mut self, vertex: u32, weight: f64);
}

/// Host that blends deformed positions back toward their originals.
pub struct VertexBlend<'a> {
    deformed: &'a mut [Point3<f64>],
    original: &'a [Point3<f64>],
}

impl<'a> VertexBlend<'a> {
    pub fn new(deformed: &'a mut [Point3<f64>], original: &'a [Point3<f64>]) -> Self {
        Self { deformed, original }
    }
}

impl DeformationHost for VertexBlend<'_> {
    fn vertex_count(&self) -> usize {
        self.deformed.len().min(self.original.len())
    }

    fn apply_weight(&mut self, vertex: u32, weight: f64) {
        let i = vertex as usize;
        if weight < 1.0
            && let (Some(target), Some(orig)) = (self.deformed.get_mut(i), self.original.get(i))
        {
            *target = orig.lerp(&*target, weight);
        }
    }
}

/// Result of [`MaskService::validate_all_masks`].
#[derive(Debug, Clone, Default)]
pub struct ServiceValidation {
    /// Per-mask results in registration order.
    pub results: Vec<(String, MaskValidation)>,
    /// Names registered more than once.
    pub duplicates: Vec<ValidationIssue>,
}

impl ServiceValidation {
    pub fn is_valid(&self) -> bool {
        self.duplicates.is_empty() && self.results.iter().all(|(_, v)| v.is_valid())
    }

    pub fn error_count(&self) -> usize {
        self.duplicates.len() + self.results.iter().map(|(_, v)| v.errors.len()).sum::<usize>()
    }

    pub fn warning_count(&self) -> usize {
        self.results.iter().map(|(_, v)| v.warnings.len()).sum()
    }

    /// Validation of one mask by name.
    pub fn for_mask(&self, name: &str) -> Option<&MaskValidation> {
        self.results.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Owns masks, the bound geometry and all weight caches.
#[derive(Debug, Default)]
pub struct MaskService {
    masks: Vec<Mask>,
    /// Registration id of each entry in `masks`, same order.
    ids: Vec<u64>,
    next_id: u64,
    context: Option<MaskContext>,
    mask_cache: HashMap<u64, Vec<f64>>,
    combined_cache: HashMap<(CombineMode, usize), Vec<f64>>,
    state: CacheState,
    events: Vec<MaskEvent>,
}

impl MaskService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously saved mask list as-is.
    ///
    /// Unlike [`add_mask`](Self::add_mask) this does not reject duplicate
    /// names; [`validate_all_masks`](Self::validate_all_masks) reports them.
    pub fn from_masks(masks: Vec<Mask>) -> Self {
        let next_id = masks.len() as u64;
        Self {
            ids: (0..next_id).collect(),
            next_id,
            masks,
            ..Self::default()
        }
    }

    fn index_of(&self, name: &str) -> MaskResult<usize> {
        self.masks
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| MaskError::mask_not_found(name))
    }

    /// Register a mask. Names must be non-empty and unique.
    pub fn add_mask(&mut self, mask: Mask) -> MaskResult<()> {
        if mask.name().trim().is_empty() {
            return Err(MaskError::EmptyMaskName);
        }
        if self.mask(mask.name()).is_some() {
            return Err(MaskError::duplicate_mask(mask.name()));
        }
        if let Some(ctx) = &self.context {
            log_mask_validation(mask.name(), &mask.validate(ctx.islands()));
        }
        info!(mask = mask.name(), mask_type = %mask.mask_type(), "Added mask");
        let name = mask.name().to_string();
        let id = self.next_id;
        self.next_id += 1;
        self.masks.push(mask);
        self.ids.push(id);
        self.mark_dirty(Some(id));
        self.events.push(MaskEvent::MaskAdded(name));
        Ok(())
    }

    /// Remove a mask and return it.
    pub fn remove_mask(&mut self, name: &str) -> MaskResult<Mask> {
        let idx = self.index_of(name)?;
        let mask = self.masks.remove(idx);
        let id = self.ids.remove(idx);
        info!(mask = name, "Removed mask");
        self.mark_dirty(Some(id));
        self.events.push(MaskEvent::MaskRemoved(name.to_string()));
        Ok(mask)
    }

    pub fn mask(&self, name: &str) -> Option<&Mask> {
        self.masks.iter().find(|m| m.name() == name)
    }

    /// Edit a mask in place. Its cached weights are dropped afterwards.
    pub fn modify_mask<F>(&mut self, name: &str, edit: F) -> MaskResult<()>
    where
        F: FnOnce(&mut Mask),
    {
        let idx = self.index_of(name)?;
        let id = self.ids[idx];
        let mask = &mut self.masks[idx];
        edit(mask);
        mask.invalidate_cache();
        debug!(mask = name, active = mask.is_active(), "Modified mask");
        self.mark_dirty(Some(id));
        self.events.push(MaskEvent::MaskModified(name.to_string()));
        Ok(())
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    pub fn active_masks(&self) -> impl Iterator<Item = &Mask> {
        self.masks.iter().filter(|m| m.is_active())
    }

    /// Bind new geometry. Drops every cached weight.
    pub fn set_context(&mut self, context: MaskContext) {
        for mask in &mut self.masks {
            mask.invalidate_cache();
            let validation = mask.validate(context.islands());
            if validation.has_warnings() || !validation.is_valid() {
                log_mask_validation(mask.name(), &validation);
            }
        }
        info!(
            vertices = context.vertex_count(),
            islands = context.islands().len(),
            "Bound mask geometry"
        );
        self.context = Some(context);
        self.mark_dirty(None);
        self.events.push(MaskEvent::GeometryChanged);
    }

    /// Unbind geometry. Weight queries fail until a new context is set.
    pub fn clear_context(&mut self) {
        if self.context.take().is_some() {
            for mask in &mut self.masks {
                mask.invalidate_cache();
            }
            self.mark_dirty(None);
            self.events.push(MaskEvent::GeometryChanged);
        }
    }

    pub fn context(&self) -> Option<&MaskContext> {
        self.context.as_ref()
    }

    pub fn cache_state(&self) -> CacheState {
        self.state
    }

    fn mark_dirty(&mut self, mask: Option<u64>) {
        match mask {
            Some(id) => {
                self.mask_cache.remove(&id);
            }
            None => self.mask_cache.clear(),
        }
        self.combined_cache.clear();
        if self.state == CacheState::Cached {
            debug!("Mask weight cache marked dirty");
        }
        self.state = CacheState::Dirty;
    }

    /// Weights of one mask for every vertex of the bound geometry.
    ///
    /// With duplicate names this is the first mask registered under `name`.
    pub fn mask_weights(&mut self, name: &str) -> MaskResult<&[f64]> {
        if self.context.is_none() {
            return Err(MaskError::MissingContext);
        }
        let idx = self.index_of(name)?;
        self.weights_at(idx)
    }

    fn weights_at(&mut self, idx: usize) -> MaskResult<&[f64]> {
        let ctx = self.context.as_ref().ok_or(MaskError::MissingContext)?;
        let mask = &mut self.masks[idx];
        let weights = self
            .mask_cache
            .entry(self.ids[idx])
            .or_insert_with(|| mask.weights(ctx));
        Ok(weights.as_slice())
    }

    /// Fold all active masks into one weight per vertex.
    ///
    /// With no active mask every vertex gets 1 (deformation passes through).
    /// Vertices beyond the bound geometry take each mask's passthrough weight.
    pub fn calculate_combined_weights(
        &mut self,
        vertex_count: usize,
        mode: CombineMode,
    ) -> MaskResult<Vec<f64>> {
        let active: Vec<(usize, f64)> = self
            .masks
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_active())
            .map(|(idx, m)| (idx, m.passthrough_weight()))
            .collect();
        if active.is_empty() {
            return Ok(vec![1.0; vertex_count]);
        }
        if let Some(cached) = self.combined_cache.get(&(mode, vertex_count)) {
            return Ok(cached.clone());
        }

        let _timer = OperationTimer::for_masks("combined_weights", active.len(), vertex_count);
        for &(idx, _) in &active {
            self.weights_at(idx)?;
        }

        let mut combined: Option<Vec<f64>> = None;
        for &(idx, passthrough) in &active {
            let weights = self.mask_cache.get(&self.ids[idx]).map_or(&[][..], |w| w.as_slice());
            let column = (0..vertex_count).map(|v| weights.get(v).copied().unwrap_or(passthrough));
            combined = Some(match combined {
                None => column.collect(),
                Some(mut acc) => {
                    for (a, w) in acc.iter_mut().zip(column) {
                        *a = mode.combine(*a, w);
                    }
                    acc
                }
            });
        }
        let combined = combined.unwrap_or_else(|| vec![1.0; vertex_count]);

        debug!(
            masks = active.len(),
            vertices = vertex_count,
            mode = ?mode,
            "Combined mask weights"
        );
        self.combined_cache.insert((mode, vertex_count), combined.clone());
        self.state = CacheState::Cached;
        Ok(combined)
    }

    /// Push combined weights, scaled by `global_strength`, into a host.
    pub fn apply_masks<H: DeformationHost>(
        &mut self,
        host: &mut H,
        mode: CombineMode,
        global_strength: f64,
    ) -> MaskResult<()> {
        let weights = self.calculate_combined_weights(host.vertex_count(), mode)?;
        for (v, w) in weights.iter().enumerate() {
            host.apply_weight(v as u32, w * global_strength);
        }
        Ok(())
    }

    /// Validate every mask against the bound islands (none if unbound).
    pub fn validate_all_masks(&self) -> ServiceValidation {
        let islands = self.context.as_ref().map(|c| c.islands()).unwrap_or(&[]);
        let mut result = ServiceValidation::default();
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for mask in &self.masks {
            let validation = mask.validate(islands);
            log_mask_validation(mask.name(), &validation);
            result.results.push((mask.name().to_string(), validation));
            *seen.entry(mask.name()).or_default() += 1;
        }

        for mask in &self.masks {
            if let Some(count) = seen.remove(mask.name())
                && count > 1
            {
                warn!(mask = mask.name(), count, "Duplicate mask name");
                result.duplicates.push(ValidationIssue::DuplicateMaskName {
                    name: mask.name().to_string(),
                });
            }
        }

        result
    }

    /// Take queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<MaskEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::island::UvIsland;
    use crate::mask::MaskType;
    use crate::types::{Uv, UvMesh};

    /// Two disjoint triangles, islands 0 and 1.
    fn context() -> MaskContext {
        let uvs = vec![
            Uv::new(0.0, 0.0),
            Uv::new(0.1, 0.0),
            Uv::new(0.0, 0.1),
            Uv::new(0.9, 0.9),
            Uv::new(1.0, 0.9),
            Uv::new(0.9, 1.0),
        ];
        let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[0, 1, 2], [3, 4, 5]]);
        let islands = vec![
            UvIsland::from_triangles(0, &mesh, vec![0]),
            UvIsland::from_triangles(1, &mesh, vec![1]),
        ];
        MaskContext::new(&mesh, islands)
    }

    #[test]
    fn test_add_rejects_duplicates_and_empty_names() {
        let mut service = MaskService::new();
        service.add_mask(Mask::new("a", MaskType::UvIsland)).unwrap();
        let err = service.add_mask(Mask::new("a", MaskType::VertexGroup)).unwrap_err();
        assert!(matches!(err, MaskError::DuplicateMask { .. }));
        let err = service.add_mask(Mask::new("  ", MaskType::UvIsland)).unwrap_err();
        assert!(matches!(err, MaskError::EmptyMaskName));
        assert_eq!(service.masks().len(), 1);
    }

    #[test]
    fn test_no_active_masks_passes_everything() {
        let mut service = MaskService::new();
        service.add_mask(Mask::new("empty", MaskType::UvIsland)).unwrap();
        let weights = service
            .calculate_combined_weights(4, CombineMode::Intersection)
            .unwrap();
        assert_eq!(weights, vec![1.0; 4]);
    }

    #[test]
    fn test_combine_modes() {
        let mut service = MaskService::new();
        service.set_context(context());
        service
            .add_mask(Mask::new("left", MaskType::UvIsland).with_islands([0]))
            .unwrap();
        service
            .add_mask(Mask::new("pin", MaskType::VertexGroup).with_vertices([0, 3]))
            .unwrap();

        let union = service.calculate_combined_weights(6, CombineMode::Union).unwrap();
        assert_eq!(union, vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        let inter = service
            .calculate_combined_weights(6, CombineMode::Intersection)
            .unwrap();
        assert_eq!(inter, vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let diff = service
            .calculate_combined_weights(6, CombineMode::Difference)
            .unwrap();
        assert_eq!(diff, vec![0.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(service.cache_state(), CacheState::Cached);
    }

    #[test]
    fn test_missing_context() {
        let mut service = MaskService::new();
        service
            .add_mask(Mask::new("m", MaskType::VertexGroup).with_vertices([0]))
            .unwrap();
        let err = service.mask_weights("m").unwrap_err();
        assert!(matches!(err, MaskError::MissingContext));
        assert!(service.calculate_combined_weights(3, CombineMode::Union).is_err());
    }

    #[test]
    fn test_modify_invalidates_and_emits_events() {
        let mut service = MaskService::new();
        service.set_context(context());
        service
            .add_mask(Mask::new("m", MaskType::UvIsland).with_islands([0]))
            .unwrap();
        assert_eq!(service.mask_weights("m").unwrap()[3], 0.0);
        service.calculate_combined_weights(6, CombineMode::Union).unwrap();
        assert_eq!(service.cache_state(), CacheState::Cached);

        service.modify_mask("m", |m| m.add_target_island(1)).unwrap();
        assert_eq!(service.cache_state(), CacheState::Dirty);
        assert_eq!(service.mask_weights("m").unwrap()[3], 1.0);

        assert_eq!(
            service.drain_events(),
            vec![
                MaskEvent::GeometryChanged,
                MaskEvent::MaskAdded("m".into()),
                MaskEvent::MaskModified("m".into()),
            ]
        );
        assert!(service.drain_events().is_empty());
        assert!(service.modify_mask("nope", |_| {}).is_err());
    }

    #[test]
    fn test_apply_masks_blends_vertices() {
        let mut service = MaskService::new();
        service.set_context(context());
        service
            .add_mask(Mask::new("m", MaskType::UvIsland).with_islands([1]))
            .unwrap();
        let original = vec![Point3::origin(); 6];
        let mut deformed = vec![Point3::new(0.0, 0.0, 2.0); 6];
        {
            let mut host = VertexBlend::new(&mut deformed, &original);
            service.apply_masks(&mut host, CombineMode::Union, 1.0).unwrap();
        }
        assert_eq!(deformed[0].z, 0.0);
        assert_eq!(deformed[4].z, 2.0);
    }

    #[test]
    fn test_validate_all_reports_stale_and_duplicates() {
        let mut service = MaskService::from_masks(vec![
            Mask::new("dup", MaskType::UvIsland).with_islands([0, 42]),
            Mask::new("dup", MaskType::VertexGroup).with_vertices([1]),
        ]);
        service.set_context(context());
        let report = service.validate_all_masks();
        assert!(!report.is_valid());
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.warning_count(), 1);
        let first = report.for_mask("dup").unwrap();
        assert_eq!(
            first.warnings,
            vec![ValidationIssue::StaleIslandReference { island_id: 42 }]
        );
    }

    #[test]
    fn test_same_name_masks_keep_their_own_weights() {
        let mut service = MaskService::from_masks(vec![
            Mask::new("dup", MaskType::UvIsland).with_islands([0]),
            Mask::new("dup", MaskType::UvIsland).with_islands([1]),
        ]);
        service.set_context(context());
        let union = service.calculate_combined_weights(6, CombineMode::Union).unwrap();
        assert_eq!(union, vec![1.0; 6]);
        let inter = service.calculate_combined_weights(6, CombineMode::Intersection).unwrap();
        assert_eq!(inter, vec![0.0; 6]);
        // Lookup by name resolves to the first registration
        assert_eq!(service.mask_weights("dup").unwrap(), &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_removed_then_readded_name_is_recomputed() {
        let mut service = MaskService::new();
        service.set_context(context());
        service.add_mask(Mask::new("m", MaskType::UvIsland).with_islands([0])).unwrap();
        assert_eq!(service.mask_weights("m").unwrap()[0], 1.0);
        service.remove_mask("m").unwrap();
        service.add_mask(Mask::new("m", MaskType::UvIsland).with_islands([1])).unwrap();
        let weights = service.mask_weights("m").unwrap();
        assert_eq!(weights[0], 0.0);
        assert_eq!(weights[3], 1.0);
    }

    #[test]
    fn test_remove_mask() {
        let mut service = MaskService::new();
        service.add_mask(Mask::new("m", MaskType::UvIsland)).unwrap();
        let removed = service.remove_mask("m").unwrap();
        assert_eq!(removed.name(), "m");
        assert!(service.remove_mask("m").is_err());
    }
}
