//! UV island analysis and island-based vertex masking.
//!
//! This crate partitions the triangles of a mesh into UV islands, answers
//! geometric questions about those islands, and turns named selections of
//! islands and vertices ("masks") into per-vertex weights that gate a
//! deformation.
//!
//! # Features
//!
//! - **Partitioning**: tolerance-based UV adjacency with welding of
//!   seam-duplicated vertices, an optional spatial index, an island cap and
//!   per-submesh chunking with progress and cancellation
//! - **Island queries**: bounds, area, point containment, overlap, distance,
//!   merging and consolidation of touching islands
//! - **Selection**: UV point and screen point picking, selection state
//! - **Masks**: island and vertex-group masks with feathering, inversion,
//!   strength, validation and memoized weights
//! - **Service**: a mask registry that folds active masks (union,
//!   intersection, difference) and drives a deformation host
//!
//! # UV Conventions
//!
//! UVs are `Point2<f64>` with U to the right and V up. Nothing requires the
//! unit square; tiled (UDIM style) layouts work as long as tolerances are
//! chosen in the same units. One UV is stored per vertex, so a vertex split at
//! a UV seam appears twice in the vertex list with the same position.
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::Point2;
//! use uv_mask::{CombineMode, Mask, MaskContext, MaskService, MaskType, PartitionParams, UvMesh};
//!
//! // Two triangles far apart in UV space, no 3D positions needed
//! let uvs = vec![
//!     Point2::new(0.0, 0.0), Point2::new(0.3, 0.0), Point2::new(0.0, 0.3),
//!     Point2::new(0.7, 0.7), Point2::new(1.0, 0.7), Point2::new(0.7, 1.0),
//! ];
//! let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[0, 1, 2], [3, 4, 5]]);
//!
//! let analysis = mesh.partition_islands(&PartitionParams::default()).unwrap();
//! assert_eq!(analysis.island_count(), 2);
//!
//! let mut service = MaskService::new();
//! service.set_context(MaskContext::new(&mesh, analysis.islands));
//! service.add_mask(Mask::new("left", MaskType::UvIsland).with_islands([0])).unwrap();
//!
//! let weights = service.calculate_combined_weights(6, CombineMode::Union).unwrap();
//! assert_eq!(weights, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
//! ```
//!
//! # Common Workflows
//!
//! ## Noisy exports
//!
//! ```
//! use uv_mask::{PartitionParams, UvMesh};
//!
//! // Looser tolerances for meshes whose seams do not line up exactly
//! let params = PartitionParams::for_noisy_uvs().with_max_island_count(500);
//! let mesh = UvMesh::new();
//! assert!(mesh.partition_islands(&params).is_err()); // empty meshes are rejected
//! ```
//!
//! ## Per-material analysis
//!
//! ```no_run
//! use uv_mask::{PartitionParams, UvMesh, partition_submeshes};
//!
//! # let mesh = UvMesh::new();
//! let analysis = partition_submeshes(&mesh, &PartitionParams::default(), None).unwrap();
//! println!("{}", analysis);
//! ```
//!
//! ## Picking
//!
//! ```no_run
//! use nalgebra::Point2;
//! use uv_mask::{IslandSelection, PartitionParams, UvMesh};
//!
//! # let mesh = UvMesh::new();
//! let analysis = mesh.partition_islands(&PartitionParams::default()).unwrap();
//! let mut selection = IslandSelection::new();
//! selection.toggle_at_uv(&Point2::new(0.25, 0.5), &analysis.islands, &mesh);
//! ```
//!
//! # Logging
//!
//! All operations emit `tracing` events; see [`tracing_ext`] for the targets
//! and the subscriber setup.

mod error;
pub mod tracing_ext;
mod types;

#[cfg(test)]
mod edge_cases;

pub mod adjacency;
pub mod cache;
pub mod geometry;
pub mod island;
pub mod mask;
pub mod partition;
pub mod progress;
pub mod selection;
pub mod service;
pub mod validate;

// Re-export core types at crate root
pub use error::{
    ErrorCode, IssueSeverity, MaskError, MaskResult, RecoverySuggestion, ValidationIssue,
};
pub use types::{SubmeshRange, Uv, UvBounds, UvMesh};

pub use adjacency::{TriangleAdjacency, UvGrid, weld_positions};
pub use cache::{IslandCache, MeshKey};
pub use geometry::{is_point_in_triangle, is_point_in_triangle_with_tolerance};
pub use island::{
    IslandColor, UvIsland, consolidate_islands, find_adjacent_islands, group_adjacent_islands,
    merge_islands,
};
pub use mask::{FeatherMetric, Mask, MaskContext, MaskType, MaskValidation};
pub use partition::{
    AnalysisResult, IslandAnalysis, PartitionAlgorithm, PartitionParams, analyze_islands,
    build_triangle_adjacency, partition_islands, partition_submeshes,
};
pub use selection::{IslandSelection, NO_ISLAND, UvViewport, island_at_uv, island_index_at_uv};
pub use service::{
    CacheState, CombineMode, DeformationHost, MaskEvent, MaskService, ServiceValidation,
    VertexBlend,
};
pub use validate::{
    DataValidationResult, ValidationOptions, validate_uv_mesh, validate_uv_mesh_strict,
};

// Re-export progress tracking types for chunked analysis
pub use progress::{Progress, ProgressCallback};

// Re-export tracing extensions for structured logging and performance monitoring
pub use tracing_ext::{OperationTimer, log_analysis_stats, log_mask_validation};

// Convenience methods on UvMesh
impl UvMesh {
    /// Partition the triangles into UV islands.
    ///
    /// # Example
    ///
    /// ```
    /// use nalgebra::Point2;
    /// use uv_mask::{PartitionParams, UvMesh};
    ///
    /// let uvs = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
    /// let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[0, 1, 2]]);
    /// let analysis = mesh.partition_islands(&PartitionParams::default()).unwrap();
    /// assert_eq!(analysis.island_count(), 1);
    /// ```
    pub fn partition_islands(&self, params: &PartitionParams) -> MaskResult<IslandAnalysis> {
        partition::partition_islands(self, params)
    }

    /// Partition into islands, keeping any error next to an empty analysis.
    pub fn analyze_islands(&self, params: &PartitionParams) -> AnalysisResult {
        partition::analyze_islands(self, params)
    }

    /// Check UV and index data with default options.
    pub fn validate(&self) -> MaskResult<DataValidationResult> {
        validate::validate_uv_mesh(self, &ValidationOptions::default())
    }
}
