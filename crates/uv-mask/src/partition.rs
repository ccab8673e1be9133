//! Partitioning triangles into UV islands.
//!
//! Builds a triangle adjacency graph under a tolerance-based UV connectivity
//! relation, then floods it breadth-first from triangles in ascending index
//! order. Island ids follow discovery order and are reproducible for the same
//! input and parameters.
//!
//! Two relations are available:
//!
//! - [`PartitionAlgorithm::EdgeBased`]: triangles sharing a mesh edge (after
//!   welding seam-duplicated vertices by position) are connected when the edge
//!   is not collapsed in UV space and the triangles have a close UV pair.
//!   Optional vertex and centroid proximity passes recover charts joined only
//!   at a vertex or placed side by side.
//! - [`PartitionAlgorithm::Legacy`]: triangles sharing a (welded) vertex are
//!   connected whenever any UV of one comes within the tolerance of the other
//!   triangle's UV at that vertex, with no shared-edge requirement.
//!
//! `uv_tolerance` is the main tuning knob. Too small splits charts with UV
//! noise along seams; too large merges unrelated charts.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::{
    TriangleAdjacency, UvGrid, build_edge_to_faces, build_vertex_to_faces, face_edges,
    weld_positions, EdgeKey,
};
use crate::error::{MaskError, MaskResult};
use crate::geometry;
use crate::island::UvIsland;
use crate::progress::{ChunkProgress, ProgressCallback};
use crate::tracing_ext::{OperationTimer, log_analysis_stats};
use crate::types::{Uv, UvMesh};
use crate::validate::validate_uv_mesh_strict;

/// Adjacency relation used to connect triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PartitionAlgorithm {
    /// Shared-edge connectivity with optional proximity passes.
    #[default]
    EdgeBased,
    /// Any-UV-within-tolerance connectivity, kept for compatibility.
    Legacy,
}

/// Parameters for island partitioning.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartitionParams {
    /// UV distance within which two vertices count as coincident.
    /// Default: 0.001
    pub uv_tolerance: f64,

    /// UV length below which an edge counts as collapsed.
    /// Default: 1e-6
    pub degeneracy_tolerance: f64,

    /// 3D distance within which seam-duplicated vertices are welded.
    /// Zero disables welding. Default: 1e-6
    pub weld_tolerance: f64,

    /// Maximum number of islands before the analysis stops.
    /// Default: 10_000
    pub max_island_count: usize,

    /// Use vertex/edge indices and UV bucket grids instead of pairwise scans.
    /// Results are identical either way. Default: true
    pub optimize_performance: bool,

    /// Connectivity relation. Default: [`PartitionAlgorithm::EdgeBased`]
    pub algorithm: PartitionAlgorithm,

    /// Connect triangles sharing a vertex whose UVs there are close.
    /// Edge-based only. Default: true
    pub vertex_proximity_pass: bool,

    /// Connect triangles with close UV centroids and a close vertex pair.
    /// Edge-based only. Default: true
    pub centroid_proximity_pass: bool,

    /// Triangles with more neighbors than this are skipped by the proximity
    /// passes. Default: 20
    pub max_proximity_degree: usize,
}

impl Default for PartitionParams {
    fn default() -> Self {
        Self {
            uv_tolerance: 0.001,
            degeneracy_tolerance: geometry::DEFAULT_DEGENERACY_TOLERANCE,
            weld_tolerance: 1e-6,
            max_island_count: 10_000,
            optimize_performance: true,
            algorithm: PartitionAlgorithm::EdgeBased,
            vertex_proximity_pass: true,
            centroid_proximity_pass: true,
            max_proximity_degree: 20,
        }
    }
}

impl PartitionParams {
    /// Create params with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for clean, seam-exact UVs.
    pub fn for_clean_uvs() -> Self {
        Self {
            uv_tolerance: 0.001,
            ..Default::default()
        }
    }

    /// Preset for meshes with noise from UV seam reconstruction.
    pub fn for_noisy_uvs() -> Self {
        Self {
            uv_tolerance: 0.01,
            ..Default::default()
        }
    }

    /// Set the UV connectivity tolerance.
    pub fn with_uv_tolerance(mut self, tolerance: f64) -> Self {
        self.uv_tolerance = tolerance;
        self
    }

    /// Set the collapsed-edge tolerance.
    pub fn with_degeneracy_tolerance(mut self, tolerance: f64) -> Self {
        self.degeneracy_tolerance = tolerance;
        self
    }

    /// Set the position weld tolerance (0 disables welding).
    pub fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.weld_tolerance = tolerance;
        self
    }

    /// Set the island cap.
    pub fn with_max_island_count(mut self, max: usize) -> Self {
        self.max_island_count = max;
        self
    }

    /// Choose indexed lookups (`true`) or pairwise scans (`false`).
    pub fn with_optimize_performance(mut self, optimize: bool) -> Self {
        self.optimize_performance = optimize;
        self
    }

    /// Choose the connectivity relation.
    pub fn with_algorithm(mut self, algorithm: PartitionAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Enable or disable the vertex and centroid proximity passes.
    pub fn with_proximity_passes(mut self, vertex: bool, centroid: bool) -> Self {
        self.vertex_proximity_pass = vertex;
        self.centroid_proximity_pass = centroid;
        self
    }

    /// Set the proximity-pass degree cap.
    pub fn with_max_proximity_degree(mut self, degree: usize) -> Self {
        self.max_proximity_degree = degree;
        self
    }
}

/// Result of island partitioning.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IslandAnalysis {
    /// Islands in discovery order; `islands[i].id == i`.
    pub islands: Vec<UvIsland>,

    /// Number of triangles in the analyzed mesh.
    pub triangle_count: usize,

    /// The island cap stopped the analysis early.
    pub truncated: bool,

    /// A progress callback stopped the analysis early.
    pub cancelled: bool,

    /// Human-readable notes about partial results.
    pub warnings: Vec<String>,

    /// Triangles not assigned to any island.
    pub unassigned_triangles: usize,
}

impl IslandAnalysis {
    /// Every triangle belongs to exactly one island.
    pub fn is_complete(&self) -> bool {
        !self.truncated && !self.cancelled && self.unassigned_triangles == 0
    }

    /// Number of islands.
    pub fn island_count(&self) -> usize {
        self.islands.len()
    }

    /// Id of the island owning a triangle. Linear in the triangle count.
    pub fn island_of_triangle(&self, triangle: u32) -> Option<u32> {
        self.islands
            .iter()
            .find(|island| island.triangle_indices.contains(&triangle))
            .map(|island| island.id)
    }

    /// Island id per triangle (`None` for unassigned triangles).
    pub fn triangle_island_map(&self) -> Vec<Option<u32>> {
        let mut map = vec![None; self.triangle_count];
        for island in &self.islands {
            for &t in &island.triangle_indices {
                if let Some(slot) = map.get_mut(t as usize) {
                    *slot = Some(island.id);
                }
            }
        }
        map
    }

    /// Total triangles across all islands.
    pub fn total_triangles_assigned(&self) -> usize {
        self.islands.iter().map(|i| i.face_count()).sum()
    }
}

impl std::fmt::Display for IslandAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Island Analysis:")?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Islands: {}", self.islands.len())?;
        if !self.is_complete() {
            writeln!(
                f,
                "  Partial result: {} triangles unassigned{}{}",
                self.unassigned_triangles,
                if self.truncated { " (island cap reached)" } else { "" },
                if self.cancelled { " (cancelled)" } else { "" }
            )?;
        }
        for warning in &self.warnings {
            writeln!(f, "  Warning: {}", warning)?;
        }
        Ok(())
    }
}

/// Outcome of [`analyze_islands`]: never an `Err`, failures are captured.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// The analysis, empty on failure.
    pub analysis: IslandAnalysis,
    /// Why the analysis failed, if it did.
    pub error: Option<MaskError>,
}

impl AnalysisResult {
    /// True when the input was accepted.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Failure reason for display.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// Islands found (empty on failure).
    pub fn islands(&self) -> &[UvIsland] {
        &self.analysis.islands
    }

    /// Convert back into a `Result`.
    pub fn into_result(self) -> MaskResult<IslandAnalysis> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.analysis),
        }
    }
}

impl From<MaskResult<IslandAnalysis>> for AnalysisResult {
    fn from(result: MaskResult<IslandAnalysis>) -> Self {
        match result {
            Ok(analysis) => Self {
                analysis,
                error: None,
            },
            Err(error) => Self {
                analysis: IslandAnalysis::default(),
                error: Some(error),
            },
        }
    }
}

/// Partition all triangles of `mesh` into UV islands.
///
/// Submesh ranges are ignored; see [`partition_submeshes`] for per-submesh
/// analysis.
///
/// # Errors
/// Invalid input (no triangles, no UVs, out-of-range indices, non-finite UVs)
/// is rejected before any work is done.
///
/// # Example
/// ```
/// use nalgebra::Point2;
/// use uv_mask::{UvMesh, PartitionParams, partition_islands};
///
/// // Two quads far apart in UV space
/// let uvs = vec![
///     Point2::new(0.0, 0.0), Point2::new(0.4, 0.0), Point2::new(0.4, 0.4), Point2::new(0.0, 0.4),
///     Point2::new(0.6, 0.6), Point2::new(1.0, 0.6), Point2::new(1.0, 1.0), Point2::new(0.6, 1.0),
/// ];
/// let faces = vec![[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]];
/// let mesh = UvMesh::from_parts(Vec::new(), uvs, faces);
///
/// let analysis = partition_islands(&mesh, &PartitionParams::default()).unwrap();
/// assert_eq!(analysis.islands.len(), 2);
/// assert!(analysis.is_complete());
/// ```
pub fn partition_islands(mesh: &UvMesh, params: &PartitionParams) -> MaskResult<IslandAnalysis> {
    validate_uv_mesh_strict(mesh)?;
    let _timer = OperationTimer::for_mesh("partition_islands", mesh);

    let canonical = canonical_vertices(mesh, params);
    let triangles: Vec<u32> = (0..mesh.face_count() as u32).collect();
    let chunk = Chunk::new(mesh, canonical.as_deref(), &triangles, params);
    let labelled = chunk.label(0, params.max_island_count);

    let mut analysis = IslandAnalysis {
        islands: labelled.islands,
        triangle_count: mesh.face_count(),
        ..Default::default()
    };
    finish(&mut analysis, labelled.truncated, false, params);
    log_analysis_stats(&analysis, "partition_islands");
    Ok(analysis)
}

/// [`partition_islands`] with failures captured in the result.
pub fn analyze_islands(mesh: &UvMesh, params: &PartitionParams) -> AnalysisResult {
    let result = AnalysisResult::from(partition_islands(mesh, params));
    if let Some(err) = &result.error {
        warn!(code = %err.code(), "Island analysis rejected input: {}", err);
    }
    result
}

/// Partition each submesh independently, reporting progress between chunks.
///
/// Islands never span submeshes. Ids continue across chunks in submesh order;
/// triangles covered by no submesh form a final chunk. A triangle listed in
/// several submeshes belongs to the first. When `progress` returns `false`
/// the remaining chunks are skipped and the result is flagged `cancelled`.
pub fn partition_submeshes(
    mesh: &UvMesh,
    params: &PartitionParams,
    progress: Option<&ProgressCallback>,
) -> MaskResult<IslandAnalysis> {
    validate_uv_mesh_strict(mesh)?;
    let _timer = OperationTimer::for_mesh("partition_submeshes", mesh);

    let face_count = mesh.face_count();
    let mut claimed = vec![false; face_count];
    let mut chunks: Vec<Vec<u32>> = Vec::new();
    for range in mesh.submesh_ranges() {
        let chunk: Vec<u32> = range
            .triangles()
            .filter(|&t| !std::mem::replace(&mut claimed[t], true))
            .map(|t| t as u32)
            .collect();
        chunks.push(chunk);
    }
    let leftover: Vec<u32> = (0..face_count)
        .filter(|&t| !claimed[t])
        .map(|t| t as u32)
        .collect();
    if !leftover.is_empty() {
        debug!(triangles = leftover.len(), "Triangles outside every submesh");
        chunks.push(leftover);
    }

    let canonical = canonical_vertices(mesh, params);
    let mut analysis = IslandAnalysis {
        triangle_count: face_count,
        ..Default::default()
    };
    let mut truncated = false;
    let mut cancelled = false;
    let total = chunks.len();
    let mut reporter = ChunkProgress::new(progress, total, face_count);

    for (index, triangles) in chunks.iter().enumerate() {
        let budget = params.max_island_count.saturating_sub(analysis.islands.len());
        let chunk = Chunk::new(mesh, canonical.as_deref(), triangles, params);
        let labelled = chunk.label(analysis.islands.len() as u32, budget);
        analysis.islands.extend(labelled.islands);

        if labelled.truncated {
            truncated = true;
            break;
        }
        if !reporter.chunk_done(triangles.len(), analysis.islands.len()) && index + 1 < total {
            info!(completed = index + 1, total, "Submesh analysis cancelled");
            cancelled = true;
            break;
        }
    }

    finish(&mut analysis, truncated, cancelled, params);
    log_analysis_stats(&analysis, "partition_submeshes");
    Ok(analysis)
}

/// The triangle graph [`partition_islands`] floods, over the whole mesh.
///
/// Node `i` is triangle `i`; neighbor lists are sorted ascending.
pub fn build_triangle_adjacency(
    mesh: &UvMesh,
    params: &PartitionParams,
) -> MaskResult<TriangleAdjacency> {
    validate_uv_mesh_strict(mesh)?;
    let canonical = canonical_vertices(mesh, params);
    let triangles: Vec<u32> = (0..mesh.face_count() as u32).collect();
    let adjacency = Chunk::new(mesh, canonical.as_deref(), &triangles, params).build_adjacency();
    debug!(
        triangles = adjacency.triangle_count(),
        links = adjacency.link_count(),
        "Built triangle adjacency"
    );
    Ok(adjacency)
}

fn canonical_vertices(mesh: &UvMesh, params: &PartitionParams) -> Option<Vec<u32>> {
    if params.algorithm != PartitionAlgorithm::EdgeBased
        || params.weld_tolerance <= 0.0
        || !mesh.has_positions()
    {
        return None;
    }
    let canonical = weld_positions(&mesh.positions, params.weld_tolerance);
    let welded = canonical
        .iter()
        .enumerate()
        .filter(|&(i, &c)| i as u32 != c)
        .count();
    if welded > 0 {
        debug!(welded, "Welded seam-duplicated vertices by position");
    }
    Some(canonical)
}

fn finish(analysis: &mut IslandAnalysis, truncated: bool, cancelled: bool, params: &PartitionParams) {
    analysis.truncated = truncated;
    analysis.cancelled = cancelled;
    analysis.unassigned_triangles = analysis
        .triangle_count
        .saturating_sub(analysis.total_triangles_assigned());

    if truncated {
        let message = format!(
            "island limit of {} reached; {} triangles left unassigned",
            params.max_island_count, analysis.unassigned_triangles
        );
        warn!("{}", message);
        analysis.warnings.push(message);
    }
    if cancelled {
        analysis.warnings.push(format!(
            "analysis cancelled; {} triangles left unassigned",
            analysis.unassigned_triangles
        ));
    }
}

/// Islands labelled in one chunk.
struct Labelled {
    islands: Vec<UvIsland>,
    truncated: bool,
}

/// A set of triangles analyzed together. Local index `i` is `triangles[i]`.
struct Chunk<'a> {
    mesh: &'a UvMesh,
    triangles: &'a [u32],
    params: &'a PartitionParams,
    /// Canonical vertex ids per local triangle.
    canon: Vec<[u32; 3]>,
    /// UVs per local triangle, original winding.
    uvs: Vec<[Uv; 3]>,
}

impl<'a> Chunk<'a> {
    fn new(
        mesh: &'a UvMesh,
        canonical: Option<&[u32]>,
        triangles: &'a [u32],
        params: &'a PartitionParams,
    ) -> Self {
        let mut canon = Vec::with_capacity(triangles.len());
        let mut uvs = Vec::with_capacity(triangles.len());
        for &t in triangles {
            let face = mesh.faces[t as usize];
            canon.push(match canonical {
                Some(map) => [
                    map[face[0] as usize],
                    map[face[1] as usize],
                    map[face[2] as usize],
                ],
                None => face,
            });
            uvs.push([
                mesh.uvs[face[0] as usize],
                mesh.uvs[face[1] as usize],
                mesh.uvs[face[2] as usize],
            ]);
        }
        Self {
            mesh,
            triangles,
            params,
            canon,
            uvs,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.triangles.len()
    }

    fn build_adjacency(&self) -> TriangleAdjacency {
        let mut adjacency = TriangleAdjacency::new(self.len());
        match self.params.algorithm {
            PartitionAlgorithm::EdgeBased => {
                self.connect_shared_edges(&mut adjacency);
                if self.params.vertex_proximity_pass {
                    self.connect_shared_vertices(&mut adjacency);
                }
                if self.params.centroid_proximity_pass {
                    self.connect_close_centroids(&mut adjacency);
                }
            }
            PartitionAlgorithm::Legacy => self.connect_any_close_uv(&mut adjacency),
        }
        adjacency.sort_neighbors();
        adjacency
    }

    /// UVs of a canonical edge's endpoints within a local triangle.
    fn edge_uvs(&self, local: usize, edge: EdgeKey) -> Option<(Uv, Uv)> {
        let face = &self.canon[local];
        let a = face.iter().position(|&v| v == edge.0)?;
        let b = face.iter().position(|&v| v == edge.1)?;
        Some((self.uvs[local][a], self.uvs[local][b]))
    }

    fn has_close_pair(&self, a: usize, b: usize) -> bool {
        let tol = self.params.uv_tolerance;
        self.uvs[a]
            .iter()
            .any(|p| self.uvs[b].iter().any(|q| (p - q).norm() <= tol))
    }

    /// Edge-sharing triangles are UV-connected unless the edge is collapsed in
    /// either triangle.
    fn edge_connects(&self, a: usize, b: usize, edge: EdgeKey) -> bool {
        let (Some(ea), Some(eb)) = (self.edge_uvs(a, edge), self.edge_uvs(b, edge)) else {
            return false;
        };
        let deg = self.params.degeneracy_tolerance;
        if (ea.0 - ea.1).norm() <= deg || (eb.0 - eb.1).norm() <= deg {
            return false;
        }
        self.has_close_pair(a, b)
    }

    fn connect_shared_edges(&self, adjacency: &mut TriangleAdjacency) {
        let before = adjacency.link_count();
        if self.params.optimize_performance {
            for (edge, faces) in build_edge_to_faces(&self.canon, None) {
                for (i, &a) in faces.iter().enumerate() {
                    for &b in &faces[i + 1..] {
                        if !adjacency.are_connected(a, b)
                            && self.edge_connects(a as usize, b as usize, edge)
                        {
                            adjacency.connect(a, b);
                        }
                    }
                }
            }
        } else {
            for a in 0..self.len() {
                for b in a + 1..self.len() {
                    let shared = face_edges(&self.canon[a]).into_iter().any(|edge| {
                        edge.0 != edge.1
                            && face_edges(&self.canon[b]).contains(&edge)
                            && self.edge_connects(a, b, edge)
                    });
                    if shared {
                        adjacency.connect(a as u32, b as u32);
                    }
                }
            }
        }
        debug!(links = adjacency.link_count() - before, "Shared-edge pass");
    }

    fn connect_shared_vertices(&self, adjacency: &mut TriangleAdjacency) {
        let before = adjacency.link_count();
        let cap = self.params.max_proximity_degree;
        let tol = self.params.uv_tolerance;
        let vertex_faces = self
            .params
            .optimize_performance
            .then(|| build_vertex_to_faces(&self.canon, self.mesh.vertex_count(), None));

        for a in 0..self.len() {
            for slot in 0..3 {
                if adjacency.degree(a as u32) > cap {
                    break;
                }
                let vertex = self.canon[a][slot];
                let uv = self.uvs[a][slot];
                let candidates: Vec<u32> = match &vertex_faces {
                    Some(vf) => vf.get(vertex as usize).cloned().unwrap_or_default(),
                    None => (0..self.len() as u32)
                        .filter(|&b| self.canon[b as usize].contains(&vertex))
                        .collect(),
                };
                for b in candidates {
                    if b as usize == a || adjacency.degree(b) > cap {
                        continue;
                    }
                    let Some(other_slot) = self.canon[b as usize].iter().position(|&v| v == vertex)
                    else {
                        continue;
                    };
                    if (uv - self.uvs[b as usize][other_slot]).norm() <= tol {
                        adjacency.connect(a as u32, b);
                    }
                    if adjacency.degree(a as u32) > cap {
                        break;
                    }
                }
            }
        }
        debug!(links = adjacency.link_count() - before, "Vertex proximity pass");
    }

    fn connect_close_centroids(&self, adjacency: &mut TriangleAdjacency) {
        let before = adjacency.link_count();
        let cap = self.params.max_proximity_degree;
        let reach = 2.0 * self.params.uv_tolerance;
        let deg = self.params.degeneracy_tolerance;

        let centroids: Vec<Uv> = self
            .uvs
            .iter()
            .map(|[a, b, c]| geometry::triangle_centroid(a, b, c))
            .collect();
        let usable: Vec<bool> = self
            .uvs
            .iter()
            .map(|[a, b, c]| geometry::triangle_area(a, b, c) > deg * deg)
            .collect();

        let grid = self.params.optimize_performance.then(|| {
            let mut grid = UvGrid::new(reach);
            for (i, c) in centroids.iter().enumerate() {
                if usable[i] {
                    grid.insert(c, i as u32);
                }
            }
            grid
        });

        for a in 0..self.len() {
            if !usable[a] || adjacency.degree(a as u32) > cap {
                continue;
            }
            let mut candidates: Vec<u32> = match &grid {
                Some(grid) => grid
                    .query(&centroids[a], reach)
                    .filter(|&b| b as usize > a)
                    .collect(),
                None => (a as u32 + 1..self.len() as u32)
                    .filter(|&b| usable[b as usize])
                    .collect(),
            };
            candidates.sort_unstable();
            candidates.dedup();

            for b in candidates {
                if adjacency.degree(a as u32) > cap {
                    break;
                }
                if adjacency.degree(b) > cap {
                    continue;
                }
                if (centroids[a] - centroids[b as usize]).norm() <= reach
                    && self.has_close_pair(a, b as usize)
                {
                    adjacency.connect(a as u32, b);
                }
            }
        }
        debug!(links = adjacency.link_count() - before, "Centroid proximity pass");
    }

    /// For each corner, connect the triangles incident to that (welded)
    /// vertex which have any UV within tolerance of the corner's UV.
    fn connect_any_close_uv(&self, adjacency: &mut TriangleAdjacency) {
        let tol = self.params.uv_tolerance;
        let within = |p: &Uv, b: usize| self.uvs[b].iter().any(|q| (p - q).norm() < tol);
        let vertex_faces = self
            .params
            .optimize_performance
            .then(|| build_vertex_to_faces(&self.canon, self.mesh.vertex_count(), None));

        for a in 0..self.len() {
            for slot in 0..3 {
                let vertex = self.canon[a][slot];
                let p = &self.uvs[a][slot];
                let candidates: Vec<u32> = match &vertex_faces {
                    Some(vf) => vf.get(vertex as usize).cloned().unwrap_or_default(),
                    None => (0..self.len() as u32)
                        .filter(|&b| self.canon[b as usize].contains(&vertex))
                        .collect(),
                };
                for b in candidates {
                    if b as usize != a && within(p, b as usize) {
                        adjacency.connect(a as u32, b);
                    }
                }
            }
        }
        debug!(links = adjacency.link_count(), "Legacy UV proximity pass");
    }

    /// Flood the adjacency graph into at most `budget` islands, ids from
    /// `first_id`.
    fn label(&self, first_id: u32, budget: usize) -> Labelled {
        let adjacency = self.build_adjacency();
        let mut visited = vec![false; self.len()];
        let mut islands = Vec::new();
        let mut truncated = false;

        for seed in 0..self.len() {
            if visited[seed] {
                continue;
            }
            if islands.len() >= budget {
                truncated = true;
                break;
            }

            let mut members = Vec::new();
            let mut queue = VecDeque::from([seed as u32]);
            visited[seed] = true;
            while let Some(local) = queue.pop_front() {
                members.push(self.triangles[local as usize]);
                for &n in adjacency.neighbors(local) {
                    if !visited[n as usize] {
                        visited[n as usize] = true;
                        queue.push_back(n);
                    }
                }
            }

            let id = first_id + islands.len() as u32;
            islands.push(UvIsland::from_triangles(id, self.mesh, members));
        }

        Labelled { islands, truncated }
    }
}
