//! UV islands and the queries built on them.
//!
//! A [`UvIsland`] is produced by [`crate::partition_islands`] and is immutable
//! afterwards except for its display name. Queries take the source
//! [`UvMesh`] where they need per-triangle UVs in original winding.

use std::borrow::Cow;
use std::collections::VecDeque;

use hashbrown::HashSet;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::types::{Uv, UvBounds, UvMesh};

/// Island count above which pairwise adjacency search logs a warning.
pub const ADJACENCY_WARN_ISLANDS: usize = 1000;

/// Coordinate-pair count above which overlap checks log at debug level.
const LARGE_PAIRWISE_WORK: usize = 1_000_000;

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// Display color for an island overlay, RGBA in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IslandColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl IslandColor {
    /// Saturation used for generated island colors.
    pub const SATURATION: f64 = 0.65;
    /// Value (brightness) used for generated island colors.
    pub const VALUE: f64 = 0.95;
    /// Overlay alpha used for generated island colors.
    pub const ALPHA: f32 = 0.5;

    /// Deterministic color for an island id via golden-ratio hue rotation.
    ///
    /// Consecutive ids land far apart on the hue circle.
    pub fn for_island(id: u32) -> Self {
        let hue = (id as f64 * GOLDEN_RATIO_CONJUGATE).fract();
        Self::from_hsv(hue, Self::SATURATION, Self::VALUE, Self::ALPHA)
    }

    /// Convert HSV (all in `[0, 1]`) to RGBA.
    pub fn from_hsv(h: f64, s: f64, v: f64, alpha: f32) -> Self {
        let h6 = (h.rem_euclid(1.0)) * 6.0;
        let sector = h6.floor();
        let f = h6 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self {
            r: r as f32,
            g: g as f32,
            b: b as f32,
            a: alpha,
        }
    }
}

/// A connected region of triangles in UV space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UvIsland {
    /// Discovery-order id, unique within one analysis.
    pub id: u32,

    /// Member vertex indices in discovery order, without duplicates.
    pub vertex_indices: Vec<u32>,

    /// Member triangle indices in discovery order.
    pub triangle_indices: Vec<u32>,

    /// UV of each entry in `vertex_indices`, same order.
    pub uv_coordinates: Vec<Uv>,

    /// Bounds of `uv_coordinates`.
    pub bounds: UvBounds,

    /// Overlay color derived from `id`.
    pub mask_color: IslandColor,

    /// User label; `None` displays as `"Island {id}"`.
    pub custom_name: Option<String>,
}

impl UvIsland {
    /// Build an island from parallel vertex/UV lists and its triangles.
    ///
    /// Bounds and color are derived. An island without coordinates gets
    /// degenerate bounds at the origin.
    pub fn new(
        id: u32,
        vertex_indices: Vec<u32>,
        triangle_indices: Vec<u32>,
        uv_coordinates: Vec<Uv>,
    ) -> Self {
        let bounds = UvBounds::from_points(&uv_coordinates)
            .unwrap_or_else(|| UvBounds::from_point(Uv::origin()));
        Self {
            id,
            vertex_indices,
            triangle_indices,
            uv_coordinates,
            bounds,
            mask_color: IslandColor::for_island(id),
            custom_name: None,
        }
    }

    /// Build an island from triangles in visit order, collecting vertices the
    /// first time each is seen.
    ///
    /// Triangle indices must be valid for `mesh`.
    pub fn from_triangles(id: u32, mesh: &UvMesh, triangle_indices: Vec<u32>) -> Self {
        let mut seen: HashSet<u32> = HashSet::with_capacity(triangle_indices.len() * 2);
        let mut vertex_indices = Vec::with_capacity(triangle_indices.len() + 2);
        let mut uv_coordinates = Vec::with_capacity(triangle_indices.len() + 2);

        for &tri in &triangle_indices {
            let Some(face) = mesh.faces.get(tri as usize) else {
                continue;
            };
            for &v in face {
                if let Some(uv) = mesh.uvs.get(v as usize)
                    && seen.insert(v)
                {
                    vertex_indices.push(v);
                    uv_coordinates.push(*uv);
                }
            }
        }

        Self::new(id, vertex_indices, triangle_indices, uv_coordinates)
    }

    /// Number of member triangles.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.triangle_indices.len()
    }

    /// Number of member vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_indices.len()
    }

    /// Label shown to users.
    pub fn display_name(&self) -> Cow<'_, str> {
        match &self.custom_name {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(format!("Island {}", self.id)),
        }
    }

    /// Set or clear the user label.
    pub fn set_custom_name(&mut self, name: Option<String>) {
        self.custom_name = name;
    }

    /// Center of the island bounds.
    #[inline]
    pub fn center(&self) -> Uv {
        self.bounds.center()
    }

    /// Shoelace area of `uv_coordinates` read as a polygon.
    ///
    /// The vertex list is in discovery order, not boundary order, so this is a
    /// rough size heuristic only. Use [`UvIsland::surface_uv_area`] for the
    /// exact covered area.
    pub fn uv_area(&self) -> f64 {
        geometry::shoelace_area(&self.uv_coordinates)
    }

    /// Sum of member triangle UV areas.
    pub fn surface_uv_area(&self, mesh: &UvMesh) -> f64 {
        self.triangle_indices
            .iter()
            .map(|&t| mesh.face_uv_area(t as usize))
            .sum()
    }

    /// Whether a vertex is a member. Linear in the island size.
    pub fn contains_vertex(&self, vertex: u32) -> bool {
        self.vertex_indices.contains(&vertex)
    }

    /// Whether a UV point lies on any member triangle (edges inclusive).
    ///
    /// Uses the mesh UVs in original winding rather than the de-duplicated
    /// coordinate list.
    pub fn contains_point(&self, mesh: &UvMesh, uv: &Uv) -> bool {
        if !self.bounds.contains(uv) {
            return false;
        }
        self.triangle_indices.iter().any(|&t| {
            mesh.face_uvs(t as usize)
                .is_some_and(|[a, b, c]| geometry::is_point_in_triangle(uv, &a, &b, &c))
        })
    }

    /// Whether any coordinate pair across the two islands is within `tolerance`.
    ///
    /// O(n·m) after the bounds check.
    pub fn overlaps_with(&self, other: &UvIsland, tolerance: f64) -> bool {
        if !self.bounds.expanded(tolerance).intersects(&other.bounds) {
            return false;
        }
        let work = self.uv_coordinates.len() * other.uv_coordinates.len();
        if work > LARGE_PAIRWISE_WORK {
            debug!(
                a = self.id,
                b = other.id,
                pairs = work,
                "Large pairwise island overlap check"
            );
        }
        let tol_sq = tolerance * tolerance;
        self.uv_coordinates.iter().any(|p| {
            other
                .uv_coordinates
                .iter()
                .any(|q| (p - q).norm_squared() <= tol_sq)
        })
    }

    /// Minimum UV distance between any two member coordinates.
    ///
    /// `f64::INFINITY` when either island has no coordinates.
    pub fn distance_to(&self, other: &UvIsland) -> f64 {
        let mut best_sq = f64::INFINITY;
        for p in &self.uv_coordinates {
            for q in &other.uv_coordinates {
                best_sq = best_sq.min((p - q).norm_squared());
            }
        }
        best_sq.sqrt()
    }

    /// Whether the islands are close enough to merge.
    #[inline]
    pub fn can_merge_with(&self, other: &UvIsland, tolerance: f64) -> bool {
        self.distance_to(other) <= tolerance
    }
}

/// Index pairs `(i, j)`, `i < j`, of islands within `tolerance` of each other.
///
/// Pairwise over all islands; warns above [`ADJACENCY_WARN_ISLANDS`].
pub fn find_adjacent_islands(islands: &[UvIsland], tolerance: f64) -> Vec<(usize, usize)> {
    if islands.len() > ADJACENCY_WARN_ISLANDS {
        warn!(
            islands = islands.len(),
            "Pairwise island adjacency on a very large island set"
        );
    }

    let mut pairs = Vec::new();
    for (i, a) in islands.iter().enumerate() {
        let reach = a.bounds.expanded(tolerance);
        for (j, b) in islands.iter().enumerate().skip(i + 1) {
            if reach.intersects(&b.bounds) && a.can_merge_with(b, tolerance) {
                pairs.push((i, j));
            }
        }
    }

    debug!(
        islands = islands.len(),
        pairs = pairs.len(),
        "Found adjacent island pairs"
    );
    pairs
}

/// Group island indices connected through `pairs`.
///
/// Every index in `0..island_count` appears in exactly one group. Groups are
/// ordered by their smallest member, members ascending.
pub fn group_adjacent_islands(island_count: usize, pairs: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); island_count];
    for &(a, b) in pairs {
        if a < island_count && b < island_count && a != b {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
    }

    let mut visited = vec![false; island_count];
    let mut groups = Vec::new();
    for start in 0..island_count {
        if visited[start] {
            continue;
        }
        let mut group = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(idx) = queue.pop_front() {
            group.push(idx);
            for &n in &neighbors[idx] {
                if !visited[n] {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }
        group.sort_unstable();
        groups.push(group);
    }
    groups
}

/// Union of several islands as one island with `new_id`.
///
/// Vertices and triangles keep first-seen order across the group; repeated
/// vertices keep their first UV.
pub fn merge_islands(group: &[&UvIsland], new_id: u32) -> UvIsland {
    let mut seen_vertices: HashSet<u32> = HashSet::new();
    let mut seen_triangles: HashSet<u32> = HashSet::new();
    let mut vertex_indices = Vec::new();
    let mut uv_coordinates = Vec::new();
    let mut triangle_indices = Vec::new();

    for island in group {
        for (&v, uv) in island.vertex_indices.iter().zip(&island.uv_coordinates) {
            if seen_vertices.insert(v) {
                vertex_indices.push(v);
                uv_coordinates.push(*uv);
            }
        }
        for &t in &island.triangle_indices {
            if seen_triangles.insert(t) {
                triangle_indices.push(t);
            }
        }
    }

    UvIsland::new(new_id, vertex_indices, triangle_indices, uv_coordinates)
}

/// Merge every group of islands within `tolerance` and renumber from 0.
///
/// A group keeps the custom name of its first member, only when it has a
/// single member.
pub fn consolidate_islands(islands: &[UvIsland], tolerance: f64) -> Vec<UvIsland> {
    let pairs = find_adjacent_islands(islands, tolerance);
    let groups = group_adjacent_islands(islands.len(), &pairs);

    let merged: Vec<UvIsland> = groups
        .iter()
        .enumerate()
        .map(|(new_id, group)| {
            let members: Vec<&UvIsland> = group.iter().map(|&i| &islands[i]).collect();
            let mut island = merge_islands(&members, new_id as u32);
            if let [only] = members.as_slice() {
                island.custom_name = only.custom_name.clone();
            }
            island
        })
        .collect();

    if merged.len() < islands.len() {
        info!(
            "Consolidated {} islands into {} (tolerance {})",
            islands.len(),
            merged.len(),
            tolerance
        );
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_quads() -> UvMesh {
        // Quad A at [0, 0.4]^2 and quad B at [0.6, 1]^2, not sharing vertices.
        let uvs = vec![
            Uv::new(0.0, 0.0),
            Uv::new(0.4, 0.0),
            Uv::new(0.4, 0.4),
            Uv::new(0.0, 0.4),
            Uv::new(0.6, 0.6),
            Uv::new(1.0, 0.6),
            Uv::new(1.0, 1.0),
            Uv::new(0.6, 1.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]];
        UvMesh::from_parts(Vec::new(), uvs, faces)
    }

    #[test]
    fn test_from_triangles_collects_discovery_order() {
        let mesh = two_quads();
        let island = UvIsland::from_triangles(0, &mesh, vec![1, 0]);
        assert_eq!(island.vertex_indices, vec![0, 2, 3, 1]);
        assert_eq!(island.uv_coordinates[1], Uv::new(0.4, 0.4));
        assert!(island.uv_coordinates.iter().all(|p| island.bounds.contains(p)));
        assert_eq!(island.display_name(), "Island 0");
    }

    #[test]
    fn test_custom_name() {
        let mesh = two_quads();
        let mut island = UvIsland::from_triangles(3, &mesh, vec![2]);
        island.set_custom_name(Some("Sleeve".into()));
        assert_eq!(island.display_name(), "Sleeve");
        island.set_custom_name(None);
        assert_eq!(island.display_name(), "Island 3");
    }

    #[test]
    fn test_areas() {
        let mesh = two_quads();
        let island = UvIsland::from_triangles(0, &mesh, vec![0, 1]);
        assert!((island.surface_uv_area(&mesh) - 0.16).abs() < 1e-12);
        // Discovery order 0,1,2,3 happens to be the boundary here.
        assert!((island.uv_area() - 0.16).abs() < 1e-12);
    }

    #[test]
    fn test_contains_point_uses_triangles() {
        let uvs = vec![Uv::new(0.0, 0.0), Uv::new(1.0, 0.0), Uv::new(0.0, 1.0)];
        let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[0, 1, 2]]);
        let island = UvIsland::from_triangles(0, &mesh, vec![0]);
        assert!(island.contains_point(&mesh, &Uv::new(0.2, 0.2)));
        // Inside the bounds but outside the triangle
        assert!(!island.contains_point(&mesh, &Uv::new(0.9, 0.9)));
        assert!(!island.contains_point(&mesh, &Uv::new(1.5, 0.0)));
    }

    #[test]
    fn test_distance_and_merge() {
        let mesh = two_quads();
        let a = UvIsland::from_triangles(0, &mesh, vec![0, 1]);
        let b = UvIsland::from_triangles(1, &mesh, vec![2, 3]);
        let expected = (0.2f64 * 0.2 * 2.0).sqrt();
        assert!((a.distance_to(&b) - expected).abs() < 1e-12);
        assert!(!a.can_merge_with(&b, 0.1));
        assert!(a.can_merge_with(&b, 0.3));
        assert!(!a.overlaps_with(&b, 0.1));
        assert!(a.overlaps_with(&b, 0.3));

        let empty = UvIsland::new(2, Vec::new(), Vec::new(), Vec::new());
        assert_eq!(a.distance_to(&empty), f64::INFINITY);
    }

    #[test]
    fn test_merge_deduplicates() {
        let mesh = two_quads();
        let a = UvIsland::from_triangles(0, &mesh, vec![0, 1]);
        let b = UvIsland::from_triangles(1, &mesh, vec![1, 2]);
        let merged = merge_islands(&[&a, &b], 7);
        assert_eq!(merged.id, 7);
        assert_eq!(merged.triangle_indices, vec![0, 1, 2]);
        assert_eq!(merged.vertex_indices, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(merged.vertex_indices.len(), merged.uv_coordinates.len());
    }

    #[test]
    fn test_grouping_and_consolidation() {
        let groups = group_adjacent_islands(5, &[(3, 1), (0, 4)]);
        assert_eq!(groups, vec![vec![0, 4], vec![1, 3], vec![2]]);

        let mesh = two_quads();
        let islands = vec![
            UvIsland::from_triangles(0, &mesh, vec![0, 1]),
            UvIsland::from_triangles(1, &mesh, vec![2, 3]),
        ];
        assert!(find_adjacent_islands(&islands, 0.1).is_empty());
        assert_eq!(consolidate_islands(&islands, 0.1).len(), 2);

        let merged = consolidate_islands(&islands, 0.5);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].face_count(), 4);
    }

    #[test]
    fn test_island_colors_are_distinct() {
        let a = IslandColor::for_island(0);
        let b = IslandColor::for_island(1);
        assert_ne!(a, b);
        assert_eq!(a, IslandColor::for_island(0));
        for c in [a, b, IslandColor::for_island(17)] {
            for ch in [c.r, c.g, c.b] {
                assert!((0.0..=1.0).contains(&ch));
            }
        }
    }
}
