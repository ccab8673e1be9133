//! Triangle adjacency structures used by island partitioning.
//!
//! - [`weld_positions`] clusters seam-duplicated vertices by 3D position so
//!   that triangles on either side of a split vertex still see a shared edge.
//! - [`build_edge_to_faces`] / [`build_vertex_to_faces`] index incidence.
//! - [`UvGrid`] buckets UV points for tolerance-radius queries.
//! - [`TriangleAdjacency`] is the symmetric triangle graph flooded into islands.

use hashbrown::HashMap;
use nalgebra::{Point2, Point3};

/// Undirected edge key with the smaller vertex first.
pub type EdgeKey = (u32, u32);

/// Normalize an edge so the smaller vertex index comes first.
#[inline]
pub fn normalize_edge(v0: u32, v1: u32) -> EdgeKey {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}

/// The three edges of a triangle in winding order, normalized.
#[inline]
pub fn face_edges(face: &[u32; 3]) -> [EdgeKey; 3] {
    [
        normalize_edge(face[0], face[1]),
        normalize_edge(face[1], face[2]),
        normalize_edge(face[2], face[0]),
    ]
}

fn pos_to_cell(p: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}

/// Map every vertex to a canonical representative by position.
///
/// Vertices closer than `epsilon` share the smallest index of their cluster.
/// The input is not modified. With `epsilon <= 0` every vertex is its own
/// representative.
pub fn weld_positions(positions: &[Point3<f64>], epsilon: f64) -> Vec<u32> {
    let mut remap: Vec<u32> = (0..positions.len() as u32).collect();
    if positions.is_empty() || epsilon <= 0.0 {
        return remap;
    }

    let cell_size = epsilon * 2.0;
    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, p) in positions.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(p, cell_size))
            .or_default()
            .push(idx as u32);
    }

    for (idx, p) in positions.iter().enumerate() {
        let idx = idx as u32;
        if remap[idx as usize] != idx {
            continue;
        }
        let cell = pos_to_cell(p, cell_size);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = spatial_hash.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz))
                    else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || remap[other as usize] != other {
                            continue;
                        }
                        if (p - positions[other as usize]).norm() < epsilon {
                            remap[other as usize] = idx;
                        }
                    }
                }
            }
        }
    }

    // Resolve transitive merges (A->B, B->C => A->C)
    for i in 0..remap.len() {
        let mut target = remap[i];
        while remap[target as usize] != target {
            target = remap[target as usize];
        }
        remap[i] = target;
    }

    remap
}

/// Map each undirected edge to the triangles using it, in triangle order.
///
/// `canonical` remaps vertex indices before the edge key is formed (pass the
/// output of [`weld_positions`], or `None` to use raw indices).
pub fn build_edge_to_faces(
    faces: &[[u32; 3]],
    canonical: Option<&[u32]>,
) -> HashMap<EdgeKey, Vec<u32>> {
    let mut edge_to_faces: HashMap<EdgeKey, Vec<u32>> = HashMap::new();
    for (face_idx, face) in faces.iter().enumerate() {
        let face = canonical_face(face, canonical);
        for edge in face_edges(&face) {
            // Collapsed edges (both ends welded together) connect nothing.
            if edge.0 == edge.1 {
                continue;
            }
            let entry = edge_to_faces.entry(edge).or_default();
            if entry.last() != Some(&(face_idx as u32)) {
                entry.push(face_idx as u32);
            }
        }
    }
    edge_to_faces
}

/// For every vertex, the triangles that reference it (ascending, no repeats).
pub fn build_vertex_to_faces(
    faces: &[[u32; 3]],
    vertex_count: usize,
    canonical: Option<&[u32]>,
) -> Vec<Vec<u32>> {
    let mut vertex_faces: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
    for (face_idx, face) in faces.iter().enumerate() {
        for &v in &canonical_face(face, canonical) {
            if let Some(list) = vertex_faces.get_mut(v as usize)
                && list.last() != Some(&(face_idx as u32))
            {
                list.push(face_idx as u32);
            }
        }
    }
    vertex_faces
}

#[inline]
fn canonical_face(face: &[u32; 3], canonical: Option<&[u32]>) -> [u32; 3] {
    match canonical {
        Some(map) => [
            map.get(face[0] as usize).copied().unwrap_or(face[0]),
            map.get(face[1] as usize).copied().unwrap_or(face[1]),
            map.get(face[2] as usize).copied().unwrap_or(face[2]),
        ],
        None => *face,
    }
}

/// Uniform bucket grid over UV points for radius queries.
#[derive(Debug, Clone)]
pub struct UvGrid {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<u32>>,
}

impl UvGrid {
    /// Create an empty grid. `cell_size` is clamped away from zero.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1e-9),
            cells: HashMap::new(),
        }
    }

    #[inline]
    fn cell_of(&self, p: &Point2<f64>) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    /// Insert an item at a UV point.
    pub fn insert(&mut self, p: &Point2<f64>, item: u32) {
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(item);
    }

    /// Items whose cell touches the square of half-width `radius` around `p`.
    ///
    /// Candidates only; callers still compare actual distances.
    pub fn query(&self, p: &Point2<f64>, radius: f64) -> impl Iterator<Item = u32> + '_ {
        let lo = self.cell_of(&Point2::new(p.x - radius, p.y - radius));
        let hi = self.cell_of(&Point2::new(p.x + radius, p.y + radius));
        (lo.0..=hi.0)
            .flat_map(move |x| (lo.1..=hi.1).map(move |y| (x, y)))
            .filter_map(|cell| self.cells.get(&cell))
            .flat_map(|items| items.iter().copied())
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Symmetric triangle-to-triangle adjacency graph.
#[derive(Debug, Clone, Default)]
pub struct TriangleAdjacency {
    neighbors: Vec<Vec<u32>>,
    link_count: usize,
}

impl TriangleAdjacency {
    /// Graph with `triangle_count` isolated nodes.
    pub fn new(triangle_count: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); triangle_count],
            link_count: 0,
        }
    }

    /// Connect two triangles in both directions. Returns `false` when the link
    /// already existed, was a self-loop, or an index was out of range.
    pub fn connect(&mut self, a: u32, b: u32) -> bool {
        if a == b || a as usize >= self.neighbors.len() || b as usize >= self.neighbors.len() {
            return false;
        }
        if self.neighbors[a as usize].contains(&b) {
            return false;
        }
        self.neighbors[a as usize].push(b);
        self.neighbors[b as usize].push(a);
        self.link_count += 1;
        true
    }

    /// Whether two triangles are directly connected.
    pub fn are_connected(&self, a: u32, b: u32) -> bool {
        self.neighbors
            .get(a as usize)
            .is_some_and(|n| n.contains(&b))
    }

    /// Neighbors of a triangle, in insertion order.
    pub fn neighbors(&self, triangle: u32) -> &[u32] {
        self.neighbors
            .get(triangle as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of neighbors of a triangle.
    pub fn degree(&self, triangle: u32) -> usize {
        self.neighbors(triangle).len()
    }

    /// Number of triangles (nodes).
    pub fn triangle_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of undirected links.
    pub fn link_count(&self) -> usize {
        self.link_count
    }

    /// Sort every neighbor list ascending so traversal order depends only on
    /// the link set, not on the order links were found.
    pub fn sort_neighbors(&mut self) {
        for list in &mut self.neighbors {
            list.sort_unstable();
        }
    }

    /// Check that every link is mirrored.
    pub fn is_symmetric(&self) -> bool {
        self.neighbors.iter().enumerate().all(|(a, list)| {
            list.iter()
                .all(|&b| self.neighbors[b as usize].contains(&(a as u32)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_edge() {
        assert_eq!(normalize_edge(5, 2), (2, 5));
        assert_eq!(normalize_edge(2, 5), (2, 5));
        assert_eq!(face_edges(&[3, 1, 2]), [(1, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_weld_positions_merges_coincident() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1e-9),
        ];
        assert_eq!(weld_positions(&positions, 1e-6), vec![0, 1, 0, 1]);
        assert_eq!(weld_positions(&positions, 0.0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_edge_to_faces_shared_edge() {
        let faces = [[0, 1, 2], [2, 1, 3]];
        let map = build_edge_to_faces(&faces, None);
        assert_eq!(map.get(&(1, 2)), Some(&vec![0, 1]));
        assert_eq!(map.get(&(0, 1)), Some(&vec![0]));
    }

    #[test]
    fn test_edge_to_faces_with_canonical_map() {
        // Second triangle uses duplicates 4, 5 of vertices 1, 2.
        let faces = [[0, 1, 2], [5, 4, 3]];
        let canonical = [0, 1, 2, 3, 1, 2];
        let map = build_edge_to_faces(&faces, Some(&canonical));
        assert_eq!(map.get(&(1, 2)), Some(&vec![0, 1]));
    }

    #[test]
    fn test_vertex_to_faces() {
        let faces = [[0, 1, 2], [2, 1, 3]];
        let vf = build_vertex_to_faces(&faces, 4, None);
        assert_eq!(vf[1], vec![0, 1]);
        assert_eq!(vf[3], vec![1]);
    }

    #[test]
    fn test_uv_grid_query() {
        let mut grid = UvGrid::new(0.1);
        grid.insert(&Point2::new(0.05, 0.05), 0);
        grid.insert(&Point2::new(0.55, 0.55), 1);
        let near: Vec<u32> = grid.query(&Point2::new(0.09, 0.09), 0.02).collect();
        assert_eq!(near, vec![0]);
        assert_eq!(grid.cell_count(), 2);
    }

    #[test]
    fn test_adjacency_is_symmetric_and_deduplicated() {
        let mut adj = TriangleAdjacency::new(3);
        assert!(adj.connect(0, 1));
        assert!(!adj.connect(1, 0));
        assert!(!adj.connect(2, 2));
        assert!(!adj.connect(0, 9));
        assert!(adj.are_connected(1, 0));
        assert_eq!(adj.link_count(), 1);
        assert!(adj.is_symmetric());
        assert_eq!(adj.degree(2), 0);
    }
}
