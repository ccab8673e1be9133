//! Core mesh view and UV-space data types.

use nalgebra::{Point2, Point3, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MaskError, MaskResult};
use crate::geometry;

/// A texture coordinate.
pub type Uv = Point2<f64>;

/// A contiguous range of triangles belonging to one material slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubmeshRange {
    /// First triangle index of the range.
    pub start: usize,
    /// Number of triangles in the range.
    pub count: usize,
}

impl SubmeshRange {
    /// Create a new submesh range.
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// One past the last triangle index.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.count
    }

    /// Iterate the triangle indices in this range.
    pub fn triangles(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }
}

/// Axis-aligned bounding box in UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UvBounds {
    /// Minimum corner.
    pub min: Uv,
    /// Maximum corner.
    pub max: Uv,
}

impl UvBounds {
    /// Create bounds from two corners.
    pub fn new(min: Uv, max: Uv) -> Self {
        Self { min, max }
    }

    /// Degenerate bounds around a single point.
    pub fn from_point(p: Uv) -> Self {
        Self { min: p, max: p }
    }

    /// Bounds of a point set, or `None` when it is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Uv>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::from_point(*first);
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// Grow the bounds to include a point.
    pub fn include(&mut self, p: &Uv) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Smallest bounds containing both.
    pub fn union(&self, other: &UvBounds) -> UvBounds {
        let mut out = *self;
        out.include(&other.min);
        out.include(&other.max);
        out
    }

    #[inline]
    pub fn center(&self) -> Uv {
        nalgebra::center(&self.min, &self.max)
    }

    #[inline]
    pub fn size(&self) -> Vector2<f64> {
        self.max - self.min
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Area of the box (not of the contents).
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Inclusive point test.
    #[inline]
    pub fn contains(&self, p: &Uv) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Inclusive overlap test.
    #[inline]
    pub fn intersects(&self, other: &UvBounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Bounds grown by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> UvBounds {
        UvBounds {
            min: Uv::new(self.min.x - margin, self.min.y - margin),
            max: Uv::new(self.max.x + margin, self.max.y + margin),
        }
    }
}

/// A read-only view of a triangle mesh with one UV per vertex.
///
/// Meshes with UV seams duplicate vertices along the seam, so `uvs` and
/// `positions` are always indexed by the same vertex index. `positions` may be
/// left empty when only UV data is available; seam welding is then skipped.
#[derive(Debug, Clone, Default)]
pub struct UvMesh {
    /// 3D vertex positions (empty, or one per UV).
    pub positions: Vec<Point3<f64>>,

    /// UV coordinates, one per vertex.
    pub uvs: Vec<Uv>,

    /// Triangles as indices into the vertex arrays.
    pub faces: Vec<[u32; 3]>,

    /// Optional material-slot partition of `faces`.
    pub submeshes: Vec<SubmeshRange>,
}

impl UvMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from positions, UVs and triangles.
    pub fn from_parts(positions: Vec<Point3<f64>>, uvs: Vec<Uv>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            uvs,
            faces,
            submeshes: Vec::new(),
        }
    }

    /// Build a mesh from a flattened triangle index list.
    ///
    /// Fails with [`MaskError::MalformedTriangles`] when the index count is not
    /// a multiple of 3.
    ///
    /// # Example
    /// ```
    /// use nalgebra::Point2;
    /// use uv_mask::UvMesh;
    ///
    /// let uvs = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
    /// let mesh = UvMesh::from_flat(Vec::new(), uvs, &[0, 1, 2]).unwrap();
    /// assert_eq!(mesh.face_count(), 1);
    ///
    /// assert!(UvMesh::from_flat(Vec::new(), Vec::new(), &[0, 1]).is_err());
    /// ```
    pub fn from_flat(
        positions: Vec<Point3<f64>>,
        uvs: Vec<Uv>,
        indices: &[u32],
    ) -> MaskResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(MaskError::malformed_triangles(indices.len()));
        }
        let faces = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(Self::from_parts(positions, uvs, faces))
    }

    /// Add a submesh range.
    pub fn with_submesh(mut self, start: usize, count: usize) -> Self {
        self.submeshes.push(SubmeshRange::new(start, count));
        self
    }

    /// Number of vertices (the UV count).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.uvs.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True when positions are available for seam welding.
    #[inline]
    pub fn has_positions(&self) -> bool {
        !self.positions.is_empty() && self.positions.len() == self.uvs.len()
    }

    /// The three UVs of a triangle in winding order.
    pub fn face_uvs(&self, face_idx: usize) -> Option<[Uv; 3]> {
        let face = self.faces.get(face_idx)?;
        Some([
            *self.uvs.get(face[0] as usize)?,
            *self.uvs.get(face[1] as usize)?,
            *self.uvs.get(face[2] as usize)?,
        ])
    }

    /// Unsigned UV-space area of a triangle.
    pub fn face_uv_area(&self, face_idx: usize) -> f64 {
        self.face_uvs(face_idx)
            .map(|[a, b, c]| geometry::triangle_area(&a, &b, &c))
            .unwrap_or(0.0)
    }

    /// UV centroid of a triangle.
    pub fn face_uv_centroid(&self, face_idx: usize) -> Option<Uv> {
        self.face_uvs(face_idx)
            .map(|[a, b, c]| geometry::triangle_centroid(&a, &b, &c))
    }

    /// Bounds of the whole UV channel.
    pub fn uv_bounds(&self) -> Option<UvBounds> {
        UvBounds::from_points(&self.uvs)
    }

    /// Submesh ranges, or a single range covering every triangle.
    pub fn submesh_ranges(&self) -> Vec<SubmeshRange> {
        if self.submeshes.is_empty() {
            vec![SubmeshRange::new(0, self.faces.len())]
        } else {
            self.submeshes.clone()
        }
    }
}
