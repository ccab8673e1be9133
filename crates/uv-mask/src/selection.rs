//! Interactive island selection in UV space.
//!
//! Lookups scan islands in storage order and return the first hit. UV space
//! has no depth, so deliberately overlapping charts resolve to the lower
//! island index rather than the nearest or topmost one.

use nalgebra::{Point2, Vector2};
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::island::UvIsland;
use crate::types::{Uv, UvMesh};

/// Sentinel returned by [`island_index_at_uv`] when nothing is hit.
pub const NO_ISLAND: i64 = -1;

/// Id of the first island whose triangles contain `uv`.
///
/// # Example
/// ```
/// use nalgebra::Point2;
/// use uv_mask::{UvMesh, PartitionParams, island_at_uv, partition_islands};
///
/// let uvs = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
/// let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[0, 1, 2]]);
/// let analysis = partition_islands(&mesh, &PartitionParams::default()).unwrap();
///
/// assert_eq!(island_at_uv(&Point2::new(0.25, 0.25), &analysis.islands, &mesh), Some(0));
/// assert_eq!(island_at_uv(&Point2::new(0.9, 0.9), &analysis.islands, &mesh), None);
/// ```
pub fn island_at_uv(uv: &Uv, islands: &[UvIsland], mesh: &UvMesh) -> Option<u32> {
    let hit = islands
        .iter()
        .find(|island| island.contains_point(mesh, uv))
        .map(|island| island.id);
    trace!(u = uv.x, v = uv.y, island = ?hit, "UV pick");
    hit
}

/// [`island_at_uv`] returning [`NO_ISLAND`] instead of `None`.
pub fn island_index_at_uv(uv: &Uv, islands: &[UvIsland], mesh: &UvMesh) -> i64 {
    island_at_uv(uv, islands, mesh).map_or(NO_ISLAND, i64::from)
}

/// Maps between screen pixels and UV coordinates for a UV editor view.
///
/// The unit UV square fills `size` at zoom 1, centered, shifted by `pan` (in
/// UV units). V points up in UV space and screen y points down.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UvViewport {
    /// Top-left corner of the view in screen pixels.
    pub origin: Point2<f64>,
    /// Width and height of the view in screen pixels.
    pub size: Vector2<f64>,
    /// Magnification; 1 shows exactly the unit square.
    pub zoom: f64,
    /// UV offset of the view center from (0.5, 0.5).
    pub pan: Vector2<f64>,
}

impl UvViewport {
    /// A view at `origin` with the given pixel size, zoom 1, no pan.
    pub fn new(origin: Point2<f64>, width: f64, height: f64) -> Self {
        Self {
            origin,
            size: Vector2::new(width, height),
            zoom: 1.0,
            pan: Vector2::zeros(),
        }
    }

    /// Set the zoom factor.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the pan offset in UV units.
    pub fn with_pan(mut self, pan: Vector2<f64>) -> Self {
        self.pan = pan;
        self
    }

    fn is_usable(&self) -> bool {
        self.size.x > 0.0 && self.size.y > 0.0 && self.zoom > 0.0 && self.zoom.is_finite()
    }

    /// UV under a screen point, or `None` for an empty or unzoomable view.
    pub fn screen_to_uv(&self, screen: &Point2<f64>) -> Option<Uv> {
        if !self.is_usable() {
            return None;
        }
        let nx = (screen.x - self.origin.x) / self.size.x;
        let ny = (screen.y - self.origin.y) / self.size.y;
        Some(Uv::new(
            (nx - 0.5) / self.zoom + 0.5 + self.pan.x,
            (0.5 - ny) / self.zoom + 0.5 + self.pan.y,
        ))
    }

    /// Screen point showing a UV coordinate.
    pub fn uv_to_screen(&self, uv: &Uv) -> Option<Point2<f64>> {
        if !self.is_usable() {
            return None;
        }
        let nx = (uv.x - 0.5 - self.pan.x) * self.zoom + 0.5;
        let ny = 0.5 - (uv.y - 0.5 - self.pan.y) * self.zoom;
        Some(Point2::new(
            self.origin.x + nx * self.size.x,
            self.origin.y + ny * self.size.y,
        ))
    }

    /// Island under a screen point.
    pub fn island_at_screen(
        &self,
        screen: &Point2<f64>,
        islands: &[UvIsland],
        mesh: &UvMesh,
    ) -> Option<u32> {
        self.screen_to_uv(screen)
            .and_then(|uv| island_at_uv(&uv, islands, mesh))
    }
}

/// Selected island ids in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IslandSelection {
    selected: Vec<u32>,
}

impl IslandSelection {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_selected(&self, id: u32) -> bool {
        self.selected.contains(&id)
    }

    /// Add an island. Returns `false` if it was already selected.
    pub fn select(&mut self, id: u32) -> bool {
        if self.is_selected(id) {
            return false;
        }
        self.selected.push(id);
        true
    }

    /// Remove an island. Returns `false` if it was not selected.
    pub fn deselect(&mut self, id: u32) -> bool {
        let before = self.selected.len();
        self.selected.retain(|&s| s != id);
        self.selected.len() != before
    }

    /// Flip an island's selection. Returns whether it is now selected.
    pub fn toggle(&mut self, id: u32) -> bool {
        if self.deselect(id) {
            false
        } else {
            self.selected.push(id);
            true
        }
    }

    /// Toggle the island under `uv`, if any, and return its id.
    pub fn toggle_at_uv(&mut self, uv: &Uv, islands: &[UvIsland], mesh: &UvMesh) -> Option<u32> {
        let id = island_at_uv(uv, islands, mesh)?;
        self.toggle(id);
        Some(id)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> &[u32] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Vertices of the selected islands, first-seen order, no duplicates.
    pub fn selected_vertices(&self, islands: &[UvIsland]) -> Vec<u32> {
        let mut seen = hashbrown::HashSet::new();
        let mut vertices = Vec::new();
        for &id in &self.selected {
            if let Some(island) = islands.iter().find(|i| i.id == id) {
                vertices.extend(island.vertex_indices.iter().copied().filter(|v| seen.insert(*v)));
            }
        }
        vertices
    }

    /// Drop ids missing from `islands` (e.g. after re-analysis). Returns the
    /// number removed.
    pub fn retain_existing(&mut self, islands: &[UvIsland]) -> usize {
        let before = self.selected.len();
        self.selected
            .retain(|&id| islands.iter().any(|island| island.id == id));
        before - self.selected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_islands() -> (UvMesh, Vec<UvIsland>) {
        let uvs = vec![
            Uv::new(0.0, 0.0),
            Uv::new(0.5, 0.0),
            Uv::new(0.0, 0.5),
            Uv::new(0.0, 0.0),
            Uv::new(1.0, 0.0),
            Uv::new(0.0, 1.0),
        ];
        let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[0, 1, 2], [3, 4, 5]]);
        // Deliberately overlapping charts
        let islands = vec![
            UvIsland::from_triangles(0, &mesh, vec![0]),
            UvIsland::from_triangles(1, &mesh, vec![1]),
        ];
        (mesh, islands)
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let (mesh, islands) = two_islands();
        assert_eq!(island_at_uv(&Uv::new(0.1, 0.1), &islands, &mesh), Some(0));
        assert_eq!(island_at_uv(&Uv::new(0.6, 0.1), &islands, &mesh), Some(1));
        assert_eq!(island_index_at_uv(&Uv::new(0.9, 0.9), &islands, &mesh), NO_ISLAND);

        let reversed: Vec<UvIsland> = islands.iter().rev().cloned().collect();
        assert_eq!(island_at_uv(&Uv::new(0.1, 0.1), &reversed, &mesh), Some(1));
    }

    #[test]
    fn test_viewport_round_trip() {
        let view = UvViewport::new(Point2::new(10.0, 20.0), 200.0, 100.0)
            .with_zoom(2.0)
            .with_pan(Vector2::new(0.1, -0.2));
        let uv = Uv::new(0.3, 0.7);
        let screen = view.uv_to_screen(&uv).unwrap();
        let back = view.screen_to_uv(&screen).unwrap();
        assert!((back - uv).norm() < 1e-12);
    }

    #[test]
    fn test_viewport_axes() {
        let view = UvViewport::new(Point2::origin(), 100.0, 100.0);
        // Top-left of the view is UV (0, 1)
        let uv = view.screen_to_uv(&Point2::new(0.0, 0.0)).unwrap();
        assert!((uv - Uv::new(0.0, 1.0)).norm() < 1e-12);
        assert!(UvViewport::new(Point2::origin(), 0.0, 10.0)
            .screen_to_uv(&Point2::origin())
            .is_none());
    }

    #[test]
    fn test_selection_toggle_and_vertices() {
        let (mesh, islands) = two_islands();
        let mut selection = IslandSelection::new();
        assert!(selection.select(1));
        assert!(!selection.select(1));
        assert_eq!(selection.toggle_at_uv(&Uv::new(0.1, 0.1), &islands, &mesh), Some(0));
        assert_eq!(selection.ids(), &[1, 0]);
        assert_eq!(selection.selected_vertices(&islands), vec![3, 4, 5, 0, 1, 2]);
        assert!(!selection.toggle(1));
        assert_eq!(selection.len(), 1);
        assert!(selection.deselect(0));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain_existing() {
        let (_, islands) = two_islands();
        let mut selection = IslandSelection::new();
        selection.select(0);
        selection.select(9);
        assert_eq!(selection.retain_existing(&islands), 1);
        assert_eq!(selection.ids(), &[0]);
    }
}
