//! Edge case tests for analysis and masking robustness.
//!
//! Unusual inputs must produce an error or a well-formed result, never a
//! panic.

#[cfg(test)]
mod tests {
    use nalgebra::{Point2, Point3};

    use crate::island::{UvIsland, consolidate_islands, find_adjacent_islands};
    use crate::mask::{Mask, MaskContext, MaskType};
    use crate::partition::{PartitionAlgorithm, PartitionParams, partition_islands};
    use crate::selection::{IslandSelection, island_at_uv};
    use crate::service::{CombineMode, MaskService};
    use crate::validate::{ValidationOptions, validate_uv_mesh};
    use crate::{ErrorCode, MaskError, Uv, UvMesh};

    fn single_triangle() -> UvMesh {
        UvMesh::from_parts(
            Vec::new(),
            vec![Uv::new(0.0, 0.0), Uv::new(1.0, 0.0), Uv::new(0.0, 1.0)],
            vec![[0, 1, 2]],
        )
    }

    fn assert_total(mesh: &UvMesh, params: &PartitionParams) {
        let analysis = partition_islands(mesh, params).unwrap();
        let mut seen = vec![0usize; mesh.face_count()];
        for island in &analysis.islands {
            for &t in &island.triangle_indices {
                seen[t as usize] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1), "every triangle in exactly one island");
    }

    // ==================== Empty / Malformed Input ====================

    #[test]
    fn test_empty_mesh_rejected() {
        let err = partition_islands(&UvMesh::new(), &PartitionParams::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyMesh);
    }

    #[test]
    fn test_missing_uvs_rejected() {
        let mesh = UvMesh::from_parts(vec![Point3::origin(); 3], Vec::new(), vec![[0, 1, 2]]);
        let err = partition_islands(&mesh, &PartitionParams::default()).unwrap_err();
        assert!(matches!(err, MaskError::MissingUvs { .. }));
    }

    #[test]
    fn test_uv_count_mismatch_rejected() {
        let mut mesh = single_triangle();
        mesh.positions = vec![Point3::origin(); 2];
        let err = partition_islands(&mesh, &PartitionParams::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UvCountMismatch);
    }

    #[test]
    fn test_flat_index_not_multiple_of_three() {
        let err = UvMesh::from_flat(
            Vec::new(),
            vec![Uv::new(0.0, 0.0), Uv::new(1.0, 0.0), Uv::new(0.0, 1.0)],
            &[0, 1, 2, 0],
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedTriangles);
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let mut mesh = single_triangle();
        mesh.faces.push([0, 1, 9]);
        let err = partition_islands(&mesh, &PartitionParams::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
    }

    #[test]
    fn test_nan_uv_rejected_but_collectable() {
        let mut mesh = single_triangle();
        mesh.uvs[1] = Uv::new(f64::NAN, 0.0);
        assert!(partition_islands(&mesh, &PartitionParams::default()).is_err());

        let report = validate_uv_mesh(&mesh, &ValidationOptions::collect_all()).unwrap();
        assert_eq!(report.nan_count, 1);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_submesh_past_end_rejected() {
        let mesh = single_triangle().with_submesh(0, 5);
        let err = partition_islands(&mesh, &PartitionParams::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSubmesh);
    }

    // ==================== Degenerate Geometry ====================

    #[test]
    fn test_single_triangle_one_island() {
        let analysis = partition_islands(&single_triangle(), &PartitionParams::default()).unwrap();
        assert_eq!(analysis.island_count(), 1);
        assert_eq!(analysis.islands[0].triangle_indices, vec![0]);
    }

    #[test]
    fn test_fully_collapsed_triangles_still_assigned() {
        let mesh = UvMesh::from_parts(
            Vec::new(),
            vec![Uv::new(0.5, 0.5); 6],
            vec![[0, 1, 2], [3, 4, 5], [0, 1, 2]],
        );
        assert_total(&mesh, &PartitionParams::default());
        assert_total(&mesh, &PartitionParams::default().with_optimize_performance(false));
        assert_total(&mesh, &PartitionParams::default().with_algorithm(PartitionAlgorithm::Legacy));
    }

    #[test]
    fn test_triangle_with_repeated_vertex() {
        let mesh = UvMesh::from_parts(
            Vec::new(),
            vec![Uv::new(0.0, 0.0), Uv::new(1.0, 0.0), Uv::new(0.0, 1.0)],
            vec![[0, 0, 1], [0, 1, 2]],
        );
        assert_total(&mesh, &PartitionParams::default());
    }

    #[test]
    fn test_large_coordinates() {
        let mesh = UvMesh::from_parts(
            Vec::new(),
            vec![Uv::new(1e9, 1e9), Uv::new(1e9 + 1.0, 1e9), Uv::new(1e9, 1e9 + 1.0)],
            vec![[0, 1, 2]],
        );
        let analysis = partition_islands(&mesh, &PartitionParams::default()).unwrap();
        assert_eq!(analysis.island_count(), 1);
        assert!((analysis.islands[0].surface_uv_area(&mesh) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_island_cap() {
        let params = PartitionParams::default().with_max_island_count(0);
        let analysis = partition_islands(&single_triangle(), &params).unwrap();
        assert!(analysis.truncated);
        assert_eq!(analysis.island_count(), 0);
        assert_eq!(analysis.unassigned_triangles, 1);
        assert!(!analysis.warnings.is_empty());
    }

    #[test]
    fn test_zero_tolerance() {
        let params = PartitionParams::default()
            .with_uv_tolerance(0.0)
            .with_degeneracy_tolerance(0.0);
        assert_total(&single_triangle(), &params);
    }

    // ==================== Islands / Selection ====================

    #[test]
    fn test_empty_island_queries() {
        let mesh = single_triangle();
        let empty = UvIsland::new(0, Vec::new(), Vec::new(), Vec::new());
        assert_eq!(empty.uv_area(), 0.0);
        assert!(!empty.contains_point(&mesh, &Point2::new(0.1, 0.1)));
        assert!(empty.distance_to(&empty).is_infinite());
        assert!(find_adjacent_islands(&[], 0.1).is_empty());
        assert!(consolidate_islands(&[], 0.1).is_empty());
    }

    #[test]
    fn test_pick_with_no_islands() {
        let mesh = single_triangle();
        assert_eq!(island_at_uv(&Point2::new(0.1, 0.1), &[], &mesh), None);
        let mut selection = IslandSelection::new();
        assert_eq!(selection.toggle_at_uv(&Point2::new(0.1, 0.1), &[], &mesh), None);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_pick_on_edge_and_vertex() {
        let mesh = single_triangle();
        let islands = vec![UvIsland::from_triangles(0, &mesh, vec![0])];
        assert_eq!(island_at_uv(&Point2::new(0.5, 0.0), &islands, &mesh), Some(0));
        assert_eq!(island_at_uv(&Point2::new(0.0, 0.0), &islands, &mesh), Some(0));
        assert_eq!(island_at_uv(&Point2::new(0.6, 0.6), &islands, &mesh), None);
    }

    // ==================== Masks ====================

    #[test]
    fn test_mask_vertex_beyond_context() {
        let mesh = single_triangle();
        let ctx = MaskContext::new(&mesh, vec![UvIsland::from_triangles(0, &mesh, vec![0])]);
        let mut mask = Mask::new("far", MaskType::VertexGroup)
            .with_vertices([100])
            .with_feather(0.3);
        assert_eq!(mask.vertex_weight(0, &ctx), 0.0);
        assert_eq!(mask.vertex_weight(100, &ctx), 1.0);
        assert_eq!(mask.vertex_weight(101, &ctx), 0.0);
    }

    #[test]
    fn test_mask_with_only_stale_islands() {
        let mesh = single_triangle();
        let ctx = MaskContext::new(&mesh, vec![UvIsland::from_triangles(0, &mesh, vec![0])]);
        let mut mask = Mask::new("stale", MaskType::UvIsland)
            .with_islands([5])
            .with_feather(0.5);
        assert_eq!(mask.weights(&ctx), vec![0.0, 0.0, 0.0]);
        assert!(mask.validate(ctx.islands()).has_warnings());
    }

    #[test]
    fn test_combined_weights_longer_than_context() {
        let mesh = single_triangle();
        let mut service = MaskService::new();
        service.set_context(MaskContext::new(
            &mesh,
            vec![UvIsland::from_triangles(0, &mesh, vec![0])],
        ));
        service
            .add_mask(Mask::new("all", MaskType::UvIsland).with_islands([0]).with_inverted(true))
            .unwrap();
        let weights = service.calculate_combined_weights(5, CombineMode::Union).unwrap();
        // Unknown vertices take the inverted passthrough weight
        assert_eq!(weights, vec![0.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_nan_strength_disables_mask() {
        let mask = Mask::new("nan", MaskType::VertexGroup)
            .with_vertices([0])
            .with_strength(f64::NAN);
        assert_eq!(mask.strength(), 0.0);
        assert!(!mask.is_active());
    }
}
