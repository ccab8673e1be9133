//! Mesh data validation ahead of island analysis.
//!
//! Structural problems (no triangles, no UV channel, UV/position count
//! mismatch) are always fatal because nothing else can be checked. Per-element
//! problems (non-finite UVs, out-of-range indices, bad submesh ranges) are
//! either rejected on first sight or collected, depending on
//! [`ValidationOptions::reject_on_invalid`].

use tracing::{debug, warn};

use crate::error::{IssueSeverity, MaskError, MaskResult, ValidationIssue};
use crate::geometry;
use crate::types::UvMesh;

/// Options for mesh data validation.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Whether to reject the mesh on finding invalid data (default: true).
    /// If false, issues are collected but validation continues.
    pub reject_on_invalid: bool,
    /// Maximum number of issues to collect before stopping (default: 100).
    pub max_issues: usize,
    /// Report triangles with (near) zero UV area as informational issues
    /// (default: false).
    pub report_degenerate: bool,
    /// UV area below which a triangle counts as degenerate (default: 1e-6).
    pub degeneracy_tolerance: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            reject_on_invalid: true,
            max_issues: 100,
            report_degenerate: false,
            degeneracy_tolerance: geometry::DEFAULT_DEGENERACY_TOLERANCE,
        }
    }
}

impl ValidationOptions {
    /// Create options that collect all issues without rejecting.
    pub fn collect_all() -> Self {
        Self {
            reject_on_invalid: false,
            max_issues: 1000,
            report_degenerate: true,
            ..Default::default()
        }
    }
}

/// Result of mesh data validation.
#[derive(Debug, Clone, Default)]
pub struct DataValidationResult {
    /// Issues found during validation.
    pub issues: Vec<ValidationIssue>,
    /// Number of invalid vertex indices found.
    pub invalid_index_count: usize,
    /// Number of NaN UV components found.
    pub nan_count: usize,
    /// Number of infinite UV components found.
    pub infinity_count: usize,
    /// Number of submesh ranges outside the triangle list.
    pub invalid_submesh_count: usize,
    /// Number of triangles with (near) zero UV area.
    pub degenerate_count: usize,
}

impl DataValidationResult {
    /// True when no error-severity issue was found.
    ///
    /// Degenerate triangles are informational; they still belong to an island.
    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|i| i.severity() == IssueSeverity::Error)
    }

    /// Total number of issues found.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}

impl std::fmt::Display for DataValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "Data validation passed: no issues found");
        }
        writeln!(f, "Data validation found {} issue(s):", self.issue_count())?;
        if self.invalid_index_count > 0 {
            writeln!(f, "  - {} invalid vertex indices", self.invalid_index_count)?;
        }
        if self.nan_count > 0 {
            writeln!(f, "  - {} NaN UV components", self.nan_count)?;
        }
        if self.infinity_count > 0 {
            writeln!(f, "  - {} infinite UV components", self.infinity_count)?;
        }
        if self.invalid_submesh_count > 0 {
            writeln!(f, "  - {} invalid submesh ranges", self.invalid_submesh_count)?;
        }
        if self.degenerate_count > 0 {
            writeln!(f, "  - {} degenerate UV triangles", self.degenerate_count)?;
        }
        Ok(())
    }
}

fn check_structure(mesh: &UvMesh) -> MaskResult<()> {
    if mesh.faces.is_empty() {
        return Err(MaskError::empty_mesh("no triangles"));
    }
    if mesh.uvs.is_empty() {
        return Err(MaskError::MissingUvs {
            vertex_count: mesh.positions.len(),
        });
    }
    if !mesh.positions.is_empty() && mesh.positions.len() != mesh.uvs.len() {
        return Err(MaskError::UvCountMismatch {
            uv_count: mesh.uvs.len(),
            vertex_count: mesh.positions.len(),
        });
    }
    Ok(())
}

/// Validate mesh data for island analysis.
///
/// Checks, in order: structure, UV finiteness, triangle indices, submesh
/// ranges and (optionally) degenerate UV triangles.
///
/// # Returns
/// - `Ok(DataValidationResult)` - validation completed (check `is_valid()`)
/// - `Err(MaskError)` - a structural problem, or the first invalid element
///   when `reject_on_invalid` is set
///
/// # Example
/// ```
/// use nalgebra::Point2;
/// use uv_mask::UvMesh;
/// use uv_mask::validate::{validate_uv_mesh, ValidationOptions};
///
/// let uvs = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(f64::NAN, 1.0)];
/// let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[0, 1, 2], [0, 1, 9]]);
///
/// let report = validate_uv_mesh(&mesh, &ValidationOptions::collect_all()).unwrap();
/// assert!(!report.is_valid());
/// assert_eq!(report.nan_count, 1);
/// assert_eq!(report.invalid_index_count, 1);
///
/// assert!(validate_uv_mesh(&mesh, &ValidationOptions::default()).is_err());
/// ```
pub fn validate_uv_mesh(
    mesh: &UvMesh,
    options: &ValidationOptions,
) -> MaskResult<DataValidationResult> {
    check_structure(mesh)?;

    let mut result = DataValidationResult::default();
    let vertex_count = mesh.vertex_count();

    for (vertex_idx, uv) in mesh.uvs.iter().enumerate() {
        if result.issues.len() >= options.max_issues {
            break;
        }
        for (coord_name, value) in [("u", uv.x), ("v", uv.y)] {
            if value.is_nan() {
                result.nan_count += 1;
                result.issues.push(ValidationIssue::NaNUv {
                    vertex_index: vertex_idx,
                    coordinate: coord_name,
                });
            } else if value.is_infinite() {
                result.infinity_count += 1;
                result.issues.push(ValidationIssue::InfiniteUv {
                    vertex_index: vertex_idx,
                    coordinate: coord_name,
                    value,
                });
            } else {
                continue;
            }
            if options.reject_on_invalid {
                return Err(MaskError::invalid_uv(vertex_idx, coord_name, value));
            }
        }
    }

    for (face_idx, face) in mesh.faces.iter().enumerate() {
        if result.issues.len() >= options.max_issues {
            break;
        }
        for &vertex_idx in face {
            if vertex_idx as usize >= vertex_count {
                result.invalid_index_count += 1;
                result.issues.push(ValidationIssue::InvalidVertexIndex {
                    face_index: face_idx,
                    vertex_index: vertex_idx,
                    vertex_count,
                });
                if options.reject_on_invalid {
                    return Err(MaskError::invalid_vertex_index(
                        face_idx,
                        vertex_idx,
                        vertex_count,
                    ));
                }
            }
        }
    }

    let face_count = mesh.face_count();
    for (index, range) in mesh.submeshes.iter().enumerate() {
        if range.end() <= face_count {
            continue;
        }
        result.invalid_submesh_count += 1;
        result.issues.push(ValidationIssue::InvalidSubmesh {
            index,
            start: range.start,
            end: range.end(),
        });
        if options.reject_on_invalid {
            return Err(MaskError::InvalidSubmesh {
                index,
                start: range.start,
                end: range.end(),
                face_count,
            });
        }
    }

    if options.report_degenerate {
        for face_idx in 0..face_count {
            if result.issues.len() >= options.max_issues {
                break;
            }
            let Some([a, b, c]) = mesh.face_uvs(face_idx) else {
                continue;
            };
            let area = geometry::triangle_area(&a, &b, &c);
            if area < options.degeneracy_tolerance {
                result.degenerate_count += 1;
                result
                    .issues
                    .push(ValidationIssue::DegenerateUvTriangle { face_index: face_idx, area });
            }
        }
    }

    if result.is_valid() {
        debug!(
            degenerate = result.degenerate_count,
            "UV mesh data validation passed"
        );
    } else {
        warn!(
            "UV mesh data validation found {} issue(s): {} invalid indices, {} NaN, {} Inf, {} bad submeshes",
            result.issues.len(),
            result.invalid_index_count,
            result.nan_count,
            result.infinity_count,
            result.invalid_submesh_count
        );
    }

    Ok(result)
}

/// Validate mesh data with default options (rejects on first error).
pub fn validate_uv_mesh_strict(mesh: &UvMesh) -> MaskResult<()> {
    validate_uv_mesh(mesh, &ValidationOptions::default())?;
    Ok(())
}
