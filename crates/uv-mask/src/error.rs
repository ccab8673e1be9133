//! Error types for island analysis and masking with rich diagnostics.
//!
//! This module provides:
//! - Machine-readable error codes for programmatic handling
//! - Context about which face, vertex or mask went wrong
//! - Recovery suggestions for common issues
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `UVM-XXXX`:
//! - `UVM-1xxx`: Input errors (empty mesh, missing UVs, malformed triangles)
//! - `UVM-2xxx`: Analysis warnings surfaced as issues (degenerate data, caps)
//! - `UVM-3xxx`: Mask configuration errors
//! - `UVM-4xxx`: Mask service errors
//!
//! # Example
//!
//! ```
//! use uv_mask::{ErrorCode, MaskError};
//!
//! let err = MaskError::malformed_triangles(7);
//! assert_eq!(err.code(), ErrorCode::MalformedTriangles);
//! assert_eq!(err.code().as_str(), "UVM-1004");
//! ```

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for analysis and masking operations.
pub type MaskResult<T> = Result<T, MaskError>;

/// Machine-readable error codes.
///
/// Codes follow the pattern `UVM-XXXX` where:
/// - 1xxx = Input errors
/// - 2xxx = Analysis issues
/// - 3xxx = Mask errors
/// - 4xxx = Service errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input errors (1xxx)
    /// UVM-1001: Mesh has no triangles
    EmptyMesh = 1001,
    /// UVM-1002: Mesh has no UV channel
    MissingUvs = 1002,
    /// UVM-1003: UV count does not match vertex count
    UvCountMismatch = 1003,
    /// UVM-1004: Triangle index array length is not a multiple of 3
    MalformedTriangles = 1004,
    /// UVM-1005: Triangle references a vertex that does not exist
    InvalidVertexIndex = 1005,
    /// UVM-1006: UV coordinate is NaN or infinite
    InvalidUvCoordinate = 1006,
    /// UVM-1007: Submesh range lies outside the triangle list
    InvalidSubmesh = 1007,

    // Analysis issues (2xxx)
    /// UVM-2001: Triangle is degenerate in UV space
    DegenerateUvTriangle = 2001,
    /// UVM-2002: Island cap reached before every triangle was assigned
    IslandLimitReached = 2002,

    // Mask errors (3xxx)
    /// UVM-3001: Mask has an empty name
    EmptyMaskName = 3001,
    /// UVM-3002: Mask strength is not positive
    InvalidStrength = 3002,
    /// UVM-3003: Mask type has no weight computation
    UnsupportedMaskType = 3003,
    /// UVM-3004: Mask selects nothing
    NoTargets = 3004,
    /// UVM-3005: Mask targets an island that no longer exists
    StaleIslandReference = 3005,

    // Service errors (4xxx)
    /// UVM-4001: A mask with the same name already exists
    DuplicateMask = 4001,
    /// UVM-4002: No mask with the requested name
    MaskNotFound = 4002,
    /// UVM-4003: Weights requested before geometry was bound
    MissingContext = 4003,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `UVM-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyMesh => "UVM-1001",
            ErrorCode::MissingUvs => "UVM-1002",
            ErrorCode::UvCountMismatch => "UVM-1003",
            ErrorCode::MalformedTriangles => "UVM-1004",
            ErrorCode::InvalidVertexIndex => "UVM-1005",
            ErrorCode::InvalidUvCoordinate => "UVM-1006",
            ErrorCode::InvalidSubmesh => "UVM-1007",
            ErrorCode::DegenerateUvTriangle => "UVM-2001",
            ErrorCode::IslandLimitReached => "UVM-2002",
            ErrorCode::EmptyMaskName => "UVM-3001",
            ErrorCode::InvalidStrength => "UVM-3002",
            ErrorCode::UnsupportedMaskType => "UVM-3003",
            ErrorCode::NoTargets => "UVM-3004",
            ErrorCode::StaleIslandReference => "UVM-3005",
            ErrorCode::DuplicateMask => "UVM-4001",
            ErrorCode::MaskNotFound => "UVM-4002",
            ErrorCode::MissingContext => "UVM-4003",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Re-export the mesh with a UV channel or different settings.
    ReexportMesh { details: String },
    /// Check the input data before calling the analysis.
    CheckInput { checks: Vec<String> },
    /// Adjust parameters for the operation.
    AdjustParameters { parameters: Vec<(String, String)> },
    /// Re-run island analysis and refresh stale references.
    Reanalyze,
    /// Pick a different name or remove the existing entry.
    Rename { name: String },
    /// No automatic recovery available.
    None,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ReexportMesh { details } => {
                write!(f, "Re-export the mesh: {}", details)
            }
            RecoverySuggestion::CheckInput { checks } => {
                write!(f, "Check the input for: {}", checks.join(", "))
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
            RecoverySuggestion::Reanalyze => {
                write!(f, "Re-run island analysis and update mask targets")
            }
            RecoverySuggestion::Rename { name } => {
                write!(f, "Use a name other than '{}' or remove the existing mask", name)
            }
            RecoverySuggestion::None => write!(f, "No automatic recovery available"),
        }
    }
}

/// Errors that can occur during island analysis and masking.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum MaskError {
    /// Mesh has no triangles to analyze.
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(uv_mask::input::empty),
        help("The mesh must have at least one triangle and one UV per vertex.")
    )]
    EmptyMesh { details: String },

    /// Mesh has no UV channel.
    #[error("mesh has no UV coordinates ({vertex_count} vertices)")]
    #[diagnostic(
        code(uv_mask::input::missing_uvs),
        help("Island analysis needs a UV channel. Unwrap the mesh or pick another UV set.")
    )]
    MissingUvs { vertex_count: usize },

    /// UV count does not match the vertex count.
    #[error("UV count {uv_count} does not match vertex count {vertex_count}")]
    #[diagnostic(
        code(uv_mask::input::uv_count),
        help("Exactly one UV coordinate per vertex is required.")
    )]
    UvCountMismatch { uv_count: usize, vertex_count: usize },

    /// Flattened triangle index array is not made of whole triangles.
    #[error("triangle index array has length {len}, which is not a multiple of 3")]
    #[diagnostic(
        code(uv_mask::input::malformed_triangles),
        help("Pass a flattened list of vertex index triples.")
    )]
    MalformedTriangles { len: usize },

    /// Triangle references a vertex that does not exist.
    #[error(
        "invalid vertex index: triangle {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(uv_mask::input::vertex_index),
        help("Check the index buffer; every index must be below the vertex count.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// UV coordinate is NaN or infinite.
    #[error("invalid UV at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(uv_mask::input::uv_coordinate),
        help("Non-finite UVs usually come from a broken unwrap; re-export the UV channel.")
    )]
    InvalidUvCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// Submesh range lies outside the triangle list.
    #[error("submesh {index} covers triangles {start}..{end}, but mesh has {face_count}")]
    #[diagnostic(code(uv_mask::input::submesh))]
    InvalidSubmesh {
        index: usize,
        start: usize,
        end: usize,
        face_count: usize,
    },

    /// Mask name is empty.
    #[error("mask name must not be empty")]
    #[diagnostic(code(uv_mask::mask::empty_name))]
    EmptyMaskName,

    /// Mask strength is not positive.
    #[error("mask '{name}' has non-positive strength {strength}")]
    #[diagnostic(
        code(uv_mask::mask::strength),
        help("Strength must be in (0, 1]; a zero-strength mask has no effect.")
    )]
    InvalidStrength { name: String, strength: f64 },

    /// Mask type has no weight computation.
    #[error("mask '{name}' uses unsupported type {mask_type}")]
    #[diagnostic(
        code(uv_mask::mask::unsupported_type),
        help("Only UvIsland and VertexGroup masks produce weights.")
    )]
    UnsupportedMaskType { name: String, mask_type: String },

    /// A mask with this name already exists.
    #[error("a mask named '{name}' already exists")]
    #[diagnostic(code(uv_mask::service::duplicate))]
    DuplicateMask { name: String },

    /// No mask with this name.
    #[error("no mask named '{name}'")]
    #[diagnostic(code(uv_mask::service::not_found))]
    MaskNotFound { name: String },

    /// Weights were requested before geometry was bound.
    #[error("mask weights requested before mesh and islands were bound")]
    #[diagnostic(
        code(uv_mask::service::missing_context),
        help("Call MaskService::set_context with the analyzed mesh first.")
    )]
    MissingContext,
}

impl MaskError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MaskError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            MaskError::MissingUvs { .. } => ErrorCode::MissingUvs,
            MaskError::UvCountMismatch { .. } => ErrorCode::UvCountMismatch,
            MaskError::MalformedTriangles { .. } => ErrorCode::MalformedTriangles,
            MaskError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            MaskError::InvalidUvCoordinate { .. } => ErrorCode::InvalidUvCoordinate,
            MaskError::InvalidSubmesh { .. } => ErrorCode::InvalidSubmesh,
            MaskError::EmptyMaskName => ErrorCode::EmptyMaskName,
            MaskError::InvalidStrength { .. } => ErrorCode::InvalidStrength,
            MaskError::UnsupportedMaskType { .. } => ErrorCode::UnsupportedMaskType,
            MaskError::DuplicateMask { .. } => ErrorCode::DuplicateMask,
            MaskError::MaskNotFound { .. } => ErrorCode::MaskNotFound,
            MaskError::MissingContext => ErrorCode::MissingContext,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            MaskError::EmptyMesh { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["mesh has triangles".into(), "submesh selection".into()],
            },
            MaskError::MissingUvs { .. } | MaskError::UvCountMismatch { .. } => {
                RecoverySuggestion::ReexportMesh {
                    details: "include one UV channel with a coordinate per vertex".into(),
                }
            }
            MaskError::MalformedTriangles { .. } | MaskError::InvalidVertexIndex { .. } => {
                RecoverySuggestion::CheckInput {
                    checks: vec!["index buffer length".into(), "index range".into()],
                }
            }
            MaskError::InvalidUvCoordinate { .. } => RecoverySuggestion::ReexportMesh {
                details: "UV channel contains NaN or infinite values".into(),
            },
            MaskError::InvalidSubmesh { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["submesh start and count".into()],
            },
            MaskError::EmptyMaskName => RecoverySuggestion::Rename {
                name: String::new(),
            },
            MaskError::InvalidStrength { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![("strength".into(), "a value in (0, 1]".into())],
            },
            MaskError::UnsupportedMaskType { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![("mask_type".into(), "UvIsland or VertexGroup".into())],
            },
            MaskError::DuplicateMask { name } => RecoverySuggestion::Rename { name: name.clone() },
            MaskError::MaskNotFound { .. } => RecoverySuggestion::None,
            MaskError::MissingContext => RecoverySuggestion::Reanalyze,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an EmptyMesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        MaskError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create a MalformedTriangles error.
    pub fn malformed_triangles(len: usize) -> Self {
        MaskError::MalformedTriangles { len }
    }

    /// Create an InvalidVertexIndex error.
    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        MaskError::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }

    /// Create an InvalidUvCoordinate error.
    pub fn invalid_uv(vertex_index: usize, coordinate: &'static str, value: f64) -> Self {
        MaskError::InvalidUvCoordinate {
            vertex_index,
            coordinate,
            value,
        }
    }

    /// Create a DuplicateMask error.
    pub fn duplicate_mask(name: impl Into<String>) -> Self {
        MaskError::DuplicateMask { name: name.into() }
    }

    /// Create a MaskNotFound error.
    pub fn mask_not_found(name: impl Into<String>) -> Self {
        MaskError::MaskNotFound { name: name.into() }
    }
}

/// Issues collected during validation.
///
/// Unlike `MaskError`, these may be warnings, and several can be collected
/// without stopping validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Triangle references a vertex index that doesn't exist.
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },
    /// UV coordinate is NaN.
    NaNUv {
        vertex_index: usize,
        coordinate: &'static str,
    },
    /// UV coordinate is infinite.
    InfiniteUv {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },
    /// Triangle has (near) zero area in UV space.
    DegenerateUvTriangle { face_index: usize, area: f64 },
    /// Submesh range lies outside the triangle list.
    InvalidSubmesh {
        index: usize,
        start: usize,
        end: usize,
    },
    /// Mask name is empty.
    EmptyMaskName,
    /// Mask strength is zero or negative.
    NonPositiveStrength { strength: f64 },
    /// Mask type has no weight computation.
    UnsupportedMaskType { mask_type: String },
    /// Mask selects neither islands nor vertices.
    NoTargets,
    /// Mask targets an island id missing from the current island set.
    StaleIslandReference { island_id: u32 },
    /// Two masks share a name.
    DuplicateMaskName { name: String },
}

impl ValidationIssue {
    /// Returns a severity level for the issue.
    pub fn severity(&self) -> IssueSeverity {
        match self {
            ValidationIssue::InvalidVertexIndex { .. } => IssueSeverity::Error,
            ValidationIssue::NaNUv { .. } => IssueSeverity::Error,
            ValidationIssue::InfiniteUv { .. } => IssueSeverity::Error,
            ValidationIssue::DegenerateUvTriangle { .. } => IssueSeverity::Info,
            ValidationIssue::InvalidSubmesh { .. } => IssueSeverity::Error,
            ValidationIssue::EmptyMaskName => IssueSeverity::Error,
            ValidationIssue::NonPositiveStrength { .. } => IssueSeverity::Error,
            ValidationIssue::UnsupportedMaskType { .. } => IssueSeverity::Error,
            ValidationIssue::NoTargets => IssueSeverity::Warning,
            ValidationIssue::StaleIslandReference { .. } => IssueSeverity::Warning,
            ValidationIssue::DuplicateMaskName { .. } => IssueSeverity::Error,
        }
    }

    /// Returns an error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationIssue::InvalidVertexIndex { .. } => "UVM-1005",
            ValidationIssue::NaNUv { .. } | ValidationIssue::InfiniteUv { .. } => "UVM-1006",
            ValidationIssue::InvalidSubmesh { .. } => "UVM-1007",
            ValidationIssue::DegenerateUvTriangle { .. } => "UVM-2001",
            ValidationIssue::EmptyMaskName => "UVM-3001",
            ValidationIssue::NonPositiveStrength { .. } => "UVM-3002",
            ValidationIssue::UnsupportedMaskType { .. } => "UVM-3003",
            ValidationIssue::NoTargets => "UVM-3004",
            ValidationIssue::StaleIslandReference { .. } => "UVM-3005",
            ValidationIssue::DuplicateMaskName { .. } => "UVM-4001",
        }
    }
}

/// Severity levels for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueSeverity {
    /// Informational, no action needed.
    Info,
    /// Warning, results may be surprising.
    Warning,
    /// Error, the input or mask is unusable.
    Error,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::InvalidVertexIndex {
                face_index,
                vertex_index,
                vertex_count,
            } => write!(
                f,
                "triangle {} references vertex {}, but mesh only has {} vertices",
                face_index, vertex_index, vertex_count
            ),
            ValidationIssue::NaNUv {
                vertex_index,
                coordinate,
            } => write!(f, "vertex {} has NaN {} coordinate", vertex_index, coordinate),
            ValidationIssue::InfiniteUv {
                vertex_index,
                coordinate,
                value,
            } => write!(
                f,
                "vertex {} has infinite {} coordinate ({})",
                vertex_index, coordinate, value
            ),
            ValidationIssue::DegenerateUvTriangle { face_index, area } => write!(
                f,
                "triangle {} is degenerate in UV space (area: {:.2e})",
                face_index, area
            ),
            ValidationIssue::InvalidSubmesh { index, start, end } => write!(
                f,
                "submesh {} range {}..{} is out of bounds",
                index, start, end
            ),
            ValidationIssue::EmptyMaskName => write!(f, "mask name is empty"),
            ValidationIssue::NonPositiveStrength { strength } => {
                write!(f, "mask strength {} must be greater than zero", strength)
            }
            ValidationIssue::UnsupportedMaskType { mask_type } => {
                write!(f, "mask type {} has no weight computation", mask_type)
            }
            ValidationIssue::NoTargets => write!(f, "mask has no target islands or vertices"),
            ValidationIssue::StaleIslandReference { island_id } => write!(
                f,
                "island {} is not present in the current island set",
                island_id
            ),
            ValidationIssue::DuplicateMaskName { name } => {
                write!(f, "mask name '{}' is used more than once", name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = MaskError::invalid_vertex_index(5, 100, 50);
        assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
        assert_eq!(err.code().as_str(), "UVM-1005");
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = MaskError::duplicate_mask("face");
        match err.recovery_suggestion() {
            RecoverySuggestion::Rename { name } => assert_eq!(name, "face"),
            other => panic!("Expected Rename suggestion, got {:?}", other),
        }
    }

    #[test]
    fn test_issue_severity() {
        assert_eq!(
            ValidationIssue::StaleIslandReference { island_id: 7 }.severity(),
            IssueSeverity::Warning
        );
        assert_eq!(
            ValidationIssue::NonPositiveStrength { strength: 0.0 }.severity(),
            IssueSeverity::Error
        );
        assert!(IssueSeverity::Error > IssueSeverity::Warning);
    }

    #[test]
    fn test_error_display() {
        let err = MaskError::invalid_vertex_index(5, 100, 50);
        let display = format!("{}", err);
        assert!(display.contains("triangle 5"));
        assert!(display.contains("vertex 100"));
        assert!(display.contains("50 vertices"));
    }
}
