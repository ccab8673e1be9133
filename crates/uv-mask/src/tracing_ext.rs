//! Tracing extensions for island analysis and masking.
//!
//! Structured logging helpers on top of `tracing`. Nothing is printed unless the
//! host installs a subscriber:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//! // RUST_LOG=uv_mask=debug for per-pass detail,
//! // RUST_LOG=uv_mask::timing=info for timings only.
//! ```
//!
//! # Log Levels
//!
//! - **WARN**: truncated analyses, stale island references, pathological sizes
//! - **INFO**: analysis summaries, timing
//! - **DEBUG**: per-pass link counts, cache transitions
//! - **TRACE**: per-island and per-mask detail

use std::time::Instant;
use tracing::{Span, debug, info, trace, warn};

use crate::mask::MaskValidation;
use crate::partition::IslandAnalysis;
use crate::types::UvMesh;

/// Times one analysis or weight pass and logs the duration on drop.
///
/// ```rust,ignore
/// let _timer = OperationTimer::for_mesh("partition_islands", mesh);
/// // ... work ...
/// // elapsed time is logged under `uv_mask::timing` when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Timer for a pass over a UV mesh.
    pub fn for_mesh(name: &'static str, mesh: &UvMesh) -> Self {
        let span = tracing::info_span!(
            "uv_operation",
            operation = name,
            faces = mesh.face_count(),
            vertices = mesh.vertex_count(),
            submeshes = mesh.submeshes.len()
        );
        debug!(
            target: "uv_mask::timing",
            operation = name,
            faces = mesh.face_count(),
            vertices = mesh.vertex_count(),
            "Starting operation"
        );
        Self::started(name, span)
    }

    /// Timer for evaluating `mask_count` masks over `vertex_count` vertices.
    pub fn for_masks(name: &'static str, mask_count: usize, vertex_count: usize) -> Self {
        let span = tracing::info_span!(
            "uv_operation",
            operation = name,
            masks = mask_count,
            vertices = vertex_count
        );
        debug!(
            target: "uv_mask::timing",
            operation = name,
            masks = mask_count,
            vertices = vertex_count,
            "Starting operation"
        );
        Self::started(name, span)
    }

    fn started(name: &'static str, span: Span) -> Self {
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Span covering the timed pass; enter it to attach nested events.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        info!(
            target: "uv_mask::timing",
            operation = self.name,
            elapsed_ms = format_args!("{:.2}", self.elapsed_ms()),
            "Operation completed"
        );
    }
}

/// Log an analysis summary, with per-island detail at trace level.
pub fn log_analysis_stats(analysis: &IslandAnalysis, context: &str) {
    if analysis.truncated {
        warn!(
            target: "uv_mask::analysis",
            context = context,
            islands = analysis.islands.len(),
            unassigned = analysis.unassigned_triangles,
            "Island analysis truncated"
        );
    } else {
        info!(
            target: "uv_mask::analysis",
            context = context,
            islands = analysis.islands.len(),
            triangles = analysis.triangle_count,
            "Island analysis complete"
        );
    }

    for island in &analysis.islands {
        trace!(
            target: "uv_mask::analysis",
            id = island.id,
            faces = island.face_count(),
            vertices = island.vertex_count(),
            bounds = format!(
                "[{:.3}, {:.3}]..[{:.3}, {:.3}]",
                island.bounds.min.x, island.bounds.min.y, island.bounds.max.x, island.bounds.max.y
            ),
            "Island"
        );
    }
}

/// Log the outcome of validating one mask.
pub fn log_mask_validation(name: &str, validation: &MaskValidation) {
    if !validation.errors.is_empty() {
        warn!(
            target: "uv_mask::validation",
            mask = name,
            errors = validation.errors.len(),
            warnings = validation.warnings.len(),
            "Mask is invalid and will be treated as inactive"
        );
    } else if !validation.warnings.is_empty() {
        warn!(
            target: "uv_mask::validation",
            mask = name,
            warnings = validation.warnings.len(),
            "Mask validation produced warnings"
        );
    } else {
        debug!(target: "uv_mask::validation", mask = name, "Mask validation passed");
    }
    for issue in validation.errors.iter().chain(&validation.warnings) {
        trace!(target: "uv_mask::validation", mask = name, code = issue.code(), "{}", issue);
    }
}
