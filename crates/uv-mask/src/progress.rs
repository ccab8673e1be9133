//! Progress reporting and cancellation for chunked analysis.
//!
//! Island analysis is synchronous. Hosts that need to stay responsive run it
//! one submesh at a time through [`crate::partition_submeshes`], which reports
//! a [`Progress`] after each chunk and stops when the callback returns `false`.
//!
//! # Example
//!
//! ```
//! use nalgebra::Point2;
//! use uv_mask::{PartitionParams, Progress, ProgressCallback, UvMesh, partition_submeshes};
//!
//! let uvs = vec![
//!     Point2::new(0.0, 0.0), Point2::new(0.4, 0.0), Point2::new(0.0, 0.4),
//!     Point2::new(0.6, 0.6), Point2::new(1.0, 0.6), Point2::new(0.6, 1.0),
//! ];
//! let mesh = UvMesh::from_parts(Vec::new(), uvs, vec![[0, 1, 2], [3, 4, 5]])
//!     .with_submesh(0, 1)
//!     .with_submesh(1, 1);
//!
//! // Stop after the first submesh
//! let callback: ProgressCallback = Box::new(|progress: &Progress| {
//!     println!("{}%: {}", progress.percent(), progress.message);
//!     progress.chunk < 1
//! });
//! let analysis = partition_submeshes(&mesh, &PartitionParams::default(), Some(&callback)).unwrap();
//! assert!(analysis.cancelled);
//! assert_eq!(analysis.island_count(), 1);
//! ```

use std::time::{Duration, Instant};

use tracing::debug;

/// Snapshot passed to a [`ProgressCallback`] after each chunk.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Chunks finished so far (1-based after the first report).
    pub chunk: usize,

    /// Number of chunks in the run.
    pub chunk_count: usize,

    /// Triangles covered by the finished chunks.
    pub triangles_done: usize,

    /// Triangles in the mesh.
    pub triangle_count: usize,

    /// Islands found so far across all chunks.
    pub islands_found: usize,

    /// Human-readable description of the chunk just finished.
    pub message: String,

    /// Time since the run started.
    pub elapsed: Duration,

    /// Projection from triangle throughput so far.
    pub estimated_remaining: Option<Duration>,
}

impl Progress {
    /// Share of triangles processed (0.0 to 1.0).
    ///
    /// Falls back to the chunk ratio for meshes without triangles.
    #[inline]
    pub fn fraction(&self) -> f64 {
        if self.triangle_count > 0 {
            self.triangles_done as f64 / self.triangle_count as f64
        } else if self.chunk_count > 0 {
            self.chunk as f64 / self.chunk_count as f64
        } else {
            0.0
        }
    }

    /// [`fraction`](Self::fraction) as a rounded percentage.
    #[inline]
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.chunk >= self.chunk_count
    }
}

/// Callback receiving progress. Returns `true` to continue, `false` to cancel.
pub type ProgressCallback = Box<dyn Fn(&Progress) -> bool + Send + Sync>;

/// Per-run bookkeeping behind [`Progress`] reports.
///
/// Without a callback every report continues.
pub(crate) struct ChunkProgress<'a> {
    callback: Option<&'a ProgressCallback>,
    start: Instant,
    chunk: usize,
    chunk_count: usize,
    triangles_done: usize,
    triangle_count: usize,
}

impl<'a> ChunkProgress<'a> {
    pub(crate) fn new(
        callback: Option<&'a ProgressCallback>,
        chunk_count: usize,
        triangle_count: usize,
    ) -> Self {
        Self {
            callback,
            start: Instant::now(),
            chunk: 0,
            chunk_count,
            triangles_done: 0,
            triangle_count,
        }
    }

    /// Record a finished chunk and ask the callback whether to go on.
    pub(crate) fn chunk_done(&mut self, triangles: usize, islands_found: usize) -> bool {
        self.chunk += 1;
        self.triangles_done += triangles;
        debug!(
            chunk = self.chunk,
            chunks = self.chunk_count,
            triangles = self.triangles_done,
            islands = islands_found,
            "Chunk analyzed"
        );

        let Some(callback) = self.callback else {
            return true;
        };

        let elapsed = self.start.elapsed();
        let remaining = self.triangle_count.saturating_sub(self.triangles_done);
        let estimated_remaining = if self.triangles_done > 0 && elapsed > Duration::ZERO {
            let per_triangle = elapsed.as_secs_f64() / self.triangles_done as f64;
            Some(Duration::from_secs_f64(per_triangle * remaining as f64))
        } else {
            None
        };

        let progress = Progress {
            chunk: self.chunk,
            chunk_count: self.chunk_count,
            triangles_done: self.triangles_done,
            triangle_count: self.triangle_count,
            islands_found,
            message: format!("submesh {} of {}", self.chunk, self.chunk_count),
            elapsed,
            estimated_remaining,
        };
        callback(&progress)
    }
}
