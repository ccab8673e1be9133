//! Command implementations.

pub mod islands;
pub mod mask;
pub mod pick;

use uv_mask::{PartitionAlgorithm, PartitionParams};

use crate::PartitionArgs;

impl PartitionArgs {
    /// Partition parameters selected on the command line.
    pub fn params(&self) -> PartitionParams {
        let algorithm = if self.legacy {
            PartitionAlgorithm::Legacy
        } else {
            PartitionAlgorithm::EdgeBased
        };
        PartitionParams::default()
            .with_uv_tolerance(self.tolerance)
            .with_max_island_count(self.max_islands)
            .with_optimize_performance(!self.brute_force)
            .with_algorithm(algorithm)
    }
}
