//! uvmask pick command - report the island under a UV coordinate.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use nalgebra::Point2;
use serde::Serialize;
use uv_mask::{island_index_at_uv, partition_islands};

use crate::{Cli, OutputFormat, PartitionArgs, load, output};

#[derive(Serialize)]
struct PickResult {
    u: f64,
    v: f64,
    /// -1 when no island contains the point.
    island: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    triangles: Option<usize>,
}

pub fn run(input: &Path, u: f64, v: f64, partition: &PartitionArgs, cli: &Cli) -> Result<()> {
    let mesh = load::load_obj(input)
        .with_context(|| format!("Failed to load mesh from {:?}", input))?;
    let analysis = partition_islands(&mesh, &partition.params())?;

    let uv = Point2::new(u, v);
    let index = island_index_at_uv(&uv, &analysis.islands, &mesh);
    let hit = u32::try_from(index)
        .ok()
        .and_then(|id| analysis.islands.get(id as usize));

    let result = PickResult {
        u,
        v,
        island: index,
        name: hit.map(|i| i.display_name().into_owned()),
        triangles: hit.map(|i| i.face_count()),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                match (&result.name, result.triangles) {
                    (Some(name), Some(triangles)) => {
                        println!(
                            "{} ({:.4}, {:.4}) -> {} {} ({} triangles)",
                            "Hit".green().bold(),
                            u,
                            v,
                            result.island.to_string().bold(),
                            name,
                            triangles
                        );
                    }
                    _ => {
                        println!(
                            "{} ({:.4}, {:.4}) is outside every island",
                            "Miss".yellow().bold(),
                            u,
                            v
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
