//! uvmask islands command - list the UV islands of a mesh.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use uv_mask::{ProgressCallback, consolidate_islands, partition_islands, partition_submeshes};

use crate::{Cli, OutputFormat, PartitionArgs, load, output};

#[derive(Serialize)]
struct IslandsReport {
    path: String,
    vertices: usize,
    triangles: usize,
    island_count: usize,
    complete: bool,
    unassigned_triangles: usize,
    warnings: Vec<String>,
    islands: Vec<IslandRow>,
}

#[derive(Serialize)]
struct IslandRow {
    id: u32,
    name: String,
    triangles: usize,
    vertices: usize,
    uv_min: [f64; 2],
    uv_max: [f64; 2],
    uv_area: f64,
}

pub fn run(
    input: &Path,
    partition: &PartitionArgs,
    consolidate: Option<f64>,
    by_object: bool,
    cli: &Cli,
) -> Result<()> {
    let mesh = load::load_obj(input)
        .with_context(|| format!("Failed to load mesh from {:?}", input))?;
    let params = partition.params();

    let mut analysis = if by_object {
        let quiet = cli.quiet || matches!(cli.format, OutputFormat::Json);
        let callback: ProgressCallback = Box::new(move |p| {
            if !quiet {
                eprintln!("  {} {}% {}", "...".dimmed(), p.percent(), p.message);
            }
            true
        });
        partition_submeshes(&mesh, &params, Some(&callback))?
    } else {
        partition_islands(&mesh, &params)?
    };

    if let Some(tolerance) = consolidate {
        let before = analysis.islands.len();
        analysis.islands = consolidate_islands(&analysis.islands, tolerance);
        tracing::info!(before, after = analysis.islands.len(), "Consolidated islands");
    }

    let report = IslandsReport {
        path: input.display().to_string(),
        vertices: mesh.vertex_count(),
        triangles: mesh.face_count(),
        island_count: analysis.island_count(),
        complete: analysis.is_complete(),
        unassigned_triangles: analysis.unassigned_triangles,
        warnings: analysis.warnings.clone(),
        islands: analysis
            .islands
            .iter()
            .map(|island| IslandRow {
                id: island.id,
                name: island.display_name().into_owned(),
                triangles: island.face_count(),
                vertices: island.vertex_count(),
                uv_min: [island.bounds.min.x, island.bounds.min.y],
                uv_max: [island.bounds.max.x, island.bounds.max.y],
                uv_area: island.surface_uv_area(&mesh),
            })
            .collect(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "UV Islands".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Vertices".cyan(), report.vertices);
                println!("  {}: {}", "Triangles".cyan(), report.triangles);
                println!("  {}: {}", "Islands".cyan(), report.island_count);

                if !report.complete {
                    println!(
                        "  {}: {} triangles unassigned",
                        "Incomplete".yellow(),
                        report.unassigned_triangles
                    );
                }
                for warning in &report.warnings {
                    println!("  {}: {}", "Warning".yellow(), warning);
                }

                println!();
                for row in &report.islands {
                    println!(
                        "  {:>5}  {:<16} {:>7} tris {:>7} verts  [{:.3}, {:.3}]-[{:.3}, {:.3}]  area {:.4}",
                        row.id.to_string().bold(),
                        row.name,
                        row.triangles,
                        row.vertices,
                        row.uv_min[0],
                        row.uv_min[1],
                        row.uv_max[0],
                        row.uv_max[1],
                        row.uv_area
                    );
                }
            }
        }
    }

    Ok(())
}
