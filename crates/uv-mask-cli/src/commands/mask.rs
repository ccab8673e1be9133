//! uvmask mask command - evaluate masks and report weight statistics.

use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde::Serialize;
use uv_mask::{
    CombineMode, FeatherMetric, Mask, MaskContext, MaskService, MaskType, partition_islands,
};

use crate::{Cli, MetricArg, ModeArg, OutputFormat, PartitionArgs, load, output};

/// Mask options gathered from the command line.
pub struct MaskArgs {
    pub islands: Vec<u32>,
    pub vertices: Vec<u32>,
    pub strength: f64,
    pub invert: bool,
    pub feather: f64,
    pub metric: MetricArg,
    pub mode: ModeArg,
    pub all: bool,
}

#[derive(Serialize)]
struct MaskReport {
    path: String,
    vertices: usize,
    islands: usize,
    masks: Vec<String>,
    mode: &'static str,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    stats: WeightStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    weights: Option<Vec<f64>>,
}

#[derive(Serialize, Default)]
struct WeightStats {
    min: f64,
    max: f64,
    mean: f64,
    /// Vertices with weight 1.
    full: usize,
    /// Vertices with weight 0.
    zero: usize,
    /// Vertices strictly between 0 and 1.
    partial: usize,
}

impl WeightStats {
    fn from_weights(weights: &[f64]) -> Self {
        if weights.is_empty() {
            return Self::default();
        }
        let mut stats = Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            ..Self::default()
        };
        let mut sum = 0.0;
        for &w in weights {
            stats.min = stats.min.min(w);
            stats.max = stats.max.max(w);
            sum += w;
            if w >= 1.0 {
                stats.full += 1;
            } else if w <= 0.0 {
                stats.zero += 1;
            } else {
                stats.partial += 1;
            }
        }
        stats.mean = sum / weights.len() as f64;
        stats
    }
}

fn combine_mode(mode: ModeArg) -> (CombineMode, &'static str) {
    match mode {
        ModeArg::Union => (CombineMode::Union, "union"),
        ModeArg::Intersection => (CombineMode::Intersection, "intersection"),
        ModeArg::Difference => (CombineMode::Difference, "difference"),
    }
}

fn build_masks(args: &MaskArgs) -> Vec<Mask> {
    let metric = match args.metric {
        MetricArg::Uv => FeatherMetric::UvDistance,
        MetricArg::Index => FeatherMetric::legacy_index(),
    };
    let configure = |mask: Mask| {
        mask.with_strength(args.strength)
            .with_inverted(args.invert)
            .with_feather(args.feather)
            .with_feather_metric(metric)
    };

    let mut masks = Vec::new();
    if !args.islands.is_empty() {
        masks.push(configure(
            Mask::new("islands", MaskType::UvIsland).with_islands(args.islands.iter().copied()),
        ));
    }
    if !args.vertices.is_empty() {
        masks.push(configure(
            Mask::new("vertices", MaskType::VertexGroup)
                .with_vertices(args.vertices.iter().copied()),
        ));
    }
    masks
}

pub fn run(input: &Path, args: &MaskArgs, partition: &PartitionArgs, cli: &Cli) -> Result<()> {
    let masks = build_masks(args);
    if masks.is_empty() {
        bail!("Nothing to mask: pass --islands and/or --vertices");
    }

    let mesh = load::load_obj(input)
        .with_context(|| format!("Failed to load mesh from {:?}", input))?;
    let analysis = partition_islands(&mesh, &partition.params())?;
    let island_count = analysis.island_count();

    let mut service = MaskService::new();
    service.set_context(MaskContext::new(&mesh, analysis.islands));
    for mask in masks {
        service.add_mask(mask)?;
    }

    let validation = service.validate_all_masks();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for (name, result) in &validation.results {
        errors.extend(result.error_messages().into_iter().map(|m| format!("{name}: {m}")));
        warnings.extend(result.warning_messages().into_iter().map(|m| format!("{name}: {m}")));
    }

    let (mode, mode_name) = combine_mode(args.mode);
    let weights = service.calculate_combined_weights(mesh.vertex_count(), mode)?;

    let report = MaskReport {
        path: input.display().to_string(),
        vertices: mesh.vertex_count(),
        islands: island_count,
        masks: service.masks().iter().map(|m| m.name().to_string()).collect(),
        mode: mode_name,
        valid: validation.is_valid(),
        errors,
        warnings,
        stats: WeightStats::from_weights(&weights),
        weights: args.all.then_some(weights),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Mask Weights".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Vertices".cyan(), report.vertices);
                println!("  {}: {}", "Islands".cyan(), report.islands);
                println!("  {}: {}", "Masks".cyan(), report.masks.join(", "));
                println!("  {}: {}", "Mode".cyan(), report.mode);

                for e in &report.errors {
                    println!("  {}: {}", "Error".red(), e);
                }
                for w in &report.warnings {
                    println!("  {}: {}", "Warning".yellow(), w);
                }

                let s = &report.stats;
                println!(
                    "  {}: min {:.3}, max {:.3}, mean {:.3}",
                    "Weights".cyan(),
                    s.min,
                    s.max,
                    s.mean
                );
                println!(
                    "  {}: {} full, {} partial, {} zero",
                    "Coverage".cyan(),
                    s.full.to_string().green(),
                    s.partial,
                    s.zero
                );

                if let Some(weights) = &report.weights {
                    println!();
                    for (v, w) in weights.iter().enumerate() {
                        println!("  {:>7}  {:.4}", v, w);
                    }
                }
            }
        }
    }

    Ok(())
}
