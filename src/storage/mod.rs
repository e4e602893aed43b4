//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, to_string_pretty, Value};
use statrs::statistics::Statistics;

use crate::cluster::detection::CoverageReport;
use crate::cluster::SweepOutcome;
use crate::graph::CompressedGraph;
use crate::runner::NibbleRun;

/// Save sweep runs and an optional coverage report to the output directory
pub fn save_results(
    graph: &CompressedGraph,
    runs: &[NibbleRun],
    coverage: Option<&CoverageReport>,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving {} runs to {}", runs.len(), output_dir.display());

    fs::create_dir_all(output_dir)?;

    save_summary(graph, runs, coverage, output_dir)?;
    save_runs(runs, output_dir)?;
    if let Some(report) = coverage {
        save_coverage(report, output_dir)?;
    }

    log::info!("Results saved successfully");

    Ok(())
}

/// Mean of `values`, or null for an empty slice
fn mean_or_null(values: &[f64]) -> Value {
    if values.is_empty() {
        Value::Null
    } else {
        json!(values.mean())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Graph and result statistics
pub fn summary_json(graph: &CompressedGraph, runs: &[NibbleRun], coverage: Option<&CoverageReport>) -> Value {
    let components = petgraph::algo::connected_components(&graph.to_petgraph());

    let sizes: Vec<f64> = runs.iter().map(|r| r.community.len() as f64).collect();
    let qualities: Vec<f64> = runs
        .iter()
        .filter_map(|r| match r.outcome {
            SweepOutcome::Cut(cut) => Some(cut.quality),
            _ => None,
        })
        .collect();

    let degenerate_runs = runs
        .iter()
        .filter(|r| matches!(r.outcome, SweepOutcome::Degenerate { .. }))
        .count();

    let coverage_stats = coverage.map(|report| {
        let community_sizes: Vec<f64> = report.records.iter().map(|r| r.size() as f64).collect();
        let coverage_ratio = ratio(report.used.len(), graph.node_count);
        json!({
            "state": report.state,
            "iterations": report.records.len(),
            "used_count": report.used.len(),
            "coverage_ratio": coverage_ratio,
            "avg_community_size": mean_or_null(&community_sizes),
        })
    });

    json!({
        "graph_stats": {
            "node_count": graph.node_count,
            "edge_count": graph.edge_count(),
            "connected_components": components,
            "avg_degree": ratio(graph.total_volume(), graph.node_count),
        },
        "run_stats": {
            "run_count": runs.len(),
            "avg_community_size": mean_or_null(&sizes),
            "avg_quality": mean_or_null(&qualities),
            "degenerate_runs": degenerate_runs,
        },
        "coverage": coverage_stats,
    })
}

/// Save summary information
fn save_summary(
    graph: &CompressedGraph,
    runs: &[NibbleRun],
    coverage: Option<&CoverageReport>,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving summary information");

    let path = output_dir.join("summary.json");
    let mut file = File::create(path)?;

    let summary = summary_json(graph, runs, coverage);
    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save one entry per sweep run
fn save_runs(runs: &[NibbleRun], output_dir: &Path) -> Result<()> {
    log::info!("Saving individual run results");

    let path = output_dir.join("runs.json");
    let mut file = File::create(path)?;

    let runs_json = json!({
        "runs": runs.iter().map(|run| {
            json!({
                "key": run.key(),
                "seed": run.seed,
                "config": run.config,
                "outcome": run.outcome,
                "community": run.community,
            })
        }).collect::<Vec<_>>()
    });

    file.write_all(to_string_pretty(&runs_json)?.as_bytes())?;

    Ok(())
}

/// Save the coverage report
fn save_coverage(report: &CoverageReport, output_dir: &Path) -> Result<()> {
    log::info!("Saving coverage report");

    let path = output_dir.join("coverage.json");
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(report)?.as_bytes())?;

    Ok(())
}
