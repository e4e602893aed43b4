use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use local_nibble::cluster::{CutMetric, Variant};
use local_nibble::config::{Config, SweepPlan};
use local_nibble::data::{self, EdgeListFormat};
use local_nibble::graph::VertexId;
use local_nibble::{runner, storage, viz};

/// What to run over the loaded graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Single-seed nibbles over the full parameter grid
    Sweep,
    /// Partition the whole graph starting from the first seed
    Cover,
}

#[derive(Parser, Debug)]
#[clap(
    name = "local-nibble",
    about = "Seed-local community detection with random-walk and PageRank nibbles"
)]
struct Cli {
    /// Path to input edge list
    #[clap(long)]
    input: PathBuf,

    /// Field delimiter in the edge list (whitespace splits on any run of spaces/tabs)
    #[clap(long, default_value = " ")]
    delimiter: String,

    /// Skip a non-numeric header row
    #[clap(long)]
    header: bool,

    /// Output directory for results
    #[clap(long, default_value = "nibble_results")]
    output_dir: PathBuf,

    /// Run mode
    #[clap(long, value_enum, default_value = "sweep")]
    mode: Mode,

    /// Seed vertices
    #[clap(long, value_delimiter = ',', default_values = ["4"])]
    seeds: Vec<VertexId>,

    /// Expansion variants
    #[clap(long, value_enum, value_delimiter = ',', default_values = ["vanilla", "pagerank"])]
    variants: Vec<Variant>,

    /// Cut quality metrics
    #[clap(long, value_enum, value_delimiter = ',', default_values = ["conductance"])]
    metrics: Vec<CutMetric>,

    /// Maximum community sizes (0 = no cap)
    #[clap(long, value_delimiter = ',', default_values = ["10", "15"])]
    cutsizes: Vec<usize>,

    /// Score thresholds for community membership
    #[clap(long, value_delimiter = ',', default_values = ["1e-4", "1e-7", "1e-10"])]
    epsilons: Vec<f64>,

    /// Walk steps / PageRank iteration caps
    #[clap(long, value_delimiter = ',', default_values = ["100", "200"])]
    iterations: Vec<usize>,

    /// PageRank damping factor
    #[clap(long, default_value = "0.85")]
    alpha: f64,

    /// Random seed for walks
    #[clap(long, default_value = "42")]
    rng_seed: u64,

    /// Skip graph export
    #[clap(long)]
    skip_export: bool,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    fn base_config(&self) -> Config {
        Config {
            alpha: self.alpha,
            rng_seed: self.rng_seed,
            ..Config::default()
        }
    }

    fn sweep_plan(&self) -> SweepPlan {
        SweepPlan {
            seeds: self.seeds.clone(),
            variants: self.variants.clone(),
            metrics: self.metrics.clone(),
            cutsizes: self.cutsizes.clone(),
            epsilons: self.epsilons.clone(),
            iterations: self.iterations.clone(),
            base: self.base_config(),
        }
    }

    /// Coverage uses the first value of every grid axis
    fn coverage_config(&self) -> Config {
        let base = self.base_config();
        Config {
            variant: self.variants.first().copied().unwrap_or(base.variant),
            metric: self.metrics.first().copied().unwrap_or(base.metric),
            max_cutsize: self.cutsizes.first().copied().unwrap_or(base.max_cutsize),
            epsilon: self.epsilons.first().copied().unwrap_or(base.epsilon),
            max_iterations: self.iterations.first().copied().unwrap_or(base.max_iterations),
            ..base
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Starting local clustering");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Load data
    let format = EdgeListFormat::new(args.delimiter.as_str()).with_header(args.header);
    let graph = data::load_edge_list(&args.input, &format)?;

    // 2. Run clustering
    let (runs, coverage, annotations) = match args.mode {
        Mode::Sweep => {
            let runs = runner::run_nibble_sweep(&graph, &args.sweep_plan())?;
            let annotations: Vec<_> = runs.iter().map(|run| viz::annotate_nibble(&graph, run)).collect();
            (runs, None, annotations)
        }
        Mode::Cover => {
            let config = args.coverage_config();
            let seed = args
                .seeds
                .first()
                .copied()
                .ok_or_else(|| anyhow::anyhow!("coverage needs a seed"))?;
            let report = runner::run_coverage(&graph, seed, &config)?;
            let annotations = viz::annotate_coverage(&graph, &report, &config);
            (Vec::new(), Some(report), annotations)
        }
    };

    // 3. Save results
    storage::save_results(&graph, &runs, coverage.as_ref(), &args.output_dir)?;

    // 4. Export the annotated graph if requested
    if !args.skip_export {
        viz::generate_visualizations(&graph, &annotations, &args.output_dir)?;
    }

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}
