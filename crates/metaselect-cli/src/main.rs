//! metaselect - meta-learning model selection CLI
//!
//! Usage:
//!   metaselect inspect metadata.json                  # Category counts and feature correlations
//!   metaselect train metadata.json -o model.bin       # Train and save a selector
//!   metaselect predict model.bin series.json --top 2  # Recommend models for a series
//!   metaselect predict-features model.bin rows.json   # Recommend models for feature rows
//!   metaselect fuzzy model.bin series.json            # Best model, plus runner-up if indistinguishable

use clap::{Parser, Subcommand};
use metaselect::metalearner::{EvalMethod, Method};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

use commands::{inspect, predict, train};

/// metaselect - recommend a forecasting model for a time series
///
/// Trains a classifier on past series' features and best models, then
/// recommends models for new series.
#[derive(Parser)]
#[command(name = "metaselect")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Seed for down-sampling, splitting, forests and the bootstrap test
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show category counts and feature correlations of training metadata
    Inspect {
        /// JSON array of training records
        #[arg(value_name = "METADATA")]
        metadata: PathBuf,

        /// Compare the features of two rows
        #[arg(long, num_args = 2, value_names = ["I", "J"])]
        compare: Option<Vec<usize>>,
    },

    /// Preprocess metadata, train a selector and save it
    Train {
        /// JSON array of training records
        #[arg(value_name = "METADATA")]
        metadata: PathBuf,

        /// Where to write the trained model
        #[arg(short, long, value_name = "MODEL")]
        output: PathBuf,

        /// TOML file with [preprocess] and [train] sections
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// RandomForest, GBDT, SVM, KNN or NaiveBayes
        #[arg(long)]
        method: Option<Method>,

        /// mean or median
        #[arg(long)]
        eval_method: Option<EvalMethod>,

        /// Held-out fraction, in (0, 1)
        #[arg(long)]
        test_size: Option<f64>,

        /// Trees in the random forest
        #[arg(long)]
        n_trees: Option<usize>,

        /// Neighbors for KNN
        #[arg(long)]
        n_neighbors: Option<usize>,

        /// Keep the class imbalance
        #[arg(long)]
        no_downsample: bool,

        /// Standardize features before training
        #[arg(long)]
        scale: bool,
    },

    /// Recommend models for a series (JSON values or {"time", "value"})
    Predict {
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        #[arg(value_name = "SERIES")]
        series: PathBuf,

        /// Number of models to return
        #[arg(long, default_value_t = 1)]
        top: usize,

        /// Skip dividing the series by its maximum
        #[arg(long)]
        no_rescale: bool,
    },

    /// Recommend models for feature rows (JSON vector, rows or named rows)
    PredictFeatures {
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        #[arg(value_name = "FEATURES")]
        features: PathBuf,

        /// Number of models to return per row
        #[arg(long, default_value_t = 1)]
        top: usize,
    },

    /// Recommend the best model, adding the runner-up when the forest cannot
    /// separate them
    Fuzzy {
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        #[arg(value_name = "SERIES")]
        series: PathBuf,

        /// Significance level of the bootstrap test
        #[arg(long, default_value_t = 0.2)]
        sig_level: f64,

        /// Skip dividing the series by its maximum
        #[arg(long)]
        no_rescale: bool,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let result = match cli.command {
        Commands::Inspect { metadata, compare } => {
            let pair = compare.and_then(|c| match c.as_slice() {
                [i, j] => Some((*i, *j)),
                _ => None,
            });
            inspect::run(&metadata, pair)
        }

        Commands::Train {
            metadata,
            output,
            config,
            method,
            eval_method,
            test_size,
            n_trees,
            n_neighbors,
            no_downsample,
            scale,
        } => {
            let overrides = train::Overrides {
                method,
                eval_method,
                test_size,
                n_trees,
                n_neighbors,
                no_downsample,
                scale,
            };
            config
                .as_deref()
                .map_or_else(|| Ok(train::CliConfig::default()), train::CliConfig::from_file)
                .and_then(|file| train::run(&metadata, &output, &overrides.apply(file), &mut rng))
        }

        Commands::Predict {
            model,
            series,
            top,
            no_rescale,
        } => predict::run_series(&model, &series, !no_rescale, top),

        Commands::PredictFeatures {
            model,
            features,
            top,
        } => predict::run_features(&model, &features, top),

        Commands::Fuzzy {
            model,
            series,
            sig_level,
            no_rescale,
        } => predict::run_fuzzy(&model, &series, !no_rescale, sig_level, &mut rng),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
