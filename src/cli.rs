use crate::models::FeatureReading;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cropcare",
    version,
    about = "Crop suitability scoring and crop care advice from per-stage ideal ranges"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Rule source (JSON or YAML), overrides rules_path from the config
    #[arg(short, long, global = true)]
    pub rules: Option<PathBuf>,

    /// Increase log verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the rule source for missing, non-numeric, inverted or flat ranges
    Lint,
    /// Write a labeled synthetic dataset as CSV
    Generate {
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        pos_per_stage: Option<usize>,
        #[arg(long)]
        neg_per_stage: Option<usize>,
    },
    /// Generate data, fit and calibrate the suitability model, save it as JSON
    Train {
        /// Output path, defaults to model_path from the config
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Score one query and print the result as JSON
    Evaluate {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Model artifact, defaults to model_path from the config
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
    /// Flags and advice only, no model needed
    Advise {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show which ranges a crop and stage resolve to
    Ranges { crop: String, stage: String },
}

#[derive(Args)]
pub struct QueryArgs {
    pub crop: String,
    pub stage: String,
    #[arg(value_name = "N")]
    pub nitrogen: f64,
    #[arg(value_name = "P")]
    pub phosphorus: f64,
    #[arg(value_name = "K")]
    pub potassium: f64,
    #[arg(allow_negative_numbers = true)]
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl QueryArgs {
    pub fn reading(&self) -> FeatureReading {
        FeatureReading::new(
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        )
    }
}
