mod cli;
mod config;
mod error;
mod logic;
mod models;
mod scoring;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, QueryArgs};
use config::Config;
use logic::resolver::RangeResolver;
use logic::validator::{self, RangeDefect};
use logic::{advise, SampleGenerator, SuitabilityEvaluator, SuitabilityQuery};
use models::{Feature, RangeTable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scoring::TrainedModel;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let rules_path = cli.rules.unwrap_or_else(|| config.rules_path.clone());

    match cli.command {
        Commands::Lint => {
            let table = load_rules(&rules_path)?;
            let defects = validator::validate(&table);
            println!("{}", validator::render_report(&defects));
            Ok(ExitCode::from(lint_exit_code(&defects)))
        }
        Commands::Generate {
            out,
            seed,
            pos_per_stage,
            neg_per_stage,
        } => {
            let table = load_rules(&rules_path)?;
            let mut generator_config = config.generator;
            if let Some(n) = pos_per_stage {
                generator_config.positives_per_stage = n;
            }
            if let Some(n) = neg_per_stage {
                generator_config.negatives_per_stage = n;
            }
            let seed = seed.unwrap_or(generator_config.seed);

            let generator = SampleGenerator::new(generator_config.settings());
            let samples = generator
                .generate(&table, &mut StdRng::seed_from_u64(seed))
                .context("Failed to generate synthetic rows")?;
            logic::generator::write_csv_file(&samples, &out)
                .with_context(|| format!("Failed to write {}", out.display()))?;

            let positives = samples.iter().filter(|s| s.is_positive()).count();
            println!(
                "Wrote {} rows ({} suitable, {} not suitable) to {}",
                samples.len(),
                positives,
                samples.len() - positives,
                out.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Train { out, seed } => {
            let table = load_rules(&rules_path)?;
            let out = match out {
                Some(p) => p,
                None => config.model_path()?,
            };
            let seed = seed.unwrap_or(config.generator.seed);

            let generator = SampleGenerator::new(config.generator.settings());
            let samples = generator
                .generate(&table, &mut StdRng::seed_from_u64(seed))
                .context("Failed to generate synthetic rows")?;

            let mut rng = StdRng::seed_from_u64(config.training.seed);
            let model = scoring::train(&samples, &config.training, &mut rng)
                .context("Failed to train suitability model")?;
            model
                .save(&out)
                .with_context(|| format!("Failed to save model to {}", out.display()))?;

            print!("{}", model.report);
            println!("Model saved to {}", out.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Evaluate {
            query,
            threshold,
            model,
        } => {
            let table = load_rules(&rules_path)?;
            let model_path = match model {
                Some(p) => p,
                None => config.model_path()?,
            };
            let model = TrainedModel::load(&model_path)
                .context("Scoring needs a trained model; run `cropcare train` or use `advise`")?;

            let query = to_query(&query).with_threshold(threshold.unwrap_or(config.threshold));
            if !(0.0..=1.0).contains(&query.threshold) {
                anyhow::bail!("threshold must be within [0, 1], got {}", query.threshold);
            }

            let evaluator = SuitabilityEvaluator::new(&table, &model);
            let result = evaluator.evaluate(&query);
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Advise { query } => {
            let table = load_rules(&rules_path)?;
            let report = advise(&table, &query.crop, &query.stage, &query.reading());
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ranges { crop, stage } => {
            let table = load_rules(&rules_path)?;
            print_ranges(&table, &crop, &stage);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 0 for a clean rule source, 1 when lint found anything.
fn lint_exit_code(defects: &[RangeDefect]) -> u8 {
    u8::from(!defects.is_empty())
}

fn load_rules(path: &Path) -> anyhow::Result<RangeTable> {
    RangeTable::load(path).with_context(|| format!("Failed to load rule source {}", path.display()))
}

fn to_query(args: &QueryArgs) -> SuitabilityQuery {
    SuitabilityQuery::new(args.crop.clone(), args.stage.clone(), args.reading())
}

fn print_ranges(table: &RangeTable, crop: &str, stage: &str) {
    let resolver = RangeResolver::new(table);
    let source = resolver.resolve(crop, stage);

    println!("{} / {} -> {}", crop, stage, source.describe());
    if source.is_generic() {
        println!("(no declared ranges matched, flags use the generic fallback)");
    }
    println!("{:<12} {:>24} {:>24}", "feature", "flag range", "sampling range");
    for feature in Feature::ALL {
        println!(
            "{:<12} {:>24} {:>24}",
            feature.as_str(),
            resolver.flag_range(&source, feature).to_string(),
            resolver.sampling_range(&source, feature).to_string()
        );
    }
}
