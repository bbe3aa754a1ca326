//! Generate command - the step the host pipeline runs after the client is emitted.

use std::path::PathBuf;

use anyhow::Context;
use idbrand::{BrandConfig, EnvValue, GenerateOutcome, GeneratorOptions, generate};
use tracing::info;

use crate::args::BrandArgs;

#[derive(clap::Args)]
pub struct Args {
    /// Path to the generator options JSON handed over by the host
    #[arg(long)]
    pub options: PathBuf,

    /// Declarations file to rewrite, overriding the options' output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub brand: BrandArgs,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let mut options = GeneratorOptions::from_path(&args.options)
        .with_context(|| format!("Failed to load {}", args.options.display()))?;

    if let Some(output) = &args.output {
        options.generator.output = Some(EnvValue {
            value: Some(output.display().to_string()),
            from_env_var: None,
        });
    }
    let config = &mut options.generator.config;
    if let Some(mode) = args.brand.mode {
        config.insert(BrandConfig::MODE_KEY.to_string(), mode.to_string());
    }
    if let Some(coverage) = args.brand.coverage {
        config.insert(BrandConfig::COVERAGE_KEY.to_string(), coverage.to_string());
    }

    match generate(&options)? {
        GenerateOutcome::Skipped => {}
        GenerateOutcome::Written { path, report } => {
            info!(
                path = %path.display(),
                models = report.models.len(),
                replacements = report.total_replacements(),
                "done"
            );
        }
    }
    Ok(())
}
