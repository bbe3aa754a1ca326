//! Apply command - rewrite a declarations file directly, outside a host pipeline.

use std::path::PathBuf;

use anyhow::Context;
use idbrand::schema::SchemaDescription;
use idbrand::{BrandConfig, BrandReport, brand_declarations, generate_file};
use tracing::debug;

use crate::args::BrandArgs;

#[derive(clap::Args)]
pub struct Args {
    /// Schema description JSON (full data model document or bare datamodel)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Declarations file to rewrite
    #[arg(short, long)]
    pub input: PathBuf,

    /// Print the result instead of overwriting the input
    #[arg(long)]
    pub stdout: bool,

    #[command(flatten)]
    pub brand: BrandArgs,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let schema = SchemaDescription::from_path(&args.schema)
        .with_context(|| format!("Failed to load {}", args.schema.display()))?;
    let config = args.brand.apply_to(BrandConfig::default());

    let report = if args.stdout {
        let source = std::fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read {}", args.input.display()))?;
        let output = brand_declarations(&schema, &source, &config);
        print!("{}", output.text);
        output.report
    } else {
        generate_file(&args.input, &schema, &config)?
    };
    log_report(&report);
    Ok(())
}

fn log_report(report: &BrandReport) {
    for model in &report.models {
        debug!(
            model = %model.model,
            nominal = %model.nominal,
            alias = ?model.alias,
            replacements = model.replacements(),
            missing = model.missing.len(),
            "model summary"
        );
    }
}
