use clap::{Parser, Subcommand};

mod args;
mod logging;

mod commands {
    pub mod apply;
    pub mod generate;
    pub mod manifest;
}

#[derive(Parser)]
#[command(
    name = "idbrand",
    version,
    about = "Nominal identifier types for generated client declarations"
)]
struct Cli {
    /// Log per-model details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the generator manifest as JSON
    Manifest(commands::manifest::Args),
    /// Rewrite the declarations file named by generator options
    Generate(commands::generate::Args),
    /// Rewrite a declarations file against a schema description
    Apply(commands::apply::Args),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Manifest(args) => commands::manifest::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Apply(args) => commands::apply::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idbrand::{BrandConfig, BrandMode, Coverage};

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from([
            "idbrand",
            "apply",
            "--schema",
            "schema.json",
            "--input",
            "index.d.ts",
            "--mode",
            "strict",
            "--stdout",
        ])
        .unwrap();
        let Commands::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert!(args.stdout);
        let config = args.brand.apply_to(BrandConfig::default());
        assert_eq!(config.mode, BrandMode::Strict);
        assert_eq!(config.coverage, Coverage::Extended);
    }

    #[test]
    fn test_invalid_coverage_rejected() {
        let result = Cli::try_parse_from([
            "idbrand",
            "generate",
            "--options",
            "options.json",
            "--coverage",
            "everything",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["idbrand", "manifest", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
