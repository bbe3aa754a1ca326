use anyhow::Context;

#[derive(clap::Args)]
pub struct Args {
    /// Print on a single line
    #[arg(long)]
    pub compact: bool,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let manifest = idbrand::manifest();
    let json = if args.compact {
        serde_json::to_string(&manifest)
    } else {
        serde_json::to_string_pretty(&manifest)
    }
    .context("Failed to serialize manifest")?;
    println!("{json}");
    Ok(())
}
