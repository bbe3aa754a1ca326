//! Shared argument definitions.

use idbrand::{BrandConfig, BrandMode, Coverage};

/// Brand configuration overrides.
///
/// Can be embedded in other command Args using `#[command(flatten)]`.
#[derive(clap::Args, Clone, Default)]
pub struct BrandArgs {
    /// Brand mode: lenient (plain strings stay assignable) or strict
    #[arg(long)]
    pub mode: Option<BrandMode>,

    /// Declarations the identifier is retyped in: standard or extended
    #[arg(long)]
    pub coverage: Option<Coverage>,
}

impl BrandArgs {
    /// Apply the overrides on top of `config`.
    pub fn apply_to(&self, config: BrandConfig) -> BrandConfig {
        BrandConfig {
            mode: self.mode.unwrap_or(config.mode),
            coverage: self.coverage.unwrap_or(config.coverage),
        }
    }
}
