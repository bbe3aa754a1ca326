//! Summary of what a branding run changed.

use crate::BrandMode;

/// Where a model's nominal type declaration ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasPlacement {
    /// Directly above the model's primary declaration.
    BeforePrimary,
    /// The primary declaration was not found; placed after the helper declarations.
    AfterPrelude,
    /// A declaration with that name already existed.
    AlreadyDeclared,
}

/// Replacements made in one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionReport {
    pub declaration: String,
    pub field: String,
    pub nominal: String,
    pub replaced: usize,
}

/// Everything done for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReport {
    pub model: String,
    pub nominal: String,
    pub alias: AliasPlacement,
    pub rewrites: Vec<RegionReport>,
    /// Declarations looked up by name that were not present.
    pub missing: Vec<String>,
}

impl ModelReport {
    pub fn new(model: impl Into<String>, nominal: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            nominal: nominal.into(),
            alias: AliasPlacement::AlreadyDeclared,
            rewrites: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn replacements(&self) -> usize {
        self.rewrites.iter().map(|rewrite| rewrite.replaced).sum()
    }

    /// Replacements made in `declaration`, for any field.
    pub fn replacements_in(&self, declaration: &str) -> usize {
        self.rewrites
            .iter()
            .filter(|rewrite| rewrite.declaration == declaration)
            .map(|rewrite| rewrite.replaced)
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandReport {
    pub mode: BrandMode,
    pub prelude_inserted: bool,
    pub models: Vec<ModelReport>,
}

impl BrandReport {
    pub fn model(&self, name: &str) -> Option<&ModelReport> {
        self.models.iter().find(|model| model.model == name)
    }

    pub fn total_replacements(&self) -> usize {
        self.models.iter().map(ModelReport::replacements).sum()
    }

    pub fn aliases_inserted(&self) -> usize {
        self.models
            .iter()
            .filter(|model| model.alias != AliasPlacement::AlreadyDeclared)
            .count()
    }

    /// Whether the run left the text untouched.
    pub fn is_unchanged(&self) -> bool {
        !self.prelude_inserted && self.aliases_inserted() == 0 && self.total_replacements() == 0
    }
}
