//! Injection orchestrator: sequences registry lookups, block lookups and
//! field rewrites per model.
//!
//! Models are processed one at a time in schema order against a single
//! [`DeclarationBuffer`]. Every declaration is looked up by name right before
//! it is rewritten; block handles survive insertions, so earlier steps never
//! invalidate later lookups.

use idbrand_decl::{BlockId, DeclarationBuffer, FieldRewrite};
use idbrand_schema::{
    ModelRegistry, NominalType, RegisteredModel, SchemaDescription, conventional_column_name,
};
use tracing::{debug, info, warn};

use crate::{AliasPlacement, BrandConfig, BrandReport, Coverage, ModelReport, RegionReport};

/// Rewritten declarations and what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandOutput {
    pub text: String,
    pub report: BrandReport,
}

/// Give every qualifying model a nominal identifier type and retype its
/// identifier and all foreign keys referencing it.
///
/// Running this on its own output returns the text unchanged.
pub fn brand_declarations(
    schema: &SchemaDescription,
    source: &str,
    config: &BrandConfig,
) -> BrandOutput {
    let registry = ModelRegistry::build(schema);
    let mut injector = Injector::new(&registry, config, source);
    injector.run();
    let output = injector.finish();
    info!(
        mode = %config.mode,
        coverage = %config.coverage,
        models = output.report.models.len(),
        aliases = output.report.aliases_inserted(),
        replacements = output.report.total_replacements(),
        "branded identifier types"
    );
    output
}

struct Injector<'a> {
    registry: &'a ModelRegistry,
    config: &'a BrandConfig,
    buffer: DeclarationBuffer,
    report: BrandReport,
    /// Last declaration of the helper prelude or of a fallback alias.
    fallback_anchor: Option<BlockId>,
}

impl<'a> Injector<'a> {
    fn new(registry: &'a ModelRegistry, config: &'a BrandConfig, source: &str) -> Self {
        Self {
            registry,
            config,
            buffer: DeclarationBuffer::parse(source),
            report: BrandReport {
                mode: config.mode,
                ..Default::default()
            },
            fallback_anchor: None,
        }
    }

    fn finish(self) -> BrandOutput {
        BrandOutput {
            text: self.buffer.into_text(),
            report: self.report,
        }
    }

    fn run(&mut self) {
        let registry = self.registry;
        if registry.branded_models().next().is_none() {
            debug!("no model has a single string identifier");
            return;
        }
        self.insert_prelude();
        for model in registry.branded_models() {
            self.brand_model(model);
        }
    }

    fn insert_prelude(&mut self) {
        let mode = self.config.mode;
        let declared = self.buffer.contains_block(mode.marker_interface())
            && self.buffer.contains_block(mode.marker_alias());
        if !declared {
            self.buffer.prepend(mode.prelude());
            self.report.prelude_inserted = true;
        }
        self.fallback_anchor = self.buffer.find(mode.marker_alias());
    }

    fn brand_model(&mut self, model: &RegisteredModel) {
        let (Some(identifier), Some(nominal)) = (model.identifier(), model.nominal()) else {
            return;
        };
        debug!(model = %model.name, nominal = %nominal.name, "branding model");
        let mut report = ModelReport::new(&model.name, &nominal.name);

        report.alias = self.insert_alias(&model.name, nominal);

        let own = FieldRewrite::new(&identifier.name, &nominal.name);
        self.rewrite_payload(&model.name, &own, &mut report);
        if let Some(primary) = self.buffer.find_with_body(&model.name) {
            self.rewrite_block(primary, &own, &mut report);
        }

        self.rewrite_conventional_references(&model.name, nominal, &mut report);

        self.rewrite_named(&format!("{}WhereInput", model.name), &own, &mut report);
        self.rewrite_named(&format!("{}WhereUniqueInput", model.name), &own, &mut report);

        if self.config.coverage == Coverage::Extended {
            let variants = self
                .buffer
                .blocks_where(|name| is_extended_variant(&model.name, name));
            for id in variants {
                self.rewrite_block(id, &own, &mut report);
            }
        }

        let registry = self.registry;
        for foreign_key in model.foreign_keys() {
            let Some(target) = registry.nominal_type(&foreign_key.target) else {
                continue;
            };
            let rule = FieldRewrite::new(&foreign_key.column, &target.name);
            self.rewrite_payload(&model.name, &rule, &mut report);
            self.rewrite_owned(&model.name, &rule, &mut report);
        }

        if !report.missing.is_empty() {
            debug!(model = %model.name, missing = ?report.missing, "declarations not found");
        }
        self.report.models.push(report);
    }

    /// Declare the nominal type above the model's primary declaration.
    fn insert_alias(&mut self, model: &str, nominal: &NominalType) -> AliasPlacement {
        if self.buffer.contains_block(&nominal.name) {
            return AliasPlacement::AlreadyDeclared;
        }
        let mode = self.config.mode;
        if let Some(primary) = self.buffer.find(model) {
            let declaration = mode.alias_declaration(nominal, self.buffer.block(primary).indent());
            self.buffer.insert_before(primary, &declaration);
            return AliasPlacement::BeforePrimary;
        }

        warn!(
            model,
            nominal = %nominal.name,
            "primary declaration not found, declaring nominal type after helpers"
        );
        let declaration = mode.alias_declaration(nominal, "");
        match self.fallback_anchor {
            Some(anchor) => self.buffer.insert_after(anchor, &declaration),
            None => self.buffer.prepend(&declaration),
        }
        self.fallback_anchor = self.buffer.find(&nominal.name);
        AliasPlacement::AfterPrelude
    }

    /// `userId`-style columns, in models the registry confirms reference this one.
    fn rewrite_conventional_references(
        &mut self,
        model: &str,
        nominal: &NominalType,
        report: &mut ModelReport,
    ) {
        let column = conventional_column_name(model);
        let registry = self.registry;
        let rule = FieldRewrite::new(&column, &nominal.name);
        for owner in registry.models_referencing(model, &column) {
            self.rewrite_owned(owner, &rule, report);
        }
    }

    fn rewrite_payload(&mut self, model: &str, rule: &FieldRewrite<'_>, report: &mut ModelReport) {
        let payload = self
            .buffer
            .find_with_body(&format!("${model}Payload"))
            .or_else(|| self.buffer.find_with_body(&format!("{model}Payload")));
        match payload {
            Some(id) => self.rewrite_block(id, rule, report),
            None => record_missing(report, format!("${model}Payload")),
        }
    }

    fn rewrite_named(&mut self, name: &str, rule: &FieldRewrite<'_>, report: &mut ModelReport) {
        match self.buffer.find_with_body(name) {
            Some(id) => self.rewrite_block(id, rule, report),
            None => record_missing(report, name.to_string()),
        }
    }

    /// Every declaration generated for `owner`.
    fn rewrite_owned(&mut self, owner: &str, rule: &FieldRewrite<'_>, report: &mut ModelReport) {
        let registry = self.registry;
        let owned = self
            .buffer
            .blocks_where(|name| registry.owner_of(name) == Some(owner));
        for id in owned {
            self.rewrite_block(id, rule, report);
        }
    }

    fn rewrite_block(&mut self, id: BlockId, rule: &FieldRewrite<'_>, report: &mut ModelReport) {
        let mut replaced = 0;
        self.buffer.rewrite_body(id, |body| {
            let rewritten = rule.apply(body);
            replaced = rewritten.replaced;
            rewritten.into_changed()
        });
        if replaced > 0 {
            report.rewrites.push(RegionReport {
                declaration: self.buffer.block(id).name().to_string(),
                field: rule.field().to_string(),
                nominal: rule.nominal().to_string(),
                replaced,
            });
        }
    }
}

fn record_missing(report: &mut ModelReport, name: String) {
    if !report.missing.contains(&name) {
        report.missing.push(name);
    }
}

/// Create/update inputs of `model` (checked and unchecked, including the
/// many and without-relation variants) and its scalar-where filters.
fn is_extended_variant(model: &str, declaration: &str) -> bool {
    let Some(rest) = declaration.strip_prefix(model) else {
        return false;
    };
    if matches!(rest, "ScalarWhereInput" | "ScalarWhereWithAggregatesInput") {
        return true;
    }
    let rest = rest.strip_prefix("Unchecked").unwrap_or(rest);
    let Some(rest) = rest
        .strip_prefix("Create")
        .or_else(|| rest.strip_prefix("Update"))
    else {
        return false;
    };
    let Some(suffix) = rest.strip_suffix("Input") else {
        return false;
    };
    suffix.is_empty()
        || (suffix.starts_with(|c: char| c.is_ascii_uppercase())
            && suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
}
