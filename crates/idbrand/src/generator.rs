//! Generator boundary: the registration handshake and the read-rewrite-write step.

use std::path::{Path, PathBuf};

use idbrand_schema::SchemaDescription;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{BrandConfig, BrandReport, GenerateError, brand_declarations};

pub const GENERATOR_NAME: &str = "idbrand";

/// Output location suggested to the host pipeline, relative to the schema file.
pub const DEFAULT_OUTPUT: &str = "../generated";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorManifest {
    pub version: String,
    pub default_output: String,
    pub pretty_name: String,
}

/// Describe this generator to the host pipeline.
pub fn manifest() -> GeneratorManifest {
    info!("{GENERATOR_NAME}:Registered");
    GeneratorManifest {
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_output: DEFAULT_OUTPUT.to_string(),
        pretty_name: GENERATOR_NAME.to_string(),
    }
}

/// A value that may have been resolved from an environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub from_env_var: Option<String>,
}

/// The generator block of the schema, as handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub output: Option<EnvValue>,
    /// Free-form string options of the generator block.
    #[serde(default)]
    pub config: IndexMap<String, String>,
}

/// Options the host pipeline passes to [`generate`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorOptions {
    #[serde(default)]
    pub generator: GeneratorConfig,
    pub dmmf: SchemaDescription,
}

impl GeneratorOptions {
    pub fn from_json(json: &str) -> Result<Self, GenerateError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GenerateError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| GenerateError::Options {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The declarations file to rewrite, if the host resolved one.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.generator
            .output
            .as_ref()
            .and_then(|output| output.value.as_deref())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    pub fn brand_config(&self) -> Result<BrandConfig, GenerateError> {
        Ok(BrandConfig::from_generator_config(&self.generator.config)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// No output location was configured; nothing was touched.
    Skipped,
    Written { path: PathBuf, report: BrandReport },
}

/// Rewrite the declarations file named by the generator's output option in place.
pub fn generate(options: &GeneratorOptions) -> Result<GenerateOutcome, GenerateError> {
    let Some(path) = options.output_path() else {
        info!("no output location configured, skipping");
        return Ok(GenerateOutcome::Skipped);
    };
    let config = options.brand_config()?;
    let report = generate_file(&path, &options.dmmf, &config)?;
    Ok(GenerateOutcome::Written { path, report })
}

/// Rewrite the declarations file at `path` in place.
///
/// Nothing is written when reading fails.
pub fn generate_file(
    path: &Path,
    schema: &SchemaDescription,
    config: &BrandConfig,
) -> Result<BrandReport, GenerateError> {
    let source = std::fs::read_to_string(path).map_err(|source| GenerateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let output = brand_declarations(schema, &source, config);
    if output.text != source {
        std::fs::write(path, &output.text).map_err(|source| GenerateError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    info!(path = %path.display(), "wrote branded declarations");
    Ok(output.report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BrandMode;

    const OPTIONS: &str = r#"{
        "generator": {
            "name": "ids",
            "provider": { "value": "idbrand", "fromEnvVar": null },
            "output": { "value": "OUTPUT", "fromEnvVar": null },
            "config": { "mode": "strict" }
        },
        "dmmf": {
            "datamodel": {
                "models": [
                    {
                        "name": "User",
                        "fields": [
                            { "name": "id", "kind": "scalar", "type": "String", "isId": true }
                        ]
                    }
                ]
            }
        }
    }"#;

    const DECLARATIONS: &str = "export type User = $Result.DefaultSelection<Prisma.$UserPayload>\n";

    fn options_for(path: &Path) -> GeneratorOptions {
        let json = OPTIONS.replace("OUTPUT", &path.display().to_string().replace('\\', "/"));
        GeneratorOptions::from_json(&json).unwrap()
    }

    #[test]
    fn test_manifest() {
        let manifest = manifest();
        assert_eq!(manifest.default_output, "../generated");
        assert_eq!(manifest.pretty_name, GENERATOR_NAME);
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["defaultOutput"], "../generated");
        assert_eq!(json["prettyName"], "idbrand");
    }

    #[test]
    fn test_options_parse() {
        let options = options_for(Path::new("/tmp/index.d.ts"));
        assert_eq!(options.generator.name, "ids");
        assert_eq!(options.output_path(), Some(PathBuf::from("/tmp/index.d.ts")));
        assert_eq!(options.brand_config().unwrap().mode, BrandMode::Strict);
        assert_eq!(options.dmmf.models.len(), 1);
    }

    #[test]
    fn test_generate_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.d.ts");
        std::fs::write(&path, DECLARATIONS).unwrap();

        let outcome = generate(&options_for(&path)).unwrap();
        let GenerateOutcome::Written { path: written, report } = outcome else {
            panic!("expected a written outcome");
        };
        assert_eq!(written, path);
        assert_eq!(report.aliases_inserted(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("export interface Branding<BrandT> {"));
        assert!(text.contains("export type UserId = Brand<string, '__UserId'>\nexport type User = "));
    }

    #[test]
    fn test_missing_output_is_skipped() {
        let mut options = options_for(Path::new("unused"));
        options.generator.output = None;
        assert_eq!(generate(&options).unwrap(), GenerateOutcome::Skipped);

        options.generator.output = Some(EnvValue::default());
        assert_eq!(generate(&options).unwrap(), GenerateOutcome::Skipped);
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.d.ts");
        let err = generate(&options_for(&path)).unwrap_err();
        assert!(matches!(err, GenerateError::Read { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_mode_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.d.ts");
        std::fs::write(&path, DECLARATIONS).unwrap();
        let mut options = options_for(&path);
        options
            .generator
            .config
            .insert("mode".to_string(), "nominal".to_string());
        let err = generate(&options).unwrap_err();
        assert!(matches!(err, GenerateError::Config(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DECLARATIONS);
    }
}
