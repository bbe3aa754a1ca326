use std::fs;
use std::path::{Path, PathBuf};

use idbrand::schema::SchemaDescription;
use idbrand::{BrandConfig, ConfigError};
use indexmap::IndexMap;

use crate::scenarios::{ExpectedOutputScenario, IdempotenceScenario, Scenario};

pub const SCHEMA_FILE: &str = "schema.json";
pub const INPUT_FILE: &str = "input.d.ts";
pub const EXPECTED_FILE: &str = "expected.d.ts";
/// Optional generator options, e.g. `{ "mode": "strict" }`.
pub const CONFIG_FILE: &str = "config.json";

/// One case directory: a schema, the generated declarations and the expected rewrite.
pub struct Case {
    pub path: PathBuf,
    pub name: String,
    pub schema: SchemaDescription,
    pub config: BrandConfig,
    pub input: String,
    pub expected: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CollectCasesError {
    #[error("IO error at {}: {error}", .path.display())]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Invalid JSON in {}: {error}", .path.display())]
    JsonError {
        path: PathBuf,
        error: serde_json::Error,
    },
    #[error("Invalid config in {}: {error}", .path.display())]
    ConfigError { path: PathBuf, error: ConfigError },
}

impl CollectCasesError {
    pub fn path(&self) -> &Path {
        match self {
            CollectCasesError::IoError { path, .. }
            | CollectCasesError::JsonError { path, .. }
            | CollectCasesError::ConfigError { path, .. } => path,
        }
    }
}

fn read(path: PathBuf) -> Result<String, CollectCasesError> {
    fs::read_to_string(&path).map_err(|error| CollectCasesError::IoError { path, error })
}

impl Case {
    /// Load the case stored in `dir`, named relative to `base`.
    pub fn load(dir: &Path, base: &Path) -> Result<Self, CollectCasesError> {
        let name = dir
            .strip_prefix(base)
            .unwrap_or(dir)
            .display()
            .to_string()
            .replace('\\', "/");

        let schema_path = dir.join(SCHEMA_FILE);
        let schema = SchemaDescription::from_json(&read(schema_path.clone())?).map_err(
            |error| match error {
                idbrand::schema::SchemaError::Json(error) => CollectCasesError::JsonError {
                    path: schema_path.clone(),
                    error,
                },
                idbrand::schema::SchemaError::Io { path, source } => {
                    CollectCasesError::IoError { path, error: source }
                }
            },
        )?;

        let config_path = dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            let options: IndexMap<String, String> =
                serde_json::from_str(&read(config_path.clone())?).map_err(|error| {
                    CollectCasesError::JsonError {
                        path: config_path.clone(),
                        error,
                    }
                })?;
            BrandConfig::from_generator_config(&options).map_err(|error| {
                CollectCasesError::ConfigError {
                    path: config_path,
                    error,
                }
            })?
        } else {
            BrandConfig::default()
        };

        Ok(Case {
            path: dir.to_path_buf(),
            name,
            schema,
            config,
            input: read(dir.join(INPUT_FILE))?,
            expected: read(dir.join(EXPECTED_FILE))?,
        })
    }

    pub fn scenarios(&self) -> Vec<Scenario<'_>> {
        vec![
            Scenario::ExpectedOutput(ExpectedOutputScenario {
                schema: &self.schema,
                config: &self.config,
                input: &self.input,
                expected: &self.expected,
            }),
            Scenario::Idempotence(IdempotenceScenario {
                schema: &self.schema,
                config: &self.config,
                input: &self.input,
            }),
        ]
    }

    pub fn run_all(&self) -> CaseResult {
        let scenarios = self
            .scenarios()
            .iter()
            .map(|scenario| NamedScenarioResult {
                name: scenario.name(),
                result: match scenario.run() {
                    Ok(()) => ScenarioResult::Passed,
                    Err(error) => ScenarioResult::Failed {
                        error: error.to_string(),
                    },
                },
            })
            .collect();
        CaseResult { scenarios }
    }
}

/// Every directory under `base` that contains an input file, sorted by path.
pub fn collect_cases(base: &Path) -> Vec<Result<Case, CollectCasesError>> {
    let mut dirs = Vec::new();
    if let Err(error) = walk(base, &mut dirs) {
        return vec![Err(CollectCasesError::IoError {
            path: base.to_path_buf(),
            error,
        })];
    }
    dirs.sort();
    dirs.iter().map(|dir| Case::load(dir, base)).collect()
}

fn walk(dir: &Path, dirs: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    if dir.join(INPUT_FILE).is_file() {
        dirs.push(dir.to_path_buf());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, dirs)?;
        }
    }
    Ok(())
}

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub enum ScenarioResult {
    Passed,
    Failed { error: String },
}

impl ScenarioResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, ScenarioResult::Passed)
    }
}

/// Named scenario with its result
#[derive(Debug, Clone)]
pub struct NamedScenarioResult {
    pub name: String,
    pub result: ScenarioResult,
}

/// Result of running all scenarios in a test case
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub scenarios: Vec<NamedScenarioResult>,
}

impl CaseResult {
    pub fn passed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| s.result.is_passed()).count()
    }

    pub fn total_count(&self) -> usize {
        self.scenarios.len()
    }

    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.result.is_passed())
    }

    pub fn failed_scenarios(&self) -> Vec<&NamedScenarioResult> {
        self.scenarios.iter().filter(|s| !s.result.is_passed()).collect()
    }
}
