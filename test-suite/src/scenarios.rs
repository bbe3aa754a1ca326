use std::fmt;

use idbrand::schema::SchemaDescription;
use idbrand::{BrandConfig, brand_declarations};
use similar::{ChangeTag, TextDiff};

/// A runnable scenario with its name
pub enum Scenario<'a> {
    ExpectedOutput(ExpectedOutputScenario<'a>),
    Idempotence(IdempotenceScenario<'a>),
}

impl Scenario<'_> {
    pub fn name(&self) -> String {
        match self {
            Scenario::ExpectedOutput(s) => format!("expected_output({})", s.config.mode),
            Scenario::Idempotence(_) => "idempotence".to_string(),
        }
    }

    pub fn run(&self) -> Result<(), ScenarioError> {
        match self {
            Scenario::ExpectedOutput(s) => s.run(),
            Scenario::Idempotence(s) => s.run(),
        }
    }
}

/// The rewrite of the input must equal the expected file byte for byte.
pub struct ExpectedOutputScenario<'a> {
    pub schema: &'a SchemaDescription,
    pub config: &'a BrandConfig,
    pub input: &'a str,
    pub expected: &'a str,
}

impl ExpectedOutputScenario<'_> {
    pub fn run(&self) -> Result<(), ScenarioError> {
        let output = brand_declarations(self.schema, self.input, self.config);
        if output.text != self.expected {
            return Err(ScenarioError::ExpectedMismatch {
                expected: self.expected.to_string(),
                actual: output.text,
            });
        }
        Ok(())
    }
}

/// Rewriting the rewrite must change nothing.
pub struct IdempotenceScenario<'a> {
    pub schema: &'a SchemaDescription,
    pub config: &'a BrandConfig,
    pub input: &'a str,
}

impl IdempotenceScenario<'_> {
    pub fn run(&self) -> Result<(), ScenarioError> {
        let first = brand_declarations(self.schema, self.input, self.config);
        let second = brand_declarations(self.schema, &first.text, self.config);
        if second.text != first.text {
            return Err(ScenarioError::NotIdempotent {
                first: first.text,
                second: second.text,
            });
        }
        if !second.report.is_unchanged() {
            return Err(ScenarioError::ReportedChanges {
                replacements: second.report.total_replacements(),
                aliases: second.report.aliases_inserted(),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ScenarioError {
    ExpectedMismatch { expected: String, actual: String },
    NotIdempotent { first: String, second: String },
    ReportedChanges { replacements: usize, aliases: usize },
}

impl std::error::Error for ScenarioError {}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::ExpectedMismatch { expected, actual } => {
                writeln!(f, "Output mismatch.")?;
                write_diff(f, expected, actual)
            }
            ScenarioError::NotIdempotent { first, second } => {
                writeln!(f, "Second run changed the output.")?;
                write_diff(f, first, second)
            }
            ScenarioError::ReportedChanges {
                replacements,
                aliases,
            } => write!(
                f,
                "Second run reported {replacements} replacements and {aliases} inserted aliases"
            ),
        }
    }
}

fn write_diff(f: &mut fmt::Formatter<'_>, expected: &str, actual: &str) -> fmt::Result {
    let diff = TextDiff::from_lines(expected, actual);
    let changed = diff
        .iter_all_changes()
        .any(|change| change.tag() != ChangeTag::Equal);
    if !changed {
        // Same lines, so the difference is in line endings or a missing final newline.
        writeln!(
            f,
            "No visible line differences. Expected length: {}, Actual length: {}",
            expected.len(),
            actual.len()
        )?;
        if let Some(i) = expected
            .bytes()
            .zip(actual.bytes())
            .position(|(e, a)| e != a)
        {
            writeln!(f, "First diff at byte {i}")?;
        }
        return Ok(());
    }

    writeln!(f, "Diff (expected → actual):")?;
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        write!(f, "{hunk}")?;
    }
    Ok(())
}
