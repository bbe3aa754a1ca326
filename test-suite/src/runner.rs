use std::path::PathBuf;

use anyhow::Result;

use crate::{TestFailure, TestResults, collect_cases};

pub struct TestRunner {
    cases_dir: PathBuf,
}

impl TestRunner {
    pub fn new(cases_dir: impl Into<PathBuf>) -> Self {
        Self {
            cases_dir: cases_dir.into(),
        }
    }

    /// Discover and run all test cases
    pub fn run_all(&self) -> Result<TestResults> {
        if !self.cases_dir.is_dir() {
            anyhow::bail!("Cases directory not found: {}", self.cases_dir.display());
        }

        let mut results = TestResults::new();
        for case in collect_cases(&self.cases_dir) {
            let case = match case {
                Ok(case) => case,
                Err(e) => {
                    results.add_failure(TestFailure::new(
                        e.path().display().to_string(),
                        format!("Failed to load test case: {e}"),
                    ));
                    continue;
                }
            };

            let result = case.run_all();
            if result.all_passed() {
                results.add_pass();
                continue;
            }
            for failed in result.failed_scenarios() {
                if let crate::ScenarioResult::Failed { error } = &failed.result {
                    results.add_failure(TestFailure::new(
                        format!("{} ({})", case.name, failed.name),
                        error.clone(),
                    ));
                }
            }
        }
        Ok(results)
    }
}
