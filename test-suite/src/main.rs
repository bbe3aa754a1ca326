//! Custom test runner for the idbrand test suite.
//!
//! This binary runs all case directories and reports results in a friendly format:
//! - blog 2/2 PASS
//! - composite-key 1/2 FAIL

use clap::Parser;
use rayon::prelude::*;
use test_suite::{Case, CaseResult, CollectCasesError, ScenarioResult, cases_dir, collect_cases};

#[derive(Parser)]
#[command(name = "test-suite", about = "idbrand test suite runner")]
struct Args {
    /// Filter tests by name pattern (substring match)
    #[arg(short, long)]
    filter: Option<String>,

    /// Show short error summaries instead of detailed output
    #[arg(short, long)]
    short: bool,
}

/// ANSI color codes
mod colors {
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RESET: &str = "\x1b[0m";
}

enum CaseOutcome {
    Ran { name: String, result: CaseResult },
    LoadError { name: String, error: String },
}

impl CaseOutcome {
    fn name(&self) -> &str {
        match self {
            CaseOutcome::Ran { name, .. } | CaseOutcome::LoadError { name, .. } => name,
        }
    }
}

fn main() {
    let args = Args::parse();
    let exit_code = run(&args);
    std::process::exit(exit_code);
}

fn run(args: &Args) -> i32 {
    println!(
        "\n{}{}idbrand Test Suite{}",
        colors::BOLD,
        colors::CYAN,
        colors::RESET
    );
    println!("{}{}", colors::DIM, "=".repeat(50));
    println!("{}\n", colors::RESET);

    let base = cases_dir();
    let cases: Vec<Result<Case, CollectCasesError>> = collect_cases(&base)
        .into_iter()
        .filter(|case| match (&args.filter, case) {
            (None, _) => true,
            (Some(filter), Ok(case)) => case.name.contains(filter.as_str()),
            (Some(filter), Err(e)) => e.path().display().to_string().contains(filter.as_str()),
        })
        .collect();

    if cases.is_empty() {
        println!(
            "{}{}Warning:{} No test cases found{}",
            colors::BOLD,
            colors::YELLOW,
            colors::RESET,
            if args.filter.is_some() {
                " matching filter"
            } else {
                ""
            }
        );
        return 0;
    }

    let mut outcomes: Vec<CaseOutcome> = cases
        .par_iter()
        .map(|case| match case {
            Ok(case) => CaseOutcome::Ran {
                name: case.name.clone(),
                result: case.run_all(),
            },
            Err(e) => CaseOutcome::LoadError {
                name: e
                    .path()
                    .strip_prefix(&base)
                    .unwrap_or(e.path())
                    .display()
                    .to_string(),
                error: e.to_string(),
            },
        })
        .collect();
    outcomes.sort_by(|a, b| a.name().cmp(b.name()));

    let mut passed = 0;
    let mut failed = 0;
    let mut failures: Vec<(String, String)> = Vec::new();

    for outcome in &outcomes {
        match outcome {
            CaseOutcome::Ran { name, result } => {
                let (status, color) = if result.all_passed() {
                    passed += 1;
                    ("PASS", colors::GREEN)
                } else {
                    failed += 1;
                    ("FAIL", colors::RED)
                };
                println!(
                    "  {}{}{}{} {} {}{}/{}{}",
                    colors::BOLD,
                    color,
                    status,
                    colors::RESET,
                    name,
                    colors::DIM,
                    result.passed_count(),
                    result.total_count(),
                    colors::RESET
                );
                for scenario in result.failed_scenarios() {
                    if let ScenarioResult::Failed { error } = &scenario.result {
                        failures.push((format!("{name} ({})", scenario.name), error.clone()));
                    }
                }
            }
            CaseOutcome::LoadError { name, error } => {
                println!(
                    "  {}{}LOAD ERROR{} {}",
                    colors::BOLD,
                    colors::RED,
                    colors::RESET,
                    name
                );
                failed += 1;
                failures.push((name.clone(), error.clone()));
            }
        }
    }

    if !failures.is_empty() {
        println!("\n{}{}Failures{}", colors::BOLD, colors::RED, colors::RESET);
        for (name, error) in &failures {
            println!("\n{}{}{}", colors::BOLD, name, colors::RESET);
            if args.short {
                println!("  {}", error.lines().next().unwrap_or_default());
            } else {
                for line in error.lines() {
                    println!("  {line}");
                }
            }
        }
    }

    println!("\n{}{}Summary{}", colors::BOLD, colors::CYAN, colors::RESET);
    println!("{}{}", colors::DIM, "-".repeat(50));
    println!("{}", colors::RESET);
    println!(
        "  {}{} passed{}, {}{} failed{}",
        colors::GREEN,
        passed,
        colors::RESET,
        if failed > 0 { colors::RED } else { colors::DIM },
        failed,
        colors::RESET
    );

    if failed > 0 { 1 } else { 0 }
}
