use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, test_summary, OnFailure};

/// Integration test binaries under `crates/*/tests`.
const INTEGRATION_TESTS: &[(&str, &str)] = &[
    ("platform", "conversion_proptest"),
    ("platform", "staging_regions"),
    ("firmware", "integration_cycle"),
    ("firmware", "pipeline_proptest"),
    ("firmware", "arch_boundaries"),
];

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();

    if !integration_only {
        let out = cargo("Unit tests", &["test", "--lib", "--workspace"], OnFailure::Fail)?;
        println!("    {}", test_summary(&String::from_utf8_lossy(&out.stdout)).dimmed());
    }

    if !unit_only {
        for &(package, test) in INTEGRATION_TESTS {
            let label = format!("{package}::{test}");
            let out = cargo(&label, &["test", "-p", package, "--test", test], OnFailure::Fail)?;
            println!("    {}", test_summary(&String::from_utf8_lossy(&out.stdout)).dimmed());
        }
    }

    // Doc examples are informative; a failure is reported but not fatal.
    cargo("Doc tests", &["test", "--doc", "--workspace"], OnFailure::Warn)?;

    println!(
        "{}",
        format!(
            "✓ All tests completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
