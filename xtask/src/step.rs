//! One cargo invocation reported as a pass/fail step.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output, Stdio};
use std::time::Instant;

/// Hardware target triple of the firmware image.
pub const TARGET: &str = "thumbv7em-none-eabihf";

/// How a failing step affects the task.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Abort the task.
    Fail,
    /// Print the output and carry on.
    Warn,
}

/// Run `cargo <args>`, print a timed pass line or the captured output.
///
/// Returns the process output so callers can mine it (test summaries).
pub fn cargo(label: &str, args: &[&str], on_failure: OnFailure) -> Result<Output> {
    println!("{}", format!("  {label}...").cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(args)
        .output()
        .with_context(|| format!("Failed to run cargo {}", args.join(" ")))?;

    if output.status.success() {
        println!(
            "{}",
            format!("  ✓ {label} passed in {:.2}s", start.elapsed().as_secs_f64()).green()
        );
    } else {
        match on_failure {
            OnFailure::Fail => eprintln!("{}", format!("  ✗ {label} failed").red().bold()),
            OnFailure::Warn => eprintln!("{}", format!("  ⚠ {label} reported problems").yellow().bold()),
        }
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        eprintln!("{}", String::from_utf8_lossy(&output.stdout));
        if on_failure == OnFailure::Fail {
            anyhow::bail!("{label} failed");
        }
    }
    println!();
    Ok(output)
}

/// Run the host simulator with inherited stdio so its log stream is visible.
pub fn sim(args: &[String]) -> Result<()> {
    let status = Command::new("cargo")
        .args(["run", "-p", "firmware", "--bin", "capture-sim", "--features", "emulator", "--"])
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .context("Failed to run capture-sim")?;
    if !status.success() {
        anyhow::bail!("capture-sim exited with {status}");
    }
    Ok(())
}

/// Pull the `test result:` tail out of libtest output.
pub fn test_summary(output: &str) -> String {
    output
        .lines()
        .filter_map(|line| line.split("test result:").nth(1))
        .map(str::trim)
        .last()
        .map_or_else(|| "(summary not available)".to_string(), str::to_string)
}
