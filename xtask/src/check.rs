use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, OnFailure, TARGET};

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking workspace builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    cargo(
        "Hardware image (Cortex-M7)",
        &["check", "-p", "firmware", "--target", TARGET, "--features", "hardware"],
        OnFailure::Fail,
    )?;
    cargo(
        "Host simulator",
        &["check", "-p", "firmware", "--features", "emulator", "--bins"],
        OnFailure::Fail,
    )?;
    // Abstraction layer must build without std and without any log backend.
    cargo(
        "Platform HAL (no_std)",
        &["check", "-p", "platform", "--target", TARGET, "--no-default-features"],
        OnFailure::Fail,
    )?;
    cargo(
        "Pipeline library (no_std, no log backend)",
        &["check", "-p", "firmware", "--lib", "--target", TARGET],
        OnFailure::Fail,
    )?;
    cargo(
        "Clippy",
        &["clippy", "--workspace", "--all-targets", "--features", "firmware/emulator", "--", "-D", "warnings"],
        OnFailure::Warn,
    )?;
    let fmt = cargo("Formatting", &["fmt", "--all", "--check"], OnFailure::Warn)?;
    if !fmt.status.success() {
        eprintln!("     Run 'cargo fmt --all' to fix");
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
