use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

use crate::step::{cargo, OnFailure, TARGET};

/// probe-rs chip name used when `--chip` is not given.
pub const DEFAULT_CHIP: &str = "ATSAME70Q21B";

pub fn run(release: bool, chip: &str) -> Result<()> {
    let mode = if release { "release" } else { "debug" };

    println!();
    println!(
        "{}",
        format!("🔨 Building firmware ({mode} mode)...").cyan().bold()
    );
    println!();

    let mut args = vec!["build", "-p", "firmware", "--target", TARGET, "--features", "hardware"];
    if release {
        args.push("--release");
    }
    cargo("Firmware image", &args, OnFailure::Fail)?;

    let binary = format!("target/{TARGET}/{mode}/firmware");
    show_binary_size(&binary);

    // probe-rs run flashes, resets and then streams defmt-RTT until the
    // core halts on its final breakpoint.
    println!("{}", format!("📡 Flashing to {chip}...").cyan().bold());
    println!("   {}", "Connecting to probe...".dimmed());

    let flash_start = Instant::now();
    let status = Command::new("probe-rs")
        .args(["run", "--chip", chip, "--probe-index", "0", &binary])
        .status()
        .context("Failed to run probe-rs. Is probe-rs installed? (cargo install probe-rs-tools)")?;

    if !status.success() {
        eprintln!("{}", "✗ Flash or run failed".red().bold());
        anyhow::bail!("probe-rs exited with {status} - check that the probe is connected and the board is powered");
    }

    println!(
        "{}",
        format!(
            "✓ Capture cycle finished in {:.2}s",
            flash_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();

    Ok(())
}

fn show_binary_size(binary: &str) {
    let output = Command::new("rust-size").arg(binary).arg("-A").output();

    if let Ok(out) = output {
        if out.status.success() {
            println!("{}", "📊 Binary size:".cyan());
            for line in String::from_utf8_lossy(&out.stdout).lines() {
                println!("   {}", line.dimmed());
            }
            println!();
        }
    }
}
