use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

use crate::{EMBEDDED_TARGET, NO_STD_CRATES};

/// Feature sets each crate must build with on the host, tests included.
const HOST_FEATURE_SETS: [(&str, &[&str]); 2] = [
    ("platform", &["std", "std,serde"]),
    (
        "machine",
        &["std", "std,serde", "std,tracing", "std,serde,tracing"],
    ),
];

/// Run `cargo <args>`; print stderr and bail on failure.
fn cargo(label: &str, args: &[&str]) -> Result<()> {
    println!("{}", format!("  Checking {label}...").cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(args)
        .output()
        .with_context(|| format!("Failed to check {label}"))?;

    if !output.status.success() {
        eprintln!("{}", format!("  ✗ {label} check failed").red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("{label} check failed");
    }

    println!(
        "{}",
        format!(
            "  ✓ {label} passed in {:.2}s",
            start.elapsed().as_secs_f64()
        )
        .green()
    );
    Ok(())
}

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking machine layer builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // Check 1: no_std on the embedded target, bare and with defmt
    for krate in NO_STD_CRATES {
        cargo(
            &format!("{krate} (no_std, {EMBEDDED_TARGET})"),
            &["check", "-p", krate, "--target", EMBEDDED_TARGET, "--no-default-features"],
        )?;
        cargo(
            &format!("{krate} (defmt)"),
            &["check", "-p", krate, "--target", EMBEDDED_TARGET, "--features", "defmt"],
        )?;
    }
    println!();

    // Check 2: host feature combinations, library and test targets
    for (krate, sets) in HOST_FEATURE_SETS {
        for &features in sets {
            cargo(
                &format!("{krate} (host, {features})"),
                &["check", "-p", krate, "--all-targets", "--features", features],
            )?;
        }
    }
    println!();

    // Check 3: Clippy lints
    println!("{}", "  Running clippy lints...".cyan());
    let clippy_start = Instant::now();

    let clippy_output = Command::new("cargo")
        .args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
        .output()
        .context("Failed to run clippy")?;

    if !clippy_output.status.success() {
        eprintln!("{}", "  ⚠ Clippy warnings found".yellow().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&clippy_output.stderr));
        // Don't fail on clippy warnings, just show them
    } else {
        println!(
            "{}",
            format!(
                "  ✓ Clippy passed in {:.2}s",
                clippy_start.elapsed().as_secs_f64()
            )
            .green()
        );
    }
    println!();

    // Check 4: Format check
    println!("{}", "  Checking code formatting...".cyan());

    let fmt_output = Command::new("cargo")
        .args(["fmt", "--all", "--check"])
        .output()
        .context("Failed to run cargo fmt")?;

    if !fmt_output.status.success() {
        eprintln!("{}", "  ⚠ Formatting issues found".yellow().bold());
        eprintln!("     Run 'cargo fmt --all' to fix");
    } else {
        println!("{}", "  ✓ Formatting check passed".green());
    }
    println!();

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
