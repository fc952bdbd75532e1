use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

use crate::{EMBEDDED_TARGET, NO_STD_CRATES};

/// Host docs include the mocks and the serde/tracing surface.
const HOST_FEATURES: &str = "platform/std,platform/serde,machine/std,machine/serde,machine/tracing";

/// `cargo doc` for every no_std crate with `extra` appended.
fn cargo_doc(label: &str, extra: &[&str]) -> Result<()> {
    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.args(["doc", "--no-deps"]);
    for krate in NO_STD_CRATES {
        cmd.args(["-p", krate]);
    }
    cmd.args(extra);

    let output = cmd
        .output()
        .with_context(|| format!("Failed to build {label} documentation"))?;

    if !output.status.success() {
        eprintln!("{}", format!("  ✗ {label} docs failed").red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("{label} documentation build failed");
    }

    println!(
        "{}",
        format!("  ✓ {label} docs in {:.2}s", start.elapsed().as_secs_f64()).green()
    );
    Ok(())
}

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building machine layer documentation...".cyan().bold());
    println!();

    // Bare embedded build first: intra-doc links must not need std.
    cargo_doc(
        &format!("no_std ({EMBEDDED_TARGET})"),
        &["--target", EMBEDDED_TARGET, "--no-default-features"],
    )?;

    let mut host = vec!["--features", HOST_FEATURES];
    if open {
        host.push("--open");
    }
    cargo_doc("host (std, serde, tracing)", &host)?;

    if !open {
        println!();
        println!(
            "   {}",
            "Host docs: target/doc/machine/index.html".dimmed()
        );
        println!(
            "   {}",
            format!("Embedded docs: target/{EMBEDDED_TARGET}/doc/machine/index.html").dimmed()
        );
    }
    println!();

    Ok(())
}
