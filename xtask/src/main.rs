//! Custom cargo commands for wordtally.
//!
//! Usage:
//!   cargo xtask verify    - Run full verification suite
//!   cargo xtask test      - Run all tests
//!   cargo xtask check     - Quick check (check + test + clippy)
//!   cargo xtask bench     - Run codec benchmarks
//!   cargo xtask fuzz      - Run every fuzz target briefly (nightly)

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::process::Command;

/// Seconds each fuzz target runs under `cargo xtask fuzz`.
const FUZZ_SECONDS: u32 = 30;

fn main() -> Result<()> {
    let task = env::args().nth(1);
    match task.as_deref() {
        Some("verify") => verify()?,
        Some("test") => test()?,
        Some("check") => check()?,
        Some("bench") => bench()?,
        Some("fuzz") => fuzz(env::args().nth(2).as_deref())?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        r#"
cargo xtask <COMMAND>

Commands:
  verify          Run full verification suite (markers + fuzz manifest + tests + clippy)
  test            Run all Rust tests
  check           Quick check (cargo check + test + clippy)
  bench           Run benchmarks
  fuzz [TARGET]   Run fuzz targets for {FUZZ_SECONDS}s each (requires nightly + cargo-fuzz)
"#
    );
}

/// Full verification suite
fn verify() -> Result<()> {
    println!("==========================================");
    println!("wordtally Verification Suite");
    println!("==========================================\n");

    println!("[1/4] Checking invariant markers...");
    check_invariant_markers()?;
    println!("✓ Invariant markers present\n");

    println!("[2/4] Checking fuzz manifest...");
    let targets = fuzz_targets()?;
    println!("✓ {} fuzz targets registered\n", targets.len());

    println!("[3/4] Running Rust tests...");
    run_cargo(&["test", "--quiet"])?;
    println!("✓ All Rust tests passed\n");

    println!("[4/4] Running clippy...");
    run_cargo(&["clippy", "--quiet", "--", "-D", "warnings"])?;
    println!("✓ Clippy passed\n");

    println!("==========================================");
    println!("✓ ALL VERIFICATION CHECKS PASSED");
    println!("==========================================");

    Ok(())
}

/// Run all tests
fn test() -> Result<()> {
    run_cargo(&["test"])
}

/// Quick check
fn check() -> Result<()> {
    println!("Running quick checks...\n");

    println!("[1/3] cargo check...");
    run_cargo(&["check"])?;

    println!("[2/3] cargo test...");
    run_cargo(&["test", "--quiet"])?;

    println!("[3/3] cargo clippy...");
    run_cargo(&["clippy", "--quiet", "--", "-D", "warnings"])?;

    println!("\n✓ Quick checks passed");
    Ok(())
}

/// Run benchmarks
fn bench() -> Result<()> {
    run_cargo(&["bench", "--bench", "codec_bench"])
}

/// Run one fuzz target, or all of them, for a bounded time.
fn fuzz(only: Option<&str>) -> Result<()> {
    let targets = fuzz_targets()?;
    let selected: Vec<&String> = match only {
        Some(name) => {
            let Some(target) = targets.iter().find(|t| t.as_str() == name) else {
                bail!("unknown fuzz target '{}' (have: {})", name, targets.join(", "));
            };
            vec![target]
        }
        None => targets.iter().collect(),
    };

    let max_time = format!("-max_total_time={}", FUZZ_SECONDS);
    for target in selected {
        println!("Fuzzing {} for {}s...", target, FUZZ_SECONDS);
        run_cargo(&["+nightly", "fuzz", "run", target, "--", &max_time])?;
    }
    Ok(())
}

// ============================================================================
// Helper functions
// ============================================================================

fn project_root() -> Result<PathBuf> {
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => env::current_dir().context("Failed to read current directory")?,
    };

    // xtask is in project_root/xtask, so go up one level
    let root = manifest_dir.parent().unwrap_or(&manifest_dir);
    Ok(root.to_path_buf())
}

fn run_cargo(args: &[&str]) -> Result<()> {
    let root = project_root()?;

    let status = Command::new("cargo")
        .args(args)
        .current_dir(&root)
        .status()
        .with_context(|| format!("Failed to run cargo {:?}", args))?;

    if !status.success() {
        bail!("cargo {:?} failed", args);
    }

    Ok(())
}

fn check_invariant_markers() -> Result<()> {
    let root = project_root()?;
    let src_dir = root.join("src");

    let output = Command::new("grep")
        .args(["-r", "INVARIANT:", "--include=*.rs"])
        .current_dir(&src_dir)
        .output()
        .context("Failed to run grep")?;

    let count = output.stdout.split(|&b| b == b'\n').filter(|l| !l.is_empty()).count();

    if count < 5 {
        bail!(
            "Expected at least 5 INVARIANT markers, found {}. Someone may have removed safety comments!",
            count
        );
    }

    Ok(())
}

/// Fuzz target names from fuzz/Cargo.toml, each checked to have a source file.
fn fuzz_targets() -> Result<Vec<String>> {
    let fuzz_dir = project_root()?.join("fuzz");
    let manifest = std::fs::read_to_string(fuzz_dir.join("Cargo.toml"))
        .context("Failed to read fuzz/Cargo.toml")?;

    let mut targets = Vec::new();
    let mut in_bin = false;
    let mut name = None;
    for line in manifest.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_bin = line == "[[bin]]";
            name = None;
        } else if !in_bin {
            continue;
        } else if let Some(value) = line.strip_prefix("name =") {
            name = Some(value.trim().trim_matches('"').to_string());
        } else if let Some(value) = line.strip_prefix("path =") {
            let path = value.trim().trim_matches('"');
            if !fuzz_dir.join(path).exists() {
                bail!("fuzz target source {} is missing", path);
            }
            if let Some(name) = name.take() {
                targets.push(name);
            }
        }
    }

    if targets.is_empty() {
        bail!("No fuzz targets found in fuzz/Cargo.toml");
    }
    Ok(targets)
}
