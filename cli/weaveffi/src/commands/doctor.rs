//! `weaveffi doctor`: toolchain diagnostics.

use std::path::Path;
use std::process::Command;

use anyhow::Result;

use crate::manifest::WeaveManifest;

/// Print toolchain and project diagnostics.
pub fn run(project_dir: &Path) -> Result<()> {
    println!("=== WeaveFFI Doctor ===");
    println!();
    println!("WeaveFFI version: {}", env!("CARGO_PKG_VERSION"));
    println!("Targets:          {}", weaveffi_gen::TARGETS.join(", "));
    println!();

    println!("--- System Tools ---");
    print_tool_status("cargo", &["--version"]);
    print_tool_status("cc", &["--version"]);
    print_tool_status("swift", &["--version"]);
    print_tool_status("node", &["--version"]);
    println!();

    println!("--- Project Status ---");
    match WeaveManifest::find_and_load(project_dir) {
        Ok(Some((manifest, dir))) => {
            println!("  weaveffi.toml: found at {}", dir.display());
            println!("  Project:       {}", manifest.project.name);
            println!("  Version:       {}", manifest.project.version);
            if !manifest.targets().is_empty() {
                println!("  Targets:       {}", manifest.targets().join(", "));
            }
        }
        Ok(None) => println!("  weaveffi.toml: not found"),
        Err(e) => println!("  weaveffi.toml: error: {e:#}"),
    }
    Ok(())
}

fn print_tool_status(name: &str, args: &[&str]) {
    match Command::new(name).args(args).output() {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout);
            let first_line = version.lines().next().unwrap_or("(unknown version)");
            println!("  {name}: {first_line}");
        }
        Err(_) => println!("  {name}: not found"),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn doctor_runs_without_error() {
        let dir = tempfile::tempdir().unwrap();
        super::run(dir.path()).unwrap();
    }
}
