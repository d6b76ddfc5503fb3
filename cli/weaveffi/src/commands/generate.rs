//! `weaveffi generate`: run target generators over an IDL file.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use weaveffi_core::{GenerationReport, Generator, Orchestrator};
use weaveffi_gen::{all_generators, generator_by_name};

/// Load `input`, validate it, and run the selected generators into `out_dir`.
///
/// An empty `targets` list runs every generator.
pub fn run(input: &Path, out_dir: &Path, targets: &[String]) -> Result<GenerationReport> {
    let api = weaveffi_ir::load_api(input)
        .with_context(|| format!("loading {}", input.display()))?;

    let generators = select_generators(targets)?;
    let orchestrator = generators
        .iter()
        .fold(Orchestrator::new(), |o, g| o.with_generator(g.as_ref()));
    debug!(targets = ?orchestrator.generator_names(), "selected generators");

    let report = orchestrator
        .run(&api, out_dir)
        .with_context(|| format!("generating bindings for {}", input.display()))?;

    for (name, files) in &report.outputs {
        println!("  {name:<8} {} file(s)", files.len());
    }
    println!(
        "Generated {} file(s) in {}",
        report.file_count(),
        out_dir.display()
    );
    Ok(report)
}

/// Resolve target names, dropping duplicates but keeping first-seen order.
pub(crate) fn select_generators(targets: &[String]) -> Result<Vec<Box<dyn Generator>>> {
    if targets.is_empty() {
        return Ok(all_generators());
    }
    let mut seen: Vec<&str> = Vec::new();
    let mut selected = Vec::new();
    for name in targets {
        if seen.contains(&name.as_str()) {
            continue;
        }
        seen.push(name);
        selected.push(generator_by_name(name)?);
    }
    Ok(selected)
}
