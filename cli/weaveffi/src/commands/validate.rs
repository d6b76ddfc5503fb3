//! `weaveffi validate`: parse and check an IDL file without generating.

use std::path::Path;

use anyhow::{Context, Result};
use weaveffi_ir::Api;

pub fn run(input: &Path) -> Result<Api> {
    let api = weaveffi_ir::load_api(input)
        .with_context(|| format!("loading {}", input.display()))?;
    weaveffi_core::validate_api(&api)
        .with_context(|| format!("validating {}", input.display()))?;

    println!(
        "{}: OK ({} module(s), {} function(s))",
        input.display(),
        api.modules.len(),
        api.function_count()
    );
    Ok(api)
}
