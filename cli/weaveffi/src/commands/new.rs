//! `weaveffi new`: project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use weaveffi_core::naming;

use crate::manifest::{WeaveManifest, DEFAULT_INPUT, DEFAULT_OUT_DIR, MANIFEST_FILE};

/// Create a new project in the directory `name`, relative to cwd.
pub fn run(name: &str) -> Result<()> {
    create_project(Path::new(name), name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }
    fs::create_dir_all(project_dir)
        .with_context(|| format!("creating {}", project_dir.display()))?;

    fs::write(project_dir.join(MANIFEST_FILE), WeaveManifest::template(name))
        .with_context(|| format!("writing {MANIFEST_FILE}"))?;
    fs::write(project_dir.join(DEFAULT_INPUT), starter_api(&module_name(name)))
        .with_context(|| format!("writing {DEFAULT_INPUT}"))?;
    fs::write(project_dir.join(".gitignore"), format!("{DEFAULT_OUT_DIR}/\n"))
        .context("writing .gitignore")?;

    println!("Created project '{name}'");
    println!("  {name}/{MANIFEST_FILE}");
    println!("  {name}/{DEFAULT_INPUT}");
    println!("  {name}/.gitignore");
    Ok(())
}

/// Turn a project name into a module name that passes `validate`.
fn module_name(project: &str) -> String {
    let mut out: String = project
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) || out.starts_with("__wf") {
        out.insert_str(0, "lib_");
    }
    if is_usable_module(&out) {
        return out;
    }
    // Keywords such as `match` only need a trailing underscore; names whose
    // type name is still taken (`self` -> `Self`, `data` -> `Data`) do not.
    let suffixed = format!("{out}_");
    if is_usable_module(&suffixed) {
        return suffixed;
    }
    format!("{out}_lib")
}

fn is_usable_module(name: &str) -> bool {
    let type_name = naming::to_camel(name);
    naming::check_identifier(name).is_ok()
        && !naming::is_reserved(name)
        && naming::check_identifier(&type_name).is_ok()
        && !naming::is_reserved(&type_name)
        && !naming::is_binding_type_name(&type_name)
}

fn starter_api(module: &str) -> String {
    format!(
        r#"version = "0.1.0"

[[modules]]
name = "{module}"

[[modules.functions]]
name = "add"
doc = "Add two integers."
params = [
  {{ name = "a", type = "i32" }},
  {{ name = "b", type = "i32" }},
]
return = "i32"
"#
    )
}
