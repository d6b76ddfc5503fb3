//! Loader stub for a `wasm32-unknown-unknown` build of the library.

use std::path::{Path, PathBuf};

use tracing::info;
use weaveffi_core::naming::c_symbol_name;
use weaveffi_core::{write_file, CodegenError, Generator};
use weaveffi_ir::Api;

pub struct WasmGenerator;

impl Generator for WasmGenerator {
    fn name(&self) -> &'static str {
        "wasm"
    }

    fn generate(&self, api: &Api, out_dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        info!("generating WASM loader stub");
        let dir = out_dir.join("wasm");
        Ok(vec![
            write_file(&dir.join("README.md"), &render_wasm_readme(api))?,
            write_file(&dir.join("weaveffi_wasm.js"), &render_wasm_js())?,
        ])
    }
}

pub fn render_wasm_readme(api: &Api) -> String {
    let mut out = String::from("# WeaveFFI WASM (experimental)\n\n");
    out.push_str(
        "Minimal loader for a `wasm32-unknown-unknown` build of the library.\n\n",
    );
    out.push_str("Build:\n\n```bash\ncargo build --target wasm32-unknown-unknown --release\n```\n\n");
    out.push_str("Serve the `.wasm` file and load it with `weaveffi_wasm.js`:\n\n");
    out.push_str("```js\nimport { loadWeaveFFI } from './weaveffi_wasm.js'\n");
    out.push_str("const exports = await loadWeaveFFI('weaveffi.wasm')\n```\n\n");
    out.push_str("Expected exports:\n\n");
    for m in &api.modules {
        for f in &m.functions {
            out.push_str(&format!("- `{}`\n", c_symbol_name(&m.name, &f.name)));
        }
    }
    out
}

pub fn render_wasm_js() -> String {
    r#"// Generated by WeaveFFI. Do not edit.
export async function loadWeaveFFI(url, imports = {}) {
  const response = await fetch(url)
  const bytes = await response.arrayBuffer()
  const { instance } = await WebAssembly.instantiate(bytes, imports)
  return instance.exports
}
"#
    .to_string()
}
