//! Reading the two input documents.

use std::path::Path;

use anyhow::{Context, bail};
use mjb_codemodel::CodeModel;
use mjb_typesystem::TypeDatabase;

/// Read a code model document, choosing the parser by extension.
pub fn load_code_model(path: &Path) -> anyhow::Result<CodeModel> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read code model {}", path.display()))?;
    let model = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse code model {}", path.display()))?,
        Some("toml") => toml::from_str(&text)
            .with_context(|| format!("failed to parse code model {}", path.display()))?,
        _ => bail!(
            "unsupported code model format {} (expected .json or .toml)",
            path.display()
        ),
    };
    tracing::debug!(path = %path.display(), "loaded code model");
    Ok(model)
}

/// Read and index a ruleset document.
pub fn load_ruleset(path: &Path) -> anyhow::Result<TypeDatabase> {
    let db = TypeDatabase::load(path)
        .with_context(|| format!("failed to load ruleset {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded ruleset");
    Ok(db)
}
