use std::sync::Arc;

use anyhow::Context;
use mjb_builder::MetaBuilder;
use mjb_codemodel::CodeModel;
use mjb_config::BuilderConfig;
use mjb_typesystem::TypeDatabase;

use crate::cli::{BuildArgs, OutputFormat};
use crate::input::{load_code_model, load_ruleset};
use crate::output::print_result;
use crate::summary::BuildSummary;

/// Handle `mjb build`.
pub fn handle(args: &BuildArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = super::resolve_config(&args.config)?;
    let model = load_code_model(&args.code_model)?;
    let db = load_ruleset(&args.ruleset)?;

    let summary = run(model, db, config)?;
    print_result(&summary, format)
}

fn run(model: CodeModel, db: TypeDatabase, config: BuilderConfig) -> anyhow::Result<BuildSummary> {
    let mut builder = MetaBuilder::new(Arc::new(db), config);
    builder.build(model).context("meta model build failed")?;

    let rejects = builder.rejects().clone();
    let model = builder.into_model();
    tracing::info!(
        classes = model.classes.len(),
        templates = model.templates.len(),
        global_functions = model.global_functions.len(),
        "meta model built"
    );
    Ok(BuildSummary::new(&model, &rejects))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const MODEL: &str = r#"{
  "global": {
    "classes": [
      { "name": "Circle", "base_classes": [ { "name": "Shape", "access": "public" } ] },
      { "name": "Shape" },
      { "name": "Hidden" }
    ],
    "enums": [
      { "name": "Color", "enumerators": [ { "name": "Red", "value": 0 } ] }
    ]
  }
}"#;

    const RULESET: &str = r#"
[[object_types]]
name = "Shape"

[[object_types]]
name = "Circle"

[[enum_types]]
name = "Color"
"#;

    fn inputs(dir: &tempfile::TempDir) -> (CodeModel, TypeDatabase) {
        let model_path = dir.path().join("model.json");
        let rules_path = dir.path().join("rules.toml");
        std::fs::write(&model_path, MODEL).expect("write model");
        std::fs::write(&rules_path, RULESET).expect("write rules");
        (
            load_code_model(&model_path).expect("model"),
            load_ruleset(&rules_path).expect("rules"),
        )
    }

    #[test]
    fn summary_lists_classes_dependencies_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (model, db) = inputs(&dir);
        let mut config = BuilderConfig::default();
        config.output.log_directory = dir.path().to_path_buf();

        let summary = run(model, db, config).expect("build");

        let names: Vec<&str> = summary.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Shape", "Circle"]);
        assert_eq!(summary.classes[1].bases, vec!["Shape".to_string()]);
        assert_eq!(summary.classes[1].kind, "object");
        assert_eq!(summary.global_enums, vec!["Color".to_string()]);
        assert_eq!(summary.rejections["classes"], 1);
        assert_eq!(summary.rejections["functions"], 0);
        assert!(dir.path().join("mjb_rejected_classes.log").is_file());
    }

    #[test]
    fn disabled_reject_logs_are_not_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (model, db) = inputs(&dir);
        let mut config = BuilderConfig::default();
        config.output.log_directory = dir.path().to_path_buf();
        config.output.write_reject_logs = false;

        run(model, db, config).expect("build");

        assert!(!dir.path().join("mjb_rejected_classes.log").exists());
    }
}
