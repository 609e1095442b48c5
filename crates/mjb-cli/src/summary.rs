//! Serializable digest of a finished model.

use std::collections::BTreeMap;

use mjb_builder::{MetaModel, RejectCategory, RejectLog};
use mjb_meta::{ClassId, MetaClass, MetaFunction};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BuildSummary {
    pub classes: Vec<ClassSummary>,
    pub templates: Vec<String>,
    pub smart_pointers: Vec<String>,
    pub global_functions: Vec<String>,
    pub global_enums: Vec<String>,
    /// Rejection count per log category.
    pub rejections: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Serialize)]
pub struct ClassSummary {
    pub name: String,
    pub kind: &'static str,
    pub bases: Vec<String>,
    pub functions: usize,
    pub fields: usize,
    pub enums: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
}

impl BuildSummary {
    pub fn new(model: &MetaModel, rejects: &RejectLog) -> Self {
        let names = |ids: &[ClassId]| -> Vec<String> {
            ids.iter().map(|id| model.class(*id).name().to_string()).collect()
        };
        Self {
            classes: model
                .classes
                .iter()
                .map(|id| ClassSummary::new(model, model.class(*id)))
                .collect(),
            templates: names(&model.templates),
            smart_pointers: names(&model.smart_pointers),
            global_functions: model
                .global_functions
                .iter()
                .map(MetaFunction::minimal_signature)
                .collect(),
            global_enums: model
                .global_enums
                .iter()
                .map(|e| e.name().to_string())
                .collect(),
            rejections: RejectCategory::ALL
                .into_iter()
                .map(|category| (category.as_str(), rejects.len(category)))
                .collect(),
        }
    }
}

impl ClassSummary {
    fn new(model: &MetaModel, class: &MetaClass) -> Self {
        Self {
            name: class.name().to_string(),
            kind: class.type_entry.entry_type().as_str(),
            bases: class
                .base_classes()
                .iter()
                .map(|id| model.class(*id).name().to_string())
                .collect(),
            functions: class.functions().len(),
            fields: class.fields.len(),
            enums: class.enums.len(),
            is_abstract: class.is_abstract(),
        }
    }
}
