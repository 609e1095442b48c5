use std::sync::Arc;

use mjb_codemodel::{Access, EnumItem, EnumKind};
use mjb_meta::{ClassId, MetaEnum, MetaEnumValue};
use mjb_typesystem::{EntryKind, TypeEntry};

use crate::builder::MetaBuilder;
use crate::reject::{RejectCategory, RejectReason};

impl MetaBuilder {
    /// Build the meta enum for `item` declared in `enclosing` (global when
    /// `None`) and register an entry for each of its values.
    pub(crate) fn traverse_enum(
        &mut self,
        item: &EnumItem,
        enclosing: Option<ClassId>,
    ) -> Option<MetaEnum> {
        let class_name = self.class_name(enclosing);
        let anonymous = item.kind == EnumKind::Anonymous || item.name.is_empty();

        // An anonymous enum is identified in the ruleset by one of its values.
        let (qualified, entry) = if anonymous {
            item.enumerators
                .iter()
                .map(|value| self.qualify(&value.name))
                .find_map(|name| {
                    self.db
                        .find_type(&name)
                        .filter(|e| e.is_enum())
                        .map(|entry| (name, Some(entry)))
                })
                .unwrap_or_else(|| (self.qualify("(anonymous)"), None))
        } else {
            let name = self.qualify(&item.name);
            let entry = self.db.find_type(&name);
            (name, entry)
        };

        let entry = if item.access == Access::Private {
            let existing = entry.filter(|e| e.is_enum());
            Some(existing.unwrap_or_else(|| {
                self.registry.add_entry(
                    TypeEntry::new(
                        qualified.as_str(),
                        EntryKind::Enum {
                            flags: None,
                            null_value: None,
                        },
                    )
                    .with_generate(false),
                )
            }))
        } else {
            entry
        };

        if let Some(reason) = self.db.is_enum_rejected(&class_name, &item.name) {
            self.reject(
                RejectCategory::Enums,
                RejectReason::GenerationDisabled,
                qualified,
                reason,
            );
            return None;
        }

        let Some(entry) = entry.filter(|e| e.is_enum()) else {
            let enclosing_generates =
                enclosing.is_none_or(|id| self.arena[id].type_entry.generate_code());
            if enclosing_generates {
                tracing::warn!(
                    enum_name = %qualified,
                    location = %item.location,
                    "enum does not have a type entry"
                );
            }
            self.reject(
                RejectCategory::Enums,
                RejectReason::NotInTypeSystem,
                qualified,
                "",
            );
            return None;
        };

        if self.config.builder.skip_deprecated && item.is_deprecated {
            self.reject(
                RejectCategory::Enums,
                RejectReason::Deprecated,
                qualified,
                "",
            );
            return None;
        }

        let mut meta_enum = MetaEnum::new(Arc::clone(&entry), item.kind);
        meta_enum.access = item.access;
        meta_enum.deprecated = item.is_deprecated;
        meta_enum.signed = item.is_signed;
        meta_enum.enclosing_class = enclosing;
        meta_enum.source_location = item.location.clone();
        meta_enum.values = item
            .enumerators
            .iter()
            .filter(|value| !(self.config.builder.skip_deprecated && value.is_deprecated))
            .map(|value| MetaEnumValue {
                name: value.name.clone(),
                value: value.value,
                string_value: value.string_value.clone(),
                deprecated: value.is_deprecated,
            })
            .collect();

        let qualifier = meta_enum.value_qualifier();
        for value in &meta_enum.values {
            let name = if qualifier.is_empty() {
                value.name.clone()
            } else {
                format!("{qualifier}::{}", value.name)
            };
            self.registry.add_entry(TypeEntry::new(
                name,
                EntryKind::EnumValue {
                    enum_name: entry.name().to_string(),
                    value: value.value.to_string(),
                },
            ));
        }

        if let EntryKind::Enum {
            null_value: Some(null_value),
            ..
        } = entry.kind()
        {
            let parsed = null_value.trim().parse::<i64>().ok();
            meta_enum.null_value = meta_enum
                .values
                .iter()
                .find(|v| v.name == *null_value || Some(v.value) == parsed)
                .map(|v| v.name.clone());
            if meta_enum.null_value.is_none() {
                tracing::warn!(
                    enum_name = %entry.name(),
                    null_value = %null_value,
                    "null value does not match any enumerator"
                );
            }
        }

        Some(meta_enum)
    }
}
