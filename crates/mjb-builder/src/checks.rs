//! Post-traversal diagnostics. These only warn; nothing is rejected here.

use std::collections::HashSet;

use mjb_typesystem::SignatureSpec;

use crate::builder::MetaBuilder;

impl MetaBuilder {
    /// Warn about generating ruleset entries the headers never declared.
    pub(crate) fn check_for_inconsistencies(&self) {
        let all = self.all_class_ids();
        let declared_enums: HashSet<&str> = self
            .global_enums
            .iter()
            .chain(all.iter().flat_map(|id| self.arena[*id].enums.iter()))
            .map(|e| e.type_entry.name())
            .collect();

        for entry in self.db.entries() {
            if !entry.generate_code() {
                continue;
            }
            if entry.is_complex() {
                if entry.is_container() || entry.is_smart_pointer() || entry.is_typedef() {
                    continue;
                }
                if self.arena.find_by_entry(&all, entry).is_none() {
                    tracing::warn!(entry = %entry.name(), "type not found in headers");
                }
            } else if entry.is_enum() && !declared_enums.contains(entry.name()) {
                tracing::warn!(entry = %entry.name(), "enum not found in headers");
            }
        }
    }

    /// Warn about exact modification signatures that match no function of
    /// their class, listing overloads of the same name.
    pub(crate) fn check_function_modifications(&self) {
        for &id in &self.classes {
            let class = &self.arena[id];
            let Some(complex) = class.type_entry.complex() else {
                continue;
            };
            let known: HashSet<String> = class
                .functions()
                .iter()
                .flat_map(|f| f.modification_signatures())
                .collect();

            for modification in &complex.function_modifications {
                let SignatureSpec::Exact(signature) = &modification.signature else {
                    continue;
                };
                if known.contains(signature) {
                    continue;
                }
                let name = signature.split('(').next().unwrap_or(signature);
                let candidates: Vec<String> = class
                    .functions_named(name)
                    .map(|f| f.minimal_signature())
                    .collect();
                tracing::warn!(
                    class = %class.name(),
                    signature = %signature,
                    candidates = ?candidates,
                    "signature of function modification not found"
                );
            }
        }
    }
}
