//! Name lookup inside the code model and typedef resolution.

use std::collections::HashSet;

use crate::items::{
    ClassItem, CodeModel, EnumItem, NamespaceItem, ScopeItem, TemplateTypeAliasItem, TypeDefItem,
};
use crate::type_info::TypeInfo;

/// A declaration found by [`CodeModel::find_item`].
#[derive(Debug, Clone, Copy)]
pub enum ItemRef<'a> {
    Namespace(&'a NamespaceItem),
    Class(&'a ClassItem),
    Enum(&'a EnumItem),
    TypeDef(&'a TypeDefItem),
    TemplateTypeAlias(&'a TemplateTypeAliasItem),
}

#[derive(Clone, Copy)]
enum ScopeRef<'a> {
    Namespace(&'a NamespaceItem),
    Class(&'a ClassItem),
}

impl<'a> ScopeRef<'a> {
    const fn members(self) -> &'a ScopeItem {
        match self {
            Self::Namespace(ns) => &ns.scope,
            Self::Class(class) => &class.scope,
        }
    }

    fn namespaces(self) -> &'a [NamespaceItem] {
        match self {
            Self::Namespace(ns) => &ns.namespaces,
            Self::Class(_) => &[],
        }
    }

    /// Child scopes named `name`. Namespaces may be reopened, so there can be
    /// several.
    fn children(self, name: &str) -> Vec<Self> {
        let mut result: Vec<Self> = self
            .namespaces()
            .iter()
            .filter(|ns| ns.name == name)
            .map(ScopeRef::Namespace)
            .collect();
        result.extend(
            self.members()
                .classes
                .iter()
                .filter(|c| c.base_name() == name)
                .map(ScopeRef::Class),
        );
        result
    }

    fn item(self, name: &str) -> Option<ItemRef<'a>> {
        let members = self.members();
        if let Some(td) = members.typedefs.iter().find(|t| t.name == name) {
            return Some(ItemRef::TypeDef(td));
        }
        if let Some(alias) = members.template_type_aliases.iter().find(|t| t.name == name) {
            return Some(ItemRef::TemplateTypeAlias(alias));
        }
        if let Some(class) = members.classes.iter().find(|c| c.base_name() == name) {
            return Some(ItemRef::Class(class));
        }
        if let Some(en) = members.enums.iter().find(|e| e.name == name) {
            return Some(ItemRef::Enum(en));
        }
        self.namespaces()
            .iter()
            .find(|ns| ns.name == name)
            .map(ItemRef::Namespace)
    }
}

impl CodeModel {
    fn scopes_at(&self, path: &[String]) -> Vec<ScopeRef<'_>> {
        let mut current = vec![ScopeRef::Namespace(&self.global)];
        for segment in path {
            current = current
                .into_iter()
                .flat_map(|scope| scope.children(segment))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Look up `qualified_name` relative to the scope at `scope_path`
    /// (empty for the global namespace). Only descends; enclosing scopes are
    /// not searched.
    #[must_use]
    pub fn find_item(&self, qualified_name: &[String], scope_path: &[String]) -> Option<ItemRef<'_>> {
        let (last, prefix) = qualified_name.split_last()?;
        let mut scopes = self.scopes_at(scope_path);
        for segment in prefix {
            scopes = scopes
                .into_iter()
                .flat_map(|scope| scope.children(segment))
                .collect();
        }
        scopes.into_iter().find_map(|scope| scope.item(last))
    }

    /// Replace typedef and template-alias names in `type_info` by what they
    /// stand for, as seen from `scope_path`. Chains are followed until a
    /// non-alias name is reached; a name seen twice stops the walk.
    #[must_use]
    pub fn resolve_type(&self, type_info: &TypeInfo, scope_path: &[String]) -> TypeInfo {
        let mut current = type_info.clone();
        let mut visited = HashSet::new();
        while visited.insert(current.qualified_name_string()) {
            match self.find_item(&current.qualified_name, scope_path) {
                Some(ItemRef::TypeDef(td)) => {
                    current = td.type_info.combine(&current);
                }
                Some(ItemRef::TemplateTypeAlias(alias)) => {
                    let substituted = substitute_parameters(
                        &alias.type_info,
                        &alias.template_parameters,
                        &current.instantiations,
                    );
                    let mut qualifiers = current.clone();
                    qualifiers.instantiations.clear();
                    current = substituted.combine(&qualifiers);
                }
                _ => break,
            }
        }
        current
    }
}

fn substitute_parameters(target: &TypeInfo, parameters: &[String], arguments: &[TypeInfo]) -> TypeInfo {
    if target.qualified_name.len() == 1 {
        if let Some(pos) = parameters.iter().position(|p| *p == target.qualified_name[0]) {
            if let Some(argument) = arguments.get(pos) {
                let mut qualifiers = target.clone();
                qualifiers.qualified_name.clear();
                qualifiers.instantiations.clear();
                return argument.combine(&qualifiers);
            }
        }
    }
    let mut result = target.clone();
    result.instantiations = target
        .instantiations
        .iter()
        .map(|inst| substitute_parameters(inst, parameters, arguments))
        .collect();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{NamespaceItem, TemplateTypeAliasItem, TypeDefItem};
    use pretty_assertions::assert_eq;

    fn model() -> CodeModel {
        let mut ns = NamespaceItem::new("NS");
        ns.scope.typedefs.push(TypeDefItem {
            name: "IntList".to_string(),
            type_info: TypeInfo::named("QList").with_instantiation(TypeInfo::named("int")),
            ..TypeDefItem::default()
        });
        ns.scope.typedefs.push(TypeDefItem {
            name: "Numbers".to_string(),
            type_info: TypeInfo::named("IntList"),
            ..TypeDefItem::default()
        });
        ns.scope.template_type_aliases.push(TemplateTypeAliasItem {
            name: "Vec".to_string(),
            template_parameters: vec!["T".to_string()],
            type_info: TypeInfo::named("std::vector").with_instantiation(TypeInfo::named("T")),
        });
        let mut model = CodeModel::default();
        model.global.namespaces.push(ns);
        model
    }

    #[test]
    fn typedef_chain_is_followed_with_use_site_qualifiers() {
        let model = model();
        let scope = vec!["NS".to_string()];
        let use_site = TypeInfo::named("Numbers").with_const();
        let resolved = model.resolve_type(&use_site, &scope);
        assert_eq!(resolved.to_string(), "const QList<int>");
    }

    #[test]
    fn unknown_names_resolve_to_themselves() {
        let model = model();
        let t = TypeInfo::named("Other");
        assert_eq!(model.resolve_type(&t, &[]), t);
    }

    #[test]
    fn template_alias_substitutes_parameters() {
        let model = model();
        let scope = vec!["NS".to_string()];
        let use_site = TypeInfo::named("Vec").with_instantiation(TypeInfo::named("double"));
        let resolved = model.resolve_type(&use_site, &scope);
        assert_eq!(resolved.to_string(), "std::vector<double>");
    }

    #[test]
    fn self_referencing_typedef_terminates() {
        let mut model = CodeModel::default();
        model.global.scope.typedefs.push(TypeDefItem {
            name: "Loop".to_string(),
            type_info: TypeInfo::named("Loop"),
            ..TypeDefItem::default()
        });
        let resolved = model.resolve_type(&TypeInfo::named("Loop"), &[]);
        assert_eq!(resolved.qualified_name_string(), "Loop");
    }
}
