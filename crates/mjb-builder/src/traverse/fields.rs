use mjb_codemodel::{Access, ScopeItem};
use mjb_meta::{ClassId, MetaField};

use crate::builder::MetaBuilder;
use crate::reject::{RejectCategory, RejectReason, Rejection};

impl MetaBuilder {
    pub(crate) fn traverse_fields(&mut self, scope: &ScopeItem, id: ClassId) {
        let class_name = self.arena[id].name().to_string();

        for variable in &scope.variables {
            if variable.is_friend || variable.access == Access::Private {
                continue;
            }
            let qualified = format!("{class_name}::{}", variable.name);

            if let Some(reason) = self.db.is_field_rejected(&class_name, &variable.name) {
                self.rejects.insert(
                    RejectCategory::Fields,
                    Rejection::new(
                        RejectReason::GenerationDisabled,
                        format!("{} {qualified}", variable.type_info),
                        qualified,
                        reason,
                    ),
                );
                continue;
            }

            let meta_type = match self.translate_type(&variable.type_info, Some(id)) {
                Ok(meta_type) => meta_type,
                Err(error) => {
                    tracing::warn!(
                        field = %qualified,
                        type_name = %variable.type_info,
                        %error,
                        "skipping field: unable to translate type"
                    );
                    continue;
                }
            };

            let mut field = MetaField::new(variable.name.as_str(), meta_type);
            field.access = variable.access;
            field.is_static = variable.is_static;
            field.enclosing_class = Some(id);
            field.source_location = variable.location.clone();

            if let Some(modification) = self.arena[id]
                .type_entry
                .complex()
                .and_then(|c| c.field_modification(&variable.name))
            {
                field.removed = modification.removed;
                field.readable = modification.readable;
                field.writable = modification.writable;
                if let Some(name) = &modification.rename {
                    field.name.clone_from(name);
                }
            }

            self.arena[id].fields.push(field);
        }
    }
}
