use std::collections::BTreeMap;

use fold_diagnostic::{InternalError, InternalResult};
use fold_hierarchy::AppInfo;
use fold_ir::{FieldDef, FieldRef, TypeRef};

use super::relaxed_type;
use crate::{ClassMergerMode, MergeGroup, MultiClassPolicy};

/// Last policy of every pipeline: picks targets and field maps.
///
/// In the final round of whole-program mode, non-interface groups must come
/// out of [`NoInstanceInitializerMerging`](super::NoInstanceInitializerMerging)
/// already finalized; anything else is an internal error. Per-file mode
/// merges without a field map.
pub struct FinalizeMergeGroup<'a, 'p> {
    app: &'a AppInfo<'p>,
    mode: ClassMergerMode,
    whole_program: bool,
}

impl<'a, 'p> FinalizeMergeGroup<'a, 'p> {
    pub fn new(app: &'a AppInfo<'p>, mode: ClassMergerMode, whole_program: bool) -> Self {
        FinalizeMergeGroup {
            app,
            mode,
            whole_program,
        }
    }
}

impl MultiClassPolicy for FinalizeMergeGroup<'_, '_> {
    fn name(&self) -> &'static str {
        "FinalizeMergeGroup"
    }

    fn apply(&mut self, mut group: MergeGroup) -> InternalResult<Vec<MergeGroup>> {
        let factory = self.app.factory();
        if self.whole_program && self.mode == ClassMergerMode::Final && !group.is_interface_group() {
            if group.is_finalized() {
                return Ok(vec![group]);
            }
            let location = group
                .classes()
                .first()
                .map(|ty| factory.descriptor(*ty))
                .unwrap_or_default();
            return Err(InternalError::new(
                "final-round merge group reached finalization without constructor merging",
            )
            .at(location));
        }
        let Some(&target) = group.classes().first() else {
            return Ok(Vec::new());
        };
        group.set_target(target, factory)?;
        let field_map = if self.whole_program {
            compute_instance_field_map(self.app, &group, target)?
        } else {
            BTreeMap::new()
        };
        group.finalize(field_map)?;
        tracing::trace!(target = factory.descriptor(target), size = group.len(), "finalized merge group");
        Ok(vec![group])
    }
}

/// Map every source instance field onto a distinct target field.
///
/// Fields pair up by exact type first, then by relaxed type. A target field
/// that receives fields of another type is relaxed to `java/lang/Object`,
/// and then maps to its relaxed self as well.
pub(crate) fn compute_instance_field_map(
    app: &AppInfo<'_>,
    group: &MergeGroup,
    target: TypeRef,
) -> InternalResult<BTreeMap<FieldRef, FieldRef>> {
    let factory = app.factory();
    let missing = |ty: TypeRef| {
        InternalError::new("merge group class has no definition").at(factory.descriptor(ty))
    };
    let target_class = app.definition_for(target).ok_or_else(|| missing(target))?;
    let target_fields: Vec<&FieldDef> = target_class.instance_fields().collect();
    let mut assigned: Vec<Vec<FieldRef>> = vec![Vec::new(); target_fields.len()];

    for source in group.classes().iter().copied().filter(|ty| *ty != target) {
        let source_class = app.definition_for(source).ok_or_else(|| missing(source))?;
        let mut available = vec![true; target_fields.len()];
        let mut pending = Vec::new();
        for field in source_class.instance_fields() {
            let exact = (0..target_fields.len())
                .find(|i| available[*i] && target_fields[*i].reference.ty == field.reference.ty);
            match exact {
                Some(i) => {
                    available[i] = false;
                    assigned[i].push(field.reference);
                }
                None => pending.push(field.reference),
            }
        }
        for field in pending {
            let relaxed = relaxed_type(factory, field.ty);
            let slot = (0..target_fields.len()).find(|i| {
                available[*i] && relaxed_type(factory, target_fields[*i].reference.ty) == relaxed
            });
            let Some(i) = slot else {
                return Err(InternalError::new("no target field for merged instance field")
                    .at(factory.field_to_string(&field)));
            };
            available[i] = false;
            assigned[i].push(field);
        }
    }

    let mut map = BTreeMap::new();
    for (target_field, sources) in target_fields.iter().zip(assigned) {
        let original = target_field.reference;
        let merged = if sources.iter().all(|f| f.ty == original.ty) {
            original
        } else {
            original.with_type(relaxed_type(factory, original.ty))
        };
        if merged != original {
            map.insert(original, merged);
        }
        for source in sources {
            map.insert(source, merged);
        }
    }
    Ok(map)
}
