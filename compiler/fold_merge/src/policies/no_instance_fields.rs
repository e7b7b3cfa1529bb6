use fold_ir::ClassDef;

use crate::SingleClassPolicy;

/// Per-file mode merges without a field map, so only field-less classes
/// qualify.
pub struct NoInstanceFields;

impl SingleClassPolicy for NoInstanceFields {
    fn name(&self) -> &'static str {
        "NoInstanceFields"
    }

    fn can_merge(&self, class: &ClassDef) -> bool {
        class.instance_fields().next().is_none()
    }
}
