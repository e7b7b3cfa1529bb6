use fold_ir::ClassDef;

use crate::SingleClassPolicy;

pub struct OnlyProgramClasses;

impl SingleClassPolicy for OnlyProgramClasses {
    fn name(&self) -> &'static str {
        "OnlyProgramClasses"
    }

    fn can_merge(&self, class: &ClassDef) -> bool {
        class.is_program()
    }
}
