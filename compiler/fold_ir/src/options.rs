//! Compiler options consulted by the merging and rebinding stages.

/// Output binary format.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum OutputFormat {
    /// JVM class files. `invokespecial` may only name an immediate
    /// super-interface, which forces interface super-bridges.
    ClassFile,
    #[default]
    Dex,
}

/// Options for one compilation.
#[derive(Clone, Debug)]
pub struct CompilerOptions {
    /// Whole-program optimization. When unset, only the per-file horizontal
    /// pipeline runs and instance fields are never merged.
    pub whole_program: bool,

    pub output: OutputFormat,

    /// Generic signatures never pin their holders.
    pub force_proguard_compatibility: bool,

    /// Intermediate output, to be linked later. Synthesized members are
    /// global and must be handed to a global synthetics consumer.
    pub intermediate: bool,

    pub enable_vertical_class_merging: bool,
    pub enable_horizontal_class_merging: bool,
    pub enable_member_rebinding: bool,

    /// Worker threads for the use-site scan.
    /// Default: rayon decides.
    pub threads: Option<usize>,
}

impl CompilerOptions {
    /// Whole-program optimization with every stage enabled, targeting dex.
    #[must_use]
    pub fn whole_program() -> Self {
        Self {
            whole_program: true,
            output: OutputFormat::Dex,
            force_proguard_compatibility: false,
            intermediate: false,
            enable_vertical_class_merging: true,
            enable_horizontal_class_merging: true,
            enable_member_rebinding: true,
            threads: None,
        }
    }

    /// Per-file compilation: horizontal merging of synthetic-like classes only.
    #[must_use]
    pub fn per_file() -> Self {
        Self {
            whole_program: false,
            enable_vertical_class_merging: false,
            enable_member_rebinding: false,
            ..Self::whole_program()
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub fn with_force_proguard_compatibility(mut self, enable: bool) -> Self {
        self.force_proguard_compatibility = enable;
        self
    }

    #[must_use]
    pub fn with_intermediate(mut self, enable: bool) -> Self {
        self.intermediate = enable;
        self
    }

    #[must_use]
    pub fn with_vertical_class_merging(mut self, enable: bool) -> Self {
        self.enable_vertical_class_merging = enable;
        self
    }

    #[must_use]
    pub fn with_horizontal_class_merging(mut self, enable: bool) -> Self {
        self.enable_horizontal_class_merging = enable;
        self
    }

    #[must_use]
    pub fn with_member_rebinding(mut self, enable: bool) -> Self {
        self.enable_member_rebinding = enable;
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn is_class_file_output(&self) -> bool {
        self.output == OutputFormat::ClassFile
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self::whole_program()
    }
}
