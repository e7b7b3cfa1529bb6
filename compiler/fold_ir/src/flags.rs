//! JVM access flags for classes, methods, and fields.
//!
//! Bit values follow the class-file format so flags read from bytecode can be
//! stored unchanged. `CONSTRUCTOR` is the one addition: it marks `<init>` and
//! `<clinit>` so initializer checks need no name lookup.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        /// Methods only. Shares its bit with `VOLATILE` on fields.
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const CONSTRUCTOR = 0x1_0000;
    }
}

impl AccessFlags {
    const VISIBILITY: AccessFlags = AccessFlags::PUBLIC
        .union(AccessFlags::PRIVATE)
        .union(AccessFlags::PROTECTED);

    pub fn is_public(self) -> bool {
        self.contains(AccessFlags::PUBLIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(AccessFlags::PRIVATE)
    }

    pub fn is_protected(self) -> bool {
        self.contains(AccessFlags::PROTECTED)
    }

    pub fn is_package_private(self) -> bool {
        !self.intersects(Self::VISIBILITY)
    }

    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(AccessFlags::FINAL)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    pub fn is_interface(self) -> bool {
        self.contains(AccessFlags::INTERFACE)
    }

    pub fn is_synthetic(self) -> bool {
        self.contains(AccessFlags::SYNTHETIC)
    }

    pub fn is_bridge(self) -> bool {
        self.contains(AccessFlags::BRIDGE)
    }

    pub fn is_constructor(self) -> bool {
        self.contains(AccessFlags::CONSTRUCTOR)
    }

    /// Same flags with the visibility bits replaced.
    #[must_use]
    pub fn with_visibility(self, visibility: AccessFlags) -> Self {
        (self - Self::VISIBILITY) | (visibility & Self::VISIBILITY)
    }

    #[must_use]
    pub fn promote_to_public(self) -> Self {
        self.with_visibility(AccessFlags::PUBLIC)
    }

    #[must_use]
    pub fn make_private(self) -> Self {
        self.with_visibility(AccessFlags::PRIVATE)
    }

    #[must_use]
    pub fn demote_from_final(self) -> Self {
        self - AccessFlags::FINAL
    }

    #[must_use]
    pub fn demote_from_synthetic(self) -> Self {
        self - AccessFlags::SYNTHETIC
    }

    #[must_use]
    pub fn demote_from_abstract(self) -> Self {
        self - AccessFlags::ABSTRACT
    }

    /// Flags for a synthesized forwarding method.
    #[must_use]
    pub fn as_bridge(self) -> Self {
        (self - AccessFlags::ABSTRACT - AccessFlags::NATIVE) | AccessFlags::BRIDGE | AccessFlags::SYNTHETIC
    }
}
