//! Serialized declaration flags.
//!
//! Layout of the 32-bit flags word:
//!
//! | bits  | field                                  |
//! |-------|----------------------------------------|
//! | 0     | has annotations                        |
//! | 1..=3 | visibility                             |
//! | 4..=5 | modality                               |
//! | 6..=8 | class kind                             |
//! | 9..   | inner, data, external, expect, value, fun interface, has enum entries |

use crate::{ClassFlags, ClassKind, Modality, Visibility};

const HAS_ANNOTATIONS: u32 = 1 << 0;

const VISIBILITY_SHIFT: u32 = 1;
const VISIBILITY_MASK: u32 = 0b111;
const MODALITY_SHIFT: u32 = 4;
const MODALITY_MASK: u32 = 0b11;
const CLASS_KIND_SHIFT: u32 = 6;
const CLASS_KIND_MASK: u32 = 0b111;

const IS_INNER: u32 = 1 << 9;
const IS_DATA: u32 = 1 << 10;
const IS_EXTERNAL: u32 = 1 << 11;
const IS_EXPECT: u32 = 1 << 12;
const IS_VALUE: u32 = 1 << 13;
const IS_FUN_INTERFACE: u32 = 1 << 14;
const HAS_ENUM_ENTRIES: u32 = 1 << 15;

// Serialized visibility values.
const VIS_INTERNAL: u32 = 0;
const VIS_PRIVATE: u32 = 1;
const VIS_PROTECTED: u32 = 2;
const VIS_PUBLIC: u32 = 3;
const VIS_PRIVATE_TO_THIS: u32 = 4;
const VIS_LOCAL: u32 = 5;

// Serialized class kinds.
const KIND_CLASS: u32 = 0;
const KIND_INTERFACE: u32 = 1;
const KIND_ENUM_CLASS: u32 = 2;
const KIND_ENUM_ENTRY: u32 = 3;
const KIND_ANNOTATION_CLASS: u32 = 4;
const KIND_OBJECT: u32 = 5;
const KIND_COMPANION_OBJECT: u32 = 6;

/// A serialized flags word.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Flags(pub u32);

impl Flags {
    #[inline]
    fn field(self, shift: u32, mask: u32) -> u32 {
        (self.0 >> shift) & mask
    }

    pub fn has_annotations(self) -> bool {
        self.0 & HAS_ANNOTATIONS != 0
    }

    /// Visibility. `private-to-this` and `local` read as `Private`;
    /// unknown values read as `Public`.
    pub fn visibility(self) -> Visibility {
        match self.field(VISIBILITY_SHIFT, VISIBILITY_MASK) {
            VIS_INTERNAL => Visibility::Internal,
            VIS_PRIVATE | VIS_PRIVATE_TO_THIS | VIS_LOCAL => Visibility::Private,
            VIS_PROTECTED => Visibility::Protected,
            _ => Visibility::Public,
        }
    }

    pub fn modality(self) -> Modality {
        match self.field(MODALITY_SHIFT, MODALITY_MASK) {
            0 => Modality::Final,
            1 => Modality::Open,
            2 => Modality::Abstract,
            _ => Modality::Sealed,
        }
    }

    /// Class kind. Unknown values read as `Class`.
    pub fn class_kind(self) -> ClassKind {
        match self.field(CLASS_KIND_SHIFT, CLASS_KIND_MASK) {
            KIND_INTERFACE => ClassKind::Interface,
            KIND_ENUM_CLASS => ClassKind::EnumClass,
            KIND_ENUM_ENTRY => ClassKind::EnumEntry,
            KIND_ANNOTATION_CLASS => ClassKind::AnnotationClass,
            KIND_OBJECT => ClassKind::Object,
            KIND_COMPANION_OBJECT => ClassKind::CompanionObject,
            _ => ClassKind::Class,
        }
    }

    /// Boolean class attributes.
    pub fn class_flags(self) -> ClassFlags {
        let mut flags = ClassFlags::empty();
        flags.set(ClassFlags::INNER, self.0 & IS_INNER != 0);
        flags.set(ClassFlags::DATA, self.0 & IS_DATA != 0);
        flags.set(ClassFlags::EXTERNAL, self.0 & IS_EXTERNAL != 0);
        flags.set(ClassFlags::VALUE, self.0 & IS_VALUE != 0);
        flags.set(ClassFlags::FUN_INTERFACE, self.0 & IS_FUN_INTERFACE != 0);
        flags.set(ClassFlags::HAS_ENUM_ENTRIES, self.0 & HAS_ENUM_ENTRIES != 0);
        flags.set(
            ClassFlags::COMPANION,
            self.field(CLASS_KIND_SHIFT, CLASS_KIND_MASK) == KIND_COMPANION_OBJECT,
        );
        flags
    }

    pub fn is_expect(self) -> bool {
        self.0 & IS_EXPECT != 0
    }

    /// Encode a class header.
    pub fn for_class(
        visibility: Visibility,
        modality: Modality,
        kind: ClassKind,
        class_flags: ClassFlags,
    ) -> Self {
        let kind = match kind {
            ClassKind::Class => KIND_CLASS,
            ClassKind::Interface => KIND_INTERFACE,
            ClassKind::EnumClass => KIND_ENUM_CLASS,
            ClassKind::EnumEntry => KIND_ENUM_ENTRY,
            ClassKind::AnnotationClass => KIND_ANNOTATION_CLASS,
            ClassKind::Object => KIND_OBJECT,
            ClassKind::CompanionObject => KIND_COMPANION_OBJECT,
        };
        let mut bits = Self::encode_visibility(visibility)
            | Self::encode_modality(modality)
            | (kind << CLASS_KIND_SHIFT);
        for (flag, bit) in [
            (ClassFlags::INNER, IS_INNER),
            (ClassFlags::DATA, IS_DATA),
            (ClassFlags::EXTERNAL, IS_EXTERNAL),
            (ClassFlags::VALUE, IS_VALUE),
            (ClassFlags::FUN_INTERFACE, IS_FUN_INTERFACE),
            (ClassFlags::HAS_ENUM_ENTRIES, HAS_ENUM_ENTRIES),
        ] {
            if class_flags.contains(flag) {
                bits |= bit;
            }
        }
        Self(bits)
    }

    /// Encode a type-alias header.
    pub fn for_type_alias(visibility: Visibility) -> Self {
        Self(Self::encode_visibility(visibility))
    }

    /// Flags of a local class.
    pub fn local_class() -> Self {
        Self(VIS_LOCAL << VISIBILITY_SHIFT)
    }

    fn encode_visibility(visibility: Visibility) -> u32 {
        let value = match visibility {
            Visibility::Internal => VIS_INTERNAL,
            Visibility::Private => VIS_PRIVATE,
            Visibility::Protected => VIS_PROTECTED,
            Visibility::Public => VIS_PUBLIC,
        };
        value << VISIBILITY_SHIFT
    }

    fn encode_modality(modality: Modality) -> u32 {
        let value = match modality {
            Modality::Final => 0,
            Modality::Open => 1,
            Modality::Abstract => 2,
            Modality::Sealed => 3,
        };
        value << MODALITY_SHIFT
    }
}
