//! Declaration-tree transforms for widget compilation units
//!
//! The host compiler parses widget sources and hands this crate a per-file
//! declaration tree. Two operations run on it:
//! 1. Annotation lookup on any declaration node (`has_annotation`)
//! 2. Description synthesis, which derives `description` annotations from
//!    documentation comments for widget definition classes and their
//!    property/event/service members (`DescriptionSynthesizer`)
//!
//! The tree is owned by the host; transforms only read it and conditionally
//! append annotation entries.

pub mod annotations;
pub mod declarations;
pub mod description;

pub use annotations::{has_annotation, Annotated};
pub use declarations::{
    AnnotationApplication, AnnotationList, ClassDeclaration, CompilationUnit, Declaration,
    DocBlock, DocEntry, MemberDeclaration, MemberKind,
};
pub use description::{
    DescriptionSynthesizer, DEFAULT_DESCRIPTION_TAGS, DESCRIPTION, MEMBER_MARKERS,
    WIDGET_DEFINITION,
};
