//! Declaration-tree types handed over by the host compiler
//!
//! The host parses widget sources and lends this crate a per-file view of the
//! declarations it found: classes, their members, the annotations applied to
//! each, and the documentation comment block sitting above each declaration.
//! Declaration nodes are ephemeral; a fresh tree is built per build
//! invocation and discarded once the transformed source is emitted.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::PathBuf;

/// Inline capacity for per-declaration annotation lists. Widget sources
/// rarely carry more than a marker annotation plus a description.
pub type AnnotationList = SmallVec<[AnnotationApplication; 4]>;

/// A single source file as seen by the host compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Source path, when the host provides one. Used for logging only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// Top-level declaration in a compilation unit.
///
/// Only class declarations participate in description synthesis; everything
/// else passes through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Declaration {
    Class(ClassDeclaration),
    /// A declaration the transforms do not inspect (imports, free functions,
    /// statements). Kept verbatim.
    Opaque(String),
}

/// A class declaration with its annotations, documentation and members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: String,
    /// Applied annotations, in source order.
    #[serde(default)]
    pub annotations: AnnotationList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<DocBlock>,
    #[serde(default)]
    pub members: Vec<MemberDeclaration>,
}

/// A property or method inside a class declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDeclaration {
    pub name: String,
    pub kind: MemberKind,
    #[serde(default)]
    pub annotations: AnnotationList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<DocBlock>,
}

/// What kind of class member a declaration is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Property,
    Method,
}

/// One annotation applied to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationApplication {
    /// Bare form: the annotation is referenced by name, e.g. `@event`.
    Reference(String),
    /// Factory form: the annotation is the result of invoking a factory
    /// function, e.g. `@property(defaultValue(0))`. The callee text is its
    /// identifying name.
    Call {
        callee: String,
        arguments: Vec<String>,
    },
    /// Any other expression shape, carried as raw text. Never matches a
    /// name lookup.
    Opaque(String),
}

impl AnnotationApplication {
    /// Shorthand for the bare form.
    pub fn reference(name: impl Into<String>) -> Self {
        AnnotationApplication::Reference(name.into())
    }

    /// Shorthand for the factory form.
    pub fn call(callee: impl Into<String>, arguments: Vec<String>) -> Self {
        AnnotationApplication::Call {
            callee: callee.into(),
            arguments,
        }
    }

    /// The identifying name, if this shape has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            AnnotationApplication::Reference(name) => Some(name),
            AnnotationApplication::Call { callee, .. } => Some(callee),
            AnnotationApplication::Opaque(_) => None,
        }
    }
}

/// Documentation comment block attached above a declaration.
///
/// Entries arrive in document order. Text bodies are stored exactly as the
/// host's comment parser produced them, internal whitespace included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBlock {
    #[serde(default)]
    pub entries: Vec<DocEntry>,
}

/// A single tagged entry of a documentation block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    pub tag: String,
    pub text: String,
}

impl DocBlock {
    /// First entry carrying the given tag, in document order.
    pub fn first_tagged(&self, tag: &str) -> Option<&DocEntry> {
        self.entries.iter().find(|entry| entry.tag == tag)
    }
}

impl DocEntry {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        DocEntry {
            tag: tag.into(),
            text: text.into(),
        }
    }
}
