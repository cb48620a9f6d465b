//! Annotation lookup on declaration nodes

use crate::declarations::{AnnotationApplication, ClassDeclaration, DocBlock, MemberDeclaration};

/// Common surface of declarations that can carry annotations.
///
/// Implemented by classes and members so the transforms can treat both alike.
pub trait Annotated {
    /// Applied annotations, in source order.
    fn annotations(&self) -> &[AnnotationApplication];

    /// Append a synthesized annotation after the existing ones.
    fn push_annotation(&mut self, annotation: AnnotationApplication);

    /// Documentation block attached above the declaration, if any.
    fn doc(&self) -> Option<&DocBlock>;
}

impl Annotated for ClassDeclaration {
    fn annotations(&self) -> &[AnnotationApplication] {
        &self.annotations
    }

    fn push_annotation(&mut self, annotation: AnnotationApplication) {
        self.annotations.push(annotation);
    }

    fn doc(&self) -> Option<&DocBlock> {
        self.doc.as_ref()
    }
}

impl Annotated for MemberDeclaration {
    fn annotations(&self) -> &[AnnotationApplication] {
        &self.annotations
    }

    fn push_annotation(&mut self, annotation: AnnotationApplication) {
        self.annotations.push(annotation);
    }

    fn doc(&self) -> Option<&DocBlock> {
        self.doc.as_ref()
    }
}

/// Checks whether the given node has an annotation or annotation factory
/// with the given name.
///
/// In the factory form the annotation itself is the result of invoking the
/// factory function so it doesn't technically have a name; the callee text
/// is taken as the annotation name instead. Matching is exact and
/// case-sensitive. Expression shapes that are neither a call nor a bare
/// reference never match.
pub fn has_annotation(name: &str, node: &impl Annotated) -> bool {
    let annotations = node.annotations();
    if annotations.is_empty() {
        return false;
    }

    annotations
        .iter()
        .any(|annotation| annotation.name() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::{AnnotationList, MemberKind};

    fn member_with(annotations: Vec<AnnotationApplication>) -> MemberDeclaration {
        MemberDeclaration {
            name: "value".to_string(),
            kind: MemberKind::Property,
            annotations: AnnotationList::from_vec(annotations),
            doc: None,
        }
    }

    #[test]
    fn test_matches_bare_reference() {
        let member = member_with(vec![AnnotationApplication::reference("event")]);
        assert!(has_annotation("event", &member));
        assert!(!has_annotation("service", &member));
    }

    #[test]
    fn test_matches_factory_callee() {
        let member = member_with(vec![AnnotationApplication::call(
            "property",
            vec!["defaultValue(0)".to_string()],
        )]);
        assert!(has_annotation("property", &member));
        // The argument text is not an annotation name.
        assert!(!has_annotation("defaultValue", &member));
    }

    #[test]
    fn test_empty_annotation_list_never_matches() {
        let member = member_with(vec![]);
        assert!(!has_annotation("property", &member));
    }

    #[test]
    fn test_opaque_shapes_never_match() {
        let member = member_with(vec![AnnotationApplication::Opaque(
            "property".to_string(),
        )]);
        assert!(!has_annotation("property", &member));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let class = ClassDeclaration {
            name: "GaugeWidget".to_string(),
            annotations: AnnotationList::from_vec(vec![AnnotationApplication::reference(
                "TWWidgetDefinition",
            )]),
            ..Default::default()
        };
        assert!(has_annotation("TWWidgetDefinition", &class));
        assert!(!has_annotation("twwidgetdefinition", &class));
    }

    #[test]
    fn test_first_match_among_many() {
        let member = member_with(vec![
            AnnotationApplication::Opaque("(dynamic)".to_string()),
            AnnotationApplication::reference("service"),
            AnnotationApplication::call("description", vec!["Runs the query.".to_string()]),
        ]);
        assert!(has_annotation("service", &member));
        assert!(has_annotation("description", &member));
    }
}
