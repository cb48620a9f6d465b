//! Description synthesis from documentation comments
//!
//! Generates a `description` annotation for any class carrying the widget
//! definition marker, and for each property/event/service member of such a
//! class, taking the text from the highest priority documentation entry.
//! Declarations that already carry a description keep it, so running the
//! transform a second time changes nothing.

use tracing::debug;

use crate::annotations::{has_annotation, Annotated};
use crate::declarations::{AnnotationApplication, CompilationUnit, Declaration, DocBlock};

/// Class annotation that marks a widget definition.
pub const WIDGET_DEFINITION: &str = "TWWidgetDefinition";

/// Annotation that carries the human readable description text.
pub const DESCRIPTION: &str = "description";

/// Member annotations whose carriers are eligible for description synthesis.
pub const MEMBER_MARKERS: &[&str] = &["property", "event", "service"];

/// Documentation tags consulted for description text, most generic first.
/// The comment parser files the untagged leading text under `description`.
pub const DEFAULT_DESCRIPTION_TAGS: &[&str] = &["description", "summary", "remarks"];

/// Per-unit transform that attaches synthesized `description` annotations.
#[derive(Debug, Clone)]
pub struct DescriptionSynthesizer {
    description_tags: Vec<String>,
}

impl Default for DescriptionSynthesizer {
    fn default() -> Self {
        DescriptionSynthesizer::new()
    }
}

impl DescriptionSynthesizer {
    /// Synthesizer with the default documentation tag priority.
    pub fn new() -> Self {
        Self::with_tags(DEFAULT_DESCRIPTION_TAGS.iter().map(|tag| (*tag).to_string()))
    }

    /// Synthesizer with a custom tag priority. Earlier tags win; within one
    /// tag the first entry in document order wins.
    pub fn with_tags(tags: impl IntoIterator<Item = String>) -> Self {
        DescriptionSynthesizer {
            description_tags: tags.into_iter().collect(),
        }
    }

    /// Walks the unit's declarations and attaches a description annotation
    /// wherever a widget definition class, or a marked member of one,
    /// documents itself without already declaring a description.
    ///
    /// Returns the number of annotations added. Mutation is append-only;
    /// existing annotations are never removed or reordered.
    pub fn transform(&self, unit: &mut CompilationUnit) -> usize {
        let mut synthesized = 0;

        for declaration in &mut unit.declarations {
            let Declaration::Class(class) = declaration else {
                continue;
            };
            if !has_annotation(WIDGET_DEFINITION, class) {
                continue;
            }

            if self.synthesize(class) {
                debug!("Synthesized description for class {}", class.name);
                synthesized += 1;
            }

            for member in &mut class.members {
                let marked = MEMBER_MARKERS
                    .iter()
                    .any(|&marker| has_annotation(marker, member));
                if marked && self.synthesize(member) {
                    debug!("Synthesized description for member {}", member.name);
                    synthesized += 1;
                }
            }
        }

        if synthesized > 0 {
            debug!(
                "Synthesized {} description annotation(s) in {:?}",
                synthesized, unit.path
            );
        }

        synthesized
    }

    /// Attaches a description derived from the node's documentation. An
    /// existing description annotation or the absence of a recognized tag
    /// are valid terminal states, not errors.
    fn synthesize(&self, node: &mut impl Annotated) -> bool {
        if has_annotation(DESCRIPTION, node) {
            return false;
        }

        let Some(text) = node.doc().and_then(|doc| self.description_text(doc)) else {
            return false;
        };

        node.push_annotation(AnnotationApplication::call(DESCRIPTION, vec![text]));
        true
    }

    /// Description text from the highest priority recognized tag, verbatim.
    fn description_text(&self, doc: &DocBlock) -> Option<String> {
        self.description_tags
            .iter()
            .find_map(|tag| doc.first_tagged(tag))
            .map(|entry| entry.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::{
        AnnotationList, ClassDeclaration, DocEntry, MemberDeclaration, MemberKind,
    };

    fn doc(entries: Vec<DocEntry>) -> Option<DocBlock> {
        Some(DocBlock { entries })
    }

    fn widget_class(name: &str) -> ClassDeclaration {
        ClassDeclaration {
            name: name.to_string(),
            annotations: AnnotationList::from_vec(vec![AnnotationApplication::reference(
                WIDGET_DEFINITION,
            )]),
            ..Default::default()
        }
    }

    fn property(name: &str, entries: Vec<DocEntry>) -> MemberDeclaration {
        MemberDeclaration {
            name: name.to_string(),
            kind: MemberKind::Property,
            annotations: AnnotationList::from_vec(vec![AnnotationApplication::call(
                "property",
                vec![],
            )]),
            doc: doc(entries),
        }
    }

    fn unit_of(class: ClassDeclaration) -> CompilationUnit {
        CompilationUnit {
            path: None,
            declarations: vec![Declaration::Class(class)],
        }
    }

    fn description_argument(node: &impl Annotated) -> Option<&str> {
        node.annotations().iter().find_map(|annotation| match annotation {
            AnnotationApplication::Call { callee, arguments } if callee == DESCRIPTION => {
                arguments.first().map(String::as_str)
            }
            _ => None,
        })
    }

    #[test]
    fn test_synthesizes_class_description_from_doc() {
        let mut class = widget_class("GaugeWidget");
        class.doc = doc(vec![DocEntry::new("description", "Displays a gauge.")]);
        let mut unit = unit_of(class);

        let count = DescriptionSynthesizer::new().transform(&mut unit);

        assert_eq!(count, 1);
        let Declaration::Class(class) = &unit.declarations[0] else {
            panic!("expected a class declaration");
        };
        assert_eq!(description_argument(class), Some("Displays a gauge."));
    }

    #[test]
    fn test_synthesizes_member_descriptions() {
        let mut class = widget_class("GaugeWidget");
        class.members = vec![
            property("value", vec![DocEntry::new("description", "Current value.")]),
            MemberDeclaration {
                name: "clicked".to_string(),
                kind: MemberKind::Method,
                annotations: AnnotationList::from_vec(vec![AnnotationApplication::reference(
                    "event",
                )]),
                doc: doc(vec![DocEntry::new("summary", "Fires on click.")]),
            },
        ];
        let mut unit = unit_of(class);

        let count = DescriptionSynthesizer::new().transform(&mut unit);

        assert_eq!(count, 2);
        let Declaration::Class(class) = &unit.declarations[0] else {
            panic!("expected a class declaration");
        };
        assert_eq!(description_argument(&class.members[0]), Some("Current value."));
        assert_eq!(description_argument(&class.members[1]), Some("Fires on click."));
    }

    #[test]
    fn test_skips_existing_description() {
        let mut class = widget_class("GaugeWidget");
        class
            .annotations
            .push(AnnotationApplication::call(
                DESCRIPTION,
                vec!["Hand written.".to_string()],
            ));
        class.doc = doc(vec![DocEntry::new("description", "Generated text.")]);
        let mut unit = unit_of(class);

        let count = DescriptionSynthesizer::new().transform(&mut unit);

        assert_eq!(count, 0);
        let Declaration::Class(class) = &unit.declarations[0] else {
            panic!("expected a class declaration");
        };
        assert_eq!(description_argument(class), Some("Hand written."));
        assert_eq!(class.annotations.len(), 2);
    }

    #[test]
    fn test_skips_class_without_widget_marker() {
        let mut class = ClassDeclaration {
            name: "Helper".to_string(),
            doc: doc(vec![DocEntry::new("description", "Not a widget.")]),
            ..Default::default()
        };
        // Members are skipped too, even when marked and documented.
        class.members = vec![property(
            "value",
            vec![DocEntry::new("description", "Ignored.")],
        )];
        let mut unit = unit_of(class);

        let count = DescriptionSynthesizer::new().transform(&mut unit);

        assert_eq!(count, 0);
    }

    #[test]
    fn test_skips_member_without_marker() {
        let mut class = widget_class("GaugeWidget");
        class.members = vec![MemberDeclaration {
            name: "internal".to_string(),
            kind: MemberKind::Property,
            annotations: AnnotationList::new(),
            doc: doc(vec![DocEntry::new("description", "Internal state.")]),
        }];
        let mut unit = unit_of(class);

        let count = DescriptionSynthesizer::new().transform(&mut unit);

        assert_eq!(count, 0);
    }

    #[test]
    fn test_unrecognized_tags_are_a_valid_terminal_state() {
        let mut class = widget_class("GaugeWidget");
        class.doc = doc(vec![DocEntry::new("param", "Not descriptive.")]);
        let mut unit = unit_of(class);

        let count = DescriptionSynthesizer::new().transform(&mut unit);

        assert_eq!(count, 0);
        let Declaration::Class(class) = &unit.declarations[0] else {
            panic!("expected a class declaration");
        };
        assert_eq!(class.annotations.len(), 1);
    }

    #[test]
    fn test_generic_tag_outranks_specific_ones() {
        let mut class = widget_class("GaugeWidget");
        class.doc = doc(vec![
            DocEntry::new("remarks", "Specific remark."),
            DocEntry::new("description", "Generic description."),
        ]);
        let mut unit = unit_of(class);

        DescriptionSynthesizer::new().transform(&mut unit);

        let Declaration::Class(class) = &unit.declarations[0] else {
            panic!("expected a class declaration");
        };
        assert_eq!(description_argument(class), Some("Generic description."));
    }

    #[test]
    fn test_text_is_taken_verbatim() {
        let text = "Line one.\n  Indented line two.";
        let mut class = widget_class("GaugeWidget");
        class.doc = doc(vec![DocEntry::new("description", text)]);
        let mut unit = unit_of(class);

        DescriptionSynthesizer::new().transform(&mut unit);

        let Declaration::Class(class) = &unit.declarations[0] else {
            panic!("expected a class declaration");
        };
        assert_eq!(description_argument(class), Some(text));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let mut class = widget_class("GaugeWidget");
        class.doc = doc(vec![DocEntry::new("description", "Displays a gauge.")]);
        class.members = vec![property(
            "value",
            vec![DocEntry::new("description", "Current value.")],
        )];
        let mut unit = unit_of(class);

        let synthesizer = DescriptionSynthesizer::new();
        let first = synthesizer.transform(&mut unit);
        let after_first = unit.clone();
        let second = synthesizer.transform(&mut unit);

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(unit, after_first);
    }

    #[test]
    fn test_custom_tag_priority() {
        let mut class = widget_class("GaugeWidget");
        class.doc = doc(vec![
            DocEntry::new("description", "Generic description."),
            DocEntry::new("displayName", "Gauge"),
        ]);
        let mut unit = unit_of(class);

        DescriptionSynthesizer::with_tags(vec!["displayName".to_string()]).transform(&mut unit);

        let Declaration::Class(class) = &unit.declarations[0] else {
            panic!("expected a class declaration");
        };
        assert_eq!(description_argument(class), Some("Gauge"));
    }
}
