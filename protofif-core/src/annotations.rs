// Schema annotations
//
// Options the schema generator reads to default struct tag conventions.
// They are pure metadata: nothing in the codecs consults them.

/// Which descriptor an annotation extends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extendee {
    MessageOptions,
    FieldOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationType {
    Bool,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    /// Fully qualified option name.
    pub name: &'static str,
    pub number: u32,
    pub extendee: Extendee,
    pub value_type: AnnotationType,
    pub description: &'static str,
}

const PACKAGE: &str = "protofif";

pub static ANNOTATIONS: [Annotation; 6] = [
    Annotation {
        name: "protofif.bsontags",
        number: 65001,
        extendee: Extendee::MessageOptions,
        value_type: AnnotationType::Bool,
        description: "Defaults tag bson:\"<jsonname>,omitempty\" on all struct fields",
    },
    Annotation {
        name: "protofif.non_editable",
        number: 65002,
        extendee: Extendee::MessageOptions,
        value_type: AnnotationType::Bool,
        description: "Defaults tag editable:\"false\" on all struct fields",
    },
    Annotation {
        name: "protofif.database_default",
        number: 65003,
        extendee: Extendee::MessageOptions,
        value_type: AnnotationType::Bool,
        description: "Defaults tag database:\"default\" on all struct fields",
    },
    Annotation {
        name: "protofif.json",
        number: 65001,
        extendee: Extendee::FieldOptions,
        value_type: AnnotationType::String,
        description: "Overrides the JSON name of a field",
    },
    Annotation {
        name: "protofif.moretags",
        number: 65002,
        extendee: Extendee::FieldOptions,
        value_type: AnnotationType::String,
        description: "Extra struct tags appended verbatim to a field",
    },
    Annotation {
        name: "protofif.embed",
        number: 65003,
        extendee: Extendee::FieldOptions,
        value_type: AnnotationType::Bool,
        description: "Embeds the field's message type into its parent",
    },
];

impl Annotation {
    /// Name without the package prefix.
    pub fn short_name(&self) -> &'static str {
        self.name
            .strip_prefix(PACKAGE)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(self.name)
    }
}

/// Look up an annotation by its qualified or short name.
pub fn find(name: &str) -> Option<&'static Annotation> {
    ANNOTATIONS
        .iter()
        .find(|a| a.name == name || a.short_name() == name)
}

pub fn for_extendee(extendee: Extendee) -> impl Iterator<Item = &'static Annotation> {
    ANNOTATIONS.iter().filter(move |a| a.extendee == extendee)
}
