use crate::{
    Encoding, MappingStyle, Mark, ScalarStyle, SequenceStyle, TagDirective, VersionDirective,
};

/// The event structure.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Event {
    /// The event data.
    pub data: EventData,
    /// The beginning of the event.
    pub start_mark: Mark,
    /// The end of the event.
    pub end_mark: Mark,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// The stream parameters (for a STREAM-START event).
    StreamStart {
        /// The document encoding.
        encoding: Encoding,
    },
    StreamEnd,
    /// The document parameters (for a DOCUMENT-START event).
    DocumentStart {
        /// The version directive.
        version_directive: Option<VersionDirective>,
        /// The tag directives list.
        tag_directives: Vec<TagDirective>,
        /// Is the document indicator implicit?
        implicit: bool,
    },
    /// The document end parameters (for a DOCUMENT-END event).
    DocumentEnd {
        implicit: bool,
    },
    /// The alias parameters (for an ALIAS event).
    Alias {
        /// The anchor.
        anchor: String,
    },
    /// The scalar parameters (for a SCALAR event).
    Scalar {
        /// The anchor.
        anchor: Option<String>,
        /// The tag, fully expanded.
        tag: Option<String>,
        /// The scalar value.
        value: String,
        /// Is the tag optional for the plain style?
        plain_implicit: bool,
        /// Is the tag optional for any non-plain style?
        quoted_implicit: bool,
        /// The scalar style.
        style: ScalarStyle,
    },
    /// The sequence parameters (for a SEQUENCE-START event).
    SequenceStart {
        /// The anchor.
        anchor: Option<String>,
        /// The tag, fully expanded.
        tag: Option<String>,
        /// Is the tag optional?
        implicit: bool,
        /// The sequence style.
        style: SequenceStyle,
    },
    SequenceEnd,
    /// The mapping parameters (for a MAPPING-START event).
    MappingStart {
        /// The anchor.
        anchor: Option<String>,
        /// The tag, fully expanded.
        tag: Option<String>,
        /// Is the tag optional?
        implicit: bool,
        /// The mapping style.
        style: MappingStyle,
    },
    MappingEnd,
}

impl Event {
    pub(crate) fn new(data: EventData, start_mark: Mark, end_mark: Mark) -> Self {
        Event {
            data,
            start_mark,
            end_mark,
        }
    }

    /// Create an empty plain scalar at `mark`, as produced for an omitted
    /// key or value.
    pub(crate) fn empty_scalar(mark: Mark) -> Self {
        Event::new(
            EventData::Scalar {
                anchor: None,
                tag: None,
                value: String::new(),
                plain_implicit: true,
                quoted_implicit: false,
                style: ScalarStyle::Plain,
            },
            mark,
            mark,
        )
    }
}

impl EventData {
    /// The anchor of a node event.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            EventData::Scalar { anchor, .. }
            | EventData::SequenceStart { anchor, .. }
            | EventData::MappingStart { anchor, .. } => anchor.as_deref(),
            _ => None,
        }
    }

    /// The explicit tag of a node event.
    pub fn tag(&self) -> Option<&str> {
        match self {
            EventData::Scalar { tag, .. }
            | EventData::SequenceStart { tag, .. }
            | EventData::MappingStart { tag, .. } => tag.as_deref(),
            _ => None,
        }
    }

    /// True for events that open a sequence or mapping.
    pub fn is_collection_start(&self) -> bool {
        matches!(
            self,
            EventData::SequenceStart { .. } | EventData::MappingStart { .. }
        )
    }

    /// True for events that close a sequence or mapping.
    pub fn is_collection_end(&self) -> bool {
        matches!(self, EventData::SequenceEnd | EventData::MappingEnd)
    }
}
