use crate::directives::TagDirectives;
use crate::scanner::Scanner;
use crate::schema::{CoreSchema, ResolvedScalar, Schema, Yaml11Schema};
use crate::{
    Encoding, Event, EventData, MappingStyle, Mark, ParserError, ScalarStyle, SequenceStyle,
    TagDirective, Token, TokenData, VersionDirective,
};

/// Chooses the schema for a document from its directives.
pub type SchemaSelector = Box<dyn Fn(Option<VersionDirective>, &[TagDirective]) -> Box<dyn Schema>>;

/// The default nesting limit for sequences and mappings.
pub const DEFAULT_RECURSION_LIMIT: usize = 256;

/// Turns tokens into a well-nested stream of events.
#[non_exhaustive]
pub struct Parser<'r> {
    scanner: Scanner<'r>,
    /// The parser states stack.
    states: Vec<ParserState>,
    /// The current parser state.
    state: ParserState,
    /// The stack of marks.
    marks: Vec<Mark>,
    /// The tag handles of the current document.
    tag_directives: TagDirectives,
    schema: Box<dyn Schema>,
    schema_selector: SchemaSelector,
    /// The number of open sequences and mappings.
    depth: usize,
    recursion_limit: usize,
    failed: bool,
}

impl<'r> Default for Parser<'r> {
    fn default() -> Self {
        Self::new()
    }
}

/// The states of the parser.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum ParserState {
    /// Expect STREAM-START.
    #[default]
    StreamStart = 0,
    /// Expect the beginning of an implicit document.
    ImplicitDocumentStart = 1,
    /// Expect DOCUMENT-START.
    DocumentStart = 2,
    /// Expect the content of a document.
    DocumentContent = 3,
    /// Expect DOCUMENT-END.
    DocumentEnd = 4,
    /// Expect a block node.
    BlockNode = 5,
    /// Expect a block node or indentless sequence.
    BlockNodeOrIndentlessSequence = 6,
    /// Expect a flow node.
    FlowNode = 7,
    /// Expect the first entry of a block sequence.
    BlockSequenceFirstEntry = 8,
    /// Expect an entry of a block sequence.
    BlockSequenceEntry = 9,
    /// Expect an entry of an indentless sequence.
    IndentlessSequenceEntry = 10,
    /// Expect the first key of a block mapping.
    BlockMappingFirstKey = 11,
    /// Expect a block mapping key.
    BlockMappingKey = 12,
    /// Expect a block mapping value.
    BlockMappingValue = 13,
    /// Expect the first entry of a flow sequence.
    FlowSequenceFirstEntry = 14,
    /// Expect an entry of a flow sequence.
    FlowSequenceEntry = 15,
    /// Expect a key of an ordered mapping.
    FlowSequenceEntryMappingKey = 16,
    /// Expect a value of an ordered mapping.
    FlowSequenceEntryMappingValue = 17,
    /// Expect the end of an ordered mapping entry.
    FlowSequenceEntryMappingEnd = 18,
    /// Expect the first key of a flow mapping.
    FlowMappingFirstKey = 19,
    /// Expect a key of a flow mapping.
    FlowMappingKey = 20,
    /// Expect a value of a flow mapping.
    FlowMappingValue = 21,
    /// Expect an empty value of a flow mapping.
    FlowMappingEmptyValue = 22,
    /// Expect nothing.
    End = 23,
}

/// Selects [`Yaml11Schema`] for `%YAML 1.1` documents and [`CoreSchema`]
/// for everything else.
pub fn default_schema(
    version_directive: Option<VersionDirective>,
    _tag_directives: &[TagDirective],
) -> Box<dyn Schema> {
    match version_directive {
        Some(VersionDirective { major: 1, minor: 1 }) => Box::new(Yaml11Schema),
        _ => Box::new(CoreSchema),
    }
}

impl<'r> Parser<'r> {
    /// Create a parser.
    pub fn new() -> Parser<'r> {
        Parser {
            scanner: Scanner::new(),
            states: Vec::with_capacity(16),
            state: ParserState::default(),
            marks: Vec::with_capacity(16),
            tag_directives: TagDirectives::new(),
            schema: Box::new(CoreSchema),
            schema_selector: Box::new(default_schema),
            depth: 0,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            failed: false,
        }
    }

    /// Reset the parser state. The schema selector and recursion limit are
    /// kept.
    pub fn reset(&mut self) {
        let selector = core::mem::replace(&mut self.schema_selector, Box::new(default_schema));
        let recursion_limit = self.recursion_limit;
        *self = Self::new();
        self.schema_selector = selector;
        self.recursion_limit = recursion_limit;
    }

    /// Set a string input.
    pub fn set_input_string(&mut self, input: &'r mut &[u8]) {
        self.scanner.set_input_string(input);
    }

    /// Set a generic input handler.
    pub fn set_input(&mut self, input: &'r mut dyn std::io::BufRead) {
        self.scanner.set_input(input);
    }

    /// Set the source encoding.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.scanner.set_encoding(encoding);
    }

    /// Set the maximum number of nested sequences and mappings.
    pub fn set_recursion_limit(&mut self, limit: usize) {
        self.recursion_limit = limit;
    }

    /// Set the function choosing the schema at the start of each document.
    pub fn set_schema_selector<F>(&mut self, selector: F)
    where
        F: Fn(Option<VersionDirective>, &[TagDirective]) -> Box<dyn Schema> + 'static,
    {
        self.schema_selector = Box::new(selector);
    }

    /// The schema of the current document.
    pub fn schema(&self) -> &dyn Schema {
        &*self.schema
    }

    /// Resolve a scalar event with the schema of the current document.
    ///
    /// Returns `None` for events other than scalars.
    pub fn resolve(&self, event: &Event) -> Result<Option<ResolvedScalar>, ParserError> {
        match &event.data {
            EventData::Scalar {
                value, tag, style, ..
            } => self
                .schema
                .resolve(value, *style, tag.as_deref())
                .map(Some)
                .map_err(|source| ParserError::Schema {
                    mark: event.start_mark,
                    source,
                }),
            _ => Ok(None),
        }
    }

    /// Parse the input stream and produce the next parsing event.
    ///
    /// Call the function subsequently to produce a sequence of events
    /// corresponding to the input stream. The initial event has the type
    /// [`EventData::StreamStart`] while the ending event has the type
    /// [`EventData::StreamEnd`]. Once the stream has ended, every further call
    /// returns another [`EventData::StreamEnd`].
    ///
    /// After an error the parser is left in an unusable state and returns
    /// [`ParserError::Halted`].
    pub fn parse(&mut self) -> Result<Event, ParserError> {
        if self.failed {
            return Err(ParserError::Halted);
        }
        if self.state == ParserState::End {
            let mark = self.scanner.mark();
            return Ok(Event::new(EventData::StreamEnd, mark, mark));
        }
        let result = self
            .state_machine()
            .and_then(|event| self.track_depth(event));
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn track_depth(&mut self, event: Event) -> Result<Event, ParserError> {
        if event.data.is_collection_start() {
            self.depth += 1;
            if self.depth > self.recursion_limit {
                return Self::set_parser_error(
                    "exceeded the maximum nesting depth",
                    event.start_mark,
                );
            }
        } else if event.data.is_collection_end() {
            self.depth = self.depth.saturating_sub(1);
        }
        Ok(event)
    }

    fn peek_token(&mut self) -> Result<&Token, ParserError> {
        self.scanner.peek_token()?.ok_or(ParserError::UnexpectedEof)
    }

    fn peek_token_mut(&mut self) -> Result<&mut Token, ParserError> {
        self.scanner
            .peek_token_mut()?
            .ok_or(ParserError::UnexpectedEof)
    }

    fn skip_token(&mut self) {
        self.scanner.skip_token();
    }

    fn pop_state(&mut self) -> ParserState {
        self.states.pop().unwrap_or(ParserState::End)
    }

    fn pop_mark(&mut self) -> Mark {
        self.marks.pop().unwrap_or_default()
    }

    fn set_parser_error<T>(problem: &'static str, problem_mark: Mark) -> Result<T, ParserError> {
        Err(ParserError::Problem {
            problem,
            mark: problem_mark,
        })
    }

    fn set_parser_error_context<T>(
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    ) -> Result<T, ParserError> {
        Err(ParserError::ProblemWithContext {
            context,
            context_mark,
            problem,
            mark: problem_mark,
        })
    }

    fn state_machine(&mut self) -> Result<Event, ParserError> {
        match self.state {
            ParserState::StreamStart => self.parse_stream_start(),
            ParserState::ImplicitDocumentStart => self.parse_document_start(true),
            ParserState::DocumentStart => self.parse_document_start(false),
            ParserState::DocumentContent => self.parse_document_content(),
            ParserState::DocumentEnd => self.parse_document_end(),
            ParserState::BlockNode => self.parse_node(true, false),
            ParserState::BlockNodeOrIndentlessSequence => self.parse_node(true, true),
            ParserState::FlowNode => self.parse_node(false, false),
            ParserState::BlockSequenceFirstEntry => self.parse_block_sequence_entry(true),
            ParserState::BlockSequenceEntry => self.parse_block_sequence_entry(false),
            ParserState::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            ParserState::BlockMappingFirstKey => self.parse_block_mapping_key(true),
            ParserState::BlockMappingKey => self.parse_block_mapping_key(false),
            ParserState::BlockMappingValue => self.parse_block_mapping_value(),
            ParserState::FlowSequenceFirstEntry => self.parse_flow_sequence_entry(true),
            ParserState::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            ParserState::FlowSequenceEntryMappingKey => {
                self.parse_flow_sequence_entry_mapping_key()
            }
            ParserState::FlowSequenceEntryMappingValue => {
                self.parse_flow_sequence_entry_mapping_value()
            }
            ParserState::FlowSequenceEntryMappingEnd => {
                self.parse_flow_sequence_entry_mapping_end()
            }
            ParserState::FlowMappingFirstKey => self.parse_flow_mapping_key(true),
            ParserState::FlowMappingKey => self.parse_flow_mapping_key(false),
            ParserState::FlowMappingValue => self.parse_flow_mapping_value(false),
            ParserState::FlowMappingEmptyValue => self.parse_flow_mapping_value(true),
            ParserState::End => {
                let mark = self.scanner.mark();
                Ok(Event::new(EventData::StreamEnd, mark, mark))
            }
        }
    }

    fn parse_stream_start(&mut self) -> Result<Event, ParserError> {
        let token = self.peek_token()?;

        if let TokenData::StreamStart { encoding } = &token.data {
            let event = Event::new(
                EventData::StreamStart {
                    encoding: *encoding,
                },
                token.start_mark,
                token.end_mark,
            );
            self.state = ParserState::ImplicitDocumentStart;
            self.skip_token();
            Ok(event)
        } else {
            let mark = token.start_mark;
            Self::set_parser_error("did not find expected <stream-start>", mark)
        }
    }

    fn parse_document_start(&mut self, implicit: bool) -> Result<Event, ParserError> {
        let mut token = self.peek_token()?;
        if !implicit {
            while let TokenData::DocumentEnd = &token.data {
                self.skip_token();
                token = self.peek_token()?;
            }
        }
        if implicit
            && !matches!(
                token.data,
                TokenData::VersionDirective { .. }
                    | TokenData::TagDirective { .. }
                    | TokenData::DocumentStart
                    | TokenData::StreamEnd
            )
        {
            let (start_mark, end_mark) = (token.start_mark, token.end_mark);
            self.process_directives()?;
            self.select_schema(None, &[]);
            tracing::debug!(mark = %start_mark, "implicit document start");
            self.states.push(ParserState::DocumentEnd);
            self.state = ParserState::BlockNode;
            Ok(Event::new(
                EventData::DocumentStart {
                    version_directive: None,
                    tag_directives: Vec::new(),
                    implicit: true,
                },
                start_mark,
                end_mark,
            ))
        } else if !matches!(token.data, TokenData::StreamEnd) {
            let start_mark = token.start_mark;
            let (version_directive, tag_directives) = self.process_directives()?;
            let token = self.peek_token()?;
            if let TokenData::DocumentStart = token.data {
                let end_mark = token.end_mark;
                self.select_schema(version_directive, &tag_directives);
                tracing::debug!(mark = %start_mark, ?version_directive, "document start");
                self.states.push(ParserState::DocumentEnd);
                self.state = ParserState::DocumentContent;
                self.skip_token();
                Ok(Event::new(
                    EventData::DocumentStart {
                        version_directive,
                        tag_directives,
                        implicit: false,
                    },
                    start_mark,
                    end_mark,
                ))
            } else {
                let mark = token.start_mark;
                Self::set_parser_error("did not find expected <document start>", mark)
            }
        } else {
            let event = Event::new(EventData::StreamEnd, token.start_mark, token.end_mark);
            self.state = ParserState::End;
            self.skip_token();
            Ok(event)
        }
    }

    fn select_schema(
        &mut self,
        version_directive: Option<VersionDirective>,
        tag_directives: &[TagDirective],
    ) {
        self.schema = (self.schema_selector)(version_directive, tag_directives);
        tracing::debug!(schema = self.schema.name(), "selected schema");
    }

    fn parse_document_content(&mut self) -> Result<Event, ParserError> {
        let token = self.peek_token()?;
        if let TokenData::VersionDirective { .. }
        | TokenData::TagDirective { .. }
        | TokenData::DocumentStart
        | TokenData::DocumentEnd
        | TokenData::StreamEnd = &token.data
        {
            let mark = token.start_mark;
            self.state = self.pop_state();
            Ok(Event::empty_scalar(mark))
        } else {
            self.parse_node(true, false)
        }
    }

    fn parse_document_end(&mut self) -> Result<Event, ParserError> {
        let token = self.peek_token()?;
        let start_mark = token.start_mark;
        let mut end_mark = start_mark;
        let mut implicit = true;
        if let TokenData::DocumentEnd = &token.data {
            end_mark = token.end_mark;
            self.skip_token();
            implicit = false;
        }
        self.tag_directives.clear();
        self.state = ParserState::DocumentStart;
        tracing::debug!(mark = %start_mark, implicit, "document end");
        Ok(Event::new(
            EventData::DocumentEnd { implicit },
            start_mark,
            end_mark,
        ))
    }

    fn parse_node(&mut self, block: bool, indentless_sequence: bool) -> Result<Event, ParserError> {
        let mut anchor: Option<String> = None;
        let mut tag_handle: Option<String> = None;
        let mut tag_suffix: Option<String> = None;
        let mut tag: Option<String> = None;
        let mut start_mark: Mark;
        let mut end_mark: Mark;
        let mut tag_mark = Mark::default();

        let mut token = self.peek_token_mut()?;

        if let TokenData::Alias { value } = &mut token.data {
            let event = Event::new(
                EventData::Alias {
                    anchor: core::mem::take(value),
                },
                token.start_mark,
                token.end_mark,
            );
            self.state = self.pop_state();
            self.skip_token();
            return Ok(event);
        }

        end_mark = token.start_mark;
        start_mark = end_mark;
        if let TokenData::Anchor { value } = &mut token.data {
            anchor = Some(core::mem::take(value));
            start_mark = token.start_mark;
            end_mark = token.end_mark;
            self.skip_token();
            token = self.peek_token_mut()?;
            if let TokenData::Tag { handle, suffix } = &mut token.data {
                tag_handle = Some(core::mem::take(handle));
                tag_suffix = Some(core::mem::take(suffix));
                tag_mark = token.start_mark;
                end_mark = token.end_mark;
                self.skip_token();
            }
        } else if let TokenData::Tag { handle, suffix } = &mut token.data {
            tag_handle = Some(core::mem::take(handle));
            tag_suffix = Some(core::mem::take(suffix));
            tag_mark = token.start_mark;
            start_mark = tag_mark;
            end_mark = token.end_mark;
            self.skip_token();
            token = self.peek_token_mut()?;
            if let TokenData::Anchor { value } = &mut token.data {
                anchor = Some(core::mem::take(value));
                end_mark = token.end_mark;
                self.skip_token();
            }
        }

        if let Some(handle) = tag_handle {
            let suffix = tag_suffix.unwrap_or_default();
            if handle.is_empty() {
                tag = Some(suffix);
            } else if let Some(expanded) = self.tag_directives.expand(&handle, &suffix) {
                tag = Some(expanded);
            } else {
                return Self::set_parser_error_context(
                    "while parsing a node",
                    start_mark,
                    "found undefined tag handle",
                    tag_mark,
                );
            }
        }

        let token = self.peek_token_mut()?;

        let implicit = tag.as_deref().map_or(true, str::is_empty);

        if indentless_sequence && matches!(token.data, TokenData::BlockEntry) {
            end_mark = token.end_mark;
            self.state = ParserState::IndentlessSequenceEntry;
            Ok(Event::new(
                EventData::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: SequenceStyle::Block,
                },
                start_mark,
                end_mark,
            ))
        } else if let TokenData::Scalar { value, style } = &mut token.data {
            let mut plain_implicit = false;
            let mut quoted_implicit = false;
            end_mark = token.end_mark;
            if *style == ScalarStyle::Plain && tag.is_none() || tag.as_deref() == Some("!") {
                plain_implicit = true;
            } else if tag.is_none() {
                quoted_implicit = true;
            }
            let event = Event::new(
                EventData::Scalar {
                    anchor,
                    tag,
                    value: core::mem::take(value),
                    plain_implicit,
                    quoted_implicit,
                    style: *style,
                },
                start_mark,
                end_mark,
            );
            self.state = self.pop_state();
            self.skip_token();
            Ok(event)
        } else if let TokenData::FlowSequenceStart = &token.data {
            end_mark = token.end_mark;
            self.state = ParserState::FlowSequenceFirstEntry;
            Ok(Event::new(
                EventData::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: SequenceStyle::Flow,
                },
                start_mark,
                end_mark,
            ))
        } else if let TokenData::FlowMappingStart = &token.data {
            end_mark = token.end_mark;
            self.state = ParserState::FlowMappingFirstKey;
            Ok(Event::new(
                EventData::MappingStart {
                    anchor,
                    tag,
                    implicit,
                    style: MappingStyle::Flow,
                },
                start_mark,
                end_mark,
            ))
        } else if block && matches!(token.data, TokenData::BlockSequenceStart) {
            end_mark = token.end_mark;
            self.state = ParserState::BlockSequenceFirstEntry;
            Ok(Event::new(
                EventData::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: SequenceStyle::Block,
                },
                start_mark,
                end_mark,
            ))
        } else if block && matches!(token.data, TokenData::BlockMappingStart) {
            end_mark = token.end_mark;
            self.state = ParserState::BlockMappingFirstKey;
            Ok(Event::new(
                EventData::MappingStart {
                    anchor,
                    tag,
                    implicit,
                    style: MappingStyle::Block,
                },
                start_mark,
                end_mark,
            ))
        } else if anchor.is_some() || tag.is_some() {
            // A node with properties but no content is an empty scalar.
            self.state = self.pop_state();
            Ok(Event::new(
                EventData::Scalar {
                    anchor,
                    tag,
                    value: String::new(),
                    plain_implicit: implicit,
                    quoted_implicit: false,
                    style: ScalarStyle::Plain,
                },
                start_mark,
                end_mark,
            ))
        } else {
            let mark = token.start_mark;
            Self::set_parser_error_context(
                if block {
                    "while parsing a block node"
                } else {
                    "while parsing a flow node"
                },
                start_mark,
                "did not find expected node content",
                mark,
            )
        }
    }

    fn parse_block_sequence_entry(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            let mark = self.peek_token()?.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }

        let mut token = self.peek_token()?;

        if let TokenData::BlockEntry = &token.data {
            let mark: Mark = token.end_mark;
            self.skip_token();
            token = self.peek_token()?;
            if matches!(token.data, TokenData::BlockEntry | TokenData::BlockEnd) {
                self.state = ParserState::BlockSequenceEntry;
                Ok(Event::empty_scalar(mark))
            } else {
                self.states.push(ParserState::BlockSequenceEntry);
                self.parse_node(true, false)
            }
        } else if let TokenData::BlockEnd = token.data {
            let event = Event::new(EventData::SequenceEnd, token.start_mark, token.end_mark);
            self.state = self.pop_state();
            self.pop_mark();
            self.skip_token();
            Ok(event)
        } else {
            let token_mark = token.start_mark;
            let mark = self.pop_mark();
            Self::set_parser_error_context(
                "while parsing a block collection",
                mark,
                "did not find expected '-' indicator",
                token_mark,
            )
        }
    }

    fn parse_indentless_sequence_entry(&mut self) -> Result<Event, ParserError> {
        let mut token = self.peek_token()?;
        if let TokenData::BlockEntry = token.data {
            let mark: Mark = token.end_mark;
            self.skip_token();
            token = self.peek_token()?;

            if matches!(
                token.data,
                TokenData::BlockEntry | TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = ParserState::IndentlessSequenceEntry;
                Ok(Event::empty_scalar(mark))
            } else {
                self.states.push(ParserState::IndentlessSequenceEntry);
                self.parse_node(true, false)
            }
        } else {
            // The entries end where the enclosing mapping continues.
            let event = Event::new(EventData::SequenceEnd, token.start_mark, token.start_mark);
            self.state = self.pop_state();
            Ok(event)
        }
    }

    fn parse_block_mapping_key(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            let mark = self.peek_token()?.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }

        let mut token = self.peek_token()?;
        if let TokenData::Key = token.data {
            let mark: Mark = token.end_mark;
            self.skip_token();
            token = self.peek_token()?;
            if matches!(
                token.data,
                TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = ParserState::BlockMappingValue;
                Ok(Event::empty_scalar(mark))
            } else {
                self.states.push(ParserState::BlockMappingValue);
                self.parse_node(true, true)
            }
        } else if let TokenData::BlockEnd = token.data {
            let event = Event::new(EventData::MappingEnd, token.start_mark, token.end_mark);
            self.state = self.pop_state();
            self.pop_mark();
            self.skip_token();
            Ok(event)
        } else {
            let token_mark = token.start_mark;
            let mark = self.pop_mark();
            Self::set_parser_error_context(
                "while parsing a block mapping",
                mark,
                "did not find expected key",
                token_mark,
            )
        }
    }

    fn parse_block_mapping_value(&mut self) -> Result<Event, ParserError> {
        let mut token = self.peek_token()?;
        if let TokenData::Value = token.data {
            let mark: Mark = token.end_mark;
            self.skip_token();
            token = self.peek_token()?;
            if matches!(
                token.data,
                TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = ParserState::BlockMappingKey;
                Ok(Event::empty_scalar(mark))
            } else {
                self.states.push(ParserState::BlockMappingKey);
                self.parse_node(true, true)
            }
        } else {
            let mark = token.start_mark;
            self.state = ParserState::BlockMappingKey;
            Ok(Event::empty_scalar(mark))
        }
    }

    fn parse_flow_sequence_entry(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            let mark = self.peek_token()?.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }

        let mut token = self.peek_token()?;
        if !matches!(token.data, TokenData::FlowSequenceEnd) {
            if !first {
                if let TokenData::FlowEntry = token.data {
                    self.skip_token();
                    token = self.peek_token()?;
                } else {
                    let token_mark = token.start_mark;
                    let mark = self.pop_mark();
                    return Self::set_parser_error_context(
                        "while parsing a flow sequence",
                        mark,
                        "did not find expected ',' or ']'",
                        token_mark,
                    );
                }
            }
            if let TokenData::Key = token.data {
                // A single pair mapping inside a flow sequence.
                let event = Event::new(
                    EventData::MappingStart {
                        anchor: None,
                        tag: None,
                        implicit: true,
                        style: MappingStyle::Flow,
                    },
                    token.start_mark,
                    token.end_mark,
                );
                self.state = ParserState::FlowSequenceEntryMappingKey;
                self.skip_token();
                return Ok(event);
            } else if !matches!(token.data, TokenData::FlowSequenceEnd) {
                self.states.push(ParserState::FlowSequenceEntry);
                return self.parse_node(false, false);
            }
        }
        let event = Event::new(EventData::SequenceEnd, token.start_mark, token.end_mark);
        self.state = self.pop_state();
        self.pop_mark();
        self.skip_token();
        Ok(event)
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> Result<Event, ParserError> {
        let token = self.peek_token()?;
        if matches!(
            token.data,
            TokenData::Value | TokenData::FlowEntry | TokenData::FlowSequenceEnd
        ) {
            let mark: Mark = token.start_mark;
            self.state = ParserState::FlowSequenceEntryMappingValue;
            Ok(Event::empty_scalar(mark))
        } else {
            self.states.push(ParserState::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        }
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> Result<Event, ParserError> {
        let mut token = self.peek_token()?;
        if let TokenData::Value = token.data {
            self.skip_token();
            token = self.peek_token()?;
            if !matches!(
                token.data,
                TokenData::FlowEntry | TokenData::FlowSequenceEnd
            ) {
                self.states.push(ParserState::FlowSequenceEntryMappingEnd);
                return self.parse_node(false, false);
            }
        }
        let mark = token.start_mark;
        self.state = ParserState::FlowSequenceEntryMappingEnd;
        Ok(Event::empty_scalar(mark))
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> Result<Event, ParserError> {
        let token = self.peek_token()?;
        let (start_mark, end_mark) = (token.start_mark, token.end_mark);
        self.state = ParserState::FlowSequenceEntry;
        Ok(Event::new(EventData::MappingEnd, start_mark, end_mark))
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            let mark = self.peek_token()?.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }

        let mut token = self.peek_token()?;
        if !matches!(token.data, TokenData::FlowMappingEnd) {
            if !first {
                if let TokenData::FlowEntry = token.data {
                    self.skip_token();
                    token = self.peek_token()?;
                } else {
                    let token_mark = token.start_mark;
                    let mark = self.pop_mark();
                    return Self::set_parser_error_context(
                        "while parsing a flow mapping",
                        mark,
                        "did not find expected ',' or '}'",
                        token_mark,
                    );
                }
            }
            if let TokenData::Key = token.data {
                self.skip_token();
                token = self.peek_token()?;
                if !matches!(
                    token.data,
                    TokenData::Value | TokenData::FlowEntry | TokenData::FlowMappingEnd
                ) {
                    self.states.push(ParserState::FlowMappingValue);
                    return self.parse_node(false, false);
                }
                let mark = token.start_mark;
                self.state = ParserState::FlowMappingValue;
                return Ok(Event::empty_scalar(mark));
            } else if !matches!(token.data, TokenData::FlowMappingEnd) {
                self.states.push(ParserState::FlowMappingEmptyValue);
                return self.parse_node(false, false);
            }
        }
        let event = Event::new(EventData::MappingEnd, token.start_mark, token.end_mark);
        self.state = self.pop_state();
        self.pop_mark();
        self.skip_token();
        Ok(event)
    }

    fn parse_flow_mapping_value(&mut self, empty: bool) -> Result<Event, ParserError> {
        let mut token = self.peek_token()?;
        if empty {
            let mark = token.start_mark;
            self.state = ParserState::FlowMappingKey;
            return Ok(Event::empty_scalar(mark));
        }
        if let TokenData::Value = token.data {
            self.skip_token();
            token = self.peek_token()?;
            if !matches!(token.data, TokenData::FlowEntry | TokenData::FlowMappingEnd) {
                self.states.push(ParserState::FlowMappingKey);
                return self.parse_node(false, false);
            }
        }
        let mark = token.start_mark;
        self.state = ParserState::FlowMappingKey;
        Ok(Event::empty_scalar(mark))
    }

    /// Consume the `%YAML` and `%TAG` directives in front of a document and
    /// set up its tag handles.
    fn process_directives(
        &mut self,
    ) -> Result<(Option<VersionDirective>, Vec<TagDirective>), ParserError> {
        let mut version_directive: Option<VersionDirective> = None;
        let mut tag_directives = Vec::new();
        self.tag_directives.clear();

        loop {
            let token = self.peek_token_mut()?;
            let mark = token.start_mark;
            match &mut token.data {
                TokenData::VersionDirective { major, minor } => {
                    let (major, minor) = (*major, *minor);
                    if version_directive.is_some() {
                        return Self::set_parser_error("found duplicate %YAML directive", mark);
                    } else if major != 1 {
                        return Self::set_parser_error("found incompatible YAML document", mark);
                    } else if minor != 1 && minor != 2 {
                        tracing::warn!(major, minor, %mark, "unsupported YAML version, parsing as 1.2");
                    }
                    version_directive = Some(VersionDirective::new(major, minor));
                }
                TokenData::TagDirective { handle, prefix } => {
                    let directive =
                        TagDirective::new(core::mem::take(handle), core::mem::take(prefix));
                    if !self.tag_directives.add(directive.clone()) {
                        return Self::set_parser_error("found duplicate %TAG directive", mark);
                    }
                    tag_directives.push(directive);
                }
                _ => break,
            }
            self.skip_token();
        }

        self.tag_directives.add_defaults();
        Ok((version_directive, tag_directives))
    }
}

impl<'r> Iterator for Parser<'r> {
    type Item = Result<Event, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ParserState::End || self.failed {
            None
        } else {
            Some(self.parse())
        }
    }
}

impl<'r> core::iter::FusedIterator for Parser<'r> {}
