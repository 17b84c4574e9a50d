use crate::buffer::LookAheadBuffer;
use crate::chars::{
    as_digit, as_hex, is_alpha, is_blank, is_blankz, is_bom, is_break, is_breakz, is_digit,
    is_hex, is_space, is_tab, is_uri_char, is_z,
};
use crate::queue::InsertionQueue;
use crate::reader::{CharSource, Reader};
use crate::{Encoding, Mark, ScalarStyle, ScannerError, Token, TokenData};

/// A simple key candidate on one nesting level.
#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct SimpleKey {
    /// Is a simple key possible?
    pub possible: bool,
    /// Is a simple key required?
    pub required: bool,
    /// The number of the token.
    pub token_number: usize,
    /// The position mark.
    pub mark: Mark,
}

/// A simple key may not span more characters than this.
const MAX_SIMPLE_KEY_LENGTH: u64 = 1024;

const MAX_NUMBER_LENGTH: u64 = 9;

/// Turns a character stream into YAML tokens.
///
/// Tokens are produced on demand. The scanner only reads as far ahead as it
/// needs to decide whether the current position starts a simple key.
pub struct Scanner<'r> {
    buffer: LookAheadBuffer<Reader<'r>>,
    mark: Mark,
    stream_start_produced: bool,
    stream_end_produced: bool,
    flow_level: usize,
    tokens: InsertionQueue<Token>,
    /// The number of tokens handed out so far.
    tokens_parsed: usize,
    /// Does the queue front hold a token that is ready to be handed out?
    token_available: bool,
    indents: Vec<i64>,
    /// The current indentation column; -1 at the stream level.
    indent: i64,
    simple_key_allowed: bool,
    simple_keys: Vec<SimpleKey>,
    failed: bool,
}

impl<'r> Default for Scanner<'r> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Scanner<'r> {
    pub fn new() -> Scanner<'r> {
        Scanner {
            buffer: LookAheadBuffer::new(Reader::new()),
            mark: Mark::default(),
            stream_start_produced: false,
            stream_end_produced: false,
            flow_level: 0,
            tokens: InsertionQueue::with_capacity(16),
            tokens_parsed: 0,
            token_available: false,
            indents: Vec::with_capacity(16),
            indent: 0,
            simple_key_allowed: false,
            simple_keys: Vec::with_capacity(16),
            failed: false,
        }
    }

    /// Set a string input.
    pub fn set_input_string(&mut self, input: &'r mut &[u8]) {
        self.buffer.source_mut().set_input(input);
    }

    /// Set a generic input handler.
    pub fn set_input(&mut self, input: &'r mut dyn std::io::BufRead) {
        self.buffer.source_mut().set_input(input);
    }

    /// Set the source encoding.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.buffer.source_mut().set_encoding(encoding);
    }

    /// The position of the next unread character.
    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// Scan the input stream and produce the next token.
    ///
    /// Call the function subsequently to produce a sequence of tokens
    /// corresponding to the input stream. The initial token has the type
    /// [`TokenData::StreamStart`] while the ending token has the type
    /// [`TokenData::StreamEnd`]. Once the stream end has been produced, every
    /// further call returns another [`TokenData::StreamEnd`].
    ///
    /// After an error the scanner is left in an unusable state and returns
    /// [`ScannerError::Halted`].
    pub fn scan(&mut self) -> Result<Token, ScannerError> {
        if self.stream_end_produced {
            return Ok(Token::new(TokenData::StreamEnd, self.mark, self.mark));
        }
        if !self.token_available {
            self.fetch_more_tokens()?;
        }
        let Ok(token) = self.tokens.dequeue() else {
            unreachable!("no more tokens, but stream-end was not produced")
        };
        self.token_available = false;
        self.tokens_parsed += 1;
        tracing::trace!(token = token.data.kind(), mark = %token.start_mark, "scanned");
        if let TokenData::StreamEnd = &token.data {
            self.stream_end_produced = true;
        }
        Ok(token)
    }

    /// Look at the next token without consuming it.
    pub(crate) fn peek_token(&mut self) -> Result<Option<&Token>, ScannerError> {
        if !self.token_available {
            self.fetch_more_tokens()?;
        }
        Ok(self.tokens.front())
    }

    pub(crate) fn peek_token_mut(&mut self) -> Result<Option<&mut Token>, ScannerError> {
        if !self.token_available {
            self.fetch_more_tokens()?;
        }
        Ok(self.tokens.front_mut())
    }

    /// Consume the token returned by the last peek.
    pub(crate) fn skip_token(&mut self) {
        self.token_available = false;
        self.tokens_parsed += 1;
        if let Ok(token) = self.tokens.dequeue() {
            tracing::trace!(token = token.data.kind(), mark = %token.start_mark, "consumed");
            if let TokenData::StreamEnd = token.data {
                self.stream_end_produced = true;
            }
        }
    }

    fn error<T>(
        &self,
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
    ) -> Result<T, ScannerError> {
        Err(ScannerError::Problem {
            context,
            context_mark,
            problem,
            problem_mark: self.mark,
        })
    }

    fn cache(&mut self, length: usize) -> Result<(), ScannerError> {
        self.buffer.cache(length)?;
        Ok(())
    }

    fn ch(&self) -> char {
        self.buffer.get(0)
    }

    fn ch_at(&self, offset: usize) -> char {
        self.buffer.get(offset)
    }

    fn check(&self, ch: char) -> bool {
        self.buffer.get(0) == ch
    }

    fn skip(&mut self) {
        self.buffer.skip(1);
        self.mark.index += 1;
        self.mark.column += 1;
    }

    fn skip_line(&mut self) {
        if self.ch() == '\r' && self.ch_at(1) == '\n' {
            self.buffer.skip(2);
            self.mark.index += 2;
            self.mark.column = 0;
            self.mark.line += 1;
        } else if is_break(self.ch()) {
            self.buffer.skip(1);
            self.mark.index += 1;
            self.mark.column = 0;
            self.mark.line += 1;
        }
    }

    fn read_string(&mut self, string: &mut String) {
        string.push(self.ch());
        self.skip();
    }

    fn read_line_string(&mut self, string: &mut String) {
        let ch = self.ch();
        if ch == '\r' && self.ch_at(1) == '\n' {
            string.push('\n');
            self.buffer.skip(2);
            self.mark.index += 2;
        } else if is_break(ch) {
            // Line and paragraph separators are content, not line ends.
            if ch == '\u{2028}' || ch == '\u{2029}' {
                string.push(ch);
            } else {
                string.push('\n');
            }
            self.buffer.skip(1);
            self.mark.index += 1;
        } else {
            return;
        }
        self.mark.column = 0;
        self.mark.line += 1;
    }

    fn is_document_indicator(&self) -> bool {
        self.mark.column == 0
            && (self.ch_at(0) == '-' && self.ch_at(1) == '-' && self.ch_at(2) == '-'
                || self.ch_at(0) == '.' && self.ch_at(1) == '.' && self.ch_at(2) == '.')
            && is_blankz(self.ch_at(3))
    }

    pub(crate) fn fetch_more_tokens(&mut self) -> Result<(), ScannerError> {
        if self.failed {
            return Err(ScannerError::Halted);
        }
        let result = self.fetch_more_tokens_inner();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn fetch_more_tokens_inner(&mut self) -> Result<(), ScannerError> {
        loop {
            let mut need_more_tokens = false;
            if self.tokens.is_empty() {
                need_more_tokens = true;
            } else {
                self.stale_simple_keys()?;
                for simple_key in &self.simple_keys {
                    if simple_key.possible && simple_key.token_number == self.tokens_parsed {
                        need_more_tokens = true;
                        break;
                    }
                }
            }
            if !need_more_tokens {
                break;
            }
            self.fetch_next_token()?;
        }
        self.token_available = true;
        Ok(())
    }

    fn fetch_next_token(&mut self) -> Result<(), ScannerError> {
        self.cache(1)?;
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }
        self.scan_to_next_token()?;
        self.stale_simple_keys()?;
        self.unroll_indent(self.mark.column as i64);
        self.cache(4)?;

        let ch = self.ch();
        if is_z(ch) {
            return self.fetch_stream_end();
        }
        if self.mark.column == 0 && ch == '%' {
            return self.fetch_directive();
        }
        if self.is_document_indicator() {
            let data = if ch == '-' {
                TokenData::DocumentStart
            } else {
                TokenData::DocumentEnd
            };
            return self.fetch_document_indicator(data);
        }
        match ch {
            '[' => return self.fetch_flow_collection_start(TokenData::FlowSequenceStart),
            '{' => return self.fetch_flow_collection_start(TokenData::FlowMappingStart),
            ']' => return self.fetch_flow_collection_end(TokenData::FlowSequenceEnd),
            '}' => return self.fetch_flow_collection_end(TokenData::FlowMappingEnd),
            ',' => return self.fetch_flow_entry(),
            '-' if is_blankz(self.ch_at(1)) => return self.fetch_block_entry(),
            '?' if self.flow_level != 0 || is_blankz(self.ch_at(1)) => return self.fetch_key(),
            ':' if self.flow_level != 0 || is_blankz(self.ch_at(1)) => {
                return self.fetch_value()
            }
            '*' => return self.fetch_anchor(true),
            '&' => return self.fetch_anchor(false),
            '!' => return self.fetch_tag(),
            '|' if self.flow_level == 0 => return self.fetch_block_scalar(true),
            '>' if self.flow_level == 0 => return self.fetch_block_scalar(false),
            '\'' => return self.fetch_flow_scalar(true),
            '"' => return self.fetch_flow_scalar(false),
            _ => {}
        }

        let is_indicator = is_blankz(ch)
            || matches!(
                ch,
                '-' | '?'
                    | ':'
                    | ','
                    | '['
                    | ']'
                    | '{'
                    | '}'
                    | '#'
                    | '&'
                    | '*'
                    | '!'
                    | '|'
                    | '>'
                    | '\''
                    | '"'
                    | '%'
                    | '@'
                    | '`'
            );
        if !is_indicator
            || ch == '-' && !is_blank(self.ch_at(1))
            || self.flow_level == 0 && (ch == '?' || ch == ':') && !is_blankz(self.ch_at(1))
        {
            return self.fetch_plain_scalar();
        }
        self.error(
            "while scanning for the next token",
            self.mark,
            "found character that cannot start any token",
        )
    }

    fn stale_simple_keys(&mut self) -> Result<(), ScannerError> {
        let current = self.mark;
        for simple_key in &mut self.simple_keys {
            let mark = simple_key.mark;
            if simple_key.possible
                && (mark.line < current.line || mark.index + MAX_SIMPLE_KEY_LENGTH < current.index)
            {
                if simple_key.required {
                    return Err(ScannerError::Problem {
                        context: "while scanning a simple key",
                        context_mark: mark,
                        problem: "could not find expected ':'",
                        problem_mark: current,
                    });
                }
                simple_key.possible = false;
            }
        }
        Ok(())
    }

    fn save_simple_key(&mut self) -> Result<(), ScannerError> {
        let required = self.flow_level == 0 && self.indent == self.mark.column as i64;
        if self.simple_key_allowed {
            let simple_key = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark,
            };
            self.remove_simple_key()?;
            if let Some(slot) = self.simple_keys.last_mut() {
                *slot = simple_key;
            }
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), ScannerError> {
        let current = self.mark;
        if let Some(simple_key) = self.simple_keys.last_mut() {
            if simple_key.possible && simple_key.required {
                return Err(ScannerError::Problem {
                    context: "while scanning a simple key",
                    context_mark: simple_key.mark,
                    problem: "could not find expected ':'",
                    problem_mark: current,
                });
            }
            simple_key.possible = false;
        }
        Ok(())
    }

    fn increase_flow_level(&mut self) {
        self.simple_keys.push(SimpleKey::default());
        self.flow_level += 1;
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level != 0 {
            self.flow_level -= 1;
            let _ = self.simple_keys.pop();
        }
    }

    /// Push a new indentation level if `column` is deeper than the current
    /// one, emitting `data` as the collection start. With `number` set, the
    /// token is inserted in front of the token with that number instead of
    /// being appended.
    fn roll_indent(&mut self, column: i64, number: Option<usize>, data: TokenData, mark: Mark) {
        if self.flow_level != 0 {
            return;
        }
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            let token = Token::new(data, mark, mark);
            match number {
                None => self.tokens.enqueue(token),
                Some(number) => self.tokens.insert(number - self.tokens_parsed, token),
            }
        }
    }

    /// Pop indentation levels deeper than `column`, emitting one `BlockEnd`
    /// per level.
    fn unroll_indent(&mut self, column: i64) {
        if self.flow_level != 0 {
            return;
        }
        while self.indent > column {
            self.tokens
                .enqueue(Token::new(TokenData::BlockEnd, self.mark, self.mark));
            self.indent = self.indents.pop().unwrap_or(-1);
        }
    }

    fn fetch_stream_start(&mut self) {
        self.indent = -1;
        self.simple_keys.push(SimpleKey::default());
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        let encoding = self.buffer.source().encoding();
        self.tokens.enqueue(Token::new(
            TokenData::StreamStart { encoding },
            self.mark,
            self.mark,
        ));
    }

    fn fetch_stream_end(&mut self) -> Result<(), ScannerError> {
        // Force a new line.
        if self.mark.column != 0 {
            self.mark.column = 0;
            self.mark.line += 1;
        }
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.tokens
            .enqueue(Token::new(TokenData::StreamEnd, self.mark, self.mark));
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<(), ScannerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_directive()?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip();
        self.skip();
        self.skip();
        self.tokens.enqueue(Token::new(data, start_mark, self.mark));
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.increase_flow_level();
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        self.tokens.enqueue(Token::new(data, start_mark, self.mark));
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip();
        self.tokens.enqueue(Token::new(data, start_mark, self.mark));
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenData::FlowEntry, start_mark, self.mark));
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.error(
                    "",
                    self.mark,
                    "block sequence entries are not allowed in this context",
                );
            }
            self.roll_indent(
                self.mark.column as i64,
                None,
                TokenData::BlockSequenceStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenData::BlockEntry, start_mark, self.mark));
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return self.error("", self.mark, "mapping keys are not allowed in this context");
            }
            self.roll_indent(
                self.mark.column as i64,
                None,
                TokenData::BlockMappingStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let start_mark = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenData::Key, start_mark, self.mark));
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), ScannerError> {
        let simple_key = self.simple_keys.last().copied().unwrap_or_default();
        if simple_key.possible {
            let index = simple_key.token_number - self.tokens_parsed;
            tracing::trace!(
                token_number = simple_key.token_number,
                mark = %simple_key.mark,
                "inserting simple key"
            );
            self.tokens.insert(
                index,
                Token::new(TokenData::Key, simple_key.mark, simple_key.mark),
            );
            self.roll_indent(
                simple_key.mark.column as i64,
                Some(simple_key.token_number),
                TokenData::BlockMappingStart,
                simple_key.mark,
            );
            if let Some(slot) = self.simple_keys.last_mut() {
                slot.possible = false;
            }
            // Two simple keys cannot follow each other.
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return self.error(
                        "",
                        self.mark,
                        "mapping values are not allowed in this context",
                    );
                }
                self.roll_indent(
                    self.mark.column as i64,
                    None,
                    TokenData::BlockMappingStart,
                    self.mark,
                );
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        let start_mark = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenData::Value, start_mark, self.mark));
        Ok(())
    }

    fn fetch_anchor(&mut self, alias: bool) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_anchor(alias)?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_tag()?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let token = self.scan_block_scalar(literal)?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_flow_scalar(single)?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn fetch_plain_scalar(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_plain_scalar()?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn scan_to_next_token(&mut self) -> Result<(), ScannerError> {
        loop {
            self.cache(1)?;
            if self.mark.column == 0 && is_bom(self.ch()) {
                self.skip();
            }
            self.cache(1)?;
            // Tabs separate tokens only where they cannot be mistaken for
            // indentation.
            while self.check(' ')
                || (self.flow_level != 0 || !self.simple_key_allowed) && self.check('\t')
            {
                self.skip();
                self.cache(1)?;
            }
            if self.check('#') {
                while !is_breakz(self.ch()) {
                    self.skip();
                    self.cache(1)?;
                }
            }
            if !is_break(self.ch()) {
                break;
            }
            self.cache(2)?;
            self.skip_line();
            if self.flow_level == 0 {
                self.simple_key_allowed = true;
            }
        }
        Ok(())
    }

    fn scan_directive(&mut self) -> Result<Token, ScannerError> {
        let start_mark = self.mark;
        self.skip();
        let name = self.scan_directive_name(start_mark)?;
        let data = if name == "YAML" {
            let (major, minor) = self.scan_version_directive_value(start_mark)?;
            TokenData::VersionDirective { major, minor }
        } else if name == "TAG" {
            let (handle, prefix) = self.scan_tag_directive_value(start_mark)?;
            TokenData::TagDirective { handle, prefix }
        } else {
            return self.error(
                "while scanning a directive",
                start_mark,
                "found unknown directive name",
            );
        };
        let end_mark = self.mark;

        self.cache(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.cache(1)?;
        }
        if self.check('#') {
            while !is_breakz(self.ch()) {
                self.skip();
                self.cache(1)?;
            }
        }
        if !is_breakz(self.ch()) {
            return self.error(
                "while scanning a directive",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        if is_break(self.ch()) {
            self.cache(2)?;
            self.skip_line();
        }
        Ok(Token::new(data, start_mark, end_mark))
    }

    fn scan_directive_name(&mut self, start_mark: Mark) -> Result<String, ScannerError> {
        let mut string = String::new();
        self.cache(1)?;
        while is_alpha(self.ch()) {
            self.read_string(&mut string);
            self.cache(1)?;
        }
        if string.is_empty() {
            self.error(
                "while scanning a directive",
                start_mark,
                "could not find expected directive name",
            )
        } else if !is_blankz(self.ch()) {
            self.error(
                "while scanning a directive",
                start_mark,
                "found unexpected non-alphabetical character",
            )
        } else {
            Ok(string)
        }
    }

    fn scan_version_directive_value(
        &mut self,
        start_mark: Mark,
    ) -> Result<(i32, i32), ScannerError> {
        self.cache(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.cache(1)?;
        }
        let major = self.scan_version_directive_number(start_mark)?;
        if !self.check('.') {
            return self.error(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected digit or '.' character",
            );
        }
        self.skip();
        let minor = self.scan_version_directive_number(start_mark)?;
        Ok((major, minor))
    }

    fn scan_version_directive_number(&mut self, start_mark: Mark) -> Result<i32, ScannerError> {
        let mut value: i32 = 0;
        let mut length = 0;
        self.cache(1)?;
        while is_digit(self.ch()) {
            length += 1;
            if length > MAX_NUMBER_LENGTH {
                return self.error(
                    "while scanning a %YAML directive",
                    start_mark,
                    "found extremely long version number",
                );
            }
            value = value * 10 + as_digit(self.ch()) as i32;
            self.skip();
            self.cache(1)?;
        }
        if length == 0 {
            return self.error(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected version number",
            );
        }
        Ok(value)
    }

    fn scan_tag_directive_value(
        &mut self,
        start_mark: Mark,
    ) -> Result<(String, String), ScannerError> {
        self.cache(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.cache(1)?;
        }
        let handle = self.scan_tag_handle(true, start_mark)?;
        self.cache(1)?;
        if !is_blank(self.ch()) {
            return self.error(
                "while scanning a %TAG directive",
                start_mark,
                "did not find expected whitespace",
            );
        }
        while is_blank(self.ch()) {
            self.skip();
            self.cache(1)?;
        }
        let prefix = self.scan_tag_uri(true, true, None, start_mark)?;
        self.cache(1)?;
        if !is_blankz(self.ch()) {
            return self.error(
                "while scanning a %TAG directive",
                start_mark,
                "did not find expected whitespace or line break",
            );
        }
        Ok((handle, prefix))
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token, ScannerError> {
        let mut string = String::new();
        let start_mark = self.mark;
        self.skip();
        self.cache(1)?;
        while is_alpha(self.ch()) {
            self.read_string(&mut string);
            self.cache(1)?;
        }
        let end_mark = self.mark;
        let ch = self.ch();
        if string.is_empty()
            || !(is_blankz(ch) || matches!(ch, '?' | ':' | ',' | ']' | '}' | '%' | '@' | '`'))
        {
            return self.error(
                if alias {
                    "while scanning an alias"
                } else {
                    "while scanning an anchor"
                },
                start_mark,
                "did not find expected alphabetic or numeric character",
            );
        }
        let data = if alias {
            TokenData::Alias { value: string }
        } else {
            TokenData::Anchor { value: string }
        };
        Ok(Token::new(data, start_mark, end_mark))
    }

    fn scan_tag(&mut self) -> Result<Token, ScannerError> {
        let start_mark = self.mark;
        let mut handle;
        let mut suffix;

        self.cache(2)?;
        if self.ch_at(1) == '<' {
            // Verbatim tag: `!<uri>`.
            handle = String::new();
            self.skip();
            self.skip();
            suffix = self.scan_tag_uri(true, false, None, start_mark)?;
            if !self.check('>') {
                return self.error(
                    "while scanning a tag",
                    start_mark,
                    "did not find the expected '>'",
                );
            }
            self.skip();
        } else {
            handle = self.scan_tag_handle(false, start_mark)?;
            if handle.len() > 1 && handle.starts_with('!') && handle.ends_with('!') {
                suffix = self.scan_tag_uri(false, false, None, start_mark)?;
            } else {
                // `!suffix`, or the lone non-specific `!`.
                suffix = self.scan_tag_uri(false, false, Some(&handle), start_mark)?;
                handle = String::from("!");
                if suffix.is_empty() {
                    core::mem::swap(&mut handle, &mut suffix);
                }
            }
        }

        self.cache(1)?;
        if !is_blankz(self.ch()) && (self.flow_level == 0 || !self.check(',')) {
            return self.error(
                "while scanning a tag",
                start_mark,
                "did not find expected whitespace or line break",
            );
        }
        Ok(Token::new(
            TokenData::Tag { handle, suffix },
            start_mark,
            self.mark,
        ))
    }

    fn scan_tag_handle(&mut self, directive: bool, start_mark: Mark) -> Result<String, ScannerError> {
        let mut string = String::new();
        self.cache(1)?;
        if !self.check('!') {
            return self.error(
                if directive {
                    "while scanning a tag directive"
                } else {
                    "while scanning a tag"
                },
                start_mark,
                "did not find expected '!'",
            );
        }
        self.read_string(&mut string);
        self.cache(1)?;
        while is_alpha(self.ch()) {
            self.read_string(&mut string);
            self.cache(1)?;
        }
        if self.check('!') {
            self.read_string(&mut string);
        } else if directive && string != "!" {
            // A named handle in a %TAG directive must be closed by '!'.
            return self.error(
                "while parsing a tag directive",
                start_mark,
                "did not find expected '!'",
            );
        }
        Ok(string)
    }

    fn scan_tag_uri(
        &mut self,
        flow_indicators_allowed: bool,
        directive: bool,
        head: Option<&str>,
        start_mark: Mark,
    ) -> Result<String, ScannerError> {
        let head = head.unwrap_or("");
        let mut length = head.len();
        let mut string = String::new();
        // The head includes the leading '!', which is not part of the suffix.
        if length > 1 {
            string.push_str(&head[1..]);
        }
        self.cache(1)?;
        while is_uri_char(self.ch(), flow_indicators_allowed) {
            if self.check('%') {
                self.scan_uri_escapes(directive, start_mark, &mut string)?;
            } else {
                self.read_string(&mut string);
            }
            length += 1;
            self.cache(1)?;
        }
        if length == 0 {
            self.error(
                if directive {
                    "while parsing a %TAG directive"
                } else {
                    "while parsing a tag"
                },
                start_mark,
                "did not find expected tag URI",
            )
        } else {
            Ok(string)
        }
    }

    /// Decode a run of `%XX` escapes forming one UTF-8 encoded character.
    fn scan_uri_escapes(
        &mut self,
        directive: bool,
        start_mark: Mark,
        string: &mut String,
    ) -> Result<(), ScannerError> {
        let context = if directive {
            "while parsing a %TAG directive"
        } else {
            "while parsing a tag"
        };
        let mut octets = [0u8; 4];
        let mut width = 0;
        let mut length = 0;
        loop {
            self.cache(3)?;
            if !(self.check('%') && is_hex(self.ch_at(1)) && is_hex(self.ch_at(2))) {
                return self.error(context, start_mark, "did not find URI escaped octet");
            }
            let octet = ((as_hex(self.ch_at(1)) << 4) + as_hex(self.ch_at(2))) as u8;
            if width == 0 {
                width = if octet & 0x80 == 0 {
                    1
                } else if octet & 0xE0 == 0xC0 {
                    2
                } else if octet & 0xF0 == 0xE0 {
                    3
                } else if octet & 0xF8 == 0xF0 {
                    4
                } else {
                    0
                };
                if width == 0 {
                    return self.error(
                        context,
                        start_mark,
                        "found an incorrect leading UTF-8 octet",
                    );
                }
            } else if octet & 0xC0 != 0x80 {
                return self.error(
                    context,
                    start_mark,
                    "found an incorrect trailing UTF-8 octet",
                );
            }
            octets[length] = octet;
            length += 1;
            self.skip();
            self.skip();
            self.skip();
            if length == width {
                break;
            }
        }
        match core::str::from_utf8(&octets[..length]) {
            Ok(decoded) => {
                string.push_str(decoded);
                Ok(())
            }
            Err(_) => self.error(context, start_mark, "found an invalid UTF-8 sequence"),
        }
    }

    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token, ScannerError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        // -1 strips, 0 clips, +1 keeps the final line breaks.
        let mut chomping = 0;
        let mut increment: i64 = 0;
        let mut indent: i64 = 0;
        let mut leading_blank = false;
        let start_mark = self.mark;

        self.skip();
        self.cache(1)?;

        if self.check('+') || self.check('-') {
            chomping = if self.check('+') { 1 } else { -1 };
            self.skip();
            self.cache(1)?;
            if is_digit(self.ch()) {
                if self.check('0') {
                    return self.error(
                        "while scanning a block scalar",
                        start_mark,
                        "found an indentation indicator equal to 0",
                    );
                }
                increment = as_digit(self.ch()) as i64;
                self.skip();
            }
        } else if is_digit(self.ch()) {
            if self.check('0') {
                return self.error(
                    "while scanning a block scalar",
                    start_mark,
                    "found an indentation indicator equal to 0",
                );
            }
            increment = as_digit(self.ch()) as i64;
            self.skip();
            self.cache(1)?;
            if self.check('+') || self.check('-') {
                chomping = if self.check('+') { 1 } else { -1 };
                self.skip();
            }
        }

        self.cache(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.cache(1)?;
        }
        if self.check('#') {
            while !is_breakz(self.ch()) {
                self.skip();
                self.cache(1)?;
            }
        }
        if !is_breakz(self.ch()) {
            return self.error(
                "while scanning a block scalar",
                start_mark,
                "did not find expected comment or line break",
            );
        }
        if is_break(self.ch()) {
            self.cache(2)?;
            self.skip_line();
        }

        let mut end_mark = self.mark;
        if increment != 0 {
            indent = if self.indent >= 0 {
                self.indent + increment
            } else {
                increment
            };
        }
        self.scan_block_scalar_breaks(&mut indent, &mut trailing_breaks, start_mark, &mut end_mark)?;

        self.cache(1)?;
        while self.mark.column as i64 == indent && !is_z(self.ch()) {
            let trailing_blank = is_blank(self.ch());
            if !literal && leading_break.starts_with('\n') && !leading_blank && !trailing_blank {
                // Fold a single line break into a space.
                if trailing_breaks.is_empty() {
                    string.push(' ');
                }
                leading_break.clear();
            } else {
                string.push_str(&leading_break);
                leading_break.clear();
            }
            string.push_str(&trailing_breaks);
            trailing_breaks.clear();
            leading_blank = is_blank(self.ch());
            while !is_breakz(self.ch()) {
                self.read_string(&mut string);
                self.cache(1)?;
            }
            self.cache(2)?;
            self.read_line_string(&mut leading_break);
            self.scan_block_scalar_breaks(
                &mut indent,
                &mut trailing_breaks,
                start_mark,
                &mut end_mark,
            )?;
        }

        if chomping != -1 {
            string.push_str(&leading_break);
        }
        if chomping == 1 {
            string.push_str(&trailing_breaks);
        }

        let style = if literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };
        Ok(Token::new(
            TokenData::Scalar {
                value: string,
                style,
            },
            start_mark,
            end_mark,
        ))
    }

    /// Consume indentation and empty lines; determines the indentation of
    /// the block scalar if it is not known yet.
    fn scan_block_scalar_breaks(
        &mut self,
        indent: &mut i64,
        breaks: &mut String,
        start_mark: Mark,
        end_mark: &mut Mark,
    ) -> Result<(), ScannerError> {
        let mut max_indent: i64 = 0;
        *end_mark = self.mark;
        loop {
            self.cache(1)?;
            while (*indent == 0 || (self.mark.column as i64) < *indent) && is_space(self.ch()) {
                self.skip();
                self.cache(1)?;
            }
            if self.mark.column as i64 > max_indent {
                max_indent = self.mark.column as i64;
            }
            if (*indent == 0 || (self.mark.column as i64) < *indent) && is_tab(self.ch()) {
                return self.error(
                    "while scanning a block scalar",
                    start_mark,
                    "found a tab character where an indentation space is expected",
                );
            }
            if !is_break(self.ch()) {
                break;
            }
            self.cache(2)?;
            self.read_line_string(breaks);
            *end_mark = self.mark;
        }
        if *indent == 0 {
            *indent = max_indent.max(self.indent + 1).max(1);
        }
        Ok(())
    }

    fn scan_flow_scalar(&mut self, single: bool) -> Result<Token, ScannerError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let quote = if single { '\'' } else { '"' };

        let start_mark = self.mark;
        self.skip();
        loop {
            self.cache(4)?;
            if self.is_document_indicator() {
                return self.error(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected document indicator",
                );
            }
            if is_z(self.ch()) {
                return self.error(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected end of stream",
                );
            }

            self.cache(2)?;
            let mut leading_blanks = false;
            while !is_blankz(self.ch()) {
                if single && self.check('\'') && self.ch_at(1) == '\'' {
                    string.push('\'');
                    self.skip();
                    self.skip();
                } else if self.check(quote) {
                    break;
                } else if !single && self.check('\\') && is_break(self.ch_at(1)) {
                    // An escaped line break joins the lines without a space.
                    self.cache(3)?;
                    self.skip();
                    self.skip_line();
                    leading_blanks = true;
                    break;
                } else if !single && self.check('\\') {
                    self.scan_escape(start_mark, &mut string)?;
                } else {
                    self.read_string(&mut string);
                }
                self.cache(2)?;
            }

            self.cache(1)?;
            if self.check(quote) {
                break;
            }

            self.cache(1)?;
            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    if leading_blanks {
                        self.skip();
                    } else {
                        self.read_string(&mut whitespaces);
                    }
                } else {
                    self.cache(2)?;
                    if leading_blanks {
                        self.read_line_string(&mut trailing_breaks);
                    } else {
                        whitespaces.clear();
                        self.read_line_string(&mut leading_break);
                        leading_blanks = true;
                    }
                }
                self.cache(1)?;
            }

            if leading_blanks {
                join_folded_lines(&mut string, &mut leading_break, &mut trailing_breaks);
            } else {
                string.push_str(&whitespaces);
                whitespaces.clear();
            }
        }

        self.skip();
        let style = if single {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        Ok(Token::new(
            TokenData::Scalar {
                value: string,
                style,
            },
            start_mark,
            self.mark,
        ))
    }

    /// Decode one backslash escape of a double-quoted scalar.
    fn scan_escape(&mut self, start_mark: Mark, string: &mut String) -> Result<(), ScannerError> {
        let mut code_length = 0;
        match self.ch_at(1) {
            '0' => string.push('\0'),
            'a' => string.push('\x07'),
            'b' => string.push('\x08'),
            't' | '\t' => string.push('\t'),
            'n' => string.push('\n'),
            'v' => string.push('\x0B'),
            'f' => string.push('\x0C'),
            'r' => string.push('\r'),
            'e' => string.push('\x1B'),
            ' ' => string.push(' '),
            '"' => string.push('"'),
            '/' => string.push('/'),
            '\\' => string.push('\\'),
            // NEL
            'N' => string.push('\u{0085}'),
            // NBSP
            '_' => string.push('\u{00a0}'),
            // LS
            'L' => string.push('\u{2028}'),
            // PS
            'P' => string.push('\u{2029}'),
            'x' => code_length = 2,
            'u' => code_length = 4,
            'U' => code_length = 8,
            _ => {
                return self.error(
                    "while parsing a quoted scalar",
                    start_mark,
                    "found unknown escape character",
                );
            }
        }
        self.skip();
        self.skip();
        if code_length != 0 {
            self.cache(code_length)?;
            let mut value: u32 = 0;
            for k in 0..code_length {
                if !is_hex(self.ch_at(k)) {
                    return self.error(
                        "while parsing a quoted scalar",
                        start_mark,
                        "did not find expected hexdecimal number",
                    );
                }
                value = (value << 4) + as_hex(self.ch_at(k));
            }
            let Some(ch) = char::from_u32(value) else {
                return self.error(
                    "while parsing a quoted scalar",
                    start_mark,
                    "found invalid Unicode character escape code",
                );
            };
            string.push(ch);
            for _ in 0..code_length {
                self.skip();
            }
        }
        Ok(())
    }

    fn scan_plain_scalar(&mut self) -> Result<Token, ScannerError> {
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut leading_blanks = false;
        let indent = self.indent + 1;
        let start_mark = self.mark;
        let mut end_mark = self.mark;

        loop {
            self.cache(4)?;
            if self.is_document_indicator() || self.check('#') {
                break;
            }
            while !is_blankz(self.ch()) {
                let ch = self.ch();
                // In flow context, a ':' followed by a flow indicator ends
                // the scalar just like ': ' does.
                if ch == ':'
                    && (is_blankz(self.ch_at(1))
                        || self.flow_level != 0
                            && matches!(self.ch_at(1), ',' | '?' | '[' | ']' | '{' | '}'))
                {
                    break;
                }
                if self.flow_level != 0 && matches!(ch, ',' | '[' | ']' | '{' | '}') {
                    break;
                }
                if leading_blanks || !whitespaces.is_empty() {
                    if leading_blanks {
                        join_folded_lines(&mut string, &mut leading_break, &mut trailing_breaks);
                        leading_blanks = false;
                    } else {
                        string.push_str(&whitespaces);
                        whitespaces.clear();
                    }
                }
                self.read_string(&mut string);
                end_mark = self.mark;
                self.cache(2)?;
            }

            if !(is_blank(self.ch()) || is_break(self.ch())) {
                break;
            }

            self.cache(1)?;
            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    if leading_blanks && (self.mark.column as i64) < indent && is_tab(self.ch()) {
                        return self.error(
                            "while scanning a plain scalar",
                            start_mark,
                            "found a tab character that violates indentation",
                        );
                    } else if leading_blanks {
                        self.skip();
                    } else {
                        self.read_string(&mut whitespaces);
                    }
                } else {
                    self.cache(2)?;
                    if leading_blanks {
                        self.read_line_string(&mut trailing_breaks);
                    } else {
                        whitespaces.clear();
                        self.read_line_string(&mut leading_break);
                        leading_blanks = true;
                    }
                }
                self.cache(1)?;
            }

            if self.flow_level == 0 && (self.mark.column as i64) < indent {
                break;
            }
        }

        if leading_blanks {
            self.simple_key_allowed = true;
        }
        Ok(Token::new(
            TokenData::Scalar {
                value: string,
                style: ScalarStyle::Plain,
            },
            start_mark,
            end_mark,
        ))
    }
}

/// Append the line breaks collected between two lines of a flow or plain
/// scalar: a single break folds into a space, further breaks are kept.
fn join_folded_lines(string: &mut String, leading_break: &mut String, trailing_breaks: &mut String) {
    if leading_break.starts_with('\n') {
        if trailing_breaks.is_empty() {
            string.push(' ');
        } else {
            string.push_str(trailing_breaks);
            trailing_breaks.clear();
        }
        leading_break.clear();
    } else {
        string.push_str(leading_break);
        string.push_str(trailing_breaks);
        leading_break.clear();
        trailing_breaks.clear();
    }
}

impl<'r> Iterator for Scanner<'r> {
    type Item = Result<Token, ScannerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stream_end_produced || self.failed {
            None
        } else {
            Some(self.scan())
        }
    }
}

impl<'r> core::iter::FusedIterator for Scanner<'r> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan_all(input: &str) -> Result<Vec<TokenData>, ScannerError> {
        let mut bytes = input.as_bytes();
        let mut scanner = Scanner::new();
        scanner.set_input_string(&mut bytes);
        scanner
            .map(|token| token.map(|token| token.data))
            .collect()
    }

    fn scalar(value: &str, style: ScalarStyle) -> TokenData {
        TokenData::Scalar {
            value: String::from(value),
            style,
        }
    }

    fn plain(value: &str) -> TokenData {
        scalar(value, ScalarStyle::Plain)
    }

    fn first_scalar(input: &str) -> String {
        scan_all(input)
            .unwrap()
            .into_iter()
            .find_map(|data| match data {
                TokenData::Scalar { value, .. } => Some(value),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn simple_key_is_inserted_before_its_scalar() {
        assert_eq!(
            scan_all("a: 1").unwrap(),
            vec![
                TokenData::StreamStart {
                    encoding: Encoding::Utf8
                },
                TokenData::BlockMappingStart,
                TokenData::Key,
                plain("a"),
                TokenData::Value,
                plain("1"),
                TokenData::BlockEnd,
                TokenData::StreamEnd,
            ]
        );
    }

    #[test]
    fn flow_collections() {
        assert_eq!(
            &scan_all("{a: [b, c], d: e}").unwrap()[1..],
            &[
                TokenData::FlowMappingStart,
                TokenData::Key,
                plain("a"),
                TokenData::Value,
                TokenData::FlowSequenceStart,
                plain("b"),
                TokenData::FlowEntry,
                plain("c"),
                TokenData::FlowSequenceEnd,
                TokenData::FlowEntry,
                TokenData::Key,
                plain("d"),
                TokenData::Value,
                plain("e"),
                TokenData::FlowMappingEnd,
                TokenData::StreamEnd,
            ]
        );
    }

    #[test]
    fn colon_before_flow_indicator_ends_plain_scalar() {
        assert_eq!(
            &scan_all("[a:]").unwrap()[1..],
            &[
                TokenData::FlowSequenceStart,
                TokenData::Key,
                plain("a"),
                TokenData::Value,
                TokenData::FlowSequenceEnd,
                TokenData::StreamEnd,
            ]
        );
        assert_eq!(first_scalar("[a:b]"), "a:b");
    }

    #[test]
    fn nested_block_collections_are_closed() {
        let tokens = scan_all("a:\n  - b\n  - c\nd: e\n").unwrap();
        let opened = tokens
            .iter()
            .filter(|data| {
                matches!(
                    data,
                    TokenData::BlockMappingStart | TokenData::BlockSequenceStart
                )
            })
            .count();
        let closed = tokens
            .iter()
            .filter(|data| matches!(data, TokenData::BlockEnd))
            .count();
        assert_eq!(opened, 2);
        assert_eq!(closed, 2);
    }

    #[test]
    fn indentation_stack_is_empty_at_stream_end() {
        let mut bytes = "a:\n  b:\n    - c\n".as_bytes();
        let mut scanner = Scanner::new();
        scanner.set_input_string(&mut bytes);
        while let Some(token) = scanner.next() {
            token.unwrap();
        }
        assert!(scanner.indents.is_empty());
        assert_eq!(scanner.indent, -1);
    }

    #[test]
    fn second_value_indicator_is_rejected() {
        let err = scan_all("key: : value").unwrap_err();
        assert_eq!(err.problem_mark(), Some(Mark::new(5, 0, 5)));
        assert!(matches!(
            err,
            ScannerError::Problem {
                problem: "mapping values are not allowed in this context",
                ..
            }
        ));
    }

    #[test]
    fn overlong_simple_key_is_rejected() {
        let input = format!("{}: v", "k".repeat(1100));
        let err = scan_all(&input).unwrap_err();
        assert_eq!(err.problem_mark(), Some(Mark::new(1100, 0, 1100)));
    }

    #[test]
    fn required_key_without_colon() {
        let err = scan_all("a: 1\nb\nc: 2").unwrap_err();
        assert!(matches!(
            err,
            ScannerError::Problem {
                problem: "could not find expected ':'",
                ..
            }
        ));
    }

    #[test]
    fn scanner_halts_after_error() {
        let mut bytes = "a: `".as_bytes();
        let mut scanner = Scanner::new();
        scanner.set_input_string(&mut bytes);
        let results: Vec<_> = scanner.by_ref().collect();
        assert!(results.last().unwrap().is_err());
        assert!(scanner.next().is_none());
        assert!(matches!(Scanner::scan(&mut scanner), Err(ScannerError::Halted)));
    }

    #[test]
    fn single_quoted() {
        assert_eq!(first_scalar("'it''s'"), "it's");
        assert_eq!(first_scalar("'a\n  b\n\n  c'"), "a b\nc");
    }

    #[test]
    fn double_quoted_escapes() {
        assert_eq!(
            first_scalar(r#""a\tb\u00e9\x41\U0001F600\N\_""#),
            "a\tb\u{e9}A\u{1F600}\u{85}\u{a0}"
        );
        assert_eq!(first_scalar("\"one \\\n  two\""), "one two");
        assert_eq!(first_scalar("\"fold\n  this\""), "fold this");
    }

    #[test]
    fn invalid_escapes() {
        for input in [r#""\ud800""#, r#""\U00110000""#, r#""\q""#, r#""\x4""#] {
            assert!(scan_all(input).is_err(), "{input}");
        }
    }

    #[test]
    fn unterminated_quoted_scalar() {
        let err = scan_all("'abc").unwrap_err();
        assert!(matches!(
            err,
            ScannerError::Problem {
                problem: "found unexpected end of stream",
                ..
            }
        ));
    }

    #[test]
    fn block_scalars() {
        assert_eq!(first_scalar("|\n  a\n  b\n\n"), "a\nb\n");
        assert_eq!(first_scalar("|-\n  a\n  b\n\n"), "a\nb");
        assert_eq!(first_scalar("|+\n  a\n\n"), "a\n\n");
        assert_eq!(first_scalar(">\n a\n b\n\n c\n"), "a b\nc\n");
        assert_eq!(first_scalar(">\n a\n   indented\n b\n"), "a\n  indented\nb\n");
        assert_eq!(first_scalar("|2\n   a\n  b\n"), " a\nb\n");
    }

    #[test]
    fn block_scalar_indicator_errors() {
        assert!(scan_all("|0\n a\n").is_err());
        assert!(scan_all("|\n\ta\n").is_err());
    }

    #[test]
    fn plain_scalar_folding() {
        assert_eq!(first_scalar("a\n  b\n\n  c"), "a b\nc");
        assert_eq!(first_scalar("a b # comment"), "a b");
        assert_eq!(first_scalar("a#b"), "a#b");
    }

    #[test]
    fn line_separator_is_preserved() {
        assert_eq!(first_scalar("'a\u{2028}b'"), "a\u{2028}b");
    }

    #[test]
    fn anchors_and_aliases() {
        assert_eq!(
            &scan_all("- &x a\n- *x\n").unwrap()[2..],
            &[
                TokenData::BlockEntry,
                TokenData::Anchor {
                    value: String::from("x")
                },
                plain("a"),
                TokenData::BlockEntry,
                TokenData::Alias {
                    value: String::from("x")
                },
                TokenData::BlockEnd,
                TokenData::StreamEnd,
            ]
        );
        assert!(scan_all("&").is_err());
    }

    fn tags(input: &str) -> Vec<(String, String)> {
        scan_all(input)
            .unwrap()
            .into_iter()
            .filter_map(|data| match data {
                TokenData::Tag { handle, suffix } => Some((handle, suffix)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tag_forms() {
        let pair = |handle: &str, suffix: &str| (String::from(handle), String::from(suffix));
        assert_eq!(tags("!<tag:x,2000:y> a"), vec![pair("", "tag:x,2000:y")]);
        assert_eq!(tags("!!str a"), vec![pair("!!", "str")]);
        assert_eq!(tags("!e!foo a"), vec![pair("!e!", "foo")]);
        assert_eq!(tags("!local a"), vec![pair("!", "local")]);
        assert_eq!(tags("! a"), vec![pair("", "!")]);
        assert_eq!(tags("[!!str , a]"), vec![pair("!!", "str")]);
        assert_eq!(tags("[!!str, a]"), vec![pair("!!", "str")]);
    }

    #[test]
    fn tag_uri_escapes_decode_utf8() {
        let pair = |handle: &str, suffix: &str| (String::from(handle), String::from(suffix));
        assert_eq!(tags("!e%C3%A9 a"), vec![pair("!", "e\u{e9}")]);
        assert_eq!(tags("!%21 a"), vec![pair("!", "!")]);
        assert!(scan_all("!%FF a").is_err());
        assert!(scan_all("!%C3%41 a").is_err());
        assert!(scan_all("!%ED%A0%80 a").is_err());
    }

    #[test]
    fn directives() {
        assert_eq!(
            &scan_all("%YAML 1.2\n%TAG !e! tag:example.com,2000:\n--- a\n...\n").unwrap()[1..],
            &[
                TokenData::VersionDirective { major: 1, minor: 2 },
                TokenData::TagDirective {
                    handle: String::from("!e!"),
                    prefix: String::from("tag:example.com,2000:"),
                },
                TokenData::DocumentStart,
                plain("a"),
                TokenData::DocumentEnd,
                TokenData::StreamEnd,
            ]
        );
    }

    #[test]
    fn directive_errors() {
        assert!(scan_all("%FOO bar\n---").is_err());
        assert!(scan_all("%YAML 1234567890.1\n---").is_err());
        assert!(scan_all("%YAML 1\n---").is_err());
        assert!(scan_all("%TAG !e tag:x\n---").is_err());
    }

    #[test]
    fn crlf_line_breaks() {
        let mut bytes = "a: 1\r\nb: 2\r\n".as_bytes();
        let mut scanner = Scanner::new();
        scanner.set_input_string(&mut bytes);
        let tokens: Vec<_> = scanner.collect::<Result<_, _>>().unwrap();
        let b = tokens
            .iter()
            .find(|token| token.data == plain("b"))
            .unwrap();
        assert_eq!(b.start_mark, Mark::new(6, 1, 0));
    }

    #[test]
    fn tabs_cannot_indent_block_content() {
        assert!(scan_all("a:\n\t- b").is_err());
        assert_eq!(first_scalar("[\ta]"), "a");
    }
}
