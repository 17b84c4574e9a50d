use crate::Mark;

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("invalid byte order mark")]
    InvalidBom,
    #[error("invalid UTF-8 byte {value:#04x} at offset {offset}")]
    InvalidUtf8 { value: u8, offset: usize },
    #[error("invalid UTF-16 unpaired surrogate {value:#06x} at offset {offset}")]
    InvalidUtf16 { value: u16, offset: usize },
    #[error("{problem} (value {value:#x} at offset {offset})")]
    Problem {
        problem: &'static str,
        offset: usize,
        value: u32,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("{problem_mark}: {problem} {context} ({context_mark})")]
    Problem {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    },
    #[error(transparent)]
    Reader(#[from] ReaderError),
    #[error("scanning cannot continue after an error")]
    Halted,
}

impl ScannerError {
    /// The position of the character that triggered the error, if known.
    pub fn problem_mark(&self) -> Option<Mark> {
        match self {
            ScannerError::Problem { problem_mark, .. } => Some(*problem_mark),
            _ => None,
        }
    }
}

/// Everything that can stop a [`Parser`](crate::Parser).
///
/// Lexical errors (bad characters, escapes, indentation, a `:` or `-` where
/// none may appear, a simple key missing its `:`) arrive wrapped in
/// [`ParserError::Scanner`]. Structural errors, where well-formed tokens come
/// in an order the grammar does not allow, are [`ParserError::Problem`] and
/// [`ParserError::ProblemWithContext`]. Schema errors from
/// [`Parser::resolve`](crate::Parser::resolve) are [`ParserError::Schema`].
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("no more tokens")]
    UnexpectedEof,
    #[error("{mark}: {problem}")]
    Problem { problem: &'static str, mark: Mark },
    #[error("{mark}: {problem} {context} ({context_mark})")]
    ProblemWithContext {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    },
    #[error(transparent)]
    Scanner(#[from] ScannerError),
    #[error("{mark}: {source}")]
    Schema {
        mark: Mark,
        #[source]
        source: SchemaError,
    },
    #[error("parsing cannot continue after an error")]
    Halted,
}

impl ParserError {
    /// The position of the token or character that triggered the error, if
    /// known.
    pub fn problem_mark(&self) -> Option<Mark> {
        match self {
            ParserError::Problem { mark, .. }
            | ParserError::ProblemWithContext { mark, .. }
            | ParserError::Schema { mark, .. } => Some(*mark),
            ParserError::Scanner(err) => err.problem_mark(),
            _ => None,
        }
    }
}

/// Scalar text that could not be converted for the demanded tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{value:?} is not a valid {tag} value")]
    InvalidValue { tag: String, value: String },
    #[error("integer overflow while parsing {value:?}")]
    Overflow { value: String },
    #[error("tag {tag} is not supported by the {schema} schema")]
    UnsupportedTag { tag: String, schema: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dequeue from an empty queue")]
pub struct EmptyQueueError;
