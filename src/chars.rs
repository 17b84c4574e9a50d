//! Character classes used by the scanner.
//!
//! The lookahead buffer reports the end of input as `'\0'`, which the reader
//! never lets through as a real character, so the `*z` predicates treat it as
//! the end of the stream.

pub(crate) fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

pub(crate) fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub(crate) fn as_digit(ch: char) -> u32 {
    ch as u32 - '0' as u32
}

pub(crate) fn is_hex(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

pub(crate) fn as_hex(ch: char) -> u32 {
    match ch {
        'A'..='F' => ch as u32 - 'A' as u32 + 10,
        'a'..='f' => ch as u32 - 'a' as u32 + 10,
        _ => ch as u32 - '0' as u32,
    }
}

pub(crate) fn is_bom(ch: char) -> bool {
    ch == '\u{feff}'
}

pub(crate) fn is_z(ch: char) -> bool {
    ch == '\0'
}

pub(crate) fn is_space(ch: char) -> bool {
    ch == ' '
}

pub(crate) fn is_tab(ch: char) -> bool {
    ch == '\t'
}

pub(crate) fn is_blank(ch: char) -> bool {
    is_space(ch) || is_tab(ch)
}

pub(crate) fn is_break(ch: char) -> bool {
    matches!(ch, '\r' | '\n' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

pub(crate) fn is_breakz(ch: char) -> bool {
    is_break(ch) || is_z(ch)
}

pub(crate) fn is_blankz(ch: char) -> bool {
    is_blank(ch) || is_breakz(ch)
}

/// Characters that may appear unescaped in a tag URI.
pub(crate) fn is_uri_char(ch: char, flow_indicators_allowed: bool) -> bool {
    is_alpha(ch)
        || matches!(
            ch,
            ';' | '/'
                | '?'
                | ':'
                | '@'
                | '&'
                | '='
                | '+'
                | '$'
                | '.'
                | '%'
                | '!'
                | '~'
                | '*'
                | '\''
                | '('
                | ')'
        )
        || flow_indicators_allowed && matches!(ch, ',' | '[' | ']')
}

/// The YAML printable character set; anything else is rejected by the
/// reader.
pub(crate) fn is_printable(ch: char) -> bool {
    matches!(
        ch,
        '\x09'
            | '\x0A'
            | '\x0D'
            | '\x20'..='\x7E'
            | '\u{0085}'
            | '\u{00A0}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_digits() {
        assert_eq!(as_hex('0'), 0);
        assert_eq!(as_hex('9'), 9);
        assert_eq!(as_hex('a'), 10);
        assert_eq!(as_hex('F'), 15);
        assert!(!is_hex('g'));
    }

    #[test]
    fn sentinel_is_break_and_blank() {
        assert!(is_breakz('\0'));
        assert!(is_blankz('\0'));
        assert!(!is_break('\0'));
        assert!(is_blankz('\u{2028}'));
    }

    #[test]
    fn printable_excludes_controls() {
        assert!(is_printable('a'));
        assert!(is_printable('\u{feff}'));
        assert!(!is_printable('\0'));
        assert!(!is_printable('\x07'));
        assert!(!is_printable('\u{fffe}'));
    }
}
