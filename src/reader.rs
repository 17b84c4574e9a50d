use std::io::BufRead;

use alloc::collections::VecDeque;

use crate::chars::is_printable;
use crate::{Encoding, ReaderError};

/// A sequential source of characters.
///
/// The source is the only place characters come from; the
/// [`LookAheadBuffer`](crate::LookAheadBuffer) decides how many of them to
/// pull at once.
pub trait CharSource {
    /// Read the next character, or `None` at the end of the stream.
    fn read_char(&mut self) -> Result<Option<char>, ReaderError>;

    /// The encoding the characters were decoded from.
    fn encoding(&self) -> Encoding {
        Encoding::Utf8
    }
}

/// A character source over an already decoded string.
pub struct StrSource<'a> {
    chars: core::str::Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        StrSource {
            chars: input.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn read_char(&mut self) -> Result<Option<char>, ReaderError> {
        Ok(self.chars.next())
    }
}

/// Decodes a byte stream into characters.
///
/// The encoding is detected from the byte order mark unless it has been set
/// explicitly. Only characters from the YAML printable set are let through.
pub struct Reader<'r> {
    input: Option<&'r mut dyn BufRead>,
    encoding: Encoding,
    decoded: VecDeque<char>,
    /// The byte offset of the next undecoded byte.
    offset: usize,
    eof: bool,
}

impl<'r> Default for Reader<'r> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Reader<'r> {
    pub fn new() -> Reader<'r> {
        Reader {
            input: None,
            encoding: Encoding::Any,
            decoded: VecDeque::with_capacity(INPUT_BUFFER_SIZE),
            offset: 0,
            eof: false,
        }
    }

    /// Set the byte input.
    pub fn set_input(&mut self, input: &'r mut dyn BufRead) {
        assert!(self.input.is_none(), "input has already been set");
        self.input = Some(input);
    }

    /// Set the source encoding, bypassing byte order mark detection.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        assert!(
            self.encoding == Encoding::Any,
            "encoding has already been determined"
        );
        self.encoding = encoding;
    }

    /// The byte offset of the next undecoded byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn update_buffer(&mut self) -> Result<(), ReaderError> {
        let reader = self.input.as_deref_mut().expect("no read handler");
        if self.encoding == Encoding::Any {
            if let Some(encoding) = determine_encoding(reader, &mut self.offset)? {
                self.encoding = encoding;
            } else {
                self.encoding = Encoding::Utf8;
                self.eof = true;
                return Ok(());
            }
        }

        while self.decoded.is_empty() && !self.eof {
            let not_eof = match self.encoding {
                Encoding::Any => unreachable!(),
                Encoding::Utf8 => read_utf8_buffered(reader, &mut self.decoded, &mut self.offset)?,
                Encoding::Utf16Le => {
                    read_utf16_buffered::<false>(reader, &mut self.decoded, &mut self.offset)?
                }
                Encoding::Utf16Be => {
                    read_utf16_buffered::<true>(reader, &mut self.decoded, &mut self.offset)?
                }
            };
            if !not_eof {
                self.eof = true;
            }
        }

        if self.offset >= usize::MAX / 2 {
            return Err(ReaderError::Problem {
                problem: "input is too long",
                offset: self.offset,
                value: 0,
            });
        }
        Ok(())
    }
}

impl CharSource for Reader<'_> {
    fn read_char(&mut self) -> Result<Option<char>, ReaderError> {
        if self.decoded.is_empty() && !self.eof {
            self.update_buffer()?;
        }
        Ok(self.decoded.pop_front())
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }
}

const INPUT_BUFFER_SIZE: usize = 16384;

const BOM_UTF8: [u8; 3] = [0xef, 0xbb, 0xbf];
const BOM_UTF16LE: [u8; 2] = [0xff, 0xfe];
const BOM_UTF16BE: [u8; 2] = [0xfe, 0xff];

fn determine_encoding(
    reader: &mut dyn BufRead,
    offset: &mut usize,
) -> Result<Option<Encoding>, ReaderError> {
    let initial_bytes = reader.fill_buf()?;
    if initial_bytes.is_empty() {
        return Ok(None);
    }

    // Without a byte order mark the stream is UTF-8 and nothing is consumed.
    let (encoding, bom_len) = if initial_bytes.starts_with(&BOM_UTF8) {
        (Encoding::Utf8, BOM_UTF8.len())
    } else if initial_bytes.starts_with(&BOM_UTF16LE) {
        (Encoding::Utf16Le, BOM_UTF16LE.len())
    } else if initial_bytes.starts_with(&BOM_UTF16BE) {
        (Encoding::Utf16Be, BOM_UTF16BE.len())
    } else if matches!(initial_bytes[0], 0xfe | 0xff) {
        // Neither byte can start a UTF-8 sequence.
        return Err(ReaderError::InvalidBom);
    } else {
        (Encoding::Utf8, 0)
    };
    reader.consume(bom_len);
    *offset += bom_len;
    Ok(Some(encoding))
}

fn read_utf8_buffered(
    reader: &mut dyn BufRead,
    out: &mut VecDeque<char>,
    offset: &mut usize,
) -> Result<bool, ReaderError> {
    let available = loop {
        match reader.fill_buf() {
            Ok([]) => return Ok(false),
            Ok(available) => break available,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    };

    match core::str::from_utf8(available) {
        Ok(valid) => {
            let used = valid.len();
            // The entire contents of the input buffer was valid UTF-8.
            for ch in valid.chars() {
                push_char(out, ch, *offset)?;
                *offset += ch.len_utf8();
            }
            reader.consume(used);
            Ok(true)
        }
        Err(err) => {
            let valid_bytes = err.valid_up_to();

            // If some of the buffer contents were valid, append that to the
            // output.
            if let Ok(valid) = core::str::from_utf8(&available[..valid_bytes]) {
                for ch in valid.chars() {
                    push_char(out, ch, *offset)?;
                    *offset += ch.len_utf8();
                }
            }

            if err.error_len().is_some() {
                return Err(ReaderError::InvalidUtf8 {
                    value: available[valid_bytes],
                    offset: *offset,
                });
            }

            if valid_bytes != 0 {
                // The tail end of the buffer was an incomplete sequence.
                // Leave it in the buffer for the next call.
                reader.consume(valid_bytes);
            } else {
                // The beginning of the buffer was an incomplete UTF-8
                // sequence. Read the whole character unbuffered; this
                // returns `UnexpectedEof` if the sequence cannot be
                // completed.
                let initial = available[0];
                read_utf8_char_unbuffered(reader, out, initial, offset)?;
            }
            Ok(true)
        }
    }
}

fn read_utf8_char_unbuffered(
    reader: &mut dyn BufRead,
    out: &mut VecDeque<char>,
    initial: u8,
    offset: &mut usize,
) -> Result<(), ReaderError> {
    let width = utf8_char_width(initial);
    if width == 0 {
        return Err(ReaderError::InvalidUtf8 {
            value: initial,
            offset: *offset,
        });
    }
    let mut buffer = [0; 4];
    reader.read_exact(&mut buffer[..width])?;
    match core::str::from_utf8(&buffer[..width])
        .ok()
        .and_then(|valid| valid.chars().next())
    {
        Some(ch) => {
            push_char(out, ch, *offset)?;
            *offset += width;
            Ok(())
        }
        // Since we read the exact character width, the only possible error
        // here is invalid Unicode.
        None => Err(ReaderError::InvalidUtf8 {
            value: buffer[0],
            offset: *offset,
        }),
    }
}

fn read_utf16_buffered<const BIG_ENDIAN: bool>(
    reader: &mut dyn BufRead,
    out: &mut VecDeque<char>,
    offset: &mut usize,
) -> Result<bool, ReaderError> {
    let available = loop {
        match reader.fill_buf() {
            Ok([]) => return Ok(false),
            Ok(available) => break available,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    };

    let units = available.chunks_exact(2).map(|chunk| {
        let pair = [chunk[0], chunk[1]];
        if BIG_ENDIAN {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });

    let mut used = 0;
    for ch in core::char::decode_utf16(units) {
        match ch {
            Ok(ch) => {
                push_char(out, ch, *offset)?;
                let width = ch.len_utf16() * 2;
                *offset += width;
                used += width;
            }
            // An unpaired surrogate may be a corrupt stream, or the buffer
            // may end in the middle of a surrogate pair. Consume the valid
            // part first and let the unbuffered path sort out the rest on
            // the next call.
            Err(_) => break,
        }
    }

    if used != 0 {
        reader.consume(used);
    } else {
        read_utf16_char_unbuffered::<BIG_ENDIAN>(reader, out, offset)?;
    }
    Ok(true)
}

fn read_utf16_char_unbuffered<const BIG_ENDIAN: bool>(
    reader: &mut dyn BufRead,
    out: &mut VecDeque<char>,
    offset: &mut usize,
) -> Result<(), ReaderError> {
    let read_unit = |reader: &mut dyn BufRead| -> Result<u16, ReaderError> {
        let mut buffer = [0; 2];
        reader.read_exact(&mut buffer)?;
        Ok(if BIG_ENDIAN {
            u16::from_be_bytes(buffer)
        } else {
            u16::from_le_bytes(buffer)
        })
    };

    let first = read_unit(reader)?;
    let units = if is_utf16_surrogate(first) {
        vec![first, read_unit(reader)?]
    } else {
        vec![first]
    };

    match core::char::decode_utf16(units.iter().copied()).next() {
        Some(Ok(ch)) => {
            push_char(out, ch, *offset)?;
            *offset += units.len() * 2;
            Ok(())
        }
        Some(Err(err)) => Err(ReaderError::InvalidUtf16 {
            value: err.unpaired_surrogate(),
            offset: *offset,
        }),
        None => unreachable!(),
    }
}

fn utf8_char_width(initial: u8) -> usize {
    if initial & 0x80 == 0 {
        1
    } else if initial & 0xE0 == 0xC0 {
        2
    } else if initial & 0xF0 == 0xE0 {
        3
    } else if initial & 0xF8 == 0xF0 {
        4
    } else {
        0
    }
}

fn is_utf16_surrogate(value: u16) -> bool {
    matches!(value, 0xD800..=0xDFFF)
}

fn push_char(out: &mut VecDeque<char>, ch: char, offset: usize) -> Result<(), ReaderError> {
    if !is_printable(ch) {
        return Err(ReaderError::Problem {
            problem: "control characters are not allowed",
            offset,
            value: ch as u32,
        });
    }
    out.push_back(ch);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(mut bytes: &[u8]) -> Result<(String, Encoding), ReaderError> {
        let mut reader = Reader::new();
        reader.set_input(&mut bytes);
        let mut string = String::new();
        while let Some(ch) = reader.read_char()? {
            string.push(ch);
        }
        Ok((string, reader.encoding()))
    }

    #[test]
    fn utf8_without_bom() {
        let (string, encoding) = decode("key: välue ☺".as_bytes()).unwrap();
        assert_eq!(string, "key: välue ☺");
        assert_eq!(encoding, Encoding::Utf8);
    }

    #[test]
    fn utf8_bom_is_consumed() {
        let (string, encoding) = decode(b"\xef\xbb\xbfa: 1").unwrap();
        assert_eq!(string, "a: 1");
        assert_eq!(encoding, Encoding::Utf8);
    }

    #[test]
    fn leading_0xef_without_bom_is_utf8() {
        let (string, encoding) = decode("\u{FF4B}: 1\n".as_bytes()).unwrap();
        assert_eq!(string, "\u{FF4B}: 1\n");
        assert_eq!(encoding, Encoding::Utf8);

        let (string, _) = decode("\u{F000}".as_bytes()).unwrap();
        assert_eq!(string, "\u{F000}");
    }

    #[test]
    fn truncated_utf16_bom() {
        assert!(matches!(decode(b"\xfe"), Err(ReaderError::InvalidBom)));
        assert!(matches!(decode(b"\xffa"), Err(ReaderError::InvalidBom)));
    }

    #[test]
    fn utf16_both_endians() {
        let mut le = vec![0xff, 0xfe];
        let mut be = vec![0xfe, 0xff];
        for unit in "a: \u{1F600}".encode_utf16() {
            le.extend_from_slice(&unit.to_le_bytes());
            be.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(
            decode(&le).unwrap(),
            (String::from("a: \u{1F600}"), Encoding::Utf16Le)
        );
        assert_eq!(
            decode(&be).unwrap(),
            (String::from("a: \u{1F600}"), Encoding::Utf16Be)
        );
    }

    #[test]
    fn empty_input_defaults_to_utf8() {
        assert_eq!(decode(b"").unwrap(), (String::new(), Encoding::Utf8));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let err = decode(b"ab\xffcd").unwrap_err();
        assert!(matches!(
            err,
            ReaderError::InvalidUtf8 {
                value: 0xff,
                offset: 2
            }
        ));
    }

    #[test]
    fn control_characters_are_rejected() {
        let err = decode(b"a\x07b").unwrap_err();
        assert!(matches!(err, ReaderError::Problem { value: 7, .. }));
    }

    #[test]
    fn str_source() {
        let mut source = StrSource::new("ab");
        assert_eq!(source.read_char().unwrap(), Some('a'));
        assert_eq!(source.read_char().unwrap(), Some('b'));
        assert_eq!(source.read_char().unwrap(), None);
    }
}
