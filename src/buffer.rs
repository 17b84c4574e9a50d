use crate::reader::CharSource;
use crate::ReaderError;

/// A bounded ring of characters read ahead from a [`CharSource`].
///
/// Characters are pulled from the source lazily, only as far as a caller
/// asks to look. Once the source is exhausted, every position past the end
/// reads as `'\0'`.
pub struct LookAheadBuffer<S> {
    source: S,
    ring: Box<[char]>,
    head: usize,
    count: usize,
    end_of_input: bool,
}

impl<S: CharSource> LookAheadBuffer<S> {
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn new(source: S) -> Self {
        Self::with_capacity(source, Self::DEFAULT_CAPACITY)
    }

    /// Create a buffer that can hold `capacity` characters of lookahead.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is less than 4, the longest lookahead the
    /// scanner needs.
    pub fn with_capacity(source: S, capacity: usize) -> Self {
        assert!(capacity >= 4, "lookahead capacity must be at least 4");
        LookAheadBuffer {
            source,
            ring: vec!['\0'; capacity].into_boxed_slice(),
            head: 0,
            count: 0,
            end_of_input: false,
        }
    }

    /// Look at the character `offset` positions ahead, reading from the
    /// source if it is not buffered yet.
    pub fn peek(&mut self, offset: usize) -> Result<char, ReaderError> {
        self.cache(offset + 1)?;
        Ok(self.get(offset))
    }

    /// Ensure at least `length` characters are buffered, or that the source
    /// is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if `length` exceeds the capacity.
    pub fn cache(&mut self, length: usize) -> Result<(), ReaderError> {
        assert!(
            length <= self.ring.len(),
            "lookahead of {length} exceeds the buffer capacity"
        );
        while self.count < length && !self.end_of_input {
            match self.source.read_char()? {
                Some(ch) => {
                    let tail = (self.head + self.count) % self.ring.len();
                    self.ring[tail] = ch;
                    self.count += 1;
                }
                None => self.end_of_input = true,
            }
        }
        Ok(())
    }

    /// The buffered character at `offset`, or `'\0'` if it has not been
    /// read (or does not exist).
    pub fn get(&self, offset: usize) -> char {
        if offset < self.count {
            self.ring[(self.head + offset) % self.ring.len()]
        } else {
            '\0'
        }
    }

    /// Drop `n` buffered characters from the front.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `n` characters are buffered.
    pub fn skip(&mut self, n: usize) {
        assert!(n <= self.count, "cannot skip unbuffered characters");
        self.head = (self.head + n) % self.ring.len();
        self.count -= n;
    }

    /// The number of characters currently buffered.
    pub fn buffered(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    /// True once a read from the source has reached its end.
    pub fn end_of_input(&self) -> bool {
        self.end_of_input
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::StrSource;

    #[test]
    fn lookahead_pads_with_nul() {
        let mut buffer = LookAheadBuffer::with_capacity(StrSource::new("abc"), 4);
        assert_eq!(buffer.peek(0).unwrap(), 'a');
        assert_eq!(buffer.buffered(), 1);
        assert!(!buffer.end_of_input());
        assert_eq!(buffer.peek(2).unwrap(), 'c');
        assert_eq!(buffer.peek(3).unwrap(), '\0');
        assert!(buffer.end_of_input());
        buffer.skip(3);
        assert_eq!(buffer.buffered(), 0);
        assert_eq!(buffer.peek(0).unwrap(), '\0');
    }

    #[test]
    fn ring_wraps_around() {
        let mut buffer = LookAheadBuffer::with_capacity(StrSource::new("abcdefghij"), 4);
        let mut seen = String::new();
        loop {
            buffer.cache(4).unwrap();
            let ch = buffer.get(0);
            if ch == '\0' {
                break;
            }
            seen.push(ch);
            buffer.skip(1);
        }
        assert_eq!(seen, "abcdefghij");
    }

    #[test]
    fn get_does_not_read() {
        let buffer = LookAheadBuffer::new(StrSource::new("xyz"));
        assert_eq!(buffer.get(0), '\0');
        assert_eq!(buffer.buffered(), 0);
    }

    #[test]
    #[should_panic = "exceeds the buffer capacity"]
    fn lookahead_beyond_capacity() {
        let mut buffer = LookAheadBuffer::with_capacity(StrSource::new("abcdef"), 4);
        let _ = buffer.cache(5);
    }
}
