//! The Cursor is the only state the parser carries around.
//!
//! It is a borrowed source string and a byte offset into it. Cursors
//! are never mutated: every successful read hands back a new cursor
//! advanced past whatever it consumed, and backtracking is simply
//! dropping that new cursor and carrying on with the old one.

/// Starts a comment that runs through the end of the line.
pub const COMMENT: char = '#';

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Cursor<'a> {
    source: &'a str,
    offset: usize,
}

/// Owns the text for sources that arrive as separate lines.
pub struct SourceBuffer {
    text: String,
}

impl SourceBuffer {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let text = lines.iter()
            .map(|line| line.as_ref())
            .collect::<Vec<&str>>()
            .join("\n");
        SourceBuffer { text }
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.text)
    }
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Cursor { source, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Everything from the cursor to the end of the source.
    pub fn remaining(&self) -> &'a str {
        &self.source[self.offset..]
    }

    pub fn at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    fn advanced(&self, by: usize) -> Self {
        Cursor { source: self.source, offset: self.offset + by }
    }

    /// Reads a single character.
    ///
    /// A comment is read as the newline that ends it. A comment
    /// with no newline after it can not be read at all, which
    /// leaves the rest of the input unreachable.
    pub fn next_char(&self) -> Option<(char, Cursor<'a>)> {
        let rest = self.remaining();
        let c = rest.chars().next()?;

        if c == COMMENT {
            let after_marker = c.len_utf8();
            let newline = rest[after_marker..].find('\n')?;
            return Some(('\n', self.advanced(after_marker + newline + 1)));
        }

        Some((c, self.advanced(c.len_utf8())))
    }

    /// Reads a single character accepted by `predicate`.
    pub fn char_where<P>(&self, predicate: P) -> Option<(String, Cursor<'a>)>
    where
        P: Fn(char) -> bool,
    {
        match self.next_char() {
            Some((c, next)) if predicate(c) => Some((c.to_string(), next)),
            _ => None,
        }
    }

    pub fn alpha_char(&self) -> Option<(String, Cursor<'a>)> {
        self.char_where(|c| c.is_ascii_alphabetic())
    }

    pub fn numeric_char(&self) -> Option<(String, Cursor<'a>)> {
        self.char_where(|c| c.is_ascii_digit())
    }

    pub fn hex_char(&self) -> Option<(String, Cursor<'a>)> {
        self.char_where(|c| c.is_ascii_hexdigit())
    }

    pub fn alnum_char(&self) -> Option<(String, Cursor<'a>)> {
        self.alpha_char().or_else(|| self.numeric_char())
    }

    /// Skips spaces and tabs, and newlines too if `allow_newline` is set.
    /// Returns the cursor unchanged when there is nothing to skip.
    pub fn skip_whitespace(&self, allow_newline: bool) -> Cursor<'a> {
        let mut cursor = *self;
        loop {
            match cursor.next_char() {
                Some((' ', next)) | Some(('\t', next)) => cursor = next,
                Some(('\n', next)) if allow_newline => cursor = next,
                _ => return cursor,
            }
        }
    }

    /// Consumes exactly `literal`.
    pub fn match_str(&self, literal: &str) -> Option<Cursor<'a>> {
        let mut cursor = *self;
        for expected in literal.chars() {
            match cursor.next_char() {
                Some((c, next)) if c == expected => cursor = next,
                _ => return None,
            }
        }
        Some(cursor)
    }

    /// Collects characters until `delimiter` matches, consuming the delimiter.
    /// Fails if the input runs out first.
    pub fn scan_until(&self, delimiter: &str) -> Option<(String, Cursor<'a>)> {
        let mut cursor = *self;
        let mut scanned = String::new();
        loop {
            if let Some(next) = cursor.match_str(delimiter) {
                return Some((scanned, next));
            }
            let (c, next) = cursor.next_char()?;
            scanned.push(c);
            cursor = next;
        }
    }
}
