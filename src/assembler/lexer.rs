//! Lexical scanners over the Cursor.
//!
//! There is no token stream. Each scanner skips leading spaces and
//! tabs itself and reads straight from the source characters.
use super::cursor::Cursor;

impl<'a> Cursor<'a> {
    /// A statement terminator: the end of input, or one or more
    /// newlines and semicolons. Blank lines collapse into one separator.
    pub fn separator(&self) -> Option<Cursor<'a>> {
        let cursor = self.skip_whitespace(false);
        if cursor.at_end() {
            return Some(cursor);
        }

        let mut cursor = match cursor.next_char() {
            Some(('\n', next)) | Some((';', next)) => next,
            _ => return None,
        };

        loop {
            let skipped = cursor.skip_whitespace(false);
            if skipped.at_end() {
                return Some(skipped);
            }
            match skipped.next_char() {
                Some(('\n', next)) | Some((';', next)) => cursor = next,
                _ => return Some(cursor),
            }
        }
    }

    /// One or more characters of a single class, with no whitespace skipping.
    fn many1<F>(&self, class: F) -> Option<(String, Cursor<'a>)>
    where
        F: Fn(&Cursor<'a>) -> Option<(String, Cursor<'a>)>,
    {
        let mut cursor = *self;
        let mut scanned = String::new();
        while let Some((c, next)) = class(&cursor) {
            scanned.push_str(&c);
            cursor = next;
        }

        if scanned.is_empty() {
            return None;
        }
        Some((scanned, cursor))
    }

    /// Skips whitespace, then reads one or more characters of a single class.
    pub fn scan_while<F>(&self, class: F) -> Option<(String, Cursor<'a>)>
    where
        F: Fn(&Cursor<'a>) -> Option<(String, Cursor<'a>)>,
    {
        self.skip_whitespace(false).many1(class)
    }

    /// A run of letters only. Used for keywords, not identifiers.
    pub fn raw_word(&self) -> Option<(String, Cursor<'a>)> {
        self.scan_while(Cursor::alpha_char)
    }

    pub fn keyword(&self, keyword: &str) -> Option<Cursor<'a>> {
        match self.raw_word() {
            Some((word, next)) if word == keyword => Some(next),
            _ => None,
        }
    }

    /// A letter followed by any number of letters and digits.
    pub fn identifier(&self) -> Option<(String, Cursor<'a>)> {
        let cursor = self.skip_whitespace(false);
        let (first, cursor) = cursor.alpha_char()?;
        match cursor.many1(Cursor::alnum_char) {
            Some((rest, cursor)) => Some((first + &rest, cursor)),
            None => Some((first, cursor)),
        }
    }

    /// A numeric literal.
    ///
    /// `0d` starts a decimal literal and `0x` a hexadecimal one.
    /// Any other literal starting with `0` is rejected, including `0`
    /// itself. Everything else is plain decimal.
    pub fn number(&self) -> Option<(i64, Cursor<'a>)> {
        let cursor = self.skip_whitespace(false);

        match cursor.next_char() {
            Some(('0', next)) => match next.next_char() {
                Some(('d', next)) => next.digits(Cursor::numeric_char, 10),
                Some(('x', next)) => next.digits(Cursor::hex_char, 16),
                _ => None,
            },
            _ => cursor.digits(Cursor::numeric_char, 10),
        }
    }

    fn digits<F>(&self, class: F, radix: u32) -> Option<(i64, Cursor<'a>)>
    where
        F: Fn(&Cursor<'a>) -> Option<(String, Cursor<'a>)>,
    {
        let (digits, cursor) = self.many1(class)?;
        // Literals too wide for an i64 do not match.
        let value = i64::from_str_radix(&digits, radix).ok()?;
        Some((value, cursor))
    }

    /// A double-quoted string. The contents are taken verbatim;
    /// there are no escape sequences.
    pub fn string_literal(&self) -> Option<(String, Cursor<'a>)> {
        let cursor = self.skip_whitespace(false);
        match cursor.next_char() {
            Some(('"', next)) => next.scan_until("\""),
            _ => None,
        }
    }
}
