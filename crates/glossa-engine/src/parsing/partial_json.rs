use serde_json::{Map, Number, Value};

use super::ParseError;
use super::cursor::Cursor;

const MAX_DEPTH: usize = 128;

/// Value recovered from a JSON prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialValue {
    pub value: Value,
    /// True when the prefix already holds the whole document.
    pub complete: bool,
}

/// Parses a possibly truncated JSON document.
///
/// Returns `Ok(None)` when nothing usable has arrived yet.
pub fn parse_partial(text: &str) -> Result<Option<PartialValue>, ParseError> {
    let mut parser = Parser::new(text);
    parser.cursor.skip_whitespace();
    if parser.cursor.eof() {
        return Ok(None);
    }

    let parsed = parser.value(0)?;
    if let Parsed::Complete(_) = parsed {
        parser.cursor.skip_whitespace();
        if !parser.cursor.eof() {
            return Err(ParseError::TrailingCharacters {
                offset: parser.cursor.pos(),
            });
        }
    }

    Ok(match parsed {
        Parsed::Complete(value) => Some(PartialValue {
            value,
            complete: true,
        }),
        Parsed::Partial(value) => Some(PartialValue {
            value,
            complete: false,
        }),
        Parsed::Missing => None,
    })
}

enum Parsed {
    /// The value ended before the input did.
    Complete(Value),
    /// The input ended inside the value.
    Partial(Value),
    /// The input ended before anything usable was read.
    Missing,
}

struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            cursor: Cursor::new(text),
        }
    }

    fn value(&mut self, depth: usize) -> Result<Parsed, ParseError> {
        self.cursor.skip_whitespace();
        match self.cursor.peek() {
            None => Ok(Parsed::Missing),
            Some(b'{') => self.object(depth + 1),
            Some(b'[') => self.array(depth + 1),
            Some(b'"') => Ok(match self.string()? {
                (text, true) => Parsed::Complete(Value::String(text)),
                (text, false) => Parsed::Partial(Value::String(text)),
            }),
            Some(b't') => self.literal("true", Value::Bool(true)),
            Some(b'f') => self.literal("false", Value::Bool(false)),
            Some(b'n') => self.literal("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.number(),
            Some(_) => Err(self.unexpected("a value")),
        }
    }

    fn object(&mut self, depth: usize) -> Result<Parsed, ParseError> {
        self.check_depth(depth)?;
        self.cursor.bump();
        let mut map = Map::new();

        self.cursor.skip_whitespace();
        if self.cursor.eat(b'}') {
            return Ok(Parsed::Complete(Value::Object(map)));
        }

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                None => return Ok(Parsed::Partial(Value::Object(map))),
                Some(b'"') => {}
                Some(_) => return Err(self.unexpected("an object key")),
            }

            let key = match self.string()? {
                (key, true) => key,
                (_, false) => return Ok(Parsed::Partial(Value::Object(map))),
            };

            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                None => return Ok(Parsed::Partial(Value::Object(map))),
                Some(b':') => {
                    self.cursor.bump();
                }
                Some(_) => return Err(self.unexpected("':'")),
            }

            match self.value(depth)? {
                Parsed::Missing => return Ok(Parsed::Partial(Value::Object(map))),
                Parsed::Partial(value) => {
                    map.insert(key, value);
                    return Ok(Parsed::Partial(Value::Object(map)));
                }
                Parsed::Complete(value) => {
                    map.insert(key, value);
                }
            }

            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                None => return Ok(Parsed::Partial(Value::Object(map))),
                Some(b',') => {
                    self.cursor.bump();
                }
                Some(b'}') => {
                    self.cursor.bump();
                    return Ok(Parsed::Complete(Value::Object(map)));
                }
                Some(_) => return Err(self.unexpected("',' or '}'")),
            }
        }
    }

    fn array(&mut self, depth: usize) -> Result<Parsed, ParseError> {
        self.check_depth(depth)?;
        self.cursor.bump();
        let mut items = Vec::new();

        self.cursor.skip_whitespace();
        if self.cursor.eat(b']') {
            return Ok(Parsed::Complete(Value::Array(items)));
        }

        loop {
            match self.value(depth)? {
                Parsed::Missing => return Ok(Parsed::Partial(Value::Array(items))),
                Parsed::Partial(value) => {
                    items.push(value);
                    return Ok(Parsed::Partial(Value::Array(items)));
                }
                Parsed::Complete(value) => items.push(value),
            }

            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                None => return Ok(Parsed::Partial(Value::Array(items))),
                Some(b',') => {
                    self.cursor.bump();
                }
                Some(b']') => {
                    self.cursor.bump();
                    return Ok(Parsed::Complete(Value::Array(items)));
                }
                Some(_) => return Err(self.unexpected("',' or ']'")),
            }
        }
    }

    /// Reads a string starting at the opening quote.
    ///
    /// The flag is false when the input ended before the closing quote.
    fn string(&mut self) -> Result<(String, bool), ParseError> {
        self.cursor.bump();
        let mut out = String::new();

        loop {
            let run_start = self.cursor.pos();
            while let Some(b) = self.cursor.peek() {
                if b == b'"' || b == b'\\' {
                    break;
                }
                self.cursor.bump();
            }
            out.push_str(self.cursor.slice_from(run_start));

            match self.cursor.peek() {
                None => return Ok((out, false)),
                Some(b'"') => {
                    self.cursor.bump();
                    return Ok((out, true));
                }
                _ => match self.escape()? {
                    Some(ch) => out.push(ch),
                    None => return Ok((out, false)),
                },
            }
        }
    }

    /// Decodes one escape sequence. `None` means the input ended inside it.
    fn escape(&mut self) -> Result<Option<char>, ParseError> {
        let offset = self.cursor.pos();
        self.cursor.bump();
        let Some(b) = self.cursor.bump() else {
            return Ok(None);
        };

        let ch = match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.unicode_escape(offset),
            _ => return Err(ParseError::InvalidEscape { offset }),
        };
        Ok(Some(ch))
    }

    fn unicode_escape(&mut self, offset: usize) -> Result<Option<char>, ParseError> {
        let Some(high) = self.hex4(offset)? else {
            return Ok(None);
        };

        if (0xDC00..=0xDFFF).contains(&high) {
            return Ok(Some(char::REPLACEMENT_CHARACTER));
        }
        if !(0xD800..=0xDBFF).contains(&high) {
            return Ok(Some(
                char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER),
            ));
        }

        // A high surrogate needs the low half from the following escape.
        let rest = self.cursor.rest().as_bytes();
        let could_continue = rest.iter().take(6).enumerate().all(|(k, b)| match k {
            0 => *b == b'\\',
            1 => *b == b'u',
            _ => b.is_ascii_hexdigit(),
        });
        if rest.len() < 6 && could_continue {
            return Ok(None);
        }
        if !self.cursor.starts_with(b"\\u") {
            return Ok(Some(char::REPLACEMENT_CHARACTER));
        }

        let checkpoint = self.cursor.clone();
        let low_offset = self.cursor.pos();
        self.cursor.bump_n(2);
        match self.hex4(low_offset)? {
            Some(low) if (0xDC00..=0xDFFF).contains(&low) => {
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                Ok(Some(
                    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
                ))
            }
            _ => {
                self.cursor = checkpoint;
                Ok(Some(char::REPLACEMENT_CHARACTER))
            }
        }
    }

    fn hex4(&mut self, offset: usize) -> Result<Option<u32>, ParseError> {
        let rest = self.cursor.rest().as_bytes();
        let available = rest.len().min(4);
        if !rest[..available].iter().all(u8::is_ascii_hexdigit) {
            return Err(ParseError::InvalidEscape { offset });
        }
        if available < 4 {
            self.cursor.bump_n(available);
            return Ok(None);
        }

        let digits = self.cursor.rest().get(..4).unwrap_or("");
        let code =
            u32::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidEscape { offset })?;
        self.cursor.bump_n(4);
        Ok(Some(code))
    }

    fn literal(&mut self, word: &'static str, value: Value) -> Result<Parsed, ParseError> {
        if self.cursor.starts_with(word.as_bytes()) {
            self.cursor.bump_n(word.len());
            return Ok(Parsed::Complete(value));
        }

        let rest = self.cursor.rest();
        if word.starts_with(rest) {
            self.cursor.bump_n(rest.len());
            return Ok(Parsed::Missing);
        }
        Err(self.unexpected(word))
    }

    fn number(&mut self) -> Result<Parsed, ParseError> {
        let start = self.cursor.pos();
        while matches!(
            self.cursor.peek(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        ) {
            self.cursor.bump();
        }
        let text = self.cursor.slice_from(start);
        let at_end = self.cursor.eof();

        match parse_number(text) {
            Some(number) if at_end => Ok(Parsed::Partial(Value::Number(number))),
            Some(number) => Ok(Parsed::Complete(Value::Number(number))),
            None if at_end => Ok(Parsed::Missing),
            None => Err(ParseError::InvalidNumber {
                offset: start,
                text: text.to_string(),
            }),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                offset: self.cursor.pos(),
                limit: MAX_DEPTH,
            });
        }
        Ok(())
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::Unexpected {
            offset: self.cursor.pos(),
            found: self.cursor.peek_char().unwrap_or(char::REPLACEMENT_CHARACTER),
            expected,
        }
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if text.ends_with(['.', 'e', 'E', '+', '-']) {
        return None;
    }
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(n) = text.parse::<i64>() {
            return Some(Number::from(n));
        }
        if let Ok(n) = text.parse::<u64>() {
            return Some(Number::from(n));
        }
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}
