//! List arguments exchanged with the loam tools.
//!
//! Lists cross the process boundary as a single bracketed line of quoted
//! strings, for example `['hero', 'player tag']`. Encoding always uses single
//! quotes and escapes `\`, `'`, newline, carriage return and tab with a
//! backslash. Decoding accepts single- or double-quoted items, an optional
//! trailing comma, and the same escapes; an unknown escape is kept verbatim.
//! The line is parsed against that grammar only, never evaluated.

use thiserror::Error;

/// Encode strings as a list literal.
pub fn encode_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted: Vec<String> = items.into_iter().map(|s| quote(s.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote(item: &str) -> String {
    let mut out = String::with_capacity(item.len() + 2);
    out.push('\'');
    for c in item.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// A list literal that does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at column {column}")]
pub struct ListSyntaxError {
    /// 1-based character column.
    pub column: usize,
    pub message: &'static str,
}

/// Decode a list literal into its items.
pub fn parse_list(line: &str) -> Result<Vec<String>, ListSyntaxError> {
    let mut cursor = Cursor::new(line.trim());
    let mut items = Vec::new();

    cursor.expect('[', "expected '['")?;
    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some(']') => {
                cursor.bump();
                break;
            }
            Some(q @ ('\'' | '"')) => {
                cursor.bump();
                items.push(cursor.string_body(q)?);
            }
            Some(_) => return Err(cursor.error("expected a quoted string or ']'")),
            None => return Err(cursor.error("unterminated list")),
        }

        cursor.skip_whitespace();
        match cursor.peek() {
            Some(',') => cursor.bump(),
            Some(']') => {
                cursor.bump();
                break;
            }
            Some(_) => return Err(cursor.error("expected ',' or ']'")),
            None => return Err(cursor.error("unterminated list")),
        }
    }

    cursor.skip_whitespace();
    if cursor.peek().is_some() {
        return Err(cursor.error("unexpected text after ']'"));
    }
    Ok(items)
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) {
        if self.chars.next().is_some() {
            self.column += 1;
        }
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.column += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char, message: &'static str) -> Result<(), ListSyntaxError> {
        if self.peek() == Some(want) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    /// Read up to and including the closing `quote`.
    fn string_body(&mut self, quote: char) -> Result<String, ListSyntaxError> {
        let mut out = String::new();
        loop {
            match self.next() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.next() {
                    None => return Err(self.error("unterminated string")),
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn error(&self, message: &'static str) -> ListSyntaxError {
        ListSyntaxError {
            column: self.column,
            message,
        }
    }
}
