use crate::lexer::{LexerError, Token, TokenKind, TokenValue, EOS};

/// Single-pass byte lexer with one-byte lookahead and one-token peek.
pub struct Lexer {
    source: Vec<u8>,
    pos: usize,
    current: u8,
    line: usize,
    filename: String,
    buf: Vec<u8>,
    peeked: Option<Token>,
}

impl Lexer {
    #[must_use]
    pub fn new(filename: &str, source: Vec<u8>) -> Self {
        Self {
            source,
            pos: 0,
            // A space sentinel so the first scan step falls through to next()
            current: b' ',
            line: 1,
            filename: filename.to_string(),
            buf: Vec::new(),
            peeked: None,
        }
    }

    /// Return the next token, consuming it.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.scan()
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<&Token, LexerError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan()?);
        }
        Ok(self.peeked.as_ref().unwrap())
    }

    fn next(&mut self) {
        if self.pos < self.source.len() {
            self.current = self.source[self.pos];
            self.pos += 1;
        } else {
            self.current = EOS;
        }
    }

    // Skip '\n' or '\r', fold '\r\n'/'\n\r' pairs into one terminator.
    fn inc_line_number(&mut self) {
        let old = self.current;
        self.next();
        if is_newline(self.current) && self.current != old {
            self.next();
        }
        self.line += 1;
    }

    fn scan(&mut self) -> Result<Token, LexerError> {
        loop {
            self.buf.clear();
            match self.current {
                EOS => return Ok(Token::new(TokenKind::Eos, None, self.line)),
                b' ' | b'\t' | 0x0c | 0x0b => self.next(),
                b'\n' | b'\r' => self.inc_line_number(),
                b'/' => return self.read_comment(),
                b'"' => return self.read_string(),
                b'#' => return self.read_sharp(),
                b'{' => return Ok(self.punct(TokenKind::BraceLeft)),
                b'}' => return Ok(self.punct(TokenKind::BraceRight)),
                b';' => return Ok(self.punct(TokenKind::Semi)),
                b'=' => return Ok(self.punct(TokenKind::Eq)),
                b'<' => return Ok(self.punct(TokenKind::AngleLeft)),
                b'>' => return Ok(self.punct(TokenKind::AngleRight)),
                b',' => return Ok(self.punct(TokenKind::Comma)),
                b'(' => return Ok(self.punct(TokenKind::ParenLeft)),
                b')' => return Ok(self.punct(TokenKind::ParenRight)),
                b'[' => return Ok(self.punct(TokenKind::SquareLeft)),
                b']' => return Ok(self.punct(TokenKind::SquareRight)),
                c if is_number_start(c) => return self.read_number(),
                c if is_letter(c) => return self.read_ident(),
                c => {
                    return Err(LexerError::UnexpectedChar {
                        file: self.filename.clone(),
                        line: self.line,
                        ch: c as char,
                    })
                }
            }
        }
    }

    fn punct(&mut self, kind: TokenKind) -> Token {
        self.next();
        Token::new(kind, None, self.line)
    }

    fn buf_text(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    // Digits with an optional leading '-', an optional '.' switching to
    // float, and an optional 0x/0X hex prefix. The raw text is preserved.
    fn read_number(&mut self) -> Result<Token, LexerError> {
        let mut has_dot = false;
        let mut is_hex = false;

        self.buf.push(self.current);
        self.next();
        while is_digit(self.current)
            || self.current == b'.'
            || self.current == b'x'
            || self.current == b'X'
            || (is_hex && is_hex_letter(self.current))
        {
            if self.current == b'.' {
                has_dot = true;
            } else if self.current == b'x' || self.current == b'X' {
                is_hex = true;
            }
            self.buf.push(self.current);
            self.next();
        }

        let text = self.buf_text();
        if has_dot {
            let f: f64 = text.parse().map_err(|_| LexerError::InvalidNumber {
                file: self.filename.clone(),
                line: self.line,
                text: text.clone(),
            })?;
            let value = TokenValue { f, s: text, ..Default::default() };
            return Ok(Token::new(TokenKind::Float, Some(value), self.line));
        }

        let i = parse_int(&text).ok_or_else(|| LexerError::InvalidNumber {
            file: self.filename.clone(),
            line: self.line,
            text: text.clone(),
        })?;
        let value = TokenValue { i, s: text, ..Default::default() };
        Ok(Token::new(TokenKind::Integer, Some(value), self.line))
    }

    // Identifier, keyword, or type word. ':' is allowed so qualified names
    // like A::B lex as one token; the qualifier shape is validated here.
    fn read_ident(&mut self) -> Result<Token, LexerError> {
        let mut last = 0u8;
        while is_letter(self.current) || is_digit(self.current) || self.current == b':' {
            if is_digit(self.current) && last == b':' {
                return Err(LexerError::InvalidIdentifier {
                    file: self.filename.clone(),
                    line: self.line,
                });
            }
            last = self.current;
            self.buf.push(self.current);
            self.next();
        }

        let mut text = self.buf_text();
        if text.contains(':') {
            // One leading namespace qualifier may be trimmed (X::A::B -> A::B)
            if text.matches("::").count() == 2 && text.matches(':').count() == 4 {
                if let Some(idx) = text.find("::") {
                    text = text[idx + 2..].to_string();
                }
            }
            if text.matches("::").count() != 1 || text.matches(':').count() != 2 {
                return Err(LexerError::InvalidNamespace {
                    file: self.filename.clone(),
                    line: self.line,
                    text,
                });
            }
        }

        if let Some(kind) = TokenKind::from_word(&text) {
            return Ok(Token::new(kind, None, self.line));
        }
        let value = TokenValue { s: text, ..Default::default() };
        Ok(Token::new(TokenKind::Name, Some(value), self.line))
    }

    // '#' must introduce exactly the word "include".
    fn read_sharp(&mut self) -> Result<Token, LexerError> {
        self.next();
        while is_letter(self.current) {
            self.buf.push(self.current);
            self.next();
        }
        if self.buf != b"include" {
            return Err(LexerError::ExpectedInclude {
                file: self.filename.clone(),
                line: self.line,
            });
        }
        Ok(Token::new(TokenKind::Include, None, self.line))
    }

    // String literal without escape interpretation; may be empty.
    fn read_string(&mut self) -> Result<Token, LexerError> {
        self.next();
        loop {
            match self.current {
                EOS => {
                    return Err(LexerError::UnterminatedString {
                        file: self.filename.clone(),
                        line: self.line,
                    })
                }
                b'"' => {
                    self.next();
                    break;
                }
                c => {
                    self.buf.push(c);
                    self.next();
                }
            }
        }
        let value = TokenValue { s: self.buf_text(), ..Default::default() };
        Ok(Token::new(TokenKind::StringLit, Some(value), self.line))
    }

    fn read_comment(&mut self) -> Result<Token, LexerError> {
        self.next();
        match self.current {
            b'/' => {
                self.buf.push(b'/');
                while !is_newline(self.current) && self.current != EOS {
                    self.buf.push(self.current);
                    self.next();
                }
            }
            b'*' => {
                self.buf.push(b'/');
                self.buf.push(b'*');
                self.next();
                self.read_long_comment()?;
            }
            _ => {
                return Err(LexerError::InvalidComment {
                    file: self.filename.clone(),
                    line: self.line,
                })
            }
        }
        let value = TokenValue { s: self.buf_text(), ..Default::default() };
        Ok(Token::new(TokenKind::Comment, Some(value), self.line))
    }

    fn read_long_comment(&mut self) -> Result<(), LexerError> {
        loop {
            match self.current {
                EOS => {
                    return Err(LexerError::UnterminatedBlockComment {
                        file: self.filename.clone(),
                        line: self.line,
                    })
                }
                b'\n' | b'\r' => {
                    self.buf.push(self.current);
                    self.inc_line_number();
                }
                b'*' => {
                    self.buf.push(self.current);
                    self.next();
                    if self.current == b'/' {
                        self.buf.push(self.current);
                        self.next();
                        return Ok(());
                    }
                }
                c => {
                    self.buf.push(c);
                    self.next();
                }
            }
        }
    }
}

fn is_newline(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

fn is_number_start(b: u8) -> bool {
    b.is_ascii_digit() || b == b'-'
}

fn is_hex_letter(b: u8) -> bool {
    matches!(b, b'a'..=b'f' | b'A'..=b'F')
}

fn is_letter(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

// Base-aware integer parse: decimal, or hex with a 0x/0X prefix, with an
// optional leading sign.
fn parse_int(text: &str) -> Option<i64> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        rest.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}
