//! Cursor-driven tokenizer.

use toyc_util::{FileId, Span, Symbol};

use crate::token::{NumberBase, Token, TokenKind};

/// Errors raised while tokenizing.
#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("unknown operator {lexeme:?} at {span}")]
    UnknownOperator { lexeme: String, span: Span },
    #[error("unterminated numeric literal at {span}")]
    MalformedNumber { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnknownOperator { span, .. } => *span,
            LexError::MalformedNumber { span } => *span,
        }
    }
}

/// Scans a source string into a stream of [`Token`]s, one call to
/// [`Lexer::next_token`] at a time.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    file_id: FileId,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, file_id: FileId) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            file_id,
        }
    }

    /// Tokenizes the whole input, ending with a single [`TokenKind::Eof`].
    ///
    /// # Examples
    ///
    /// ```
    /// use toyc_lex::Lexer;
    /// use toyc_util::FileId;
    ///
    /// let tokens = Lexer::new("1 + 2", FileId(0)).tokenize().unwrap();
    /// assert_eq!(tokens.len(), 4); // 1, +, 2, Eof
    /// ```
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        tracing::debug!(file_id = ?self.file_id, "tokenizing");
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.is_eof();
            tracing::trace!(?tok, "lexed token");
            tokens.push(tok);
            if done {
                break;
            }
        }
        tracing::debug!(count = tokens.len(), "tokenizing finished");
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn point_span(&self) -> Span {
        Span::point(self.pos as u32, self.line, self.column, self.file_id)
    }

    /// Skips whitespace, `#`-to-end-of-line comments, and the language's
    /// unsupported `'`/`"`-delimited string literals (silently discarded,
    /// matching the source: there is no string type).
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.bump();
                }
                Some(b'#') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.bump();
                    }
                }
                Some(quote @ (b'\'' | b'"')) => {
                    self.bump();
                    loop {
                        match self.peek() {
                            None => break,
                            Some(b) if b == quote => {
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Produces the next token, advancing the cursor past it.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let start = self.pos as u32;
        let start_line = self.line;
        let start_col = self.column;

        let Some(c) = self.peek() else {
            let span = Span::point(start, start_line, start_col, self.file_id);
            return Ok(Token::new(TokenKind::Eof, span));
        };

        let kind = if c.is_ascii_digit() {
            self.lex_number(start, start_line, start_col)?
        } else if c.is_ascii_alphabetic() {
            self.lex_ident_or_keyword()
        } else {
            self.lex_operator_or_punct(start, start_line, start_col)?
        };

        let end = self.pos as u32;
        let span = Span::new(start, end, start_line, start_col, self.file_id);
        Ok(Token::new(kind, span))
    }

    fn lex_ident_or_keyword(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric()) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).expect("ascii identifier");
        TokenKind::keyword_from_str(text).unwrap_or_else(|| TokenKind::Ident(Symbol::intern(text)))
    }

    /// Lexes decimal, `0x`, `0b`, and `0o` integer literals.
    fn lex_number(
        &mut self,
        start: u32,
        start_line: u32,
        start_col: u32,
    ) -> Result<TokenKind, LexError> {
        let base = if self.peek() == Some(b'0') {
            match self.peek_at(1) {
                Some(b'x') | Some(b'X') => {
                    self.bump();
                    self.bump();
                    Some(NumberBase::Hexadecimal)
                }
                Some(b'b') | Some(b'B') => {
                    self.bump();
                    self.bump();
                    Some(NumberBase::Binary)
                }
                Some(b'o') | Some(b'O') => {
                    self.bump();
                    self.bump();
                    Some(NumberBase::Octal)
                }
                _ => None,
            }
        } else {
            None
        };
        let base = base.unwrap_or(NumberBase::Decimal);

        let digit_start = self.pos;
        let is_digit: fn(u8) -> bool = match base {
            NumberBase::Hexadecimal => |b| b.is_ascii_hexdigit(),
            NumberBase::Binary => |b| b == b'0' || b == b'1',
            NumberBase::Octal => |b| (b'0'..=b'7').contains(&b),
            NumberBase::Decimal => |b| b.is_ascii_digit(),
        };
        while matches!(self.peek(), Some(b) if is_digit(b)) {
            self.bump();
        }
        let digits = std::str::from_utf8(&self.src[digit_start..self.pos]).expect("ascii digits");
        if digits.is_empty() {
            let span = Span::new(start, self.pos as u32, start_line, start_col, self.file_id);
            return Err(LexError::MalformedNumber { span });
        }
        let radix = match base {
            NumberBase::Hexadecimal => 16,
            NumberBase::Binary => 2,
            NumberBase::Octal => 8,
            NumberBase::Decimal => 10,
        };
        let value = i64::from_str_radix(digits, radix).map_err(|_| {
            let span = Span::new(start, self.pos as u32, start_line, start_col, self.file_id);
            LexError::MalformedNumber { span }
        })?;
        Ok(TokenKind::Number { value, base })
    }

    /// Whether `b` belongs to the operator character set `{= < > ! & ^ +
    /// - * / % | ~}`. Runs of these characters are lexed as a single
    /// maximal-munch unit and looked up as a whole, rather than greedily
    /// matching two-character operators against their prefixes — so
    /// `1+-2` fails to lex (`+-` is not a known operator) exactly as the
    /// source documents, instead of silently splitting into `+` `-`.
    fn is_operator_char(b: u8) -> bool {
        matches!(b, b'=' | b'<' | b'>' | b'!' | b'&' | b'^' | b'+' | b'-' | b'*' | b'/' | b'%' | b'|' | b'~')
    }

    fn operator_kind(lexeme: &str) -> Option<TokenKind> {
        Some(match lexeme {
            "=" => TokenKind::Assign,
            "+" => TokenKind::Plus,
            "-" => TokenKind::Minus,
            "*" => TokenKind::Star,
            "/" => TokenKind::Slash,
            "%" => TokenKind::Percent,
            "^" => TokenKind::Caret,
            "<" => TokenKind::Lt,
            "<=" => TokenKind::Le,
            "<<" => TokenKind::Shl,
            ">" => TokenKind::Gt,
            ">=" => TokenKind::Ge,
            ">>" => TokenKind::Shr,
            "==" => TokenKind::EqEq,
            "!" => TokenKind::Bang,
            "!=" => TokenKind::Ne,
            "&" => TokenKind::Amp,
            "&&" => TokenKind::AmpAmp,
            "|" => TokenKind::Pipe,
            "||" => TokenKind::PipePipe,
            "~" => TokenKind::Tilde,
            _ => return None,
        })
    }

    /// Lexes punctuation, operator runs (maximal munch over the operator
    /// character set, looked up as a whole lexeme), and the single-byte
    /// fallback for anything else.
    fn lex_operator_or_punct(
        &mut self,
        start: u32,
        start_line: u32,
        start_col: u32,
    ) -> Result<TokenKind, LexError> {
        let c = self.peek().expect("checked by caller");
        match c {
            b'(' => {
                self.bump();
                return Ok(TokenKind::LParen);
            }
            b')' => {
                self.bump();
                return Ok(TokenKind::RParen);
            }
            b'{' => {
                self.bump();
                return Ok(TokenKind::LBrace);
            }
            b'}' => {
                self.bump();
                return Ok(TokenKind::RBrace);
            }
            b',' => {
                self.bump();
                return Ok(TokenKind::Comma);
            }
            b':' => {
                self.bump();
                return Ok(TokenKind::Colon);
            }
            _ => {}
        }

        if Self::is_operator_char(c) {
            let run_start = self.pos;
            while matches!(self.peek(), Some(b) if Self::is_operator_char(b)) {
                self.bump();
            }
            let lexeme = std::str::from_utf8(&self.src[run_start..self.pos]).expect("ascii operator run");
            return Self::operator_kind(lexeme).ok_or_else(|| {
                let span = Span::new(start, self.pos as u32, start_line, start_col, self.file_id);
                LexError::UnknownOperator {
                    lexeme: lexeme.to_string(),
                    span,
                }
            });
        }

        self.bump();
        Ok(TokenKind::Character(c as char))
    }
}
