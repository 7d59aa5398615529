use std::fmt;
use std::iter::Peekable;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Loc {
    pub file_path: Option<String>,
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.file_path {
            Some(file_path) => write!(f, "{}:{}:{}", file_path, self.row, self.col),
            None => write!(f, "{}:{}", self.row, self.col),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum TokenKind {
    Ident,

    // Special Characters
    OpenParen,
    CloseParen,
    Comma,
    Star,

    // Terminators
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind::*;
        match self {
            Ident => write!(f, "identifier"),
            OpenParen => write!(f, "open paren"),
            CloseParen => write!(f, "close paren"),
            Comma => write!(f, "comma"),
            Star => write!(f, "star"),
            End => write!(f, "end of line"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub loc: Loc,
}

impl Token {
    pub fn report(&self) -> ReportToken<'_> {
        ReportToken { inner: self }
    }
}

pub struct ReportToken<'a> {
    pub inner: &'a Token
}

impl fmt::Display for ReportToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inner.text.is_empty() {
            write!(f, "{}", self.inner.kind)
        } else {
            write!(f, "{} `{}`", self.inner.kind, self.inner.text)
        }
    }
}

/// Tokenizer for a single statement line.
///
/// Statements never span lines, so the lexer is created per line with
/// the row already known. It always ends with exactly one
/// [`TokenKind::End`] token.
pub struct Lexer<Chars: Iterator<Item=char>> {
    chars: Peekable<Chars>,
    peeked: Option<Token>,
    exhausted: bool,
    file_path: Option<String>,
    row: usize,
    cnum: usize,
}

impl<Chars: Iterator<Item=char>> Lexer<Chars> {
    pub fn new(chars: Chars, file_path: Option<String>, row: usize) -> Self {
        Self {
            chars: chars.peekable(),
            peeked: None,
            exhausted: false,
            file_path,
            row,
            cnum: 0,
        }
    }

    pub fn loc(&self) -> Loc {
        Loc {
            file_path: self.file_path.clone(),
            row: self.row,
            col: self.cnum + 1,
        }
    }

    pub fn expect_token(&mut self, kind: TokenKind) -> Result<Token, (TokenKind, Token)> {
        let token = self.next_token();
        if kind == token.kind {
            Ok(token)
        } else {
            Err((kind, token))
        }
    }

    pub fn peek_token(&mut self) -> &Token {
        let token = self.next_token();
        self.peeked.insert(token)
    }

    pub fn next_token(&mut self) -> Token {
        self.peeked.take().unwrap_or_else(|| self.chop_tokens_from_chars())
    }

    fn trim_whitespaces(&mut self) {
        while self.chars.next_if(|x| x.is_whitespace()).is_some() {
            self.cnum += 1
        }
    }

    fn chop_tokens_from_chars(&mut self) -> Token {
        assert!(!self.exhausted, "Completely exhausted lexer. The lexer MUST ALWAYS end with the terminator. If the lexer caller tries to pull tokens after the terminator, this is a bug.");

        self.trim_whitespaces();

        let loc = self.loc();
        match self.chars.next() {
            Some(x) => {
                self.cnum += 1;
                let mut text = x.to_string();
                match x {
                    '(' => Token {kind: TokenKind::OpenParen,  text, loc},
                    ')' => Token {kind: TokenKind::CloseParen, text, loc},
                    ',' => Token {kind: TokenKind::Comma,      text, loc},
                    '*' => Token {kind: TokenKind::Star,       text, loc},
                    _ => {
                        while let Some(x) = self.chars.next_if(is_ident_char) {
                            self.cnum += 1;
                            text.push(x)
                        }
                        Token{kind: TokenKind::Ident, text, loc}
                    }
                }
            }

            None => {
                self.exhausted = true;
                Token{kind: TokenKind::End, text: "".to_string(), loc}
            }
        }
    }
}

impl<Chars: Iterator<Item=char>> Iterator for Lexer<Chars> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            None
        } else {
            Some(self.next_token())
        }
    }
}

fn is_ident_char(x: &char) -> bool {
    !x.is_whitespace() && !"()*,".contains(*x)
}
