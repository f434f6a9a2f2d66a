use std::{fmt::Display, ops::Range};

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("Unexpected character '{token}'")]
#[diagnostic(help("only digits, `.`, `+`, `-`, `*`, `/`, `(` and `)` are allowed"))]
pub struct UnexpectedCharError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this character")]
    bad_bit: SourceSpan,

    pub token: char,
}

impl UnexpectedCharError {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("Invalid number literal `{literal}`")]
#[diagnostic(help("a number is digits with at most one decimal point, like `12` or `1.5`"))]
pub struct InvalidNumberError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this numeric literal")]
    bad_bit: SourceSpan,

    pub literal: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    ParenOpen,
    ParenClose,
    Number,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl TokenKind {
    pub fn from_symbol(c: char) -> Option<Self> {
        Some(match c {
            '+' => TokenKind::Add,
            '-' => TokenKind::Subtract,
            '*' => TokenKind::Multiply,
            '/' => TokenKind::Divide,
            '(' => TokenKind::ParenOpen,
            ')' => TokenKind::ParenClose,
            _ => return None,
        })
    }

    pub fn symbol(self) -> Option<char> {
        match self {
            TokenKind::ParenOpen => Some('('),
            TokenKind::ParenClose => Some(')'),
            TokenKind::Number => None,
            TokenKind::Add => Some('+'),
            TokenKind::Subtract => Some('-'),
            TokenKind::Multiply => Some('*'),
            TokenKind::Divide => Some('/'),
        }
    }

    /// Binding strength used while reordering into postfix.
    ///
    /// Only the four arithmetic operators have one.
    pub fn precedence(self) -> Option<u8> {
        match self {
            TokenKind::Add | TokenKind::Subtract => Some(1),
            TokenKind::Multiply | TokenKind::Divide => Some(2),
            TokenKind::ParenOpen | TokenKind::ParenClose | TokenKind::Number => None,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::ParenOpen => write!(f, "LEFT_PAREN"),
            TokenKind::ParenClose => write!(f, "RIGHT_PAREN"),
            TokenKind::Number => write!(f, "NUMBER"),
            TokenKind::Add => write!(f, "PLUS"),
            TokenKind::Subtract => write!(f, "MINUS"),
            TokenKind::Multiply => write!(f, "STAR"),
            TokenKind::Divide => write!(f, "SLASH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Number(f64),
    Symbol(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    kind: TokenKind,
    literal: Literal,
}

impl Token {
    pub fn number(value: f64) -> Self {
        Token {
            kind: TokenKind::Number,
            literal: Literal::Number(value),
        }
    }

    /// Operator or parenthesis token for `c`, if `c` is one.
    pub fn symbol(c: char) -> Option<Self> {
        TokenKind::from_symbol(c).map(|kind| Token {
            kind,
            literal: Literal::Symbol(c),
        })
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn literal(&self) -> Literal {
        self.literal
    }

    pub fn value(&self) -> Option<f64> {
        match self.literal {
            Literal::Number(n) => Some(n),
            Literal::Symbol(_) => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.literal {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Symbol(c) => write!(f, "{c}"),
        }
    }
}

/// A token together with where it came from in the original expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: SourceSpan,
}

impl Display for Lexeme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = self.token.kind;
        let lit = self.token;
        match self.token.literal {
            Literal::Number(n) if n == n.trunc() => write!(f, "{kind} {lit} {n}.0"),
            Literal::Number(n) => write!(f, "{kind} {lit} {n}"),
            Literal::Symbol(_) => write!(f, "{kind} {lit} null"),
        }
    }
}

/// Expression text with whitespace removed and implicit multiplication made
/// explicit. Every byte remembers its offset in the original input.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    text: String,
    origin: Vec<usize>,
}

impl Normalized {
    pub fn new(input: &str) -> Self {
        let mut text = String::with_capacity(input.len());
        let mut origin = Vec::with_capacity(input.len());

        for (offset, c) in input.char_indices() {
            if c.is_whitespace() {
                continue;
            }
            // `2(3)` and `(1)(2)` multiply, `((1))` and `1+(2)` do not
            let implicit = c == '('
                && text
                    .chars()
                    .next_back()
                    .is_some_and(|prev| !matches!(prev, '+' | '-' | '*' | '/' | '('));
            if implicit {
                text.push('*');
                origin.push(offset);
            }
            text.push(c);
            origin.extend(offset..offset + c.len_utf8());
        }

        Normalized { text, origin }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Maps a non-empty byte range of the normalized text back onto the input.
    pub fn span(&self, range: Range<usize>) -> SourceSpan {
        let start = self.origin[range.start];
        let end = self.origin[range.end - 1] + 1;
        SourceSpan::from(start..end)
    }
}

pub struct Lexer<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
    normalized: Normalized,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str) -> Self {
        Lexer {
            filename,
            whole: input,
            normalized: Normalized::new(input),
            byte: 0,
        }
    }

    pub(crate) fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.to_string())
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Lexeme, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.normalized.as_str()[self.byte..];
        let c = rest.chars().next()?;
        let start = self.byte;

        if matches!(c, '0'..='9' | '.') {
            let end = rest
                .find(|c| !matches!(c, '0'..='9' | '.'))
                .unwrap_or(rest.len());
            let literal = &rest[..end];
            self.byte += end;
            let span = self.normalized.span(start..self.byte);

            return Some(match literal.parse() {
                Ok(n) => Ok(Lexeme {
                    token: Token::number(n),
                    span,
                }),
                Err(_) => Err(InvalidNumberError {
                    src: self.source(),
                    bad_bit: span,
                    literal: literal.to_string(),
                }
                .into()),
            });
        }

        self.byte += c.len_utf8();
        let span = self.normalized.span(start..self.byte);

        let Some(token) = Token::symbol(c) else {
            return Some(Err(UnexpectedCharError {
                src: self.source(),
                bad_bit: span,
                token: c,
            }
            .into()));
        };

        Some(Ok(Lexeme { token, span }))
    }
}
