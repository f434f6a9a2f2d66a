use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

use crate::{
    Lexer,
    lex::{Lexeme, Token, TokenKind},
};

#[derive(Error, Debug, Diagnostic)]
#[error("Mismatched parentheses")]
#[diagnostic(help("add a matching `(` earlier or remove this `)`"))]
pub struct MismatchedParenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("no `(` left to close")]
    bad_bit: SourceSpan,
}

impl MismatchedParenError {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("Unclosed parenthesis")]
#[diagnostic(help("add a `)` to close the group"))]
pub struct UnclosedParenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this `(` is never closed")]
    bad_bit: SourceSpan,
}

impl UnclosedParenError {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

/// Shunting-yard parser turning an infix expression into postfix tokens.
pub struct Parser<'de> {
    lexer: Lexer<'de>,
    operators: Vec<Lexeme>,
    output: Vec<Token>,
}

impl<'de> Parser<'de> {
    pub fn new(filename: Option<&'de str>, whole: &'de str) -> Self {
        Parser {
            lexer: Lexer::new(filename, whole),
            operators: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Vec<Token>, Error> {
        while let Some(lexeme) = self.lexer.next() {
            let lexeme = lexeme?;
            match lexeme.token.kind() {
                TokenKind::Number => self.output.push(lexeme.token),
                TokenKind::ParenOpen => self.operators.push(lexeme),
                TokenKind::ParenClose => self.close_group(lexeme)?,
                TokenKind::Add | TokenKind::Subtract | TokenKind::Multiply | TokenKind::Divide => {
                    self.push_operator(lexeme)
                }
            }
        }

        while let Some(pending) = self.operators.pop() {
            if pending.token.kind() == TokenKind::ParenOpen {
                return Err(UnclosedParenError {
                    src: self.lexer.source(),
                    bad_bit: pending.span,
                }
                .into());
            }
            self.output.push(pending.token);
        }

        Ok(self.output)
    }

    fn close_group(&mut self, close: Lexeme) -> Result<(), Error> {
        loop {
            let Some(pending) = self.operators.pop() else {
                return Err(MismatchedParenError {
                    src: self.lexer.source(),
                    bad_bit: close.span,
                }
                .into());
            };
            if pending.token.kind() == TokenKind::ParenOpen {
                return Ok(());
            }
            self.output.push(pending.token);
        }
    }

    fn push_operator(&mut self, lexeme: Lexeme) {
        let precedence = lexeme.token.kind().precedence();
        while let Some(top) = self.operators.last() {
            // equal precedence pops too, so `10 - 2 - 3` groups to the left
            let kind = top.token.kind();
            if kind == TokenKind::ParenOpen || kind.precedence() < precedence {
                break;
            }
            self.output.push(top.token);
            self.operators.pop();
        }
        self.operators.push(lexeme);
    }
}

/// Converts `expression` into postfix order.
pub fn parse(expression: &str) -> Result<Vec<Token>, Error> {
    Parser::new(None, expression).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix(input: &str) -> String {
        parse(input)
            .unwrap()
            .iter()
            .map(Token::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(postfix("2 + 3 * 4"), "2 3 4 * +");
        assert_eq!(postfix("2 * 3 + 4"), "2 3 * 4 +");
    }

    #[test]
    fn same_precedence_is_left_associative() {
        assert_eq!(postfix("10 - 2 - 3"), "10 2 - 3 -");
        assert_eq!(postfix("100 / 10 / 2"), "100 10 / 2 /");
        assert_eq!(postfix("8 / 2 * 4"), "8 2 / 4 *");
    }

    #[test]
    fn parentheses_never_reach_the_output() {
        assert_eq!(postfix("(2 + 3) * 4"), "2 3 + 4 *");
        assert_eq!(postfix("((1 + 2) * (3 - 4))"), "1 2 + 3 4 - *");
    }

    #[test]
    fn adjacency_before_group_multiplies() {
        assert_eq!(postfix("2(3+4)"), "2 3 4 + *");
        assert_eq!(postfix("(1)(2)"), "1 2 *");
    }

    #[test]
    fn whitespace_is_insignificant() {
        assert_eq!(parse("1 + 2").unwrap(), parse("1+2").unwrap());
    }

    #[test]
    fn empty_input_gives_empty_sequence() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn stray_close_paren_is_mismatched() {
        let err = parse("1 + 2)").unwrap_err();
        let err = err.downcast_ref::<MismatchedParenError>().unwrap();
        assert_eq!(err.offset(), 5);
    }

    #[test]
    fn close_paren_does_not_match_across_groups() {
        assert!(
            parse("(1))")
                .unwrap_err()
                .downcast_ref::<MismatchedParenError>()
                .is_some()
        );
    }

    #[test]
    fn unclosed_open_paren_is_reported() {
        let err = parse("(1 + 2").unwrap_err();
        let err = err.downcast_ref::<UnclosedParenError>().unwrap();
        assert_eq!(err.offset(), 0);
    }

    #[test]
    fn lexing_errors_propagate() {
        assert!(
            parse("1 + x")
                .unwrap_err()
                .downcast_ref::<crate::lex::UnexpectedCharError>()
                .is_some()
        );
    }
}
