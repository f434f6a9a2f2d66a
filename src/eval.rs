use miette::{Diagnostic, Error, WrapErr};
use thiserror::Error;

use crate::{
    lex::{Token, TokenKind},
    parse::parse,
};

#[derive(Error, Debug, Diagnostic)]
#[error("Failed to evaluate: not enough operands for `{operator}`")]
#[diagnostic(help(
    "`{operator}` at postfix position {position} needs two operands but only {found} were available"
))]
pub struct InsufficientOperandsError {
    pub operator: char,
    pub position: usize,
    pub found: usize,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Failed to evaluate: unexpected `{token}` in postfix sequence")]
#[diagnostic(help("parentheses are resolved while parsing and never reach evaluation"))]
pub struct UnexpectedTokenError {
    pub token: char,
    pub position: usize,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Failed to evaluate: {count} values left without an operator")]
#[diagnostic(help("join the values with `+`, `-`, `*` or `/`"))]
pub struct LeftoverOperandsError {
    pub count: usize,
}

/// Reduces a postfix token sequence to a single number.
///
/// Returns `Ok(None)` for an empty sequence.
pub fn evaluate(tokens: impl IntoIterator<Item = Token>) -> Result<Option<f64>, Error> {
    let mut values: Vec<f64> = Vec::new();

    for (position, token) in tokens.into_iter().enumerate() {
        let kind = token.kind();
        let apply: fn(f64, f64) -> f64 = match kind {
            TokenKind::Number => {
                values.extend(token.value());
                continue;
            }
            TokenKind::Add => |a, b| a + b,
            TokenKind::Subtract => |a, b| a - b,
            TokenKind::Multiply => |a, b| a * b,
            TokenKind::Divide => |a, b| a / b,
            TokenKind::ParenOpen | TokenKind::ParenClose => {
                return Err(UnexpectedTokenError {
                    token: kind.symbol().unwrap_or('?'),
                    position,
                }
                .into());
            }
        };

        let found = values.len();
        // b was pushed last, so it is the right-hand side
        let (Some(b), Some(a)) = (values.pop(), values.pop()) else {
            return Err(InsufficientOperandsError {
                operator: kind.symbol().unwrap_or('?'),
                position,
                found,
            }
            .into());
        };
        values.push(apply(a, b));
    }

    match values.as_slice() {
        [] => Ok(None),
        [result] => Ok(Some(*result)),
        rest => Err(LeftoverOperandsError { count: rest.len() }.into()),
    }
}

/// Parses and evaluates `expression` in one go.
pub fn calculate(expression: &str) -> Result<Option<f64>, Error> {
    let tokens = parse(expression)?;
    evaluate(tokens).wrap_err_with(|| format!("while evaluating `{expression}`"))
}
