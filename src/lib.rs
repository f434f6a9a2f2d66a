pub mod eval;
pub mod keypad;
pub mod lex;
pub mod parse;

pub use eval::{
    InsufficientOperandsError, LeftoverOperandsError, UnexpectedTokenError, calculate, evaluate,
};
pub use keypad::{Key, Keypad, UnknownKeyError, format_number};
pub use lex::{
    InvalidNumberError, Lexeme, Lexer, Literal, Token, TokenKind, UnexpectedCharError,
};
pub use parse::{MismatchedParenError, Parser, UnclosedParenError, parse};
