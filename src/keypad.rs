use miette::{Diagnostic, Error};
use thiserror::Error;

use crate::calculate;

#[derive(Error, Debug, Diagnostic)]
#[error("Unknown key `{label}`")]
#[diagnostic(help("keys are digits, `.`, `+`, `-`, `*`, `/`, `(`, `)`, `C`, `⌫` and `=`"))]
pub struct UnknownKeyError {
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(char),
    Point,
    /// Any of `+ - * / ( )`.
    Operator(char),
    Clear,
    Backspace,
    Equals,
}

impl Key {
    pub fn from_label(label: &str) -> Result<Self, Error> {
        let mut chars = label.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c @ '0'..='9'), None) => Key::Digit(c),
            (Some('.'), None) => Key::Point,
            (Some(c @ ('+' | '-' | '*' | '/' | '(' | ')')), None) => Key::Operator(c),
            (Some('×'), None) => Key::Operator('*'),
            (Some('÷'), None) => Key::Operator('/'),
            (Some('C'), None) => Key::Clear,
            (Some('⌫'), None) => Key::Backspace,
            (Some('='), None) => Key::Equals,
            _ => {
                return Err(UnknownKeyError {
                    label: label.to_string(),
                }
                .into());
            }
        };
        Ok(key)
    }
}

/// Input line of a calculator keypad.
///
/// Owns the text being typed; every key press edits it in place and `=`
/// replaces it with the result.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Keypad {
    display: String,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn press(&mut self, key: Key) -> Result<(), Error> {
        match key {
            Key::Digit(c) => self.push_numeric(c),
            Key::Point => self.push_numeric('.'),
            Key::Operator(c) => self.push_spaced(c),
            Key::Clear => self.display.clear(),
            Key::Backspace => {
                self.display.pop();
                self.display = self.display.trim().to_string();
            }
            Key::Equals => self.equals()?,
        }
        Ok(())
    }

    pub fn press_all<'a>(
        &mut self,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), Error> {
        for label in labels {
            self.press(Key::from_label(label)?)?;
        }
        Ok(())
    }

    /// Digits and points continue the number being typed.
    fn push_numeric(&mut self, c: char) {
        if self.display.ends_with(|last: char| last.is_ascii_digit() || last == '.') {
            self.display.push(c);
        } else {
            self.push_spaced(c);
        }
    }

    fn push_spaced(&mut self, c: char) {
        if !self.display.is_empty() {
            self.display.push(' ');
        }
        self.display.push(c);
    }

    /// On failure the display keeps the expression so it can be corrected.
    fn equals(&mut self) -> Result<(), Error> {
        if self.display.is_empty() {
            return Ok(());
        }
        self.display = match calculate(&self.display)? {
            Some(result) => format_number(result),
            None => String::new(),
        };
        Ok(())
    }
}

/// Formats a result the way a calculator display shows it.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        // no `-0`
        "0".to_string()
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_builds_a_spaced_expression() {
        let mut keypad = Keypad::new();
        keypad.press_all(["1", "2", ".", "5", "×", "(", "3", "-", "1", ")"]).unwrap();
        assert_eq!(keypad.display(), "12.5 * ( 3 - 1 )");
    }

    #[test]
    fn equals_replaces_the_display() {
        let mut keypad = Keypad::new();
        keypad.press_all(["1", "2", "+", "3", "="]).unwrap();
        assert_eq!(keypad.display(), "15");

        // the result can be built on
        keypad.press_all(["÷", "2", "="]).unwrap();
        assert_eq!(keypad.display(), "7.5");
    }

    #[test]
    fn digits_after_a_result_extend_it() {
        let mut keypad = Keypad::new();
        keypad.press_all(["4", "=", "2"]).unwrap();
        assert_eq!(keypad.display(), "42");
    }

    #[test]
    fn equals_on_empty_display_does_nothing() {
        let mut keypad = Keypad::new();
        keypad.press(Key::Equals).unwrap();
        assert_eq!(keypad.display(), "");
    }

    #[test]
    fn failed_equals_keeps_the_input() {
        let mut keypad = Keypad::new();
        keypad.press_all(["(", "1", "+", "2"]).unwrap();
        assert!(keypad.press(Key::Equals).is_err());
        assert_eq!(keypad.display(), "( 1 + 2");
    }

    #[test]
    fn backspace_and_clear() {
        let mut keypad = Keypad::new();
        keypad.press_all(["1", "+", "2", "3"]).unwrap();
        keypad.press(Key::Backspace).unwrap();
        assert_eq!(keypad.display(), "1 + 2");
        keypad.press(Key::Backspace).unwrap();
        assert_eq!(keypad.display(), "1 +");
        keypad.press(Key::Clear).unwrap();
        assert_eq!(keypad.display(), "");
        keypad.press(Key::Backspace).unwrap();
        assert_eq!(keypad.display(), "");
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let err = Key::from_label("sin").unwrap_err();
        assert_eq!(err.downcast_ref::<UnknownKeyError>().unwrap().label, "sin");
        assert!(Key::from_label("").is_err());
    }

    #[test]
    fn formats_like_a_display() {
        assert_eq!(format_number(14.0), "14");
        assert_eq!(format_number(3.75), "3.75");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }
}
