//! Whole-command conformance gate.
//!
//! Stricter than the per-field checks: a command can carry a verb, words, a
//! date and a time and still be rejected here when the clauses are out of
//! order or something stray sits between them.

use super::rules::{notation, COMMAND_RULE};
use super::tokenizer::{tokenize, Token};
use once_cell::sync::Lazy;
use regex::Regex;

static COMMAND_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(COMMAND_RULE).unwrap());

/// Error reported whenever the composed rule fails
pub const GRAMMAR_ERROR: &str = "Formato inválido según gramática";

pub fn conforms(tokens: &[Token]) -> bool {
    COMMAND_REGEX.is_match(&notation(tokens))
}

pub fn conforms_text(text: &str) -> bool {
    conforms(&tokenize(text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conforming_commands() {
        assert!(conforms_text("agendá reunión con Juan el viernes a las 15:00"));
        assert!(conforms_text("Recordame pagar la factura de luz mañana"));
        assert!(conforms_text("anotá cena con amigos 15 de marzo 2024 a las 21:00"));
        assert!(conforms_text("recordame reunión"));
        assert!(conforms_text("agendá"));
    }

    #[test]
    fn test_time_before_date_fails() {
        assert!(!conforms_text("agendá reunión a las 15:00 el viernes"));
    }

    #[test]
    fn test_date_inside_description_fails() {
        // Every field is present, the ordering is not
        assert!(!conforms_text("agendá hoy reunión con Juan a las 10:00"));
    }

    #[test]
    fn test_stray_characters_fail() {
        assert!(!conforms_text("agendá reunión, con Juan mañana"));
        assert!(!conforms_text("agendá reunión mañana !"));
    }

    #[test]
    fn test_invalid_clauses_fail() {
        assert!(!conforms_text("agendá reunión 12 de foo"));
        assert!(!conforms_text("agendá reunión mañana a las 24:00"));
    }

    #[test]
    fn test_missing_verb_fails() {
        assert!(!conforms_text("El lunes tengo que llevar el auto al mecánico"));
        assert!(!conforms_text(""));
    }
}
