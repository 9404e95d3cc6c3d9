//! Keystroke validator
//!
//! `validate` is a pure function of the command text. It is re-run in full on
//! every edit; there is no state carried between calls.

use super::conformance::{conforms, GRAMMAR_ERROR};
use super::rules::{Field, EMPTY_HINT, FIELD_RULES};
use super::tokenizer::{tokenize, Token, TokenKind};
use serde::Serialize;

pub const MIN_LENGTH: usize = 5;
pub const MAX_LENGTH: usize = 200;

pub const TOO_SHORT_ERROR: &str = "El comando es muy corto (mínimo 5 caracteres)";
pub const TOO_LONG_ERROR: &str = "El comando es muy largo (máximo 200 caracteres)";
pub const INVALID_MONTH_ERROR: &str = "Mes inválido";
pub const INVALID_TIME_ERROR: &str = "Hora inválida (usá HH:MM entre 00:00 y 23:59)";
pub const DESCRIPTION_CHARS_ERROR: &str = "La descripción solo puede contener letras y espacios";

/// Which fields the current text satisfies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldCompletion {
    pub verb: bool,
    pub description: bool,
    pub date: bool,
    pub time: bool,
}

impl FieldCompletion {
    pub fn get(&self, field: Field) -> bool {
        match field {
            Field::Verb => self.verb,
            Field::Description => self.description,
            Field::Date => self.date,
            Field::Time => self.time,
        }
    }

    fn set(&mut self, field: Field, done: bool) {
        match field {
            Field::Verb => self.verb = done,
            Field::Description => self.description = done,
            Field::Date => self.date = done,
            Field::Time => self.time = done,
        }
    }

    pub fn all(&self) -> bool {
        self.verb && self.description && self.date && self.time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationState {
    /// First unmet requirement, empty once every field is present
    pub hint: String,
    /// Structural problems, in check order. Independent of `hint`.
    pub errors: Vec<String>,
    pub fields: FieldCompletion,
    /// The text was empty after trimming
    pub blank: bool,
}

impl Default for ValidationState {
    fn default() -> Self {
        validate("")
    }
}

impl ValidationState {
    /// Submission needs something to send and no structural errors
    pub fn can_submit(&self) -> bool {
        !self.blank && self.errors.is_empty()
    }
}

pub fn validate(text: &str) -> ValidationState {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return ValidationState {
            hint: EMPTY_HINT.to_string(),
            errors: Vec::new(),
            fields: FieldCompletion::default(),
            blank: true,
        };
    }

    let tokens = tokenize(trimmed);

    let mut fields = FieldCompletion::default();
    let mut hint = None;
    for rule in FIELD_RULES.iter() {
        let done = (rule.satisfied)(&tokens);
        fields.set(rule.field, done);
        if !done && hint.is_none() {
            hint = Some(rule.hint);
        }
    }

    ValidationState {
        hint: hint.unwrap_or_default().to_string(),
        errors: structural_errors(trimmed, &tokens),
        fields,
        blank: false,
    }
}

fn structural_errors(text: &str, tokens: &[Token]) -> Vec<String> {
    let mut errors = Vec::new();

    let length = text.chars().count();
    if length < MIN_LENGTH {
        errors.push(TOO_SHORT_ERROR.to_string());
    } else if length > MAX_LENGTH {
        errors.push(TOO_LONG_ERROR.to_string());
    }

    if tokens
        .iter()
        .any(|t| matches!(&t.kind, TokenKind::Date(date) if !date.is_valid()))
    {
        errors.push(INVALID_MONTH_ERROR.to_string());
    }

    if tokens
        .iter()
        .any(|t| matches!(&t.kind, TokenKind::Time(time) if !time.is_valid()))
    {
        errors.push(INVALID_TIME_ERROR.to_string());
    }

    // With verb, date and time clauses folded into their own tokens, whatever
    // is left as Other belongs to the description
    if tokens.iter().any(|t| t.kind == TokenKind::Other) {
        errors.push(DESCRIPTION_CHARS_ERROR.to_string());
    }

    if !conforms(tokens) {
        errors.push(GRAMMAR_ERROR.to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::rules::rule_for;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_text() {
        let state = validate("   ");
        assert_eq!(state.hint, EMPTY_HINT);
        assert!(state.errors.is_empty());
        assert!(state.blank);
        assert!(!state.can_submit());
    }

    #[test]
    fn test_complete_command() {
        let state = validate("agendá reunión con Juan el viernes a las 15:00");
        assert_eq!(state.hint, "");
        assert!(state.fields.all());
        assert!(state.errors.is_empty(), "{:?}", state.errors);
        assert!(state.can_submit());
    }

    #[test]
    fn test_missing_verb() {
        let state = validate("reunión con Juan mañana");
        assert_eq!(state.hint, rule_for(Field::Verb).hint);
        assert!(!state.fields.verb);
        assert!(state.errors.contains(&GRAMMAR_ERROR.to_string()));
        assert!(!state.can_submit());
    }

    #[test]
    fn test_verb_followed_by_punctuation() {
        let state = validate("Recordame, pagar la factura mañana");
        assert!(state.fields.verb);
        assert_ne!(state.hint, rule_for(Field::Verb).hint);
        assert!(state.errors.contains(&GRAMMAR_ERROR.to_string()));

        let state = validate("agendá: reunión mañana a las 10:00");
        assert!(state.fields.verb);
        assert_ne!(state.hint, rule_for(Field::Verb).hint);
    }

    #[test]
    fn test_hint_priority() {
        assert_eq!(validate("agendá").hint, rule_for(Field::Description).hint);
        assert_eq!(validate("agendá reunión").hint, rule_for(Field::Date).hint);
        assert_eq!(validate("agendá reunión mañana").hint, rule_for(Field::Time).hint);
        // Time present but date missing still asks for the date first
        assert_eq!(
            validate("agendá reunión a las 10:00").hint,
            rule_for(Field::Date).hint
        );
    }

    #[test]
    fn test_missing_time_does_not_block_submission() {
        let state = validate("recordame reunión lunes");
        assert!(!state.hint.is_empty());
        assert!(state.can_submit());
    }

    #[test]
    fn test_time_bounds() {
        let late = validate("agendá reunión mañana a las 24:00");
        assert!(late.errors.contains(&INVALID_TIME_ERROR.to_string()));
        let bad_minute = validate("agendá reunión mañana a las 15:60");
        assert!(bad_minute.errors.contains(&INVALID_TIME_ERROR.to_string()));
        let short_minute = validate("agendá reunión mañana a las 15:5");
        assert!(short_minute.errors.contains(&INVALID_TIME_ERROR.to_string()));
        let ok = validate("agendá reunión mañana a las 23:59");
        assert!(ok.errors.is_empty(), "{:?}", ok.errors);
    }

    #[test]
    fn test_month_validity() {
        let bad = validate("anotá cita 12 de foo");
        assert!(bad.errors.contains(&INVALID_MONTH_ERROR.to_string()));
        let good = validate("anotá cita 12 de mayo");
        assert!(!good.errors.contains(&INVALID_MONTH_ERROR.to_string()));
        assert!(good.errors.is_empty(), "{:?}", good.errors);
    }

    #[test]
    fn test_length_bounds() {
        let short = validate("ab");
        assert!(short.errors.contains(&TOO_SHORT_ERROR.to_string()));

        let long = format!("agendá {}", "palabra ".repeat(30));
        let state = validate(&long);
        assert!(state.errors.contains(&TOO_LONG_ERROR.to_string()));
    }

    #[test]
    fn test_description_characters() {
        let state = validate("agendá reunión #1 mañana");
        assert_eq!(
            state.errors,
            vec![DESCRIPTION_CHARS_ERROR.to_string(), GRAMMAR_ERROR.to_string()]
        );
    }

    #[test]
    fn test_fields_pass_but_grammar_fails() {
        let state = validate("agendá reunión a las 10:00 mañana");
        assert!(state.fields.all());
        assert_eq!(state.hint, "");
        assert_eq!(state.errors, vec![GRAMMAR_ERROR.to_string()]);
        assert!(!state.can_submit());
    }

    #[test]
    fn test_idempotent() {
        for text in ["", "agendá", "anotá cita 12 de foo", "recordame x a las 25:00"] {
            assert_eq!(validate(text), validate(text));
        }
    }
}
