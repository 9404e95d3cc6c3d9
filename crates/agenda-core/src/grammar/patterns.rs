//! Field recognizers for the four command slots: verb, description, date, time.
//!
//! Each recognizer comes in two flavours: one over an already tokenized command
//! (used by the validator, which tokenizes once per keystroke) and a text
//! convenience wrapper.

use super::tokenizer::{tokenize, ClockTime, DateExpr, Token, TokenKind, Verb};

/// The opening verb, if the command starts with one
pub fn verb_of(tokens: &[Token]) -> Option<Verb> {
    match tokens.first().map(|t| &t.kind) {
        Some(TokenKind::Verb(verb)) => Some(*verb),
        _ => None,
    }
}

/// Words immediately following the verb, up to the first non-word token
pub fn description_of(tokens: &[Token]) -> Option<String> {
    verb_of(tokens)?;

    let words: Vec<&str> = tokens[1..]
        .iter()
        .take_while(|t| t.is_word())
        .map(|t| t.text.as_str())
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// First date clause with a known month
pub fn date_of(tokens: &[Token]) -> Option<&DateExpr> {
    tokens.iter().find_map(|t| match &t.kind {
        TokenKind::Date(date) if date.is_valid() => Some(date),
        _ => None,
    })
}

/// First in-range time clause
pub fn time_of(tokens: &[Token]) -> Option<&ClockTime> {
    tokens.iter().find_map(|t| match &t.kind {
        TokenKind::Time(time) if time.is_valid() => Some(time),
        _ => None,
    })
}

pub fn has_verb(tokens: &[Token]) -> bool {
    verb_of(tokens).is_some()
}

pub fn has_description(tokens: &[Token]) -> bool {
    description_of(tokens).is_some()
}

pub fn has_date(tokens: &[Token]) -> bool {
    date_of(tokens).is_some()
}

pub fn has_time(tokens: &[Token]) -> bool {
    time_of(tokens).is_some()
}

pub fn extract_verb(text: &str) -> Option<Verb> {
    verb_of(&tokenize(text))
}

pub fn extract_description(text: &str) -> Option<String> {
    description_of(&tokenize(text))
}

pub fn extract_date(text: &str) -> Option<DateExpr> {
    date_of(&tokenize(text)).cloned()
}

pub fn extract_time(text: &str) -> Option<ClockTime> {
    time_of(&tokenize(text)).cloned()
}

/// One row of the pattern reference shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRow {
    pub kind: &'static str,
    pub pattern: &'static str,
    pub example: &'static str,
}

pub const COMMAND_PATTERNS: [PatternRow; 4] = [
    PatternRow {
        kind: "evento",
        pattern: "Agendá [evento] [fecha] a las [hora]",
        example: "Agendá reunión importante martes a las 14:00",
    },
    PatternRow {
        kind: "evento",
        pattern: "Anotá [evento] [fecha] a las [hora]",
        example: "Anotá cena con amigos 15 de marzo 2024 a las 21:00",
    },
    PatternRow {
        kind: "recordatorio",
        pattern: "Recordame [tarea] [fecha]",
        example: "Recordame reunión lunes",
    },
    PatternRow {
        kind: "recordatorio",
        pattern: "Recordame [tarea] [fecha] a las [hora]",
        example: "Recordame sacar la basura lunes a las 15:00",
    },
];

pub const DATE_PATTERNS: [PatternRow; 5] = [
    PatternRow {
        kind: "fecha",
        pattern: "mañana",
        example: "mañana",
    },
    PatternRow {
        kind: "fecha",
        pattern: "hoy",
        example: "hoy",
    },
    PatternRow {
        kind: "fecha",
        pattern: "[día de la semana]",
        example: "lunes, martes, etc.",
    },
    PatternRow {
        kind: "fecha",
        pattern: "[número] de [mes]",
        example: "12 de mayo",
    },
    PatternRow {
        kind: "fecha",
        pattern: "[número] de [mes] [año]",
        example: "15 de marzo 2024",
    },
];

pub const TIME_PATTERNS: [PatternRow; 1] = [PatternRow {
    kind: "hora",
    pattern: "a las [hora]:[minutos]",
    example: "a las 15:30",
}];
