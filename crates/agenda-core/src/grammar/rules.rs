//! Declarative command grammar
//!
//! The grammar is data: an ordered list of field rules (which also drives the
//! next-step hint) and one composed rule matched over the token notation
//! string. Both the validator and the conformance gate read from here.

use super::patterns;
use super::tokenizer::Token;
use serde::Serialize;

/// A grammatical slot of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Verb,
    Description,
    Date,
    Time,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Verb => "verbo",
            Field::Description => "descripción",
            Field::Date => "fecha",
            Field::Time => "hora",
        }
    }
}

/// A field requirement and the hint shown while it is unmet
pub struct FieldRule {
    pub field: Field,
    pub hint: &'static str,
    pub satisfied: fn(&[Token]) -> bool,
}

/// Hint for an empty command
pub const EMPTY_HINT: &str = "Empezá con un verbo: agendá, anotá o recordame";

/// Field rules in hint priority order
pub static FIELD_RULES: [FieldRule; 4] = [
    FieldRule {
        field: Field::Verb,
        hint: "El comando debe empezar con agendá, anotá o recordame",
        satisfied: patterns::has_verb,
    },
    FieldRule {
        field: Field::Description,
        hint: "Agregá una descripción después del verbo (por ejemplo: reunión con Juan)",
        satisfied: patterns::has_description,
    },
    FieldRule {
        field: Field::Date,
        hint: "Agregá una fecha: hoy, mañana, un día de la semana o \"12 de mayo\"",
        satisfied: patterns::has_date,
    },
    FieldRule {
        field: Field::Time,
        hint: "Agregá una hora: \"a las 15:30\"",
        satisfied: patterns::has_time,
    },
];

/// Composed rule: verb, any number of description words, an optional date
/// with a known month, an optional in-range time. Anchored at both ends.
pub const COMMAND_RULE: &str = r"^<verb>(<word>)*(<date>)?(<time>)?$";

/// Render tokens as the notation string the composed rule is written against
pub fn notation(tokens: &[Token]) -> String {
    tokens.iter().map(Token::notation).collect()
}

/// Rule for a field
pub fn rule_for(field: Field) -> &'static FieldRule {
    match field {
        Field::Verb => &FIELD_RULES[0],
        Field::Description => &FIELD_RULES[1],
        Field::Date => &FIELD_RULES[2],
        Field::Time => &FIELD_RULES[3],
    }
}
