//! Spanish command grammar: tokenizer, field recognizers, the declarative
//! rule set, the conformance gate and the keystroke validator.

pub mod conformance;
pub mod patterns;
pub mod rules;
pub mod tokenizer;
pub mod validator;

pub use conformance::{conforms, conforms_text, GRAMMAR_ERROR};
pub use rules::{Field, FieldRule, EMPTY_HINT, FIELD_RULES};
pub use tokenizer::{tokenize, ClockTime, DateExpr, Month, Token, TokenKind, Verb, Weekday};
pub use validator::{validate, FieldCompletion, ValidationState};
