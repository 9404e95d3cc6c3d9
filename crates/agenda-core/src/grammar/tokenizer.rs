//! Command tokenizer
//!
//! Splits a command into whitespace-separated pieces and folds them into
//! tagged tokens. Multi-piece clauses (`a las 15:00`, `12 de mayo 2025`) become a
//! single token, so date and time validation lives here and nowhere else.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// `HH:M+`. The minute field is loose so a malformed minute still forms a
/// time clause and gets reported as a bad time.
static CLOCK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d+)$").unwrap());
static DAY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}$").unwrap());
static YEAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());

/// Command verbs. A command must open with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Agenda,
    Anota,
    Recordame,
}

impl Verb {
    pub const ALL: [Verb; 3] = [Verb::Agenda, Verb::Anota, Verb::Recordame];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Agenda => "agendá",
            Verb::Anota => "anotá",
            Verb::Recordame => "recordame",
        }
    }

    /// Case-insensitive lookup of a single word
    pub fn from_word(word: &str) -> Option<Self> {
        let lower = word.to_lowercase();
        Self::ALL.into_iter().find(|v| v.as_str() == lower)
    }

    /// Verb opening `piece`, with the byte length it covers. Trailing
    /// punctuation is allowed (`recordame,`), trailing letters are not.
    pub fn prefix_of(piece: &str) -> Option<(Self, usize)> {
        Self::ALL.into_iter().find_map(|verb| {
            let n = verb.as_str().chars().count();
            let len = piece.char_indices().nth(n).map_or(piece.len(), |(i, _)| i);
            let rest = &piece[len..];
            let bounded = !rest.starts_with(char::is_alphanumeric);
            (bounded && Self::from_word(&piece[..len]) == Some(verb)).then_some((verb, len))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Lunes,
    Martes,
    Miercoles,
    Jueves,
    Viernes,
    Sabado,
    Domingo,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Lunes,
        Weekday::Martes,
        Weekday::Miercoles,
        Weekday::Jueves,
        Weekday::Viernes,
        Weekday::Sabado,
        Weekday::Domingo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Lunes => "lunes",
            Weekday::Martes => "martes",
            Weekday::Miercoles => "miércoles",
            Weekday::Jueves => "jueves",
            Weekday::Viernes => "viernes",
            Weekday::Sabado => "sábado",
            Weekday::Domingo => "domingo",
        }
    }

    /// Accepts the accented and the plain spelling (`sábado` / `sabado`)
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "lunes" => Some(Weekday::Lunes),
            "martes" => Some(Weekday::Martes),
            "miércoles" | "miercoles" => Some(Weekday::Miercoles),
            "jueves" => Some(Weekday::Jueves),
            "viernes" => Some(Weekday::Viernes),
            "sábado" | "sabado" => Some(Weekday::Sabado),
            "domingo" => Some(Weekday::Domingo),
            _ => None,
        }
    }
}

/// The fixed list of month names a calendar date may use
pub const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// A month, stored as its 1-based number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month(u8);

impl Month {
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        MONTH_NAMES
            .iter()
            .position(|m| *m == lower)
            .map(|i| Month(i as u8 + 1))
    }

    pub fn from_number(number: u32) -> Option<Self> {
        (1..=12).contains(&number).then_some(Month(number as u8))
    }

    pub fn number(&self) -> u32 {
        self.0 as u32
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.0 as usize - 1]
    }
}

/// A recognized date clause. Calendar dates keep the raw month word so an
/// unknown month can be reported instead of silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateExpr {
    Today,
    Tomorrow,
    Weekday(Weekday),
    Calendar {
        day: u8,
        month: String,
        year: Option<u16>,
    },
}

impl DateExpr {
    pub fn month(&self) -> Option<Month> {
        match self {
            DateExpr::Calendar { month, .. } => Month::from_name(month),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            DateExpr::Calendar { .. } => self.month().is_some(),
            _ => true,
        }
    }
}

/// A `a las HH:MM` clause as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u8,
    pub minute_text: String,
}

impl ClockTime {
    /// Minute value, only when written with exactly two digits
    pub fn minute(&self) -> Option<u8> {
        if self.minute_text.len() != 2 {
            return None;
        }
        self.minute_text.parse().ok()
    }

    pub fn is_valid(&self) -> bool {
        self.hour <= 23 && self.minute().is_some_and(|m| m <= 59)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Verb(Verb),
    Date(DateExpr),
    Time(ClockTime),
    /// Purely alphabetic piece (accented letters included)
    Word,
    /// Anything else: digits, punctuation, mixed pieces
    Other,
}

/// A tagged slice of the command. `span` is a byte range into the tokenized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Range<usize>,
}

impl Token {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    /// Grammar notation used by the composed command rule
    pub fn notation(&self) -> &'static str {
        match &self.kind {
            TokenKind::Verb(_) => "<verb>",
            TokenKind::Date(date) if date.is_valid() => "<date>",
            TokenKind::Time(time) if time.is_valid() => "<time>",
            TokenKind::Word => "<word>",
            _ => "<other>",
        }
    }
}

/// Tokenize a command.
///
/// The verb is only recognized at the start of the first piece; punctuation
/// glued to it becomes a piece of its own. Time clauses win over date
/// clauses, which win over plain words.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut pieces = split_pieces(text);
    if let Some(&(start, first)) = pieces.first() {
        if let Some((_, len)) = Verb::prefix_of(first) {
            if len < first.len() {
                pieces[0] = (start, &first[..len]);
                pieces.insert(1, (start + len, &first[len..]));
            }
        }
    }
    let lower: Vec<String> = pieces.iter().map(|(_, p)| p.to_lowercase()).collect();

    let mut tokens = Vec::with_capacity(pieces.len());
    let mut i = 0;

    while i < pieces.len() {
        let verb = if i == 0 { Verb::from_word(&lower[0]) } else { None };

        let (consumed, kind) = if let Some(verb) = verb {
            (1, TokenKind::Verb(verb))
        } else if let Some((n, time)) = match_time(&lower[i..]) {
            (n, TokenKind::Time(time))
        } else if let Some((n, date)) = match_date(&lower[i..]) {
            (n, TokenKind::Date(date))
        } else if is_word(pieces[i].1) {
            (1, TokenKind::Word)
        } else {
            (1, TokenKind::Other)
        };

        let start = pieces[i].0;
        let (last_start, last) = pieces[i + consumed - 1];
        let end = last_start + last.len();

        tokens.push(Token {
            kind,
            text: text[start..end].to_string(),
            span: start..end,
        });
        i += consumed;
    }

    tokens
}

/// Whitespace-separated pieces with their byte offsets
fn split_pieces(text: &str) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                pieces.push((s, &text[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        pieces.push((s, &text[s..]));
    }

    pieces
}

fn is_word(piece: &str) -> bool {
    !piece.is_empty() && piece.chars().all(char::is_alphabetic)
}

/// `a las HH:MM`
fn match_time(rest: &[String]) -> Option<(usize, ClockTime)> {
    if rest.len() < 3 || rest[0] != "a" || rest[1] != "las" {
        return None;
    }
    let caps = CLOCK_REGEX.captures(&rest[2])?;
    let hour = caps[1].parse().ok()?;

    Some((
        3,
        ClockTime {
            hour,
            minute_text: caps[2].to_string(),
        },
    ))
}

/// `hoy`, `mañana`, a weekday, or `DD de <mes>[ YYYY]`
fn match_date(rest: &[String]) -> Option<(usize, DateExpr)> {
    let first = rest.first()?;

    match first.as_str() {
        "hoy" => return Some((1, DateExpr::Today)),
        "mañana" => return Some((1, DateExpr::Tomorrow)),
        _ => {}
    }
    if let Some(day) = Weekday::from_word(first) {
        return Some((1, DateExpr::Weekday(day)));
    }

    if rest.len() < 3 || !DAY_REGEX.is_match(first) || rest[1] != "de" || !is_word(&rest[2]) {
        return None;
    }
    let day = first.parse().ok()?;
    let year = rest
        .get(3)
        .filter(|y| YEAR_REGEX.is_match(y))
        .and_then(|y| y.parse().ok());
    let consumed = if year.is_some() { 4 } else { 3 };

    Some((
        consumed,
        DateExpr::Calendar {
            day,
            month: rest[2].clone(),
            year,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<&'static str> {
        tokenize(text).iter().map(Token::notation).collect()
    }

    #[test]
    fn test_full_command_tokens() {
        assert_eq!(
            kinds("agendá reunión con Juan el viernes a las 15:00"),
            vec!["<verb>", "<word>", "<word>", "<word>", "<word>", "<date>", "<time>"]
        );
    }

    #[test]
    fn test_verb_is_case_insensitive() {
        let tokens = tokenize("AGENDÁ algo");
        assert_eq!(tokens[0].kind, TokenKind::Verb(Verb::Agenda));
        let tokens = tokenize("Recordame algo");
        assert_eq!(tokens[0].kind, TokenKind::Verb(Verb::Recordame));
    }

    #[test]
    fn test_verb_with_trailing_punctuation() {
        let tokens = tokenize("Recordame, pagar");
        assert_eq!(tokens[0].kind, TokenKind::Verb(Verb::Recordame));
        assert_eq!(tokens[0].text, "Recordame");
        assert_eq!(tokens[1].text, ",");
        assert_eq!(tokens[1].span, 9..10);
        assert_eq!(kinds("agendá: reunión"), vec!["<verb>", "<other>", "<word>"]);
    }

    #[test]
    fn test_verb_prefix_needs_word_boundary() {
        assert_eq!(kinds("recordamelo mañana"), vec!["<word>", "<date>"]);
        assert_eq!(Verb::prefix_of("AGENDÁ"), Some((Verb::Agenda, "AGENDÁ".len())));
        assert_eq!(Verb::prefix_of("anotá2"), None);
    }

    #[test]
    fn test_verb_only_at_start() {
        let tokens = tokenize("hola agendá");
        assert_eq!(tokens[1].kind, TokenKind::Word);
    }

    #[test]
    fn test_calendar_date_with_year() {
        let tokens = tokenize("anotá cena 15 de marzo 2024");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].text, "15 de marzo 2024");
        assert_eq!(
            tokens[2].kind,
            TokenKind::Date(DateExpr::Calendar {
                day: 15,
                month: "marzo".to_string(),
                year: Some(2024),
            })
        );
    }

    #[test]
    fn test_unknown_month_is_kept_as_invalid_date() {
        let tokens = tokenize("anotá cita 12 de foo");
        match &tokens[2].kind {
            TokenKind::Date(date) => {
                assert!(!date.is_valid());
                assert_eq!(date.month(), None);
            }
            other => panic!("expected date, got {:?}", other),
        }
        assert_eq!(tokens[2].notation(), "<other>");
    }

    #[test]
    fn test_time_validity() {
        let clock = |hour, minute: &str| ClockTime {
            hour,
            minute_text: minute.to_string(),
        };
        assert!(clock(23, "59").is_valid());
        assert!(!clock(24, "00").is_valid());
        assert!(!clock(15, "60").is_valid());
        assert!(!clock(9, "5").is_valid());
    }

    #[test]
    fn test_spans_point_into_original_text() {
        let text = "recordame  pagar   mañana";
        for token in tokenize(text) {
            assert_eq!(&text[token.span.clone()], token.text);
        }
    }

    #[test]
    fn test_digits_and_punctuation_are_other() {
        assert_eq!(kinds("anotá algo, 15hs"), vec!["<verb>", "<other>", "<other>"]);
    }

    #[test]
    fn test_incomplete_time_clause_is_words() {
        assert_eq!(kinds("anotá a las"), vec!["<verb>", "<word>", "<word>"]);
    }

    #[test]
    fn test_month_lookup() {
        assert_eq!(Month::from_name("Mayo").map(|m| m.number()), Some(5));
        assert_eq!(Month::from_number(12).map(|m| m.name()), Some("diciembre"));
        assert_eq!(Month::from_number(13), None);
    }

    #[test]
    fn test_weekday_spellings() {
        assert_eq!(Weekday::from_word("sabado"), Some(Weekday::Sabado));
        assert_eq!(Weekday::from_word("Miércoles"), Some(Weekday::Miercoles));
    }
}
