//! Saved agenda actions and the paginated listing over them

use crate::grammar::{Month, Weekday};
use chrono::{Datelike, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 5;

static CALENDAR_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{1,2}) de ([a-záéíóúñ]+)(?: (\d{4}))?$").unwrap());
static ISO_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: i64,
    #[serde(default)]
    pub user_name: Option<String>,
    pub description: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Action {
    pub fn kind_label(&self) -> &'static str {
        if self.kind == "evento" {
            "Evento"
        } else {
            "Recordatorio"
        }
    }

    pub fn display_date(&self) -> String {
        format_date(&self.date)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human-readable form of a backend date string
pub fn format_date(date: &str) -> String {
    let lower = date.to_lowercase();
    if lower == "hoy" || lower == "mañana" || Weekday::from_word(&lower).is_some() {
        return capitalize(date);
    }

    if ISO_PREFIX.is_match(date) {
        return match date
            .get(..16)
            .and_then(|prefix| NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M").ok())
        {
            Some(moment) => format_moment(&moment),
            None => date.to_string(),
        };
    }

    if let Some(caps) = CALENDAR_DATE.captures(date) {
        let month = capitalize(&caps[2]);
        return match caps.get(3) {
            Some(year) => format!("{} de {} de {}", &caps[1], month, year.as_str()),
            None => format!("{} de {}", &caps[1], month),
        };
    }

    date.to_string()
}

/// `jueves 3 de julio de 2025 a las 10:00`
fn format_moment(moment: &NaiveDateTime) -> String {
    let weekday = Weekday::ALL[moment.weekday().num_days_from_monday() as usize];
    let month = Month::from_number(moment.month()).map_or("", |m| m.name());
    format!(
        "{} {} de {} de {} a las {:02}:{:02}",
        weekday.name(),
        moment.day(),
        month,
        moment.year(),
        moment.hour(),
        moment.minute()
    )
}

/// One page of the user's actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaListing {
    page: u32,
    page_size: u32,
    actions: Vec<Action>,
    pub loading: bool,
}

impl Default for AgendaListing {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl AgendaListing {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            actions: Vec::new(),
            loading: false,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// A short page means there is nothing after it
    pub fn has_next(&self) -> bool {
        self.actions.len() as u32 >= self.page_size
    }

    /// Move forward; returns whether the page changed and needs loading
    pub fn next_page(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Store a loaded page, returning the number of listed actions
    pub fn apply(&mut self, page: u32, actions: Vec<Action>) -> usize {
        if page == self.page {
            self.actions = actions;
            self.loading = false;
        }
        self.actions.len()
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn action(id: i64) -> Action {
        Action {
            id,
            user_name: None,
            description: format!("acción {}", id),
            date: "mañana".to_string(),
            kind: "evento".to_string(),
        }
    }

    #[test]
    fn test_format_special_words() {
        assert_eq!(format_date("hoy"), "Hoy");
        assert_eq!(format_date("mañana"), "Mañana");
        assert_eq!(format_date("miércoles"), "Miércoles");
    }

    #[test]
    fn test_format_iso() {
        assert_eq!(
            format_date("2025-07-03T10:00:00.000Z"),
            "jueves 3 de julio de 2025 a las 10:00"
        );
    }

    #[test]
    fn test_format_calendar() {
        assert_eq!(format_date("15 de mayo 2025"), "15 de Mayo de 2025");
        assert_eq!(format_date("15 de mayo"), "15 de Mayo");
    }

    #[test]
    fn test_format_fallback() {
        assert_eq!(format_date("la semana que viene"), "la semana que viene");
        assert_eq!(format_date("2025-13-45T99:99"), "2025-13-45T99:99");
    }

    #[test]
    fn test_kind_label() {
        let mut a = action(1);
        assert_eq!(a.kind_label(), "Evento");
        a.kind = "recordatorio".to_string();
        assert_eq!(a.kind_label(), "Recordatorio");
    }

    #[test]
    fn test_deserialize_action() {
        let json = r#"{"id":7,"user_name":"ana","description":"reunión","date":"viernes","type":"evento"}"#;
        let a: Action = serde_json::from_str(json).unwrap();
        assert_eq!(a.id, 7);
        assert_eq!(a.kind, "evento");
        assert_eq!(a.display_date(), "Viernes");
    }

    #[test]
    fn test_pagination_buttons() {
        let mut listing = AgendaListing::default();
        assert!(!listing.has_prev());
        assert!(!listing.prev_page());

        assert_eq!(listing.apply(1, (1..=5).map(action).collect()), 5);
        assert!(listing.has_next());
        assert!(listing.next_page());
        assert_eq!(listing.page(), 2);

        listing.apply(2, vec![action(6)]);
        assert!(!listing.has_next());
        assert!(!listing.next_page());
        assert!(listing.prev_page());
        assert_eq!(listing.page(), 1);
    }

    #[test]
    fn test_apply_ignores_other_pages() {
        let mut listing = AgendaListing::default();
        listing.apply(1, vec![action(1)]);
        listing.apply(3, (1..=5).map(action).collect());
        assert_eq!(listing.actions().len(), 1);
    }
}
