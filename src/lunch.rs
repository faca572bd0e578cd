//! # School Lunch Calendar
//!
//! The lunch menu is published as an iCalendar (ICS) feed with one all-day `VEVENT`
//! per school day; the menu items sit in the event's `DESCRIPTION`, one per line.
//!
//! Only the small subset of RFC 5545 the feed actually uses is understood:
//! - **Line unfolding**: continuation lines start with a space or tab
//! - **`DTSTART`**: `DATE` values, floating `DATE-TIME`s, and UTC `DATE-TIME`s
//!   (converted to the local calendar day)
//! - **`DESCRIPTION` / `SUMMARY`**: text with `\n`, `\,`, `\;` and `\\` escapes

use crate::error::FetchError;
use crate::fallback::LUNCH_MISSING;
use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Most menu lines that fit on the board under the heading.
pub const MAX_ITEMS: usize = 3;

/// One `VEVENT` from the feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Local calendar day the event starts on
    pub start: NaiveDate,
    pub summary: String,
    pub description: String,
}

/// Parse an ICS document into its events.
///
/// Events without a usable `DTSTART` are dropped. A body that is not a calendar
/// at all (an HTML error page, say) is an error.
pub fn parse_ics(body: &str) -> Result<Vec<CalendarEvent>, FetchError> {
    let lines = unfold(body);
    if !lines.iter().any(|l| l.eq_ignore_ascii_case("BEGIN:VCALENDAR")) {
        return Err(FetchError::Parse("not an iCalendar document".to_string()));
    }

    let mut events = Vec::new();
    let mut current: Option<PendingEvent> = None;

    for line in &lines {
        let Some((name, value)) = split_property(line) else {
            continue;
        };
        match name.as_str() {
            "BEGIN" if value.eq_ignore_ascii_case("VEVENT") => {
                current = Some(PendingEvent::default());
            }
            "END" if value.eq_ignore_ascii_case("VEVENT") => {
                if let Some(event) = current.take().and_then(PendingEvent::finish) {
                    events.push(event);
                }
            }
            _ => {
                if let Some(event) = current.as_mut() {
                    event.set(&name, value);
                }
            }
        }
    }

    Ok(events)
}

#[derive(Default)]
struct PendingEvent {
    start: Option<NaiveDate>,
    summary: String,
    description: String,
}

impl PendingEvent {
    fn set(&mut self, name: &str, value: &str) {
        match name {
            "DTSTART" => self.start = parse_ics_date(value),
            "SUMMARY" => self.summary = unescape_text(value),
            "DESCRIPTION" => self.description = unescape_text(value),
            _ => {}
        }
    }

    fn finish(self) -> Option<CalendarEvent> {
        Some(CalendarEvent {
            start: self.start?,
            summary: self.summary,
            description: self.description,
        })
    }
}

/// First event that starts on `today`.
fn todays_event(events: &[CalendarEvent], today: NaiveDate) -> Option<&CalendarEvent> {
    events.iter().find(|event| event.start == today)
}

/// Non-blank description lines, at most [`MAX_ITEMS`].
///
/// # Example
/// ```
/// use morning_board_lib::lunch::lunch_items;
///
/// assert_eq!(lunch_items("Pizza\n\nMilk\nApple\nCookie"), vec!["Pizza", "Milk", "Apple"]);
/// ```
pub fn lunch_items(description: &str) -> Vec<String> {
    description
        .lines()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .take(MAX_ITEMS)
        .map(str::to_string)
        .collect()
}

/// Slide text for today's lunch, or the "no data" message.
pub fn lunch_text(events: &[CalendarEvent], today: NaiveDate) -> String {
    let items = todays_event(events, today)
        .map(|event| lunch_items(&event.description))
        .unwrap_or_default();
    if items.is_empty() {
        return LUNCH_MISSING.to_string();
    }
    format!("Today's Lunch:\n{}", items.join("\n"))
}

fn unfold(body: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in body.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let (Some(rest), Some(previous)) = (raw.strip_prefix([' ', '\t']), lines.last_mut()) {
            previous.push_str(rest);
            continue;
        }
        lines.push(raw.to_string());
    }
    lines
}

/// `NAME;PARAM=x:value` → `("NAME", "value")`, name upper-cased.
fn split_property(line: &str) -> Option<(String, &str)> {
    let (head, value) = line.split_once(':')?;
    let name = head.split(';').next()?.trim().to_ascii_uppercase();
    Some((name, value.trim()))
}

fn parse_ics_date(value: &str) -> Option<NaiveDate> {
    if let Some(utc) = value.strip_suffix(['Z', 'z']) {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        return Some(Utc.from_utc_datetime(&naive).with_timezone(&Local).date_naive());
    }
    NaiveDate::parse_from_str(value.get(..8)?, "%Y%m%d").ok()
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
