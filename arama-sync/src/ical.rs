//! Tolerant VEVENT scanner.
//!
//! Only `UID`, `DTSTART` and `DTEND` matter for blocking nights, so the feed
//! is unfolded and scanned line by line instead of parsed into a full
//! calendar tree. A malformed event is skipped without failing the feed.

use arama_core::dates;
use chrono::{NaiveDate, NaiveDateTime};
use icalendar::parser::unfold;

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMATS: [&str; 2] = ["%Y%m%dT%H%M%S", "%Y%m%dT%H%M%SZ"];

/// A single event reduced to the nights it claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    pub uid: Option<String>,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl FeedEvent {
    /// Every night from start to end inclusive; only the start without an
    /// end, nothing when the end precedes the start.
    pub fn blocked_dates(&self) -> impl Iterator<Item = NaiveDate> {
        dates::days_inclusive(self.start, self.end.unwrap_or(self.start))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    pub events: Vec<FeedEvent>,
    /// Events dropped for a missing or unreadable start.
    pub skipped: usize,
}

#[derive(Default)]
struct PendingEvent {
    uid: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

pub fn parse_feed(content: &str) -> ParsedFeed {
    let unfolded = unfold(content);
    let mut parsed = ParsedFeed::default();
    let mut pending: Option<PendingEvent> = None;

    for raw in unfolded.lines() {
        let line = raw.trim();

        if line == "BEGIN:VEVENT" {
            pending = Some(PendingEvent::default());
        } else if line == "END:VEVENT" {
            if let Some(event) = pending.take() {
                match finish(event) {
                    Some(event) => parsed.events.push(event),
                    None => parsed.skipped += 1,
                }
            }
        } else if let Some(event) = pending.as_mut() {
            if let Some(uid) = line.strip_prefix("UID:") {
                event.uid = Some(uid.trim().to_string());
            } else if line.starts_with("DTSTART") {
                event.start = property_value(line);
            } else if line.starts_with("DTEND") {
                event.end = property_value(line);
            }
        }
    }

    parsed
}

fn finish(event: PendingEvent) -> Option<FeedEvent> {
    let start = event.start.as_deref().and_then(parse_ical_date);
    let Some(start) = start else {
        tracing::debug!("Skipping event {:?}: unreadable DTSTART", event.uid);
        return None;
    };
    // An unreadable end degrades to a single-night event.
    let end = event.end.as_deref().and_then(parse_ical_date);

    Some(FeedEvent {
        uid: event.uid.filter(|uid| !uid.is_empty()),
        start,
        end,
    })
}

/// Value after the last `:`, e.g. `DTSTART;VALUE=DATE:20231215`.
fn property_value(line: &str) -> Option<String> {
    line.rsplit_once(':')
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn parse_ical_date(value: &str) -> Option<NaiveDate> {
    if !fixed_width(value) {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Some(date);
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.date())
}

// chrono's numeric specifiers accept fewer digits than iCal's fixed widths.
fn fixed_width(value: &str) -> bool {
    let bytes = value.as_bytes();
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    match bytes.len() {
        8 => digits(0..8),
        15 => digits(0..8) && bytes[8] == b'T' && digits(9..15),
        16 => digits(0..8) && bytes[8] == b'T' && digits(9..15) && bytes[15] == b'Z',
        _ => false,
    }
}
