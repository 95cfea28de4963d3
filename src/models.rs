//! Domain models mirrored from the lending service. These types stay
//! light-weight data holders that deserialize straight off the wire so the
//! store and view layers can focus on snapshot management and presentation.
//! The service owns every entity; the client never derives state locally
//! beyond what a reload hands back.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp layout the service emits for lending records, e.g.
/// `2026-03-01 09:15:00`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A book title held by the library. `quantity` counts the copies currently
/// on the shelf; the service keeps `available` in lockstep with it
/// (`available == quantity > 0`), so the client trusts the flag as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Service-assigned identifier, echoed back on delete and lend calls.
    pub id: String,
    pub title: String,
    pub author: String,
    pub available: bool,
    pub quantity: u32,
}

impl Book {
    /// `Title by Author` label used by the lend picker.
    pub fn display_title(&self) -> String {
        format!("{} by {}", self.title, self.author)
    }
}

/// A registered library member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Member {
    /// `Name (email)` label used by the lend picker.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.email)
    }
}

/// One lending event. A missing `return_date` marks the book as still out.
/// Timestamps are kept as the raw wire strings and parsed lazily; a record
/// with a malformed timestamp still renders, it just sorts after the ones
/// that parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LendingRecord {
    pub lending_id: String,
    pub book_id: String,
    pub member_id: String,
    pub lending_date: String,
    pub return_date: Option<String>,
}

impl LendingRecord {
    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }

    /// Parsed lend timestamp, used for the recent-activity ordering.
    pub fn lent_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.lending_date)
    }
}

/// Parse a service timestamp. The native `YYYY-MM-DD HH:MM:SS` layout is
/// tried first, then RFC 3339 as a fallback for servers that answer with
/// ISO strings.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

/// Human-friendly rendering of a service timestamp. Unparseable input is
/// shown verbatim rather than dropped.
pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(parsed) => parsed.format("%b %d, %Y %H:%M").to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_decodes_from_wire_json() {
        let book: Book = serde_json::from_str(
            r#"{"id":"b1","title":"Dune","author":"Herbert","available":true,"quantity":2}"#,
        )
        .unwrap();
        assert_eq!(book.id, "b1");
        assert_eq!(book.quantity, 2);
        assert!(book.available);
        assert_eq!(book.display_title(), "Dune by Herbert");
    }

    #[test]
    fn test_lending_record_decodes_camel_case_fields() {
        let record: LendingRecord = serde_json::from_str(
            r#"{"lendingId":"l1","bookId":"b1","memberId":"m1","lendingDate":"2026-03-01 09:15:00","returnDate":null}"#,
        )
        .unwrap();
        assert_eq!(record.lending_id, "l1");
        assert_eq!(record.book_id, "b1");
        assert!(!record.is_returned());
        assert!(record.lent_at().is_some());
    }

    #[test]
    fn test_returned_record_has_return_date() {
        let record: LendingRecord = serde_json::from_str(
            r#"{"lendingId":"l2","bookId":"b1","memberId":"m1","lendingDate":"2026-03-01 09:15:00","returnDate":"2026-03-02 10:00:00"}"#,
        )
        .unwrap();
        assert!(record.is_returned());
    }

    #[test]
    fn test_parse_timestamp_native_format() {
        let parsed = parse_timestamp("2026-03-01 09:15:00").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2026-03-01");
    }

    #[test]
    fn test_parse_timestamp_rfc3339_fallback() {
        assert!(parse_timestamp("2026-03-01T09:15:00Z").is_some());
    }

    #[test]
    fn test_parse_timestamp_garbage_is_none() {
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_format_timestamp_falls_back_to_raw() {
        assert_eq!(format_timestamp("soon"), "soon");
        assert_eq!(format_timestamp("2026-03-01 09:15:00"), "Mar 01, 2026 09:15");
    }
}
