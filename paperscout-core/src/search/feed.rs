//! Atom feed parsing into paper records.
//!
//! Elements are matched on their local name, so the Atom default namespace
//! and any prefixes are irrelevant. Only `title` and `id` elements that are
//! direct children of an `entry` contribute to a record; feed-level metadata
//! is ignored.

use quick_xml::Reader;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use serde::Serialize;

use crate::error::FeedEntryError;
use crate::text::normalize;
use crate::types::PaperRecord;

/// An entry that was dropped while parsing, with its zero-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub index: usize,
    #[serde(serialize_with = "serialize_entry_error")]
    pub error: FeedEntryError,
}

fn serialize_entry_error<S: serde::Serializer>(
    error: &FeedEntryError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Outcome of parsing a feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedReport {
    /// Complete records, in document order.
    pub records: Vec<PaperRecord>,
    pub skipped: Vec<SkippedEntry>,
    /// Set when an XML syntax error stopped the scan early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<String>,
}

/// Parse a feed into records, silently dropping incomplete entries.
pub fn parse_feed(xml: &str) -> Vec<PaperRecord> {
    parse_feed_report(xml).records
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Id,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"id" => Some(Field::Id),
            _ => None,
        }
    }
}

#[derive(Default)]
struct EntryAccum {
    title: Option<String>,
    id: Option<String>,
    malformed: bool,
}

impl EntryAccum {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Id => &mut self.id,
        }
    }

    fn into_record(self) -> Result<PaperRecord, FeedEntryError> {
        if self.malformed {
            return Err(FeedEntryError::Malformed);
        }
        let title = self.title.ok_or(FeedEntryError::MissingTitle)?;
        let id = self.id.ok_or(FeedEntryError::MissingId)?;
        Ok(PaperRecord::new(title, id))
    }
}

/// Event-driven state for one pass over the feed.
#[derive(Default)]
struct FeedParser {
    report: FeedReport,
    depth: usize,
    entry_depth: Option<usize>,
    entry_index: usize,
    accum: EntryAccum,
    capture: Option<(Field, String)>,
}

impl FeedParser {
    fn handle_start(&mut self, e: &BytesStart<'_>) {
        self.depth += 1;
        let local = e.local_name();
        let name = local.as_ref();

        match self.entry_depth {
            None if name == b"entry" => {
                self.entry_depth = Some(self.depth);
                self.accum = EntryAccum::default();
            }
            Some(entry_depth) if self.depth == entry_depth + 1 && self.capture.is_none() => {
                if let Some(field) = Field::from_local_name(name) {
                    if self.accum.slot(field).is_none() {
                        self.capture = Some((field, String::new()));
                    }
                }
            }
            _ => {}
        }
    }

    fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    fn handle_text(&mut self, text: &str) {
        if let Some((_, buf)) = self.capture.as_mut() {
            buf.push_str(text);
        }
    }

    /// Drop the field being captured and condemn the current entry.
    fn mark_malformed(&mut self) {
        if self.entry_depth.is_some() {
            self.capture = None;
            self.accum.malformed = true;
        }
    }

    fn handle_end(&mut self, e: &BytesEnd<'_>) {
        let local = e.local_name();
        let name = local.as_ref();

        let Some(entry_depth) = self.entry_depth else {
            self.depth = self.depth.saturating_sub(1);
            return;
        };

        // `</entry>` closes the entry even if a child was left open.
        if name == b"entry" && self.depth >= entry_depth {
            if self.depth > entry_depth {
                self.accum.malformed = true;
            }
            self.finish_entry();
            self.depth = entry_depth - 1;
            return;
        }

        // The entry element itself closed under another name.
        if self.depth == entry_depth {
            self.accum.malformed = true;
            self.finish_entry();
            self.depth = entry_depth - 1;
            return;
        }

        if self.depth == entry_depth + 1 {
            if let Some((field, buf)) = self.capture.take() {
                if Field::from_local_name(name) != Some(field) {
                    self.accum.malformed = true;
                } else {
                    let value = match field {
                        Field::Title => normalize(&buf),
                        Field::Id => buf.trim().to_string(),
                    };
                    if !value.is_empty() {
                        *self.accum.slot(field) = Some(value);
                    }
                }
            }
        }

        self.depth = self.depth.saturating_sub(1);
    }

    fn finish_entry(&mut self) {
        let index = self.entry_index;
        self.entry_index += 1;
        self.entry_depth = None;
        self.capture = None;

        match std::mem::take(&mut self.accum).into_record() {
            Ok(record) => self.report.records.push(record),
            Err(error) => {
                tracing::debug!(index, %error, "Skipping feed entry");
                self.report.skipped.push(SkippedEntry { index, error });
            }
        }
    }
}

/// Parse a feed and report which entries were skipped and why.
///
/// A bad entity or a mismatched end tag costs only the entry it appears in.
/// A malformed document never fails: parsing stops at the first
/// unrecoverable syntax error and the records completed so far are kept.
pub fn parse_feed_report(xml: &str) -> FeedReport {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;
    let mut parser = FeedParser::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => parser.handle_start(e),
            Ok(Event::End(ref e)) => parser.handle_end(e),
            Ok(Event::Text(ref e)) if parser.is_capturing() => match e.unescape() {
                Ok(text) => parser.handle_text(&text),
                Err(err) => {
                    tracing::debug!(
                        position = reader.buffer_position(),
                        error = %err,
                        "Bad entity in feed entry"
                    );
                    parser.mark_malformed();
                }
            },
            Ok(Event::CData(ref e)) => parser.handle_text(&String::from_utf8_lossy(e)),
            Ok(Event::Eof) => break,
            Err(err) => {
                parser.report.truncated = Some(format!(
                    "malformed XML near byte {}: {}",
                    reader.error_position(),
                    err
                ));
                break;
            }
            _ => {}
        }
    }

    if let Some(note) = &parser.report.truncated {
        tracing::warn!(
            records = parser.report.records.len(),
            "Feed parsing stopped early: {}",
            note
        );
    }

    parser.report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_ENTRY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: all:drone</title>
  <id>http://arxiv.org/api/feed-id</id>
  <entry><title>Quantum Error Correction</title><id>http://example.org/abs/1</id></entry>
  <entry><title>Neural Scaling Laws</title><id>http://example.org/abs/2</id></entry>
</feed>"#;

    #[test]
    fn test_two_entries_in_order() {
        let records = parse_feed(TWO_ENTRY_FEED);
        assert_eq!(
            records,
            vec![
                PaperRecord::new("Quantum Error Correction", "http://example.org/abs/1"),
                PaperRecord::new("Neural Scaling Laws", "http://example.org/abs/2"),
            ]
        );
    }

    #[test]
    fn test_entry_without_title_is_skipped() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry><title>First</title><id>http://x/1</id></entry>
  <entry><id>http://x/2</id></entry>
  <entry><title>Third</title><id>http://x/3</id></entry>
</feed>"#;
        let report = parse_feed_report(xml);
        assert_eq!(
            report.records,
            vec![
                PaperRecord::new("First", "http://x/1"),
                PaperRecord::new("Third", "http://x/3"),
            ]
        );
        assert_eq!(
            report.skipped,
            vec![SkippedEntry {
                index: 1,
                error: FeedEntryError::MissingTitle
            }]
        );
        assert!(report.truncated.is_none());
    }

    #[test]
    fn test_entry_without_id_is_skipped() {
        let xml = "<feed><entry><title>Lonely</title></entry></feed>";
        let report = parse_feed_report(xml);
        assert!(report.records.is_empty());
        assert_eq!(report.skipped[0].error, FeedEntryError::MissingId);
    }

    #[test]
    fn test_title_whitespace_normalized_and_unescaped() {
        let xml = "<feed><entry><title>\n  Graphs &amp; \n   Networks  </title>\
                   <id>  http://x/9  </id></entry></feed>";
        let records = parse_feed(xml);
        assert_eq!(records, vec![PaperRecord::new("Graphs & Networks", "http://x/9")]);
    }

    #[test]
    fn test_prefixed_namespace() {
        let xml = r#"<a:feed xmlns:a="http://www.w3.org/2005/Atom">
  <a:entry><a:title>Prefixed</a:title><a:id>http://x/p</a:id></a:entry>
</a:feed>"#;
        assert_eq!(parse_feed(xml), vec![PaperRecord::new("Prefixed", "http://x/p")]);
    }

    #[test]
    fn test_first_direct_child_title_wins() {
        let xml = "<feed><entry>\
                   <source><title>Nested</title><id>http://nested</id></source>\
                   <title>Outer</title><title>Second</title>\
                   <id>http://x/1</id></entry></feed>";
        assert_eq!(parse_feed(xml), vec![PaperRecord::new("Outer", "http://x/1")]);
    }

    #[test]
    fn test_cdata_title() {
        let xml = "<feed><entry><title><![CDATA[Deep <Learning>]]></title>\
                   <id>http://x/c</id></entry></feed>";
        assert_eq!(
            parse_feed(xml),
            vec![PaperRecord::new("Deep <Learning>", "http://x/c")]
        );
    }

    #[test]
    fn test_feed_without_entries() {
        let report = parse_feed_report(r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Empty</title></feed>"#);
        assert!(report.records.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_unknown_entity_outside_fields_is_ignored() {
        let xml = "<feed>\
                   <entry><title>First</title><id>http://x/1</id></entry>\
                   <entry><title>Second</title><id>http://x/2</id>\
                   <summary>Results&nbsp;improve</summary></entry>\
                   <entry><title>Third</title><id>http://x/3</id></entry></feed>";
        let report = parse_feed_report(xml);
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.records[1], PaperRecord::new("Second", "http://x/2"));
        assert!(report.skipped.is_empty());
        assert!(report.truncated.is_none());
    }

    #[test]
    fn test_unknown_entity_in_title_skips_only_that_entry() {
        let xml = "<feed>\
                   <entry><title>First</title><id>http://x/1</id></entry>\
                   <entry><title>Caf&eacute; Robots</title><id>http://x/2</id></entry>\
                   <entry><title>Third</title><id>http://x/3</id></entry></feed>";
        let report = parse_feed_report(xml);
        assert_eq!(
            report.records,
            vec![
                PaperRecord::new("First", "http://x/1"),
                PaperRecord::new("Third", "http://x/3"),
            ]
        );
        assert_eq!(
            report.skipped,
            vec![SkippedEntry {
                index: 1,
                error: FeedEntryError::Malformed
            }]
        );
        assert!(report.truncated.is_none());
    }

    #[test]
    fn test_mismatched_end_tag_skips_only_that_entry() {
        let xml = "<feed><entry><title>Kept</title><id>http://x/1</id></entry>\
                   <entry><title>Broken</wrong><id>http://x/2</id></entry>\
                   <entry><title>Also Kept</title><id>http://x/3</id></entry></feed>";
        let report = parse_feed_report(xml);
        assert_eq!(
            report.records,
            vec![
                PaperRecord::new("Kept", "http://x/1"),
                PaperRecord::new("Also Kept", "http://x/3"),
            ]
        );
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].error, FeedEntryError::Malformed);
        assert!(report.truncated.is_none());
    }

    #[test]
    fn test_syntax_error_keeps_completed_records() {
        let xml = "<feed><entry><title>Kept</title><id>http://x/1</id></entry>\
                   <!-- never closed <entry><title>Lost</title></entry></feed>";
        let report = parse_feed_report(xml);
        assert_eq!(report.records, vec![PaperRecord::new("Kept", "http://x/1")]);
        assert!(report.truncated.is_some());
    }

    #[test]
    fn test_not_xml_at_all() {
        let report = parse_feed_report("this is not a feed");
        assert!(report.records.is_empty());
    }
}
