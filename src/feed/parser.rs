use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::record::{Record, UNLABELED};

const DELIMITER: char = ',';
const QUOTE: char = '"';
const MIN_FIELDS: usize = 4;

/// Counters for rows the parser dropped instead of failing on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    /// Lines after the header.
    pub rows_seen: usize,
    pub too_few_fields: usize,
    pub missing_id: usize,
}

impl ParseReport {
    pub fn dropped(&self) -> usize {
        self.too_few_fields + self.missing_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub records: Vec<Record>,
    pub report: ParseReport,
}

/// Parse the CSV export, stamping every record with the current time.
pub fn parse_feed(text: &str) -> ParsedFeed {
    parse_feed_at(text, Utc::now())
}

pub fn parse_records(text: &str) -> Vec<Record> {
    parse_feed(text).records
}

/// Parse the CSV export with an explicit parse time.
///
/// The first line is a header and is skipped without looking at its column
/// names; fields are read by position (`id, sender, subject, label`). Rows with
/// fewer than four fields or an empty id are counted in the report and
/// otherwise ignored.
pub fn parse_feed_at(text: &str, parsed_at: DateTime<Utc>) -> ParsedFeed {
    let timestamp = parsed_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut out = ParsedFeed::default();

    for (line_no, line) in text.trim().lines().enumerate().skip(1) {
        out.report.rows_seen += 1;

        let fields = split_line(line);
        if fields.len() < MIN_FIELDS {
            log::debug!(
                "feed line {}: {} field(s), need {MIN_FIELDS}; dropped",
                line_no + 1,
                fields.len()
            );
            out.report.too_few_fields += 1;
            continue;
        }

        let id = fields[0].trim();
        if id.is_empty() {
            log::debug!("feed line {}: empty id; dropped", line_no + 1);
            out.report.missing_id += 1;
            continue;
        }

        let label = match fields[3].trim() {
            "" => UNLABELED,
            l => l,
        };

        out.records.push(Record {
            id: id.to_string(),
            sender_email: fields[1].trim().to_string(),
            subject: fields[2].trim().to_string(),
            label: label.to_string(),
            timestamp: timestamp.clone(),
        });
    }

    log::debug!(
        "parsed {} record(s) from {} row(s), {} dropped",
        out.records.len(),
        out.report.rows_seen,
        out.report.dropped()
    );
    out
}

/// Split one line on commas, treating commas inside double quotes as text.
///
/// Quote characters only toggle the quoted state and never reach the output,
/// so doubled quotes (`""`) are not an escape.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in line.chars() {
        match c {
            QUOTE => quoted = !quoted,
            DELIMITER if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_well_formed_rows_keep_order() {
        let text = "id,sender,subject,label\n\
                    10,a@x.com,First,Spam\n\
                    11,b@x.com,Second,Social\n\
                    12,c@x.com,Third,Updates\n";
        let feed = parse_feed_at(text, fixed_time());

        let ids: Vec<&str> = feed.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["10", "11", "12"]);
        assert_eq!(feed.report.rows_seen, 3);
        assert_eq!(feed.report.dropped(), 0);
    }

    #[test]
    fn test_quoted_field_keeps_delimiter() {
        let text = "id,sender,subject,label\n1,a@b.com,\"Hello, World\",Spam";
        let records = parse_records(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "Hello, World");
        assert_eq!(records[0].label, "Spam");
    }

    #[test]
    fn test_empty_label_becomes_unlabeled() {
        let records = parse_records("id,sender,subject,label\n2,b@x.com,Yo,\n");
        assert_eq!(records[0].label, UNLABELED);

        let records = parse_records("id,sender,subject,label\n2,b@x.com,Yo,   ");
        assert_eq!(records[0].label, UNLABELED);
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let text = "id,sender,subject,label\n1,a@x.com,Hi\n2,b@x.com,Yo,Spam";
        let feed = parse_feed_at(text, fixed_time());

        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].id, "2");
        assert_eq!(feed.report.too_few_fields, 1);
    }

    #[test]
    fn test_empty_id_is_dropped() {
        let text = "id,sender,subject,label\n  ,a@x.com,Hi,Spam\n3,c@x.com,Hey,Spam";
        let feed = parse_feed_at(text, fixed_time());

        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.report.missing_id, 1);
    }

    #[test]
    fn test_blank_trailing_lines_produce_nothing() {
        let text = "id,sender,subject,label\n1,a@x.com,Hi,Spam\n\n\n";
        assert_eq!(parse_records(text).len(), 1);

        // Interior blank line: one field, dropped as short.
        let feed = parse_feed_at("h\n1,a,b,c\n\n2,a,b,c", fixed_time());
        assert_eq!(feed.records.len(), 2);
        assert_eq!(feed.report.too_few_fields, 1);
    }

    #[test]
    fn test_crlf_and_padding_are_trimmed() {
        let text = "id,sender,subject,label\r\n 7 , a@x.com ,  Hi there ,Spam \r\n";
        let records = parse_records(text);

        assert_eq!(records[0].id, "7");
        assert_eq!(records[0].sender_email, "a@x.com");
        assert_eq!(records[0].subject, "Hi there");
        assert_eq!(records[0].label, "Spam");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let records = parse_records("id,sender,subject,label,score\n1,a@x.com,Hi,Spam,0.98");
        assert_eq!(records[0].label, "Spam");
    }

    #[test]
    fn test_header_only_and_empty_input() {
        assert!(parse_records("").is_empty());
        assert!(parse_records("id,sender,subject,label").is_empty());
        assert!(parse_records("   \n  ").is_empty());
    }

    #[test]
    fn test_header_contents_are_not_validated() {
        let records = parse_records("whatever\n1,a@x.com,Hi,Spam");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_timestamp_is_parse_time() {
        let records = parse_feed_at("h\n1,a,b,c\n2,a,b,c", fixed_time()).records;
        assert_eq!(records[0].timestamp, "2024-05-01T12:00:00.000Z");
        assert_eq!(records[0].timestamp, records[1].timestamp);
    }

    #[test]
    fn test_split_line_removes_quotes_without_escaping() {
        assert_eq!(split_line("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
        // Doubled quotes just toggle twice.
        assert_eq!(split_line("\"say \"\"hi\"\"\",x"), vec!["say hi", "x"]);
        // Unterminated quote swallows the rest of the line.
        assert_eq!(split_line("a,\"b,c"), vec!["a", "b,c"]);
        assert_eq!(split_line(""), vec![""]);
    }
}
