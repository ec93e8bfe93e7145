use std::io::BufRead;

use tracing::{debug, warn};

use crate::parser::columns::MIN_FIELDS;
use crate::parser::parse_record;
use crate::tokenizer::tokenize;
use crate::types::{LoadReport, LoadedLog};

/// Read every line of `reader` into records, in input order.
///
/// Blank lines are skipped. A line is dropped and counted when it does not
/// tokenize, has fewer than `MIN_FIELDS` tokens, or has more tokens
/// than the expected width. The width is `columns` when given, otherwise the
/// token count of the first line kept. Narrower rows are kept and their
/// missing trailing fields take defaults. Invalid UTF-8 is replaced rather
/// than rejected.
pub fn read_records<R: BufRead>(
    mut reader: R,
    columns: Option<usize>,
) -> std::io::Result<LoadedLog> {
    let mut records = Vec::new();
    let mut report = LoadReport {
        expected_columns: columns,
        ..LoadReport::default()
    };

    let mut buf = Vec::new();
    let mut line_number = 0usize;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        report.lines_read += 1;

        let tokens = match tokenize(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(line = line_number, error = %e, "Dropping line");
                report.dropped += 1;
                continue;
            }
        };

        if tokens.len() < MIN_FIELDS {
            warn!(
                line = line_number,
                found = tokens.len(),
                min = MIN_FIELDS,
                "Dropping line with too few fields"
            );
            report.dropped += 1;
            continue;
        }

        let expected = *report.expected_columns.get_or_insert(tokens.len());
        if tokens.len() > expected {
            warn!(
                line = line_number,
                found = tokens.len(),
                expected,
                "Dropping line with extra fields"
            );
            report.dropped += 1;
            continue;
        }

        records.push(parse_record(records.len(), &tokens));
    }

    report.records = records.len();
    debug!(
        lines = report.lines_read,
        records = report.records,
        dropped = report.dropped,
        "Loaded access log"
    );

    Ok(LoadedLog { records, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LINE_A: &str = r#"1.1.1.1 - - [13/Nov/2015:11:45:42 +0000] "GET / HTTP/1.1" 200 10 "-" "UA""#;
    const LINE_B: &str = r#"2.2.2.2 - - [13/Nov/2015:11:50:00 +0000] "GET /a HTTP/1.1" 404 0 "-" "UA""#;

    #[test]
    fn test_reads_rows_in_order_with_indices() {
        let input = format!("{}\n{}\n", LINE_A, LINE_B);
        let loaded = read_records(Cursor::new(input), None).unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].index, 0);
        assert_eq!(loaded.records[0].ip.as_deref(), Some("1.1.1.1"));
        assert_eq!(loaded.records[1].index, 1);
        assert_eq!(loaded.records[1].status, 404);
        assert_eq!(loaded.report.expected_columns, Some(9));
        assert_eq!(loaded.report.dropped, 0);
    }

    #[test]
    fn test_skips_blank_lines_and_handles_crlf() {
        let input = format!("\r\n{}\r\n   \n{}", LINE_A, LINE_B);
        let loaded = read_records(Cursor::new(input), None).unwrap();

        assert_eq!(loaded.report.lines_read, 2);
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[1].user_agent, "UA");
    }

    #[test]
    fn test_drops_wrong_width_and_unterminated_rows() {
        let input = format!(
            "{}\n{} extra\n1.1.1.1 - - [13/Nov/2015:11:45:42 +0000] \"GET / 200\n{}\n",
            LINE_A, LINE_B, LINE_B
        );
        let loaded = read_records(Cursor::new(input), None).unwrap();

        assert_eq!(loaded.report.lines_read, 4);
        assert_eq!(loaded.report.dropped, 2);
        assert_eq!(loaded.records.len(), 2);
        // Indices are contiguous over the kept rows
        assert_eq!(loaded.records[1].index, 1);
        assert_eq!(loaded.records[1].ip.as_deref(), Some("2.2.2.2"));
    }

    #[test]
    fn test_explicit_width_overrides_first_line() {
        let input = format!("{} extra\n{}\n", LINE_A, LINE_B);
        let loaded = read_records(Cursor::new(input), Some(9)).unwrap();

        assert_eq!(loaded.report.dropped, 1);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].ip.as_deref(), Some("2.2.2.2"));
    }

    #[test]
    fn test_extra_token_on_first_line_keeps_later_rows() {
        let input = format!("{} extra\n{}\n{}\n{}\n", LINE_A, LINE_B, LINE_A, LINE_B);
        let loaded = read_records(Cursor::new(input), None).unwrap();

        assert_eq!(loaded.report.expected_columns, Some(10));
        assert_eq!(loaded.report.dropped, 0);
        assert_eq!(loaded.records.len(), 4);
        assert_eq!(loaded.records[1].ip.as_deref(), Some("2.2.2.2"));
        assert_eq!(loaded.records[3].user_agent, "UA");
    }

    #[test]
    fn test_short_rows_dropped_and_common_format_kept() {
        let common = r#"3.3.3.3 - - [13/Nov/2015:11:55:00 +0000] "GET /c HTTP/1.1" 200 7"#;
        let input = format!("garbage line\n{}\n{}\n1.1.1.1 -\n", LINE_A, common);
        let loaded = read_records(Cursor::new(input), None).unwrap();

        assert_eq!(loaded.report.lines_read, 4);
        assert_eq!(loaded.report.dropped, 2);
        // Width comes from the first row kept, not the garbage line
        assert_eq!(loaded.report.expected_columns, Some(9));
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].index, 0);
        assert_eq!(loaded.records[1].size, 7);
        assert_eq!(loaded.records[1].referer, "");
        assert_eq!(loaded.records[1].user_agent, "");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut input = LINE_A.replace("UA", "U\u{FFFD}").into_bytes();
        input.push(b'\n');
        let bad = LINE_B.as_bytes().iter().map(|b| if *b == b'U' { 0xFF } else { *b });
        input.extend(bad);
        let loaded = read_records(Cursor::new(input), None).unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert!(loaded.records[1].user_agent.contains('\u{FFFD}'));
    }

    #[test]
    fn test_empty_input() {
        let loaded = read_records(Cursor::new(""), None).unwrap();
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.report, LoadReport::default());
    }
}
