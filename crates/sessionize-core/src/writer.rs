use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, SessionizeError};
use crate::types::EnrichedRecord;

pub const HEADER: [&str; 9] = [
    "ip",
    "time",
    "request",
    "status",
    "size",
    "referer",
    "user_agent",
    "session",
    "visit",
];

/// How `time` is rendered, e.g. `2015-11-13 11:45:42+00:00`.
pub const TIME_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Writes enriched records as a delimited table with a header row.
#[derive(Debug, Clone, Copy)]
pub struct TableWriter {
    delimiter: char,
}

impl Default for TableWriter {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl TableWriter {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    fn needs_quotes(&self, field: &str) -> bool {
        field
            .chars()
            .any(|c| c == self.delimiter || c == '"' || c == '\n' || c == '\r')
    }

    fn write_field<W: Write>(&self, out: &mut W, field: &str) -> std::io::Result<()> {
        if self.needs_quotes(field) {
            write!(out, "\"{}\"", field.replace('"', "\"\""))
        } else {
            out.write_all(field.as_bytes())
        }
    }

    fn write_row<W: Write>(&self, out: &mut W, fields: &[&str]) -> std::io::Result<()> {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                write!(out, "{}", self.delimiter)?;
            }
            self.write_field(out, field)?;
        }
        out.write_all(b"\n")
    }

    /// Write the header and one row per record, in the order given.
    pub fn write_table<W: Write>(
        &self,
        out: &mut W,
        records: &[EnrichedRecord],
    ) -> std::io::Result<()> {
        self.write_row(out, &HEADER)?;

        for enriched in records {
            let record = &enriched.record;
            let time = record.time.format(TIME_OUTPUT_FORMAT).to_string();
            let status = record.status.to_string();
            let size = record.size.to_string();
            let session = enriched.session.to_string();
            let visit = enriched.visit.to_string();
            self.write_row(
                out,
                &[
                    record.ip.as_deref().unwrap_or(""),
                    time.as_str(),
                    record.request.as_str(),
                    status.as_str(),
                    size.as_str(),
                    record.referer.as_str(),
                    record.user_agent.as_str(),
                    session.as_str(),
                    visit.as_str(),
                ],
            )?;
        }

        Ok(())
    }

    /// Write the table to `path`, replacing it only once everything is written.
    ///
    /// Rows go to a temporary file next to `path` that is renamed over it on
    /// success; on failure the temporary file is removed and `path` is untouched.
    pub fn write_file(&self, path: &Path, records: &[EnrichedRecord]) -> Result<()> {
        let write_err = |source: std::io::Error| SessionizeError::WriteOutput {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        {
            let mut out = BufWriter::new(tmp.as_file_mut());
            self.write_table(&mut out, records).map_err(write_err)?;
            out.flush().map_err(write_err)?;
        }
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), rows = records.len(), "Wrote output table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sentinel_time;
    use crate::types::LogRecord;
    use chrono::{FixedOffset, TimeZone};

    fn enriched(ip: Option<&str>, request: &str, user_agent: &str) -> EnrichedRecord {
        EnrichedRecord {
            record: LogRecord {
                index: 0,
                ip: ip.map(str::to_string),
                time: FixedOffset::east_opt(0)
                    .unwrap()
                    .with_ymd_and_hms(2015, 11, 13, 11, 45, 42)
                    .unwrap(),
                request: request.to_string(),
                status: 200,
                size: 5120,
                referer: String::new(),
                user_agent: user_agent.to_string(),
            },
            session: 1,
            visit: 1,
        }
    }

    fn render(writer: TableWriter, records: &[EnrichedRecord]) -> String {
        let mut out = Vec::new();
        writer.write_table(&mut out, records).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_header_only_for_empty_table() {
        let text = render(TableWriter::default(), &[]);
        assert_eq!(text, "ip,time,request,status,size,referer,user_agent,session,visit\n");
    }

    #[test]
    fn test_plain_row() {
        let text = render(
            TableWriter::default(),
            &[enriched(Some("1.1.1.1"), "GET / HTTP/1.1", "curl/8.0")],
        );
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "1.1.1.1,2015-11-13 11:45:42+00:00,GET / HTTP/1.1,200,5120,,curl/8.0,1,1"
        );
    }

    #[test]
    fn test_quotes_fields_with_delimiter_or_quote() {
        let text = render(
            TableWriter::default(),
            &[enriched(None, "GET /a,b HTTP/1.1", "say \"hi\"")],
        );
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            ",2015-11-13 11:45:42+00:00,\"GET /a,b HTTP/1.1\",200,5120,,\"say \"\"hi\"\"\",1,1"
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let text = render(
            TableWriter::new('\t'),
            &[enriched(Some("1.1.1.1"), "GET /a,b", "UA")],
        );
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row.split('\t').count(), 9);
        assert!(row.contains("\tGET /a,b\t"));
    }

    #[test]
    fn test_time_keeps_offset_and_sentinel_renders() {
        let mut record = enriched(Some("1.1.1.1"), "", "");
        record.record.time = FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2000, 10, 10, 13, 55, 36)
            .unwrap();
        let mut sentinel = enriched(Some("1.1.1.1"), "", "");
        sentinel.record.time = sentinel_time();

        let text = render(TableWriter::default(), &[record, sentinel]);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[1].contains(",2000-10-10 13:55:36-07:00,"));
        assert!(rows[2].contains(",0001-01-01 00:00:00+00:00,"));
    }
}
