//! Line decoder for simulation output.
//!
//! Each stdout line is one of:
//! - blank (ignored)
//! - a notice line containing the notice marker (forwarded, never parsed)
//! - a data line `name, v1, v2, v3, ...` where every triplet is
//!   `(miscommunication, misexecution, score)` for one step

use crate::domain::{DataRecord, ParseError};

/// Marker the simulation prints on progress/diagnostic lines.
pub const DEFAULT_NOTICE_MARKER: &str = "[NOTICE]";

/// Classification of a single line of output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Blank,
    Notice(String),
    Record(DataRecord),
}

/// Stateless decoder for individual lines.
#[derive(Debug, Clone)]
pub struct LineParser {
    notice_marker: String,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_MARKER)
    }
}

impl LineParser {
    pub fn new(notice_marker: impl Into<String>) -> Self {
        Self {
            notice_marker: notice_marker.into(),
        }
    }

    pub fn notice_marker(&self) -> &str {
        &self.notice_marker
    }

    /// Decode one line. `line_no` is 1-based and only used in errors.
    pub fn parse_line(&self, line_no: usize, line: &str) -> Result<ParsedLine, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ParsedLine::Blank);
        }

        if !self.notice_marker.is_empty() && line.contains(&self.notice_marker) {
            return Ok(ParsedLine::Notice(line.to_string()));
        }

        // Empty fields are dropped before decoding so a trailing delimiter
        // does not shift the triplets.
        let fields: Vec<&str> = line
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();

        let (name, values) = fields
            .split_first()
            .ok_or(ParseError::MissingName { line: line_no })?;

        let values = values
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                raw.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                    line: line_no,
                    field: i + 1,
                    value: raw.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        DataRecord::from_triplets(*name, &values)
            .map(ParsedLine::Record)
            .ok_or_else(|| ParseError::IncompleteTriplet {
                line: line_no,
                name: name.to_string(),
                values: values.len(),
            })
    }
}

/// Accumulates records from a stream of lines, preserving order.
#[derive(Debug, Default)]
pub struct RecordCollector {
    parser: LineParser,
    lines_seen: usize,
    notices: usize,
    records: Vec<DataRecord>,
}

impl RecordCollector {
    pub fn new(parser: LineParser) -> Self {
        Self {
            parser,
            lines_seen: 0,
            notices: 0,
            records: Vec::new(),
        }
    }

    /// Feed the next line; returns what it was classified as.
    ///
    /// Records are moved into the collector, so the returned value for a data
    /// line is a borrow of the stored record.
    pub fn push_line(&mut self, line: &str) -> Result<Pushed<'_>, ParseError> {
        self.lines_seen += 1;
        match self.parser.parse_line(self.lines_seen, line)? {
            ParsedLine::Blank => Ok(Pushed::Blank),
            ParsedLine::Notice(text) => {
                self.notices += 1;
                Ok(Pushed::Notice(text))
            }
            ParsedLine::Record(record) => {
                self.records.push(record);
                let stored = &self.records[self.records.len() - 1];
                Ok(Pushed::Record(stored))
            }
        }
    }

    pub fn records(&self) -> &[DataRecord] {
        &self.records
    }

    pub fn notice_count(&self) -> usize {
        self.notices
    }

    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    pub fn into_records(self) -> Vec<DataRecord> {
        self.records
    }
}

/// Result of [`RecordCollector::push_line`].
#[derive(Debug, PartialEq)]
pub enum Pushed<'a> {
    Blank,
    Notice(String),
    Record(&'a DataRecord),
}

/// Parse a complete block of output in one go.
pub fn parse_output<'a, I>(parser: &LineParser, lines: I) -> Result<Vec<DataRecord>, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut collector = RecordCollector::new(parser.clone());
    for line in lines {
        collector.push_line(line)?;
    }
    Ok(collector.into_records())
}
