//! Log record and line format
//!
//! One successfully processed identifier produces exactly one line:
//!
//! ```text
//! <YYYY-MM-DD HH:MM:SS>, Thread <worker-id>, ID <identifier>, <lookup-payload>
//! ```
//!
//! The payload is the last field, so commas inside it need no escaping.

use core::fmt;
use core::str::FromStr;

use crate::constants::TIMESTAMP_PLACEHOLDER;
use crate::Identifier;

const FIELD_SEP: &str = ", ";

/// Calendar timestamp with second resolution (local time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl FromStr for Timestamp {
    type Err = ParseLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseLineError::Timestamp(s.to_string());
        let b = s.as_bytes();
        if b.len() != 19
            || !s.is_ascii()
            || b[4] != b'-'
            || b[7] != b'-'
            || b[10] != b' '
            || b[13] != b':'
            || b[16] != b':'
        {
            return Err(bad());
        }
        let num = |range: core::ops::Range<usize>| -> Result<u32, ParseLineError> {
            let part = &s[range];
            if !part.bytes().all(|c| c.is_ascii_digit()) {
                return Err(bad());
            }
            part.parse().map_err(|_| bad())
        };
        let ts = Timestamp {
            year: num(0..4)? as i32,
            month: num(5..7)? as u8,
            day: num(8..10)? as u8,
            hour: num(11..13)? as u8,
            minute: num(14..16)? as u8,
            second: num(17..19)? as u8,
        };
        if !ts.is_valid() {
            return Err(bad());
        }
        Ok(ts)
    }
}

impl Timestamp {
    /// Whether every field names a real calendar instant.
    ///
    /// Second 60 is accepted, `localtime_r` reports leap seconds that way.
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=days_in_month(self.year, self.month)).contains(&self.day)
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 60
    }
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

/// One result record, built before the log critical section is entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// `None` when local time was unavailable; rendered as the placeholder
    pub timestamp: Option<Timestamp>,
    /// Worker identity, 1-based
    pub worker: usize,
    pub id: Identifier,
    pub payload: String,
}

impl LogRecord {
    pub fn new(timestamp: Option<Timestamp>, worker: usize, id: Identifier, payload: String) -> Self {
        Self { timestamp, worker, id, payload }
    }

    /// Render the record as one newline-terminated line.
    ///
    /// Line breaks inside the payload are replaced by spaces so a record
    /// can never span two lines.
    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(48 + self.payload.len());
        match &self.timestamp {
            Some(ts) => line.push_str(&ts.to_string()),
            None => line.push_str(TIMESTAMP_PLACEHOLDER),
        }
        line.push_str(FIELD_SEP);
        line.push_str("Thread ");
        line.push_str(&self.worker.to_string());
        line.push_str(FIELD_SEP);
        line.push_str("ID ");
        line.push_str(&self.id.to_string());
        line.push_str(FIELD_SEP);
        line.extend(self.payload.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
        line.push('\n');
        line
    }

    /// Parse one line (with or without its trailing newline)
    pub fn parse_line(line: &str) -> Result<Self, ParseLineError> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let mut fields = line.splitn(4, FIELD_SEP);
        let (ts, worker, id, payload) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(ts), Some(w), Some(id), Some(p)) => (ts, w, id, p),
            _ => return Err(ParseLineError::FieldCount),
        };

        let timestamp = if ts == TIMESTAMP_PLACEHOLDER {
            None
        } else {
            Some(ts.parse()?)
        };
        let worker = worker
            .strip_prefix("Thread ")
            .and_then(|w| w.parse().ok())
            .ok_or_else(|| ParseLineError::Worker(worker.to_string()))?;
        let id = id
            .strip_prefix("ID ")
            .and_then(|i| i.parse().ok())
            .ok_or_else(|| ParseLineError::Identifier(id.to_string()))?;

        Ok(Self::new(timestamp, worker, id, payload.to_string()))
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_line().trim_end_matches('\n'))
    }
}

/// A log line did not match the record layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseLineError {
    /// Fewer than four comma-separated fields
    FieldCount,
    Timestamp(String),
    Worker(String),
    Identifier(String),
}

impl fmt::Display for ParseLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseLineError::FieldCount => write!(f, "expected 4 fields"),
            ParseLineError::Timestamp(s) => write!(f, "bad timestamp field: {:?}", s),
            ParseLineError::Worker(s) => write!(f, "bad worker field: {:?}", s),
            ParseLineError::Identifier(s) => write!(f, "bad identifier field: {:?}", s),
        }
    }
}

impl std::error::Error for ParseLineError {}
