//! Log sink
//!
//! Append-only log file guarded by its own semaphore. Each append opens
//! the file in append mode, writes one complete line and closes it, all
//! while holding the permit; the line is rendered before the permit is
//! taken. Failures are reported here and never abort the caller.
//!
//! A failed write is rolled back to the previous file length. If that is
//! not possible, the next append first terminates the torn tail so its own
//! line still starts on a fresh line.

use core::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use idpool_core::{kwarn, LogRecord};

use crate::semaphore::Semaphore;

/// Log file open or write failure
#[derive(Debug)]
pub enum SinkError {
    Open { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Open { path, source } => write!(f, "open {}: {}", path.display(), source),
            SinkError::Write { path, source } => write!(f, "write {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Open { source, .. } | SinkError::Write { source, .. } => Some(source),
        }
    }
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

pub struct LogSink {
    path: PathBuf,
    sem: Semaphore,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>, sem: Semaphore) -> Self {
        Self { path: path.into(), sem }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Discard previous contents, creating the file if needed
    pub fn truncate(&self) -> Result<(), SinkError> {
        let _permit = self.sem.permit();
        File::create(&self.path).map(drop).map_err(|source| SinkError::Open {
            path: self.path.clone(),
            source,
        })
    }

    /// Append `record` as one line.
    ///
    /// The failure is already reported when `Err` is returned; callers use
    /// it for accounting only.
    pub fn append(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = record.to_line();
        let result = {
            let _permit = self.sem.permit();
            self.write_line(line.as_bytes())
        };
        if let Err(e) = &result {
            kwarn!("log append for ID {} dropped: {}", record.id, e);
        }
        result
    }

    // Caller holds the permit. The file is closed before it is released.
    fn write_line(&self, line: &[u8]) -> Result<(), SinkError> {
        let write_err = |source: io::Error| SinkError::Write { path: self.path.clone(), source };
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| SinkError::Open { path: self.path.clone(), source })?;

        let start = file.metadata().map_err(write_err)?.len();
        let mut buf = Vec::with_capacity(line.len() + 1);
        if start > 0 && !ends_with_newline(&mut file).map_err(write_err)? {
            kwarn!("log {} ends mid-line, terminating it", self.path.display());
            buf.push(b'\n');
        }
        buf.extend_from_slice(line);

        let source = match file.write(&buf) {
            Ok(n) if n == buf.len() => return Ok(()),
            Ok(n) => io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write, {} of {} bytes", n, buf.len()),
            ),
            Err(e) => e,
        };
        if let Err(e) = file.set_len(start) {
            kwarn!("cannot roll back {} to {} bytes: {}", self.path.display(), start, e);
        }
        Err(write_err(source))
    }

    /// Tear down the semaphore
    pub fn destroy(self) {
        self.sem.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idpool_core::Timestamp;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn temp_log(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("idpool-sink-{}-{}.log", tag, std::process::id()))
    }

    fn sink(path: &Path) -> LogSink {
        LogSink::new(path, Semaphore::new(1).unwrap())
    }

    fn record(worker: usize, id: i64, payload: &str) -> LogRecord {
        let ts = Timestamp { year: 2024, month: 1, day: 2, hour: 3, minute: 4, second: 5 };
        LogRecord::new(Some(ts), worker, id, payload.to_string())
    }

    #[test]
    fn test_truncate_then_append() {
        let path = temp_log("truncate");
        std::fs::write(&path, "stale line\n").unwrap();

        let s = sink(&path);
        s.truncate().unwrap();
        s.append(&record(1, 10, "a")).unwrap();
        s.append(&record(2, 11, "b")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            text,
            "2024-01-02 03:04:05, Thread 1, ID 10, a\n2024-01-02 03:04:05, Thread 2, ID 11, b\n"
        );
    }

    #[test]
    fn test_open_failure_is_reported_and_permit_released() {
        let path = std::env::temp_dir()
            .join(format!("idpool-no-such-dir-{}", std::process::id()))
            .join("logs.txt");
        let s = sink(&path);

        assert!(matches!(s.truncate(), Err(SinkError::Open { .. })));
        assert!(matches!(s.append(&record(1, 1, "x")), Err(SinkError::Open { .. })));
        assert!(matches!(s.append(&record(1, 2, "y")), Err(SinkError::Open { .. })));
        assert_eq!(s.sem.available_permits(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn test_append_after_torn_tail_starts_new_line() {
        let path = temp_log("torn");
        std::fs::write(&path, "2024-01-02 03:04:05, Thread 1, ID 9, {\"id\":9,\"sta").unwrap();

        let s = sink(&path);
        s.append(&record(2, 10, "b")).unwrap();
        s.append(&record(3, 11, "c")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(text.ends_with('\n'));
        assert_eq!(LogRecord::parse_line(lines[1]).unwrap(), record(2, 10, "b"));
        assert_eq!(LogRecord::parse_line(lines[2]).unwrap(), record(3, 11, "c"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_failure_is_reported() {
        // Every write to /dev/full fails with ENOSPC.
        let s = sink(Path::new("/dev/full"));
        let err = s.append(&record(1, 1, "x")).unwrap_err();
        match err {
            SinkError::Write { source, .. } => assert_eq!(source.raw_os_error(), Some(libc::ENOSPC)),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(s.sem.available_permits(), 1);
    }

    #[test]
    fn test_concurrent_appends_never_tear() {
        const WRITERS: usize = 5;
        const PER_WRITER: i64 = 200;

        let path = temp_log("concurrent");
        let s = Arc::new(sink(&path));
        s.truncate().unwrap();
        let barrier = Arc::new(Barrier::new(WRITERS));

        // Payloads well past a single write() chunk on most systems.
        let handles: Vec<_> = (1..=WRITERS)
            .map(|w| {
                let s = Arc::clone(&s);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let payload = char::from(b'a' + w as u8).to_string().repeat(8192);
                    barrier.wait();
                    for i in 0..PER_WRITER {
                        s.append(&record(w, w as i64 * 1000 + i, &payload)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let mut count = 0;
        for line in text.lines() {
            let rec = LogRecord::parse_line(line).unwrap();
            let expected = char::from(b'a' + rec.worker as u8);
            assert_eq!(rec.payload.len(), 8192);
            assert!(rec.payload.chars().all(|c| c == expected));
            assert_eq!(rec.id / 1000, rec.worker as i64);
            count += 1;
        }
        assert_eq!(count, WRITERS * PER_WRITER as usize);
    }
}
