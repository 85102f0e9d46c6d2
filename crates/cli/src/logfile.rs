//! Late-bound run log file
//!
//! The run log lives at the root of the result folder, which only exists
//! after the config has been loaded. The tracing subscriber, however, is
//! installed once at startup. This writer bridges the gap: it is
//! registered as a file layer immediately but discards everything until
//! `bind` points it at the log file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

/// Shared handle for the run log file
#[derive(Clone, Default)]
pub struct LateLogFile(Arc<Mutex<Option<File>>>);

impl LateLogFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start mirroring log lines into `path`
    pub fn bind(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        *self.0.lock().unwrap() = Some(file);
        Ok(())
    }
}

/// Per-event writer handed out to the fmt layer
pub struct LateLogFileWriter(Arc<Mutex<Option<File>>>);

impl Write for LateLogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        match guard.as_mut() {
            Some(file) => file.write(buf),
            // not bound yet: swallow silently, console layer still shows it
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self.0.lock().unwrap();
        match guard.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LateLogFile {
    type Writer = LateLogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LateLogFileWriter(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_discarded_until_bound() {
        let log = LateLogFile::new();
        let mut writer = log.make_writer();
        assert_eq!(writer.write(b"dropped").unwrap(), 7);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        log.bind(&path).unwrap();

        let mut writer = log.make_writer();
        writer.write_all(b"kept").unwrap();
        writer.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "kept");
    }
}
