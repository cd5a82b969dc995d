// Tollgate — Test helpers
//
// Captures formatted log output from an injected dispatcher so tests can
// assert on what the registry reported.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Dispatch;

#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// A dispatcher that writes plain-text events into this buffer.
    pub fn dispatch(&self) -> Dispatch {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        Dispatch::new(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
