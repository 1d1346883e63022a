use chrono::Local;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Side channel for raw request/response bodies.
///
/// Lines read `DEBUG: HH:MM:SS <label>: <body>` in local time.
/// Disabled by default. The flag can be flipped from any thread while
/// completions are in flight; nothing is written while it is off.
pub struct DebugLog {
    enabled: AtomicBool,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl DebugLog {
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            sink: Mutex::new(Box::new(writer)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn log(&self, label: &str, body: &[u8]) {
        if !self.is_enabled() {
            return;
        }
        if let Ok(mut sink) = self.sink.lock() {
            // best effort, a broken sink must not fail the call
            let _ = writeln!(
                sink,
                "DEBUG: {} {}: {}",
                Local::now().format("%H:%M:%S"),
                label,
                String::from_utf8_lossy(body)
            );
            let _ = sink.flush();
        }
    }
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::stderr()
    }
}
