//! `log` backend that keeps this crate's messages per test thread.

use log::{LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;

thread_local! {
    static LINES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("gedcom_fetch")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            LINES.with(|lines| lines.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Installs the capture logger once per test binary and clears this
/// thread's buffer.
pub fn install() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("logger already set");
        log::set_max_level(LevelFilter::Debug);
    });
    LINES.with(|lines| lines.borrow_mut().clear());
}

pub fn lines() -> Vec<String> {
    LINES.with(|lines| lines.borrow().clone())
}

pub fn position(prefix: &str) -> Option<usize> {
    lines().iter().position(|line| line.starts_with(prefix))
}
