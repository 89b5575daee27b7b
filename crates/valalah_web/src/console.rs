//! # Console Logging
//!
//! Routes `tracing` events to a line sink, one call per event with the
//! event's level. In the browser the sink is the devtools console, so
//! warnings land in `console.warn` and errors in `console.error`.

use std::io::{self, Write};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Receives one formatted event.
pub type LineSink = fn(Level, &str);

/// Buffers one formatted event and hands it to the sink on drop.
pub struct LineWriter {
    level: Level,
    sink: LineSink,
    buffer: Vec<u8>,
}

impl Write for LineWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buffer);
        let line = text.trim_end();
        if !line.is_empty() {
            (self.sink)(self.level, line);
        }
    }
}

/// [`MakeWriter`] handing each event to a [`LineSink`].
#[derive(Clone, Copy)]
pub struct MakeLineWriter {
    sink: LineSink,
}

impl MakeLineWriter {
    /// Writes every event to `sink`.
    #[must_use]
    pub const fn new(sink: LineSink) -> Self {
        Self { sink }
    }

    fn writer(&self, level: Level) -> LineWriter {
        LineWriter {
            level,
            sink: self.sink,
            buffer: Vec::new(),
        }
    }
}

impl<'a> MakeWriter<'a> for MakeLineWriter {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> LineWriter {
        self.writer(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> LineWriter {
        self.writer(*meta.level())
    }
}

/// Plain-text formatter for `sink`: no timestamps, no colors.
pub fn subscriber(sink: LineSink) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_writer(MakeLineWriter::new(sink))
        .with_max_level(Level::INFO)
        .with_target(false)
        .without_time()
        .finish()
}

#[cfg(target_arch = "wasm32")]
fn browser_console(level: Level, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    if level == Level::ERROR {
        web_sys::console::error_1(&line);
    } else if level == Level::WARN {
        web_sys::console::warn_1(&line);
    } else if level == Level::INFO {
        web_sys::console::info_1(&line);
    } else {
        web_sys::console::debug_1(&line);
    }
}

/// Installs the console subscriber. A second call keeps the first.
#[cfg(target_arch = "wasm32")]
pub fn init_console_logging() {
    // Err only means a subscriber is already set.
    let _ = tracing::subscriber::set_global_default(subscriber(browser_console));
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    thread_local! {
        static LINES: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    fn record(level: Level, line: &str) {
        LINES.with(|lines| lines.borrow_mut().push((level, line.to_owned())));
    }

    fn captured() -> Vec<(Level, String)> {
        LINES.with(|lines| lines.borrow_mut().drain(..).collect())
    }

    #[test]
    fn test_warnings_reach_sink_with_level() {
        tracing::subscriber::with_default(subscriber(record), || {
            tracing::warn!(theme = "Easter Eggs", "audio unavailable");
            tracing::info!("🥚 Easter Eggs theme loaded");
        });

        let lines = captured();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, Level::WARN);
        assert!(lines[0].1.contains("audio unavailable"));
        assert!(lines[0].1.contains("Easter Eggs"));
        assert_eq!(lines[1].0, Level::INFO);
        assert!(!lines[1].1.ends_with('\n'));
    }

    #[test]
    fn test_debug_is_filtered() {
        tracing::subscriber::with_default(subscriber(record), || {
            tracing::debug!("at capacity, spawn dropped");
        });
        assert!(captured().is_empty());
    }
}
