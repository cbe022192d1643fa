use std::{
    fmt,
    io::{self, Stderr, Write},
    sync::{Mutex, PoisonError},
};

use log::{Level, LevelFilter, Log, Metadata, Record};

const TARGET: &str = "spawn_balance";

/// Logging sink owned by the process bootstrap and handed out by reference.
///
/// The sink is never installed as the global `log` logger; components that
/// log receive it explicitly.
#[derive(Debug)]
pub(crate) struct ConsoleSink<W = Stderr> {
    level: LevelFilter,
    out: Mutex<W>,
}

impl ConsoleSink {
    /// Creates a sink that writes to standard error.
    pub(crate) fn new(level: LevelFilter) -> Self {
        Self::with_writer(level, io::stderr())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Creates a sink that writes to the provided writer.
    pub(crate) fn with_writer(level: LevelFilter, out: W) -> Self {
        Self {
            level,
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_writer(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Log for ConsoleSink<W> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        // Diagnostics are best effort; a closed stderr must not abort the session.
        let _ = writeln!(
            out,
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = out.flush();
    }
}

/// Sends one formatted message to `sink`.
pub(crate) fn emit(sink: &dyn Log, level: Level, args: fmt::Arguments<'_>) {
    sink.log(
        &Record::builder()
            .level(level)
            .target(TARGET)
            .args(args)
            .build(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_below_configured_level() {
        let sink = ConsoleSink::with_writer(LevelFilter::Info, Vec::new());
        emit(&sink, Level::Debug, format_args!("hidden"));
        emit(&sink, Level::Warn, format_args!("mix drifted"));

        let written = String::from_utf8(sink.into_writer()).expect("utf-8 output");
        assert_eq!(written, "[WARN  spawn_balance] mix drifted\n");
    }

    #[test]
    fn off_level_discards_everything() {
        let sink = ConsoleSink::with_writer(LevelFilter::Off, Vec::new());
        emit(&sink, Level::Error, format_args!("dropped"));
        sink.flush();

        assert!(sink.into_writer().is_empty());
    }
}
