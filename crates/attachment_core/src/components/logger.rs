//! Service-level logger handed out under the `logger` key.

use log::{Level, Log, Metadata, Record};

/// Sink that drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Log for NullSink {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _record: &Record<'_>) {}

    fn flush(&self) {}
}

/// Sink forwarding to whatever global logger `log` is bound to.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeSink;

impl Log for FacadeSink {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// Channel-scoped logger with a pluggable sink.
pub struct ServiceLogger {
    channel: String,
    sink: Box<dyn Log>,
}

impl ServiceLogger {
    pub fn with_sink(channel: impl Into<String>, sink: Box<dyn Log>) -> Self {
        Self {
            channel: channel.into(),
            sink,
        }
    }

    /// No-op logger used by test fixtures.
    pub fn null() -> Self {
        Self::with_sink("null", Box::new(NullSink))
    }

    /// Logger writing through the process-wide `log` facade.
    pub fn facade(channel: impl Into<String>) -> Self {
        Self::with_sink(channel, Box::new(FacadeSink))
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn log(&self, level: Level, message: &str) {
        let metadata = Metadata::builder()
            .level(level)
            .target(&self.channel)
            .build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(format_args!("{message}"))
                .build(),
        );
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

impl std::fmt::Debug for ServiceLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLogger")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
