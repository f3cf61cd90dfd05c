use colored::Colorize;
use std::fmt;
use tracing::Level;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Compact one-line format: coloured level, optional target, then fields.
pub struct FsFormatter {
    show_target: bool,
}

impl FsFormatter {
    pub fn new(show_target: bool) -> Self {
        Self { show_target }
    }
}

impl<S, N> FormatEvent<S, N> for FsFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let level = match *metadata.level() {
            Level::ERROR => "ERROR".red().to_string(),
            Level::WARN => "WARN".yellow().to_string(),
            Level::INFO => "INFO".green().to_string(),
            Level::DEBUG => "DEBUG".blue().to_string(),
            Level::TRACE => "TRACE".magenta().to_string(),
        };

        write!(writer, "{:>5} ", level)?;
        if self.show_target {
            write!(writer, "{}: ", metadata.target().dimmed())?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
