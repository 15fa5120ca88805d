use colored::Colorize;
use std::fmt;
use std::io::IsTerminal;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

const TOOL_NAME: &str = env!("CARGO_PKG_NAME");

/// Installs the process-wide stderr logger. Must be called once, before the
/// first event is emitted.
pub fn init(level: Level) {
    let color = use_color(
        std::io::stderr().is_terminal(),
        env_flag("NO_COLOR"),
        env_flag("CLICOLOR_FORCE"),
    );
    colored::control::set_override(color);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .event_format(LineFormat)
        .init();
}

/// Colors follow stderr, where the log goes, not stdout.
fn use_color(stderr_is_terminal: bool, no_color: bool, force: bool) -> bool {
    force || (stderr_is_terminal && !no_color)
}

fn env_flag(key: &str) -> bool {
    std::env::var_os(key).is_some_and(|v| !v.is_empty() && v != "0")
}

/// Formats every event as a single `(upper) ...` line, colored by level.
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
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
        let mut message = String::new();
        ctx.format_fields(Writer::new(&mut message), event)?;

        let line = render(*event.metadata().level(), &message, writer.has_ansi_escapes());
        writeln!(writer, "{line}")
    }
}

fn render(level: Level, message: &str, ansi: bool) -> String {
    let label = match level {
        Level::ERROR => "error: ",
        Level::WARN => "warning: ",
        Level::INFO => "",
        _ => "debug: ",
    };
    let head = format!("({TOOL_NAME}) {label}");

    if !ansi {
        return format!("{head}{message}");
    }

    // Warnings and errors only highlight the prefix so the message stays readable.
    match level {
        Level::ERROR => format!("{}{message}", head.red().bold()),
        Level::WARN => format!("{}{message}", head.yellow().bold()),
        Level::INFO => format!("{head}{message}").blue().bold().to_string(),
        _ => format!("{head}{message}").dimmed().to_string(),
    }
}
