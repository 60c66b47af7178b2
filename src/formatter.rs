//! Log line formatting with a frame counter.
//!
//! Lines look like `12:04:51.30417 0x01A4  INFO tick: tileworld::game: message`, with the
//! timestamp, frame counter and target dimmed when the writer supports ANSI escapes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::macros::format_description;
use time::{format_description::FormatItem, OffsetDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// Frames run since startup.
static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Only the low 16 bits of the frame counter are printed.
const FRAME_DISPLAY_MASK: u64 = 0xFFFF;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:5]");

#[derive(Clone, Copy)]
enum Style {
    Dimmed,
    Bold,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Dimmed => "\x1b[2m",
            Style::Bold => "\x1b[1m",
        }
    }
}

fn paint(writer: &mut Writer<'_>, style: Style, value: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{}{}\x1b[0m", style.code(), value)
    } else {
        write!(writer, "{}", value)
    }
}

/// Right-aligned five character level, colored the way the default `Full` format colors it.
fn write_level(writer: &mut Writer<'_>, level: &Level) -> fmt::Result {
    let (color, text) = match *level {
        Level::TRACE => ("\x1b[35m", "TRACE"),
        Level::DEBUG => ("\x1b[34m", "DEBUG"),
        Level::INFO => ("\x1b[32m", " INFO"),
        Level::WARN => ("\x1b[33m", " WARN"),
        Level::ERROR => ("\x1b[31m", "ERROR"),
    };
    if writer.has_ansi_escapes() {
        write!(writer, "{color}{text}\x1b[0m")
    } else {
        write!(writer, "{text}")
    }
}

/// Event formatter that prefixes every line with a timestamp and the current frame number.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let timestamp = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|e| {
            eprintln!("Failed to format timestamp: {}", e);
            fmt::Error
        })?;
        paint(&mut writer, Style::Dimmed, timestamp)?;
        writer.write_char(' ')?;

        paint(&mut writer, Style::Dimmed, format_args!("0x{:04X}", frame_count() & FRAME_DISPLAY_MASK))?;
        writer.write_char(' ')?;

        write_level(&mut writer, meta.level())?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            let mut any = false;
            for span in scope.from_root() {
                paint(&mut writer, Style::Bold, span.metadata().name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>().filter(|fields| !fields.is_empty()) {
                    paint(&mut writer, Style::Bold, "{")?;
                    write!(writer, "{}", fields)?;
                    paint(&mut writer, Style::Bold, "}")?;
                }
                paint(&mut writer, Style::Dimmed, ":")?;
                any = true;
            }
            if any {
                writer.write_char(' ')?;
            }
        }

        paint(&mut writer, Style::Dimmed, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Advances the frame counter. Called once per frame by the app loop.
pub fn increment_frame() {
    FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
}

pub fn frame_count() -> u64 {
    FRAME_COUNTER.load(Ordering::Relaxed)
}
