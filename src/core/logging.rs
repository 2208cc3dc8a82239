//! Logging setup for applications embedding the link
//!
//! The crate itself only talks to the `log` facade. Hosts that do not bring
//! their own logger can call [`init_logging`] to get a flexi_logger backend.
//! Records are tagged with the queuelink component that produced them
//! (`link`, `store`, ...), so gate and store activity can be told apart in a
//! host's log.

use std::path::Path;
use std::sync::{Mutex, OnceLock};

static LOGGER_HANDLE: OnceLock<Mutex<flexi_logger::LoggerHandle>> = OnceLock::new();

/// Output layout for log records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// "YYYY-MM-DD HH:mm:ss.fff INF [link] message"
    #[default]
    Text,
    /// One compact JSON object per record
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to text for unknown names
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Start a flexi_logger backend for the `log` facade
///
/// `log_level` accepts any flexi_logger spec string ("info",
/// "queuelink::link=trace", ...) and defaults to "info". Colour only
/// applies to the text layout.
pub fn init_logging(
    log_level: Option<&str>,
    log_format: LogFormat,
    log_file: Option<&Path>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{FileSpec, Logger};

    let mut logger = Logger::try_with_str(log_level.unwrap_or("info"))?;
    logger = match (log_format, color_enabled) {
        (LogFormat::Json, _) => logger.format(json_format),
        (LogFormat::Text, true) => logger.format(text_color_format),
        (LogFormat::Text, false) => logger.format(text_format),
    };
    if let Some(path) = log_file {
        logger = logger.log_to_file(FileSpec::try_from(path)?);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(Mutex::new(handle));
    Ok(())
}

/// Change the active log level at runtime, e.g. to trace the gate while
/// diagnosing a stuck queue
pub fn reconfigure_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let handle_mutex = LOGGER_HANDLE
        .get()
        .ok_or("Logger handle not initialised. Call init_logging first.")?;
    let mut handle = handle_mutex
        .lock()
        .map_err(|_| "Could not acquire logger handle lock")?;
    handle.parse_and_push_temp_spec(log_level)?;
    Ok(())
}

/// queuelink component of a record target; foreign targets pass through
///
/// `queuelink::link::queue_link` -> `link`, `tokio::runtime` -> `tokio::runtime`
fn component(target: &str) -> &str {
    match target.strip_prefix("queuelink::") {
        Some(rest) => rest.split("::").next().unwrap_or(rest),
        None => target,
    }
}

fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

fn text_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_tag(record.level()),
        component(record.target()),
        record.args()
    )
}

fn text_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    let tag = level_tag(record.level());
    let tag = match record.level() {
        log::Level::Error => tag.red().bold(),
        log::Level::Warn => tag.yellow(),
        log::Level::Info => tag.green(),
        log::Level::Debug | log::Level::Trace => tag.dimmed(),
    };
    write!(
        w,
        "{} {} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        tag,
        format!("[{}]", component(record.target())).cyan(),
        record.args()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let line = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_tag(record.level()),
        "component": component(record.target()),
        "target": record.target(),
        "message": record.args().to_string(),
    });
    serde_json::to_writer(&mut *w, &line).map_err(std::io::Error::other)
}
