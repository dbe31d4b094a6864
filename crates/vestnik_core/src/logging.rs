//! Core logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Emit stable, metadata-only diagnostic events from core.
//!
//! # Invariants
//! - Logging init is idempotent for the same level and directory.
//! - Logging initialization must not panic.
//! - Re-initialization with a different level or directory is rejected.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_BASENAME: &str = "vestnik";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_TEXT_CAP: usize = 160;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

static LOG_STATE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    dir: PathBuf,
    _handle: LoggerHandle,
}

/// Initializes core logging with level and directory.
///
/// Returns `Ok(())` when logging is active, or a human-readable error string
/// when initialization fails.
///
/// # Invariants
/// - Calling this function repeatedly with the same arguments is idempotent.
/// - Calling this function with a different `level` or `log_dir` after a
///   successful init is rejected.
/// - Initialization never panics.
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when `log_dir` is empty, non-absolute, or cannot be created.
/// - Returns an error when logger backend setup fails.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = parse_level(level)?;
    let dir = parse_log_dir(log_dir)?;

    let state = LOG_STATE.get_or_try_init(|| ActiveLogger::start(level, dir.clone()))?;
    state.check_matches(level, &dir)
}

/// Returns active logging status metadata.
///
/// Returns `None` when logging has not been initialized.
/// Returns `(level, log_dir)` when logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    let state = LOG_STATE.get()?;
    Some((state.level, state.dir.clone()))
}

/// Returns the default log level for current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

impl ActiveLogger {
    fn start(level: &'static str, dir: PathBuf) -> Result<Self, String> {
        std::fs::create_dir_all(&dir)
            .map_err(|err| format!("cannot create log directory `{}`: {err}", dir.display()))?;

        let file_spec = FileSpec::default().directory(&dir).basename(LOG_BASENAME);
        let handle = Logger::try_with_str(level)
            .map_err(|err| format!("invalid log level `{level}`: {err}"))?
            .log_to_file(file_spec)
            .rotate(
                Criterion::Size(ROTATE_AT_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
            )
            .append()
            .write_mode(WriteMode::BufferAndFlush)
            // Format: [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [module] file:line: message
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("cannot start logger: {err}"))?;

        hook_panics_once();

        info!(
            "event=core_init module=core status=ok level={level} log_dir={} version={}",
            dir.display(),
            env!("CARGO_PKG_VERSION")
        );

        Ok(Self {
            level,
            dir,
            _handle: handle,
        })
    }

    fn check_matches(&self, level: &'static str, dir: &Path) -> Result<(), String> {
        if self.dir != dir {
            return Err(format!(
                "logging already initialized at `{}`; refusing to switch to `{}`",
                self.dir.display(),
                dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already initialized with level `{}`; refusing to switch to `{}`",
                self.level, level
            ));
        }
        Ok(())
    }
}

fn parse_level(raw: &str) -> Result<&'static str, String> {
    let wanted = raw.trim();
    if wanted.eq_ignore_ascii_case("warning") {
        return Ok("warn");
    }
    LEVELS
        .iter()
        .find(|level| wanted.eq_ignore_ascii_case(level))
        .copied()
        .ok_or_else(|| {
            format!("unsupported log level `{wanted}`; expected one of trace, debug, info, warn, error")
        })
}

fn parse_log_dir(raw: &str) -> Result<PathBuf, String> {
    let dir = PathBuf::from(raw.trim());
    if dir.as_os_str().is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    if dir.is_relative() {
        return Err(format!(
            "log_dir must be an absolute path, got `{}`",
            dir.display()
        ));
    }
    Ok(dir)
}

fn hook_panics_once() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = match info.location() {
            Some(loc) => format!("{}:{}", loc.file(), loc.line()),
            None => "unknown".to_string(),
        };
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            flatten_panic_text(info)
        );
        chained(info);
    }));
}

fn flatten_panic_text(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    // Panic payloads can carry request text. Cap and flatten before logging.
    let text = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    clamp_log_text(&text, PANIC_TEXT_CAP)
}

fn clamp_log_text(text: &str, cap: usize) -> String {
    let mut out = String::with_capacity(text.len().min(cap));
    let mut chars = text.chars();
    for ch in chars.by_ref().take(cap) {
        out.push(if ch == '\n' || ch == '\r' { ' ' } else { ch });
    }
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{clamp_log_text, init_logging, logging_status, parse_level, parse_log_dir};

    #[test]
    fn level_parsing_is_case_insensitive_and_maps_warning() {
        assert_eq!(parse_level("INFO").unwrap(), "info");
        assert_eq!(parse_level(" warning ").unwrap(), "warn");
        assert_eq!(parse_level("Trace").unwrap(), "trace");
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn log_dir_must_be_absolute_and_non_empty() {
        let error = parse_log_dir("logs/dev").unwrap_err();
        assert!(error.contains("absolute"));
        assert!(parse_log_dir("  ").is_err());
    }

    #[test]
    fn panic_text_is_flattened_and_clamped() {
        let clamped = clamp_log_text("line1\nline2\rline3", 8);
        assert!(!clamped.contains('\n'));
        assert!(!clamped.contains('\r'));
        assert!(clamped.ends_with("..."));

        assert_eq!(clamp_log_text("short", 8), "short");
    }

    #[test]
    fn init_is_idempotent_and_pins_level_and_directory() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let first_dir = first.path().to_str().unwrap();
        let second_dir = second.path().to_str().unwrap();

        init_logging("info", first_dir).unwrap();
        init_logging("info", first_dir).unwrap();

        let level_error = init_logging("debug", first_dir).unwrap_err();
        assert!(level_error.contains("refusing to switch"));
        let dir_error = init_logging("info", second_dir).unwrap_err();
        assert!(dir_error.contains("refusing to switch"));

        let (active_level, active_dir) = logging_status().unwrap();
        assert_eq!(active_level, "info");
        assert_eq!(active_dir, first.path());
    }
}
