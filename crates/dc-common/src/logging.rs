use std::any::Any;
use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

// Keeps the non-blocking file writer flushing for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static PANIC_HOOK: OnceLock<()> = OnceLock::new();

/// Logging knobs read from `DC_LOG_DIR` and `DC_LOG_INCLUDE_BACKTRACE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub dir: Option<PathBuf>,
    pub include_backtrace: bool,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = lookup("DC_LOG_INCLUDE_BACKTRACE").unwrap_or_default();
        Self {
            dir: lookup("DC_LOG_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            include_backtrace: matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Emits panics as `tracing` errors. The default hook (with its backtrace) still
/// runs when `include_backtrace` is set. Only the first call installs anything.
pub fn install_tracing_panic_hook(app_name: &'static str) {
    let include_backtrace = LogSettings::from_env().include_backtrace;

    PANIC_HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info.location().map(|loc| format!("{}:{}", loc.file(), loc.line()));
            tracing::error!(
                application = app_name,
                thread = std::thread::current().name().unwrap_or("unnamed"),
                location = location.as_deref().unwrap_or("unknown"),
                panic_message = panic_message(info.payload()),
                "panic"
            );
            if include_backtrace {
                previous(info);
            }
        }));
    });
}

/// Daily-rotated `<dir>/<app>.log`, or `None` when the directory is unusable.
fn daily_file_writer(dir: PathBuf, app_name: &str) -> Option<BoxMakeWriter> {
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("{app_name}: cannot create log dir {}: {err}; logging to stderr", dir.display());
        return None;
    }

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, format!("{app_name}.log")));
    FILE_GUARD.set(guard).ok()?;
    Some(BoxMakeWriter::new(writer))
}

/// Installs the global subscriber. `RUST_LOG` controls filtering (default `info`).
/// Output goes to stderr unless `DC_LOG_DIR` names a usable directory, which keeps
/// stdout free for command output.
pub fn init_tracing_subscriber(app_name: &'static str) {
    let settings = LogSettings::from_env();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = settings
        .dir
        .and_then(|dir| daily_file_writer(dir, app_name))
        .unwrap_or_else(|| BoxMakeWriter::new(std::io::stderr));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init();
}
