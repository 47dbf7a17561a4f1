use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_FILTER_ENV: &str = "MATRIX_CHAT_LOG";

/// Where diagnostics may go without corrupting the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Plain stdout/stderr commands (`say`, `status`).
    Console,
    /// The alternate-screen UI; stderr shares the terminal, so logging is
    /// off unless explicitly requested (e.g. with `2>debug.log`).
    FullScreen,
}

impl LogTarget {
    pub fn default_directive(self) -> &'static str {
        match self {
            LogTarget::Console => "warn",
            LogTarget::FullScreen => "off",
        }
    }
}

pub fn build_filter(target: LogTarget, configured: Option<&str>) -> EnvFilter {
    configured
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(target.default_directive()))
}

/// Installs the global subscriber; writes to stderr without ANSI colors.
pub fn init_tracing(target: LogTarget) {
    let configured = std::env::var(LOG_FILTER_ENV).ok();
    let filter = build_filter(target, configured.as_deref());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
