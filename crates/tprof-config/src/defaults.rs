use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Environment variable overriding the log filter.
pub const LOG_FILTER_ENV: &str = "TPROF_LOG_FILTER";

/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "TPROF_LOG_FORMAT";

/// Environment variable naming the directory that receives fact records.
pub const WORKSPACE_ENV: &str = "TPROF_WORKSPACE";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
