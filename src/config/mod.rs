//! Command-line parsing and validation helpers.

#[cfg(test)]
mod tests;
mod validation;

use clap::Parser;

use crate::rpc::DEFAULT_MAX_LINE_BYTES;

/// CLI options for the bridge. Validated values keep the request server and
/// diagnostics safe.
#[derive(Debug, Parser, Clone)]
#[command(about = "Telephony control bridge (line-delimited JSON-RPC over stdio)", author, version)]
pub struct AppConfig {
    /// Session identifier advertised in the describe surface (generated when omitted)
    #[arg(long = "session-id", env = "TELBRIDGE_SESSION_ID")]
    pub session_id: Option<String>,

    /// Maximum accepted request line length in bytes
    #[arg(long = "max-line-bytes", default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "TELBRIDGE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "TELBRIDGE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging request/response content snippets (debug log only)
    #[arg(
        long = "log-content",
        env = "TELBRIDGE_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}
