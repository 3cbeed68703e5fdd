use super::AppConfig;
use anyhow::{bail, Result};
use clap::Parser;

pub(super) const MIN_LINE_BYTES: usize = 1024;
pub(super) const MAX_LINE_BYTES_HARD_LIMIT: usize = 16 * 1024 * 1024;
pub(super) const MAX_SESSION_ID_LEN: usize = 64;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values before anything starts reading the wire.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_LINE_BYTES..=MAX_LINE_BYTES_HARD_LIMIT).contains(&self.max_line_bytes) {
            bail!(
                "--max-line-bytes must be between {MIN_LINE_BYTES} and {MAX_LINE_BYTES_HARD_LIMIT}, got {}",
                self.max_line_bytes
            );
        }

        if let Some(session_id) = &self.session_id {
            if session_id.is_empty() || session_id.len() > MAX_SESSION_ID_LEN {
                bail!(
                    "--session-id must be between 1 and {MAX_SESSION_ID_LEN} characters, got {}",
                    session_id.len()
                );
            }
            if !session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                bail!("--session-id may only contain ASCII letters, digits, '-' and '_'");
            }
        }

        Ok(())
    }
}
