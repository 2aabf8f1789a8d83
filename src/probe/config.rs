use crate::probe::constants::{DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_MS, LOG_LEVELS};
use crate::probe::error::{ProbeError, Result};
use crate::probe::outcome::exit_code_table;
use clap::Parser;
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug, Clone)]
#[command(name = "superping")]
#[command(about = "Check whether a host answers an ICMP echo request within a timeout")]
#[command(after_help = exit_code_table())]
pub struct Config {
    /// Host to ping (dotted IPv4 address or host name)
    pub host: String,

    /// Maximum number of milliseconds to wait for a reply
    #[arg(short = 't', long = "timeout", value_name = "MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Write out what is happening
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the response time in microseconds
    #[arg(short = 'p', long)]
    pub print_response_time: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Log format (text or json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub log_format: String,
}

impl Config {
    /// Returns the configured timeout as a Duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the configuration values
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");
        if self.host.trim().is_empty() {
            return Err(ProbeError::Parameter("no address to ping specified".into()));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ProbeError::Parameter(format!(
                "log_level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }
        debug!("Configuration validated successfully");
        Ok(())
    }

    /// Returns true if JSON format logging is enabled
    pub fn is_json_format(&self) -> bool {
        self.log_format.to_lowercase() == "json"
    }
}
