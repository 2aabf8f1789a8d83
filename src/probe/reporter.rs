use crate::probe::config::Config;
use crate::probe::outcome::ProbeOutcome;
use colored::*;
use std::io::{self, Write};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Reporter for the probe's stdout output
///
/// Prints nothing unless `-v` or `-p` was given, and nothing at all when
/// the host is not up.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    verbose: bool,
    print_response_time: bool,
}

impl Reporter {
    pub fn new(verbose: bool, print_response_time: bool) -> Self {
        Self {
            verbose,
            print_response_time,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.verbose, config.print_response_time)
    }

    /// Announce the target before the request goes out
    pub fn announce<W: Write>(&self, out: &mut W, target: Ipv4Addr) -> io::Result<()> {
        if self.verbose {
            writeln!(out, "{} {}", "Pinging".bold(), target)?;
        }
        Ok(())
    }

    /// Print the result of a finished probe
    pub fn report<W: Write>(&self, out: &mut W, outcome: &ProbeOutcome) -> io::Result<()> {
        let ProbeOutcome::Up(rtt) = outcome else {
            return Ok(());
        };
        if self.verbose {
            writeln!(out, "{}", describe_round_trip(*rtt).green())?;
        }
        if self.print_response_time {
            writeln!(out, "{}", rtt.as_micros())?;
        }
        out.flush()
    }
}

/// Human-readable round-trip time split into s / ms / µs
pub fn describe_round_trip(rtt: Duration) -> String {
    let micros = rtt.subsec_micros();
    format!(
        "Got reply in {} seconds, {} milliseconds and {} microseconds.",
        rtt.as_secs(),
        micros / 1000,
        micros % 1000
    )
}
