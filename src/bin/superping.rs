use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::io;
use superping::probe::{
    ensure_raw_socket_privilege, init_logging_with_config, resolve_target, Config, ExitStatus,
    ProbeContext, ProbeError, ProbeOutcome, ProbeSession, Reporter,
};
use tracing::{debug, error, info};

fn main() {
    let config = match Config::try_parse() {
        Ok(config) => config,
        Err(e) => {
            // Help goes to stdout and is not an error
            let status = if e.use_stderr() {
                ExitStatus::BadParameter.code()
            } else {
                ExitStatus::HostUp.code()
            };
            let _ = e.print();
            std::process::exit(status);
        }
    };

    init_logging_with_config(&config.log_level, config.is_json_format());

    let status = match run(&config) {
        Ok(outcome) => {
            info!(?outcome, "Probe finished");
            outcome.exit_status()
        }
        Err(e) => {
            let status = exit_status_for(&e);
            error!(error = %e, code = status.code(), "Probe failed");
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            status
        }
    };

    // Every resource owned by `run` has been released at this point
    std::process::exit(status.code());
}

fn run(config: &Config) -> Result<ProbeOutcome> {
    config.validate()?;

    let target = resolve_target(&config.host)?;
    debug!(host = %config.host, target = %target, "Target resolved");

    ensure_raw_socket_privilege()?;

    let mut session = ProbeSession::open().context("Failed to prepare the probe")?;
    let context = ProbeContext::new(target, config.timeout_ms);
    let reporter = Reporter::from_config(config);
    let mut stdout = io::stdout().lock();

    reporter
        .announce(&mut stdout, target)
        .context("Failed to write to stdout")?;

    let result = session.probe(&context);
    session.close();

    let outcome = result.with_context(|| format!("Probe of {} failed", target))?;
    reporter
        .report(&mut stdout, &outcome)
        .context("Failed to write to stdout")?;
    Ok(outcome)
}

/// Map an error chain to the exit status of the `ProbeError` inside it
fn exit_status_for(error: &anyhow::Error) -> ExitStatus {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ProbeError>())
        .map(ProbeError::exit_status)
        // Only a failed write to stdout gets here, after the probe itself ended
        .unwrap_or(ExitStatus::HostNotUp)
}
