use std::fmt::Write;
use std::time::Duration;

/// Terminal result of a probe that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The host answered; carries the measured round-trip time
    Up(Duration),
    /// No matching reply arrived within the timeout
    NotUp,
}

impl ProbeOutcome {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            ProbeOutcome::Up(_) => ExitStatus::HostUp,
            ProbeOutcome::NotUp => ExitStatus::HostNotUp,
        }
    }
}

/// Process exit codes, the tool's structured output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    HostUp = 0,
    HostNotUp = 1,
    BadParameter = 2,
    BadAddress = 3,
    NotPermitted = 4,
    SocketFailed = 5,
    NonBlockingFailed = 6,
    WaitFailed = 7,
    SendFailed = 8,
}

impl ExitStatus {
    pub const ALL: [ExitStatus; 9] = [
        ExitStatus::HostUp,
        ExitStatus::HostNotUp,
        ExitStatus::BadParameter,
        ExitStatus::BadAddress,
        ExitStatus::NotPermitted,
        ExitStatus::SocketFailed,
        ExitStatus::NonBlockingFailed,
        ExitStatus::WaitFailed,
        ExitStatus::SendFailed,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitStatus::HostUp => "Host is up",
            ExitStatus::HostNotUp => "Host is not up",
            ExitStatus::BadParameter => "Bad parameters",
            ExitStatus::BadAddress => "Bad IP or host name",
            ExitStatus::NotPermitted => "Insufficient privilege",
            ExitStatus::SocketFailed => "Failure creating socket",
            ExitStatus::NonBlockingFailed => "Failure configuring nonblocking",
            ExitStatus::WaitFailed => "Failure configuring or waiting on epoll",
            ExitStatus::SendFailed => "Problem sending packet",
        }
    }
}

/// Exit code table appended to `--help`
pub fn exit_code_table() -> String {
    let mut table = String::from("Exit codes:\n");
    for status in ExitStatus::ALL {
        let label = format!("{}:", status.description());
        // Writing to a String cannot fail
        let _ = writeln!(table, "  {:<42}{}", label, status.code());
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_exit_status() {
        assert_eq!(
            ProbeOutcome::Up(Duration::from_millis(3)).exit_status().code(),
            0
        );
        assert_eq!(ProbeOutcome::NotUp.exit_status().code(), 1);
    }

    #[test]
    fn test_codes_are_contiguous() {
        for (expected, status) in ExitStatus::ALL.iter().enumerate() {
            assert_eq!(status.code(), expected as i32);
        }
    }

    #[test]
    fn test_exit_code_table_lists_every_code() {
        let table = exit_code_table();
        assert_eq!(table.lines().count(), ExitStatus::ALL.len() + 1);
        assert!(table.contains("Host is up:"));
        assert!(table.contains("Problem sending packet:"));
        assert!(table.trim_end().ends_with('8'));
    }
}
