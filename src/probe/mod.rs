//! Probe module: one ICMP echo exchange against a single host

pub mod config;
pub mod constants;
pub mod cycle;
pub mod deadline;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod privilege;
pub mod reporter;
pub mod resolve;
pub mod session;
pub mod transport;
pub mod waiter;

pub use config::Config;
pub use constants::*;
pub use cycle::{process_identifier, ProbeContext, ProbeCycle, ProbeState};
pub use deadline::DeadlineBudget;
pub use error::{ProbeError, Result};
pub use logging::init_logging_with_config;
pub use outcome::{exit_code_table, ExitStatus, ProbeOutcome};
pub use privilege::ensure_raw_socket_privilege;
pub use reporter::{describe_round_trip, Reporter};
pub use resolve::resolve_target;
pub use session::ProbeSession;
pub use transport::{EchoTransport, RawIcmpTransport};
pub use waiter::{EpollWaiter, ReadinessWaiter, WaitStatus};
