use crate::probe::cycle::{ProbeContext, ProbeCycle};
use crate::probe::error::Result;
use crate::probe::outcome::ProbeOutcome;
use crate::probe::transport::{EchoTransport, RawIcmpTransport};
use crate::probe::waiter::{EpollWaiter, ReadinessWaiter};
use tracing::debug;

/// The endpoint and its readiness registration, released together.
///
/// `close` is the single cleanup routine: it runs on every exit path, either
/// called explicitly or from `Drop`, and is safe to repeat.
pub struct ProbeSession<T: EchoTransport = RawIcmpTransport, W: ReadinessWaiter = EpollWaiter> {
    transport: T,
    waiter: W,
    closed: bool,
}

impl ProbeSession {
    /// Open the raw socket, make it non-blocking, and register it for readiness.
    pub fn open() -> Result<Self> {
        let transport = RawIcmpTransport::open()?;
        // A registration failure drops the transport, closing the socket
        let waiter = EpollWaiter::register(transport.handle()?)?;
        Ok(Self::from_parts(transport, waiter))
    }
}

impl<T: EchoTransport, W: ReadinessWaiter> ProbeSession<T, W> {
    pub fn from_parts(transport: T, waiter: W) -> Self {
        Self {
            transport,
            waiter,
            closed: false,
        }
    }

    /// Run one probe cycle over this session's resources
    pub fn probe(&mut self, context: &ProbeContext) -> Result<ProbeOutcome> {
        ProbeCycle::new(context, &mut self.transport, &mut self.waiter).run()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release the registration and the endpoint
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.waiter.close();
        self.transport.close();
        self.closed = true;
        debug!("Probe session closed");
    }
}

impl<T: EchoTransport, W: ReadinessWaiter> Drop for ProbeSession<T, W> {
    fn drop(&mut self) {
        self.close();
    }
}
