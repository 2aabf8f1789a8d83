use crate::probe::constants::{ECHO_SEQUENCE, RECV_BUFFER_SIZE};
use crate::probe::deadline::DeadlineBudget;
use crate::probe::error::Result;
use crate::probe::outcome::ProbeOutcome;
use crate::probe::transport::EchoTransport;
use crate::probe::waiter::{ReadinessWaiter, WaitStatus};
use crate::protocol::{EchoReply, EchoRequest, Timestamp};
use std::net::Ipv4Addr;
use std::time::Instant;
use tracing::debug;

/// Everything one probe needs to know, passed explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeContext {
    pub target: Ipv4Addr,
    pub timeout_ms: u64,
    pub identifier: u16,
    pub sequence: u16,
}

impl ProbeContext {
    /// Context for `target` using the process-derived identifier
    pub fn new(target: Ipv4Addr, timeout_ms: u64) -> Self {
        Self {
            target,
            timeout_ms,
            identifier: process_identifier(),
            sequence: ECHO_SEQUENCE,
        }
    }

    pub fn with_identifier(mut self, identifier: u16) -> Self {
        self.identifier = identifier;
        self
    }
}

/// Echo identifier derived from the process id (low 16 bits)
pub fn process_identifier() -> u16 {
    (std::process::id() & 0xFFFF) as u16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Sent,
    Waiting,
    Filtering,
    Up,
    NotUp,
    Failed,
}

/// One send-and-verify cycle over a transport and a readiness waiter.
///
/// Exactly one echo request is sent. Inbound datagrams that are not the
/// reply to it are ignored and the wait budget is recomputed from the time
/// elapsed since sending, until a reply matches or the budget runs out.
pub struct ProbeCycle<'a, T: EchoTransport, W: ReadinessWaiter> {
    context: &'a ProbeContext,
    transport: &'a mut T,
    waiter: &'a mut W,
    state: ProbeState,
}

impl<'a, T: EchoTransport, W: ReadinessWaiter> ProbeCycle<'a, T, W> {
    pub fn new(context: &'a ProbeContext, transport: &'a mut T, waiter: &'a mut W) -> Self {
        Self {
            context,
            transport,
            waiter,
            state: ProbeState::Idle,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Run the cycle to a terminal state
    pub fn run(&mut self) -> Result<ProbeOutcome> {
        let result = self.drive();
        let terminal = match &result {
            Ok(ProbeOutcome::Up(_)) => ProbeState::Up,
            Ok(ProbeOutcome::NotUp) => ProbeState::NotUp,
            Err(_) => ProbeState::Failed,
        };
        self.transition(terminal);
        result
    }

    fn drive(&mut self) -> Result<ProbeOutcome> {
        let target = self.context.target;
        let request = EchoRequest::new(
            self.context.identifier,
            self.context.sequence,
            Timestamp::now(),
        );

        let sent_at = Instant::now();
        self.transport.send_request(target, &request)?;
        self.transition(ProbeState::Sent);

        let mut budget = DeadlineBudget::new(self.context.timeout_ms);
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        loop {
            self.transition(ProbeState::Waiting);
            let final_poll = budget.is_exhausted();
            let status = self.waiter.wait_readable(budget.remaining_ms())?;
            let elapsed = sent_at.elapsed();

            match status {
                WaitStatus::TimedOut => {
                    debug!(elapsed_us = elapsed.as_micros() as u64, "No reply within timeout");
                    return Ok(ProbeOutcome::NotUp);
                }
                WaitStatus::Interrupted => {}
                WaitStatus::Ready => {
                    self.transition(ProbeState::Filtering);
                    if self.is_reply(&request, &mut buf)? {
                        debug!(rtt_us = elapsed.as_micros() as u64, "Matching echo reply");
                        return Ok(ProbeOutcome::Up(elapsed));
                    }
                }
            }

            // Once the budget is gone only datagrams already queued get one look
            if final_poll {
                debug!("Budget exhausted while filtering unrelated traffic");
                return Ok(ProbeOutcome::NotUp);
            }
            budget.shrink(elapsed);
        }
    }

    fn is_reply(&mut self, request: &EchoRequest, buf: &mut [u8]) -> Result<bool> {
        let Some(len) = self.transport.recv_datagram(buf)? else {
            return Ok(false);
        };

        let reply = match EchoReply::parse(&buf[..len]) {
            Ok(reply) => reply,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed datagram");
                return Ok(false);
            }
        };

        match reply.answers(request, self.context.target) {
            Ok(()) => Ok(true),
            Err(mismatch) => {
                debug!(
                    ?mismatch,
                    source = %reply.source,
                    icmp_type = reply.icmp_type,
                    identifier = reply.identifier,
                    sequence = reply.sequence,
                    "Ignoring unrelated ICMP traffic"
                );
                Ok(false)
            }
        }
    }

    fn transition(&mut self, next: ProbeState) {
        debug!(from = ?self.state, to = ?next, "Probe state transition");
        self.state = next;
    }
}
