use crate::probe::error::{ProbeError, Result};
use nix::errno::Errno;
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags};
use std::io;
use std::os::fd::AsFd;
use tracing::{debug, warn};

/// Result of one bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// The registered handle has data to read
    Ready,
    /// The timeout elapsed with nothing to read
    TimedOut,
    /// A signal cut the wait short; the caller treats it as a spurious wake
    Interrupted,
}

/// Trait for blocking until the transport is readable or a deadline passes
pub trait ReadinessWaiter {
    /// Wait at most `timeout_ms` milliseconds. Zero polls once without blocking.
    fn wait_readable(&mut self, timeout_ms: u64) -> Result<WaitStatus>;

    /// Release the registration. Safe to call more than once.
    fn close(&mut self);
}

/// epoll instance watching a single handle for input
pub struct EpollWaiter {
    epoll: Option<Epoll>,
}

impl EpollWaiter {
    /// Create the epoll instance and register `source` for readability
    pub fn register<F: AsFd>(source: F) -> Result<Self> {
        debug!("Creating epoll instance");
        let epoll = Epoll::new(EpollCreateFlags::EPOLL_CLOEXEC).map_err(|e| {
            warn!(error = %e, "Failed to create epoll instance");
            ProbeError::WaitRegistration(io::Error::from(e))
        })?;

        epoll
            .add(source, EpollEvent::new(EpollFlags::EPOLLIN, 0))
            .map_err(|e| {
                warn!(error = %e, "Failed to register handle with epoll");
                ProbeError::WaitRegistration(io::Error::from(e))
            })?;

        debug!("Handle registered for readiness");
        Ok(Self { epoll: Some(epoll) })
    }

    pub fn is_open(&self) -> bool {
        self.epoll.is_some()
    }
}

impl ReadinessWaiter for EpollWaiter {
    fn wait_readable(&mut self, timeout_ms: u64) -> Result<WaitStatus> {
        let epoll = self.epoll.as_ref().ok_or(ProbeError::Closed)?;
        // epoll_wait takes a C int; anything negative would block forever
        let timeout = timeout_ms.min(i32::MAX as u64) as isize;
        let mut events = [EpollEvent::empty()];

        match epoll.wait(&mut events, timeout) {
            Ok(0) => Ok(WaitStatus::TimedOut),
            Ok(_) => Ok(WaitStatus::Ready),
            Err(Errno::EINTR) => {
                debug!("Wait interrupted by signal");
                Ok(WaitStatus::Interrupted)
            }
            Err(e) => {
                warn!(error = %e, "epoll_wait failed");
                Err(ProbeError::WaitFailed(io::Error::from(e)))
            }
        }
    }

    fn close(&mut self) {
        if self.epoll.take().is_some() {
            debug!("Epoll instance closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use std::net::UdpSocket;
    use std::time::{Duration, Instant};

    mock! {
        pub ReadinessWaiter {}

        impl ReadinessWaiter for ReadinessWaiter {
            fn wait_readable(&mut self, timeout_ms: u64) -> Result<WaitStatus>;
            fn close(&mut self);
        }
    }

    fn loopback_socket() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").expect("Failed to bind loopback socket")
    }

    #[test]
    fn test_zero_timeout_polls_without_blocking() -> Result<()> {
        let socket = loopback_socket();
        let mut waiter = EpollWaiter::register(&socket)?;

        let start = Instant::now();
        assert_eq!(waiter.wait_readable(0)?, WaitStatus::TimedOut);
        assert!(start.elapsed() < Duration::from_millis(50));
        Ok(())
    }

    #[test]
    fn test_wait_times_out_after_budget() -> Result<()> {
        let socket = loopback_socket();
        let mut waiter = EpollWaiter::register(&socket)?;

        let start = Instant::now();
        assert_eq!(waiter.wait_readable(60)?, WaitStatus::TimedOut);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(55), "returned after {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1000));
        Ok(())
    }

    #[test]
    fn test_wait_ready_when_datagram_pending() -> Result<()> {
        let socket = loopback_socket();
        let sender = loopback_socket();
        let mut waiter = EpollWaiter::register(&socket)?;

        sender
            .send_to(b"ping", socket.local_addr().unwrap())
            .unwrap();

        assert_eq!(waiter.wait_readable(1000)?, WaitStatus::Ready);
        Ok(())
    }

    #[test]
    fn test_close_is_idempotent() -> Result<()> {
        let socket = loopback_socket();
        let mut waiter = EpollWaiter::register(&socket)?;
        assert!(waiter.is_open());

        waiter.close();
        waiter.close();

        assert!(!waiter.is_open());
        assert!(matches!(waiter.wait_readable(0), Err(ProbeError::Closed)));
        Ok(())
    }
}

#[cfg(test)]
pub use tests::MockReadinessWaiter;
