//! End-to-end probe cycles over a loopback UDP "network".
//!
//! A responder thread plays the remote host and writes IPv4 + ICMP
//! datagrams into a UDP socket that the real epoll waiter watches.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};
use superping::probe::{
    EchoTransport, EpollWaiter, ProbeContext, ProbeOutcome, ProbeSession, Result,
};
use superping::protocol::{internet_checksum, EchoRequest, ICMP_ECHO_REPLY};

const TARGET: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 99);

/// One datagram the fake host sends after `delay_ms`
#[derive(Clone, Copy)]
struct Scheduled {
    delay_ms: u64,
    identifier_offset: u16,
}

struct LoopbackTransport {
    inbox: UdpSocket,
    host: SocketAddr,
    schedule: Vec<Scheduled>,
    responder: Option<thread::JoinHandle<()>>,
}

impl LoopbackTransport {
    fn new(schedule: Vec<Scheduled>) -> Self {
        let inbox = UdpSocket::bind("127.0.0.1:0").unwrap();
        inbox.set_nonblocking(true).unwrap();
        let host = inbox.local_addr().unwrap();
        Self {
            inbox,
            host,
            schedule,
            responder: None,
        }
    }
}

fn reply_datagram(request: &EchoRequest, identifier_offset: u16) -> Vec<u8> {
    let mut icmp = request.as_bytes().to_vec();
    icmp[0] = ICMP_ECHO_REPLY;
    let identifier = request.identifier().wrapping_add(identifier_offset);
    icmp[4..6].copy_from_slice(&identifier.to_be_bytes());
    icmp[2..4].copy_from_slice(&[0, 0]);
    let checksum = internet_checksum(&icmp);
    icmp[2..4].copy_from_slice(&checksum.to_be_bytes());

    let mut datagram = vec![0x45, 0, 0, 44, 0, 0, 0, 0, 64, 1, 0, 0];
    datagram.extend_from_slice(&TARGET.octets());
    datagram.extend_from_slice(&[192, 0, 2, 1]);
    datagram.extend_from_slice(&icmp);
    datagram
}

impl EchoTransport for LoopbackTransport {
    fn send_request(&mut self, destination: Ipv4Addr, request: &EchoRequest) -> Result<()> {
        assert_eq!(destination, TARGET);
        let schedule = self.schedule.clone();
        let request = request.clone();
        let host = self.host;

        self.responder = Some(thread::spawn(move || {
            let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
            let start = Instant::now();
            for item in schedule {
                let due = Duration::from_millis(item.delay_ms);
                if let Some(wait) = due.checked_sub(start.elapsed()) {
                    thread::sleep(wait);
                }
                let _ = socket.send_to(&reply_datagram(&request, item.identifier_offset), host);
            }
        }));
        Ok(())
    }

    fn recv_datagram(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        match self.inbox.recv(buf) {
            Ok(len) => Ok(Some(len)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => panic!("loopback receive failed: {}", e),
        }
    }

    fn close(&mut self) {
        if let Some(responder) = self.responder.take() {
            let _ = responder.join();
        }
    }
}

fn probe(schedule: Vec<Scheduled>, timeout_ms: u64) -> Result<(ProbeOutcome, Duration)> {
    let transport = LoopbackTransport::new(schedule);
    let waiter = EpollWaiter::register(&transport.inbox)?;
    let mut session = ProbeSession::from_parts(transport, waiter);

    let context = ProbeContext::new(TARGET, timeout_ms);
    let start = Instant::now();
    let outcome = session.probe(&context)?;
    let waited = start.elapsed();
    session.close();
    Ok((outcome, waited))
}

#[test]
fn test_prompt_reply_is_up() -> Result<()> {
    let (outcome, _) = probe(
        vec![Scheduled { delay_ms: 20, identifier_offset: 0 }],
        1000,
    )?;

    let ProbeOutcome::Up(rtt) = outcome else {
        panic!("expected the host to be up");
    };
    assert!(rtt >= Duration::from_millis(20), "rtt {:?}", rtt);
    assert!(rtt < Duration::from_millis(500), "rtt {:?}", rtt);
    Ok(())
}

#[test]
fn test_silent_host_times_out() -> Result<()> {
    let (outcome, waited) = probe(vec![], 200)?;

    assert_eq!(outcome, ProbeOutcome::NotUp);
    assert!(waited >= Duration::from_millis(190), "waited {:?}", waited);
    assert!(waited < Duration::from_millis(700), "waited {:?}", waited);
    Ok(())
}

#[test]
fn test_unrelated_reply_is_filtered() -> Result<()> {
    let (outcome, _) = probe(
        vec![
            Scheduled { delay_ms: 10, identifier_offset: 1 },
            Scheduled { delay_ms: 60, identifier_offset: 0 },
        ],
        200,
    )?;

    let ProbeOutcome::Up(rtt) = outcome else {
        panic!("expected the genuine reply to be accepted");
    };
    assert!(rtt >= Duration::from_millis(60), "rtt {:?}", rtt);
    assert!(rtt < Duration::from_millis(200), "rtt {:?}", rtt);
    Ok(())
}

#[test]
fn test_only_unrelated_traffic_times_out() -> Result<()> {
    let (outcome, waited) = probe(
        vec![
            Scheduled { delay_ms: 10, identifier_offset: 7 },
            Scheduled { delay_ms: 30, identifier_offset: 9 },
        ],
        150,
    )?;

    assert_eq!(outcome, ProbeOutcome::NotUp);
    assert!(waited >= Duration::from_millis(140), "waited {:?}", waited);
    assert!(waited < Duration::from_millis(600), "waited {:?}", waited);
    Ok(())
}
