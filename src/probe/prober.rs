use std::future::Future;
use std::io;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::net::{TcpStream, lookup_host};
use tokio::process::Command;
use tokio::time::timeout;

use super::ping_output::parse_ping_latency;
use super::prelude::*;

/// Measures one round-trip against one candidate.
///
/// Implementations must contain every failure in the returned `ProbeOutcome`;
/// a probe never returns an error and never panics on bad input.
pub trait Prober: Send + Sync + 'static {
    fn probe(
        &self,
        candidate: &Candidate,
        timeout: Duration,
    ) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Rejects addresses that would be interpreted as options or split by the probe tool.
fn is_probeable_address(address: &str) -> bool {
    !address.is_empty()
        && !address.starts_with('-')
        && !address.chars().any(|c| c.is_whitespace() || c.is_control())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Probes with a single ICMP echo by running the system `ping` binary.
#[derive(Debug, Clone)]
pub struct PingProber {
    command: String,
}

impl PingProber {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for PingProber {
    fn default() -> Self {
        Self::new("ping")
    }
}

impl Prober for PingProber {
    async fn probe(&self, candidate: &Candidate, deadline: Duration) -> ProbeOutcome {
        let id = candidate.id.as_str();
        if !is_probeable_address(&candidate.address) {
            log::debug!("[{id}] refusing to ping address {:?}", candidate.address);
            return ProbeOutcome::failure(id, FailureReason::ProcessError);
        }

        let child = Command::new(&self.command)
            .args(["-n", "-c", "1"])
            .arg(&candidate.address)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                log::debug!("[{id}] failed to launch {}: {e}", self.command);
                return ProbeOutcome::failure(id, FailureReason::ProcessError);
            }
        };

        let output = match timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                log::debug!("[{id}] ping did not complete: {e}");
                return ProbeOutcome::failure(id, FailureReason::ProcessError);
            }
            Err(_) => return ProbeOutcome::failure(id, FailureReason::Timeout),
        };

        classify_exit(
            id,
            output.status.code(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )
    }
}

/// Maps a finished `ping` run to an outcome.
///
/// iputils exits 1 when no reply arrived. BSD and macOS exit 2 for the same
/// case but still print the packet statistics, whereas their usage and
/// resolver errors exit 2 (or 64/68) with a message on stderr only.
fn classify_exit(id: &str, code: Option<i32>, stdout: &str, stderr: &str) -> ProbeOutcome {
    let stderr = stderr.trim();
    match code {
        Some(0) => match parse_ping_latency(stdout) {
            Some(latency_ms) => ProbeOutcome::success(id, latency_ms),
            None => {
                log::debug!("[{id}] could not read a latency from ping output");
                ProbeOutcome::failure(id, FailureReason::ParseError)
            }
        },
        Some(1) => ProbeOutcome::failure(id, FailureReason::Unreachable),
        Some(2) if stdout.contains("packets transmitted") || stderr.is_empty() => {
            ProbeOutcome::failure(id, FailureReason::Unreachable)
        }
        code => {
            log::debug!("[{id}] ping exited with {code:?}: {stderr}");
            ProbeOutcome::failure(id, FailureReason::ProcessError)
        }
    }
}

/// Probes by timing a TCP handshake to a fixed port. Name resolution is excluded from the latency.
#[derive(Debug, Clone)]
pub struct TcpProber {
    port: u16,
}

impl TcpProber {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

impl Prober for TcpProber {
    async fn probe(&self, candidate: &Candidate, deadline: Duration) -> ProbeOutcome {
        let id = candidate.id.as_str();
        if !is_probeable_address(&candidate.address) {
            return ProbeOutcome::failure(id, FailureReason::ProcessError);
        }

        let started = Instant::now();
        let resolved = timeout(deadline, lookup_host((candidate.address.as_str(), self.port))).await;
        let socket_addr = match resolved {
            Ok(Ok(mut addrs)) => match addrs.next() {
                Some(addr) => addr,
                None => return ProbeOutcome::failure(id, FailureReason::Unreachable),
            },
            Ok(Err(e)) => {
                log::debug!("[{id}] lookup of {} failed: {e}", candidate.address);
                return ProbeOutcome::failure(id, FailureReason::Unreachable);
            }
            Err(_) => return ProbeOutcome::failure(id, FailureReason::Timeout),
        };

        let remaining = deadline.saturating_sub(started.elapsed());
        let connect_start = Instant::now();
        match timeout(remaining, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_stream)) => ProbeOutcome::success(id, elapsed_ms(connect_start)),
            Ok(Err(e)) if e.kind() == io::ErrorKind::InvalidInput => {
                ProbeOutcome::failure(id, FailureReason::ProcessError)
            }
            Ok(Err(e)) => {
                log::debug!("[{id}] connect to {socket_addr} failed: {e}");
                ProbeOutcome::failure(id, FailureReason::Unreachable)
            }
            Err(_) => ProbeOutcome::failure(id, FailureReason::Timeout),
        }
    }
}

/// The prober selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredProber {
    Ping(PingProber),
    Tcp(TcpProber),
}

impl Prober for ConfiguredProber {
    async fn probe(&self, candidate: &Candidate, deadline: Duration) -> ProbeOutcome {
        match self {
            ConfiguredProber::Ping(prober) => prober.probe(candidate, deadline).await,
            ConfiguredProber::Tcp(prober) => prober.probe(candidate, deadline).await,
        }
    }
}
