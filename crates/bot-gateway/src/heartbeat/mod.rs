//! Heartbeat monitor
//!
//! A watchdog, not a scheduler: it polls at fine granularity instead of
//! sleeping for the full interval, so a dynamically-set interval and external
//! shutdown are observed promptly, and it never blocks other work.

use crate::error::GatewayError;
use crate::protocol::Envelope;
use crate::session::SessionCommand;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Polling granularity of the monitor loop; liveness detection jitters by at
/// most this much.
pub const POLL_GRANULARITY: Duration = Duration::from_millis(200);

/// State shared between the monitor, the dispatcher, and the session machine
///
/// Each flag has a single producer and a single consumer:
/// - `interval_ms` is written by the session machine (on HELLO) and by the
///   monitor itself (zeroed on liveness loss); read by the monitor.
/// - `ack_pending` is set by the monitor when it sends a heartbeat and
///   cleared by the dispatcher on heartbeat-ack.
/// - `last_seq` is advanced by the dispatcher per dispatch envelope and read
///   when building heartbeat and resume payloads.
#[derive(Debug, Default)]
pub struct HeartbeatState {
    interval_ms: AtomicU64,
    ack_pending: AtomicBool,
    last_seq: AtomicU64,
}

impl HeartbeatState {
    /// Create a paused state with no interval set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current heartbeat interval in milliseconds (0 = paused)
    #[must_use]
    pub fn interval(&self) -> u64 {
        self.interval_ms.load(Ordering::SeqCst)
    }

    /// Set the heartbeat interval, unpausing the monitor
    pub fn set_interval(&self, millis: u64) {
        self.interval_ms.store(millis, Ordering::SeqCst);
    }

    /// Pause the monitor by zeroing the interval
    pub fn pause(&self) {
        self.interval_ms.store(0, Ordering::SeqCst);
    }

    /// Mark a heartbeat as sent and unanswered
    ///
    /// Returns whether one was already pending, i.e. the previous heartbeat
    /// was never answered.
    pub fn begin_beat(&self) -> bool {
        self.ack_pending.swap(true, Ordering::SeqCst)
    }

    /// Clear the ack-pending flag (a heartbeat was answered)
    pub fn ack(&self) {
        self.ack_pending.store(false, Ordering::SeqCst);
    }

    /// Check whether a sent heartbeat is still unanswered
    #[must_use]
    pub fn is_ack_pending(&self) -> bool {
        self.ack_pending.load(Ordering::SeqCst)
    }

    /// Advance the last-seen sequence number; never decreases
    pub fn record_seq(&self, seq: u64) {
        self.last_seq.fetch_max(seq, Ordering::SeqCst);
    }

    /// Last-seen sequence number
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.last_seq.load(Ordering::SeqCst)
    }

    /// Reset per-connection state: paused, no heartbeat in flight
    ///
    /// The sequence number is kept; it must survive reconnects for resume.
    pub fn reset(&self) {
        self.pause();
        self.ack();
    }
}

/// Independent polling loop verifying connection liveness
///
/// Each time elapsed-since-last-send reaches the interval: if no ack is
/// pending, send a heartbeat carrying the last-seen sequence; if the previous
/// heartbeat is still unanswered, declare the connection dead, pause, and
/// force a reconnect.
pub struct HeartbeatMonitor {
    state: Arc<HeartbeatState>,
    outbound: mpsc::UnboundedSender<Envelope>,
    control: mpsc::UnboundedSender<SessionCommand>,
}

impl HeartbeatMonitor {
    /// Create a monitor for one connection
    #[must_use]
    pub fn new(
        state: Arc<HeartbeatState>,
        outbound: mpsc::UnboundedSender<Envelope>,
        control: mpsc::UnboundedSender<SessionCommand>,
    ) -> Self {
        Self {
            state,
            outbound,
            control,
        }
    }

    /// Run the watchdog loop until the connection's channels close
    pub async fn run(self) {
        let mut last_sent = Instant::now();

        loop {
            tokio::time::sleep(POLL_GRANULARITY).await;

            let interval = self.state.interval();
            if interval == 0 {
                continue;
            }
            if last_sent.elapsed() < Duration::from_millis(interval) {
                continue;
            }

            if self.state.begin_beat() {
                // Previous heartbeat unanswered: the connection is dead
                self.state.pause();
                tracing::warn!(
                    interval_ms = interval,
                    "gateway did not answer heartbeat, forcing reconnect"
                );
                let _ = self
                    .control
                    .send(SessionCommand::Fault(GatewayError::Liveness));
                return;
            }

            let seq = self.state.seq();
            tracing::trace!(seq, "sending heartbeat");
            if self.outbound.send(Envelope::heartbeat(seq)).is_err() {
                return;
            }
            last_sent = Instant::now();
        }
    }
}
