//! Transfer statistics.
//!
//! Plain atomic counters: every task bumps them without coordination, and
//! readers accept a slightly torn snapshot.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Running totals since server start.
#[derive(Debug)]
pub struct Stats {
    started: Instant,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    messages_bad: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            messages_sent: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            messages_bad: AtomicU64::new(0),
        }
    }

    /// Accounts one line written to a socket.
    pub fn record_sent(&self, bytes: usize) {
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Accounts one line read from a socket.
    pub fn record_received(&self, bytes: usize) {
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Accounts one line that was dropped as malformed or unresolvable.
    pub fn record_bad(&self) {
        self.messages_bad.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.started.elapsed(),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_bad: self.messages_bad.load(Ordering::Relaxed),
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`Stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub uptime: Duration,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub messages_bad: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "uptime:            {}s", self.uptime.as_secs())?;
        writeln!(f, "bytes sent:        {}", self.bytes_sent)?;
        writeln!(f, "bytes received:    {}", self.bytes_received)?;
        writeln!(f, "messages sent:     {}", self.messages_sent)?;
        writeln!(f, "messages received: {}", self.messages_received)?;
        write!(f, "bad messages:      {}", self.messages_bad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = Stats::new();
        stats.record_sent(10);
        stats.record_sent(5);
        stats.record_received(7);
        stats.record_bad();

        let snap = stats.snapshot();
        assert_eq!(snap.bytes_sent, 15);
        assert_eq!(snap.messages_sent, 2);
        assert_eq!(snap.bytes_received, 7);
        assert_eq!(snap.messages_received, 1);
        assert_eq!(snap.messages_bad, 1);
    }

    #[test]
    fn test_snapshot_display_lists_every_counter() {
        let text = Stats::new().snapshot().to_string();
        for label in ["uptime", "bytes sent", "bytes received", "messages sent", "messages received", "bad messages"] {
            assert!(text.contains(label), "missing {label}");
        }
    }
}
