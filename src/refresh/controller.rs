use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::domain::record::{Record, Stats};
use crate::feed::{FeedSource, FetchError, ParseReport, aggregate, parse_feed};
use crate::refresh::notice::{Notice, NotificationSink};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Read-only view of the controller state handed to consumers.
///
/// Records and stats are shared, so cloning a snapshot is cheap. They are
/// replaced as a whole on every successful cycle and kept as they are when a
/// cycle fails.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub records: Arc<Vec<Record>>,
    pub stats: Arc<Stats>,
    pub report: ParseReport,
    pub loading: bool,
    pub error: Option<String>,
    pub last_synced: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No cycle has run yet.
    Idle,
    Loading,
    Ready,
    Errored,
}

impl Snapshot {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Errored
        } else if self.last_synced.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }
}

struct Outcome {
    seq: u64,
    result: Result<String, FetchError>,
}

/// Owns the fetch -> parse -> aggregate cycle and the state it produces.
///
/// The owner drives it by calling [`tick`](Self::tick) from its own loop. Each
/// cycle fetches on a worker thread; the result comes back over a channel and
/// is parsed and applied on the owner's thread. Cycles may overlap, but only
/// the most recently started one is ever applied.
pub struct RefreshController {
    source: Arc<dyn FeedSource>,
    sink: Box<dyn NotificationSink>,
    interval: Duration,
    next_due: Option<Instant>,

    latest_seq: u64,
    /// Every cycle up to and including this one was cancelled by `stop`.
    cancelled_through: u64,
    superseded: u64,

    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
    state: Snapshot,
}

impl RefreshController {
    pub fn new(
        source: Arc<dyn FeedSource>,
        sink: Box<dyn NotificationSink>,
        interval: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            sink,
            interval,
            next_due: None,
            latest_seq: 0,
            cancelled_through: 0,
            superseded: 0,
            tx,
            rx,
            state: Snapshot::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> &Snapshot {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.clone()
    }

    /// Outcomes that arrived after a newer cycle had started.
    pub fn superseded_count(&self) -> u64 {
        self.superseded
    }

    pub fn timer_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start the initial cycle and arm the periodic timer behind it.
    pub fn start_timer(&mut self) {
        self.start();
        self.next_due = Some(Instant::now() + self.interval);
    }

    /// Begin a refresh cycle and return its sequence number.
    ///
    /// The error flag is cleared, previous records and stats stay in place
    /// until the cycle completes.
    pub fn start(&mut self) -> u64 {
        self.latest_seq += 1;
        let seq = self.latest_seq;

        self.state.loading = true;
        self.state.error = None;

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = source.fetch();
            // Receiver is gone once the controller is dropped.
            let _ = tx.send(Outcome { seq, result });
        });

        log::debug!("refresh cycle {seq} started");
        seq
    }

    /// Manual re-invocation ("Sync Now" / "Retry").
    pub fn refetch(&mut self) -> u64 {
        self.start()
    }

    /// Disarm the timer and make every in-flight cycle's result a no-op.
    pub fn stop(&mut self) {
        self.next_due = None;
        self.cancelled_through = self.latest_seq;
        self.state.loading = false;
    }

    /// Fire the timer if it is due, then apply any finished cycles.
    ///
    /// A due tick is skipped while the latest cycle is still in flight, so a
    /// feed that never answers holds at most one timer-started fetch. Manual
    /// [`refetch`](Self::refetch) still supersedes it.
    ///
    /// Returns true when an outcome was applied.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(due) = self.next_due
            && now >= due
        {
            self.next_due = Some(now + self.interval);
            if self.state.loading {
                log::debug!(
                    "refresh cycle {} still in flight; timer tick skipped",
                    self.latest_seq
                );
            } else {
                self.start();
            }
        }

        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(outcome) => changed |= self.apply(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    /// Block for the next finished cycle.
    ///
    /// `None` on timeout, otherwise whether the outcome was applied.
    pub fn wait_outcome(&mut self, timeout: Duration) -> Option<bool> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(self.apply(outcome)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Wait until the latest cycle has been applied. False on timeout.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state.loading {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() || self.wait_outcome(left).is_none() {
                return !self.state.loading;
            }
        }
        true
    }

    fn apply(&mut self, outcome: Outcome) -> bool {
        if outcome.seq <= self.cancelled_through {
            log::debug!("refresh cycle {} finished after stop; ignored", outcome.seq);
            return false;
        }
        if outcome.seq != self.latest_seq {
            self.superseded += 1;
            log::debug!(
                "refresh cycle {} superseded by {}; result discarded",
                outcome.seq,
                self.latest_seq
            );
            return false;
        }

        self.state.loading = false;

        let notice = match outcome.result {
            Ok(text) => {
                let feed = parse_feed(&text);
                let stats = aggregate(&feed.records);
                log::info!(
                    "refresh cycle {}: {} records, {} labeled, {} categories ({} rows dropped)",
                    outcome.seq,
                    stats.total,
                    stats.labeled,
                    stats.categories.len(),
                    feed.report.dropped()
                );

                let notice = Notice::synced(feed.records.len());
                self.state.records = Arc::new(feed.records);
                self.state.stats = Arc::new(stats);
                self.state.report = feed.report;
                self.state.error = None;
                self.state.last_synced = Some(Utc::now());
                notice
            }
            Err(e) => {
                log::warn!("refresh cycle {} failed: {e}", outcome.seq);
                let msg = e.to_string();
                self.state.error = Some(msg.clone());
                Notice::failed(msg)
            }
        };

        self.sink.notify(&notice);
        true
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        self.stop();
    }
}
