use log::debug;
use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::Duration;

use crate::{CancellationToken, Result};

/// Why a pause between watch ticks ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Something changed under the stats root
    Changed,
    /// The poll interval elapsed
    Timeout,
    Cancelled,
}

/// Pause strategy between watch ticks
pub trait Pacer {
    fn pause(&mut self, cancel: &CancellationToken) -> Wake;
}

/// Sleeps for a fixed interval, waking early on cancellation.
#[derive(Debug, Clone)]
pub struct IntervalPacer {
    interval: Duration,
}

impl IntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Pacer for IntervalPacer {
    fn pause(&mut self, cancel: &CancellationToken) -> Wake {
        if cancel.wait_timeout(self.interval) {
            Wake::Cancelled
        } else {
            Wake::Timeout
        }
    }
}

/// Waits on a channel fed by a polling file watcher on the stats root.
///
/// The channel is also woken by cancellation; without any event the pause
/// ends after the poll interval.
pub struct ChannelPacer {
    _watcher: PollWatcher,
    rx: Receiver<()>,
    interval: Duration,
}

impl ChannelPacer {
    pub fn new(
        root: &Path,
        recursive: bool,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let (tx, rx) = channel();
        cancel.register_waker(tx.clone());

        let config = notify::Config::default().with_poll_interval(interval);
        let mut watcher = PollWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                {
                    let _ = tx.send(());
                }
            },
            config,
        )?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(root, mode)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            interval,
        })
    }
}

impl Pacer for ChannelPacer {
    fn pause(&mut self, cancel: &CancellationToken) -> Wake {
        if cancel.is_cancelled() {
            return Wake::Cancelled;
        }

        let wake = match self.rx.recv_timeout(self.interval) {
            Ok(()) => {
                // Coalesce a burst of events into one tick.
                while self.rx.try_recv().is_ok() {}
                Wake::Changed
            }
            Err(RecvTimeoutError::Timeout) => Wake::Timeout,
            Err(RecvTimeoutError::Disconnected) => {
                if cancel.wait_timeout(self.interval) {
                    Wake::Cancelled
                } else {
                    Wake::Timeout
                }
            }
        };

        if cancel.is_cancelled() {
            Wake::Cancelled
        } else {
            debug!("Watch pause ended: {:?}", wake);
            wake
        }
    }
}
