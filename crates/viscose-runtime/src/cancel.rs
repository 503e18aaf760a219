use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Default)]
struct State {
    cancelled: bool,
    wakers: Vec<Sender<()>>,
}

/// Cloneable cancellation flag.
///
/// Timed waits on the token return as soon as it is cancelled, and
/// registered channels receive a wake-up message.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<State>, Condvar)>,
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        let mut state = lock_state(lock);
        if state.cancelled {
            return;
        }
        state.cancelled = true;
        for waker in state.wakers.drain(..) {
            let _ = waker.send(());
        }
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        lock_state(&self.inner.0).cancelled
    }

    /// Send `()` on `waker` when the token is cancelled (immediately if it already is).
    pub fn register_waker(&self, waker: Sender<()>) {
        let mut state = lock_state(&self.inner.0);
        if state.cancelled {
            let _ = waker.send(());
        } else {
            state.wakers.push(waker);
        }
    }

    /// Block up to `timeout`; returns true if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut state = lock_state(lock);

        while !state.cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = match cvar.wait_timeout(state, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }
}

fn lock_state(lock: &Mutex<State>) -> MutexGuard<'_, State> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::thread;

    #[test]
    fn test_wait_times_out_when_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(10)));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_wakes_waiter_from_another_thread() {
        let token = CancellationToken::new();
        let remote = token.clone();

        let handle = thread::spawn(move || remote.wait_timeout(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        token.cancel();

        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_wakers_receive_cancellation() {
        let token = CancellationToken::new();
        let (tx, rx) = channel();
        token.register_waker(tx);

        token.cancel();
        token.cancel();

        assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());
        assert!(rx.try_recv().is_err());

        let (late_tx, late_rx) = channel();
        token.register_waker(late_tx);
        assert!(late_rx.try_recv().is_ok());
    }
}
