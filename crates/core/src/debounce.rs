//! Trailing-edge debouncing of a single observed value
//!
//! A [`Debouncer`] holds the last settled value and at most one pending timer.
//! Every [`Debouncer::update`] cancels the pending timer and schedules a new
//! one; a value is propagated to subscribers only when its timer survives the
//! full delay. Values overwritten before their timer fires are dropped.

use crate::config::DebounceConfig;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

/// Handle to one debouncing unit
///
/// The settled value is readable with [`current`](Self::current) and
/// observable through [`subscribe`](Self::subscribe). Dropping the handle (or
/// calling [`destroy`](Self::destroy)) cancels the pending timer; no value is
/// propagated afterwards.
pub struct Debouncer<T> {
    state: Arc<Mutex<State<T>>>,
    runtime: Handle,
}

struct State<T> {
    /// Delay applied to timers scheduled from now on
    delay: Duration,
    /// Bumped on every update; a timer only fires if its generation is current
    generation: u64,
    pending: Option<Pending<T>>,
    /// Number of propagations, excluding the initial value
    emissions: u64,
    tx: watch::Sender<T>,
}

struct Pending<T> {
    generation: u64,
    value: T,
    deadline: Instant,
    timer: JoinHandle<()>,
}

impl<T> State<T> {
    fn emit(&mut self, value: T) {
        self.emissions += 1;
        self.tx.send_replace(value);
    }

    /// Cancel the pending timer, returning its value
    fn take_pending(&mut self) -> Option<T> {
        self.pending.take().map(|pending| {
            pending.timer.abort();
            pending.value
        })
    }
}

impl<T> Debouncer<T>
where
    T: Send + Sync + 'static,
{
    /// Create a debouncer on the current tokio runtime
    ///
    /// `initial` is the propagated value right away, without any delay.
    pub fn new(initial: T, delay: Duration) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(Self::with_handle(initial, delay, runtime))
    }

    /// Create a debouncer whose timers run on `runtime`
    pub fn with_handle(initial: T, delay: Duration, runtime: Handle) -> Self {
        let (tx, _) = watch::channel(initial);
        let state = State {
            delay,
            generation: 0,
            pending: None,
            emissions: 0,
            tx,
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            runtime,
        }
    }

    /// Create a debouncer using the delay from `config`
    pub fn from_config(initial: T, config: &DebounceConfig) -> Result<Self> {
        config.validate()?;
        Self::new(initial, config.delay())
    }

    /// Report a new observed value
    ///
    /// Cancels the pending timer, if any, and schedules `value` to be
    /// propagated once `delay` has passed without another update. Equal values
    /// are not short-circuited: they restart the wait as well.
    pub fn update(&self, value: T) {
        let mut state = self.state.lock();

        if let Some(previous) = state.pending.take() {
            previous.timer.abort();
            trace!(generation = previous.generation, "Superseded pending value");
        }

        state.generation += 1;
        let generation = state.generation;
        let delay = state.delay;
        let now = Instant::now();
        let deadline = now.checked_add(delay).unwrap_or_else(|| far_future(now));

        let weak = Arc::downgrade(&self.state);
        let timer = self.runtime.spawn(async move {
            if !delay.is_zero() {
                sleep_until(deadline).await;
            }
            fire(&weak, generation);
        });

        // Stored before the lock is released so the timer always finds it
        state.pending = Some(Pending {
            generation,
            value,
            deadline,
            timer,
        });
    }

    /// Propagate the pending value now instead of waiting for its timer
    ///
    /// Returns `false` if nothing was pending.
    pub fn flush(&self) -> bool {
        let mut state = self.state.lock();
        match state.take_pending() {
            Some(value) => {
                debug!("Flushing pending value");
                state.emit(value);
                true
            }
            None => false,
        }
    }

    /// Drop the pending value without propagating it
    ///
    /// Returns `false` if nothing was pending. The debouncer stays usable.
    pub fn cancel(&self) -> bool {
        let cancelled = self.state.lock().take_pending().is_some();
        if cancelled {
            debug!("Cancelled pending value");
        }
        cancelled
    }

    /// Change the delay for timers scheduled after this call
    ///
    /// A timer that is already pending keeps its deadline.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = delay;
    }

    /// Cancel any pending timer and release the debouncer
    ///
    /// Once this returns no further value is propagated. Subscribers see the
    /// channel close after the last settled value.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<T> Debouncer<T> {
    /// Register a downstream consumer of settled values
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.state.lock().tx.subscribe()
    }

    /// Current quiet period
    pub fn delay(&self) -> Duration {
        self.state.lock().delay
    }

    /// Whether a timer is waiting to propagate a value
    pub fn is_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Deadline of the pending timer, if any
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.state.lock().pending.as_ref().map(|p| p.deadline)
    }

    /// Number of values propagated so far, not counting the initial one
    pub fn emissions(&self) -> u64 {
        self.state.lock().emissions
    }
}

impl<T: Clone> Debouncer<T> {
    /// The last settled value
    pub fn current(&self) -> T {
        self.state.lock().tx.borrow().clone()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if let Some(pending) = state.pending.take() {
            pending.timer.abort();
            debug!(generation = pending.generation, "Debouncer destroyed with pending value");
        }
    }
}

impl<T> fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Debouncer")
            .field("delay", &state.delay)
            .field("generation", &state.generation)
            .field("pending", &state.pending.is_some())
            .field("emissions", &state.emissions)
            .finish()
    }
}

/// Stand-in deadline for delays that overflow the clock, about 30 years out
fn far_future(now: Instant) -> Instant {
    now + Duration::from_secs(86400 * 365 * 30)
}

/// Timer callback: propagate the pending value if `generation` is still current
fn fire<T>(state: &Weak<Mutex<State<T>>>, generation: u64) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = state.lock();

    let pending = match state.pending.take() {
        Some(pending) if pending.generation == generation => pending,
        other => {
            // Superseded between wake-up and lock
            state.pending = other;
            return;
        }
    };

    trace!(generation, "Propagating settled value");
    state.emit(pending.value);
}
