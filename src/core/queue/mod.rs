use crate::core::config::QueueConfig;
use crate::core::error::{ConfigError, InsertError, QueueError, QueueResult};
use crate::core::stats::{QueueStats, StatsSnapshot};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Elements plus the closed flag, both guarded by the queue lock.
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A fixed-capacity FIFO shared between producer and consumer threads.
///
/// Producers block while the queue is full and consumers block while it is empty,
/// each for at most the timeout they pass in. Every failure comes back as a `Result`:
/// [`QueueError::Full`] / [`QueueError::Empty`] when the wait runs out,
/// [`QueueError::LockAcquisitionFailed`] when the lock itself could not be taken in time,
/// and [`QueueError::Closed`] after [`close`](Self::close).
///
/// Wake order among waiting threads is unspecified. Only the data is FIFO.
pub struct BoundedBlockingQueue<T> {
    name: String,
    capacity: usize,
    state: Mutex<State<T>>,
    /// Signaled after a removal.
    not_full: Condvar,
    /// Signaled after an insertion.
    not_empty: Condvar,
    stats: QueueStats,
}

impl<T> BoundedBlockingQueue<T> {
    /// Create an empty queue holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::named(crate::core::config::DEFAULT_NAME, capacity)
    }

    /// Like [`new`](Self::new), with a name used in log events and stats.
    pub fn named(name: impl Into<String>, capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        let name = name.into();
        debug!(queue = %name, capacity, "created bounded queue");
        Self {
            name,
            capacity,
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            stats: QueueStats::default(),
        }
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::named(config.name.clone(), config.capacity))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_full(&self) -> bool {
        self.size() == self.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Insert at the tail, waiting as long as it takes for space.
    ///
    /// Only fails once the queue is closed.
    pub fn insert(&self, value: T) -> Result<(), InsertError<T>> {
        self.insert_until(value, None)
    }

    /// Insert at the tail, waiting at most `timeout` in total for the lock and for space.
    pub fn insert_timeout(&self, value: T, timeout: Duration) -> Result<(), InsertError<T>> {
        self.insert_until(value, deadline_after(timeout))
    }

    /// Insert only if space is available right now.
    pub fn try_insert(&self, value: T) -> Result<(), InsertError<T>> {
        self.insert_timeout(value, Duration::ZERO)
    }

    /// Remove from the head, waiting as long as it takes for an element.
    ///
    /// Only fails once the queue is closed and drained.
    pub fn remove(&self) -> QueueResult<T> {
        self.remove_until(None)
    }

    /// Remove from the head, waiting at most `timeout` in total for the lock and for an element.
    pub fn remove_timeout(&self, timeout: Duration) -> QueueResult<T> {
        self.remove_until(deadline_after(timeout))
    }

    /// Remove only if an element is available right now.
    pub fn try_remove(&self) -> QueueResult<T> {
        self.remove_timeout(Duration::ZERO)
    }

    /// Close the queue and wake every blocked caller.
    ///
    /// Further inserts fail with [`QueueError::Closed`]. Removes keep draining what is
    /// left and fail with [`QueueError::Closed`] once the queue is empty.
    /// Returns `true` for the call that actually closed the queue.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        let remaining = state.items.len();
        drop(state);

        self.not_full.notify_all();
        self.not_empty.notify_all();
        debug!(queue = %self.name, remaining, "queue closed");
        true
    }

    pub fn stats(&self) -> StatsSnapshot {
        let state = self.state.lock();
        let (size, closed) = (state.items.len(), state.closed);
        drop(state);
        self.stats.snapshot(&self.name, self.capacity, size, closed)
    }

    fn insert_until(&self, value: T, deadline: Option<Instant>) -> Result<(), InsertError<T>> {
        let Some(mut state) = self.lock_until(deadline) else {
            return Err(self.reject(value, QueueError::LockAcquisitionFailed));
        };

        while !state.closed && state.items.len() >= self.capacity {
            if wait_on(&self.not_full, &mut state, deadline) {
                break;
            }
        }

        if state.closed {
            drop(state);
            return Err(self.reject(value, QueueError::Closed));
        }
        if state.items.len() >= self.capacity {
            drop(state);
            return Err(self.reject(value, QueueError::Full));
        }

        state.items.push_back(value);
        debug_assert!(state.items.len() <= self.capacity, "queue grew past its capacity");
        drop(state);

        self.stats.record_insert();
        self.not_empty.notify_one();
        Ok(())
    }

    fn remove_until(&self, deadline: Option<Instant>) -> QueueResult<T> {
        let Some(mut state) = self.lock_until(deadline) else {
            return Err(self.fail(QueueError::LockAcquisitionFailed));
        };

        while !state.closed && state.items.is_empty() {
            if wait_on(&self.not_empty, &mut state, deadline) {
                break;
            }
        }

        match state.items.pop_front() {
            Some(value) => {
                drop(state);
                self.stats.record_remove();
                self.not_full.notify_one();
                Ok(value)
            }
            None => {
                let kind = if state.closed {
                    QueueError::Closed
                } else {
                    QueueError::Empty
                };
                drop(state);
                Err(self.fail(kind))
            }
        }
    }

    fn lock_until(&self, deadline: Option<Instant>) -> Option<MutexGuard<'_, State<T>>> {
        match deadline {
            None => Some(self.state.lock()),
            Some(limit) => self.state.try_lock_until(limit),
        }
    }

    fn reject(&self, value: T, kind: QueueError) -> InsertError<T> {
        InsertError::new(value, self.fail(kind))
    }

    fn fail(&self, kind: QueueError) -> QueueError {
        self.stats.record_failure(kind);
        trace!(
            queue = %self.name,
            capacity = self.capacity,
            reason = %kind,
            "queue operation failed"
        );
        kind
    }
}

impl<T> Debug for BoundedBlockingQueue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedBlockingQueue")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("size", &self.size())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// `None` means wait forever, which is also what an unrepresentable deadline becomes.
fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Park on `condvar`, releasing the lock while parked.
/// Returns `true` once the deadline has passed.
fn wait_on<T>(
    condvar: &Condvar,
    guard: &mut MutexGuard<'_, State<T>>,
    deadline: Option<Instant>,
) -> bool {
    match deadline {
        None => {
            condvar.wait(guard);
            false
        }
        Some(limit) => condvar.wait_until(guard, limit).timed_out(),
    }
}
