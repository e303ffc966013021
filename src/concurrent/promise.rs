//! A small promise-based worker pool.
//!
//! [`PromiseKeeper`] runs submitted closures on a fixed set of scoped worker
//! threads and hands back a [`Promise`] per submission. Workers live inside a
//! [`std::thread::scope`], so jobs may borrow from the caller's stack (the
//! parallel materializer borrows the stream being materialized).
//!
//! ```rust
//! use lazy_streams::concurrent::{KeeperConfig, PromiseKeeper};
//!
//! let data = vec![1, 2, 3];
//! let total: i32 = std::thread::scope(|scope| {
//!     let mut keeper = PromiseKeeper::new(scope, KeeperConfig::new(2)).unwrap();
//!     let promises: Vec<_> = data
//!         .iter()
//!         .map(|x| keeper.submit(move || x * 10))
//!         .collect();
//!     keeper.stop();
//!     promises
//!         .into_iter()
//!         .map(|p| p.into_result().unwrap().unwrap())
//!         .sum()
//! });
//! assert_eq!(total, 60);
//! ```

use std::cell::OnceCell;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, Scope, ScopedJoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, trace, warn};

type Job<'env> = Box<dyn FnOnce() + Send + 'env>;

/// Construction options for a [`PromiseKeeper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeeperConfig {
    /// Number of worker threads; clamped to at least one.
    pub workers: usize,
    /// Stop (and wait for outstanding work) when the keeper is dropped.
    pub auto_stop: bool,
}

impl KeeperConfig {
    /// `workers` threads, stopping on drop.
    ///
    /// ```rust
    /// use lazy_streams::concurrent::KeeperConfig;
    ///
    /// let config = KeeperConfig::new(4);
    /// assert_eq!(config.workers, 4);
    /// assert!(config.auto_stop);
    /// ```
    pub fn new(workers: usize) -> Self {
        KeeperConfig {
            workers,
            auto_stop: true,
        }
    }

    /// Set whether dropping the keeper waits for outstanding work.
    ///
    /// ```rust
    /// use lazy_streams::concurrent::KeeperConfig;
    ///
    /// assert!(!KeeperConfig::new(2).auto_stop(false).auto_stop);
    /// ```
    pub fn auto_stop(self, auto_stop: bool) -> Self {
        KeeperConfig { auto_stop, ..self }
    }
}

/// Fixed-size pool of scoped workers fed from a shared job queue.
///
/// Without `auto_stop`, dropping the keeper only closes the queue; the
/// workers finish what was already queued and are joined when the enclosing
/// scope ends. Call [`stop`](PromiseKeeper::stop) to wait for them explicitly.
pub struct PromiseKeeper<'scope, 'env: 'scope> {
    queue: Option<Sender<Job<'env>>>,
    workers: Vec<ScopedJoinHandle<'scope, ()>>,
    auto_stop: bool,
}

impl<'scope, 'env: 'scope> PromiseKeeper<'scope, 'env> {
    /// Spawn the workers. Fails only if the OS refuses a thread, in which case
    /// any workers already started are shut down before returning.
    pub fn new(scope: &'scope Scope<'scope, 'env>, config: KeeperConfig) -> io::Result<Self> {
        let count = config.workers.max(1);
        let (queue, jobs) = channel::unbounded::<Job<'env>>();
        let mut workers = Vec::with_capacity(count);

        for id in 0..count {
            let jobs: Receiver<Job<'env>> = jobs.clone();
            let spawned = thread::Builder::new()
                .name(format!("lazy-streams-worker-{id}"))
                .spawn_scoped(scope, move || {
                    trace!(worker = id, "worker started");
                    for job in jobs.iter() {
                        job();
                    }
                    trace!(worker = id, "worker exiting");
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    drop(queue);
                    for worker in workers {
                        let _ = worker.join();
                    }
                    return Err(err);
                }
            }
        }

        debug!(workers = count, auto_stop = config.auto_stop, "promise keeper started");
        Ok(PromiseKeeper {
            queue: Some(queue),
            workers,
            auto_stop: config.auto_stop,
        })
    }

    /// Enqueue `f` without blocking.
    ///
    /// A panic inside `f` is caught on the worker and delivered through the
    /// promise as `Err(payload)`. Submitting after [`stop`](Self::stop) drops
    /// the job; its promise never resolves.
    pub fn submit<T, F>(&self, f: F) -> Promise<T>
    where
        F: FnOnce() -> T + Send + 'env,
        T: Send + 'env,
    {
        let (fulfil, receiver) = channel::bounded(1);
        let job: Job<'env> = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(f));
            // the promise may already be gone
            let _ = fulfil.send(outcome);
        });

        match &self.queue {
            Some(queue) => {
                if queue.send(job).is_err() {
                    warn!("job queue disconnected, dropping submission");
                }
            }
            None => warn!("submit called on a stopped promise keeper"),
        }

        Promise {
            receiver,
            outcome: OnceCell::new(),
        }
    }

    /// Number of live worker threads; zero once stopped.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Whether [`stop`](Self::stop) has closed the queue.
    ///
    /// ```rust
    /// use lazy_streams::concurrent::{KeeperConfig, PromiseKeeper};
    ///
    /// std::thread::scope(|scope| {
    ///     let mut keeper = PromiseKeeper::new(scope, KeeperConfig::new(1)).unwrap();
    ///     assert!(!keeper.is_stopped());
    ///     keeper.stop();
    ///     assert!(keeper.is_stopped());
    ///     assert_eq!(keeper.worker_count(), 0);
    /// });
    /// ```
    pub fn is_stopped(&self) -> bool {
        self.queue.is_none()
    }

    /// Close the queue and block until every submitted job has run and every
    /// worker has exited. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.queue.take().is_some() {
            debug!(workers = self.workers.len(), "stopping promise keeper");
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("worker thread panicked outside of a job");
            }
        }
    }
}

impl Drop for PromiseKeeper<'_, '_> {
    fn drop(&mut self) {
        if self.auto_stop {
            self.stop();
        } else {
            self.queue.take();
        }
    }
}

/// Handle to the outcome of one submitted job.
///
/// The outcome is a [`thread::Result`]: `Ok(value)` when the job returned,
/// `Err(payload)` when it panicked.
pub struct Promise<T> {
    receiver: Receiver<thread::Result<T>>,
    outcome: OnceCell<thread::Result<T>>,
}

impl<T> Promise<T> {
    /// Non-blocking: `None` while the job is pending. Once observed, the
    /// outcome is cached and returned by every later call.
    ///
    /// ```rust
    /// use lazy_streams::concurrent::{KeeperConfig, PromiseKeeper};
    ///
    /// std::thread::scope(|scope| {
    ///     let mut keeper = PromiseKeeper::new(scope, KeeperConfig::new(1)).unwrap();
    ///     let promise = keeper.submit(|| "done");
    ///     keeper.stop();
    ///     assert!(matches!(promise.get_result(), Some(Ok("done"))));
    /// });
    /// ```
    pub fn get_result(&self) -> Option<&thread::Result<T>> {
        if self.outcome.get().is_none() {
            if let Ok(outcome) = self.receiver.try_recv() {
                let _ = self.outcome.set(outcome);
            }
        }
        self.outcome.get()
    }

    /// Whether the job has finished, by returning or by panicking.
    pub fn is_ready(&self) -> bool {
        self.get_result().is_some()
    }

    /// Block until the job has run. `None` if the job was dropped unrun.
    pub fn wait(&self) -> Option<&thread::Result<T>> {
        if self.outcome.get().is_none() {
            if let Ok(outcome) = self.receiver.recv() {
                let _ = self.outcome.set(outcome);
            }
        }
        self.outcome.get()
    }

    /// Block until the job has run and take its outcome.
    pub fn into_result(self) -> Option<thread::Result<T>> {
        let Promise { receiver, outcome } = self;
        match outcome.into_inner() {
            Some(outcome) => Some(outcome),
            None => receiver.recv().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_results_match_submissions() {
        thread::scope(|scope| {
            let mut keeper = PromiseKeeper::new(scope, KeeperConfig::new(3)).unwrap();
            assert_eq!(keeper.worker_count(), 3);

            let promises: Vec<_> = (0..20).map(|i| keeper.submit(move || i * i)).collect();
            keeper.stop();

            let squares: Vec<i32> = promises
                .into_iter()
                .map(|p| p.into_result().unwrap().unwrap())
                .collect();
            assert_eq!(squares, (0..20).map(|i| i * i).collect::<Vec<_>>());
        });
    }

    #[test]
    fn test_stop_waits_for_queued_work() {
        let ran = AtomicUsize::new(0);
        thread::scope(|scope| {
            let mut keeper =
                PromiseKeeper::new(scope, KeeperConfig::new(2).auto_stop(false)).unwrap();
            for _ in 0..8 {
                keeper.submit(|| {
                    thread::sleep(Duration::from_millis(5));
                    ran.fetch_add(1, Ordering::SeqCst);
                });
            }
            keeper.stop();
            assert!(keeper.is_stopped());
            assert_eq!(ran.load(Ordering::SeqCst), 8);

            // second stop is a no-op
            keeper.stop();
        });
    }

    #[test]
    fn test_auto_stop_on_drop() {
        let ran = AtomicUsize::new(0);
        thread::scope(|scope| {
            {
                let keeper = PromiseKeeper::new(scope, KeeperConfig::new(2)).unwrap();
                for _ in 0..4 {
                    keeper.submit(|| {
                        thread::sleep(Duration::from_millis(5));
                        ran.fetch_add(1, Ordering::SeqCst);
                    });
                }
            }
            assert_eq!(ran.load(Ordering::SeqCst), 4);
        });
    }

    #[test]
    fn test_get_result_is_none_while_pending() {
        let (release, gate) = channel::bounded::<()>(0);
        thread::scope(|scope| {
            let mut keeper = PromiseKeeper::new(scope, KeeperConfig::new(1)).unwrap();
            let promise = keeper.submit(move || {
                let _ = gate.recv();
                7
            });
            assert!(promise.get_result().is_none());
            assert!(!promise.is_ready());

            release.send(()).unwrap();
            assert_eq!(*promise.wait().unwrap().as_ref().unwrap(), 7);
            // cached after the first observation
            assert_eq!(*promise.get_result().unwrap().as_ref().unwrap(), 7);
            keeper.stop();
        });
    }

    #[test]
    fn test_panicking_job_is_reported_and_worker_survives() {
        thread::scope(|scope| {
            let mut keeper = PromiseKeeper::new(scope, KeeperConfig::new(1)).unwrap();
            let failed = keeper.submit(|| -> i32 { panic!("job failed") });
            let after = keeper.submit(|| 5);
            keeper.stop();

            let payload = failed.into_result().unwrap().unwrap_err();
            assert_eq!(payload.downcast_ref::<&str>(), Some(&"job failed"));
            assert_eq!(after.into_result().unwrap().unwrap(), 5);
        });
    }

    #[test]
    fn test_submit_after_stop_never_resolves() {
        thread::scope(|scope| {
            let mut keeper = PromiseKeeper::new(scope, KeeperConfig::new(1)).unwrap();
            keeper.stop();
            let promise = keeper.submit(|| 1);
            assert!(promise.wait().is_none());
        });
    }

    #[test]
    fn test_zero_workers_is_clamped() {
        thread::scope(|scope| {
            let keeper = PromiseKeeper::new(scope, KeeperConfig::new(0)).unwrap();
            assert_eq!(keeper.worker_count(), 1);
        });
    }
}
