use std::collections::BTreeMap;
use std::sync::{Condvar, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::{debug, trace};

use crate::config::Parallelism;
use crate::materialized::Materialized;
use crate::pipeline::Stream;

/// Keeps the items for which a predicate holds, numbered densely from zero.
///
/// Position `i` of a filter is the `i`-th parent item that passes. Finding it
/// means scanning the parent in order, so the stage keeps every accepted item
/// it has seen: a request for a position already found is answered from that
/// cache and never reaches the parent again. Each parent position is read and
/// tested at most once over the life of the stage, whatever order positions
/// are requested in.
///
/// The scan itself runs outside the lock. A caller whose position is not yet
/// known claims the next unread parent position, evaluates it (parent and
/// predicate) concurrently with other callers, and then folds the result into
/// the in-order prefix. Parallel workers therefore share the upstream work
/// instead of queueing behind each other. A caller with nothing left to claim
/// waits for the in-flight claims to land.
///
/// `size` scans the whole parent once and caches the count.
pub struct Filter<S, P>
where
    S: Stream,
{
    parent: S,
    predicate: P,
    original_size: usize,
    scan: Mutex<Scan<S::Item>>,
    progress: Condvar,
    size: OnceLock<usize>,
}

/// What the filter knows about its parent so far.
struct Scan<T> {
    /// Passing items of parent positions `..settled`, in order
    accepted: Vec<T>,
    settled: usize,
    /// Evaluated positions at or past `settled`; `None` did not pass
    pending: BTreeMap<usize, Option<T>>,
    next_claim: usize,
    /// Claims whose evaluation unwound; handed out again before new ones
    abandoned: Vec<usize>,
    /// First parent position known to be exhausted
    end: Option<usize>,
}

impl<T> Scan<T> {
    fn new() -> Self {
        Scan {
            accepted: Vec::new(),
            settled: 0,
            pending: BTreeMap::new(),
            next_claim: 0,
            abandoned: Vec::new(),
            end: None,
        }
    }

    fn is_complete(&self) -> bool {
        self.end.is_some_and(|end| self.settled >= end)
    }

    fn claim(&mut self) -> Option<usize> {
        let end = self.end.unwrap_or(usize::MAX);
        while let Some(position) = self.abandoned.pop() {
            if position < end {
                return Some(position);
            }
        }
        if self.next_claim >= end {
            return None;
        }
        let position = self.next_claim;
        self.next_claim += 1;
        Some(position)
    }

    fn record(&mut self, position: usize, slot: Option<T>) {
        self.pending.insert(position, slot);
        while let Some(slot) = self.pending.remove(&self.settled) {
            self.accepted.extend(slot);
            self.settled += 1;
        }
    }

    fn record_end(&mut self, position: usize) {
        let end = self.end.map_or(position, |end| end.min(position));
        self.end = Some(end);
        self.pending.retain(|&p, _| p < end);
    }
}

/// A parent position being evaluated outside the lock. Dropped while still
/// armed (the evaluation unwound), it returns the position for another
/// caller and wakes any waiters.
struct Claim<'a, T> {
    scan: &'a Mutex<Scan<T>>,
    progress: &'a Condvar,
    position: usize,
    armed: bool,
}

impl<T> Drop for Claim<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            let mut scan = self.scan.lock().unwrap_or_else(PoisonError::into_inner);
            scan.abandoned.push(self.position);
            drop(scan);
            self.progress.notify_all();
        }
    }
}

impl<S, P> Filter<S, P>
where
    S: Stream,
{
    pub(crate) fn new(parent: S, predicate: P) -> Self {
        let original_size = parent.original_size();
        Filter {
            parent,
            predicate,
            original_size,
            scan: Mutex::new(Scan::new()),
            progress: Condvar::new(),
            size: OnceLock::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Scan<S::Item>> {
        self.scan.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, P> Stream for Filter<S, P>
where
    S: Stream,
    S::Item: Clone,
    P: Fn(&S::Item) -> bool + Sync,
{
    type Item = S::Item;

    fn size_with(&self, parallelism: Parallelism) -> usize {
        *self.size.get_or_init(|| {
            let size = self.to_list(parallelism).len();
            debug!(size, "filter size cached");
            size
        })
    }

    fn materialize(&self, index: usize) -> Materialized<S::Item> {
        let mut scan = self.lock();
        loop {
            if let Some(item) = scan.accepted.get(index) {
                return Materialized::Item(item.clone());
            }
            if scan.is_complete() {
                return Materialized::Exhausted;
            }
            let Some(position) = scan.claim() else {
                scan = self
                    .progress
                    .wait(scan)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            };
            drop(scan);

            let mut claim = Claim {
                scan: &self.scan,
                progress: &self.progress,
                position,
                armed: true,
            };
            let outcome = match self.parent.materialize(position) {
                Materialized::Item(item) => Some((self.predicate)(&item).then_some(item)),
                Materialized::FilteredOut => Some(None),
                Materialized::Exhausted => None,
            };
            claim.armed = false;

            scan = self.lock();
            match outcome {
                Some(slot) => scan.record(position, slot),
                None => {
                    trace!(position, "filter reached the end of its parent");
                    scan.record_end(position);
                }
            }
            self.progress.notify_all();
        }
    }

    fn original_size(&self) -> usize {
        self.original_size
    }
}
