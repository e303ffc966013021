//! Drivers that turn a stream into a `Vec` of its items.
//!
//! The serial driver walks indices on the calling thread. The parallel driver
//! submits `materialize(i)` for increasing `i` to a [`PromiseKeeper`] ahead of
//! knowing where the stream ends, settles completed requests in index order,
//! and stops submitting at the first `Exhausted`. Requests issued past the end
//! are bounded by [`Parallelism::max_in_flight`] and their results discarded.
//!
//! Results are reassembled in index order, so the output equals the serial
//! output. Side effects of user functions are not ordered: concurrent workers
//! may run them in any order, and speculative requests past the end still run.

use std::panic;
use std::thread;

use tracing::{debug, warn};

use crate::concurrent::promise::{KeeperConfig, Promise, PromiseKeeper};
use crate::config::Parallelism;
use crate::iter::StreamIter;
use crate::materialized::Materialized;
use crate::pipeline::Stream;

pub(crate) fn materialize_serial<S>(stream: &S) -> Vec<S::Item>
where
    S: Stream + ?Sized,
{
    StreamIter::new(stream).collect()
}

pub(crate) fn materialize_parallel<S>(stream: &S, parallelism: Parallelism) -> Vec<S::Item>
where
    S: Stream + ?Sized,
{
    thread::scope(|scope| {
        let config = KeeperConfig::new(parallelism.thread_count()).auto_stop(false);
        let mut keeper = match PromiseKeeper::new(scope, config) {
            Ok(keeper) => keeper,
            Err(err) => {
                warn!(error = %err, "could not start worker pool, materializing serially");
                return materialize_serial(stream);
            }
        };

        let window = parallelism.max_in_flight().max(1);
        let mut promises: Vec<Promise<Materialized<S::Item>>> = Vec::new();
        // promises[..frontier] have completed with an item or a filtered-out slot
        let mut frontier = 0;

        loop {
            let mut reached_end = false;
            while frontier < promises.len() {
                match promises[frontier].get_result() {
                    None => break,
                    Some(Ok(result)) if !result.is_exhausted() => frontier += 1,
                    // exhausted, or the user function panicked
                    Some(_) => {
                        reached_end = true;
                        break;
                    }
                }
            }
            if reached_end {
                break;
            }

            if promises.len() - frontier >= window {
                if promises[frontier].wait().is_none() {
                    break;
                }
                continue;
            }

            let index = promises.len();
            promises.push(keeper.submit(move || stream.materialize(index)));
        }

        keeper.stop();
        debug!(
            submitted = promises.len(),
            end = frontier,
            workers = parallelism.thread_count(),
            "parallel materialization finished"
        );

        let mut items = Vec::with_capacity(frontier);
        for promise in promises {
            match promise.into_result() {
                Some(Ok(Materialized::Item(item))) => items.push(item),
                Some(Ok(Materialized::FilteredOut)) => {}
                Some(Ok(Materialized::Exhausted)) | None => break,
                Some(Err(payload)) => panic::resume_unwind(payload),
            }
        }
        items
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts every materialization request and sleeps a little on some of
    /// them so workers complete out of order.
    struct Counting {
        items: Vec<u64>,
        calls: AtomicUsize,
    }

    impl Counting {
        fn new(len: u64) -> Self {
            Counting {
                items: (0..len).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Stream for Counting {
        type Item = u64;

        fn size_with(&self, _parallelism: Parallelism) -> usize {
            self.items.len()
        }

        fn materialize(&self, index: usize) -> Materialized<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if index % 3 == 0 {
                thread::sleep(Duration::from_millis(2));
            }
            self.items.get(index).copied().into()
        }

        fn original_size(&self) -> usize {
            self.items.len()
        }
    }

    #[test]
    fn test_parallel_preserves_order() {
        let stream = Counting::new(40);
        let items = materialize_parallel(&stream, Parallelism::threads(4));
        assert_eq!(items, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_overshoot_is_bounded() {
        let stream = Counting::new(10);
        let parallelism = Parallelism::threads(2).with_lookahead(2);
        let items = materialize_parallel(&stream, parallelism);
        assert_eq!(items.len(), 10);

        let calls = stream.calls.load(Ordering::SeqCst);
        assert!(calls > 10, "the exhausted index must have been requested");
        assert!(calls <= 10 + parallelism.max_in_flight(), "calls = {calls}");
    }

    #[test]
    fn test_empty_stream() {
        let stream = Source::<i32>::new(Vec::new());
        assert!(materialize_parallel(&stream, Parallelism::threads(3)).is_empty());
        assert!(materialize_serial(&stream).is_empty());
    }

    #[test]
    fn test_serial_matches_parallel() {
        let stream = Counting::new(25);
        assert_eq!(
            materialize_serial(&stream),
            materialize_parallel(&stream, Parallelism::threads(5))
        );
    }

    #[test]
    fn test_skips_filtered_out_slots() {
        struct EveryOther;

        impl Stream for EveryOther {
            type Item = usize;

            fn size_with(&self, _parallelism: Parallelism) -> usize {
                5
            }

            fn materialize(&self, index: usize) -> Materialized<usize> {
                match index {
                    i if i >= 10 => Materialized::Exhausted,
                    i if i % 2 == 1 => Materialized::FilteredOut,
                    i => Materialized::Item(i),
                }
            }

            fn original_size(&self) -> usize {
                10
            }
        }

        assert_eq!(
            materialize_parallel(&EveryOther, Parallelism::threads(3)),
            vec![0, 2, 4, 6, 8]
        );
        assert_eq!(materialize_serial(&EveryOther), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    #[should_panic(expected = "bad item 7")]
    fn test_user_panic_reaches_caller() {
        struct Faulty;

        impl Stream for Faulty {
            type Item = usize;

            fn size_with(&self, _parallelism: Parallelism) -> usize {
                20
            }

            fn materialize(&self, index: usize) -> Materialized<usize> {
                if index == 7 {
                    panic!("bad item {index}");
                }
                if index >= 20 {
                    return Materialized::Exhausted;
                }
                Materialized::Item(index)
            }

            fn original_size(&self) -> usize {
                20
            }
        }

        materialize_parallel(&Faulty, Parallelism::threads(2));
    }
}
