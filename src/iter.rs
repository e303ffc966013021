//! Iterator adapter for streams.
//!
//! [`StreamIter`] walks a stream from index zero, yielding items, skipping
//! filtered-out positions and fusing at the first `Exhausted`. It is the
//! serial materialization loop every terminal operation is built on.
//!
//! ```rust
//! use lazy_streams::prelude::*;
//!
//! let s = stream(0..6).unwrap().filter(|x| x % 2 == 1);
//! let odd: Vec<_> = s.iter().collect();
//! assert_eq!(odd, vec![1, 3, 5]);
//! ```

use std::iter::FusedIterator;

use crate::materialized::Materialized;
use crate::pipeline::Stream;

/// Serial iterator over the items of a borrowed stream.
pub struct StreamIter<'a, S: ?Sized> {
    stream: &'a S,
    index: usize,
    exhausted: bool,
}

impl<'a, S> StreamIter<'a, S>
where
    S: Stream + ?Sized,
{
    /// Start at index zero. Usually reached through [`Stream::iter`].
    pub fn new(stream: &'a S) -> Self {
        StreamIter {
            stream,
            index: 0,
            exhausted: false,
        }
    }

    /// Index that will be materialized next.
    pub fn position(&self) -> usize {
        self.index
    }
}

impl<S> Iterator for StreamIter<'_, S>
where
    S: Stream + ?Sized,
{
    type Item = S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            let index = self.index;
            self.index += 1;
            match self.stream.materialize(index) {
                Materialized::Item(item) => return Some(item),
                Materialized::FilteredOut => continue,
                Materialized::Exhausted => self.exhausted = true,
            }
        }
        None
    }
}

impl<S> FusedIterator for StreamIter<'_, S> where S: Stream + ?Sized {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Parallelism;
    use crate::source::Source;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_yields_in_order() {
        let source = Source::new(vec!['a', 'b', 'c']);
        let mut iter = StreamIter::new(&source);
        assert_eq!(iter.next(), Some('a'));
        assert_eq!(iter.position(), 1);
        assert_eq!(iter.collect::<String>(), "bc");
    }

    #[test]
    fn test_fuses_after_exhaustion() {
        struct Probe(AtomicUsize);

        impl Stream for Probe {
            type Item = u8;

            fn size_with(&self, _parallelism: Parallelism) -> usize {
                0
            }

            fn materialize(&self, _index: usize) -> Materialized<u8> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Materialized::Exhausted
            }

            fn original_size(&self) -> usize {
                0
            }
        }

        let probe = Probe(AtomicUsize::new(0));
        let mut iter = StreamIter::new(&probe);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
        assert_eq!(probe.0.load(Ordering::SeqCst), 1);
    }
}
