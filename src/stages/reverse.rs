use std::sync::OnceLock;

use tracing::trace;

use crate::config::Parallelism;
use crate::materialized::Materialized;
use crate::pipeline::Stream;

/// Reads the parent back to front.
///
/// Position `i` maps to parent position `n - i - 1`, where `n` is the size of
/// the parent itself rather than of the root collection. Over a filter or a
/// flatten the two differ, and only the parent's size keeps the reversed
/// positions inside what the parent actually produces. The parent size is
/// computed on first use and cached; `original_size` is still reported
/// unchanged.
///
/// The parent's positions must be dense (no `FilteredOut` slots), which holds
/// for every built-in stage.
pub struct Reverse<S> {
    parent: S,
    original_size: usize,
    parent_size: OnceLock<usize>,
}

impl<S> Reverse<S>
where
    S: Stream,
{
    pub(crate) fn new(parent: S) -> Self {
        let original_size = parent.original_size();
        Reverse {
            parent,
            original_size,
            parent_size: OnceLock::new(),
        }
    }

    fn parent_size(&self, parallelism: Parallelism) -> usize {
        *self.parent_size.get_or_init(|| {
            let size = self.parent.size_with(parallelism);
            trace!(size, "reverse resolved parent size");
            size
        })
    }
}

impl<S> Stream for Reverse<S>
where
    S: Stream,
{
    type Item = S::Item;

    fn size_with(&self, parallelism: Parallelism) -> usize {
        self.parent_size(parallelism)
    }

    fn materialize(&self, index: usize) -> Materialized<S::Item> {
        let size = self.parent_size(Parallelism::SERIAL);
        if index >= size {
            return Materialized::Exhausted;
        }
        self.parent.materialize(size - index - 1)
    }

    fn original_size(&self) -> usize {
        self.original_size
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_reverse_to_list() {
        let s = stream(0..5).unwrap().reverse();
        assert_eq!(s.to_list(0), vec![4, 3, 2, 1, 0]);
        assert_eq!(s.materialize(5), Materialized::Exhausted);
        assert_eq!(s.materialize(usize::MAX), Materialized::Exhausted);
    }

    #[test]
    fn test_reverse_of_empty() {
        let s = Source::<u8>::new(vec![]).reverse();
        assert_eq!(s.materialize(0), Materialized::Exhausted);
        assert_eq!(s.size(0), 0);
    }

    #[test]
    fn test_reverse_of_filter_uses_filtered_size() {
        let s = stream(0..10).unwrap().filter(|x| x % 2 == 0).reverse();
        assert_eq!(s.original_size(), 10);
        assert_eq!(s.size(0), 5);
        assert_eq!(s.materialize(0), Materialized::Item(8));
        assert_eq!(s.materialize(4), Materialized::Item(0));
        assert_eq!(s.materialize(5), Materialized::Exhausted);
    }

    #[test]
    fn test_double_reverse() {
        let s = stream(vec!['a', 'b', 'c']).unwrap().reverse().reverse();
        assert_eq!(s.to_list(0), vec!['a', 'b', 'c']);
        assert_eq!(s.to_list(2), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_reverse_of_flatten() {
        let s = stream(vec![vec![1, 2], vec![3]]).unwrap().flatten().reverse();
        assert_eq!(s.to_list(0), vec![3, 2, 1]);
    }
}
