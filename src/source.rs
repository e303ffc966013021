//! Stages backed by a concrete collection.

use crate::config::Parallelism;
use crate::error::{Error, Result};
use crate::materialized::Materialized;
use crate::pipeline::Stream;

/// Create a stream from any finite collection.
///
/// Range-like inputs are realized into a `Vec` up front. Iterators that cannot
/// promise an upper bound on their length (`0..`, `iter::repeat(x)`,
/// `iter::from_fn(..)`) are rejected with [`Error::InvalidArgument`]; collect
/// such inputs first and use [`Source::new`].
///
/// ```rust
/// use lazy_streams::prelude::*;
///
/// assert_eq!(stream(0..3).unwrap().to_list(0), vec![0, 1, 2]);
/// assert!(stream(0u32..).is_err());
/// ```
pub fn stream<I>(items: I) -> Result<Source<I::Item>>
where
    I: IntoIterator,
{
    let items = items.into_iter();
    if items.size_hint().1.is_none() {
        return Err(Error::InvalidArgument(
            "stream source must be finite, but the iterator has no upper bound".to_string(),
        ));
    }
    Ok(Source::new(items.collect()))
}

/// The root of a pipeline: a finite, ordered collection read by index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Source<T> {
    items: Vec<T>,
}

impl<T> Source<T> {
    /// Wrap an already-concrete collection. Infallible, unlike [`stream`].
    ///
    /// ```rust
    /// use lazy_streams::prelude::*;
    ///
    /// let s = Source::new(vec!["a", "b"]);
    /// assert_eq!(s.size(0), 2);
    /// assert_eq!(s.materialize(1), Materialized::Item("b"));
    /// ```
    pub fn new(items: Vec<T>) -> Self {
        Source { items }
    }

    /// Borrow the backing items.
    ///
    /// ```rust
    /// use lazy_streams::Source;
    ///
    /// assert_eq!(Source::new(vec![1, 2]).as_slice(), &[1, 2]);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Take the backing items back out.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> From<Vec<T>> for Source<T> {
    fn from(items: Vec<T>) -> Self {
        Source::new(items)
    }
}

impl<T: Clone> From<&[T]> for Source<T> {
    fn from(items: &[T]) -> Self {
        Source::new(items.to_vec())
    }
}

impl<T> Stream for Source<T>
where
    T: Clone + Send + Sync,
{
    type Item = T;

    fn size_with(&self, _parallelism: Parallelism) -> usize {
        self.items.len()
    }

    fn materialize(&self, index: usize) -> Materialized<T> {
        self.items.get(index).cloned().into()
    }

    fn original_size(&self) -> usize {
        self.items.len()
    }
}

/// Items forced out of another stream by [`take`](Stream::take) or
/// [`sort`](Stream::sort).
///
/// Reads exactly like a [`Source`] and shares nothing with the chain that
/// produced it; further adapters start a new pipeline rooted here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterializedList<T> {
    items: Vec<T>,
}

impl<T> MaterializedList<T> {
    pub fn new(items: Vec<T>) -> Self {
        MaterializedList { items }
    }

    /// Borrow the forced items.
    ///
    /// ```rust
    /// use lazy_streams::prelude::*;
    ///
    /// let sorted = stream(vec![3, 1, 2]).unwrap().sort(false, 0);
    /// assert_eq!(sorted.as_slice(), &[1, 2, 3]);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Take the forced items out as a `Vec`.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Stream for MaterializedList<T>
where
    T: Clone + Send + Sync,
{
    type Item = T;

    fn size_with(&self, _parallelism: Parallelism) -> usize {
        self.items.len()
    }

    fn materialize(&self, index: usize) -> Materialized<T> {
        self.items.get(index).cloned().into()
    }

    fn original_size(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_in_and_out_of_bounds() {
        let source = Source::new(vec![10, 20, 30]);
        assert_eq!(source.materialize(0), Materialized::Item(10));
        assert_eq!(source.materialize(2), Materialized::Item(30));
        assert_eq!(source.materialize(3), Materialized::Exhausted);
        assert_eq!(source.materialize(usize::MAX), Materialized::Exhausted);
    }

    #[test]
    fn test_exhaustion_is_stable() {
        let source = Source::new(vec!['x']);
        for index in 1..10 {
            assert!(source.materialize(index).is_exhausted());
        }
    }

    #[test]
    fn test_sizes() {
        let source = Source::new(vec![1, 2, 3, 4]);
        assert_eq!(source.size(0), 4);
        assert_eq!(source.size(8), 4);
        assert_eq!(source.original_size(), 4);
    }

    #[test]
    fn test_stream_realizes_ranges() {
        let source = stream(3..7).unwrap();
        assert_eq!(source.as_slice(), &[3, 4, 5, 6]);
    }

    #[test]
    fn test_stream_accepts_bounded_adapters() {
        let evens = stream((0..10).filter(|x| x % 2 == 0)).unwrap();
        assert_eq!(evens.into_vec(), vec![0, 2, 4, 6, 8]);

        let chars = stream("abc".chars()).unwrap();
        assert_eq!(chars.to_list(0), vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_stream_rejects_unbounded_input() {
        assert!(matches!(stream(0u8..), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            stream(std::iter::repeat(1)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_conversions() {
        let from_vec = Source::from(vec![1, 2]);
        let from_slice = Source::from(&[1, 2][..]);
        assert_eq!(from_vec, from_slice);
    }

    #[test]
    fn test_materialized_list() {
        let list = MaterializedList::new(vec!["a", "b"]);
        assert_eq!(list.size(0), 2);
        assert_eq!(list.materialize(1), Materialized::Item("b"));
        assert_eq!(list.materialize(2), Materialized::Exhausted);
        assert_eq!(list.as_slice(), &["a", "b"]);
        assert_eq!(list.into_vec(), vec!["a", "b"]);
    }
}
