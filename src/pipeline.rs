//! The stage contract and the operations built on it.
//!
//! A pipeline is a chain of stages, each owning its parent, rooted at a
//! [`Source`](crate::Source). Every stage answers two questions: how many
//! items it has, and what sits at position `i`. Adapters ([`map`], [`filter`],
//! [`reverse`], [`flatten`]) wrap a stage in a new one without computing
//! anything. Terminal operations ([`to_list`], [`reduce`], [`take`], ...) walk
//! positions from zero until `Exhausted` and only then does user code run.
//!
//! [`map`]: Stream::map
//! [`filter`]: Stream::filter
//! [`reverse`]: Stream::reverse
//! [`flatten`]: Stream::flatten
//! [`to_list`]: Stream::to_list
//! [`reduce`]: Stream::reduce
//! [`take`]: Stream::take
//!
//! # Parallelism
//!
//! Operations that fully materialize a stream accept `impl Into<Parallelism>`:
//! `0` runs on the calling thread, `k > 0` fans requests out over `k` workers.
//! The result is identical either way. Side effects in user functions are
//! not: workers run them concurrently, in no particular order, and may run a
//! few requests past the end of the stream.

use std::fmt::Display;

use crate::concurrent::{materialize_parallel, materialize_serial};
use crate::config::Parallelism;
use crate::error::{Error, Result};
use crate::iter::StreamIter;
use crate::materialized::Materialized;
use crate::leaves::IntoLeaves;
use crate::source::MaterializedList;
use crate::stages::{Filter, Flatten, Map, Reverse};

/// Separator conventionally passed to [`to_string`](Stream::to_string).
pub const DEFAULT_SEPARATOR: &str = ", ";

/// A lazily evaluated, index-addressable sequence of items.
///
/// Implementors provide [`size_with`](Stream::size_with),
/// [`materialize`](Stream::materialize) and
/// [`original_size`](Stream::original_size); everything else is derived.
/// Built-in stages number their positions densely, so `size` equals the
/// number of positions before the first `Exhausted`.
///
/// Streams must be `Sync` so a terminal operation can share them with worker
/// threads; user closures are therefore `Fn + Sync`.
///
/// ```rust
/// use lazy_streams::prelude::*;
///
/// let s = stream(0..10)
///     .unwrap()
///     .filter(|x| (x + 1) % 2 == 0)
///     .reverse()
///     .map(|x| x * x)
///     .map(|x| format!("Item {x}"));
///
/// assert_eq!(s.last_or_else("Nothing here".to_string()), "Item 1");
/// assert_eq!(s.to_string(DEFAULT_SEPARATOR, 0), "Item 81, Item 49, Item 25, Item 9, Item 1");
/// ```
pub trait Stream: Sync {
    /// Type of the items this stage produces
    type Item: Send;

    /// Number of items, forcing whatever evaluation the stage needs to know it.
    fn size_with(&self, parallelism: Parallelism) -> usize;

    /// Compute the item at `index`.
    fn materialize(&self, index: usize) -> Materialized<Self::Item>;

    /// Length of the root collection this chain was built on.
    fn original_size(&self) -> usize;

    /// Number of items; see [`size_with`](Stream::size_with).
    fn size(&self, parallelism: impl Into<Parallelism>) -> usize {
        self.size_with(parallelism.into())
    }

    /// Serial [`size`](Stream::size).
    fn len(&self) -> usize {
        self.size_with(Parallelism::SERIAL)
    }

    /// Whether the stream has no items. Stops at the first item found, so
    /// unlike [`len`](Stream::len) it does not scan a filter to the end.
    ///
    /// ```rust
    /// use lazy_streams::prelude::*;
    ///
    /// assert!(stream(0..10).unwrap().filter(|x| *x > 20).is_empty());
    /// assert!(!stream(0..10).unwrap().is_empty());
    /// ```
    fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Replace each item with `f(item)`.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Item) -> U + Sync,
    {
        Map::new(self, f)
    }

    /// Keep only the items for which `predicate` holds, renumbered from zero.
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Item) -> bool + Sync,
    {
        Filter::new(self, predicate)
    }

    /// Reverse the order of the items.
    fn reverse(self) -> Reverse<Self>
    where
        Self: Sized,
    {
        Reverse::new(self)
    }

    /// Expand nested items into their leaves. Forces the whole parent the
    /// first time it is queried.
    fn flatten(self) -> Flatten<Self>
    where
        Self: Sized,
        Self::Item: IntoLeaves,
    {
        Flatten::new(self)
    }

    /// Serial iterator over the items.
    fn iter(&self) -> StreamIter<'_, Self> {
        StreamIter::new(self)
    }

    /// Collect every item, in order.
    fn to_list(&self, parallelism: impl Into<Parallelism>) -> Vec<Self::Item> {
        let parallelism = parallelism.into();
        if parallelism.is_parallel() {
            materialize_parallel(self, parallelism)
        } else {
            materialize_serial(self)
        }
    }

    /// Join the display form of every item with `separator`.
    fn to_string(&self, separator: &str, parallelism: impl Into<Parallelism>) -> String
    where
        Self::Item: Display,
    {
        self.to_list(parallelism)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Left-fold the items with no seed.
    ///
    /// Returns [`Error::EmptySequence`] if there are no items.
    fn reduce<F>(&self, f: F, parallelism: impl Into<Parallelism>) -> Result<Self::Item>
    where
        F: FnMut(Self::Item, Self::Item) -> Self::Item,
    {
        self.to_list(parallelism)
            .into_iter()
            .reduce(f)
            .ok_or(Error::EmptySequence)
    }

    /// Left-fold the items starting from `init`.
    fn fold<B, F>(&self, init: B, f: F, parallelism: impl Into<Parallelism>) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        self.to_list(parallelism).into_iter().fold(init, f)
    }

    /// Smallest item; the first of equals. Sorts the whole stream.
    fn min(&self, parallelism: impl Into<Parallelism>) -> Option<Self::Item>
    where
        Self::Item: Ord + Clone + Sync,
    {
        self.sort(false, parallelism).first()
    }

    /// Largest item; the last of equals. Sorts the whole stream.
    fn max(&self, parallelism: impl Into<Parallelism>) -> Option<Self::Item>
    where
        Self::Item: Ord + Clone + Sync,
    {
        self.sort(false, parallelism).last()
    }

    /// Item with the smallest key; the first of equals.
    fn min_by_key<K, F>(&self, key: F, parallelism: impl Into<Parallelism>) -> Option<Self::Item>
    where
        Self::Item: Clone + Sync,
        K: Ord,
        F: FnMut(&Self::Item) -> K,
    {
        self.sort_by_key(key, false, parallelism).first()
    }

    /// Item with the largest key; the last of equals.
    fn max_by_key<K, F>(&self, key: F, parallelism: impl Into<Parallelism>) -> Option<Self::Item>
    where
        Self::Item: Clone + Sync,
        K: Ord,
        F: FnMut(&Self::Item) -> K,
    {
        self.sort_by_key(key, false, parallelism).last()
    }

    /// The first `n` items (fewer if the stream is shorter), detached from
    /// this chain.
    fn take(&self, n: usize) -> MaterializedList<Self::Item> {
        MaterializedList::new(self.iter().take(n).collect())
    }

    /// First item, or `None` for an empty stream. Materializes only as far
    /// as the first item.
    ///
    /// ```rust
    /// use lazy_streams::prelude::*;
    ///
    /// let s = stream(1..100).unwrap().filter(|x| x % 7 == 0);
    /// assert_eq!(s.first(), Some(7));
    /// assert_eq!(Source::<u8>::new(vec![]).first(), None);
    /// ```
    fn first(&self) -> Option<Self::Item> {
        self.iter().next()
    }

    /// First item, or `default` for an empty stream.
    ///
    /// ```rust
    /// use lazy_streams::prelude::*;
    ///
    /// let empty = stream(0..5).unwrap().filter(|x| *x > 10);
    /// assert_eq!(empty.first_or_else(-1), -1);
    /// ```
    fn first_or_else(&self, default: Self::Item) -> Self::Item {
        self.first().unwrap_or(default)
    }

    /// Last item, found by reading a reversed view of this stream from the front.
    fn last(&self) -> Option<Self::Item> {
        Reverse::new(self).first()
    }

    /// Last item, or `default` for an empty stream.
    ///
    /// ```rust
    /// use lazy_streams::prelude::*;
    ///
    /// assert_eq!(stream(0..5).unwrap().last_or_else(-1), 4);
    /// assert_eq!(Source::new(vec![]).last_or_else("nothing"), "nothing");
    /// ```
    fn last_or_else(&self, default: Self::Item) -> Self::Item {
        self.last().unwrap_or(default)
    }

    /// Call `f` on every item, in order, on the calling thread.
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(Self::Item),
    {
        self.iter().for_each(f)
    }

    /// Stable sort of every item.
    ///
    /// With `reverse`, the order is descending and equal items keep their
    /// input order.
    fn sort(&self, reverse: bool, parallelism: impl Into<Parallelism>) -> MaterializedList<Self::Item>
    where
        Self::Item: Ord + Clone + Sync,
    {
        let mut items = self.to_list(parallelism);
        if reverse {
            items.sort_by(|a, b| b.cmp(a));
        } else {
            items.sort();
        }
        MaterializedList::new(items)
    }

    /// Stable sort by `key`; see [`sort`](Stream::sort).
    fn sort_by_key<K, F>(
        &self,
        mut key: F,
        reverse: bool,
        parallelism: impl Into<Parallelism>,
    ) -> MaterializedList<Self::Item>
    where
        Self::Item: Clone + Sync,
        K: Ord,
        F: FnMut(&Self::Item) -> K,
    {
        let mut items = self.to_list(parallelism);
        if reverse {
            items.sort_by(|a, b| {
                let (ka, kb) = (key(a), key(b));
                kb.cmp(&ka)
            });
        } else {
            items.sort_by_key(key);
        }
        MaterializedList::new(items)
    }
}

impl<S> Stream for &S
where
    S: Stream + ?Sized,
{
    type Item = S::Item;

    fn size_with(&self, parallelism: Parallelism) -> usize {
        (**self).size_with(parallelism)
    }

    fn materialize(&self, index: usize) -> Materialized<Self::Item> {
        (**self).materialize(index)
    }

    fn original_size(&self) -> usize {
        (**self).original_size()
    }
}
