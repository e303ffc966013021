use std::sync::OnceLock;

use tracing::debug;

use crate::config::Parallelism;
use crate::leaves::IntoLeaves;
use crate::materialized::Materialized;
use crate::pipeline::Stream;

/// Expands nested items into their leaves.
///
/// Lazy only on the outside: the first `size` or `materialize` call collects
/// the entire parent, flattens it and caches the result; every later call
/// indexes into the cache. The cache is filled exactly once even when several
/// threads reach it together. A `size(k)` call that fills it collects the
/// parent with `k` workers; a `materialize` call collects serially.
pub struct Flatten<S>
where
    S: Stream,
    S::Item: IntoLeaves,
{
    parent: S,
    original_size: usize,
    leaves: OnceLock<Vec<<S::Item as IntoLeaves>::Leaf>>,
}

impl<S> Flatten<S>
where
    S: Stream,
    S::Item: IntoLeaves,
{
    pub(crate) fn new(parent: S) -> Self {
        let original_size = parent.original_size();
        Flatten {
            parent,
            original_size,
            leaves: OnceLock::new(),
        }
    }

    fn leaves(&self, parallelism: Parallelism) -> &[<S::Item as IntoLeaves>::Leaf] {
        self.leaves.get_or_init(|| {
            let mut leaves = Vec::new();
            for item in self.parent.to_list(parallelism) {
                item.push_leaves(&mut leaves);
            }
            debug!(leaves = leaves.len(), "flattened parent cached");
            leaves
        })
    }
}

impl<S> Stream for Flatten<S>
where
    S: Stream,
    S::Item: IntoLeaves,
    <S::Item as IntoLeaves>::Leaf: Clone + Send + Sync,
{
    type Item = <S::Item as IntoLeaves>::Leaf;

    fn size_with(&self, parallelism: Parallelism) -> usize {
        self.leaves(parallelism).len()
    }

    fn materialize(&self, index: usize) -> Materialized<Self::Item> {
        self.leaves(Parallelism::SERIAL).get(index).cloned().into()
    }

    fn original_size(&self) -> usize {
        self.original_size
    }
}
