use crate::config::Parallelism;
use crate::materialized::Materialized;
use crate::pipeline::Stream;

/// Replaces every item with `f(item)`.
///
/// Cardinality is unchanged. `f` runs once per materialized position per
/// request; nothing is cached here.
pub struct Map<S, F> {
    parent: S,
    f: F,
    original_size: usize,
}

impl<S, F> Map<S, F>
where
    S: Stream,
{
    pub(crate) fn new(parent: S, f: F) -> Self {
        let original_size = parent.original_size();
        Map {
            parent,
            f,
            original_size,
        }
    }
}

impl<S, U, F> Stream for Map<S, F>
where
    S: Stream,
    F: Fn(S::Item) -> U + Sync,
    U: Send,
{
    type Item = U;

    fn size_with(&self, parallelism: Parallelism) -> usize {
        self.parent.size_with(parallelism)
    }

    fn materialize(&self, index: usize) -> Materialized<U> {
        self.parent.materialize(index).map(&self.f)
    }

    fn original_size(&self) -> usize {
        self.original_size
    }
}
