//! Nested values and how they break down into leaves.
//!
//! [`Flatten`](crate::stages::Flatten) needs to know, per item, whether it is
//! a sequence to expand or a scalar to keep. [`IntoLeaves`] encodes that:
//! sequences and tuple-like values (`Vec`, arrays, tuples, [`Nested::List`])
//! expand recursively, scalars push themselves. [`Nested`] covers mixed data
//! of unbounded depth, which the [`nested!`](crate::nested!) macro builds
//! from a bracket literal.

use either::Either;

/// Values that can be broken down into a flat run of leaves.
pub trait IntoLeaves {
    type Leaf;

    /// Append every leaf of `self`, in order, to `out`.
    fn push_leaves(self, out: &mut Vec<Self::Leaf>);

    fn into_leaves(self) -> Vec<Self::Leaf>
    where
        Self: Sized,
    {
        let mut out = Vec::new();
        self.push_leaves(&mut out);
        out
    }
}

/// A scalar or a list of further nested values.
///
/// ```rust
/// use lazy_streams::{nested, IntoLeaves, Nested};
///
/// let items: Vec<Nested<i32>> = nested![1, [2, 3], [[4]]];
/// assert_eq!(items[1], Nested::list(vec![Nested::leaf(2), Nested::leaf(3)]));
/// assert_eq!(items.into_leaves(), vec![1, 2, 3, 4]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Nested<T> {
    Leaf(T),
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// A single scalar.
    pub fn leaf(value: T) -> Self {
        Nested::Leaf(value)
    }

    /// A list of children, expanded in order by [`IntoLeaves`].
    pub fn list<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Nested<T>>,
    {
        Nested::List(children.into_iter().collect())
    }

    /// Whether this node is a scalar rather than a list.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Nested::Leaf(_))
    }
}

impl<T> IntoLeaves for Nested<T> {
    type Leaf = T;

    // explicit stack: depth is unbounded
    fn push_leaves(self, out: &mut Vec<T>) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Nested::Leaf(value) => out.push(value),
                Nested::List(children) => pending.extend(children.into_iter().rev()),
            }
        }
    }
}

impl<N: IntoLeaves> IntoLeaves for Vec<N> {
    type Leaf = N::Leaf;

    fn push_leaves(self, out: &mut Vec<Self::Leaf>) {
        for item in self {
            item.push_leaves(out);
        }
    }
}

impl<N: IntoLeaves, const K: usize> IntoLeaves for [N; K] {
    type Leaf = N::Leaf;

    fn push_leaves(self, out: &mut Vec<Self::Leaf>) {
        for item in self {
            item.push_leaves(out);
        }
    }
}

impl<L, R> IntoLeaves for Either<L, R>
where
    L: IntoLeaves,
    R: IntoLeaves<Leaf = L::Leaf>,
{
    type Leaf = L::Leaf;

    fn push_leaves(self, out: &mut Vec<Self::Leaf>) {
        match self {
            Either::Left(l) => l.push_leaves(out),
            Either::Right(r) => r.push_leaves(out),
        }
    }
}

macro_rules! tuple_leaves {
    ($head:ident $head_var:ident $(, $ty:ident $var:ident)+) => {
        impl<$head, $($ty),+> IntoLeaves for ($head, $($ty),+)
        where
            $head: IntoLeaves,
            $($ty: IntoLeaves<Leaf = <$head as IntoLeaves>::Leaf>),+
        {
            type Leaf = <$head as IntoLeaves>::Leaf;

            fn push_leaves(self, out: &mut Vec<Self::Leaf>) {
                let ($head_var, $($var),+) = self;
                $head_var.push_leaves(out);
                $($var.push_leaves(out);)+
            }
        }
    };
}

tuple_leaves!(A a, B b);
tuple_leaves!(A a, B b, C c);
tuple_leaves!(A a, B b, C c, D d);
tuple_leaves!(A a, B b, C c, D d, E e);
tuple_leaves!(A a, B b, C c, D d, E e, F f);

macro_rules! scalar_leaves {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoLeaves for $ty {
                type Leaf = $ty;

                fn push_leaves(self, out: &mut Vec<$ty>) {
                    out.push(self);
                }
            }
        )*
    };
}

scalar_leaves!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
    &'static str,
);

/// Build a `Vec<Nested<_>>` from a bracket literal.
///
/// Each element is either a single token tree (a literal, an identifier or a
/// parenthesized expression), which becomes a leaf, or a bracketed group,
/// which becomes a nested list.
///
/// ```rust
/// use lazy_streams::{nested, Nested};
///
/// let x = 5;
/// let items = nested![x, [(x + 1), [7]]];
/// assert_eq!(
///     items,
///     vec![
///         Nested::leaf(5),
///         Nested::list(vec![Nested::leaf(6), Nested::list(vec![Nested::leaf(7)])]),
///     ]
/// );
/// ```
#[macro_export]
macro_rules! nested {
    (@node [$($inner:tt)*]) => {
        $crate::Nested::List($crate::nested![$($inner)*])
    };
    (@node $leaf:expr) => {
        $crate::Nested::Leaf($leaf)
    };
    ($($node:tt),* $(,)?) => {
        ::std::vec![$($crate::nested!(@node $node)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_leaves_in_order() {
        let items = nested![1, [2, 3], 4, [5, [6, 7], 8]];
        assert_eq!(items.len(), 4);
        assert_eq!(items.into_leaves(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut node = Nested::leaf(0u32);
        for _ in 0..100_000 {
            node = Nested::list(vec![node]);
        }
        assert_eq!(node.into_leaves(), vec![0]);
    }

    #[test]
    fn test_empty_lists_vanish() {
        let items: Vec<Nested<i32>> = nested![[], [[]], 1];
        assert_eq!(items.into_leaves(), vec![1]);
    }

    #[test]
    fn test_vectors_and_arrays() {
        assert_eq!(vec![vec![1, 2], vec![3]].into_leaves(), vec![1, 2, 3]);
        assert_eq!([[1u8, 2], [3, 4]].into_leaves(), vec![1, 2, 3, 4]);
        assert_eq!(
            vec!["a".to_string(), "b".to_string()].into_leaves(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_either_mixes_scalars_and_sequences() {
        let items: Vec<Either<i64, Vec<i64>>> =
            vec![Either::Left(1), Either::Right(vec![2, 3]), Either::Left(4)];
        assert_eq!(items.into_leaves(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_tuples_mixed_with_vectors() {
        assert_eq!(vec![(1, 2), (3, 4)].into_leaves(), vec![1, 2, 3, 4]);

        let rows = vec![(vec![1, 2], 3), (vec![], 4), (vec![5], 6)];
        assert_eq!(rows.into_leaves(), vec![1, 2, 3, 4, 5, 6]);

        let deep = ((1u8, [2u8, 3]), vec![(4u8, 5u8, 6u8)], 7u8);
        assert_eq!(deep.into_leaves(), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_is_leaf() {
        assert!(Nested::leaf('x').is_leaf());
        assert!(!Nested::<char>::list(vec![]).is_leaf());
    }
}
