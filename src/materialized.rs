/// Outcome of asking a stage for the item at one position.
///
/// `Materialized` is the return type of [`Stream::materialize`](crate::Stream::materialize).
/// Boundary conditions travel through it as plain values: running off the end of a
/// stream is `Exhausted`, never an error.
///
/// # Examples
///
/// ```rust
/// use lazy_streams::Materialized;
///
/// let present: Materialized<i32> = Materialized::Item(21);
/// let done: Materialized<i32> = Materialized::Exhausted;
///
/// assert_eq!(present.map(|x| x * 2), Materialized::Item(42));
/// assert!(done.is_exhausted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Materialized<T> {
    /// A value is present at the requested position
    Item(T),
    /// The position exists but carries no value
    FilteredOut,
    /// The position is at or past the end of the stream
    Exhausted,
}

impl<T> Materialized<T> {
    /// Returns `true` if a value is present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazy_streams::Materialized;
    ///
    /// assert!(Materialized::Item(1).is_item());
    /// assert!(!Materialized::<i32>::FilteredOut.is_item());
    /// ```
    #[inline]
    pub const fn is_item(&self) -> bool {
        matches!(self, Materialized::Item(_))
    }

    /// Returns `true` for `FilteredOut`.
    #[inline]
    pub const fn is_filtered_out(&self) -> bool {
        matches!(self, Materialized::FilteredOut)
    }

    /// Returns `true` for `Exhausted`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazy_streams::Materialized;
    ///
    /// assert!(Materialized::<i32>::Exhausted.is_exhausted());
    /// assert!(!Materialized::Item(1).is_exhausted());
    /// ```
    #[inline]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Materialized::Exhausted)
    }

    /// Converts into `Option<T>`, discarding the reason a value is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazy_streams::Materialized;
    ///
    /// assert_eq!(Materialized::Item("a").item(), Some("a"));
    /// assert_eq!(Materialized::<&str>::FilteredOut.item(), None);
    /// ```
    #[inline]
    pub fn item(self) -> Option<T> {
        match self {
            Materialized::Item(item) => Some(item),
            Materialized::FilteredOut | Materialized::Exhausted => None,
        }
    }

    /// Converts from `&Materialized<T>` to `Materialized<&T>`.
    #[inline]
    pub const fn as_ref(&self) -> Materialized<&T> {
        match self {
            Materialized::Item(item) => Materialized::Item(item),
            Materialized::FilteredOut => Materialized::FilteredOut,
            Materialized::Exhausted => Materialized::Exhausted,
        }
    }

    /// Maps the value, passing `FilteredOut` and `Exhausted` through unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazy_streams::Materialized;
    ///
    /// let x = Materialized::Item(3);
    /// assert_eq!(x.map(|v| v + 1), Materialized::Item(4));
    ///
    /// let y: Materialized<i32> = Materialized::FilteredOut;
    /// assert_eq!(y.map(|v| v + 1), Materialized::FilteredOut);
    /// ```
    #[inline]
    pub fn map<U, F>(self, f: F) -> Materialized<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Materialized::Item(item) => Materialized::Item(f(item)),
            Materialized::FilteredOut => Materialized::FilteredOut,
            Materialized::Exhausted => Materialized::Exhausted,
        }
    }

    /// Returns the contained value.
    ///
    /// # Panics
    ///
    /// Panics if there is no value.
    ///
    /// ```should_panic
    /// use lazy_streams::Materialized;
    ///
    /// let x: Materialized<i32> = Materialized::Exhausted;
    /// x.unwrap_item(); // panics
    /// ```
    #[inline]
    pub fn unwrap_item(self) -> T {
        match self {
            Materialized::Item(item) => item,
            Materialized::FilteredOut => {
                panic!("called `Materialized::unwrap_item()` on a `FilteredOut` value")
            }
            Materialized::Exhausted => {
                panic!("called `Materialized::unwrap_item()` on an `Exhausted` value")
            }
        }
    }
}

impl<T> From<Option<T>> for Materialized<T> {
    /// `Some` becomes an item, `None` marks the end of the stream.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(item) => Materialized::Item(item),
            None => Materialized::Exhausted,
        }
    }
}
