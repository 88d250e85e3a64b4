//! Ordered child container.

/// An ordered list of child items (toolbar buttons, menu entries, ...).
///
/// Insertion takes an optional position:
/// - `None` appends.
/// - A non-negative position inserts before that index, or appends when it
///   is past the end.
/// - A negative position counts from the end (`-1` inserts before the last
///   item); one reaching past the start prepends.
///
/// ```
/// use tabula::items::Items;
///
/// let mut items = Items::new();
/// items.insert("b", None);
/// items.insert("d", None);
/// items.insert("c", Some(-1));
/// items.insert("a", Some(-10));
/// assert_eq!(items.as_slice(), &["a", "b", "c", "d"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Items<T> {
    items: Vec<T>,
}

impl<T> Default for Items<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Items<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an insertion position against the current length.
    fn resolve(&self, position: Option<isize>) -> usize {
        let len = self.items.len();
        match position {
            None => len,
            Some(p) if p >= 0 => (p as usize).min(len),
            Some(p) => len.saturating_sub(p.unsigned_abs()),
        }
    }

    /// Inserts an item and returns the index it landed at.
    pub fn insert(&mut self, item: T, position: Option<isize>) -> usize {
        let index = self.resolve(position);
        self.items.insert(index, item);
        index
    }

    /// Appends an item.
    pub fn push(&mut self, item: T) -> usize {
        self.insert(item, None)
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn position(&self, predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(predicate)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> FromIterator<T> for Items<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Items<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
