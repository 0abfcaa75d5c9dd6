//! Lazy, restartable sequences of real numbers.
//!
//! A [`View`] is the unit every matrix hands out for its rows and columns. It
//! is a cheap, clonable handle around a [`ViewSource`]: nothing is computed when
//! a view is built, and every call to [`View::iter`] starts a fresh traversal
//! from the first element. Views can therefore be stored, sliced and
//! concatenated freely, then evaluated (possibly several times) later.
//!
//! Slicing comes in two flavours. A source that can address its elements
//! directly (a dense buffer, a row of a table, a one-hot vector) overrides
//! [`ViewSource::slice`] and slices in O(1). Any other source falls back to a
//! window that skips leading elements on each traversal, which costs O(skip).
//! Windows never nest: slicing a window re-slices its source with the combined
//! offset, so `v.sub_view(s1, l1).sub_view(s2, l2)` is `v.sub_view(s1 + s2, l2)`.

use std::{fmt, sync::Arc};

/// A fresh traversal over the elements of a view.
pub type ViewIter<'a> = Box<dyn Iterator<Item = f64> + 'a>;

/// The capability behind a [`View`].
///
/// Implementors must be restartable: each call to [`ViewSource::traverse`]
/// yields the full sequence again, independently of any other traversal.
pub trait ViewSource: Send + Sync {
    /// Starts a new traversal from the first element.
    fn traverse(&self) -> ViewIter<'_>;

    /// The number of elements, when it is known without traversing.
    fn known_len(&self) -> Option<usize> {
        None
    }

    /// Random-access slicing, if the source supports it.
    ///
    /// Returning `None` makes [`View::sub_view`] fall back to a skipping window.
    fn slice(&self, _skip: usize, _len: usize) -> Option<View> {
        None
    }
}

/// A shared handle to a lazy sequence of `f64`.
#[derive(Clone)]
pub struct View(Arc<dyn ViewSource>);

impl View {
    /// Wraps a source into a view.
    pub fn new(source: impl ViewSource + 'static) -> Self {
        View(Arc::new(source))
    }

    /// A view over an owned buffer. Slicing it is O(1).
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self::from_shared(data.into())
    }

    pub(crate) fn from_shared(data: Arc<[f64]>) -> Self {
        let len = data.len();
        View::new(Dense {
            data,
            start: 0,
            len,
        })
    }

    /// A view whose traversals are produced on demand by `f`.
    ///
    /// `f` is called once per traversal, so it must return a fresh iterator
    /// every time. Such a view has no random access.
    pub fn from_traversal<F, I>(f: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: Iterator<Item = f64> + 'static,
    {
        View::new(Traversal(f))
    }

    /// A vector of length `len` holding a single `1` at `position` and zeros
    /// elsewhere. A `position` at or past `len` yields the zero vector.
    pub fn one_hot(len: usize, position: usize) -> Self {
        View::new(OneHot {
            len,
            position: (position < len).then_some(position),
        })
    }

    /// The zero vector of length `len`.
    pub fn zeros(len: usize) -> Self {
        View::new(OneHot {
            len,
            position: None,
        })
    }

    /// Starts a fresh traversal.
    pub fn iter(&self) -> ViewIter<'_> {
        self.0.traverse()
    }

    /// Materializes the view into a new buffer.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    pub fn known_len(&self) -> Option<usize> {
        self.0.known_len()
    }

    /// The `len` elements following the first `skip` ones.
    ///
    /// The result is shorter than `len` when the view runs out first.
    pub fn sub_view(&self, skip: usize, len: usize) -> View {
        self.0.slice(skip, len).unwrap_or_else(|| {
            View::new(Window {
                source: self.clone(),
                skip,
                len,
            })
        })
    }

    /// Concatenation: every element of `self`, then every element of `next`.
    ///
    /// Sub-viewing the result is not specialized and costs O(skip).
    pub fn then(&self, next: &View) -> View {
        View::new(Concat {
            first: self.clone(),
            second: next.clone(),
        })
    }

    /// The dot product of two views, truncated to the shorter one.
    pub fn dot(&self, other: &View) -> f64 {
        self.iter().zip(other.iter()).map(|(a, b)| a * b).sum()
    }
}

impl From<Vec<f64>> for View {
    fn from(data: Vec<f64>) -> Self {
        View::from_vec(data)
    }
}

impl FromIterator<f64> for View {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        View::from_vec(iter.into_iter().collect())
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A window `[start, start + len)` over a shared buffer.
struct Dense {
    data: Arc<[f64]>,
    start: usize,
    len: usize,
}

impl ViewSource for Dense {
    fn traverse(&self) -> ViewIter<'_> {
        Box::new(self.data[self.start..self.start + self.len].iter().copied())
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.len)
    }

    fn slice(&self, skip: usize, len: usize) -> Option<View> {
        let skip = skip.min(self.len);
        Some(View::new(Dense {
            data: self.data.clone(),
            start: self.start + skip,
            len: len.min(self.len - skip),
        }))
    }
}

struct Traversal<F>(F);

impl<F, I> ViewSource for Traversal<F>
where
    F: Fn() -> I + Send + Sync,
    I: Iterator<Item = f64> + 'static,
{
    fn traverse(&self) -> ViewIter<'_> {
        Box::new((self.0)())
    }
}

/// The fallback slice: skips `skip` elements of `source` on each traversal.
struct Window {
    source: View,
    skip: usize,
    len: usize,
}

impl ViewSource for Window {
    fn traverse(&self) -> ViewIter<'_> {
        Box::new(self.source.iter().skip(self.skip).take(self.len))
    }

    fn known_len(&self) -> Option<usize> {
        self.source
            .known_len()
            .map(|n| n.saturating_sub(self.skip).min(self.len))
    }

    fn slice(&self, skip: usize, len: usize) -> Option<View> {
        // Re-slice the source instead of stacking windows.
        let len = len.min(self.len.saturating_sub(skip));
        Some(self.source.sub_view(self.skip + skip, len))
    }
}

struct Concat {
    first: View,
    second: View,
}

impl ViewSource for Concat {
    fn traverse(&self) -> ViewIter<'_> {
        Box::new(self.first.iter().chain(self.second.iter()))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.first.known_len()? + self.second.known_len()?)
    }
}

struct OneHot {
    len: usize,
    position: Option<usize>,
}

impl ViewSource for OneHot {
    fn traverse(&self) -> ViewIter<'_> {
        let position = self.position;
        Box::new((0..self.len).map(move |i| if Some(i) == position { 1.0 } else { 0.0 }))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.len)
    }

    fn slice(&self, skip: usize, len: usize) -> Option<View> {
        let skip = skip.min(self.len);
        let len = len.min(self.len - skip);
        Some(View::new(OneHot {
            len,
            position: self
                .position
                .and_then(|p| p.checked_sub(skip))
                .filter(|&p| p < len),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A view with no random access, so slicing takes the window path.
    fn sequential(data: &[f64]) -> View {
        let data = data.to_vec();
        View::from_traversal(move || data.clone().into_iter())
    }

    #[test]
    fn test_sub_view_with_default_window() {
        let view = sequential(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        assert_eq!(view.sub_view(0, 3).to_vec(), vec![1.0, 2.0, 3.0]);
        assert!(view.sub_view(1, 0).to_vec().is_empty());
        assert_eq!(
            view.sub_view(0, 8).to_vec(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
        assert_eq!(
            view.sub_view(0, 8).sub_view(2, 6).to_vec(),
            vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
        assert_eq!(
            view.sub_view(0, 8).sub_view(2, 5).to_vec(),
            vec![3.0, 4.0, 5.0, 6.0, 7.0]
        );
    }

    #[test]
    fn test_sub_view_composition_law() {
        let data: Vec<f64> = (0..20).map(f64::from).collect();
        for view in [sequential(&data), View::from_vec(data.clone())] {
            for (s1, l1, s2, l2) in [(0, 10, 3, 5), (4, 12, 0, 12), (7, 9, 2, 7), (1, 3, 3, 0)] {
                assert_eq!(
                    view.sub_view(s1, l1).sub_view(s2, l2).to_vec(),
                    view.sub_view(s1 + s2, l2).to_vec(),
                    "law broken for ({s1}, {l1}, {s2}, {l2})"
                );
            }
        }
    }

    #[test]
    fn test_sub_view_of_window_stays_inside_window() {
        let view = sequential(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(view.sub_view(0, 3).sub_view(1, 10).to_vec(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_then_concatenates() {
        let v1 = sequential(&[5.0, 4.0, 3.0]);
        let v2 = View::from_vec(vec![2.0, 1.0]);
        let empty = sequential(&[]);

        let v = empty.then(&v1).then(&v2).then(&empty);

        assert_eq!(v.to_vec(), vec![5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(v.sub_view(2, 2).to_vec(), vec![3.0, 2.0]);
    }

    #[test]
    fn test_views_are_restartable() {
        let v = View::one_hot(3, 1).then(&View::from_vec(vec![7.0]));
        let first: Vec<f64> = v.iter().collect();
        let second: Vec<f64> = v.iter().collect();
        assert_eq!(first, vec![0.0, 1.0, 0.0, 7.0]);
        assert_eq!(first, second);
        assert_eq!(v.known_len(), Some(4));
    }

    #[test]
    fn test_one_hot_slicing() {
        let v = View::one_hot(6, 4);
        assert_eq!(v.sub_view(3, 3).to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(v.sub_view(0, 4).to_vec(), vec![0.0; 4]);
        assert_eq!(View::one_hot(2, 5).to_vec(), vec![0.0, 0.0]);
        assert_eq!(View::zeros(3).to_vec(), vec![0.0; 3]);
    }

    #[test]
    fn test_to_vec_is_a_snapshot() {
        let source = View::from_vec(vec![1.0, 2.0]);
        let snapshot = source.to_vec();
        drop(source);
        assert_eq!(snapshot, vec![1.0, 2.0]);
    }

    #[test]
    fn test_dot() {
        let a = View::from_vec(vec![1.0, 2.0, 3.0]);
        let b = sequential(&[4.0, -5.0, 6.0]);
        assert_eq!(a.dot(&b), 12.0);
    }
}
