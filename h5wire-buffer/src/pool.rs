use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::Staging;

/// A shared handle to the staging of one container.
///
/// Cloning the handle shares the staging, dropping the last handle releases it. Containers
/// create their own pool and only share it with their clones, so two unrelated containers never
/// observe each other's staging.
pub struct BufferPool<S> {
    inner: Arc<Mutex<S>>,
}

impl<S: Staging> BufferPool<S> {
    /// Create a pool with empty staging.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(S::default())),
        }
    }

    /// Pre-allocate staging for `additional` more values.
    pub fn reserve(&self, additional: usize) {
        if additional == 0 {
            return;
        }
        log::trace!("reserving staging for {} values", additional);
        self.inner.lock().reserve(additional);
    }

    /// Release the staged memory if this is the only live handle.
    ///
    /// Returns whether the staging was released. With other handles alive the call does
    /// nothing, since their wire values may still point into the staging.
    pub fn clear(&self) -> bool {
        if Arc::strong_count(&self.inner) > 1 {
            log::trace!(
                "refusing to clear staging shared by {} handles",
                self.handles()
            );
            return false;
        }
        self.inner.lock().clear();
        true
    }

    /// The number of live handles to this pool.
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// The number of values currently staged.
    pub fn staged(&self) -> usize {
        self.inner.lock().staged()
    }

    /// Returns true if both handles refer to the same staging.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Grants exclusive access to the staging for a batch of conversions.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<S: Staging> Default for BufferPool<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for BufferPool<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> Debug for BufferPool<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::Arena;

    type TextPool = BufferPool<Arena<Bytes>>;

    #[test]
    fn clone_shares_staging() {
        let pool = TextPool::new();
        assert_eq!(pool.handles(), 1);

        let other = pool.clone();
        assert_eq!(pool.handles(), 2);
        assert!(pool.ptr_eq(&other));

        pool.with(|arena| arena.push(Bytes::from_static(b"abc")));
        assert_eq!(other.staged(), 1);

        drop(other);
        assert_eq!(pool.handles(), 1);
    }

    #[test]
    fn clear_is_refused_while_shared() {
        let pool = TextPool::new();
        pool.with(|arena| arena.push(Bytes::from_static(b"abc")));

        let other = pool.clone();
        assert!(!pool.clear());
        assert!(!other.clear());
        assert_eq!(pool.staged(), 1);

        drop(other);
        assert!(pool.clear());
        assert_eq!(pool.staged(), 0);
    }

    #[test]
    fn reserve_is_idempotent() {
        let pool = TextPool::new();
        pool.reserve(16);
        let capacity = pool.with(|arena| arena.capacity());
        pool.reserve(4);
        assert_eq!(pool.with(|arena| arena.capacity()), capacity);
    }

    #[test]
    fn unrelated_pools_are_independent() {
        let a = TextPool::new();
        let b = TextPool::new();
        a.with(|arena| arena.push(Bytes::from_static(b"x")));
        assert!(!a.ptr_eq(&b));
        assert_eq!(b.staged(), 0);
    }
}
