//! `weak::WeakBox<T, C>` observes a [`SharedBox`] family without keeping its
//! value alive, like C++'s `weak_ptr`.
//!
//! A `WeakBox` shares the family's count block by reference. When the last
//! `SharedBox` goes away the value is dropped, but the block stays until the
//! last `WeakBox` is gone too, so an expired observer is still safe to query:
//!
//! ```
//! use sharebox::{SharedBox, WeakBox};
//!
//! let a = SharedBox::new(5);
//! let w: WeakBox<i32> = SharedBox::downgrade(&a);
//! assert_eq!(w.use_count(), 1);
//! assert_eq!(*w.lock(), 5);
//!
//! drop(a);
//! assert!(w.expired());
//! assert!(SharedBox::is_empty(&w.lock()));
//! ```
use core::fmt;

use crate::{
    count::RefCount,
    shared::{Raw, SharedBox},
};

/// Generic implementation behind [`rc::WeakBox`][crate::rc::WeakBox] and
/// [`arc::WeakBox`][crate::arc::WeakBox], distinguished by `RefCount`.
pub struct WeakBox<T: ?Sized, C: RefCount> {
    raw: Option<Raw<T, C>>,
}

// A `WeakBox` can be promoted, so it is thread-safe exactly when `SharedBox` is.
unsafe impl<T: ?Sized + Send + Sync, C: RefCount + Send + Sync> Send for WeakBox<T, C> {}
unsafe impl<T: ?Sized + Send + Sync, C: RefCount + Send + Sync> Sync for WeakBox<T, C> {}

impl<T: ?Sized, C: RefCount> WeakBox<T, C> {
    /// An observer of nothing; it is expired from the start.
    pub const fn new() -> Self {
        WeakBox { raw: None }
    }

    /// Wraps a pointer pair whose weak reference the caller already
    /// accounted for.
    pub(crate) fn adopt(raw: Raw<T, C>) -> Self {
        WeakBox { raw: Some(raw) }
    }

    /// Returns true if there was never a value, or all `SharedBox` handles to
    /// it have been dropped, so `lock` will return an empty handle.
    pub fn expired(&self) -> bool {
        self.use_count() == 0
    }

    /// Promotes to a new owning handle, or returns `None` if the value has
    /// already been dropped.
    pub fn upgrade(&self) -> Option<SharedBox<T, C>> {
        let r = self.raw?;
        // Safety: we hold a weak reference, so the block is alive. Checking
        // for zero and incrementing is one step, so a value that already hit
        // zero is never brought back.
        if unsafe { r.header() }.strong.inc_if_nonzero() {
            Some(SharedBox::adopt(r))
        } else {
            log::debug!("WeakBox: promotion refused, resource already dropped");
            None
        }
    }

    /// Like [`upgrade`][WeakBox::upgrade], but an expired observer gives an
    /// empty `SharedBox` instead of `None`.
    pub fn lock(&self) -> SharedBox<T, C> {
        self.upgrade().unwrap_or_default()
    }

    // Get the current strong count of this pointer
    pub fn use_count(&self) -> usize {
        // Safety: we hold a weak reference
        self.raw.map_or(0, |r| unsafe { r.header() }.strong.get())
    }

    // Get the current weak count of this pointer.
    pub fn weak_count(&self) -> usize {
        self.raw.map_or(0, |r| {
            // Safety: we hold a weak reference
            let h = unsafe { r.header() };
            // The strong handles hold one weak reference between them until
            // the value is dropped.
            if h.strong.get() == 0 {
                h.weak.get()
            } else {
                h.weak.get() - 1
            }
        })
    }

    /// Returns true if both observe the same value, or both are empty.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Raw::same_value(self.raw, other.raw)
    }

    /// Returns true if this observes the value owned by `shared`.
    pub fn observes(&self, shared: &SharedBox<T, C>) -> bool {
        self.raw.is_some() && Raw::same_value(self.raw, shared.raw())
    }
}

impl<T: ?Sized, C: RefCount> Clone for WeakBox<T, C> {
    fn clone(&self) -> Self {
        if let Some(r) = self.raw {
            // Safety: we hold a weak reference
            unsafe { r.header() }.weak.inc_relaxed();
        }
        WeakBox { raw: self.raw }
    }
}

impl<T: ?Sized, C: RefCount> Drop for WeakBox<T, C> {
    fn drop(&mut self) {
        if let Some(r) = self.raw.take() {
            unsafe { r.release_weak() };
        }
    }
}

impl<T: ?Sized, C: RefCount> Default for WeakBox<T, C> {
    fn default() -> Self {
        WeakBox::new()
    }
}

impl<T: ?Sized, C: RefCount> From<&SharedBox<T, C>> for WeakBox<T, C> {
    fn from(shared: &SharedBox<T, C>) -> Self {
        SharedBox::downgrade(shared)
    }
}

impl<T: ?Sized, C: RefCount> fmt::Debug for WeakBox<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Weak)")
    }
}
