//! `ExclusiveBox<T>` is a `Box<T>` that may be empty, like C++'s
//! `unique_ptr`.
//!
//! Ownership can be moved out with [`ExclusiveBox::take`], which leaves the
//! source empty instead of statically unusable, and handed back to the caller
//! with [`ExclusiveBox::release`].
//!
//! ```
//! use sharebox::ExclusiveBox;
//!
//! let mut a = ExclusiveBox::new(42);
//! let b = ExclusiveBox::take(&mut a);
//! assert!(ExclusiveBox::is_empty(&a));
//! assert_eq!(*b, 42);
//! ```
use alloc::boxed::Box;
use core::{
    fmt,
    marker::PhantomData,
    mem,
    ops::{Deref, DerefMut},
    ptr::NonNull,
};

use crate::error::AccessError;

pub struct ExclusiveBox<T: ?Sized> {
    ptr: Option<NonNull<T>>,
    // we own a `T`, for dropck and auto traits
    phantom: PhantomData<T>,
}

// Same reasoning as `Box<T>`: the pointee is uniquely owned.
unsafe impl<T: ?Sized + Send> Send for ExclusiveBox<T> {}
unsafe impl<T: ?Sized + Sync> Sync for ExclusiveBox<T> {}

impl<T> ExclusiveBox<T> {
    /// Allocates `value` on the heap and takes ownership of it.
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Drops the current resource, if any, and adopts `value` instead.
    /// Passing `None` leaves the box empty.
    pub fn reset(this: &mut Self, value: Option<T>) {
        ExclusiveBox::reset_box(this, value.map(Box::new))
    }
}

impl<T: ?Sized> ExclusiveBox<T> {
    /// An empty box.
    pub const fn empty() -> Self {
        ExclusiveBox {
            ptr: None,
            phantom: PhantomData,
        }
    }

    /// Takes ownership of an already boxed value without moving it.
    pub fn from_box(value: Box<T>) -> Self {
        // Safety: `Box::into_raw` is never null
        let ptr = unsafe { NonNull::new_unchecked(Box::into_raw(value)) };
        ExclusiveBox {
            ptr: Some(ptr),
            phantom: PhantomData,
        }
    }

    pub fn is_empty(this: &Self) -> bool {
        this.ptr.is_none()
    }

    pub fn get(this: &Self) -> Option<&T> {
        // Safety: a present pointer came from `Box::into_raw` and is owned by
        // us, so it stays valid for as long as `this` is borrowed.
        this.ptr.map(|p| unsafe { &*p.as_ptr() })
    }

    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        // Safety: as in `get`, and `&mut` guarantees exclusivity.
        this.ptr.map(|p| unsafe { &mut *p.as_ptr() })
    }

    pub fn try_get(this: &Self) -> Result<&T, AccessError> {
        ExclusiveBox::get(this).ok_or(AccessError::empty("ExclusiveBox"))
    }

    pub fn try_get_mut(this: &mut Self) -> Result<&mut T, AccessError> {
        ExclusiveBox::get_mut(this).ok_or(AccessError::empty("ExclusiveBox"))
    }

    /// Moves the resource into a new box, leaving `this` empty.
    pub fn take(this: &mut Self) -> Self {
        mem::take(this)
    }

    /// Drops the current resource, if any, and adopts `value` instead.
    pub fn reset_box(this: &mut Self, value: Option<Box<T>>) {
        // Assigning drops the old box before `value` is observable through
        // `this`.
        *this = match value {
            Some(b) => ExclusiveBox::from_box(b),
            None => ExclusiveBox::empty(),
        };
    }

    /// Gives up ownership without dropping the resource. The box is left
    /// empty and the caller becomes responsible for the value.
    pub fn release(this: &mut Self) -> Option<Box<T>> {
        // Safety: the pointer came from `Box::into_raw` and taking it out of
        // `this.ptr` ensures nobody else will free it.
        this.ptr
            .take()
            .map(|p| unsafe { Box::from_raw(p.as_ptr()) })
    }

    /// Consumes the box, returning the resource if there was one.
    pub fn into_box(mut this: Self) -> Option<Box<T>> {
        ExclusiveBox::release(&mut this)
    }
}

impl<T: ?Sized> Default for ExclusiveBox<T> {
    fn default() -> Self {
        ExclusiveBox::empty()
    }
}

impl<T: ?Sized> From<Box<T>> for ExclusiveBox<T> {
    fn from(value: Box<T>) -> Self {
        ExclusiveBox::from_box(value)
    }
}

impl<T: ?Sized> Deref for ExclusiveBox<T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match ExclusiveBox::try_get(self) {
            Ok(v) => v,
            Err(e) => e.raise(),
        }
    }
}

impl<T: ?Sized> DerefMut for ExclusiveBox<T> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        match ExclusiveBox::try_get_mut(self) {
            Ok(v) => v,
            Err(e) => e.raise(),
        }
    }
}

impl<T: ?Sized> Drop for ExclusiveBox<T> {
    fn drop(&mut self) {
        if let Some(b) = ExclusiveBox::release(self) {
            log::trace!("ExclusiveBox: dropping owned resource");
            drop(b);
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ExclusiveBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match ExclusiveBox::get(self) {
            Some(v) => fmt::Debug::fmt(v, f),
            None => f.write_str("(empty)"),
        }
    }
}

impl<T: ?Sized> fmt::Pointer for ExclusiveBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ptr {
            Some(p) => fmt::Pointer::fmt(&(p.as_ptr() as *const T), f),
            None => f.write_str("(empty)"),
        }
    }
}
