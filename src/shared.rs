//! `shared::SharedBox<T, C>` implements shared ownership generically across the
//! count type (atomic vs. nonatomic), like C++'s `shared_ptr`.
//!
//! See module docs for detailed API
//!
//! ## See also
//!
//! [`rc::SharedBox<T>`][crate::rc::SharedBox] is the single-threaded version
//! that the crate root re-exports.
//!
//! [`arc::SharedBox<T>`][crate::arc::SharedBox] is the atomic version for
//! sharing data across threads.
use alloc::boxed::Box;
use core::{
    cmp, fmt,
    marker::PhantomData,
    mem::{self, MaybeUninit},
    ops::Deref,
    ptr::{self, NonNull},
};

use crate::{count::RefCount, error::AccessError, exclusive::ExclusiveBox, weak::WeakBox};

// Counts and destructors for one family of handles. The value either lives
// right after the header (`new`) or in a box the block owns (`from_box`); the
// header only knows how to reach it through `drop_value`.
pub(crate) struct Header<C> {
    pub(crate) strong: C,
    // weak handles, plus one held collectively by all strong handles
    pub(crate) weak: C,
    drop_value: unsafe fn(*mut Header<C>),
    drop_header: unsafe fn(*mut Header<C>),
}

#[repr(C)]
struct Alloc<T, C> {
    header: Header<C>,
    value: MaybeUninit<T>,
}

/// The (resource, count block) pair every handle of one family carries.
pub(crate) struct Raw<T: ?Sized, C> {
    pub(crate) header: NonNull<Header<C>>,
    pub(crate) ptr: NonNull<T>,
}

impl<T: ?Sized, C> Clone for Raw<T, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized, C> Copy for Raw<T, C> {}

impl<T: ?Sized, C: RefCount> Raw<T, C> {
    /// # Safety
    /// The caller must hold a strong or weak reference to the block for as long
    /// as the returned reference is used.
    pub(crate) unsafe fn header<'h>(self) -> &'h Header<C> {
        unsafe { self.header.as_ref() }
    }

    pub(crate) fn same_value(this: Option<Self>, other: Option<Self>) -> bool {
        this.map(|r| r.ptr.cast::<u8>()) == other.map(|r| r.ptr.cast::<u8>())
    }

    /// Gives up one strong reference. Drops the value on 1 -> 0, then the
    /// weak reference the strong handles held together.
    ///
    /// # Safety
    /// The caller must own a strong reference and not use it afterwards.
    pub(crate) unsafe fn release_strong(self) {
        let h = unsafe { self.header() };
        if h.strong.dec() != 1 {
            return;
        }
        // last strong pointer was just dropped
        h.strong.acquire_fence();
        let f = h.drop_value;
        unsafe { f(self.header.as_ptr()) };
        log::trace!("SharedBox: last owner released, resource dropped");

        unsafe { self.release_weak() };
    }

    /// Gives up one weak reference, freeing the block on 1 -> 0.
    ///
    /// # Safety
    /// The caller must own a weak reference and not use it afterwards.
    pub(crate) unsafe fn release_weak(self) {
        let h = unsafe { self.header() };
        if h.weak.dec() != 1 {
            return;
        }
        // If we free the header, ensure that it happens-after `drop_value` has
        // completed on whichever thread dropped the last strong handle.
        h.weak.acquire_fence();
        let f = h.drop_header;
        unsafe { f(self.header.as_ptr()) };
        log::trace!("SharedBox: count block freed");
    }
}

fn allocate<T, C: RefCount>(value: T) -> Raw<T, C> {
    let b = Box::into_raw(Box::new(Alloc {
        header: Header {
            strong: C::new(1),
            weak: C::new(1),
            drop_value: drop_value::<T, C>,
            drop_header: drop_header::<T, C>,
        },
        value: MaybeUninit::new(value),
    }));
    // Safety: `b` came from `Box::into_raw`, so neither it nor its fields are
    // null. `Alloc` is `repr(C)` so the header is at offset 0.
    unsafe {
        Raw {
            header: NonNull::new_unchecked(b as *mut Header<C>),
            ptr: NonNull::new_unchecked(ptr::addr_of_mut!((*b).value) as *mut T),
        }
    }
}

unsafe fn drop_value<T, C>(ptr: *mut Header<C>) {
    let b = ptr as *mut Alloc<T, C>;
    unsafe { ptr::drop_in_place(ptr::addr_of_mut!((*b).value) as *mut T) };
}

unsafe fn drop_header<T, C>(ptr: *mut Header<C>) {
    // `value` is a `MaybeUninit`, so this frees the memory without dropping it
    // a second time.
    drop(unsafe { Box::from_raw(ptr as *mut Alloc<T, C>) });
}

/// Generic implementation behind [`rc::SharedBox`][crate::rc::SharedBox] and
/// [`arc::SharedBox`][crate::arc::SharedBox].
///
/// A `SharedBox` is either empty or one of a family of handles that own the
/// same value. The value is dropped when the last handle of the family is
/// dropped, reset, or assigned over.
pub struct SharedBox<T: ?Sized, C: RefCount> {
    raw: Option<Raw<T, C>>,
    phantom: PhantomData<T>,
}

// The count block is touched from every thread holding a handle, so it must be
// `Sync`. Of the two counts only `Atomic` is.
unsafe impl<T: ?Sized + Send + Sync, C: RefCount + Send + Sync> Send for SharedBox<T, C> {}
unsafe impl<T: ?Sized + Send + Sync, C: RefCount + Send + Sync> Sync for SharedBox<T, C> {}

impl<T, C: RefCount> SharedBox<T, C> {
    /// Constructs a new `SharedBox<T>` with the given value and a use count
    /// of 1.
    pub fn new(value: T) -> Self {
        SharedBox::adopt(allocate(value))
    }
}

impl<T: ?Sized, C: RefCount> SharedBox<T, C> {
    /// A handle that owns nothing. Its `use_count` is 0, and cloning it gives
    /// another empty handle.
    pub const fn empty() -> Self {
        SharedBox {
            raw: None,
            phantom: PhantomData,
        }
    }

    /// Wraps a pointer pair whose strong reference the caller already
    /// accounted for.
    pub(crate) fn adopt(raw: Raw<T, C>) -> Self {
        SharedBox {
            raw: Some(raw),
            phantom: PhantomData,
        }
    }

    pub(crate) fn raw(&self) -> Option<Raw<T, C>> {
        self.raw
    }

    /// Return a `SharedBox<T>` for a boxed value. This reuses the original box
    /// allocation rather than copying it, and only allocates space for the
    /// counts.
    pub fn from_box(value: Box<T>) -> Self {
        let mut outer = allocate::<Box<T>, C>(value);
        // Safety: `outer` was just allocated and is not shared yet. The boxed
        // contents don't move for as long as the block owns the box.
        let ptr = NonNull::from(unsafe { &mut **outer.ptr.as_mut() });
        SharedBox::adopt(Raw {
            header: outer.header,
            ptr,
        })
    }

    /// Takes over whatever `value` owns. An empty `ExclusiveBox` gives an
    /// empty `SharedBox`.
    pub fn from_exclusive(mut value: ExclusiveBox<T>) -> Self {
        match ExclusiveBox::release(&mut value) {
            Some(b) => SharedBox::from_box(b),
            None => SharedBox::empty(),
        }
    }

    pub fn is_empty(this: &Self) -> bool {
        this.raw.is_none()
    }

    pub fn get(this: &Self) -> Option<&T> {
        // Safety: we hold a strong reference, so the value is alive.
        this.raw.map(|r| unsafe { &*r.ptr.as_ptr() })
    }

    pub fn try_get(this: &Self) -> Result<&T, AccessError> {
        SharedBox::get(this).ok_or(AccessError::empty("SharedBox"))
    }

    /// Returns a mutable reference if this is the only handle to the value,
    /// with no `WeakBox` observers either.
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        let r = this.raw?;
        // Safety: we hold a strong reference
        let h = unsafe { r.header() };
        if h.strong.get() == 1 && h.weak.get() == 1 {
            h.strong.acquire_fence();
            // Safety: nobody else can reach the value while we're borrowed
            Some(unsafe { &mut *r.ptr.as_ptr() })
        } else {
            None
        }
    }

    /// Number of `SharedBox` handles owning this value, or 0 if empty.
    pub fn use_count(this: &Self) -> usize {
        // Safety: we hold a strong reference
        this.raw.map_or(0, |r| unsafe { r.header() }.strong.get())
    }

    /// Number of `WeakBox` handles observing this value.
    pub fn weak_count(this: &Self) -> usize {
        // Subtract one to hide the implicit weak pointer owned by the strong
        // pointers, which is an implementation detail.
        this.raw.map_or(0, |r| unsafe { r.header() }.weak.get() - 1)
    }

    /// Return a [`WeakBox`] observing this value. The use count is unchanged.
    pub fn downgrade(this: &Self) -> WeakBox<T, C> {
        match this.raw {
            Some(r) => {
                // Safety: we hold a strong reference
                unsafe { r.header() }.weak.inc_relaxed();
                WeakBox::adopt(r)
            }
            None => WeakBox::new(),
        }
    }

    /// Returns true if both handles point at the same value, or both are
    /// empty.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Raw::same_value(this.raw, other.raw)
    }

    /// Moves this handle out, leaving `this` empty. The use count is
    /// unchanged.
    pub fn take(this: &mut Self) -> Self {
        mem::take(this)
    }

    /// Releases this handle's reference and leaves it empty.
    pub fn reset(this: &mut Self) {
        *this = SharedBox::empty();
    }
}

impl<T: ?Sized, C: RefCount> Clone for SharedBox<T, C> {
    fn clone(&self) -> Self {
        if let Some(r) = self.raw {
            // Safety: we hold a strong reference
            unsafe { r.header() }.strong.inc_relaxed();
        }
        SharedBox {
            raw: self.raw,
            phantom: PhantomData,
        }
    }
}

impl<T: ?Sized, C: RefCount> Drop for SharedBox<T, C> {
    fn drop(&mut self) {
        // `take` so a handle can never release twice
        if let Some(r) = self.raw.take() {
            unsafe { r.release_strong() };
        }
    }
}

impl<T: ?Sized, C: RefCount> Default for SharedBox<T, C> {
    fn default() -> Self {
        SharedBox::empty()
    }
}

impl<T: ?Sized, C: RefCount> Deref for SharedBox<T, C> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match SharedBox::try_get(self) {
            Ok(v) => v,
            Err(e) => e.raise(),
        }
    }
}

impl<T: ?Sized, C: RefCount> From<ExclusiveBox<T>> for SharedBox<T, C> {
    fn from(value: ExclusiveBox<T>) -> Self {
        SharedBox::from_exclusive(value)
    }
}

impl<T: ?Sized, C: RefCount> From<Box<T>> for SharedBox<T, C> {
    fn from(value: Box<T>) -> Self {
        SharedBox::from_box(value)
    }
}

// Comparisons look at the values, with an empty handle ordered first.
impl<T: ?Sized + PartialEq, C: RefCount> PartialEq for SharedBox<T, C> {
    fn eq(&self, other: &Self) -> bool {
        SharedBox::get(self) == SharedBox::get(other)
    }
}

impl<T: ?Sized + Eq, C: RefCount> Eq for SharedBox<T, C> {}

impl<T: ?Sized + PartialOrd, C: RefCount> PartialOrd for SharedBox<T, C> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        SharedBox::get(self).partial_cmp(&SharedBox::get(other))
    }
}

impl<T: ?Sized + Ord, C: RefCount> Ord for SharedBox<T, C> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        SharedBox::get(self).cmp(&SharedBox::get(other))
    }
}

impl<T: ?Sized + fmt::Debug, C: RefCount> fmt::Debug for SharedBox<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match SharedBox::get(self) {
            Some(v) => fmt::Debug::fmt(v, f),
            None => f.write_str("(empty)"),
        }
    }
}

impl<T: ?Sized, C: RefCount> fmt::Pointer for SharedBox<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw {
            Some(r) => fmt::Pointer::fmt(&(r.ptr.as_ptr() as *const T), f),
            None => f.write_str("(empty)"),
        }
    }
}
