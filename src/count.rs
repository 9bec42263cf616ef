//! The counter behind [`SharedBox`][crate::shared::SharedBox] and
//! [`WeakBox`][crate::weak::WeakBox].

/// Trait to distinguish the single-threaded [`rc`][crate::rc] flavour from
/// the thread-safe [`arc`][crate::arc] one. The only implementers are
/// [`Nonatomic`][crate::rc::Nonatomic] and [`Atomic`][crate::arc::Atomic].
///
/// It is `pub` so you can write code that's generic over atomicity, but there's
/// no reason to implement it for any other types.
///
/// # Safety
/// Trait is sealed.
pub unsafe trait RefCount: private::Sealed {
    #[doc(hidden)]
    fn new(v: usize) -> Self;
    #[doc(hidden)]
    fn get(&self) -> usize;
    /// Returns the previous value.
    #[doc(hidden)]
    fn inc_relaxed(&self) -> usize;
    /// Increments unless the count is zero, as a single step. Returns whether
    /// the increment happened.
    #[doc(hidden)]
    fn inc_if_nonzero(&self) -> bool;
    /// Returns the previous value.
    #[doc(hidden)]
    fn dec(&self) -> usize;
    #[doc(hidden)]
    fn acquire_fence(&self);
}

pub(crate) mod private {
    pub trait Sealed {}
}
