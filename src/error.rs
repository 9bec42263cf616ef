use thiserror::Error;

/// Contract violations detected when a handle is used.
///
/// A failed [`WeakBox::lock`][crate::WeakBox::lock] is deliberately *not*
/// represented here: promoting an expired observer yields an empty
/// [`SharedBox`][crate::SharedBox], which is a normal outcome.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// Dereferenced a handle that owns nothing, e.g. one that was moved out
    /// of with `take()` or default-constructed.
    #[error("dereferenced an empty {handle}")]
    Empty { handle: &'static str },
}

impl AccessError {
    #[cold]
    pub(crate) const fn empty(handle: &'static str) -> Self {
        AccessError::Empty { handle }
    }

    #[cold]
    #[track_caller]
    pub(crate) fn raise(self) -> ! {
        panic!("{}", self)
    }
}
