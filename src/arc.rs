//! `arc::SharedBox<T>` and `arc::WeakBox<T>` count with an `AtomicUsize`, so
//! handles can be sent and shared across threads when `T: Send + Sync`.
//!
//! [`WeakBox::lock`][crate::weak::WeakBox::lock] is a compare-and-swap loop
//! that refuses to move the count away from zero, so a value whose last owner
//! is being dropped on another thread is never resurrected.
//!
//! ```
//! use sharebox::arc::SharedBox;
//! use std::thread;
//!
//! let a = SharedBox::new(vec![1, 2, 3]);
//! let b = a.clone();
//! let sum = thread::spawn(move || b.iter().sum::<i32>()).join().unwrap();
//! assert_eq!(sum, 6);
//! assert_eq!(SharedBox::use_count(&a), 1);
//! ```
//!
//! ## See also
//!
//! [`rc`][crate::rc] in this crate is the nonatomic version for
//! single-threaded use.
use core::sync::atomic::{
    self, AtomicUsize,
    Ordering::{Acquire, Relaxed, Release},
};

use crate::count::{private, RefCount};

/// Marker for thread-safe counts. See [`RefCount`].
pub struct Atomic(AtomicUsize);

impl private::Sealed for Atomic {}

unsafe impl RefCount for Atomic {
    fn new(v: usize) -> Self {
        Atomic(AtomicUsize::new(v))
    }

    fn get(&self) -> usize {
        // relaxed ordering as this is only advisory
        self.0.load(Relaxed)
    }

    fn inc_relaxed(&self) -> usize {
        self.0.fetch_add(1, Relaxed)
    }

    fn inc_if_nonzero(&self) -> bool {
        // See std::sync::Weak::upgrade for explanation of atomic logic
        self.0
            .fetch_update(Acquire, Relaxed, |n| if n == 0 { None } else { Some(n + 1) })
            .is_ok()
    }

    fn dec(&self) -> usize {
        self.0.fetch_sub(1, Release)
    }

    fn acquire_fence(&self) {
        atomic::fence(Acquire);
    }
}

pub type SharedBox<T> = crate::shared::SharedBox<T, Atomic>;
pub type WeakBox<T> = crate::weak::WeakBox<T, Atomic>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::{format, string::String, thread, vec::Vec};

    fn counts<T: ?Sized>(x: &SharedBox<T>) -> (usize, usize) {
        (SharedBox::use_count(x), SharedBox::weak_count(x))
    }
    fn wcounts<T: ?Sized>(x: &WeakBox<T>) -> (usize, usize) {
        (x.use_count(), x.weak_count())
    }

    struct DropCounter<'a, T>(T, &'a AtomicUsize);
    impl<'a, T> Drop for DropCounter<'a, T> {
        fn drop(&mut self) {
            self.1.fetch_add(1, Relaxed);
        }
    }

    #[test]
    fn test_simple() {
        let x = SharedBox::new(2);
        let y = x.clone();
        assert_eq!(*x, 2);
        assert_eq!(&*x as *const i32, &*y as *const i32);
        drop(x);
        assert_eq!(*y, 2);
        assert_eq!(counts(&y), (1, 0));
    }

    #[test]
    fn test_weak() {
        let x = SharedBox::new(2);
        let y = SharedBox::downgrade(&x);
        assert_eq!(wcounts(&y), (1, 1));
        assert_eq!(*y.lock(), 2);
        drop(x);
        assert!(y.expired());
        assert!(y.upgrade().is_none());
        drop(y);
    }

    #[test]
    fn test_threads_clone_drop() {
        let n = AtomicUsize::new(0);
        let x = SharedBox::new(DropCounter(String::from("shared"), &n));
        thread::scope(|s| {
            for _ in 0..8 {
                let x = x.clone();
                s.spawn(move || {
                    let copies: Vec<_> = (0..1000).map(|_| x.clone()).collect();
                    assert!(copies.iter().all(|c| c.0 == "shared"));
                });
            }
        });
        assert_eq!(counts(&x), (1, 0));
        assert_eq!(n.load(Relaxed), 0);
        drop(x);
        assert_eq!(n.load(Relaxed), 1);
    }

    #[test]
    fn test_lock_never_resurrects() {
        let n = AtomicUsize::new(0);
        for i in 0..200 {
            let x = SharedBox::new(DropCounter(i, &n));
            let w = SharedBox::downgrade(&x);
            thread::scope(|s| {
                s.spawn(move || drop(x));
                s.spawn(|| {
                    for _ in 0..100 {
                        match w.upgrade() {
                            // a successful promotion always sees a live value
                            Some(p) => assert_eq!(p.0, i),
                            None => break,
                        }
                    }
                });
            });
            assert!(w.expired());
            assert!(SharedBox::is_empty(&w.lock()));
            assert_eq!(n.load(Relaxed), i + 1);
        }
    }

    #[test]
    fn test_debug() {
        let x = SharedBox::new([1, 2, 3]);
        assert_eq!(format!("{:?}", x), "[1, 2, 3]");
        assert_eq!(format!("{:?}", SharedBox::downgrade(&x)), "(Weak)");
    }
}
