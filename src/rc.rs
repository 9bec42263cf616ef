//! `rc::SharedBox<T>` and `rc::WeakBox<T>` count with a plain `Cell<usize>`,
//! so they are cheap but cannot leave the thread they were created on.
//!
//! These are the flavour re-exported at the crate root.
//!
//! ## See also
//!
//! [`arc`][crate::arc] in this crate is the atomic version for sharing data
//! across threads.
use core::cell::Cell;

use crate::count::{private, RefCount};

/// Marker for single-threaded counts. See [`RefCount`].
pub struct Nonatomic(Cell<usize>);

impl private::Sealed for Nonatomic {}

unsafe impl RefCount for Nonatomic {
    fn new(v: usize) -> Self {
        Nonatomic(Cell::new(v))
    }

    fn get(&self) -> usize {
        self.0.get()
    }

    fn inc_relaxed(&self) -> usize {
        let i = self.0.get();
        self.0.set(i + 1);
        i
    }

    fn inc_if_nonzero(&self) -> bool {
        let i = self.0.get();
        if i != 0 {
            self.0.set(i + 1);
            true
        } else {
            false
        }
    }

    fn dec(&self) -> usize {
        let i = self.0.get();
        self.0.set(i - 1);
        i
    }

    fn acquire_fence(&self) {}
}

pub type SharedBox<T> = crate::shared::SharedBox<T, Nonatomic>;
pub type WeakBox<T> = crate::weak::WeakBox<T, Nonatomic>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExclusiveBox;
    use std::{boxed::Box, cell::Cell, format, string::String, vec, vec::Vec};

    fn counts<T: ?Sized>(x: &SharedBox<T>) -> (usize, usize) {
        (SharedBox::use_count(x), SharedBox::weak_count(x))
    }
    fn wcounts<T: ?Sized>(x: &WeakBox<T>) -> (usize, usize) {
        (x.use_count(), x.weak_count())
    }

    struct DropCounter<'a, T>(T, &'a Cell<usize>);
    impl<'a, T> Drop for DropCounter<'a, T> {
        fn drop(&mut self) {
            self.1.set(self.1.get() + 1);
        }
    }

    #[test]
    fn test_simpler() {
        let x = SharedBox::new(2);
        assert_eq!(*x, 2);
        assert_eq!(counts(&x), (1, 0));
        drop(x);
    }

    #[test]
    fn test_simple() {
        let x = SharedBox::new(2);
        let y = x.clone();
        assert_eq!(*x, 2);
        assert_eq!(&*x as *const i32, &*y as *const i32);
        assert_eq!(counts(&x), (2, 0));
        assert_eq!(counts(&y), (2, 0));
        drop(x);
        assert_eq!(*y, 2);
        assert_eq!(counts(&y), (1, 0));
    }

    #[test]
    fn test_empty() {
        let x: SharedBox<i32> = SharedBox::default();
        assert!(SharedBox::is_empty(&x));
        assert_eq!(SharedBox::use_count(&x), 0);
        let y = x.clone();
        assert!(SharedBox::is_empty(&y));
        assert_eq!(SharedBox::use_count(&y), 0);
        assert!(SharedBox::ptr_eq(&x, &y));
        assert_eq!(format!("{:?}", y), "(empty)");
        assert!(SharedBox::downgrade(&x).expired());
    }

    #[test]
    #[should_panic(expected = "dereferenced an empty SharedBox")]
    fn test_deref_empty() {
        let x: SharedBox<i32> = SharedBox::empty();
        let _v: i32 = *x;
    }

    #[test]
    fn test_drop_once() {
        let n = Cell::new(0);
        {
            let x = SharedBox::new(DropCounter(String::from("v"), &n));
            let copies: Vec<_> = (0..5).map(|_| x.clone()).collect();
            assert_eq!(SharedBox::use_count(&x), 6);
            drop(copies);
            assert_eq!(SharedBox::use_count(&x), 1);
            assert_eq!(x.0, "v");
            assert_eq!(n.get(), 0);
        }
        assert_eq!(n.get(), 1);
    }

    #[test]
    fn test_aliasing_mutation() {
        let p3 = SharedBox::new(Cell::new(10));
        let p4 = p3.clone();
        p4.set(100);
        assert_eq!(p3.get(), 100);
        assert_eq!(SharedBox::use_count(&p3), 2);
        assert_eq!(SharedBox::use_count(&p4), 2);
    }

    #[test]
    fn test_assign_releases_previous() {
        let n = Cell::new(0);
        let a = SharedBox::new(DropCounter(1, &n));
        let mut b = SharedBox::new(DropCounter(2, &n));
        assert_eq!(b.0, 2);
        b = a.clone();
        assert_eq!(n.get(), 1);
        assert_eq!(counts(&a), (2, 0));
        assert_eq!(b.0, 1);

        // assigning a handle over itself keeps the value alive
        b = b.clone();
        assert_eq!(b.0, 1);
        assert_eq!(counts(&a), (2, 0));
        assert_eq!(n.get(), 1);
    }

    #[test]
    fn test_take_and_reset() {
        let n = Cell::new(0);
        let mut a = SharedBox::new(DropCounter((), &n));
        let b = a.clone();
        let mut c = SharedBox::take(&mut a);
        assert!(SharedBox::is_empty(&a));
        assert_eq!(counts(&b), (2, 0));
        assert!(SharedBox::ptr_eq(&b, &c));

        // taking from an empty handle changes nothing
        let d = SharedBox::take(&mut a);
        assert!(SharedBox::is_empty(&d));
        assert_eq!(counts(&b), (2, 0));

        SharedBox::reset(&mut c);
        assert!(SharedBox::is_empty(&c));
        assert_eq!(counts(&b), (1, 0));
        SharedBox::reset(&mut c);
        assert_eq!(counts(&b), (1, 0));
        drop(b);
        assert_eq!(n.get(), 1);
    }

    #[test]
    fn test_weak() {
        let x = SharedBox::new(2);
        let y = SharedBox::downgrade(&x);
        assert_eq!(wcounts(&y), (1, 1));
        assert_eq!(counts(&x), (1, 1));
        drop(x);
        assert_eq!(wcounts(&y), (0, 1));
        drop(y);
    }

    #[test]
    fn test_lock_increments_by_one() {
        let x = SharedBox::new(42);
        let y = x.clone();
        let w = WeakBox::from(&x);
        assert_eq!(SharedBox::use_count(&x), 2);
        let locked = w.lock();
        assert!(!SharedBox::is_empty(&locked));
        assert_eq!(SharedBox::use_count(&x), 3);
        assert_eq!(*locked, 42);
        drop(locked);
        assert_eq!(SharedBox::use_count(&x), 2);
        drop(y);
    }

    #[test]
    fn test_expired() {
        let n = Cell::new(0);
        let x = SharedBox::new(DropCounter(5, &n));
        let y = x.clone();
        let w = SharedBox::downgrade(&x);
        let w2 = w.clone();
        assert!(!w.expired());
        assert_eq!(w.use_count(), 2);
        assert_eq!(w.weak_count(), 2);
        drop(x);
        assert!(!w.expired());
        drop(y);
        assert_eq!(n.get(), 1);
        assert!(w.expired());
        assert!(w2.expired());
        assert_eq!(w.use_count(), 0);
        assert!(SharedBox::is_empty(&w.lock()));
        assert!(w.upgrade().is_none());
        // still expired, and locking did not resurrect the value
        assert!(SharedBox::is_empty(&w.lock()));
        assert_eq!(n.get(), 1);
    }

    #[test]
    fn test_default_weak() {
        let w: WeakBox<i32> = WeakBox::new();
        assert!(w.expired());
        assert_eq!(w.use_count(), 0);
        assert!(SharedBox::is_empty(&w.lock()));
        let w2 = w.clone();
        assert!(w2.ptr_eq(&w));
    }

    #[test]
    fn test_get_mut() {
        let mut x = SharedBox::new(1);
        *SharedBox::get_mut(&mut x).unwrap() = 2;
        assert_eq!(*x, 2);

        let y = x.clone();
        assert!(SharedBox::get_mut(&mut x).is_none());
        drop(y);

        let w = SharedBox::downgrade(&x);
        assert!(SharedBox::get_mut(&mut x).is_none());
        drop(w);
        assert!(SharedBox::get_mut(&mut x).is_some());
    }

    #[test]
    fn test_from_exclusive() {
        let n = Cell::new(0);
        let mut e = ExclusiveBox::new(DropCounter(3, &n));
        let addr = &*e as *const DropCounter<i32>;
        let s = SharedBox::from(ExclusiveBox::take(&mut e));
        assert!(ExclusiveBox::is_empty(&e));
        assert_eq!(&*s as *const DropCounter<i32>, addr);
        assert_eq!(SharedBox::use_count(&s), 1);
        drop(s);
        assert_eq!(n.get(), 1);

        let empty: SharedBox<i32> = SharedBox::from_exclusive(ExclusiveBox::empty());
        assert!(SharedBox::is_empty(&empty));
    }

    #[test]
    fn test_unsized() {
        let x: SharedBox<[i32]> = SharedBox::from_box(vec![1, 2, 3].into_boxed_slice());
        let y = x.clone();
        assert_eq!(format!("{:?}", y), "[1, 2, 3]");
        let w = SharedBox::downgrade(&x);
        drop(x);
        drop(y);
        assert!(w.expired());

        let d: SharedBox<dyn core::fmt::Debug> =
            SharedBox::from_box(Box::new(7) as Box<dyn core::fmt::Debug>);
        assert_eq!(format!("{:?}", d), "7");
    }

    #[test]
    fn test_cmp() {
        let a = SharedBox::new(1);
        let b = SharedBox::new(2);
        assert!(a < b);
        assert!(SharedBox::<i32>::empty() < a);
        assert_eq!(a, SharedBox::new(1));
        assert!(!SharedBox::ptr_eq(&a, &SharedBox::new(1)));
    }

    #[test]
    fn test_tree() {
        // Example of a tree with weak parent pointers.
        struct Tree {
            parent: WeakBox<Tree>,
            value: i32,
        }
        let root = SharedBox::new(Tree {
            parent: WeakBox::new(),
            value: 0,
        });
        let children: Vec<_> = (1..4)
            .map(|i| {
                SharedBox::new(Tree {
                    parent: SharedBox::downgrade(&root),
                    value: i,
                })
            })
            .collect();
        assert_eq!(counts(&root), (1, 3));
        assert!(root.parent.expired());
        for c in &children {
            assert_eq!(c.parent.lock().value, 0);
        }
        drop(root);
        assert!(children.iter().all(|c| c.parent.expired()));
        assert_eq!(children.iter().map(|c| c.value).sum::<i32>(), 6);
    }
}
